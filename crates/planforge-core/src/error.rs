//! Error types for PlanForge

use thiserror::Error;

/// Main error type for PlanForge operations
#[derive(Debug, Error)]
pub enum PlanForgeError {
    /// Error in solver configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error in the supply-graph model
    #[error("Domain model error: {0}")]
    DomainModel(String),

    /// The request/reply state stack is exhausted
    #[error("Maximum recursion depth of {depth} exceeded")]
    RecursionOverflow { depth: usize },

    /// A pop without a matching push
    #[error("State stack empty")]
    StackUnderflow,

    /// A worker reached a node owned by a different cluster
    #[error("Cluster violation: {node} belongs to cluster {owner}, not {worker}")]
    ClusterViolation {
        node: String,
        owner: usize,
        worker: usize,
    },

    /// A scripting hook reported a failure
    #[error("Hook error: {0}")]
    Hook(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlanForgeError {
    /// Returns true for errors that abort the complete run instead of
    /// a single demand.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlanForgeError::RecursionOverflow { .. } | PlanForgeError::StackUnderflow
        )
    }
}

/// Result type alias for PlanForge operations
pub type Result<T> = std::result::Result<T, PlanForgeError>;
