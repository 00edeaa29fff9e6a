//! Cluster assignment and verification.
//!
//! Two nodes belong to the same cluster when a flow, load, routing step,
//! alternate, producing link or demand delivery connects them, directly
//! or transitively. Clusters never share a node, so they can be planned
//! in parallel without locking.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use super::{Network, OperationKind};
use crate::error::{PlanForgeError, Result};
use crate::ids::ClusterId;

impl Network {
    /// Assigns a cluster id to every node and returns the number of clusters.
    ///
    /// Ids are numbered in order of first appearance over operations,
    /// buffers, resources and demands, so repeated calls are stable.
    pub fn compute_clusters(&mut self) -> usize {
        let ops = self.operations.len();
        let bufs = self.buffers.len();
        let ress = self.resources.len();
        let buf_base = ops;
        let res_base = ops + bufs;
        let dem_base = ops + bufs + ress;
        let mut set = UnionFind::<usize>::new(dem_base + self.demands.len());

        for flow in &self.flows {
            set.union(flow.operation.0, buf_base + flow.buffer.0);
        }
        for load in &self.loads {
            set.union(load.operation.0, res_base + load.resource.0);
        }
        for (i, op) in self.operations.iter().enumerate() {
            match &op.kind {
                OperationKind::FixedTime => {}
                OperationKind::Routing { steps } => {
                    for step in steps {
                        set.union(i, step.0);
                    }
                }
                OperationKind::Alternate { alternates } => {
                    for (alt, _) in alternates {
                        set.union(i, alt.0);
                    }
                }
            }
        }
        for (i, buffer) in self.buffers.iter().enumerate() {
            if let Some(producing) = buffer.producing {
                set.union(buf_base + i, producing.0);
            }
        }
        for (i, demand) in self.demands.iter().enumerate() {
            if let Some(delivery) = demand.delivery {
                set.union(dem_base + i, delivery.0);
            }
        }

        let mut ids: HashMap<usize, ClusterId> = HashMap::new();
        let mut assign = |set: &mut UnionFind<usize>, node: usize| {
            let root = set.find_mut(node);
            let next = ClusterId(ids.len());
            *ids.entry(root).or_insert(next)
        };

        for i in 0..ops {
            self.operations[i].cluster = assign(&mut set, i);
        }
        for i in 0..bufs {
            self.buffers[i].cluster = assign(&mut set, buf_base + i);
        }
        for i in 0..ress {
            self.resources[i].cluster = assign(&mut set, res_base + i);
        }
        for i in 0..self.demands.len() {
            self.demands[i].cluster = assign(&mut set, dem_base + i);
        }
        ids.len()
    }

    /// Verifies that no link of the graph crosses a cluster boundary.
    pub fn validate_clusters(&self) -> Result<()> {
        let violation = |what: String, owner: ClusterId, other: ClusterId| {
            Err(PlanForgeError::ClusterViolation {
                node: what,
                owner: owner.0,
                worker: other.0,
            })
        };

        for flow in &self.flows {
            let op = self.operation(flow.operation);
            let buffer = self.buffer(flow.buffer);
            if op.cluster != buffer.cluster {
                return violation(format!("buffer '{}'", buffer.name), buffer.cluster, op.cluster);
            }
        }
        for load in &self.loads {
            let op = self.operation(load.operation);
            let resource = self.resource(load.resource);
            if op.cluster != resource.cluster {
                return violation(
                    format!("resource '{}'", resource.name),
                    resource.cluster,
                    op.cluster,
                );
            }
        }
        for (_, op) in self.operations() {
            let children: Vec<_> = match &op.kind {
                OperationKind::FixedTime => Vec::new(),
                OperationKind::Routing { steps } => steps.clone(),
                OperationKind::Alternate { alternates } => {
                    alternates.iter().map(|(alt, _)| *alt).collect()
                }
            };
            for child in children {
                let child = self.operation(child);
                if child.cluster != op.cluster {
                    return violation(
                        format!("operation '{}'", child.name),
                        child.cluster,
                        op.cluster,
                    );
                }
            }
        }
        for (_, buffer) in self.buffers() {
            if let Some(producing) = buffer.producing {
                let op = self.operation(producing);
                if op.cluster != buffer.cluster {
                    return violation(format!("operation '{}'", op.name), op.cluster, buffer.cluster);
                }
            }
        }
        for (_, demand) in self.demands() {
            if let Some(delivery) = demand.delivery {
                let op = self.operation(delivery);
                if op.cluster != demand.cluster {
                    return violation(format!("operation '{}'", op.name), op.cluster, demand.cluster);
                }
            }
        }
        Ok(())
    }
}
