//! Request/reply frames and the bounded state stack.
//!
//! Every nested ask pushes one [`State`] and pops it again when the answer
//! has been read. The stack is bounded at [`MAX_STATES`] frames; exceeding
//! it means the recursion runs away on a cyclic network and aborts the run.

use planforge_core::{
    BufferId, Date, DemandId, FlowId, LoadId, PlanForgeError, PlanId, Result, ROUNDING_ERROR,
};

/// Maximum number of nested asks.
pub const MAX_STATES: usize = 256;

/// One recursion frame.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    /// Asked quantity.
    pub q_qty: f64,
    /// Asked date.
    pub q_date: Date,
    /// Latest acceptable date for the answer.
    pub q_date_max: Date,
    /// Skip searching for capacity before the asked date.
    pub force_late: bool,

    /// Demand a newly created plan delivers to.
    pub q_demand: Option<DemandId>,
    /// Parent plan of a routing step.
    pub q_owner: Option<PlanId>,
    /// Plan whose flow or load is being asked.
    pub q_operationplan: Option<PlanId>,
    pub q_flow: Option<FlowId>,
    pub q_load: Option<LoadId>,

    /// Answered quantity.
    pub a_qty: f64,
    /// Answered date: when the answer is partial, the next date more can
    /// be available.
    pub a_date: Date,
    /// Direct cost.
    pub a_cost: f64,
    /// Indirect cost.
    pub a_penalty: f64,
    /// Plan created for the answer, if any.
    pub a_plan: Option<PlanId>,

    /// Demand being planned.
    pub cur_demand: Option<DemandId>,
    /// Buffer the request passed through last.
    pub cur_buffer: Option<BufferId>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            q_qty: 0.0,
            q_date: Date::default(),
            q_date_max: Date::default(),
            force_late: false,
            q_demand: None,
            q_owner: None,
            q_operationplan: None,
            q_flow: None,
            q_load: None,
            a_qty: 0.0,
            a_date: Date::INFINITE_FUTURE,
            a_cost: 0.0,
            a_penalty: 0.0,
            a_plan: None,
            cur_demand: None,
            cur_buffer: None,
        }
    }
}

impl State {
    /// Creates the frame of a nested ask.
    ///
    /// The demand, the buffer and the force-late flag carry over from the
    /// parent; request handles and answers start empty.
    fn child(&self, q_qty: f64, q_date: Date) -> Self {
        Self {
            q_qty,
            q_date,
            q_date_max: q_date,
            force_late: self.force_late,
            cur_demand: self.cur_demand,
            cur_buffer: self.cur_buffer,
            ..Self::default()
        }
    }
}

/// The answer to an ask, as read by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reply {
    pub quantity: f64,
    pub date: Date,
    pub cost: f64,
    pub penalty: f64,
    pub plan: Option<PlanId>,
}

impl Reply {
    /// Reads the answer of a popped frame.
    ///
    /// The quantity is clamped to `[0, q_qty]` and a partial answer never
    /// carries a date before the asked date.
    pub fn from_state(state: &State) -> Self {
        let quantity = state.a_qty.clamp(0.0, state.q_qty.max(0.0));
        let mut date = state.a_date;
        if quantity < state.q_qty - ROUNDING_ERROR && date < state.q_date {
            date = state.q_date;
        }
        Self {
            quantity,
            date,
            cost: state.a_cost,
            penalty: state.a_penalty,
            plan: state.a_plan,
        }
    }

    /// Returns true when the full asked quantity was answered.
    pub fn is_full(&self, asked: f64) -> bool {
        self.quantity >= asked - ROUNDING_ERROR
    }
}

/// Bounded stack of request frames.
///
/// The bottom frame is a permanent root; `depth` counts the frames above it.
#[derive(Debug, Clone)]
pub struct StateStack {
    frames: Vec<State>,
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStack {
    pub fn new() -> Self {
        let mut frames = Vec::with_capacity(16);
        frames.push(State::default());
        Self { frames }
    }

    /// Number of frames above the root.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Pushes the frame of a nested ask.
    pub fn push(&mut self, q_qty: f64, q_date: Date) -> Result<()> {
        if self.depth() >= MAX_STATES {
            return Err(PlanForgeError::RecursionOverflow { depth: MAX_STATES });
        }
        let frame = self.top().child(q_qty, q_date);
        self.frames.push(frame);
        Ok(())
    }

    /// Pops the top frame and returns it.
    pub fn pop(&mut self) -> Result<State> {
        if self.frames.len() <= 1 {
            return Err(PlanForgeError::StackUnderflow);
        }
        self.frames.pop().ok_or(PlanForgeError::StackUnderflow)
    }

    pub fn top(&self) -> &State {
        // The root frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut State {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Resets the root frame between demands.
    pub fn reset_root(&mut self) {
        self.frames.truncate(1);
        self.frames[0] = State::default();
    }
}
