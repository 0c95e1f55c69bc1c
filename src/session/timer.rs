//! Guard for delayed transitions.
//!
//! The UI schedules auto-advances (feedback → next problem, review →
//! complete) on a single-shot timer. Every `start`/`reset` bumps the
//! session generation, so a ticket handed out before that is stale and the
//! transition it was scheduled for must not run.

/// Proof that a delayed transition was scheduled in a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generation(u64);

impl Generation {
    /// Invalidate every outstanding ticket.
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn ticket(&self) -> TransitionTicket {
        TransitionTicket { generation: self.0 }
    }

    pub fn is_current(&self, ticket: TransitionTicket) -> bool {
        ticket.generation == self.0
    }
}
