//! Per-request view handed to every engine.

use procura_types::Clock;

use crate::deadline::Deadline;
use crate::tender::TransitionPolicy;

/// Store, clock, deadline and policy for one operation.
pub struct Context<'a, S> {
    pub store: &'a S,
    pub clock: &'a dyn Clock,
    pub deadline: Deadline,
    pub policy: TransitionPolicy,
}

impl<S> Clone for Context<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Context<'_, S> {}
