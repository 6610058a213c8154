//! Versioned-entity lifecycle and quorum decisions.
//!
//! Every operation enters through the [`PermissionGate`], mutates state through one
//! of the lifecycle engines and is durably recorded through the [`SnapshotLog`]
//! before it returns. [`Procurement`] wires the engines to a store and a clock.

pub mod bid;
pub mod context;
pub mod deadline;
pub mod error;
pub mod feedback;
#[cfg(test)]
mod fixtures;
pub mod permission;
pub mod procurement;
pub mod quorum;
pub mod rollback;
pub mod snapshot;
pub mod tender;
pub mod validation;

pub use bid::BidLifecycle;
pub use context::Context;
pub use deadline::Deadline;
pub use error::{ErrorKind, LifecycleError};
pub use feedback::FeedbackGate;
pub use permission::{controls, PermissionGate, Principal};
pub use procurement::Procurement;
pub use quorum::{DecisionOutcome, QuorumEngine};
pub use rollback::RollbackEngine;
pub use snapshot::SnapshotLog;
pub use tender::{TenderLifecycle, TransitionPolicy};
