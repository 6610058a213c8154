//! Abstract storage traits for the procura service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these traits.
//! The lifecycle crate depends only on the traits.

pub mod bid;
pub mod directory;
pub mod endorsement;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod meta;
pub mod snapshot;
pub mod tender;

pub use bid::BidStore;
pub use directory::DirectoryStore;
pub use endorsement::{EndorsementOutcome, EndorsementStore};
pub use error::StoreError;
pub use feedback::FeedbackStore;
pub use filter::{sort_bids, sort_feedback, sort_tenders, BidFilter, BidPredicate, TenderFilter};
pub use meta::MetaStore;
pub use snapshot::{check_expected, SnapshotId, SnapshotStore};
pub use tender::TenderStore;

/// Everything the lifecycle needs from a backend.
pub trait ProcurementStore:
    TenderStore + BidStore + SnapshotStore + EndorsementStore + FeedbackStore + DirectoryStore + Send + Sync
{
}

impl<T> ProcurementStore for T where
    T: TenderStore
        + BidStore
        + SnapshotStore
        + EndorsementStore
        + FeedbackStore
        + DirectoryStore
        + Send
        + Sync
{
}
