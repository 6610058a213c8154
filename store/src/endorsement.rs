//! Endorsement ("ship") records.

use procura_types::{Bid, BidId, UserId};

use crate::{SnapshotId, StoreError};

/// Result of recording one endorsement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndorsementOutcome {
    /// False when the pair was already present.
    pub recorded: bool,
    /// Endorsement count after the call.
    pub count: u32,
}

pub trait EndorsementStore {
    /// Insert (bid, user) if absent and bump the bid's counter, atomically.
    ///
    /// The counter change does not alter the bid version. Fails with
    /// [`StoreError::InvalidState`] unless the stored bid is `Published`.
    fn record_endorsement(
        &self,
        bid: &BidId,
        user: &UserId,
    ) -> Result<EndorsementOutcome, StoreError>;

    fn endorsers(&self, bid: &BidId) -> Result<Vec<UserId>, StoreError>;

    /// Delete every endorsement of `bid`, zero its counter and commit the rejected
    /// row with its snapshot, all in one transaction. Same `expected` rule as
    /// [`crate::SnapshotStore::commit_bid`].
    fn reject_bid(&self, bid: &Bid, expected: u32) -> Result<SnapshotId, StoreError>;
}
