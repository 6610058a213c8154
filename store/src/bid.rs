//! Bid row storage trait.

use procura_types::{Bid, BidId, Pagination};

use crate::{BidFilter, StoreError};

/// Read access to current bid rows. Writes go through [`crate::SnapshotStore`]
/// and [`crate::EndorsementStore`].
pub trait BidStore {
    fn get_bid(&self, id: &BidId) -> Result<Bid, StoreError>;

    /// Every matching bid, ordered by name, then id.
    fn matching_bids(&self, filter: &BidFilter) -> Result<Vec<Bid>, StoreError>;

    /// One page of [`BidStore::matching_bids`].
    fn list_bids(&self, filter: &BidFilter, page: Pagination) -> Result<Vec<Bid>, StoreError> {
        Ok(page.apply(self.matching_bids(filter)?))
    }
}
