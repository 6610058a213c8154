//! Append-only version history.

use std::fmt;

use procura_types::{Bid, BidId, BidSnapshot, Tender, TenderId, TenderSnapshot};
use uuid::Uuid;

use crate::StoreError;

/// Key of a committed snapshot: the entity and the version it captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotId {
    pub entity: Uuid,
    pub version: u32,
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.entity, self.version)
    }
}

/// Writes the authoritative row and its snapshot in one storage transaction.
///
/// `expected` is the version the caller read before mutating:
/// - `None` inserts a new entity and fails with `Duplicate` if it already exists;
/// - `Some(v)` updates only if the stored row is still at `v`, otherwise `Conflict`.
///
/// Snapshots are write-once: committing a version that already has one is `Duplicate`.
pub trait SnapshotStore {
    fn commit_tender(&self, tender: &Tender, expected: Option<u32>)
        -> Result<SnapshotId, StoreError>;

    fn fetch_tender_version(
        &self,
        id: &TenderId,
        version: u32,
    ) -> Result<TenderSnapshot, StoreError>;

    /// Committed versions in ascending order.
    fn tender_versions(&self, id: &TenderId) -> Result<Vec<u32>, StoreError>;

    /// Like [`SnapshotStore::commit_tender`]. The stored endorsement count is kept;
    /// the snapshot records the stored count, not the one carried by `bid`.
    fn commit_bid(&self, bid: &Bid, expected: Option<u32>) -> Result<SnapshotId, StoreError>;

    fn fetch_bid_version(&self, id: &BidId, version: u32) -> Result<BidSnapshot, StoreError>;

    fn bid_versions(&self, id: &BidId) -> Result<Vec<u32>, StoreError>;
}

/// Validate a commit's `expected` version against what is stored.
///
/// Shared by every backend so they agree on insert/update semantics.
pub fn check_expected(
    entity: &str,
    stored: Option<u32>,
    expected: Option<u32>,
) -> Result<(), StoreError> {
    match (stored, expected) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(StoreError::Duplicate(entity.to_string())),
        (None, Some(_)) => Err(StoreError::NotFound(entity.to_string())),
        (Some(found), Some(expected)) if found != expected => Err(StoreError::Conflict {
            entity: entity.to_string(),
            expected,
            found,
        }),
        (Some(_), Some(_)) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_requires_absence() {
        assert!(check_expected("t", None, None).is_ok());
        assert!(matches!(
            check_expected("t", Some(1), None),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn update_requires_matching_version() {
        assert!(check_expected("t", Some(3), Some(3)).is_ok());
        assert!(matches!(
            check_expected("t", Some(4), Some(3)),
            Err(StoreError::Conflict { expected: 3, found: 4, .. })
        ));
        assert!(check_expected("t", None, Some(3)).unwrap_err().is_not_found());
    }
}
