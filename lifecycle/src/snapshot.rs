//! Snapshot log: deadline-checked commits and history reads.

use procura_store::{ProcurementStore, SnapshotId, StoreError};
use procura_types::{Bid, BidId, BidSnapshot, Tender, TenderId, TenderSnapshot};

use crate::error::OrNotFound;
use crate::{Deadline, LifecycleError};

pub struct SnapshotLog<'a, S> {
    store: &'a S,
    deadline: Deadline,
}

/// A duplicate snapshot on update means another writer committed the same version.
fn commit_error(e: StoreError, expected: Option<u32>) -> LifecycleError {
    match e {
        StoreError::Duplicate(_) if expected.is_some() => LifecycleError::VersionConflict,
        other => other.into(),
    }
}

/// An update must move the version forward; the counter saturates at `u32::MAX`.
fn ensure_advances(version: u32, expected: Option<u32>) -> Result<(), LifecycleError> {
    match expected {
        Some(current) if version <= current => Err(LifecycleError::Validation(format!(
            "version limit reached at {current}"
        ))),
        _ => Ok(()),
    }
}

impl<'a, S: ProcurementStore> SnapshotLog<'a, S> {
    pub fn new(store: &'a S, deadline: Deadline) -> Self {
        Self { store, deadline }
    }

    pub fn commit_tender(
        &self,
        tender: &Tender,
        expected: Option<u32>,
    ) -> Result<SnapshotId, LifecycleError> {
        self.deadline.check()?;
        ensure_advances(tender.version, expected)?;
        let id = self
            .store
            .commit_tender(tender, expected)
            .map_err(|e| commit_error(e, expected))?;
        tracing::debug!(snapshot = %id, status = %tender.status, "tender committed");
        Ok(id)
    }

    pub fn commit_bid(&self, bid: &Bid, expected: Option<u32>) -> Result<SnapshotId, LifecycleError> {
        self.deadline.check()?;
        ensure_advances(bid.version, expected)?;
        let id = self
            .store
            .commit_bid(bid, expected)
            .map_err(|e| commit_error(e, expected))?;
        tracing::debug!(snapshot = %id, status = %bid.status, "bid committed");
        Ok(id)
    }

    /// Commit a rejected bid, clearing its endorsements in the same transaction.
    pub fn commit_rejection(&self, bid: &Bid, expected: u32) -> Result<SnapshotId, LifecycleError> {
        self.deadline.check()?;
        ensure_advances(bid.version, Some(expected))?;
        let id = self
            .store
            .reject_bid(bid, expected)
            .map_err(|e| commit_error(e, Some(expected)))?;
        tracing::debug!(snapshot = %id, "bid rejection committed");
        Ok(id)
    }

    pub fn fetch_tender_version(
        &self,
        id: &TenderId,
        version: u32,
    ) -> Result<TenderSnapshot, LifecycleError> {
        self.deadline.check()?;
        self.store
            .fetch_tender_version(id, version)
            .or_not_found(LifecycleError::TenderVersionNotFound)
    }

    pub fn fetch_bid_version(&self, id: &BidId, version: u32) -> Result<BidSnapshot, LifecycleError> {
        self.deadline.check()?;
        self.store
            .fetch_bid_version(id, version)
            .or_not_found(LifecycleError::BidVersionNotFound)
    }

    pub fn tender_versions(&self, id: &TenderId) -> Result<Vec<u32>, LifecycleError> {
        self.deadline.check()?;
        Ok(self.store.tender_versions(id)?)
    }

    pub fn bid_versions(&self, id: &BidId) -> Result<Vec<u32>, LifecycleError> {
        self.deadline.check()?;
        Ok(self.store.bid_versions(id)?)
    }
}
