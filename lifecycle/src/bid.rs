//! Bid lifecycle: submission, author edits and visibility.

use procura_store::{BidFilter, BidPredicate, ProcurementStore};
use procura_types::bid::quorum_for;
use procura_types::{Bid, BidId, BidPatch, BidStatus, NewBid, Pagination, Tender, TenderId};

use crate::permission::{PermissionGate, Principal};
use crate::snapshot::SnapshotLog;
use crate::{validation, Context, LifecycleError};

pub struct BidLifecycle<'a, S> {
    cx: Context<'a, S>,
}

impl<'a, S: ProcurementStore> BidLifecycle<'a, S> {
    pub fn new(cx: Context<'a, S>) -> Self {
        Self { cx }
    }

    fn gate(&self) -> PermissionGate<'a, S> {
        PermissionGate::new(self.cx.store, self.cx.deadline)
    }

    fn log(&self) -> SnapshotLog<'a, S> {
        SnapshotLog::new(self.cx.store, self.cx.deadline)
    }

    /// Load the bid and require `username` to be one of its authors.
    pub(crate) fn authorize_author(
        &self,
        username: &str,
        id: &BidId,
    ) -> Result<(Bid, Principal), LifecycleError> {
        let gate = self.gate();
        let bid = gate.bid(id)?;
        let principal = gate.resolve_principal(username)?;
        if !principal.is_author_of(&bid) {
            tracing::debug!(bid = %id, username, "bid author check failed");
            return Err(LifecycleError::BidDenied);
        }
        Ok((bid, principal))
    }

    /// Load the bid and its tender, and require `username` to control the tender.
    pub(crate) fn authorize_tender_owner(
        &self,
        username: &str,
        id: &BidId,
        denied: LifecycleError,
    ) -> Result<(Bid, Tender, Principal), LifecycleError> {
        let gate = self.gate();
        let bid = gate.bid(id)?;
        let tender = gate.tender(&bid.tender_id)?;
        let principal = gate.resolve_principal(username)?;
        if !principal.controls(&tender.organization_id) {
            tracing::debug!(bid = %id, tender = %tender.id, username, "tender owner check failed");
            return Err(denied);
        }
        Ok((bid, tender, principal))
    }

    /// Submit a bid on a published tender. The quorum is fixed here from the
    /// tender organization's current responsible users.
    pub fn create(&self, new: NewBid) -> Result<Bid, LifecycleError> {
        validation::content(&new.name, &new.description)?;
        let gate = self.gate();
        let tender = gate.tender(&new.tender_id)?;
        if !tender.status.accepts_bids() {
            return Err(LifecycleError::TenderNotPublished);
        }
        let quorum = quorum_for(gate.responsible_count(&tender.organization_id)?);
        gate.resolve_author(&new.author)?;

        let bid = Bid::create(BidId::new(), new, quorum, self.cx.clock.now());
        self.log().commit_bid(&bid, None)?;
        tracing::info!(
            bid = %bid.id,
            tender = %bid.tender_id,
            author = %bid.author.raw_id(),
            quorum,
            "bid created"
        );
        Ok(bid)
    }

    pub fn patch(&self, username: &str, id: &BidId, patch: &BidPatch) -> Result<Bid, LifecycleError> {
        if let Some(name) = &patch.name {
            validation::name(name)?;
        }
        if let Some(description) = &patch.description {
            validation::description(description)?;
        }
        let (bid, _) = self.authorize_author(username, id)?;
        let next = bid.patched(patch);
        self.log().commit_bid(&next, Some(bid.version))?;
        tracing::info!(bid = %id, version = next.version, "bid patched");
        Ok(next)
    }

    /// Authors always see the real status. The tender owner sees only `Published`.
    pub fn status(&self, username: &str, id: &BidId) -> Result<BidStatus, LifecycleError> {
        let gate = self.gate();
        let bid = gate.bid(id)?;
        let principal = gate.resolve_principal(username)?;
        if principal.is_author_of(&bid) {
            return Ok(bid.status);
        }
        let tender = gate.tender(&bid.tender_id)?;
        if principal.controls(&tender.organization_id) && bid.status == BidStatus::Published {
            return Ok(bid.status);
        }
        Err(LifecycleError::BidDenied)
    }

    pub fn update_status(
        &self,
        username: &str,
        id: &BidId,
        status: BidStatus,
    ) -> Result<Bid, LifecycleError> {
        if !status.settable_by_author() {
            return Err(LifecycleError::Validation(format!(
                "status {status} cannot be set directly"
            )));
        }
        let (bid, _) = self.authorize_author(username, id)?;
        let next = bid.with_status(status);
        self.log().commit_bid(&next, Some(bid.version))?;
        tracing::info!(bid = %id, from = %bid.status, to = %status, version = next.version, "bid status changed");
        Ok(next)
    }

    /// Bids authored by `username` or by any organization they are responsible for.
    pub fn list_mine(&self, username: &str, page: Pagination) -> Result<Vec<Bid>, LifecycleError> {
        let principal = self.gate().resolve_principal(username)?;
        self.cx.deadline.check()?;
        Ok(self
            .cx
            .store
            .list_bids(&BidFilter::authored_by(principal.authors()), page)?)
    }

    /// Bids on one tender: the caller's own, plus published ones when the caller
    /// owns the tender. An empty page is reported as a denial.
    pub fn list_for_tender(
        &self,
        username: &str,
        tender_id: &TenderId,
        page: Pagination,
    ) -> Result<Vec<Bid>, LifecycleError> {
        let gate = self.gate();
        let tender = gate.tender(tender_id)?;
        let principal = gate.resolve_principal(username)?;

        let mut filter = BidFilter::authored_by(principal.authors()).on_tender(tender.id);
        if principal.controls(&tender.organization_id) {
            filter = filter.or(BidPredicate::StatusIs(BidStatus::Published));
        }
        self.cx.deadline.check()?;
        let bids = self.cx.store.list_bids(&filter, page)?;
        if bids.is_empty() {
            return Err(LifecycleError::BidsOfTenderDenied);
        }
        Ok(bids)
    }

    pub fn versions(&self, username: &str, id: &BidId) -> Result<Vec<u32>, LifecycleError> {
        self.authorize_author(username, id)?;
        self.log().bid_versions(id)
    }
}
