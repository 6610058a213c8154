//! Reviews on bids, and who may read them.

use procura_store::{BidFilter, ProcurementStore};
use procura_types::{Bid, BidId, Feedback, FeedbackId, Pagination, TenderId};

use crate::bid::BidLifecycle;
use crate::permission::PermissionGate;
use crate::{validation, Context, LifecycleError};

pub struct FeedbackGate<'a, S> {
    cx: Context<'a, S>,
}

impl<'a, S: ProcurementStore> FeedbackGate<'a, S> {
    pub fn new(cx: Context<'a, S>) -> Self {
        Self { cx }
    }

    /// Leave a review on a bid. Only the tender owner may, and only once the bid has
    /// gathered its quorum of endorsements.
    pub fn feedback_bid(&self, username: &str, bid_id: &BidId, text: &str) -> Result<Bid, LifecycleError> {
        validation::required("bidFeedback", text)?;
        let (bid, _, _) = BidLifecycle::new(self.cx).authorize_tender_owner(
            username,
            bid_id,
            LifecycleError::BidDenied,
        )?;
        if !bid.quorum_reached() {
            return Err(LifecycleError::ReviewNotAllowed);
        }

        let feedback = Feedback {
            id: FeedbackId::new(),
            bid_id: bid.id,
            description: text.to_string(),
            created_at: self.cx.clock.now(),
        };
        self.cx.deadline.check()?;
        self.cx.store.insert_feedback(&feedback)?;
        tracing::info!(bid = %bid_id, feedback = %feedback.id, username, "feedback recorded");
        Ok(bid)
    }

    /// Reviews left on any bid by `author_username`, as seen by the owner of a tender
    /// that author has bid on.
    pub fn list_feedback(
        &self,
        tender_id: &TenderId,
        author_username: &str,
        requester_username: &str,
        page: Pagination,
    ) -> Result<Vec<Feedback>, LifecycleError> {
        let gate = PermissionGate::new(self.cx.store, self.cx.deadline);
        let tender = gate.tender(tender_id)?;
        let requester = gate.resolve_principal(requester_username)?;
        if !requester.controls(&tender.organization_id) {
            return Err(LifecycleError::TenderDenied);
        }
        let author = gate.resolve_principal(author_username)?;

        self.cx.deadline.check()?;
        let bids = self
            .cx
            .store
            .matching_bids(&BidFilter::authored_by(author.authors()))?;
        if !bids.iter().any(|b| b.tender_id == *tender_id) {
            tracing::debug!(tender = %tender_id, author = author_username, "author has no bid on tender");
            return Err(LifecycleError::NoFeedbackAccess);
        }

        let ids: Vec<BidId> = bids.iter().map(|b| b.id).collect();
        self.cx.deadline.check()?;
        Ok(self.cx.store.list_feedback(&ids, page)?)
    }
}
