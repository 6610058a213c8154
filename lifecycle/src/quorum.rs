//! Decisions on published bids and quorum-driven tender closure.

use procura_store::{ProcurementStore, StoreError};
use procura_types::{Bid, BidId, Decision};

use crate::bid::BidLifecycle;
use crate::snapshot::SnapshotLog;
use crate::tender::TenderLifecycle;
use crate::{Context, LifecycleError};

/// What a decision did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub bid: Bid,
    pub quorum_reached: bool,
    /// True only for the decision that actually closed the tender.
    pub tender_closed: bool,
}

pub struct QuorumEngine<'a, S> {
    cx: Context<'a, S>,
}

impl<'a, S: ProcurementStore> QuorumEngine<'a, S> {
    pub fn new(cx: Context<'a, S>) -> Self {
        Self { cx }
    }

    /// A tender owner approves or rejects a published bid.
    ///
    /// Rejection cancels the bid and clears its endorsements. Approval records one
    /// endorsement per user; once the bid reaches its quorum the tender is closed.
    /// The bid itself stays `Published`.
    pub fn submit_decision(
        &self,
        username: &str,
        bid_id: &BidId,
        decision: Decision,
    ) -> Result<DecisionOutcome, LifecycleError> {
        let (bid, tender, principal) = BidLifecycle::new(self.cx).authorize_tender_owner(
            username,
            bid_id,
            LifecycleError::ShipBidDenied,
        )?;
        if !bid.status.accepts_decisions() {
            return Err(LifecycleError::BidNotPublished);
        }

        match decision {
            Decision::Rejected => {
                let next = bid.rejected();
                SnapshotLog::new(self.cx.store, self.cx.deadline)
                    .commit_rejection(&next, bid.version)?;
                tracing::info!(bid = %bid_id, username, version = next.version, "bid rejected");
                Ok(DecisionOutcome {
                    bid: next,
                    quorum_reached: false,
                    tender_closed: false,
                })
            }
            Decision::Approved => {
                self.cx.deadline.check()?;
                let outcome = self
                    .cx
                    .store
                    .record_endorsement(bid_id, &principal.id())
                    .map_err(|e| match e {
                        StoreError::InvalidState(_) => LifecycleError::BidNotPublished,
                        StoreError::NotFound(_) => LifecycleError::BidNotFound,
                        other => other.into(),
                    })?;
                tracing::info!(
                    bid = %bid_id,
                    username,
                    recorded = outcome.recorded,
                    count = outcome.count,
                    quorum = bid.quorum,
                    "bid approved"
                );

                let bid = Bid {
                    endorsement_count: outcome.count,
                    ..bid
                };
                let quorum_reached = bid.quorum_reached();
                let mut tender_closed = false;
                if quorum_reached {
                    tracing::info!(bid = %bid_id, tender = %tender.id, "quorum reached");
                    tender_closed = TenderLifecycle::new(self.cx)
                        .close_for_quorum(&tender.id)?
                        .is_some();
                }
                Ok(DecisionOutcome {
                    bid,
                    quorum_reached,
                    tender_closed,
                })
            }
        }
    }
}
