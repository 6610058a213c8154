//! Restore entity content from an earlier snapshot as a new version.

use procura_store::ProcurementStore;
use procura_types::{Bid, BidId, Tender, TenderId};

use crate::bid::BidLifecycle;
use crate::snapshot::SnapshotLog;
use crate::tender::TenderLifecycle;
use crate::{Context, LifecycleError};

pub struct RollbackEngine<'a, S> {
    cx: Context<'a, S>,
}

impl<'a, S: ProcurementStore> RollbackEngine<'a, S> {
    pub fn new(cx: Context<'a, S>) -> Self {
        Self { cx }
    }

    fn log(&self) -> SnapshotLog<'a, S> {
        SnapshotLog::new(self.cx.store, self.cx.deadline)
    }

    /// The current status is kept; history is never rewritten.
    pub fn rollback_tender(
        &self,
        username: &str,
        id: &TenderId,
        version: u32,
    ) -> Result<Tender, LifecycleError> {
        let (tender, _) = TenderLifecycle::new(self.cx).authorize(username, id)?;
        let snapshot = self.log().fetch_tender_version(id, version)?;
        let next = tender.restored_from(&snapshot);
        self.log().commit_tender(&next, Some(tender.version))?;
        tracing::info!(tender = %id, from = version, version = next.version, "tender rolled back");
        Ok(next)
    }

    /// Status and endorsement count stay as they are.
    pub fn rollback_bid(&self, username: &str, id: &BidId, version: u32) -> Result<Bid, LifecycleError> {
        let (bid, _) = BidLifecycle::new(self.cx).authorize_author(username, id)?;
        let snapshot = self.log().fetch_bid_version(id, version)?;
        let next = bid.restored_from(&snapshot);
        self.log().commit_bid(&next, Some(bid.version))?;
        tracing::info!(bid = %id, from = version, version = next.version, "bid rolled back");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{new_bid, new_tender, World};
    use procura_types::{Author, BidPatch, BidStatus, TenderPatch, TenderStatus};

    #[test]
    fn tender_rollback_restores_content_not_status() {
        let world = World::new();
        let alice = world.user("alice");
        let org = world.org(&[alice]);
        let tenders = TenderLifecycle::new(world.cx());
        let tender = tenders.create("alice", new_tender("Roads", org)).unwrap();
        tenders
            .patch(
                "alice",
                &tender.id,
                &TenderPatch {
                    name: Some("Bridges".into()),
                    ..TenderPatch::default()
                },
            )
            .unwrap();
        tenders.publish("alice", &tender.id).unwrap();

        let restored = RollbackEngine::new(world.cx())
            .rollback_tender("alice", &tender.id, 1)
            .unwrap();
        assert_eq!(restored.name, "Roads");
        assert_eq!(restored.status, TenderStatus::Published);
        assert_eq!(restored.version, 4);
        assert_eq!(tenders.versions("alice", &tender.id).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn unknown_version_is_reported() {
        let world = World::new();
        let alice = world.user("alice");
        let org = world.org(&[alice]);
        let tender = TenderLifecycle::new(world.cx())
            .create("alice", new_tender("Roads", org))
            .unwrap();
        assert_eq!(
            RollbackEngine::new(world.cx()).rollback_tender("alice", &tender.id, 7),
            Err(LifecycleError::TenderVersionNotFound)
        );
    }

    #[test]
    fn bid_rollback_requires_author() {
        let world = World::new();
        let alice = world.user("alice");
        let bob = world.user("bob");
        let org = world.org(&[alice]);
        let tenders = TenderLifecycle::new(world.cx());
        let tender = tenders.create("alice", new_tender("Roads", org)).unwrap();
        tenders.publish("alice", &tender.id).unwrap();
        let bids = BidLifecycle::new(world.cx());
        let bid = bids
            .create(new_bid("Offer", tender.id, Author::User(bob)))
            .unwrap();
        bids.patch(
            "bob",
            &bid.id,
            &BidPatch {
                name: None,
                description: Some("revised".into()),
            },
        )
        .unwrap();
        bids.update_status("bob", &bid.id, BidStatus::Published).unwrap();

        let engine = RollbackEngine::new(world.cx());
        assert_eq!(
            engine.rollback_bid("alice", &bid.id, 1),
            Err(LifecycleError::BidDenied)
        );
        let restored = engine.rollback_bid("bob", &bid.id, 1).unwrap();
        assert_eq!(restored.description, bid.description);
        assert_eq!(restored.status, BidStatus::Published);
        assert_eq!(restored.version, 4);
    }
}
