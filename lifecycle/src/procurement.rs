//! Long-lived service handle that hands out per-request engines.

use std::sync::Arc;

use procura_store::ProcurementStore;
use procura_types::Clock;

use crate::{
    BidLifecycle, Context, Deadline, FeedbackGate, PermissionGate, QuorumEngine, RollbackEngine,
    TenderLifecycle, TransitionPolicy,
};

pub struct Procurement<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    policy: TransitionPolicy,
}

impl<S> Clone for Procurement<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<S: ProcurementStore> Procurement<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: TransitionPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn context(&self, deadline: Deadline) -> Context<'_, S> {
        Context {
            store: &self.store,
            clock: self.clock.as_ref(),
            deadline,
            policy: self.policy,
        }
    }

    pub fn tenders(&self, deadline: Deadline) -> TenderLifecycle<'_, S> {
        TenderLifecycle::new(self.context(deadline))
    }

    pub fn bids(&self, deadline: Deadline) -> BidLifecycle<'_, S> {
        BidLifecycle::new(self.context(deadline))
    }

    pub fn quorum(&self, deadline: Deadline) -> QuorumEngine<'_, S> {
        QuorumEngine::new(self.context(deadline))
    }

    pub fn rollback(&self, deadline: Deadline) -> RollbackEngine<'_, S> {
        RollbackEngine::new(self.context(deadline))
    }

    pub fn feedback(&self, deadline: Deadline) -> FeedbackGate<'_, S> {
        FeedbackGate::new(self.context(deadline))
    }

    pub fn gate(&self, deadline: Deadline) -> PermissionGate<'_, S> {
        PermissionGate::new(&self.store, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::new_tender;
    use crate::LifecycleError;
    use procura_nullables::{NullClock, NullStore};
    use procura_store::DirectoryStore;
    use procura_types::{Organization, OrganizationId, OrganizationKind, Timestamp, User, UserId};
    use std::time::{Duration, Instant};

    fn service() -> (Procurement<NullStore>, OrganizationId) {
        let store = Arc::new(NullStore::new());
        let user = User {
            id: UserId::new(),
            username: "alice".into(),
            first_name: "Alice".into(),
            last_name: String::new(),
            created_at: Timestamp::epoch(),
        };
        let org = Organization {
            id: OrganizationId::new(),
            name: "Acme".into(),
            description: String::new(),
            kind: OrganizationKind::IE,
            created_at: Timestamp::epoch(),
        };
        store.put_user(&user).unwrap();
        store.put_organization(&org).unwrap();
        store.put_responsible(&org.id, &user.id).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(NullClock::new(1_000));
        (
            Procurement::new(store, clock, TransitionPolicy::default()),
            org.id,
        )
    }

    #[test]
    fn engines_share_one_store() {
        let (svc, org) = service();
        let tender = svc
            .tenders(Deadline::none())
            .create("alice", new_tender("Roads", org))
            .unwrap();
        assert_eq!(tender.created_at, Timestamp::from_secs(1_000));
        let clone = svc.clone();
        assert_eq!(
            clone.tenders(Deadline::none()).status("alice", &tender.id),
            Ok(procura_types::TenderStatus::Created)
        );
    }

    #[test]
    fn expired_deadline_fails_fast() {
        let (svc, org) = service();
        let expired = Deadline::at(Instant::now() - Duration::from_millis(5));
        assert_eq!(
            svc.tenders(expired).create("alice", new_tender("Roads", org)),
            Err(LifecycleError::DeadlineExceeded)
        );
    }
}
