//! Seeded in-memory world shared by the unit tests.

use procura_nullables::{NullClock, NullStore};
use procura_store::DirectoryStore;
use procura_types::{
    Author, NewBid, NewTender, Organization, OrganizationId, OrganizationKind, ServiceType,
    Timestamp, User, UserId,
};

use crate::{Context, Deadline, TransitionPolicy};

pub(crate) struct World {
    pub store: NullStore,
    pub clock: NullClock,
    pub policy: TransitionPolicy,
}

impl World {
    pub fn new() -> Self {
        Self {
            store: NullStore::new(),
            clock: NullClock::default(),
            policy: TransitionPolicy::Permissive,
        }
    }

    pub fn cx(&self) -> Context<'_, NullStore> {
        Context {
            store: &self.store,
            clock: &self.clock,
            deadline: Deadline::none(),
            policy: self.policy,
        }
    }

    pub fn clock_now(&self) -> Timestamp {
        procura_types::Clock::now(&self.clock)
    }

    pub fn user(&self, username: &str) -> UserId {
        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            first_name: username.to_string(),
            last_name: String::new(),
            created_at: Timestamp::epoch(),
        };
        self.store.put_user(&user).unwrap();
        user.id
    }

    /// An organization with the given users responsible for it.
    pub fn org(&self, responsible: &[UserId]) -> OrganizationId {
        let org = Organization {
            id: OrganizationId::new(),
            name: "Org".into(),
            description: String::new(),
            kind: OrganizationKind::LLC,
            created_at: Timestamp::epoch(),
        };
        self.store.put_organization(&org).unwrap();
        for user in responsible {
            self.store.put_responsible(&org.id, user).unwrap();
        }
        org.id
    }
}

pub(crate) fn new_tender(name: &str, org: OrganizationId) -> NewTender {
    NewTender {
        name: name.to_string(),
        description: format!("{name} description"),
        service_type: ServiceType::Construction,
        organization_id: org,
    }
}

pub(crate) fn new_bid(name: &str, tender: procura_types::TenderId, author: Author) -> NewBid {
    NewBid {
        name: name.to_string(),
        description: format!("{name} description"),
        tender_id: tender,
        author,
    }
}
