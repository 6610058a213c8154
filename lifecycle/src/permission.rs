//! Permission gate: who is calling and what do they control.

use std::collections::BTreeSet;

use procura_store::ProcurementStore;
use procura_types::{
    Author, Bid, BidId, Organization, OrganizationId, Tender, TenderId, User, UserId,
};

use crate::error::OrNotFound;
use crate::{Deadline, LifecycleError};

/// A resolved caller: the user and the organizations they are responsible for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user: User,
    pub organizations: BTreeSet<OrganizationId>,
}

/// Pure membership test.
pub fn controls(organizations: &BTreeSet<OrganizationId>, org: &OrganizationId) -> bool {
    organizations.contains(org)
}

impl Principal {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn controls(&self, org: &OrganizationId) -> bool {
        controls(&self.organizations, org)
    }

    /// Every author identity this principal may act as.
    pub fn authors(&self) -> BTreeSet<Author> {
        std::iter::once(Author::User(self.user.id))
            .chain(self.organizations.iter().copied().map(Author::Organization))
            .collect()
    }

    pub fn is_author_of(&self, bid: &Bid) -> bool {
        match bid.author {
            Author::User(id) => id == self.user.id,
            Author::Organization(org) => self.controls(&org),
        }
    }
}

/// Resolves usernames and entities, checking the deadline before every store call.
pub struct PermissionGate<'a, S> {
    store: &'a S,
    deadline: Deadline,
}

impl<'a, S: ProcurementStore> PermissionGate<'a, S> {
    pub fn new(store: &'a S, deadline: Deadline) -> Self {
        Self { store, deadline }
    }

    pub fn resolve_principal(&self, username: &str) -> Result<Principal, LifecycleError> {
        self.deadline.check()?;
        let user = self
            .store
            .user_by_username(username)
            .or_not_found(LifecycleError::UserNotFound)?;
        self.deadline.check()?;
        let organizations = self.store.organizations_of(&user.id)?.into_iter().collect();
        Ok(Principal {
            user,
            organizations,
        })
    }

    pub fn tender(&self, id: &TenderId) -> Result<Tender, LifecycleError> {
        self.deadline.check()?;
        self.store
            .get_tender(id)
            .or_not_found(LifecycleError::TenderNotFound)
    }

    pub fn bid(&self, id: &BidId) -> Result<Bid, LifecycleError> {
        self.deadline.check()?;
        self.store.get_bid(id).or_not_found(LifecycleError::BidNotFound)
    }

    pub fn user(&self, id: &UserId) -> Result<User, LifecycleError> {
        self.deadline.check()?;
        self.store.get_user(id).or_not_found(LifecycleError::UserNotFound)
    }

    pub fn organization(&self, id: &OrganizationId) -> Result<Organization, LifecycleError> {
        self.deadline.check()?;
        self.store
            .get_organization(id)
            .or_not_found(LifecycleError::OrganizationNotFound)
    }

    pub fn responsible_count(&self, org: &OrganizationId) -> Result<usize, LifecycleError> {
        self.deadline.check()?;
        Ok(self.store.responsible_users(org)?.len())
    }

    /// Make sure a bid author exists, dispatching on its tag.
    pub fn resolve_author(&self, author: &Author) -> Result<(), LifecycleError> {
        match author {
            Author::User(id) => self.user(id).map(|_| ()),
            Author::Organization(id) => self.organization(id).map(|_| ()),
        }
    }

    /// Does `username` control the organization that owns `tender`?
    pub fn controls_tender(&self, username: &str, tender: &TenderId) -> Result<bool, LifecycleError> {
        let tender = self.tender(tender)?;
        let principal = self.resolve_principal(username)?;
        Ok(principal.controls(&tender.organization_id))
    }
}
