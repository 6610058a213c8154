//! Tender lifecycle: create, status changes, patches and listings.

use std::str::FromStr;

use procura_store::{ProcurementStore, TenderFilter};
use procura_types::{
    NewTender, Pagination, ServiceType, Tender, TenderId, TenderPatch, TenderStatus,
};
use serde::{Deserialize, Serialize};

use crate::permission::{PermissionGate, Principal};
use crate::snapshot::SnapshotLog;
use crate::{validation, Context, LifecycleError};

/// Which tender status changes an owner may request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any recognised status may follow any other.
    #[default]
    Permissive,
    /// No moving backwards in `Created < Published < Closed`.
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn permits(&self, from: TenderStatus, to: TenderStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::ForwardOnly => to.rank() >= from.rank(),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permissive" => Ok(Self::Permissive),
            "forward_only" => Ok(Self::ForwardOnly),
            other => Err(format!(
                "unknown transition policy '{other}', expected permissive or forward_only"
            )),
        }
    }
}

pub struct TenderLifecycle<'a, S> {
    cx: Context<'a, S>,
}

impl<'a, S: ProcurementStore> TenderLifecycle<'a, S> {
    pub fn new(cx: Context<'a, S>) -> Self {
        Self { cx }
    }

    fn gate(&self) -> PermissionGate<'a, S> {
        PermissionGate::new(self.cx.store, self.cx.deadline)
    }

    fn log(&self) -> SnapshotLog<'a, S> {
        SnapshotLog::new(self.cx.store, self.cx.deadline)
    }

    /// Load the tender and require `username` to control its organization.
    pub(crate) fn authorize(
        &self,
        username: &str,
        id: &TenderId,
    ) -> Result<(Tender, Principal), LifecycleError> {
        let gate = self.gate();
        let tender = gate.tender(id)?;
        let principal = gate.resolve_principal(username)?;
        if !principal.controls(&tender.organization_id) {
            tracing::debug!(tender = %id, username, "tender access denied");
            return Err(LifecycleError::TenderDenied);
        }
        Ok((tender, principal))
    }

    pub fn create(&self, username: &str, new: NewTender) -> Result<Tender, LifecycleError> {
        validation::content(&new.name, &new.description)?;
        let principal = self.gate().resolve_principal(username)?;
        if !principal.controls(&new.organization_id) {
            tracing::debug!(org = %new.organization_id, username, "tender creation denied");
            return Err(LifecycleError::CreateTenderDenied);
        }

        let tender = Tender::create(TenderId::new(), new, self.cx.clock.now());
        self.log().commit_tender(&tender, None)?;
        tracing::info!(
            tender = %tender.id,
            org = %tender.organization_id,
            username,
            "tender created"
        );
        Ok(tender)
    }

    pub fn set_status(
        &self,
        username: &str,
        id: &TenderId,
        status: TenderStatus,
    ) -> Result<Tender, LifecycleError> {
        let (tender, _) = self.authorize(username, id)?;
        if !self.cx.policy.permits(tender.status, status) {
            return Err(LifecycleError::InvalidTransition {
                from: tender.status,
                to: status,
            });
        }
        let next = tender.with_status(status);
        self.log().commit_tender(&next, Some(tender.version))?;
        tracing::info!(tender = %id, from = %tender.status, to = %status, version = next.version, "tender status changed");
        Ok(next)
    }

    pub fn publish(&self, username: &str, id: &TenderId) -> Result<Tender, LifecycleError> {
        self.set_status(username, id, TenderStatus::Published)
    }

    pub fn patch(
        &self,
        username: &str,
        id: &TenderId,
        patch: &TenderPatch,
    ) -> Result<Tender, LifecycleError> {
        if let Some(name) = &patch.name {
            validation::name(name)?;
        }
        if let Some(description) = &patch.description {
            validation::description(description)?;
        }
        let (tender, _) = self.authorize(username, id)?;
        let next = tender.patched(patch);
        self.log().commit_tender(&next, Some(tender.version))?;
        tracing::info!(tender = %id, version = next.version, "tender patched");
        Ok(next)
    }

    /// Public for published tenders; otherwise only the owning organization may look.
    pub fn status(&self, username: &str, id: &TenderId) -> Result<TenderStatus, LifecycleError> {
        let tender = self.gate().tender(id)?;
        if tender.status == TenderStatus::Published {
            return Ok(tender.status);
        }
        if username.is_empty() {
            return Err(LifecycleError::UserNotSpecified);
        }
        let principal = self.gate().resolve_principal(username)?;
        if !principal.controls(&tender.organization_id) {
            return Err(LifecycleError::TenderDenied);
        }
        Ok(tender.status)
    }

    /// Close the tender on behalf of the quorum. Returns `None` when it was already
    /// closed. Bypasses the transition policy.
    pub(crate) fn close_for_quorum(&self, id: &TenderId) -> Result<Option<Tender>, LifecycleError> {
        let tender = self.gate().tender(id)?;
        if tender.status == TenderStatus::Closed {
            return Ok(None);
        }
        let next = tender.with_status(TenderStatus::Closed);
        self.log().commit_tender(&next, Some(tender.version))?;
        tracing::info!(tender = %id, version = next.version, "tender closed by quorum");
        Ok(Some(next))
    }

    /// Published tenders, optionally restricted to some service types.
    pub fn list_published(
        &self,
        service_types: Vec<ServiceType>,
        page: Pagination,
    ) -> Result<Vec<Tender>, LifecycleError> {
        self.cx.deadline.check()?;
        Ok(self
            .cx
            .store
            .list_tenders(&TenderFilter::published(service_types), page)?)
    }

    /// Tenders owned by the organizations `username` is responsible for.
    pub fn list_mine(&self, username: &str, page: Pagination) -> Result<Vec<Tender>, LifecycleError> {
        let principal = self.gate().resolve_principal(username)?;
        self.cx.deadline.check()?;
        Ok(self
            .cx
            .store
            .list_tenders(&TenderFilter::owned_by(principal.organizations), page)?)
    }

    pub fn versions(&self, username: &str, id: &TenderId) -> Result<Vec<u32>, LifecycleError> {
        self.authorize(username, id)?;
        self.log().tender_versions(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_only_rejects_regressions() {
        let policy = TransitionPolicy::ForwardOnly;
        assert!(policy.permits(TenderStatus::Created, TenderStatus::Published));
        assert!(policy.permits(TenderStatus::Published, TenderStatus::Closed));
        assert!(policy.permits(TenderStatus::Created, TenderStatus::Closed));
        assert!(!policy.permits(TenderStatus::Closed, TenderStatus::Published));
        assert!(!policy.permits(TenderStatus::Published, TenderStatus::Created));
    }

    #[test]
    fn permissive_accepts_anything() {
        for from in TenderStatus::ALL {
            for to in TenderStatus::ALL {
                assert!(TransitionPolicy::Permissive.permits(from, to));
            }
        }
    }

    #[test]
    fn policy_parses_config_names() {
        assert_eq!(
            "forward_only".parse::<TransitionPolicy>(),
            Ok(TransitionPolicy::ForwardOnly)
        );
        assert!("strict".parse::<TransitionPolicy>().is_err());
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;
    use crate::fixtures::{new_tender, World};

    #[test]
    fn create_starts_at_version_one() {
        let world = World::new();
        let alice = world.user("alice");
        let org = world.org(&[alice]);
        let tender = TenderLifecycle::new(world.cx())
            .create("alice", new_tender("Roads", org))
            .unwrap();
        assert_eq!(tender.version, 1);
        assert_eq!(tender.status, TenderStatus::Created);
        assert_eq!(tender.created_at, world.clock_now());
    }

    #[test]
    fn create_for_foreign_org_is_denied() {
        let world = World::new();
        world.user("alice");
        let bob = world.user("bob");
        let org = world.org(&[bob]);
        assert_eq!(
            TenderLifecycle::new(world.cx()).create("alice", new_tender("Roads", org)),
            Err(LifecycleError::CreateTenderDenied)
        );
        assert_eq!(
            TenderLifecycle::new(world.cx()).create("nobody", new_tender("Roads", org)),
            Err(LifecycleError::UserNotFound)
        );
    }

    #[test]
    fn status_is_public_only_once_published() {
        let world = World::new();
        let alice = world.user("alice");
        world.user("bob");
        let org = world.org(&[alice]);
        let tenders = TenderLifecycle::new(world.cx());
        let tender = tenders.create("alice", new_tender("Roads", org)).unwrap();

        assert_eq!(tenders.status("", &tender.id), Err(LifecycleError::UserNotSpecified));
        assert_eq!(tenders.status("bob", &tender.id), Err(LifecycleError::TenderDenied));
        assert_eq!(tenders.status("alice", &tender.id), Ok(TenderStatus::Created));

        tenders.publish("alice", &tender.id).unwrap();
        assert_eq!(tenders.status("", &tender.id), Ok(TenderStatus::Published));
    }

    #[test]
    fn patch_bumps_version_and_keeps_unset_fields() {
        let world = World::new();
        let alice = world.user("alice");
        let org = world.org(&[alice]);
        let tenders = TenderLifecycle::new(world.cx());
        let tender = tenders.create("alice", new_tender("Roads", org)).unwrap();
        let patched = tenders
            .patch(
                "alice",
                &tender.id,
                &TenderPatch {
                    name: Some("Bridges".into()),
                    ..TenderPatch::default()
                },
            )
            .unwrap();
        assert_eq!(patched.version, 2);
        assert_eq!(patched.name, "Bridges");
        assert_eq!(patched.description, tender.description);
        assert_eq!(tenders.versions("alice", &tender.id).unwrap(), vec![1, 2]);
    }

    #[test]
    fn oversized_patch_is_rejected_before_lookup() {
        let world = World::new();
        let result = TenderLifecycle::new(world.cx()).patch(
            "alice",
            &TenderId::new(),
            &TenderPatch {
                name: Some("x".repeat(101)),
                ..TenderPatch::default()
            },
        );
        assert!(matches!(result, Err(LifecycleError::Validation(_))));
    }

    #[test]
    fn forward_only_policy_blocks_reopening() {
        let mut world = World::new();
        world.policy = TransitionPolicy::ForwardOnly;
        let alice = world.user("alice");
        let org = world.org(&[alice]);
        let tenders = TenderLifecycle::new(world.cx());
        let tender = tenders.create("alice", new_tender("Roads", org)).unwrap();
        tenders
            .set_status("alice", &tender.id, TenderStatus::Closed)
            .unwrap();
        assert_eq!(
            tenders.set_status("alice", &tender.id, TenderStatus::Published),
            Err(LifecycleError::InvalidTransition {
                from: TenderStatus::Closed,
                to: TenderStatus::Published,
            })
        );
    }

    #[test]
    fn listings_filter_by_visibility() {
        let world = World::new();
        let alice = world.user("alice");
        let org = world.org(&[alice]);
        let tenders = TenderLifecycle::new(world.cx());
        let draft = tenders.create("alice", new_tender("B draft", org)).unwrap();
        let open = tenders.create("alice", new_tender("A open", org)).unwrap();
        tenders.publish("alice", &open.id).unwrap();

        let public = tenders.list_published(vec![], Pagination::default()).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, open.id);
        assert!(tenders
            .list_published(vec![ServiceType::Delivery], Pagination::default())
            .unwrap()
            .is_empty());

        let mine = tenders.list_mine("alice", Pagination::default()).unwrap();
        let ids: Vec<_> = mine.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![open.id, draft.id]);
    }

    #[test]
    fn closing_twice_is_a_no_op() {
        let world = World::new();
        let alice = world.user("alice");
        let org = world.org(&[alice]);
        let tenders = TenderLifecycle::new(world.cx());
        let tender = tenders.create("alice", new_tender("Roads", org)).unwrap();
        assert!(tenders.close_for_quorum(&tender.id).unwrap().is_some());
        assert!(tenders.close_for_quorum(&tender.id).unwrap().is_none());
    }
}
