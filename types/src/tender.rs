//! Tenders and their committed snapshots.

use serde::{Deserialize, Serialize};

use crate::ids::{OrganizationId, TenderId};
use crate::state::{ServiceType, TenderStatus};
use crate::time::Timestamp;

/// A procurement tender owned by an organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tender {
    pub id: TenderId,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub organization_id: OrganizationId,
    /// Starts at 1; grows by exactly 1 per committed mutation.
    pub version: u32,
    pub created_at: Timestamp,
}

/// Fields supplied when a tender is first created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTender {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub organization_id: OrganizationId,
}

/// Partial update of a tender's content fields. `None` leaves a field as is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TenderPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
}

impl TenderPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.service_type.is_none()
    }
}

/// Immutable copy of a tender at one committed version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderSnapshot {
    pub tender_id: TenderId,
    pub version: u32,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub organization_id: OrganizationId,
    pub created_at: Timestamp,
}

impl Tender {
    /// A freshly created tender: version 1, status `Created`.
    pub fn create(id: TenderId, new: NewTender, created_at: Timestamp) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            service_type: new.service_type,
            status: TenderStatus::Created,
            organization_id: new.organization_id,
            version: 1,
            created_at,
        }
    }

    pub fn snapshot(&self) -> TenderSnapshot {
        TenderSnapshot {
            tender_id: self.id,
            version: self.version,
            name: self.name.clone(),
            description: self.description.clone(),
            service_type: self.service_type,
            status: self.status,
            organization_id: self.organization_id,
            created_at: self.created_at,
        }
    }

    /// Apply the non-empty fields of `patch` and advance the version.
    pub fn patched(&self, patch: &TenderPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        if let Some(service_type) = patch.service_type {
            next.service_type = service_type;
        }
        next.version = self.version.saturating_add(1);
        next
    }

    pub fn with_status(&self, status: TenderStatus) -> Self {
        Self {
            status,
            version: self.version.saturating_add(1),
            ..self.clone()
        }
    }

    /// Content of `snapshot` on top of the current status, as a new version.
    pub fn restored_from(&self, snapshot: &TenderSnapshot) -> Self {
        Self {
            id: self.id,
            name: snapshot.name.clone(),
            description: snapshot.description.clone(),
            service_type: snapshot.service_type,
            status: self.status,
            organization_id: snapshot.organization_id,
            version: self.version.saturating_add(1),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tender {
        Tender::create(
            TenderId::new(),
            NewTender {
                name: "Roads".into(),
                description: "Repave the high street".into(),
                service_type: ServiceType::Construction,
                organization_id: OrganizationId::new(),
            },
            Timestamp::from_secs(1_000),
        )
    }

    #[test]
    fn created_tender_starts_at_version_one() {
        let tender = sample();
        assert_eq!(tender.version, 1);
        assert_eq!(tender.status, TenderStatus::Created);
    }

    #[test]
    fn patch_touches_only_given_fields() {
        let tender = sample();
        let next = tender.patched(&TenderPatch {
            description: Some("Repave and paint".into()),
            ..TenderPatch::default()
        });
        assert_eq!(next.name, tender.name);
        assert_eq!(next.description, "Repave and paint");
        assert_eq!(next.version, 2);
    }

    #[test]
    fn restore_keeps_current_status() {
        let original = sample();
        let snapshot = original.snapshot();
        let published = original
            .patched(&TenderPatch {
                name: Some("Bridges".into()),
                ..TenderPatch::default()
            })
            .with_status(TenderStatus::Published);

        let restored = published.restored_from(&snapshot);
        assert_eq!(restored.name, "Roads");
        assert_eq!(restored.status, TenderStatus::Published);
        assert_eq!(restored.version, 4);
    }

    #[test]
    fn version_bump_saturates() {
        let mut tender = sample();
        tender.version = u32::MAX;
        assert_eq!(tender.with_status(TenderStatus::Closed).version, u32::MAX);
    }
}
