//! Bids, their committed snapshots and the quorum cap.

use serde::{Deserialize, Serialize};

use crate::ids::{BidId, TenderId};
use crate::state::{Author, BidStatus};
use crate::time::Timestamp;

/// Upper bound on the number of endorsements a bid ever needs.
pub const MAX_QUORUM: u32 = 3;

/// Quorum threshold for a tender whose organization has `responsible` users.
pub fn quorum_for(responsible: usize) -> u32 {
    u32::try_from(responsible).unwrap_or(u32::MAX).min(MAX_QUORUM)
}

/// A bid competing for a tender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub tender_id: TenderId,
    pub author: Author,
    pub version: u32,
    /// Distinct endorsements recorded while published. Owned by the endorsement set.
    pub endorsement_count: u32,
    /// Fixed at creation.
    pub quorum: u32,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBid {
    pub name: String,
    pub description: String,
    pub tender_id: TenderId,
    pub author: Author,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BidPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl BidPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Immutable copy of a bid at one committed version.
///
/// `status` and `endorsement_count` are informational: rollback never restores them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidSnapshot {
    pub bid_id: BidId,
    pub version: u32,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub tender_id: TenderId,
    pub author: Author,
    pub endorsement_count: u32,
    pub quorum: u32,
    pub created_at: Timestamp,
}

impl Bid {
    pub fn create(id: BidId, new: NewBid, quorum: u32, created_at: Timestamp) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            status: BidStatus::Created,
            tender_id: new.tender_id,
            author: new.author,
            version: 1,
            endorsement_count: 0,
            quorum,
            created_at,
        }
    }

    pub fn snapshot(&self) -> BidSnapshot {
        BidSnapshot {
            bid_id: self.id,
            version: self.version,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            tender_id: self.tender_id,
            author: self.author,
            endorsement_count: self.endorsement_count,
            quorum: self.quorum,
            created_at: self.created_at,
        }
    }

    pub fn quorum_reached(&self) -> bool {
        self.endorsement_count >= self.quorum
    }

    pub fn patched(&self, patch: &BidPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        next.version = self.version.saturating_add(1);
        next
    }

    pub fn with_status(&self, status: BidStatus) -> Self {
        Self {
            status,
            version: self.version.saturating_add(1),
            ..self.clone()
        }
    }

    /// Canceled with every endorsement cleared, as a new version.
    pub fn rejected(&self) -> Self {
        Self {
            status: BidStatus::Canceled,
            endorsement_count: 0,
            version: self.version.saturating_add(1),
            ..self.clone()
        }
    }

    /// Content of `snapshot` on top of the current status and endorsement count.
    pub fn restored_from(&self, snapshot: &BidSnapshot) -> Self {
        Self {
            id: self.id,
            name: snapshot.name.clone(),
            description: snapshot.description.clone(),
            status: self.status,
            tender_id: snapshot.tender_id,
            author: snapshot.author,
            version: self.version.saturating_add(1),
            endorsement_count: self.endorsement_count,
            quorum: self.quorum,
            created_at: self.created_at,
        }
    }
}
