//! Status enums, service categories, decisions and the bid author union.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::ids::{OrganizationId, UserId};

/// Lifecycle status of a tender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenderStatus {
    /// Drafted by its organization; invisible to the public.
    Created,
    /// Open for bids and publicly visible.
    Published,
    /// No longer accepting bids.
    Closed,
}

impl TenderStatus {
    pub const ALL: [TenderStatus; 3] = [Self::Created, Self::Published, Self::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Published => "Published",
            Self::Closed => "Closed",
        }
    }

    /// Position in the nominal `Created -> Published -> Closed` order.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Published => 1,
            Self::Closed => 2,
        }
    }

    pub fn accepts_bids(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Lifecycle status of a bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
    /// Reserved for quorum promotion; never set by the current lifecycle.
    Approved,
}

impl BidStatus {
    pub const ALL: [BidStatus; 4] = [
        Self::Created,
        Self::Published,
        Self::Canceled,
        Self::Approved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Published => "Published",
            Self::Canceled => "Canceled",
            Self::Approved => "Approved",
        }
    }

    /// Whether decisions (and therefore endorsements) may be submitted.
    pub fn accepts_decisions(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Whether the bid author may set this status directly.
    pub fn settable_by_author(&self) -> bool {
        !matches!(self, Self::Approved)
    }
}

/// Category of work a tender asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [Self::Construction, Self::Delivery, Self::Manufacture];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Construction => "Construction",
            Self::Delivery => "Delivery",
            Self::Manufacture => "Manufacture",
        }
    }
}

/// A tender owner's verdict on a published bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Tag of the [`Author`] union, as it appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorKind {
    User,
    Organization,
}

impl AuthorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Organization => "Organization",
        }
    }
}

/// Who submitted a bid: a single user or an organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Author {
    User(UserId),
    Organization(OrganizationId),
}

impl Author {
    /// Build an author from its wire tag and raw identifier.
    pub fn from_parts(kind: AuthorKind, id: uuid::Uuid) -> Self {
        match kind {
            AuthorKind::User => Self::User(UserId::from_uuid(id)),
            AuthorKind::Organization => Self::Organization(OrganizationId::from_uuid(id)),
        }
    }

    pub fn kind(&self) -> AuthorKind {
        match self {
            Self::User(_) => AuthorKind::User,
            Self::Organization(_) => AuthorKind::Organization,
        }
    }

    /// The raw identifier, regardless of the tag.
    pub fn raw_id(&self) -> uuid::Uuid {
        match self {
            Self::User(id) => *id.as_uuid(),
            Self::Organization(id) => *id.as_uuid(),
        }
    }
}

macro_rules! wire_enum {
    ($ty:ident, $err:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::variants()
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ParseError::$err(s.to_string()))
            }
        }
    };
}

impl TenderStatus {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
}

impl BidStatus {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
}

impl ServiceType {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
}

impl Decision {
    fn variants() -> &'static [Self] {
        &[Self::Approved, Self::Rejected]
    }
}

impl AuthorKind {
    fn variants() -> &'static [Self] {
        &[Self::User, Self::Organization]
    }
}

wire_enum!(TenderStatus, TenderStatus);
wire_enum!(BidStatus, BidStatus);
wire_enum!(ServiceType, ServiceType);
wire_enum!(Decision, Decision);
wire_enum!(AuthorKind, AuthorKind);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_parse_back() {
        for status in TenderStatus::ALL {
            assert_eq!(status.as_str().parse::<TenderStatus>().unwrap(), status);
        }
        for status in BidStatus::ALL {
            assert_eq!(status.as_str().parse::<BidStatus>().unwrap(), status);
        }
        for service in ServiceType::ALL {
            assert_eq!(service.as_str().parse::<ServiceType>().unwrap(), service);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("published".parse::<TenderStatus>().is_err());
        assert!("approved".parse::<Decision>().is_err());
    }

    #[test]
    fn only_published_bids_accept_decisions() {
        assert!(BidStatus::Published.accepts_decisions());
        assert!(!BidStatus::Created.accepts_decisions());
        assert!(!BidStatus::Canceled.accepts_decisions());
        assert!(!BidStatus::Approved.accepts_decisions());
    }

    #[test]
    fn author_dispatches_on_tag() {
        let raw = uuid::Uuid::new_v4();
        let user = Author::from_parts(AuthorKind::User, raw);
        let org = Author::from_parts(AuthorKind::Organization, raw);
        assert_eq!(user, Author::User(UserId::from_uuid(raw)));
        assert_eq!(org.kind(), AuthorKind::Organization);
        assert_eq!(org.raw_id(), raw);
    }

    #[test]
    fn json_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&TenderStatus::Published).unwrap(),
            "\"Published\""
        );
        assert_eq!(
            serde_json::from_str::<ServiceType>("\"Delivery\"").unwrap(),
            ServiceType::Delivery
        );
    }
}
