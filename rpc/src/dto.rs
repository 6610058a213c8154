//! Request bodies and response shapes. Field names are camelCase on the wire.

use procura_types::{
    Author, AuthorKind, Bid, BidPatch, Feedback, NewBid, NewTender, OrganizationId, ServiceType,
    Tender, TenderId, TenderPatch,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::params::one_of;
use crate::RpcError;

// ── Requests ─────────────────────────────────────────────────────────────

fn required<T>(value: Option<T>, name: &str) -> Result<T, RpcError> {
    value.ok_or_else(|| RpcError::Validation(format!("{name} required")))
}

fn required_str(value: String, name: &str) -> Result<String, RpcError> {
    if value.is_empty() {
        return Err(RpcError::Validation(format!("{name} required")));
    }
    Ok(value)
}

/// Empty strings in a patch mean "leave unchanged".
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenderRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub service_type: String,
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub creator_username: String,
}

impl CreateTenderRequest {
    /// Split into the creator's username and the new tender.
    pub fn into_new(self) -> Result<(String, NewTender), RpcError> {
        let name = required_str(self.name, "name")?;
        let description = required_str(self.description, "description")?;
        let service_type = one_of(
            &required_str(self.service_type, "serviceType")?,
            "serviceType",
            &ServiceType::ALL,
        )?;
        let organization_id = required(self.organization_id, "organizationId")?;
        let username = required_str(self.creator_username, "creatorUsername")?;
        Ok((
            username,
            NewTender {
                name,
                description,
                service_type,
                organization_id: OrganizationId::from_uuid(organization_id),
            },
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTenderRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<String>,
}

impl PatchTenderRequest {
    pub fn into_patch(self) -> Result<TenderPatch, RpcError> {
        let service_type = provided(self.service_type)
            .map(|s| one_of(&s, "serviceType", &ServiceType::ALL))
            .transpose()?;
        Ok(TenderPatch {
            name: provided(self.name),
            description: provided(self.description),
            service_type,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBidRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tender_id: Option<Uuid>,
    #[serde(default)]
    pub author_type: String,
    pub author_id: Option<Uuid>,
}

impl CreateBidRequest {
    pub fn into_new(self) -> Result<NewBid, RpcError> {
        let name = required_str(self.name, "name")?;
        let description = required_str(self.description, "description")?;
        let tender_id = required(self.tender_id, "tenderId")?;
        let kind = one_of(
            &required_str(self.author_type, "authorType")?,
            "authorType",
            &[AuthorKind::Organization, AuthorKind::User],
        )?;
        let author_id = required(self.author_id, "authorId")?;
        Ok(NewBid {
            name,
            description,
            tender_id: TenderId::from_uuid(tender_id),
            author: Author::from_parts(kind, author_id),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchBidRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl PatchBidRequest {
    pub fn into_patch(self) -> BidPatch {
        BidPatch {
            name: provided(self.name),
            description: provided(self.description),
        }
    }
}

// ── Responses ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub service_type: String,
    pub organization_id: String,
    pub version: u32,
    pub created_at: String,
}

impl From<Tender> for TenderResponse {
    fn from(t: Tender) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name,
            description: t.description,
            status: t.status.to_string(),
            service_type: t.service_type.to_string(),
            organization_id: t.organization_id.to_string(),
            version: t.version,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

/// Endorsement count and quorum stay internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub tender_id: String,
    pub author_type: String,
    pub author_id: String,
    pub version: u32,
    pub created_at: String,
}

impl From<Bid> for BidResponse {
    fn from(b: Bid) -> Self {
        Self {
            id: b.id.to_string(),
            name: b.name,
            description: b.description,
            status: b.status.to_string(),
            tender_id: b.tender_id.to_string(),
            author_type: b.author.kind().to_string(),
            author_id: b.author.raw_id().to_string(),
            version: b.version,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: String,
    pub description: String,
    pub created_at: String,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id.to_string(),
            description: f.description,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

pub fn many<T, R: From<T>>(items: Vec<T>) -> Vec<R> {
    items.into_iter().map(R::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use procura_types::{BidId, Timestamp};

    #[test]
    fn create_tender_checks_required_fields_in_order() {
        let err = CreateTenderRequest::default().into_new().unwrap_err();
        assert_eq!(err.reason(), "validation failed: name required");

        let err = CreateTenderRequest {
            name: "Roads".into(),
            description: "Fix them".into(),
            service_type: "Cleaning".into(),
            ..Default::default()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(
            err.reason(),
            "validation failed: invalid serviceType format, must be in: [Construction Delivery Manufacture]"
        );
    }

    #[test]
    fn empty_patch_fields_are_ignored() {
        let patch = PatchTenderRequest {
            name: Some(String::new()),
            description: Some("new".into()),
            service_type: Some(String::new()),
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.description.as_deref(), Some("new"));
        assert_eq!(patch.service_type, None);
    }

    #[test]
    fn bid_request_dispatches_author_tag() {
        let org = Uuid::new_v4();
        let bid = CreateBidRequest {
            name: "Offer".into(),
            description: "Cheap".into(),
            tender_id: Some(Uuid::new_v4()),
            author_type: "Organization".into(),
            author_id: Some(org),
        }
        .into_new()
        .unwrap();
        assert_eq!(bid.author, Author::Organization(OrganizationId::from_uuid(org)));
    }

    #[test]
    fn bid_response_hides_quorum() {
        let bid = Bid::create(
            BidId::new(),
            NewBid {
                name: "Offer".into(),
                description: "Cheap".into(),
                tender_id: TenderId::new(),
                author: Author::User(procura_types::UserId::new()),
            },
            3,
            Timestamp::from_secs(1_700_000_000),
        );
        let json = serde_json::to_value(BidResponse::from(bid)).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert!(keys.contains(&"authorType".to_string()));
        assert!(!keys.iter().any(|k| k.contains("quorum") || k.contains("ndorse")));
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20Z");
    }
}
