//! Equality and inclusion filters for list queries.

use std::collections::BTreeSet;

use procura_types::{
    Author, Bid, BidStatus, Feedback, OrganizationId, ServiceType, Tender, TenderId,
    TenderStatus,
};

/// Tender list filter. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TenderFilter {
    pub status: Option<TenderStatus>,
    /// Empty means any service type.
    pub service_types: Vec<ServiceType>,
    pub organizations: Option<BTreeSet<OrganizationId>>,
}

impl TenderFilter {
    /// Published tenders, optionally restricted to some service types.
    pub fn published(service_types: Vec<ServiceType>) -> Self {
        Self {
            status: Some(TenderStatus::Published),
            service_types,
            organizations: None,
        }
    }

    pub fn owned_by(organizations: BTreeSet<OrganizationId>) -> Self {
        Self {
            organizations: Some(organizations),
            ..Self::default()
        }
    }

    pub fn matches(&self, tender: &Tender) -> bool {
        if let Some(status) = self.status {
            if tender.status != status {
                return false;
            }
        }
        if !self.service_types.is_empty() && !self.service_types.contains(&tender.service_type) {
            return false;
        }
        match &self.organizations {
            Some(orgs) => orgs.contains(&tender.organization_id),
            None => true,
        }
    }
}

/// One alternative of a [`BidFilter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BidPredicate {
    AuthoredByAny(BTreeSet<Author>),
    StatusIs(BidStatus),
}

impl BidPredicate {
    pub fn matches(&self, bid: &Bid) -> bool {
        match self {
            Self::AuthoredByAny(authors) => authors.contains(&bid.author),
            Self::StatusIs(status) => bid.status == *status,
        }
    }
}

/// Bid list filter: optional tender equality, then a disjunction of predicates.
///
/// An empty `any_of` matches every bid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BidFilter {
    pub tender: Option<TenderId>,
    pub any_of: Vec<BidPredicate>,
}

impl BidFilter {
    pub fn authored_by(authors: BTreeSet<Author>) -> Self {
        Self {
            tender: None,
            any_of: vec![BidPredicate::AuthoredByAny(authors)],
        }
    }

    pub fn on_tender(mut self, tender: TenderId) -> Self {
        self.tender = Some(tender);
        self
    }

    pub fn or(mut self, predicate: BidPredicate) -> Self {
        self.any_of.push(predicate);
        self
    }

    pub fn matches(&self, bid: &Bid) -> bool {
        if let Some(tender) = self.tender {
            if bid.tender_id != tender {
                return false;
            }
        }
        self.any_of.is_empty() || self.any_of.iter().any(|p| p.matches(bid))
    }
}

/// Canonical list order for tenders: name, then id.
pub fn sort_tenders(tenders: &mut [Tender]) {
    tenders.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Canonical list order for bids: name, then id.
pub fn sort_bids(bids: &mut [Bid]) {
    bids.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Canonical list order for feedback: description, then creation time, then id.
pub fn sort_feedback(feedback: &mut [Feedback]) {
    feedback.sort_by(|a, b| {
        a.description
            .cmp(&b.description)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
