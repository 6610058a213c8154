//! Parse errors for the textual forms of the enums.

use thiserror::Error;

/// Failure to parse one of the enumerated wire values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid tender status: {0}")]
    TenderStatus(String),

    #[error("invalid bid status: {0}")]
    BidStatus(String),

    #[error("invalid service type: {0}")]
    ServiceType(String),

    #[error("invalid author type: {0}")]
    AuthorKind(String),

    #[error("invalid decision: {0}")]
    Decision(String),

    #[error("invalid organization type: {0}")]
    OrganizationKind(String),

    #[error("invalid identifier: {0}")]
    Id(String),
}
