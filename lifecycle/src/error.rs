//! Error taxonomy of the lifecycle.
//!
//! Each variant renders to one stable reason string that clients match on.

use procura_store::StoreError;
use procura_types::TenderStatus;
use thiserror::Error;

/// Coarse classification used by the request layer to pick a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    PreconditionFailed,
    UserNotSpecified,
    ValidationFailed,
    VersionConflict,
    DeadlineExceeded,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("user not found")]
    UserNotFound,

    #[error("organization not found")]
    OrganizationNotFound,

    #[error("tender not found")]
    TenderNotFound,

    #[error("bid not found")]
    BidNotFound,

    #[error("tender backup version not found")]
    TenderVersionNotFound,

    #[error("bid backup version not found")]
    BidVersionNotFound,

    #[error("only authorizated users have permissions to view this resource")]
    UserNotSpecified,

    #[error("user dont have permission to create tender for this org")]
    CreateTenderDenied,

    #[error("user dont have permission to this tender")]
    TenderDenied,

    #[error("user dont have permission to see bids for this tender")]
    BidsOfTenderDenied,

    #[error("user dont have permission to this bid")]
    BidDenied,

    #[error("user dont have permission to ship this bid")]
    ShipBidDenied,

    #[error("cant create bid to not public tender")]
    TenderNotPublished,

    #[error("cant ship not public bid")]
    BidNotPublished,

    #[error("cant create rewiew to not approved bid")]
    ReviewNotAllowed,

    #[error("cant see this feedbacks")]
    NoFeedbackAccess,

    #[error("tender status cannot move from {from} to {to}")]
    InvalidTransition { from: TenderStatus, to: TenderStatus },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("entity was modified concurrently, retry the request")]
    VersionConflict,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("storage failure: {0}")]
    Internal(String),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound
            | Self::OrganizationNotFound
            | Self::TenderNotFound
            | Self::BidNotFound
            | Self::TenderVersionNotFound
            | Self::BidVersionNotFound => ErrorKind::NotFound,
            Self::CreateTenderDenied
            | Self::TenderDenied
            | Self::BidsOfTenderDenied
            | Self::BidDenied
            | Self::ShipBidDenied => ErrorKind::PermissionDenied,
            Self::TenderNotPublished
            | Self::BidNotPublished
            | Self::ReviewNotAllowed
            | Self::NoFeedbackAccess
            | Self::InvalidTransition { .. } => ErrorKind::PreconditionFailed,
            Self::UserNotSpecified => ErrorKind::UserNotSpecified,
            Self::Validation(_) => ErrorKind::ValidationFailed,
            Self::VersionConflict => ErrorKind::VersionConflict,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Text safe to show a client. Storage details are withheld.
    pub fn reason(&self) -> String {
        match self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { .. } => LifecycleError::VersionConflict,
            other => {
                tracing::warn!(error = %other, "storage failure");
                LifecycleError::Internal(other.to_string())
            }
        }
    }
}

/// Translate a storage not-found into the specific lifecycle variant.
pub(crate) trait OrNotFound<T> {
    fn or_not_found(self, err: LifecycleError) -> Result<T, LifecycleError>;
}

impl<T> OrNotFound<T> for Result<T, StoreError> {
    fn or_not_found(self, err: LifecycleError) -> Result<T, LifecycleError> {
        self.map_err(|e| if e.is_not_found() { err } else { e.into() })
    }
}
