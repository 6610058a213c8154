//! Request-layer errors and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use procura_lifecycle::{ErrorKind, LifecycleError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Parameter or body content rejected before reaching the lifecycle.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Body or query string could not be decoded at all.
    #[error("wrong data format")]
    WrongFormat,

    #[error("server error: {0}")]
    Server(String),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub reason: String,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Lifecycle(e) => lifecycle_status(e),
            Self::Validation(_) | Self::WrongFormat => StatusCode::BAD_REQUEST,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Self::Lifecycle(e) => e.reason(),
            Self::Server(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lifecycle(e) => match e.kind() {
                ErrorKind::NotFound => "not_found",
                ErrorKind::PermissionDenied => "denied",
                ErrorKind::PreconditionFailed => "precondition",
                ErrorKind::UserNotSpecified => "unauthorized",
                ErrorKind::ValidationFailed => "invalid",
                ErrorKind::VersionConflict => "conflict",
                ErrorKind::DeadlineExceeded => "timeout",
                ErrorKind::Internal => "internal",
            },
            Self::Validation(_) | Self::WrongFormat => "invalid",
            Self::Server(_) => "internal",
        }
    }
}

fn lifecycle_status(e: &LifecycleError) -> StatusCode {
    match e {
        LifecycleError::UserNotFound | LifecycleError::UserNotSpecified => {
            StatusCode::UNAUTHORIZED
        }
        LifecycleError::TenderNotPublished
        | LifecycleError::ReviewNotAllowed
        | LifecycleError::NoFeedbackAccess => StatusCode::FORBIDDEN,
        LifecycleError::BidNotPublished | LifecycleError::InvalidTransition { .. } => {
            StatusCode::BAD_REQUEST
        }
        other => match other.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::ValidationFailed | ErrorKind::PreconditionFailed => StatusCode::BAD_REQUEST,
            ErrorKind::UserNotSpecified => StatusCode::UNAUTHORIZED,
            ErrorKind::VersionConflict => StatusCode::CONFLICT,
            ErrorKind::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { reason: self.reason() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_is_unauthorized() {
        let err = RpcError::from(LifecycleError::UserNotFound);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.reason(), "user not found");
    }

    #[test]
    fn not_found_and_denied_map_apart() {
        assert_eq!(
            RpcError::from(LifecycleError::OrganizationNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RpcError::from(LifecycleError::ShipBidDenied).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RpcError::from(LifecycleError::ReviewNotAllowed).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RpcError::from(LifecycleError::BidNotPublished).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn concurrency_and_deadline_have_own_codes() {
        assert_eq!(
            RpcError::from(LifecycleError::VersionConflict).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RpcError::from(LifecycleError::DeadlineExceeded).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn internal_details_stay_private() {
        let err = RpcError::from(LifecycleError::Internal("MDB_CORRUPTED".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.reason(), "internal error");
        assert_eq!(RpcError::Server("bind".into()).reason(), "internal error");
    }

    #[test]
    fn request_layer_reasons() {
        assert_eq!(RpcError::WrongFormat.reason(), "wrong data format");
        assert_eq!(
            RpcError::Validation("username required".into()).reason(),
            "validation failed: username required"
        );
    }
}
