//! HTTP API for the procura service.
//!
//! Provides endpoints under `/api` for:
//! - Tender creation, listing, status changes, edits and rollback
//! - Bid submission, listing, status changes, edits and rollback
//! - Decisions on published bids and reviews once quorum is reached
//!
//! plus an optional Prometheus `/metrics` endpoint.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod params;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{router, RpcServer};
pub use state::ApiState;
