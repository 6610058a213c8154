//! Fundamental types for the procura tender and bid service.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, timestamps, status enums, tenders, bids, their snapshots, directory
//! records (users and organizations), feedback and pagination.

pub mod bid;
pub mod directory;
pub mod error;
pub mod feedback;
pub mod ids;
pub mod pagination;
pub mod state;
pub mod tender;
pub mod time;

pub use bid::{Bid, BidPatch, BidSnapshot, NewBid, MAX_QUORUM};
pub use directory::{Organization, OrganizationKind, User};
pub use error::ParseError;
pub use feedback::Feedback;
pub use ids::{BidId, FeedbackId, OrganizationId, UserId, TenderId};
pub use pagination::Pagination;
pub use state::{Author, AuthorKind, BidStatus, Decision, ServiceType, TenderStatus};
pub use tender::{NewTender, Tender, TenderPatch, TenderSnapshot};
pub use time::{Clock, SystemClock, Timestamp};
