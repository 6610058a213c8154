use serde::{Deserialize, Serialize};

use crate::ids::{BidId, FeedbackId};
use crate::time::Timestamp;

/// A review left on a bid once it reached quorum. Never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub bid_id: BidId,
    pub description: String,
    pub created_at: Timestamp,
}
