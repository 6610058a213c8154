use procura_types::{BidId, Feedback, Pagination};

use crate::StoreError;

pub trait FeedbackStore {
    fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError>;

    /// Feedback on any of `bids`, ordered by description, then creation time.
    fn list_feedback(&self, bids: &[BidId], page: Pagination)
        -> Result<Vec<Feedback>, StoreError>;
}
