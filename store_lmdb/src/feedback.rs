//! LMDB implementation of FeedbackStore.
//!
//! Key format: `bid_id(16) ++ feedback_id(16)` so all feedback on a bid is one
//! prefix scan.

use procura_store::{sort_feedback, FeedbackStore, StoreError};
use procura_types::{BidId, Feedback, Pagination};

use crate::codec::{decode, encode, pair_key, scan_prefix};
use crate::{LmdbError, LmdbStore};

impl FeedbackStore for LmdbStore {
    fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        let key = pair_key(feedback.bid_id.as_bytes(), feedback.id.as_bytes());
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .dbs
            .feedback
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!("feedback {}", feedback.id)));
        }
        self.dbs
            .feedback
            .put(&mut wtxn, &key, &encode(feedback)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn list_feedback(
        &self,
        bids: &[BidId],
        page: Pagination,
    ) -> Result<Vec<Feedback>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for bid in bids {
            for (_, val) in scan_prefix(self.dbs.feedback, &rtxn, bid.as_bytes())? {
                out.push(decode::<Feedback>(&val)?);
            }
        }
        sort_feedback(&mut out);
        Ok(page.apply(out))
    }
}
