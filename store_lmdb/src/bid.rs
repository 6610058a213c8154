//! LMDB implementation of BidStore.

use procura_store::{sort_bids, BidFilter, BidStore, StoreError};
use procura_types::{Bid, BidId};

use crate::{LmdbError, LmdbStore};

impl BidStore for LmdbStore {
    fn get_bid(&self, id: &BidId) -> Result<Bid, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.load(&rtxn, self.dbs.bids, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("bid {id}")))
    }

    fn matching_bids(&self, filter: &BidFilter) -> Result<Vec<Bid>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut bids: Vec<Bid> = self
            .load_all::<Bid>(&rtxn, self.dbs.bids)?
            .into_iter()
            .filter(|b| filter.matches(b))
            .collect();
        sort_bids(&mut bids);
        Ok(bids)
    }
}
