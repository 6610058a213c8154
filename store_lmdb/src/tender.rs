//! LMDB implementation of TenderStore.
//!
//! Rows are keyed by the raw tender id. Lists scan the whole table; the
//! filter and ordering live in `procura-store`.

use procura_store::{sort_tenders, StoreError, TenderFilter, TenderStore};
use procura_types::{Pagination, Tender, TenderId};

use crate::{LmdbError, LmdbStore};

impl TenderStore for LmdbStore {
    fn get_tender(&self, id: &TenderId) -> Result<Tender, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.load(&rtxn, self.dbs.tenders, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("tender {id}")))
    }

    fn list_tenders(
        &self,
        filter: &TenderFilter,
        page: Pagination,
    ) -> Result<Vec<Tender>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut tenders: Vec<Tender> = self
            .load_all::<Tender>(&rtxn, self.dbs.tenders)?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        sort_tenders(&mut tenders);
        Ok(page.apply(tenders))
    }
}
