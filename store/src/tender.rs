//! Tender row storage trait.

use procura_types::{Pagination, Tender, TenderId};

use crate::{StoreError, TenderFilter};

/// Read access to current tender rows. Writes go through [`crate::SnapshotStore`].
pub trait TenderStore {
    fn get_tender(&self, id: &TenderId) -> Result<Tender, StoreError>;

    /// Matching tenders ordered by name, then id.
    fn list_tenders(
        &self,
        filter: &TenderFilter,
        page: Pagination,
    ) -> Result<Vec<Tender>, StoreError>;
}
