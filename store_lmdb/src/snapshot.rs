//! LMDB implementation of SnapshotStore.
//!
//! History key format: `entity_id(16) ++ version_be(4)`. A commit writes the row
//! and its snapshot in the same write transaction, after the version check.

use heed::types::Bytes;
use heed::{Database, RoTxn};

use procura_store::{check_expected, SnapshotId, SnapshotStore, StoreError};
use procura_types::{Bid, BidId, BidSnapshot, Tender, TenderId, TenderSnapshot};

use crate::codec::{encode, key_version, scan_prefix, version_key, ID_LEN};
use crate::{LmdbError, LmdbStore};

impl LmdbStore {
    pub(crate) fn versions_of(
        &self,
        txn: &RoTxn,
        db: Database<Bytes, Bytes>,
        id: &[u8; ID_LEN],
    ) -> Result<Vec<u32>, LmdbError> {
        scan_prefix(db, txn, id)?
            .iter()
            .map(|(key, _)| key_version(key))
            .collect()
    }

    pub(crate) fn ensure_no_snapshot(
        &self,
        txn: &RoTxn,
        db: Database<Bytes, Bytes>,
        key: &[u8],
        label: &str,
    ) -> Result<(), StoreError> {
        if db.get(txn, key).map_err(LmdbError::from)?.is_some() {
            return Err(StoreError::Duplicate(label.to_string()));
        }
        Ok(())
    }
}

impl SnapshotStore for LmdbStore {
    fn commit_tender(
        &self,
        tender: &Tender,
        expected: Option<u32>,
    ) -> Result<SnapshotId, StoreError> {
        let key = tender.id.as_bytes();
        let label = format!("tender {}", tender.id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let stored: Option<Tender> = self.load(&wtxn, self.dbs.tenders, key)?;
        check_expected(&label, stored.map(|t| t.version), expected)?;

        let vkey = version_key(key, tender.version);
        self.ensure_no_snapshot(
            &wtxn,
            self.dbs.tender_versions,
            &vkey,
            &format!("{label} v{}", tender.version),
        )?;

        self.dbs
            .tenders
            .put(&mut wtxn, key, &encode(tender)?)
            .map_err(LmdbError::from)?;
        self.dbs
            .tender_versions
            .put(&mut wtxn, &vkey, &encode(&tender.snapshot())?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(SnapshotId {
            entity: *tender.id.as_uuid(),
            version: tender.version,
        })
    }

    fn fetch_tender_version(
        &self,
        id: &TenderId,
        version: u32,
    ) -> Result<TenderSnapshot, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.load(
            &rtxn,
            self.dbs.tender_versions,
            &version_key(id.as_bytes(), version),
        )?
        .ok_or_else(|| StoreError::NotFound(format!("tender {id} v{version}")))
    }

    fn tender_versions(&self, id: &TenderId) -> Result<Vec<u32>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.versions_of(&rtxn, self.dbs.tender_versions, id.as_bytes())?)
    }

    fn commit_bid(&self, bid: &Bid, expected: Option<u32>) -> Result<SnapshotId, StoreError> {
        let key = bid.id.as_bytes();
        let label = format!("bid {}", bid.id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let stored: Option<Bid> = self.load(&wtxn, self.dbs.bids, key)?;
        check_expected(&label, stored.as_ref().map(|b| b.version), expected)?;

        let mut row = bid.clone();
        if let Some(stored) = stored {
            row.endorsement_count = stored.endorsement_count;
        }

        let vkey = version_key(key, row.version);
        self.ensure_no_snapshot(
            &wtxn,
            self.dbs.bid_versions,
            &vkey,
            &format!("{label} v{}", row.version),
        )?;

        self.dbs
            .bids
            .put(&mut wtxn, key, &encode(&row)?)
            .map_err(LmdbError::from)?;
        self.dbs
            .bid_versions
            .put(&mut wtxn, &vkey, &encode(&row.snapshot())?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(SnapshotId {
            entity: *bid.id.as_uuid(),
            version: row.version,
        })
    }

    fn fetch_bid_version(&self, id: &BidId, version: u32) -> Result<BidSnapshot, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.load(
            &rtxn,
            self.dbs.bid_versions,
            &version_key(id.as_bytes(), version),
        )?
        .ok_or_else(|| StoreError::NotFound(format!("bid {id} v{version}")))
    }

    fn bid_versions(&self, id: &BidId) -> Result<Vec<u32>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.versions_of(&rtxn, self.dbs.bid_versions, id.as_bytes())?)
    }
}
