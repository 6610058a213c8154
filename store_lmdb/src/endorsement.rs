//! LMDB implementation of EndorsementStore.
//!
//! Key format: `bid_id(16) ++ user_id(16)`, empty value. The bid row's counter is
//! updated in the same write transaction as the record set.

use procura_store::{
    check_expected, EndorsementOutcome, EndorsementStore, SnapshotId, StoreError,
};
use procura_types::{Bid, BidId, UserId};

use crate::codec::{encode, pair_key, scan_prefix, trailing_id, version_key};
use crate::{LmdbError, LmdbStore};

impl EndorsementStore for LmdbStore {
    fn record_endorsement(
        &self,
        bid: &BidId,
        user: &UserId,
    ) -> Result<EndorsementOutcome, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut row: Bid = self
            .load(&wtxn, self.dbs.bids, bid.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("bid {bid}")))?;
        if !row.status.accepts_decisions() {
            return Err(StoreError::InvalidState(format!("bid {bid} is {}", row.status)));
        }

        let key = pair_key(bid.as_bytes(), user.as_bytes());
        let present = self
            .dbs
            .endorsements
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some();
        if present {
            return Ok(EndorsementOutcome {
                recorded: false,
                count: row.endorsement_count,
            });
        }

        row.endorsement_count += 1;
        self.dbs
            .endorsements
            .put(&mut wtxn, &key, &[])
            .map_err(LmdbError::from)?;
        self.dbs
            .bids
            .put(&mut wtxn, bid.as_bytes(), &encode(&row)?)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(EndorsementOutcome {
            recorded: true,
            count: row.endorsement_count,
        })
    }

    fn endorsers(&self, bid: &BidId) -> Result<Vec<UserId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut users = Vec::new();
        for (key, _) in scan_prefix(self.dbs.endorsements, &rtxn, bid.as_bytes())? {
            users.push(UserId::from_bytes(trailing_id(&key)?));
        }
        Ok(users)
    }

    fn reject_bid(&self, bid: &Bid, expected: u32) -> Result<SnapshotId, StoreError> {
        let key = bid.id.as_bytes();
        let label = format!("bid {}", bid.id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let stored: Option<Bid> = self.load(&wtxn, self.dbs.bids, key)?;
        check_expected(&label, stored.map(|b| b.version), Some(expected))?;

        let records = scan_prefix(self.dbs.endorsements, &wtxn, key)?;
        for (record, _) in &records {
            self.dbs
                .endorsements
                .delete(&mut wtxn, record)
                .map_err(LmdbError::from)?;
        }

        let mut row = bid.clone();
        row.endorsement_count = 0;
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

        tracing::debug!(bid = %bid.id, cleared = records.len(), "endorsements cleared");
        Ok(SnapshotId {
            entity: *bid.id.as_uuid(),
            version: row.version,
        })
    }
}
