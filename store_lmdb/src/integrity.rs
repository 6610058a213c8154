//! History integrity checks.
//!
//! Every tender and bid row at version `v` must have exactly the
//! snapshots `1..=v`, and every bid's counter must match its endorsement records.

use procura_types::{Bid, Tender};

use crate::codec::scan_prefix;
use crate::{LmdbError, LmdbStore};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub tenders_checked: u64,
    pub bids_checked: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

fn expected_versions(version: u32) -> Vec<u32> {
    (1..=version).collect()
}

/// Walk every row and compare it with its history. Problems are collected, not
/// returned as errors; only a failing read aborts the check.
pub fn check_history(store: &LmdbStore) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = store.env.read_txn()?;

    for tender in store.load_all::<Tender>(&rtxn, store.dbs.tenders)? {
        report.tenders_checked += 1;
        let versions = store.versions_of(&rtxn, store.dbs.tender_versions, tender.id.as_bytes())?;
        if versions != expected_versions(tender.version) {
            report.errors.push(format!(
                "tender {} at v{} has history {:?}",
                tender.id, tender.version, versions
            ));
        }
    }

    for bid in store.load_all::<Bid>(&rtxn, store.dbs.bids)? {
        report.bids_checked += 1;
        let versions = store.versions_of(&rtxn, store.dbs.bid_versions, bid.id.as_bytes())?;
        if versions != expected_versions(bid.version) {
            report.errors.push(format!(
                "bid {} at v{} has history {:?}",
                bid.id, bid.version, versions
            ));
        }
        let records = scan_prefix(store.dbs.endorsements, &rtxn, bid.id.as_bytes())?.len();
        if records != bid.endorsement_count as usize {
            report.errors.push(format!(
                "bid {} counts {} endorsements but has {} records",
                bid.id, bid.endorsement_count, records
            ));
        }
    }

    if !report.is_healthy() {
        tracing::warn!(errors = report.errors.len(), "history integrity problems found");
    }
    Ok(report)
}
