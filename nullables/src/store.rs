//! Nullable store: thread-safe in-memory storage for testing.
//!
//! One mutex guards all tables so every trait method is atomic, matching the
//! single write transaction of the LMDB backend.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use procura_store::{
    check_expected, sort_bids, sort_feedback, sort_tenders, BidFilter, BidStore, DirectoryStore,
    EndorsementOutcome, EndorsementStore, FeedbackStore, MetaStore, SnapshotId, SnapshotStore,
    StoreError, TenderFilter, TenderStore,
};
use procura_types::{
    Bid, BidId, BidSnapshot, Feedback, Organization, OrganizationId, Pagination, Tender,
    TenderId, TenderSnapshot, User, UserId,
};

#[derive(Default)]
struct Tables {
    tenders: HashMap<TenderId, Tender>,
    tender_versions: BTreeMap<(TenderId, u32), TenderSnapshot>,
    bids: HashMap<BidId, Bid>,
    bid_versions: BTreeMap<(BidId, u32), BidSnapshot>,
    endorsements: BTreeSet<(BidId, UserId)>,
    feedback: Vec<Feedback>,
    users: HashMap<UserId, User>,
    usernames: HashMap<String, UserId>,
    organizations: HashMap<OrganizationId, Organization>,
    responsibles: BTreeSet<(OrganizationId, UserId)>,
    meta: HashMap<String, Vec<u8>>,
}

/// An in-memory implementation of every procurement store trait.
#[derive(Default)]
pub struct NullStore {
    tables: Mutex<Tables>,
    failing: Mutex<bool>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Number of endorsement records across all bids.
    pub fn endorsement_record_count(&self) -> usize {
        self.tables.lock().unwrap().endorsements.len()
    }

    pub fn feedback_count(&self) -> usize {
        self.tables.lock().unwrap().feedback.len()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if *self.failing.lock().unwrap() {
            return Err(StoreError::Backend("null store set to fail".to_string()));
        }
        Ok(self.tables.lock().unwrap())
    }
}

fn tender_versions_of(t: &Tables, id: &TenderId) -> Vec<u32> {
    t.tender_versions
        .range((*id, 0)..=(*id, u32::MAX))
        .map(|((_, v), _)| *v)
        .collect()
}

fn bid_versions_of(t: &Tables, id: &BidId) -> Vec<u32> {
    t.bid_versions
        .range((*id, 0)..=(*id, u32::MAX))
        .map(|((_, v), _)| *v)
        .collect()
}

impl TenderStore for NullStore {
    fn get_tender(&self, id: &TenderId) -> Result<Tender, StoreError> {
        self.tables()?
            .tenders
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tender {id}")))
    }

    fn list_tenders(
        &self,
        filter: &TenderFilter,
        page: Pagination,
    ) -> Result<Vec<Tender>, StoreError> {
        let mut tenders: Vec<Tender> = self
            .tables()?
            .tenders
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_tenders(&mut tenders);
        Ok(page.apply(tenders))
    }
}

impl BidStore for NullStore {
    fn get_bid(&self, id: &BidId) -> Result<Bid, StoreError> {
        self.tables()?
            .bids
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("bid {id}")))
    }

    fn matching_bids(&self, filter: &BidFilter) -> Result<Vec<Bid>, StoreError> {
        let mut bids: Vec<Bid> = self
            .tables()?
            .bids
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        sort_bids(&mut bids);
        Ok(bids)
    }
}

impl SnapshotStore for NullStore {
    fn commit_tender(
        &self,
        tender: &Tender,
        expected: Option<u32>,
    ) -> Result<SnapshotId, StoreError> {
        let mut t = self.tables()?;
        let label = format!("tender {}", tender.id);
        check_expected(&label, t.tenders.get(&tender.id).map(|s| s.version), expected)?;
        let key = (tender.id, tender.version);
        if t.tender_versions.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("{label} v{}", tender.version)));
        }
        t.tenders.insert(tender.id, tender.clone());
        t.tender_versions.insert(key, tender.snapshot());
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
        self.tables()?
            .tender_versions
            .get(&(*id, version))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tender {id} v{version}")))
    }

    fn tender_versions(&self, id: &TenderId) -> Result<Vec<u32>, StoreError> {
        Ok(tender_versions_of(&*self.tables()?, id))
    }

    fn commit_bid(&self, bid: &Bid, expected: Option<u32>) -> Result<SnapshotId, StoreError> {
        let mut t = self.tables()?;
        let label = format!("bid {}", bid.id);
        let stored = t.bids.get(&bid.id);
        check_expected(&label, stored.map(|b| b.version), expected)?;
        let mut row = bid.clone();
        if let Some(stored) = stored {
            row.endorsement_count = stored.endorsement_count;
        }
        let key = (row.id, row.version);
        if t.bid_versions.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("{label} v{}", row.version)));
        }
        t.bid_versions.insert(key, row.snapshot());
        t.bids.insert(row.id, row);
        Ok(SnapshotId {
            entity: *bid.id.as_uuid(),
            version: bid.version,
        })
    }

    fn fetch_bid_version(&self, id: &BidId, version: u32) -> Result<BidSnapshot, StoreError> {
        self.tables()?
            .bid_versions
            .get(&(*id, version))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("bid {id} v{version}")))
    }

    fn bid_versions(&self, id: &BidId) -> Result<Vec<u32>, StoreError> {
        Ok(bid_versions_of(&*self.tables()?, id))
    }
}

impl EndorsementStore for NullStore {
    fn record_endorsement(
        &self,
        bid: &BidId,
        user: &UserId,
    ) -> Result<EndorsementOutcome, StoreError> {
        let mut t = self.tables()?;
        let status = t
            .bids
            .get(bid)
            .map(|b| b.status)
            .ok_or_else(|| StoreError::NotFound(format!("bid {bid}")))?;
        if !status.accepts_decisions() {
            return Err(StoreError::InvalidState(format!("bid {bid} is {status}")));
        }
        let recorded = t.endorsements.insert((*bid, *user));
        let row = t
            .bids
            .get_mut(bid)
            .ok_or_else(|| StoreError::NotFound(format!("bid {bid}")))?;
        if recorded {
            row.endorsement_count += 1;
        }
        Ok(EndorsementOutcome {
            recorded,
            count: row.endorsement_count,
        })
    }

    fn endorsers(&self, bid: &BidId) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .tables()?
            .endorsements
            .iter()
            .filter(|(b, _)| b == bid)
            .map(|(_, u)| *u)
            .collect())
    }

    fn reject_bid(&self, bid: &Bid, expected: u32) -> Result<SnapshotId, StoreError> {
        let mut t = self.tables()?;
        let label = format!("bid {}", bid.id);
        check_expected(&label, t.bids.get(&bid.id).map(|b| b.version), Some(expected))?;
        let key = (bid.id, bid.version);
        if t.bid_versions.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("{label} v{}", bid.version)));
        }
        t.endorsements.retain(|(b, _)| *b != bid.id);
        let mut row = bid.clone();
        row.endorsement_count = 0;
        t.bid_versions.insert(key, row.snapshot());
        t.bids.insert(row.id, row);
        Ok(SnapshotId {
            entity: *bid.id.as_uuid(),
            version: bid.version,
        })
    }
}

impl FeedbackStore for NullStore {
    fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        let mut t = self.tables()?;
        if t.feedback.iter().any(|f| f.id == feedback.id) {
            return Err(StoreError::Duplicate(format!("feedback {}", feedback.id)));
        }
        t.feedback.push(feedback.clone());
        Ok(())
    }

    fn list_feedback(
        &self,
        bids: &[BidId],
        page: Pagination,
    ) -> Result<Vec<Feedback>, StoreError> {
        let mut out: Vec<Feedback> = self
            .tables()?
            .feedback
            .iter()
            .filter(|f| bids.contains(&f.bid_id))
            .cloned()
            .collect();
        sort_feedback(&mut out);
        Ok(page.apply(out))
    }
}

impl DirectoryStore for NullStore {
    fn user_by_username(&self, username: &str) -> Result<User, StoreError> {
        let t = self.tables()?;
        t.usernames
            .get(username)
            .and_then(|id| t.users.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("username {username}")))
    }

    fn get_user(&self, id: &UserId) -> Result<User, StoreError> {
        self.tables()?
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    fn get_organization(&self, id: &OrganizationId) -> Result<Organization, StoreError> {
        self.tables()?
            .organizations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("organization {id}")))
    }

    fn organizations_of(&self, user: &UserId) -> Result<Vec<OrganizationId>, StoreError> {
        Ok(self
            .tables()?
            .responsibles
            .iter()
            .filter(|(_, u)| u == user)
            .map(|(o, _)| *o)
            .collect())
    }

    fn responsible_users(&self, org: &OrganizationId) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .tables()?
            .responsibles
            .iter()
            .filter(|(o, _)| o == org)
            .map(|(_, u)| *u)
            .collect())
    }

    fn put_user(&self, user: &User) -> Result<(), StoreError> {
        let mut t = self.tables()?;
        if let Some(holder) = t.usernames.get(&user.username) {
            if *holder != user.id {
                return Err(StoreError::Duplicate(format!("username {}", user.username)));
            }
        }
        if let Some(previous) = t.users.get(&user.id).map(|u| u.username.clone()) {
            t.usernames.remove(&previous);
        }
        t.usernames.insert(user.username.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    fn put_organization(&self, org: &Organization) -> Result<(), StoreError> {
        self.tables()?.organizations.insert(org.id, org.clone());
        Ok(())
    }

    fn put_responsible(&self, org: &OrganizationId, user: &UserId) -> Result<(), StoreError> {
        let mut t = self.tables()?;
        if !t.organizations.contains_key(org) {
            return Err(StoreError::NotFound(format!("organization {org}")));
        }
        if !t.users.contains_key(user) {
            return Err(StoreError::NotFound(format!("user {user}")));
        }
        t.responsibles.insert((*org, *user));
        Ok(())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.tables()?.meta.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.tables()?
            .meta
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("meta key '{key}'")))
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        match self.get_meta("schema_version") {
            Ok(bytes) => {
                let arr: [u8; 4] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Corruption("schema_version".to_string()))?;
                Ok(u32::from_le_bytes(arr))
            }
            Err(StoreError::NotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta("schema_version", &version.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procura_types::{Author, BidStatus, NewBid, Timestamp};

    fn bid() -> Bid {
        Bid::create(
            BidId::new(),
            NewBid {
                name: "b".into(),
                description: "d".into(),
                tender_id: TenderId::new(),
                author: Author::User(UserId::new()),
            },
            2,
            Timestamp::epoch(),
        )
    }

    fn published(store: &NullStore) -> Bid {
        let b = bid();
        store.commit_bid(&b, None).unwrap();
        let published = b.with_status(BidStatus::Published);
        store.commit_bid(&published, Some(1)).unwrap();
        published
    }

    #[test]
    fn endorsement_is_a_set() {
        let store = NullStore::new();
        let b = published(&store);
        let u = UserId::new();
        assert!(store.record_endorsement(&b.id, &u).unwrap().recorded);
        assert!(!store.record_endorsement(&b.id, &u).unwrap().recorded);
        assert_eq!(store.get_bid(&b.id).unwrap().endorsement_count, 1);
    }

    #[test]
    fn reject_clears_everything() {
        let store = NullStore::new();
        let b = bid();
        store.commit_bid(&b, None).unwrap();
        let published = b.with_status(BidStatus::Published);
        store.commit_bid(&published, Some(1)).unwrap();
        store.record_endorsement(&b.id, &UserId::new()).unwrap();
        store.reject_bid(&published.rejected(), 2).unwrap();
        assert_eq!(store.endorsement_record_count(), 0);
        assert_eq!(store.get_bid(&b.id).unwrap().endorsement_count, 0);
        assert_eq!(store.bid_versions(&b.id).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn only_published_bids_take_endorsements() {
        let store = NullStore::new();
        let draft = bid();
        store.commit_bid(&draft, None).unwrap();
        assert!(store
            .record_endorsement(&draft.id, &UserId::new())
            .unwrap_err()
            .is_invalid_state());

        let b = published(&store);
        store.reject_bid(&b.rejected(), b.version).unwrap();
        assert!(store
            .record_endorsement(&b.id, &UserId::new())
            .unwrap_err()
            .is_invalid_state());
        assert_eq!(store.endorsement_record_count(), 0);
        assert_eq!(store.get_bid(&b.id).unwrap().endorsement_count, 0);
    }

    #[test]
    fn matching_bids_ignores_paging() {
        let store = NullStore::new();
        let author = Author::User(UserId::new());
        for name in ["c", "a", "b"] {
            let b = Bid::create(
                BidId::new(),
                NewBid {
                    name: name.into(),
                    description: "d".into(),
                    tender_id: TenderId::new(),
                    author,
                },
                1,
                Timestamp::epoch(),
            );
            store.commit_bid(&b, None).unwrap();
        }
        let filter = BidFilter::authored_by([author].into_iter().collect());

        let all = store.matching_bids(&filter).unwrap();
        let names: Vec<_> = all.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let page = store.list_bids(&filter, Pagination::new(1, 1)).unwrap();
        assert_eq!(page[0].name, "b");
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn versions_are_listed_in_order() {
        let store = NullStore::new();
        let b = published(&store);
        assert_eq!(store.bid_versions(&b.id).unwrap(), vec![1, 2]);
        assert!(store.tender_versions(&TenderId::new()).unwrap().is_empty());
    }

    #[test]
    fn failing_store_errors_everywhere() {
        let store = NullStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.get_bid(&BidId::new()),
            Err(StoreError::Backend(_))
        ));
    }
}
