use proptest::prelude::*;

use procura_types::bid::quorum_for;
use procura_types::{
    Author, Bid, BidId, BidPatch, NewTender, OrganizationId, Pagination, ServiceType, Tender,
    TenderId, TenderPatch, TenderStatus, Timestamp, UserId, MAX_QUORUM,
};

fn tender() -> Tender {
    Tender::create(
        TenderId::new(),
        NewTender {
            name: "T".into(),
            description: "D".into(),
            service_type: ServiceType::Delivery,
            organization_id: OrganizationId::new(),
        },
        Timestamp::from_secs(0),
    )
}

fn status_strategy() -> impl Strategy<Value = TenderStatus> {
    prop::sample::select(TenderStatus::ALL.to_vec())
}

proptest! {
    /// Identifier bytes survive a trip through the newtype.
    #[test]
    fn tender_id_bytes_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let id = TenderId::from_bytes(bytes);
        prop_assert_eq!(id.as_bytes(), &bytes);
    }

    /// Bincode encoding of an id is the raw uuid, so storage keys stay stable.
    #[test]
    fn bid_id_bincode_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let id = BidId::from_bytes(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: BidId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }

    /// Timestamp ordering follows the underlying seconds.
    #[test]
    fn timestamp_ordering(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000) {
        let ta = Timestamp::from_secs(a);
        let tb = Timestamp::from_secs(b);
        prop_assert_eq!(ta <= tb, a <= b);
    }

    /// A page never exceeds its limit and never starts past its offset.
    #[test]
    fn pagination_bounds(len in 0usize..50, limit in 0u32..20, offset in 0u32..60) {
        let items: Vec<usize> = (0..len).collect();
        let page = Pagination::new(limit, offset).apply(items);
        prop_assert!(page.len() <= limit as usize);
        if let Some(first) = page.first() {
            prop_assert_eq!(*first, offset as usize);
        }
    }

    /// Quorum never exceeds the cap and equals the responsible count below it.
    #[test]
    fn quorum_cap(responsible in 0usize..1_000) {
        let q = quorum_for(responsible);
        prop_assert!(q <= MAX_QUORUM);
        if responsible < MAX_QUORUM as usize {
            prop_assert_eq!(q as usize, responsible);
        }
    }

    /// Any sequence of mutations raises the version by exactly one each step,
    /// and rollback never changes status.
    #[test]
    fn tender_versions_are_monotonic(
        steps in prop::collection::vec((0u8..3, status_strategy()), 1..30),
    ) {
        let mut current = tender();
        let first = current.snapshot();
        for (op, status) in steps {
            let next = match op {
                0 => current.patched(&TenderPatch {
                    name: Some(format!("name-{}", current.version)),
                    ..TenderPatch::default()
                }),
                1 => current.with_status(status),
                _ => {
                    let restored = current.restored_from(&first);
                    prop_assert_eq!(restored.status, current.status);
                    prop_assert_eq!(&restored.name, &first.name);
                    restored
                }
            };
            prop_assert_eq!(next.version, current.version + 1);
            current = next;
        }
    }

    /// Bid rollback keeps the live endorsement count.
    #[test]
    fn bid_rollback_preserves_count(count in 0u32..=MAX_QUORUM, patches in 1usize..10) {
        let mut bid = Bid::create(
            BidId::new(),
            procura_types::NewBid {
                name: "B".into(),
                description: "D".into(),
                tender_id: TenderId::new(),
                author: Author::User(UserId::new()),
            },
            MAX_QUORUM,
            Timestamp::from_secs(0),
        );
        let first = bid.snapshot();
        for i in 0..patches {
            bid = bid.patched(&BidPatch { name: Some(format!("B{i}")), description: None });
        }
        bid.endorsement_count = count;
        let restored = bid.restored_from(&first);
        prop_assert_eq!(restored.endorsement_count, count);
        prop_assert_eq!(restored.version as usize, patches + 2);
        prop_assert_eq!(restored.name, "B".to_string());
    }
}
