//! Contract Test: Populate
//!
//! Verifies how remote records become canonical records.
//!
//! Constraints verified:
//! - `@` names map to the apex and `@` values to the zone name
//! - TTL fallback: explicit, NS from SOA refresh, default TTL
//! - Records group by `(name, type)` in first-seen order
//! - SOA is skipped, unknown types abort the zone
//! - Missing zones and views are reported, not ignored
//! - A rejected duplicate leaves the zone as it was

mod common;

use common::*;
use netbox_dns_core::model::{CanonicalRecord, DecodedValue, MxValue, RecordType, Zone};
use netbox_dns_core::store::MemoryRecordStore;
use netbox_dns_core::{Error, NetboxDnsSource, ViewSelector};
use tokio_test::{assert_err, assert_ok};

async fn example_zone() -> (MemoryRecordStore, u64) {
    let store = MemoryRecordStore::new();
    let zone = store
        .add_zone("example.com", None, Some(3600), Some(86400))
        .await;
    (store, zone.id)
}

#[tokio::test]
async fn apex_name_and_value_are_normalized() {
    let (store, zone_id) = example_zone().await;
    store.add_record(zone_id, "@", "A", "192.0.2.1", None).await;
    store.add_record(zone_id, "alias", "CNAME", "@", None).await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    assert!(assert_ok!(source.populate(&mut zone, false).await));

    let apex = zone.get("", RecordType::A).expect("apex record");
    assert_eq!(apex.ttl, 3600);
    assert_eq!(
        apex.value(),
        Some(&DecodedValue::Address("192.0.2.1".to_string()))
    );

    let alias = zone.get("alias", RecordType::Cname).expect("alias record");
    assert_eq!(
        alias.value(),
        Some(&DecodedValue::Name("example.com".to_string()))
    );
}

#[tokio::test]
async fn ttl_fallback_rules() {
    let (store, zone_id) = example_zone().await;
    store
        .add_record(zone_id, "@", "NS", "ns1.example.com.", None)
        .await;
    store
        .add_record(zone_id, "sub", "NS", "ns2.example.com.", Some(600))
        .await;
    store.add_record(zone_id, "www", "A", "192.0.2.1", None).await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    assert_ok!(source.populate(&mut zone, false).await);

    assert_eq!(zone.get("", RecordType::Ns).unwrap().ttl, 86400);
    assert_eq!(zone.get("sub", RecordType::Ns).unwrap().ttl, 600);
    assert_eq!(zone.get("www", RecordType::A).unwrap().ttl, 3600);
}

#[tokio::test]
async fn zone_without_default_ttl_uses_configured_ttl() {
    let store = MemoryRecordStore::new();
    let remote = store.add_zone("example.com", None, None, None).await;
    store
        .add_record(remote.id, "www", "A", "192.0.2.1", None)
        .await;

    let mut config = minimal_config();
    config.ttl = 900;
    let (source, _) = source_with_config(&store, config).await;

    let mut zone = Zone::new("example.com.");
    assert_ok!(source.populate(&mut zone, false).await);
    assert_eq!(zone.get("www", RecordType::A).unwrap().ttl, 900);
}

#[tokio::test]
async fn values_coalesce_in_first_seen_order() {
    let (store, zone_id) = example_zone().await;
    store
        .add_record(zone_id, "@", "MX", "10 mail1.example.com.", Some(300))
        .await;
    store.add_record(zone_id, "www", "A", "192.0.2.1", None).await;
    store
        .add_record(zone_id, "@", "MX", "20 mail2.example.com.", Some(600))
        .await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    assert_ok!(source.populate(&mut zone, false).await);

    assert_eq!(zone.len(), 2);
    assert_eq!(zone.records()[0].record_type, RecordType::Mx);
    assert_eq!(zone.records()[1].record_type, RecordType::A);

    let mx = zone.get("", RecordType::Mx).unwrap();
    assert_eq!(mx.ttl, 300);
    assert_eq!(
        mx.values,
        vec![
            DecodedValue::Mx(MxValue {
                preference: 10,
                exchange: "mail1.example.com.".to_string(),
            }),
            DecodedValue::Mx(MxValue {
                preference: 20,
                exchange: "mail2.example.com.".to_string(),
            }),
        ]
    );
}

#[tokio::test]
async fn soa_is_skipped_silently() {
    let (store, zone_id) = example_zone().await;
    store
        .add_record(
            zone_id,
            "@",
            "SOA",
            "ns1.example.com. hostmaster.example.com. 1 7200 3600 1209600 3600",
            None,
        )
        .await;
    store.add_record(zone_id, "www", "A", "192.0.2.1", None).await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    assert_ok!(source.populate(&mut zone, false).await);

    assert_eq!(zone.len(), 1);
    assert!(zone.get("", RecordType::Soa).is_none());
}

#[tokio::test]
async fn unknown_type_aborts_populate() {
    let (store, zone_id) = example_zone().await;
    store.add_record(zone_id, "www", "A", "192.0.2.1", None).await;
    store
        .add_record(zone_id, "odd", "BOGUS", "whatever", None)
        .await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    let err = assert_err!(source.populate(&mut zone, false).await);

    match err {
        Error::Decode {
            name,
            record_type,
            value,
            ..
        } => {
            assert_eq!(name, "odd");
            assert_eq!(record_type, "BOGUS");
            assert_eq!(value, "whatever");
        }
        other => panic!("expected decode error, got {:?}", other),
    }
    // No partial zone
    assert!(zone.is_empty());
}

#[tokio::test]
async fn malformed_value_aborts_populate() {
    let (store, zone_id) = example_zone().await;
    store
        .add_record(zone_id, "@", "MX", "not-a-number mail.example.com.", None)
        .await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    let result = source.populate(&mut zone, false).await;
    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[tokio::test]
async fn empty_zone_populates_nothing() {
    let (store, _) = example_zone().await;

    let (source, recording) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    assert!(assert_ok!(source.populate(&mut zone, false).await));
    assert!(zone.is_empty());
    assert_eq!(recording.filter_call_count(), 1);
}

#[tokio::test]
async fn missing_zone_is_reported() {
    let store = MemoryRecordStore::new();
    let (source, recording) = source_for(&store).await;

    let mut zone = Zone::new("absent.example.");
    let err = assert_err!(source.populate(&mut zone, false).await);
    assert!(matches!(err, Error::ZoneNotFound { ref zone, .. } if zone == "absent.example"));
    assert!(err.is_lookup_failure());
    assert_eq!(recording.filter_call_count(), 0);
}

#[tokio::test]
async fn unknown_view_fails_construction() {
    let store = MemoryRecordStore::new();
    let config = minimal_config().with_view(ViewSelector::Named("nowhere".to_string()));

    let result = NetboxDnsSource::new(Box::new(store), config).await;
    assert!(matches!(result, Err(Error::ViewNotFound(_))));
}

#[tokio::test]
async fn view_selects_between_same_named_zones() {
    let store = MemoryRecordStore::new();
    let internal = store.add_view("internal").await;
    let plain = store.add_zone("example.com", None, Some(3600), None).await;
    let scoped = store
        .add_zone("example.com", Some(internal.id), Some(3600), None)
        .await;
    store.add_record(plain.id, "www", "A", "192.0.2.1", None).await;
    store
        .add_record(scoped.id, "www", "A", "10.0.0.1", None)
        .await;

    let config = minimal_config().with_view(ViewSelector::Named("internal".to_string()));
    let (source, _) = source_with_config(&store, config).await;
    let mut zone = Zone::new("example.com.");
    assert_ok!(source.populate(&mut zone, false).await);
    assert_eq!(
        zone.get("www", RecordType::A).unwrap().value(),
        Some(&DecodedValue::Address("10.0.0.1".to_string()))
    );

    let config = minimal_config().with_view(ViewSelector::Unassigned);
    let (source, _) = source_with_config(&store, config).await;
    let mut zone = Zone::new("example.com.");
    assert_ok!(source.populate(&mut zone, false).await);
    assert_eq!(
        zone.get("www", RecordType::A).unwrap().value(),
        Some(&DecodedValue::Address("192.0.2.1".to_string()))
    );
}

#[tokio::test]
async fn duplicates_follow_replace_setting() {
    let (store, zone_id) = example_zone().await;
    store.add_record(zone_id, "www", "A", "192.0.2.1", None).await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    assert_ok!(source.populate(&mut zone, false).await);
    let err = assert_err!(source.populate(&mut zone, false).await);
    assert!(matches!(err, Error::DuplicateRecord { .. }));

    let mut config = minimal_config();
    config.replace_duplicates = true;
    let (source, _) = source_with_config(&store, config).await;
    assert_ok!(source.populate(&mut zone, false).await);
    assert_eq!(zone.len(), 1);
}

#[tokio::test]
async fn rejected_duplicate_leaves_zone_unchanged() {
    let (store, zone_id) = example_zone().await;
    store.add_record(zone_id, "www", "A", "192.0.2.1", None).await;
    store.add_record(zone_id, "mail", "A", "192.0.2.2", None).await;

    let (source, _) = source_for(&store).await;
    let mut zone = Zone::new("example.com.");
    zone.add_record(
        CanonicalRecord::new("mail", RecordType::A, 60)
            .with_value(DecodedValue::Address("192.0.2.99".to_string())),
        false,
    )
    .unwrap();

    let err = assert_err!(source.populate(&mut zone, false).await);
    assert!(matches!(err, Error::DuplicateRecord { ref name, .. } if name == "mail"));
    assert_eq!(zone.len(), 1);
    assert!(zone.get("www", RecordType::A).is_none());
}
