//! KV registrar writing through the etcd JSON gateway.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use dns_registrar::registrar::{KvHostRecord, KvRegistrar, Registrar};
use dns_registrar::store::{EtcdStore, KvStore};
use dns_registrar::{RegistrarError, StoreError};

async fn setup() -> (MockEtcd, EtcdStore) {
    let etcd = MockEtcd::new();
    let endpoint = etcd.start().await;
    let store = EtcdStore::new(&endpoint, Duration::from_secs(1)).unwrap();
    (etcd, store)
}

#[tokio::test]
async fn update_writes_skydns_record() {
    let (etcd, store) = setup().await;
    let registrar = KvRegistrar::new(Arc::new(store));

    registrar.update("svc", "10.0.0.1", SUFFIX).await.unwrap();

    let value = etcd.get(SVC_KEY).expect("record written under skydns key");
    let record: KvHostRecord = serde_json::from_str(&value).unwrap();
    assert_eq!(record.host, "10.0.0.1");
    assert_eq!(record.ttl, 3600);
}

#[tokio::test]
async fn update_then_delete_leaves_no_record() {
    let (etcd, store) = setup().await;
    let registrar = KvRegistrar::new(Arc::new(store.clone()));

    registrar.update("svc", "10.0.0.1", SUFFIX).await.unwrap();
    registrar.delete("svc", SUFFIX).await.unwrap();

    assert_eq!(etcd.len(), 0);
    assert_eq!(store.get(SVC_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn delete_never_registered_is_ok() {
    let (etcd, store) = setup().await;
    let registrar = KvRegistrar::new(Arc::new(store));

    registrar.delete("ghost", SUFFIX).await.unwrap();
    assert_eq!(etcd.len(), 0);
}

#[tokio::test]
async fn store_get_roundtrips_through_gateway() {
    let (_etcd, store) = setup().await;

    store.put("/skydns/com/example/a", "{\"host\":\"1.1.1.1\"}").await.unwrap();
    assert_eq!(
        store.get("/skydns/com/example/a").await.unwrap().as_deref(),
        Some("{\"host\":\"1.1.1.1\"}")
    );
    assert!(store.delete("/skydns/com/example/a").await.unwrap());
    assert!(!store.delete("/skydns/com/example/a").await.unwrap());
}

#[tokio::test]
async fn unavailable_gateway_surfaces_store_error() {
    let (etcd, store) = setup().await;
    let registrar = KvRegistrar::new(Arc::new(store));
    etcd.set_unavailable(true);

    let err = registrar.update("svc", "10.0.0.1", SUFFIX).await.unwrap_err();
    assert!(matches!(err, RegistrarError::Store(StoreError::Status { .. })));
    assert!(err.is_transient());

    etcd.set_unavailable(false);
    assert_eq!(etcd.len(), 0);
}

#[tokio::test]
async fn zero_deadline_leaves_gateway_untouched() {
    let (etcd, store) = setup().await;
    let registrar = KvRegistrar::new(Arc::new(store)).with_write_timeout(Duration::ZERO);

    let err = registrar.update("svc", "10.0.0.1", SUFFIX).await.unwrap_err();
    assert!(matches!(err, RegistrarError::DeadlineExceeded(_)));
    assert_eq!(etcd.len(), 0);
}
