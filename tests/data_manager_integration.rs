//! Integration tests for the data manager read/write pipeline
//!
//! Run with: cargo test --test data_manager_integration

use std::sync::Arc;
use std::time::Duration;

use santseva_store::blob::BlobStore;
use santseva_store::data::{
    Collection, DataError, DataManager, DataManagerConfig, Mode, SyncStatus,
};
use santseva_store::store::{KeyValueStore, MemoryKeyValueStore, StorageError};
use santseva_store::test_utils::MockAdapter;
use serde_json::json;
use tempfile::TempDir;

struct Harness {
    manager: DataManager,
    store: Arc<MemoryKeyValueStore>,
    _media: TempDir,
}

async fn harness(store: MemoryKeyValueStore, mode: Mode, adapter: Option<Arc<MockAdapter>>) -> Harness {
    let store = Arc::new(store);
    let media = TempDir::new().unwrap();
    let blobs = BlobStore::new(media.path()).unwrap();

    let mut builder = DataManager::builder(store.clone(), blobs).with_config(
        DataManagerConfig::default()
            .with_latency(Duration::ZERO)
            .with_initial_mode(mode),
    );
    if let Some(adapter) = adapter {
        builder = builder.with_adapter(adapter);
    }

    Harness {
        manager: builder.build().await,
        store,
        _media: media,
    }
}

fn ids(records: &[serde_json::Value]) -> Vec<&str> {
    records.iter().filter_map(|r| r["id"].as_str()).collect()
}

#[tokio::test]
async fn test_fresh_local_system_seeds_demo_blogs() {
    let h = harness(MemoryKeyValueStore::new(), Mode::Local, None).await;

    let blogs = h.manager.get_all(Collection::Blogs).await;
    assert_eq!(ids(&blogs), ["b1", "b2"]);

    // Seeding goes through the save path
    assert!(h.store.get("santseva_blogs").await.unwrap().is_some());
    assert!(h.store.get("cache_blogs").await.unwrap().is_some());
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let h = harness(MemoryKeyValueStore::new(), Mode::Local, None).await;

    let first = h.manager.get_all(Collection::Events).await;
    let second = h.manager.get_all(Collection::Events).await;

    assert_eq!(ids(&first), ["evt_1", "evt_2", "evt_3", "evt_4"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_every_read_yields_a_vector() {
    let broken = Arc::new(MockAdapter::new(Mode::Supabase));
    broken.set_fail_fetch(true);
    broken.set_fail_save(true);

    let configurations = vec![
        (Mode::Local, None),
        (Mode::GitHub, None),
        (Mode::Drive, Some(Arc::new(MockAdapter::new(Mode::Drive).unconfigured()))),
        (Mode::Supabase, Some(broken)),
    ];

    for (mode, adapter) in configurations {
        let h = harness(MemoryKeyValueStore::new(), mode, adapter).await;
        for collection in Collection::ALL {
            let records = h.manager.get_all(collection).await;
            assert!(!records.is_empty(), "{} in {} mode", collection, mode);
        }
    }
}

#[tokio::test]
async fn test_failing_remote_falls_back_to_cache() {
    let remote = Arc::new(MockAdapter::new(Mode::GitHub));
    remote.set_fail_fetch(true);

    let store = MemoryKeyValueStore::new();
    store
        .set("cache_events", r#"[{"id":"cached_evt"}]"#)
        .await
        .unwrap();

    let h = harness(store, Mode::GitHub, Some(remote.clone())).await;
    let events = h.manager.get_all(Collection::Events).await;

    assert_eq!(ids(&events), ["cached_evt"]);
    assert_eq!(remote.calls(), vec!["connect", "fetch:events"]);
}

#[tokio::test]
async fn test_save_then_read_with_unreachable_remote() {
    let remote = Arc::new(MockAdapter::new(Mode::Supabase));
    remote.set_fail_fetch(true);
    remote.set_fail_save(true);

    let h = harness(MemoryKeyValueStore::new(), Mode::Supabase, Some(remote)).await;
    let subscribers = vec![json!({"id": "s9", "name": "पांडुरंग भजनी मंडळ", "district": "सांगली"})];

    let pending = h
        .manager
        .save(Collection::Subscribers, &subscribers)
        .await
        .unwrap();
    assert_eq!(h.manager.get_all(Collection::Subscribers).await, subscribers);

    let status = pending.wait().await;
    assert!(matches!(status, SyncStatus::Failed { backend: Mode::Supabase, .. }));
    assert_eq!(h.manager.get_all(Collection::Subscribers).await, subscribers);
}

#[tokio::test]
async fn test_successful_remote_fetch_replaces_stale_cache() {
    let remote = Arc::new(
        MockAdapter::new(Mode::Supabase)
            .with_records(Collection::Events, vec![json!({"id": "fresh"})]),
    );

    let store = MemoryKeyValueStore::new();
    store.set("cache_events", r#"[{"id":"stale"}]"#).await.unwrap();

    let h = harness(store, Mode::Supabase, Some(remote)).await;
    let events = h.manager.get_all(Collection::Events).await;

    assert_eq!(ids(&events), ["fresh"]);
    assert_eq!(
        h.store.get("cache_events").await.unwrap().unwrap(),
        r#"[{"id":"fresh"}]"#
    );
}

#[tokio::test]
async fn test_empty_remote_collection_is_authoritative() {
    let remote = Arc::new(MockAdapter::new(Mode::GitHub));
    let h = harness(MemoryKeyValueStore::new(), Mode::GitHub, Some(remote.clone())).await;

    assert!(h.manager.get_all(Collection::Blogs).await.is_empty());
    assert!(!remote.calls().iter().any(|c| c.starts_with("save")));
}

#[tokio::test]
async fn test_remote_records_survive_switch_to_local() {
    let remote = Arc::new(
        MockAdapter::new(Mode::Supabase)
            .with_records(Collection::Events, vec![json!({"id": "x1", "title": "कीर्तन"})]),
    );
    let h = harness(MemoryKeyValueStore::new(), Mode::Supabase, Some(remote)).await;

    let events = h.manager.get_all(Collection::Events).await;
    assert_eq!(events, vec![json!({"id": "x1", "title": "कीर्तन"})]);

    h.manager.set_mode(Mode::Local).await.unwrap();
    assert_eq!(h.manager.get_all(Collection::Events).await, events);
}

#[tokio::test]
async fn test_failed_save_leaves_no_partial_entry() {
    let h = harness(MemoryKeyValueStore::new(), Mode::Local, None).await;
    h.store.set_writes_disabled(true);

    let settings = vec![json!({"id": "daily_abhang", "value": {"sant": "संत नामदेव"}})];
    let err = h
        .manager
        .save(Collection::Settings, &settings)
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::Storage(_)));
    assert!(h.store.get("santseva_settings").await.unwrap().is_none());
    assert!(h.store.get("cache_settings").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_cache_write_restores_primary_entry() {
    let previous = vec![json!({"id": "daily_abhang", "value": "a"})];
    let next = vec![json!({"id": "daily_abhang", "value": "वृक्ष वल्ली आम्हां सोयरीं वनचरें"})];
    let previous_json = serde_json::to_string(&previous).unwrap();
    let next_json = serde_json::to_string(&next).unwrap();

    // Room for the new primary beside the old cache, not for both new entries
    let quota = ("santseva_settings".len()
        + "cache_settings".len()
        + previous_json.len()
        + next_json.len()) as u64;

    let h = harness(MemoryKeyValueStore::with_quota(quota), Mode::Local, None).await;
    h.manager.save(Collection::Settings, &previous).await.unwrap();

    let err = h.manager.save(Collection::Settings, &next).await.unwrap_err();
    assert!(matches!(
        err,
        DataError::Storage(StorageError::QuotaExceeded { .. })
    ));
    assert!(err.is_recoverable());

    assert_eq!(
        h.store.get("santseva_settings").await.unwrap().unwrap(),
        previous_json
    );
    assert_eq!(
        h.store.get("cache_settings").await.unwrap().unwrap(),
        previous_json
    );
    assert_eq!(h.manager.get_all(Collection::Settings).await, previous);
}

#[tokio::test]
async fn test_corrupt_local_entries_are_treated_as_missing() {
    let store = MemoryKeyValueStore::new();
    store.set("santseva_inquiries", "{not json").await.unwrap();
    store.set("cache_inquiries", "42").await.unwrap();

    let h = harness(store, Mode::Local, None).await;
    let inquiries = h.manager.get_all(Collection::Inquiries).await;

    assert_eq!(ids(&inquiries), ["inq_1", "inq_2", "inq_3"]);
    let repaired: Vec<serde_json::Value> =
        serde_json::from_str(&h.store.get("santseva_inquiries").await.unwrap().unwrap()).unwrap();
    assert_eq!(repaired, inquiries);
}

#[tokio::test]
async fn test_save_returns_before_remote_push_completes() {
    let remote = Arc::new(MockAdapter::new(Mode::GitHub));
    let gate = remote.gate_saves();
    let h = harness(MemoryKeyValueStore::new(), Mode::GitHub, Some(remote.clone())).await;

    let blogs = vec![json!({"id": "b3", "title": "हरिपाठाचे महत्त्व"})];
    let pending = h.manager.save(Collection::Blogs, &blogs).await.unwrap();

    assert!(pending.is_remote());
    assert_eq!(pending.backend(), Some(Mode::GitHub));
    assert!(remote.stored(Collection::Blogs).is_none());

    gate.notify_one();
    assert_eq!(
        pending.wait().await,
        SyncStatus::Synced {
            backend: Mode::GitHub
        }
    );
    assert_eq!(remote.stored(Collection::Blogs), Some(blogs));
}

#[tokio::test]
async fn test_dropped_handle_still_pushes() {
    let remote = Arc::new(MockAdapter::new(Mode::Drive));
    let h = harness(MemoryKeyValueStore::new(), Mode::Drive, Some(remote.clone())).await;

    let posts = vec![json!({"id": "sp3", "platform": "YouTube"})];
    drop(h.manager.save(Collection::SocialPosts, &posts).await.unwrap());

    for _ in 0..100 {
        if remote.stored(Collection::SocialPosts).is_some() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(remote.stored(Collection::SocialPosts), Some(posts));
}

#[tokio::test]
async fn test_local_mode_saves_are_cached_only() {
    let remote = Arc::new(MockAdapter::new(Mode::GitHub));
    let h = harness(MemoryKeyValueStore::new(), Mode::Local, Some(remote.clone())).await;

    let pending = h
        .manager
        .save(Collection::Events, &[json!({"id": "evt_local"})])
        .await
        .unwrap();
    assert!(!pending.is_remote());
    assert_eq!(pending.wait().await, SyncStatus::CachedOnly);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_unconfigured_remote_is_skipped() {
    let remote = Arc::new(MockAdapter::new(Mode::Supabase).unconfigured());
    let h = harness(MemoryKeyValueStore::new(), Mode::Supabase, Some(remote.clone())).await;

    let events = h.manager.get_all(Collection::Events).await;
    assert_eq!(events.len(), 4);
    assert!(!remote.calls().iter().any(|c| c.starts_with("fetch")));

    let status = h
        .manager
        .save(Collection::Events, &events)
        .await
        .unwrap()
        .wait()
        .await;
    assert_eq!(status, SyncStatus::CachedOnly);
}

#[tokio::test]
async fn test_slow_fetch_overwrites_cache_after_save() {
    // Last completion wins: a fetch that started before a save lands afterwards.
    let remote = Arc::new(
        MockAdapter::new(Mode::Supabase).with_records(Collection::Events, vec![json!({"id": "old"})]),
    );
    let gate = remote.gate_fetches();
    let h = harness(MemoryKeyValueStore::new(), Mode::Supabase, Some(remote.clone())).await;
    let manager = Arc::new(h.manager);

    let reader = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.get_all(Collection::Events).await })
    };
    remote.fetch_started().await;

    let status = manager
        .save(Collection::Events, &[json!({"id": "new"})])
        .await
        .unwrap()
        .wait()
        .await;
    assert!(status.is_synced());

    gate.notify_one();
    let read = reader.await.unwrap();
    assert_eq!(ids(&read), ["old"]);

    assert_eq!(
        h.store.get("santseva_events").await.unwrap().unwrap(),
        r#"[{"id":"new"}]"#
    );
    assert_eq!(
        h.store.get("cache_events").await.unwrap().unwrap(),
        r#"[{"id":"old"}]"#
    );
}

#[tokio::test(start_paused = true)]
async fn test_latency_applies_only_in_local_mode() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let media = TempDir::new().unwrap();
    let manager = DataManager::builder(store, BlobStore::new(media.path()).unwrap())
        .with_adapter(Arc::new(MockAdapter::new(Mode::GitHub)))
        .build()
        .await;

    let start = tokio::time::Instant::now();
    manager.get_all(Collection::Blogs).await;
    assert!(start.elapsed() >= Duration::from_millis(600));

    let start = tokio::time::Instant::now();
    manager
        .save(Collection::Blogs, &[json!({"id": "b1"})])
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(600));

    let start = tokio::time::Instant::now();
    manager
        .save_with_delay(Collection::Blogs, &[json!({"id": "b1"})], false)
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(600));

    manager.set_mode(Mode::GitHub).await.unwrap();
    let start = tokio::time::Instant::now();
    manager.get_all(Collection::Blogs).await;
    assert!(start.elapsed() < Duration::from_millis(600));
}
