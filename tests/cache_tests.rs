/// Persistent cache tests.
///
/// Cover the JSON-file store across process "restarts": entries written by
/// one cache are visible to the next until they expire, and damaged files
/// or entries never surface as errors.
use std::fs;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use revlens::cache::store::{FileStore, KeyValueStore};
use revlens::cache::{CACHE_PREFIX, ExpiringCache, filter_key};
use revlens::model::DimensionSummaries;
use revlens::utils::clock::ManualClock;

const TTL: Duration = Duration::from_secs(12 * 3600);

fn clock() -> ManualClock {
    ManualClock::starting_at(Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap())
}

fn summaries() -> DimensionSummaries {
    serde_json::from_str(r#"{"Operations": {"negative": {"summary": "Billing delays"}}}"#).unwrap()
}

#[test]
fn entries_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let clock = clock();
    let key = filter_key("2024-01-01", "2024-06-30");

    let mut first = ExpiringCache::new(Box::new(FileStore::open(&path)), clock.shared(), TTL);
    first.set(&key, &summaries()).unwrap();
    drop(first);

    let mut second = ExpiringCache::new(Box::new(FileStore::open(&path)), clock.shared(), TTL);
    let cached: DimensionSummaries = second.get(&key).unwrap();
    assert_eq!(cached, summaries());
}

#[test]
fn expiry_is_checked_against_the_injected_clock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let clock = clock();
    let key = filter_key("2024-01-01", "2024-06-30");

    let mut cache = ExpiringCache::new(Box::new(FileStore::open(&path)), clock.shared(), TTL);
    cache.set(&key, &summaries()).unwrap();

    clock.advance(TTL - Duration::from_millis(1));
    assert!(cache.get::<DimensionSummaries>(&key).is_some());

    clock.advance(Duration::from_millis(1));
    assert!(cache.get::<DimensionSummaries>(&key).is_none());

    // The eviction was persisted.
    let reopened = FileStore::open(&path);
    assert!(reopened.get(&key).is_none());
}

#[test]
fn corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    fs::write(&path, "{ not json").unwrap();

    let mut cache = ExpiringCache::new(Box::new(FileStore::open(&path)), clock().shared(), TTL);
    assert!(cache.get::<DimensionSummaries>("filter_a_b").is_none());

    cache.set("filter_a_b", &summaries()).unwrap();
    assert!(cache.get::<DimensionSummaries>("filter_a_b").is_some());
}

#[test]
fn corrupt_entry_is_evicted_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let mut store = FileStore::open(&path);
    store.set("filter_x_y", "garbage".to_string());
    store.set("filter_w_z", r#"{"value": 1}"#.to_string());

    let mut cache = ExpiringCache::new(Box::new(store), clock().shared(), TTL);
    assert!(cache.get::<DimensionSummaries>("filter_x_y").is_none());
    assert!(cache.get::<DimensionSummaries>("filter_w_z").is_none());
    assert_eq!(cache.evictions(), 2);
    assert!(cache.live_keys(CACHE_PREFIX).is_empty());
}

#[test]
fn sweep_and_clear_only_touch_the_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let clock = clock();
    let mut store = FileStore::open(&path);
    store.set("settings_theme", "\"dark\"".to_string());

    let mut cache = ExpiringCache::new(Box::new(store), clock.shared(), TTL);
    cache.set(&filter_key("2023-01-01", "2023-12-31"), &summaries()).unwrap();
    clock.advance(TTL);
    cache.set(&filter_key("2024-01-01", "2024-12-31"), &summaries()).unwrap();

    assert_eq!(cache.sweep_expired(CACHE_PREFIX), 1);
    assert_eq!(
        cache.live_keys(CACHE_PREFIX),
        vec![filter_key("2024-01-01", "2024-12-31")]
    );
    assert_eq!(cache.clear_matching_prefix(CACHE_PREFIX), 1);

    let reopened = FileStore::open(&path);
    assert_eq!(reopened.keys(), vec!["settings_theme".to_string()]);
}
