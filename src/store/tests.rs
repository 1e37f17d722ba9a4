use super::{ledger_key, SqliteStore, Store, CURRENT_SCHEMA_VERSION};
use rusqlite::params;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_db_path() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX_EPOCH")
        .as_nanos();
    std::env::temp_dir()
        .join(format!("tally-store-{}.sqlite", nanos))
        .display()
        .to_string()
}

fn cleanup_db_files(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let candidate = format!("{path}{suffix}");
        let _ = std::fs::remove_file(candidate);
    }
}

#[test]
fn ledger_keys_embed_the_location_name() {
    assert_eq!(ledger_key("General"), "items-General");
    assert_eq!(ledger_key("Lab 2"), "items-Lab 2");
}

#[test]
fn set_get_remove_round_trip() {
    let store = SqliteStore::open_in_memory().expect("store should open");

    assert_eq!(store.get("rooms").expect("get should succeed"), None);
    store.set("rooms", "[\"General\"]").expect("set should succeed");
    assert_eq!(
        store.get("rooms").expect("get should succeed").as_deref(),
        Some("[\"General\"]")
    );

    store.set("rooms", "[]").expect("overwrite should succeed");
    assert_eq!(
        store.get("rooms").expect("get should succeed").as_deref(),
        Some("[]")
    );

    store.remove("rooms").expect("remove should succeed");
    assert_eq!(store.get("rooms").expect("get should succeed"), None);
}

#[test]
fn clear_drops_every_key() {
    let store = SqliteStore::open_in_memory().expect("store should open");
    store.set("catalog", "[]").expect("set should succeed");
    store.set("items-General", "[]").expect("set should succeed");

    store.clear().expect("clear should succeed");
    assert_eq!(store.get("catalog").expect("get should succeed"), None);
    assert_eq!(store.get("items-General").expect("get should succeed"), None);
}

#[test]
fn on_disk_store_configures_pragmas_and_migrations() {
    let path = unique_db_path();
    let store = SqliteStore::open(path.as_ref()).expect("store should open");

    let journal_mode: String = store
        .conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .expect("journal_mode pragma should be readable");
    assert_eq!(journal_mode.to_uppercase(), "WAL");

    let applied_count: i64 = store
        .conn
        .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .expect("schema_migrations count should be queryable");
    assert_eq!(applied_count, CURRENT_SCHEMA_VERSION);

    drop(store);
    cleanup_db_files(&path);
}

#[test]
fn reopening_is_idempotent_and_keeps_values() {
    let path = unique_db_path();
    let store = SqliteStore::open(path.as_ref()).expect("first open should initialize schema");
    store.set("catalog", "[1]").expect("set should succeed");
    drop(store);

    let store = SqliteStore::open(path.as_ref()).expect("second open should be idempotent");
    assert_eq!(
        store.get("catalog").expect("get should succeed").as_deref(),
        Some("[1]")
    );
    let exists: i64 = store
        .conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='kv')",
            params![],
            |row| row.get(0),
        )
        .expect("table existence query should be readable");
    assert_eq!(exists, 1);

    drop(store);
    cleanup_db_files(&path);
}
