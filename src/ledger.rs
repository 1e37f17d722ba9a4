use crate::domain::asset::{normalize_tag, AssetRecord};
use crate::store::{ledger_key, Store, StoreError};

/// Per-location list of assets physically confirmed there, most recently
/// added first. For the catch-all location this holds only manual overrides
/// and manual extras; its displayed view is computed by the reconciler.
pub fn load(store: &dyn Store, location: &str) -> Result<Vec<AssetRecord>, StoreError> {
    let records = store
        .get(&ledger_key(location))?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    Ok(records)
}

/// Whole-sequence replace. Callers read, modify, and save under the
/// location's lock; there are no partial updates.
pub fn save(store: &dyn Store, location: &str, records: &[AssetRecord]) -> Result<(), StoreError> {
    let encoded =
        serde_json::to_string(records).expect("asset records should serialize to JSON");
    store.set(&ledger_key(location), &encoded)
}

pub fn remove(store: &dyn Store, location: &str) -> Result<(), StoreError> {
    store.remove(&ledger_key(location))
}

pub fn contains(store: &dyn Store, location: &str, code: &str) -> Result<bool, StoreError> {
    let normalized = normalize_tag(code);
    Ok(load(store, location)?
        .iter()
        .any(|record| record.matches_tag(&normalized)))
}
