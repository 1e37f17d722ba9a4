use crate::domain::asset::{normalize_tag, AssetRecord};
use crate::store::{Store, StoreError, CATALOG_KEY};

/// The immutable universe of expected assets, in import order. Read-only to
/// the engine; replaced wholesale by the import subsystem, which also wipes
/// every ledger in the same pass.
pub fn load(store: &dyn Store) -> Result<Vec<AssetRecord>, StoreError> {
    let records = store
        .get(CATALOG_KEY)?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    Ok(records)
}

pub(crate) fn replace(store: &dyn Store, records: &[AssetRecord]) -> Result<(), StoreError> {
    let encoded =
        serde_json::to_string(records).expect("asset records should serialize to JSON");
    store.set(CATALOG_KEY, &encoded)
}

/// Catalog lookup by normalized tag code.
pub fn find<'a>(records: &'a [AssetRecord], code: &str) -> Option<&'a AssetRecord> {
    let normalized = normalize_tag(code);
    records.iter().find(|record| record.matches_tag(&normalized))
}
