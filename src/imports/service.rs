use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::catalog;
use crate::domain::asset::{normalize_tag, AssetRecord, AssetStatus};
use crate::ledger;
use crate::locks::LockSet;
use crate::registry::Registry;
use crate::store::{now_utc_rfc3339, Store, IMPORT_META_KEY};

use super::errors::ImportError;
use super::source::{
    detect_columns, pairs_from_rows, read_csv_rows, read_jsonl_pairs, SourceFormat,
};

/// Replaces the master catalog from a tabular source. The reset-then-replace
/// sequencing is mandatory: every ledger is wiped and the registry collapses
/// to the catch-all before the new catalog lands, so no ledger can reference
/// a stale catalog.
pub struct ImportService<'a> {
    store: &'a dyn Store,
    registry: &'a Registry,
    locks: &'a LockSet,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub source_ref: String,
    pub format: String,
    pub imported_count: u64,
    pub skipped_count: u64,
    pub dry_run: bool,
    pub fingerprint: String,
    pub imported_at: String,
}

/// Bookkeeping for the previous import, kept under its own store key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImportMeta {
    fingerprint: String,
    source_ref: String,
    imported_at: String,
    imported_count: u64,
}

impl<'a> ImportService<'a> {
    pub fn new(store: &'a dyn Store, registry: &'a Registry, locks: &'a LockSet) -> Self {
        Self {
            store,
            registry,
            locks,
        }
    }

    pub fn import_file(
        &self,
        path: &Path,
        format: Option<SourceFormat>,
        dry_run: bool,
        force: bool,
    ) -> Result<ImportSummary, ImportError> {
        let source_ref = path.display().to_string();
        let format = format
            .or_else(|| SourceFormat::from_path(path))
            .ok_or_else(|| ImportError::UnknownFormat(source_ref.clone()))?;

        let bytes = std::fs::read(path)?;
        let fingerprint = fingerprint(&bytes);
        if !force {
            if let Some(previous) = self.load_meta()? {
                if previous.fingerprint == fingerprint {
                    return Err(ImportError::AlreadyImported(source_ref));
                }
            }
        }

        let pairs = match format {
            SourceFormat::Csv => {
                let rows = read_csv_rows(path)?;
                let layout = detect_columns(&rows)?;
                pairs_from_rows(&rows, layout)
            }
            SourceFormat::Jsonl => read_jsonl_pairs(path)?,
        };

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(pairs.len());
        let mut skipped = 0u64;
        for (tag, name) in pairs {
            if !seen.insert(normalize_tag(&tag)) {
                skipped += 1;
                continue;
            }
            records.push(AssetRecord::new(tag, name, AssetStatus::Absent));
        }
        if records.is_empty() {
            return Err(ImportError::EmptySource(source_ref));
        }

        let imported_at = now_utc_rfc3339();
        let summary = ImportSummary {
            source_ref: source_ref.clone(),
            format: format.as_str().to_string(),
            imported_count: records.len() as u64,
            skipped_count: skipped,
            dry_run,
            fingerprint: fingerprint.clone(),
            imported_at: imported_at.clone(),
        };
        if dry_run {
            return Ok(summary);
        }

        let _guard = self.locks.store_wide()?;

        for location in self.registry.list(self.store)? {
            ledger::remove(self.store, &location)?;
        }
        self.registry.reset(self.store)?;
        catalog::replace(self.store, &records)?;
        self.save_meta(&ImportMeta {
            fingerprint,
            source_ref,
            imported_at,
            imported_count: records.len() as u64,
        })?;

        Ok(summary)
    }

    fn load_meta(&self) -> Result<Option<ImportMeta>, ImportError> {
        Ok(self
            .store
            .get(IMPORT_META_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    fn save_meta(&self, meta: &ImportMeta) -> Result<(), ImportError> {
        let encoded =
            serde_json::to_string(meta).expect("import bookkeeping should serialize to JSON");
        self.store.set(IMPORT_META_KEY, &encoded)?;
        Ok(())
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
