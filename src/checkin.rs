use std::error::Error;
use std::fmt;

use crate::catalog;
use crate::domain::asset::{normalize_tag, AssetRecord, AssetStatus};
use crate::ledger;
use crate::locks::{LockError, LockSet};
use crate::registry::Registry;
use crate::store::{Store, StoreError};

/// The transactional state transitions of the inventory: check an asset in
/// at one location, check it back out, or add a manual extra to the
/// catch-all. Every outcome is terminal; a rejection writes nothing.
pub struct CheckinService<'a> {
    store: &'a dyn Store,
    registry: &'a Registry,
    locks: &'a LockSet,
}

#[derive(Debug)]
pub enum CheckinError {
    Validation(String),
    NotFound(String),
    UnknownLocation(String),
    AlreadyElsewhere { code: String, location: String },
    AlreadyCheckedIn { code: String, location: String },
    NotStored {
        code: String,
        location: String,
        catalog_origin: bool,
    },
    Store(StoreError),
    Lock(LockError),
}

impl fmt::Display for CheckinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckinError::Validation(message) => write!(f, "{}", message),
            CheckinError::NotFound(code) => {
                write!(f, "tag '{}' is not in the imported catalog", code)
            }
            CheckinError::UnknownLocation(name) => {
                write!(f, "location '{}' is not registered", name)
            }
            CheckinError::AlreadyElsewhere { code, location } => {
                write!(f, "tag '{}' is already checked in at '{}'", code, location)
            }
            CheckinError::AlreadyCheckedIn { code, location } => {
                write!(f, "tag '{}' is already checked in here ('{}')", code, location)
            }
            CheckinError::NotStored {
                code,
                location,
                catalog_origin,
            } => {
                if *catalog_origin {
                    write!(
                        f,
                        "tag '{}' is a catalog entry shown at '{}' but never stored there; \
                         check it in before checking it out",
                        code, location
                    )
                } else {
                    write!(f, "tag '{}' has no stored entry at '{}'", code, location)
                }
            }
            CheckinError::Store(err) => write!(f, "storage error: {}", err),
            CheckinError::Lock(err) => write!(f, "{}", err),
        }
    }
}

impl Error for CheckinError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CheckinError::Store(err) => Some(err),
            CheckinError::Lock(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CheckinError {
    fn from(value: StoreError) -> Self {
        CheckinError::Store(value)
    }
}

impl From<LockError> for CheckinError {
    fn from(value: LockError) -> Self {
        CheckinError::Lock(value)
    }
}

impl<'a> CheckinService<'a> {
    pub fn new(store: &'a dyn Store, registry: &'a Registry, locks: &'a LockSet) -> Self {
        Self {
            store,
            registry,
            locks,
        }
    }

    /// Record one asset as physically present at `location`. Exactly one
    /// ledger write on success, none on rejection. The whole sequence runs
    /// under the target location's lock so a rapid double scan cannot slip
    /// two copies past the uniqueness checks.
    pub fn check_in(&self, location: &str, code: &str) -> Result<AssetRecord, CheckinError> {
        let normalized = normalize_tag(code);
        if normalized.is_empty() {
            return Err(CheckinError::Validation(
                "tag code cannot be empty".to_string(),
            ));
        }
        let target = self.resolve_location(location)?;

        let _guard = self.locks.ledger(&target)?;

        let master = catalog::load(self.store)?;
        let found = catalog::find(&master, &normalized)
            .ok_or_else(|| CheckinError::NotFound(normalized.clone()))?;

        if self.registry.is_catch_all(&target) {
            for other in self.registry.list(self.store)? {
                if self.registry.is_catch_all(&other) {
                    continue;
                }
                if ledger::contains(self.store, &other, &normalized)? {
                    return Err(CheckinError::AlreadyElsewhere {
                        code: normalized,
                        location: other,
                    });
                }
            }
        }

        let mut records = ledger::load(self.store, &target)?;
        if records.iter().any(|record| record.matches_tag(&normalized)) {
            return Err(CheckinError::AlreadyCheckedIn {
                code: normalized,
                location: target,
            });
        }

        let entry = AssetRecord::new(found.tag.clone(), found.name.clone(), AssetStatus::Present);
        records.insert(0, entry.clone());
        ledger::save(self.store, &target, &records)?;
        Ok(entry)
    }

    /// Remove one stored entry from a location's ledger. A catalog entry
    /// that is merely displayed at the catch-all was never stored there;
    /// removing it is disallowed rather than silently a no-op.
    pub fn check_out(&self, location: &str, code: &str) -> Result<AssetRecord, CheckinError> {
        let normalized = normalize_tag(code);
        if normalized.is_empty() {
            return Err(CheckinError::Validation(
                "tag code cannot be empty".to_string(),
            ));
        }
        let target = self.resolve_location(location)?;

        let _guard = self.locks.ledger(&target)?;

        let mut records = ledger::load(self.store, &target)?;
        let slot = records
            .iter()
            .position(|record| record.matches_tag(&normalized));
        match slot {
            Some(index) => {
                let removed = records.remove(index);
                ledger::save(self.store, &target, &records)?;
                Ok(removed)
            }
            None => {
                let catalog_origin = self.registry.is_catch_all(&target)
                    && catalog::find(&catalog::load(self.store)?, &normalized).is_some();
                Err(CheckinError::NotStored {
                    code: normalized,
                    location: target,
                    catalog_origin,
                })
            }
        }
    }

    /// The separate manual-entry path: a catalog-external extra goes straight
    /// into the catch-all's stored ledger with status `Manual`.
    pub fn add_manual(&self, code: &str, name: &str) -> Result<AssetRecord, CheckinError> {
        let normalized = normalize_tag(code);
        if normalized.is_empty() {
            return Err(CheckinError::Validation(
                "tag code cannot be empty".to_string(),
            ));
        }
        let display_name = name.trim();
        if display_name.is_empty() {
            return Err(CheckinError::Validation(
                "display name cannot be empty".to_string(),
            ));
        }

        let catch_all = self.registry.catch_all().to_string();
        let _guard = self.locks.ledger(&catch_all)?;

        let master = catalog::load(self.store)?;
        if catalog::find(&master, &normalized).is_some() {
            return Err(CheckinError::Validation(format!(
                "tag '{}' is in the imported catalog; check it in instead",
                normalized
            )));
        }

        let mut records = ledger::load(self.store, &catch_all)?;
        if records.iter().any(|record| record.matches_tag(&normalized)) {
            return Err(CheckinError::AlreadyCheckedIn {
                code: normalized,
                location: catch_all,
            });
        }

        let entry = AssetRecord::new(code.trim(), display_name, AssetStatus::Manual);
        records.insert(0, entry.clone());
        ledger::save(self.store, &catch_all, &records)?;
        Ok(entry)
    }

    fn resolve_location(&self, location: &str) -> Result<String, CheckinError> {
        self.registry
            .resolve(self.store, location)?
            .ok_or_else(|| CheckinError::UnknownLocation(location.trim().to_string()))
    }
}
