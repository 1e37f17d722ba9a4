use std::error::Error;
use std::fmt;

use crate::store::{Store, StoreError, REGISTRY_KEY};

/// Ordered set of location names. The catch-all location is always present
/// and always first; every other name keeps its first-seen position.
#[derive(Debug, Clone)]
pub struct Registry {
    catch_all: String,
}

#[derive(Debug)]
pub enum RegistryError {
    Store(StoreError),
    InvalidName(String),
    Duplicate(String),
    NotFound(String),
    CatchAllProtected(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Store(err) => write!(f, "storage error: {}", err),
            RegistryError::InvalidName(name) => {
                write!(f, "invalid location name '{}'", name)
            }
            RegistryError::Duplicate(name) => {
                write!(f, "location '{}' already exists", name)
            }
            RegistryError::NotFound(name) => write!(f, "location '{}' not found", name),
            RegistryError::CatchAllProtected(name) => {
                write!(f, "location '{}' is the catch-all and cannot be changed", name)
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RegistryError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(value: StoreError) -> Self {
        RegistryError::Store(value)
    }
}

impl Registry {
    pub fn new(catch_all: impl Into<String>) -> Self {
        Self {
            catch_all: catch_all.into(),
        }
    }

    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    pub fn is_catch_all(&self, name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(&self.catch_all)
    }

    /// Load the registered locations, repairing the stored ordering on the
    /// way out. The stored value may predate the invariant or be malformed;
    /// both degrade to a registry holding just the catch-all.
    pub fn list(&self, store: &dyn Store) -> Result<Vec<String>, StoreError> {
        let names: Vec<String> = store
            .get(REGISTRY_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Ok(self.ensure_catch_all_first(names))
    }

    /// Defensive normalization: the catch-all present exactly once and first,
    /// later duplicates dropped, relative order of the rest preserved.
    /// Idempotent by construction.
    pub fn ensure_catch_all_first(&self, names: Vec<String>) -> Vec<String> {
        let mut repaired = vec![self.catch_all.clone()];
        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() || self.is_catch_all(trimmed) {
                continue;
            }
            if !repaired.iter().any(|seen| same_name(seen, trimmed)) {
                repaired.push(trimmed.to_string());
            }
        }
        repaired
    }

    /// Reset to the catch-all only. Used by import and factory reset.
    pub fn reset(&self, store: &dyn Store) -> Result<(), StoreError> {
        self.save(store, &[self.catch_all.clone()])
    }

    pub fn add(&self, store: &dyn Store, name: &str) -> Result<Vec<String>, RegistryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let mut names = self.list(store)?;
        if names.iter().any(|existing| same_name(existing, trimmed)) {
            return Err(RegistryError::Duplicate(trimmed.to_string()));
        }
        names.push(trimmed.to_string());
        self.save(store, &names)?;
        Ok(names)
    }

    pub fn rename(&self, store: &dyn Store, from: &str, to: &str) -> Result<(), RegistryError> {
        if self.is_catch_all(from) {
            return Err(RegistryError::CatchAllProtected(from.trim().to_string()));
        }
        let target = to.trim();
        if target.is_empty() {
            return Err(RegistryError::InvalidName(to.to_string()));
        }

        let mut names = self.list(store)?;
        if names.iter().any(|existing| same_name(existing, target)) {
            return Err(RegistryError::Duplicate(target.to_string()));
        }
        let slot = names
            .iter_mut()
            .find(|existing| same_name(existing.as_str(), from))
            .ok_or_else(|| RegistryError::NotFound(from.trim().to_string()))?;
        *slot = target.to_string();
        self.save(store, &names)?;
        Ok(())
    }

    pub fn remove(&self, store: &dyn Store, name: &str) -> Result<(), RegistryError> {
        if self.is_catch_all(name) {
            return Err(RegistryError::CatchAllProtected(name.trim().to_string()));
        }

        let mut names = self.list(store)?;
        let before = names.len();
        names.retain(|existing| !same_name(existing, name));
        if names.len() == before {
            return Err(RegistryError::NotFound(name.trim().to_string()));
        }
        self.save(store, &names)?;
        Ok(())
    }

    /// The stored name a caller-supplied location resolves to, if registered.
    pub fn resolve(&self, store: &dyn Store, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .list(store)?
            .into_iter()
            .find(|existing| same_name(existing, name)))
    }

    fn save(&self, store: &dyn Store, names: &[String]) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_string(names).expect("location name list should serialize to JSON");
        store.set(REGISTRY_KEY, &encoded)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
