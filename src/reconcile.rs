use std::collections::HashSet;

use crate::catalog;
use crate::domain::asset::{AssetRecord, AssetStatus};
use crate::ledger;
use crate::registry::Registry;
use crate::store::{Store, StoreError};

/// Merges the master catalog, the registry, and every location ledger into
/// one consistent answer to "where is each asset and what is its status".
///
/// Only the catch-all location needs merging: its stored ledger carries just
/// manual overrides and manual extras, so its displayed list is catalog
/// order minus whatever another location already claimed. Every other
/// location displays its stored ledger verbatim.
pub struct Reconciler<'a> {
    store: &'a dyn Store,
    registry: &'a Registry,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn Store, registry: &'a Registry) -> Self {
        Self { store, registry }
    }

    /// Normalized tags claimed by any non-catch-all ledger. An asset in this
    /// set is owned by that location and must not surface in the catch-all.
    pub fn assigned_elsewhere(&self) -> Result<HashSet<String>, StoreError> {
        let mut assigned = HashSet::new();
        for location in self.registry.list(self.store)? {
            if self.registry.is_catch_all(&location) {
                continue;
            }
            for record in ledger::load(self.store, &location)? {
                assigned.insert(record.normalized_tag());
            }
        }
        Ok(assigned)
    }

    pub fn display_view(&self, location: &str) -> Result<Vec<AssetRecord>, StoreError> {
        if !self.registry.is_catch_all(location) {
            return ledger::load(self.store, location);
        }

        let master = catalog::load(self.store)?;
        let stored = ledger::load(self.store, self.registry.catch_all())?;
        let assigned = self.assigned_elsewhere()?;

        let mut view = Vec::with_capacity(master.len() + stored.len());
        for entry in &master {
            let tag = entry.normalized_tag();
            if assigned.contains(&tag) {
                continue;
            }
            match stored.iter().find(|record| record.matches_tag(&tag)) {
                Some(override_entry) => view.push(override_entry.clone()),
                None => view.push(entry.clone()),
            }
        }

        for record in &stored {
            let tag = record.normalized_tag();
            if catalog::find(&master, &tag).is_none() {
                view.push(record.clone());
            }
        }

        Ok(partition_verified_first(view))
    }

    /// Catalog entries confirmed nowhere, reported under the catch-all name
    /// with status `Absent` regardless of where they were expected.
    pub fn missing(&self) -> Result<Vec<AssetRecord>, StoreError> {
        let mut confirmed = HashSet::new();
        for location in self.registry.list(self.store)? {
            for record in ledger::load(self.store, &location)? {
                if record.status.is_verified() {
                    confirmed.insert(record.normalized_tag());
                }
            }
        }

        Ok(catalog::load(self.store)?
            .into_iter()
            .filter(|entry| !confirmed.contains(&entry.normalized_tag()))
            .map(|entry| AssetRecord {
                status: AssetStatus::Absent,
                ..entry
            })
            .collect())
    }
}

/// Stable partition, not a total order: verified entries ahead of absent
/// ones, ties left in their original relative order.
pub fn partition_verified_first(records: Vec<AssetRecord>) -> Vec<AssetRecord> {
    let (mut verified, absent): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| record.status.is_verified());
    verified.extend(absent);
    verified
}

#[cfg(test)]
mod tests;
