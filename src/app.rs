use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use time::OffsetDateTime;

use crate::checkin::{CheckinError, CheckinService};
use crate::config::{Config, ConfigError};
use crate::domain::asset::AssetRecord;
use crate::export::{
    default_file_name, ExportError, ExportFormat, ExportService, ExportSummary,
};
use crate::imports::{ImportError, ImportService, ImportSummary, SourceFormat};
use crate::locks::{LockError, LockSet};
use crate::reconcile::Reconciler;
use crate::registry::{Registry, RegistryError};
use crate::store::{SqliteStore, Store, StoreError};
use crate::{catalog, ledger};

const DB_FILE: &str = "state.sqlite";
const LOCK_DIR: &str = "locks";

/// Facade over the engine: owns the injected store, the location registry,
/// and the lock set, and exposes one method per user-facing operation.
pub struct App {
    store: Box<dyn Store>,
    registry: Registry,
    locks: LockSet,
    export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckinReceipt {
    pub location: String,
    pub record: AssetRecord,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoomView {
    pub location: String,
    pub is_catch_all: bool,
    pub verified_count: u64,
    pub total_count: u64,
    pub records: Vec<AssetRecord>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoomProgress {
    pub location: String,
    pub verified_count: u64,
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusReport {
    pub locations: Vec<RoomProgress>,
    pub catalog_count: u64,
    pub confirmed_count: u64,
    pub missing_count: u64,
}

impl App {
    pub fn open(state_dir: &Path) -> Result<Self, AppError> {
        let config = Config::load(state_dir)?;
        let store = SqliteStore::open(&state_dir.join(DB_FILE))?;
        Ok(Self {
            store: Box::new(store),
            registry: Registry::new(config.catch_all),
            locks: LockSet::new(state_dir.join(LOCK_DIR)),
            export_dir: config.export_dir,
        })
    }

    pub fn catch_all(&self) -> &str {
        self.registry.catch_all()
    }

    pub fn import(
        &self,
        path: &Path,
        format: Option<SourceFormat>,
        dry_run: bool,
        force: bool,
    ) -> Result<ImportSummary, AppError> {
        let service = ImportService::new(self.store.as_ref(), &self.registry, &self.locks);
        Ok(service.import_file(path, format, dry_run, force)?)
    }

    /// Check one asset in; the catch-all is the default target.
    pub fn check_in(&self, location: Option<&str>, code: &str) -> Result<CheckinReceipt, AppError> {
        let target = location.unwrap_or_else(|| self.registry.catch_all());
        let service = CheckinService::new(self.store.as_ref(), &self.registry, &self.locks);
        let record = service.check_in(target, code)?;
        Ok(CheckinReceipt {
            location: self.resolved_name(target)?,
            record,
        })
    }

    pub fn check_out(
        &self,
        location: Option<&str>,
        code: &str,
    ) -> Result<CheckinReceipt, AppError> {
        let target = location.unwrap_or_else(|| self.registry.catch_all());
        let service = CheckinService::new(self.store.as_ref(), &self.registry, &self.locks);
        let record = service.check_out(target, code)?;
        Ok(CheckinReceipt {
            location: self.resolved_name(target)?,
            record,
        })
    }

    pub fn add_manual(&self, code: &str, name: &str) -> Result<CheckinReceipt, AppError> {
        let service = CheckinService::new(self.store.as_ref(), &self.registry, &self.locks);
        let record = service.add_manual(code, name)?;
        Ok(CheckinReceipt {
            location: self.registry.catch_all().to_string(),
            record,
        })
    }

    pub fn rooms(&self) -> Result<Vec<String>, AppError> {
        Ok(self.registry.list(self.store.as_ref())?)
    }

    pub fn add_room(&self, name: &str) -> Result<Vec<String>, AppError> {
        let _guard = self.locks.store_wide()?;
        Ok(self.registry.add(self.store.as_ref(), name)?)
    }

    /// Rename a room and carry its ledger over to the new key.
    pub fn rename_room(&self, from: &str, to: &str) -> Result<(), AppError> {
        let _guard = self.locks.store_wide()?;
        let store = self.store.as_ref();
        let stored_name = self.registry.resolve(store, from)?;
        self.registry.rename(store, from, to)?;
        if let Some(old_name) = stored_name {
            let records = ledger::load(store, &old_name)?;
            if !records.is_empty() {
                ledger::save(store, to.trim(), &records)?;
            }
            ledger::remove(store, &old_name)?;
        }
        Ok(())
    }

    /// Drop a room and its ledger. Whatever was checked in there returns to
    /// the catch-all pool on the next reconciliation pass.
    pub fn remove_room(&self, name: &str) -> Result<(), AppError> {
        let _guard = self.locks.store_wide()?;
        let store = self.store.as_ref();
        let stored_name = self.registry.resolve(store, name)?;
        self.registry.remove(store, name)?;
        if let Some(old_name) = stored_name {
            ledger::remove(store, &old_name)?;
        }
        Ok(())
    }

    pub fn view(&self, location: &str) -> Result<RoomView, AppError> {
        let store = self.store.as_ref();
        let resolved = self
            .registry
            .resolve(store, location)?
            .ok_or_else(|| CheckinError::UnknownLocation(location.trim().to_string()))?;

        let records = Reconciler::new(store, &self.registry).display_view(&resolved)?;
        let verified_count = records
            .iter()
            .filter(|record| record.status.is_verified())
            .count() as u64;
        Ok(RoomView {
            is_catch_all: self.registry.is_catch_all(&resolved),
            location: resolved,
            verified_count,
            total_count: records.len() as u64,
            records,
        })
    }

    pub fn missing(&self) -> Result<Vec<AssetRecord>, AppError> {
        Ok(Reconciler::new(self.store.as_ref(), &self.registry).missing()?)
    }

    pub fn status(&self) -> Result<StatusReport, AppError> {
        let store = self.store.as_ref();
        let engine = Reconciler::new(store, &self.registry);

        let mut locations = Vec::new();
        for location in self.registry.list(store)? {
            let records = engine.display_view(&location)?;
            let verified_count = records
                .iter()
                .filter(|record| record.status.is_verified())
                .count() as u64;
            locations.push(RoomProgress {
                location,
                verified_count,
                total_count: records.len() as u64,
            });
        }

        let catalog_count = catalog::load(store)?.len() as u64;
        let missing_count = engine.missing()?.len() as u64;
        Ok(StatusReport {
            locations,
            catalog_count,
            confirmed_count: catalog_count - missing_count,
            missing_count,
        })
    }

    pub fn export(
        &self,
        out: Option<PathBuf>,
        format: ExportFormat,
    ) -> Result<ExportSummary, AppError> {
        let path = match out {
            Some(path) => path,
            None => {
                let name = default_file_name(format, OffsetDateTime::now_utc());
                match &self.export_dir {
                    Some(dir) => dir.join(name),
                    None => PathBuf::from(name),
                }
            }
        };
        let service = ExportService::new(self.store.as_ref(), &self.registry);
        Ok(service.write_report(&path, format)?)
    }

    /// Factory reset: clear the whole store, then re-seed the registry so
    /// the catch-all is the only surviving location. The catalog stays empty.
    pub fn reset(&self) -> Result<(), AppError> {
        let _guard = self.locks.store_wide()?;
        self.store.clear()?;
        self.registry.reset(self.store.as_ref())?;
        Ok(())
    }

    fn resolved_name(&self, location: &str) -> Result<String, AppError> {
        Ok(self
            .registry
            .resolve(self.store.as_ref(), location)?
            .unwrap_or_else(|| location.trim().to_string()))
    }
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Config(ConfigError),
    Store(StoreError),
    Lock(LockError),
    Registry(RegistryError),
    Checkin(CheckinError),
    Import(ImportError),
    Export(ExportError),
    InvalidArgument(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Config(err) => write!(f, "config error: {}", err),
            AppError::Store(err) => write!(f, "{}", err),
            AppError::Lock(err) => write!(f, "{}", err),
            AppError::Registry(err) => write!(f, "{}", err),
            AppError::Checkin(err) => write!(f, "{}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Config(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Lock(err) => Some(err),
            AppError::Registry(err) => Some(err),
            AppError::Checkin(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::InvalidArgument(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::Store(value)
    }
}

impl From<LockError> for AppError {
    fn from(value: LockError) -> Self {
        AppError::Lock(value)
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        AppError::Registry(value)
    }
}

impl From<CheckinError> for AppError {
    fn from(value: CheckinError) -> Self {
        AppError::Checkin(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        AppError::Import(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        AppError::Export(value)
    }
}
