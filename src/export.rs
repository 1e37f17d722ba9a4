use std::error::Error;
use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use time::OffsetDateTime;

use crate::reconcile::Reconciler;
use crate::registry::Registry;
use crate::store::{Store, StoreError};

/// Builds the inventory report: one row per confirmed asset per location,
/// then every catalog entry confirmed nowhere, listed under the catch-all
/// with status `absent`.
pub struct ExportService<'a> {
    store: &'a dyn Store,
    registry: &'a Registry,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportRow {
    pub tag: String,
    pub name: String,
    pub status: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Txt),
            other => Err(format!("unsupported format '{other}'; use csv or txt")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub format: String,
    pub row_count: u64,
}

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Store(StoreError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "I/O error: {}", err),
            ExportError::Csv(err) => write!(f, "CSV write error: {}", err),
            ExportError::Store(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Csv(err) => Some(err),
            ExportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        ExportError::Io(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        ExportError::Csv(value)
    }
}

impl From<StoreError> for ExportError {
    fn from(value: StoreError) -> Self {
        ExportError::Store(value)
    }
}

impl<'a> ExportService<'a> {
    pub fn new(store: &'a dyn Store, registry: &'a Registry) -> Self {
        Self { store, registry }
    }

    /// Report rows in registry order. Each location contributes the verified
    /// entries of its display view; absent catalog entries surface once, via
    /// the missing set, never per location.
    pub fn report_rows(&self) -> Result<Vec<ReportRow>, ExportError> {
        let engine = Reconciler::new(self.store, self.registry);
        let mut rows = Vec::new();
        for location in self.registry.list(self.store)? {
            for record in engine.display_view(&location)? {
                if !record.status.is_verified() {
                    continue;
                }
                rows.push(ReportRow {
                    tag: record.tag,
                    name: record.name,
                    status: record.status.as_str().to_string(),
                    location: location.clone(),
                });
            }
        }

        let catch_all = self.registry.catch_all();
        for record in engine.missing()? {
            rows.push(ReportRow {
                tag: record.tag,
                name: record.name,
                status: record.status.as_str().to_string(),
                location: catch_all.to_string(),
            });
        }
        Ok(rows)
    }

    pub fn write_report(
        &self,
        path: &Path,
        format: ExportFormat,
    ) -> Result<ExportSummary, ExportError> {
        let rows = self.report_rows()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        match format {
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;
                for row in &rows {
                    writer.serialize(row)?;
                }
                writer.flush()?;
            }
            ExportFormat::Txt => {
                std::fs::write(path, render_text(&rows))?;
            }
        }

        Ok(ExportSummary {
            path: path.to_path_buf(),
            format: format.as_str().to_string(),
            row_count: rows.len() as u64,
        })
    }
}

/// Plain-text rendering: a block per location in row order, one line per
/// asset.
fn render_text(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for row in rows {
        if current != Some(row.location.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", row.location);
            current = Some(row.location.as_str());
        }
        let _ = writeln!(out, "{}\t{}\t{}", row.tag, row.name, row.status);
    }
    out
}

/// Default report name, stamped so repeated exports never clobber each other.
pub fn default_file_name(format: ExportFormat, now: OffsetDateTime) -> String {
    format!(
        "inventory-report-{:04}-{:02}-{:02}-{:02}{:02}.{}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        format.extension()
    )
}
