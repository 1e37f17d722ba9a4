use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::errors::ImportError;

/// Tabular source shapes the importer understands. Spreadsheets are expected
/// to arrive exported as CSV; JSONL rows carry explicit field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Jsonl,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Jsonl => "jsonl",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(SourceFormat::Csv),
            "jsonl" | "ndjson" => Some(SourceFormat::Jsonl),
            _ => None,
        }
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "jsonl" | "ndjson" => Ok(SourceFormat::Jsonl),
            other => Err(format!("unsupported format '{other}'; use csv or jsonl")),
        }
    }
}

/// Column headers commonly used for the tag code and the display name.
/// Matching is against a cleaned cell: trimmed and upper-cased.
const TAG_HEADERS: [&str; 10] = [
    "TAG", "TAG CODE", "TAGCODE", "CODE", "ID", "ASSET TAG", "ASSET ID", "PATRIMONY", "SERIAL",
    "PLATE",
];
const NAME_HEADERS: [&str; 7] = [
    "NAME",
    "ITEM",
    "DESCRIPTION",
    "ASSET NAME",
    "PRODUCT",
    "DENOMINATION",
    "ASSET",
];

const HEADER_SCAN_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub header_row: usize,
    pub tag_column: usize,
    pub name_column: usize,
}

/// Find the header row within the first rows of the sheet. Real exports
/// often carry a title block above the data, so both columns must match on
/// the same row to count as the header.
pub fn detect_columns(rows: &[Vec<String>]) -> Result<ColumnLayout, ImportError> {
    for (index, row) in rows.iter().take(HEADER_SCAN_LIMIT).enumerate() {
        let tag_column = row
            .iter()
            .position(|cell| TAG_HEADERS.contains(&clean(cell).as_str()));
        let name_column = row
            .iter()
            .position(|cell| NAME_HEADERS.contains(&clean(cell).as_str()));
        if let (Some(tag_column), Some(name_column)) = (tag_column, name_column) {
            if tag_column != name_column {
                return Ok(ColumnLayout {
                    header_row: index,
                    tag_column,
                    name_column,
                });
            }
        }
    }
    Err(ImportError::MissingColumns)
}

/// Rows below the header become `(tag, name)` pairs. Fully blank rows and
/// rows without a tag are dropped.
pub fn pairs_from_rows(rows: &[Vec<String>], layout: ColumnLayout) -> Vec<(String, String)> {
    rows.iter()
        .skip(layout.header_row + 1)
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            (
                cell_at(row, layout.tag_column),
                cell_at(row, layout.name_column),
            )
        })
        .filter(|(tag, _)| !tag.is_empty())
        .collect()
}

pub fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct JsonlRow {
    #[serde(alias = "code")]
    tag: String,
    #[serde(alias = "description")]
    name: String,
}

pub fn read_jsonl_pairs(path: &Path) -> Result<Vec<(String, String)>, ImportError> {
    let handle = File::open(path)?;
    let reader = BufReader::new(handle);
    let mut pairs = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let text = line?;
        if text.trim().is_empty() {
            continue;
        }
        let row: JsonlRow = serde_json::from_str(&text).map_err(|err| {
            ImportError::InvalidRecord(format!("line {}: invalid JSON: {}", index + 1, err))
        })?;
        if row.tag.trim().is_empty() {
            continue;
        }
        pairs.push((row.tag.trim().to_string(), row.name.trim().to_string()));
    }
    Ok(pairs)
}

fn clean(cell: &str) -> String {
    cell.trim().to_uppercase()
}

fn cell_at(row: &[String], column: usize) -> String {
    row.get(column).map(|cell| cell.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{detect_columns, pairs_from_rows, ColumnLayout, SourceFormat};
    use std::path::Path;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn format_detection_by_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("assets.CSV")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("assets.ndjson")),
            Some(SourceFormat::Jsonl)
        );
        assert_eq!(SourceFormat::from_path(Path::new("assets.xlsx")), None);
    }

    #[test]
    fn header_row_is_found_below_a_title_block() {
        let sheet = rows(&[
            &["Annual inventory", "", ""],
            &["", "", ""],
            &["Tag", "Description", "Owner"],
            &["A1", "Chair", "Facilities"],
        ]);
        let layout = detect_columns(&sheet).expect("header should be detected");
        assert_eq!(
            layout,
            ColumnLayout {
                header_row: 2,
                tag_column: 0,
                name_column: 1
            }
        );
    }

    #[test]
    fn detection_requires_both_columns_on_one_row() {
        let sheet = rows(&[&["Tag", "Owner"], &["Description", "Notes"]]);
        assert!(detect_columns(&sheet).is_err());
    }

    #[test]
    fn pairs_skip_blank_rows_and_missing_tags() {
        let sheet = rows(&[
            &["code", "item"],
            &[" A1 ", " Chair "],
            &["", ""],
            &["", "Nameless"],
            &["B2", "Desk"],
        ]);
        let layout = detect_columns(&sheet).expect("header should be detected");
        let pairs = pairs_from_rows(&sheet, layout);
        assert_eq!(
            pairs,
            vec![
                ("A1".to_string(), "Chair".to_string()),
                ("B2".to_string(), "Desk".to_string()),
            ]
        );
    }

    #[test]
    fn short_rows_yield_empty_cells_instead_of_panicking() {
        let sheet = rows(&[&["id", "name"], &["A1"]]);
        let layout = detect_columns(&sheet).expect("header should be detected");
        let pairs = pairs_from_rows(&sheet, layout);
        assert_eq!(pairs, vec![("A1".to_string(), String::new())]);
    }
}
