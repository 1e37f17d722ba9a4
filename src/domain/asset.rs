use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Presence status of one asset. `Absent` is the state every catalog entry
/// starts in; `Present` is set by a successful check-in; `Manual` marks an
/// entry added by hand outside the imported catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Absent,
    Present,
    Manual,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 3] = [AssetStatus::Absent, AssetStatus::Present, AssetStatus::Manual];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::Absent => "absent",
            AssetStatus::Present => "present",
            AssetStatus::Manual => "manual",
        }
    }

    /// Verified entries count toward collection progress and sort ahead of
    /// absent ones in the catch-all view.
    pub fn is_verified(self) -> bool {
        matches!(self, AssetStatus::Present | AssetStatus::Manual)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = ParseAssetStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "absent" | "missing" => Ok(AssetStatus::Absent),
            "present" | "found" => Ok(AssetStatus::Present),
            "manual" | "extra" => Ok(AssetStatus::Manual),
            _ => Err(ParseAssetStatusError {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAssetStatusError {
    value: String,
}

impl fmt::Display for ParseAssetStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid asset status '{}': expected one of {}",
            self.value,
            AssetStatus::ALL
                .iter()
                .map(|status| status.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl Error for ParseAssetStatusError {}

/// One asset entry as stored in the catalog and in the per-location ledgers.
/// Identity is the normalized tag code; `tag` keeps whatever casing the
/// source carried for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRecord {
    pub tag: String,
    pub name: String,
    pub status: AssetStatus,
}

impl AssetRecord {
    pub fn new(tag: impl Into<String>, name: impl Into<String>, status: AssetStatus) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            status,
        }
    }

    pub fn normalized_tag(&self) -> String {
        normalize_tag(&self.tag)
    }

    pub fn matches_tag(&self, normalized: &str) -> bool {
        self.normalized_tag() == normalized
    }
}

/// Canonical form used for every tag comparison: surrounding whitespace
/// stripped, upper-cased. Stored records keep their original spelling.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_uppercase()
}
