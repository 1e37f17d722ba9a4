use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_CATCH_ALL: &str = "General";

/// Optional operator settings, read from `config.toml` inside the state
/// directory. Absent file means defaults; a present file only needs the keys
/// it wants to change.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub catch_all: String,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catch_all: DEFAULT_CATCH_ALL.to_string(),
            export_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidCatchAll,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {}", err),
            ConfigError::Parse(err) => write!(f, "config parse error: {}", err),
            ConfigError::InvalidCatchAll => {
                write!(f, "catch_all cannot be empty")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::InvalidCatchAll => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parse(value)
    }
}

impl Config {
    pub fn load(state_dir: &Path) -> Result<Self, ConfigError> {
        let path = state_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        if config.catch_all.trim().is_empty() {
            return Err(ConfigError::InvalidCatchAll);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use uuid::Uuid;

    use super::{Config, ConfigError, CONFIG_FILE};

    fn state_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tally-config-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("state dir should be creatable");
        dir
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = state_dir();
        let config = Config::load(&dir).expect("load should succeed");
        assert_eq!(config, Config::default());
        assert_eq!(config.catch_all, "General");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let dir = state_dir();
        std::fs::write(dir.join(CONFIG_FILE), "catch_all = \"Depot\"\n")
            .expect("config should be writable");

        let config = Config::load(&dir).expect("load should succeed");
        assert_eq!(config.catch_all, "Depot");
        assert_eq!(config.export_dir, None);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unknown_keys_and_blank_catch_all_are_rejected() {
        let dir = state_dir();
        std::fs::write(dir.join(CONFIG_FILE), "catchall = \"oops\"\n")
            .expect("config should be writable");
        assert!(matches!(Config::load(&dir), Err(ConfigError::Parse(_))));

        std::fs::write(dir.join(CONFIG_FILE), "catch_all = \"  \"\n")
            .expect("config should be writable");
        assert!(matches!(Config::load(&dir), Err(ConfigError::InvalidCatchAll)));
        let _ = std::fs::remove_dir_all(dir);
    }
}
