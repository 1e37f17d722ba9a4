use std::error::Error;
use std::fmt;

use crate::locks::LockError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Store(StoreError),
    Lock(LockError),
    UnknownFormat(String),
    InvalidRecord(String),
    MissingColumns,
    EmptySource(String),
    AlreadyImported(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "I/O error: {}", err),
            ImportError::Csv(err) => write!(f, "CSV parse error: {}", err),
            ImportError::Store(err) => write!(f, "storage error: {}", err),
            ImportError::Lock(err) => write!(f, "{}", err),
            ImportError::UnknownFormat(path) => {
                write!(
                    f,
                    "cannot infer the source format of '{}'; pass --format csv|jsonl",
                    path
                )
            }
            ImportError::InvalidRecord(message) => write!(f, "invalid source record: {}", message),
            ImportError::MissingColumns => {
                write!(
                    f,
                    "no header row with recognizable tag and name columns found"
                )
            }
            ImportError::EmptySource(path) => {
                write!(f, "'{}' contains no importable asset rows", path)
            }
            ImportError::AlreadyImported(path) => {
                write!(
                    f,
                    "'{}' matches the fingerprint of the last import; use --force to re-import",
                    path
                )
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Store(err) => Some(err),
            ImportError::Lock(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(value: std::io::Error) -> Self {
        ImportError::Io(value)
    }
}

impl From<csv::Error> for ImportError {
    fn from(value: csv::Error) -> Self {
        ImportError::Csv(value)
    }
}

impl From<StoreError> for ImportError {
    fn from(value: StoreError) -> Self {
        ImportError::Store(value)
    }
}

impl From<LockError> for ImportError {
    fn from(value: LockError) -> Self {
        ImportError::Lock(value)
    }
}
