use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use uuid::Uuid;

const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_millis(5000);
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub enum LockError {
    Busy(PathBuf),
    Io(std::io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::Busy(path) => write!(f, "lock busy: {}", path.display()),
            LockError::Io(err) => write!(f, "lock I/O error: {}", err),
        }
    }
}

impl std::error::Error for LockError {}

impl From<std::io::Error> for LockError {
    fn from(value: std::io::Error) -> Self {
        LockError::Io(value)
    }
}

/// Mutual-exclusion scopes for every mutating storage sequence. Each
/// location's ledger gets its own lock file so concurrent check-ins to the
/// same location serialize while different locations stay independent.
/// Import and factory reset take the store-wide lock instead.
#[derive(Debug, Clone)]
pub struct LockSet {
    root: PathBuf,
    timeout: Duration,
}

impl LockSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    /// Lock one location's ledger. Bounded wait; callers hold the guard for
    /// the whole read-check-write sequence.
    pub fn ledger(&self, location: &str) -> Result<LockGuard, LockError> {
        self.acquire(&format!("ledger-{}", sanitize(location)))
    }

    /// Lock the entire store (import wipe, factory reset).
    pub fn store_wide(&self) -> Result<LockGuard, LockError> {
        self.acquire("store")
    }

    fn acquire(&self, stem: &str) -> Result<LockGuard, LockError> {
        let path = self.root.join(format!("{stem}.lock"));
        let start = Instant::now();
        loop {
            match try_create(&path)? {
                Some(guard) => return Ok(guard),
                None if start.elapsed() >= self.timeout => {
                    return Err(LockError::Busy(path));
                }
                None => thread::sleep(RETRY_INTERVAL),
            }
        }
    }
}

#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn try_create(path: &Path) -> Result<Option<LockGuard>, LockError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            // Owner token and pid help diagnose a stale lock left by a crash.
            let _ = writeln!(file, "{} pid={}", Uuid::now_v7(), std::process::id());
            Ok(Some(LockGuard {
                path: path.to_path_buf(),
            }))
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(err) => Err(LockError::Io(err)),
    }
}

/// Location names come from user input; flatten them to a safe file stem.
fn sanitize(location: &str) -> String {
    location
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;

    use super::{sanitize, LockSet};

    fn lock_root() -> PathBuf {
        std::env::temp_dir().join(format!("tally-lock-test-{}", Uuid::now_v7()))
    }

    #[test]
    fn sanitize_flattens_unsafe_characters() {
        assert_eq!(sanitize("Lab 2"), "lab-2");
        assert_eq!(sanitize(" Storage/Attic "), "storage-attic");
    }

    #[test]
    fn different_locations_do_not_contend() {
        let root = lock_root();
        let locks = LockSet::new(&root);
        let first = locks.ledger("Lab 1").expect("first lock should succeed");
        let second = locks.ledger("Lab 2").expect("other location should not block");
        drop(first);
        drop(second);
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn same_location_times_out_while_held() {
        let root = lock_root();
        let locks = LockSet::with_timeout(&root, Duration::from_millis(20));
        let held = locks.ledger("General").expect("initial lock should succeed");

        let err = locks
            .ledger("General")
            .expect_err("lock should time out while held");
        assert!(err.to_string().contains("lock busy"));

        drop(held);
        let again = locks
            .ledger("General")
            .expect("lock should be reacquirable after release");
        drop(again);
        let _ = std::fs::remove_dir_all(root);
    }
}
