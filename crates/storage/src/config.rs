//! Store location and connection settings.
//!
//! Values come from the process environment, after loading a `.env` file
//! from the working directory if one exists:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `STAFFING_DB_PATH` | SQLite file path, or `:memory:` | `staffing.db` |
//! | `STAFFING_BUSY_TIMEOUT_MS` | How long a writer waits on a locked database | `5000` |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::StorageError;

pub const DB_PATH_VAR: &str = "STAFFING_DB_PATH";
pub const BUSY_TIMEOUT_VAR: &str = "STAFFING_BUSY_TIMEOUT_MS";

const DEFAULT_DB_PATH: &str = "staffing.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    InMemory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: StoreLocation::File(PathBuf::from(DEFAULT_DB_PATH)),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::InMemory,
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// Load from `.env` and the process environment.
    pub fn from_env() -> Result<Self, StorageError> {
        // A missing .env file is normal; real variables still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.location = if path == IN_MEMORY {
                StoreLocation::InMemory
            } else {
                StoreLocation::File(PathBuf::from(path))
            };
        }

        if let Some(raw) = lookup(BUSY_TIMEOUT_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                StorageError::Config(format!("{BUSY_TIMEOUT_VAR} must be a whole number of milliseconds, got {raw:?}"))
            })?;
            config.busy_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}
