//! History store configuration and construction.

use std::path::PathBuf;
use std::sync::Arc;

use rchat::{HistoryStore, InMemoryHistoryStore};

use crate::backends::filesystem::FilesystemHistoryStore;
use crate::backends::sqlite::{SqliteHistoryStore, default_sqlite_path};
use crate::error::MemoryError;

/// Overrides the history root directory when set.
pub const HISTORY_HOME_ENV: &str = "RAPPORT_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryBackendConfig {
    Filesystem { root: PathBuf },
    Sqlite { path: PathBuf },
    InMemory,
}

impl HistoryBackendConfig {
    /// SQLite database at `history.sqlite3` under the default root.
    pub fn default_sqlite() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(&default_history_root()),
        }
    }
}

impl Default for HistoryBackendConfig {
    fn default() -> Self {
        Self::Filesystem {
            root: default_history_root(),
        }
    }
}

/// `$RAPPORT_HOME`, else `~/.config/rapport`, else `./.rapport`.
pub fn default_history_root() -> PathBuf {
    if let Some(explicit) = std::env::var_os(HISTORY_HOME_ENV) {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".config").join("rapport");
    }

    PathBuf::from(".rapport")
}

pub fn create_history_store(
    config: HistoryBackendConfig,
) -> Result<Arc<dyn HistoryStore>, MemoryError> {
    match config {
        HistoryBackendConfig::Filesystem { root } => {
            Ok(Arc::new(FilesystemHistoryStore::new(root)?))
        }
        HistoryBackendConfig::Sqlite { path } => Ok(Arc::new(SqliteHistoryStore::new(path)?)),
        HistoryBackendConfig::InMemory => Ok(Arc::new(InMemoryHistoryStore::new())),
    }
}

pub fn create_default_history_store() -> Result<Arc<dyn HistoryStore>, MemoryError> {
    create_history_store(HistoryBackendConfig::default())
}
