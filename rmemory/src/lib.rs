//! Persistent chat history stores for `rchat` sessions.
//!
//! ```rust
//! use rchat::HistoryStore;
//! use rmemory::{HistoryBackendConfig, create_history_store};
//!
//! let store = create_history_store(HistoryBackendConfig::InMemory)
//!     .expect("in-memory store always opens");
//! let _: &dyn HistoryStore = store.as_ref();
//! ```

mod backend;
mod backends;
mod error;

pub mod prelude {
    pub use crate::{
        FilesystemHistoryStore, HistoryBackendConfig, MemoryError, MemoryErrorKind,
        SqliteHistoryStore, create_default_history_store, create_history_store,
    };
}

pub use backend::{
    HISTORY_HOME_ENV, HistoryBackendConfig, create_default_history_store, create_history_store,
    default_history_root,
};
pub use backends::filesystem::FilesystemHistoryStore;
pub use backends::sqlite::SqliteHistoryStore;
pub use error::{MemoryError, MemoryErrorKind};
