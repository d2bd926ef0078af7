//! Keyed snapshot persistence for the meal ledger.
//!
//! The ledger writes each of its collections as an independent JSON blob under
//! a fixed key. Any backing medium that can load and overwrite a string by key
//! can hold a journal:
//!
//! - [`FileStore`]: one `<key>.json` file per key in a data directory
//! - [`MemoryStore`]: a map held in memory, for tests and throwaway sessions
//!
//! Storage layout for a file-backed journal:
//! ```text
//! ~/.local/share/nutrilog/
//! ├── meals.json
//! ├── dailyGoals.json
//! └── mealGoals.json
//! ```

mod file_store;
mod key;
mod memory_store;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use file_store::FileStore;
pub use key::SnapshotKey;
pub use memory_store::MemoryStore;

/// A durable string store addressed by key.
pub trait KeyValueStore {
    /// Loads the blob stored under `key`, or `None` if nothing was ever saved.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites the blob stored under `key`.
    fn save(&mut self, key: &str, blob: &str) -> Result<(), StorageError>;
}

/// Errors that can occur while reading or writing snapshots.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
