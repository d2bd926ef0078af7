//! File-backed snapshot storage.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use super::{KeyValueStore, StorageError};

/// File extension for snapshot files.
const SNAPSHOT_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// Stores each key as `<key>.json` in a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates a new storage instance rooted at `data_dir`.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self
            .data_dir
            .join(format!("{}.{}", key, SNAPSHOT_EXTENSION)))
    }

    /// Checks if a snapshot exists on disk.
    pub fn exists(&self, key: &str) -> bool {
        self.path(key).map(|p| p.exists()).unwrap_or(false)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;

        fs::create_dir_all(&self.data_dir).map_err(|e| StorageError::Io {
            path: self.data_dir.clone(),
            source: e,
        })?;

        // Write atomically using temp file + rename
        let temp_path = path.with_extension(TEMP_EXTENSION);

        let mut file = File::create(&temp_path).map_err(|e| StorageError::Io {
            path: temp_path.clone(),
            source: e,
        })?;
        file.write_all(blob.as_bytes()).map_err(|e| StorageError::Io {
            path: temp_path.clone(),
            source: e,
        })?;
        file.sync_all().map_err(|e| StorageError::Io {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &path).map_err(|e| StorageError::Io { path, source: e })
    }
}

/// Keys become file names, so they may only hold ASCII letters, digits, `-` and `_`.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStore::new(temp_dir.path().to_path_buf());
        (storage, temp_dir)
    }

    #[test]
    fn test_storage_path() {
        let (storage, _temp) = test_storage();
        let path = storage.path("meals").unwrap();
        assert!(path.ends_with("meals.json"));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let (storage, _temp) = test_storage();
        assert!(matches!(
            storage.path("../escape"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.path("").is_err());
        assert!(storage.path("a/b").is_err());
        assert!(!storage.exists("a/b"));
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (storage, _temp) = test_storage();
        assert!(storage.load("meals").unwrap().is_none());
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested_dir = temp_dir.path().join("nested").join("data");
        let mut storage = FileStore::new(nested_dir.clone());

        storage.save("meals", "[]").unwrap();

        assert!(nested_dir.exists());
        assert!(storage.exists("meals"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (mut storage, _temp) = test_storage();

        storage.save("dailyGoals", r#"{"calories":1800}"#).unwrap();
        let loaded = storage.load("dailyGoals").unwrap();

        assert_eq!(loaded.as_deref(), Some(r#"{"calories":1800}"#));
    }

    #[test]
    fn test_overwrite_existing_snapshot() {
        let (mut storage, _temp) = test_storage();

        storage.save("meals", "first").unwrap();
        storage.save("meals", "second").unwrap();

        assert_eq!(storage.load("meals").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_keys_are_independent() {
        let (mut storage, _temp) = test_storage();

        storage.save("meals", "[]").unwrap();

        assert!(storage.exists("meals"));
        assert!(!storage.exists("mealGoals"));
        assert!(storage.load("mealGoals").unwrap().is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let (mut storage, temp) = test_storage();

        storage.save("meals", r#"[{"foodName":"Oatmeal"}]"#).unwrap();
        storage.save("meals", "[]").unwrap();

        assert_eq!(storage.load("meals").unwrap().as_deref(), Some("[]"));
        assert!(!temp.path().join("meals.json.tmp").exists());

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["meals.json"]);
    }

    #[test]
    fn test_stale_temp_file_does_not_shadow_snapshot() {
        let (mut storage, temp) = test_storage();
        storage.save("meals", "[1]").unwrap();

        // A write that died before its rename leaves only the temp file behind.
        fs::write(temp.path().join("meals.json.tmp"), "[1, 2").unwrap();
        assert_eq!(storage.load("meals").unwrap().as_deref(), Some("[1]"));

        storage.save("meals", "[1,2]").unwrap();
        assert_eq!(storage.load("meals").unwrap().as_deref(), Some("[1,2]"));
        assert!(!temp.path().join("meals.json.tmp").exists());
    }
}
