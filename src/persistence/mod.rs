//! Key-value persistence for the high score and settings
//!
//! Features:
//! - String values, with integer helpers on top
//! - In-memory store for tests and headless runs
//! - JSON file store with tmp-then-rename writes

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PersistError;

/// Persistent string store, survives process restart when file backed
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Read an integer, `Ok(None)` when the key is absent
    fn get_int(&self, key: &str) -> Result<Option<i64>, PersistError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| PersistError::NotAnInteger {
                    key: key.to_string(),
                    value: raw,
                }),
        }
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), PersistError> {
        self.set(key, &value.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Whole store kept in memory and flushed to one JSON file on every write
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open a store, starting empty if the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No save file at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_ints() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_int("HighScore").unwrap(), None);
        store.set_int("HighScore", 42).unwrap();
        assert_eq!(store.get_int("HighScore").unwrap(), Some(42));
    }

    #[test]
    fn test_non_integer_is_an_error() {
        let mut store = MemoryStore::new();
        store.set("HighScore", "lots").unwrap();
        assert!(matches!(
            store.get_int("HighScore"),
            Err(PersistError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!("skybound_store_{}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.set_int("HighScore", 7).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_int("HighScore").unwrap(), Some(7));
        let _ = fs::remove_file(&path);
    }
}
