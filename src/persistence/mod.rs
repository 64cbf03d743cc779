//! Key-value persistence for small JSON records
//!
//! Backends:
//! - `MemoryStore`: in-process, for tests and headless runs
//! - `FileStore`: one JSON file per key under the user data dir (native)
//! - `LocalStore`: browser LocalStorage (wasm32)

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(&'static str),
}

/// String values keyed by name
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{KeyValueStore, PersistError};

    /// Directory of `<key>.json` files
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        /// Create the directory if needed
        pub fn new(dir: impl AsRef<Path>) -> Result<Self, PersistError> {
            let dir = dir.as_ref().to_path_buf();
            if !dir.exists() {
                fs::create_dir_all(&dir)?;
            }
            Ok(Self { dir })
        }

        /// `<data dir>/endless-runner`
        pub fn in_data_dir() -> Result<Self, PersistError> {
            let base = dirs::data_dir().ok_or(PersistError::Unavailable("no user data directory"))?;
            Self::new(base.join("endless-runner"))
        }

        fn path(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{}.json", key))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
            let path = self.path(key);
            if !path.exists() {
                return Ok(None);
            }
            Ok(Some(fs::read_to_string(path)?))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
            // Readers only ever see a complete file
            let path = self.path(key);
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, value)?;
            fs::rename(&tmp, &path)?;
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::{KeyValueStore, PersistError};

    /// Browser LocalStorage
    #[derive(Debug, Clone, Default)]
    pub struct LocalStore;

    impl LocalStore {
        fn storage() -> Result<web_sys::Storage, PersistError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(PersistError::Unavailable("LocalStorage"))
        }
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
            Self::storage()?
                .get_item(key)
                .map_err(|_| PersistError::Unavailable("LocalStorage read"))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
            Self::storage()?
                .set_item(key, value)
                .map_err(|_| PersistError::Unavailable("LocalStorage write"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested")).unwrap();
        assert!(store.get("highscore").unwrap().is_none());
        store.set("highscore", "{\"best\":12}").unwrap();
        assert_eq!(
            store.get("highscore").unwrap().as_deref(),
            Some("{\"best\":12}")
        );
        assert!(!dir.path().join("nested/highscore.json.tmp").exists());
    }
}
