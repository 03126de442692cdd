use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::ports::Storage;
use crate::utils::error::{DmError, Result};

/// JSON documents on top of a [`Storage`] backend.
///
/// A missing or unreadable document loads as the default value, the same way
/// a fresh campaign starts with empty lists.
#[derive(Debug, Clone)]
pub struct JsonStore<S: Storage> {
    storage: S,
}

impl<S: Storage> JsonStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// `Ok(None)` when the file does not exist.
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let bytes = match self.storage.read_file(name).await {
            Ok(bytes) => bytes,
            Err(DmError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet", name);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.load(name).await {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!("⚠️ Could not read {}, starting empty: {}", name, e);
                T::default()
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)?;
        tracing::debug!("Writing {} ({} bytes)", name, json.len());
        self.storage.write_file(name, &json).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    pub(crate) struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        pub(crate) async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        pub(crate) async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| {
                DmError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let store = JsonStore::new(MockStorage::default());
        let names: Vec<String> = store.load_or_default("names.json").await;
        assert!(names.is_empty());
        assert!(store.load::<Vec<String>>("names.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_loads_default() {
        let storage = MockStorage::default();
        storage.put("names.json", b"{not json").await;
        let store = JsonStore::new(storage);

        assert!(store.load::<Vec<String>>("names.json").await.is_err());
        let names: Vec<String> = store.load_or_default("names.json").await;
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json() {
        let storage = MockStorage::default();
        let store = JsonStore::new(storage.clone());
        store
            .save("names.json", &vec!["Goblin".to_string(), "Orc".to_string()])
            .await
            .unwrap();

        let raw = String::from_utf8(storage.get_file("names.json").await.unwrap()).unwrap();
        assert!(raw.contains("\n  \"Goblin\""));

        let names: Vec<String> = store.load_or_default("names.json").await;
        assert_eq!(names, vec!["Goblin", "Orc"]);
    }
}
