//! Key-value storage layer
//!
//! Every marketplace record lives under a single string key (see [`keys`]).
//! Backends only deal in raw bytes; [`Records`] adds the JSON codec on top.

pub mod keys;
mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;

/// Minimal key-value contract: point reads/writes plus ordered prefix scans
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove `key`; returns whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// All entries whose key starts with `prefix`, in key order
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;
}

/// Open the backend selected by configuration
pub fn open(config: &StoreConfig) -> Result<Arc<dyn KvStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Sled => Ok(Arc::new(SledStore::open(&config.path)?)),
    }
}

/// Typed JSON view over a [`KvStore`]
#[derive(Clone)]
pub struct Records {
    kv: Arc<dyn KvStore>,
}

impl Records {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Records backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn put<T: Serialize + Sync>(&self, key: &str, record: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        self.kv.set(key, bytes).await
    }

    pub async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.kv.delete(key).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.kv.exists(key).await
    }

    /// Decode every record under `prefix`
    ///
    /// A single undecodable record fails the whole scan.
    pub async fn scan<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, StoreError> {
        self.kv
            .scan_prefix(prefix)
            .await?
            .into_iter()
            .map(|(_, bytes)| serde_json::from_slice(&bytes).map_err(StoreError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        id: u32,
        text: String,
    }

    #[tokio::test]
    async fn test_records_roundtrip_and_scan() {
        let records = Records::in_memory();
        records
            .put("note:2", &Note { id: 2, text: "b".into() })
            .await
            .unwrap();
        records
            .put("note:1", &Note { id: 1, text: "a".into() })
            .await
            .unwrap();
        records.put("other:1", &"ignored").await.unwrap();

        let one: Option<Note> = records.get("note:1").await.unwrap();
        assert_eq!(one.unwrap().text, "a");

        let notes: Vec<Note> = records.scan("note:").await.unwrap();
        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2]);

        assert!(records.remove("note:1").await.unwrap());
        assert!(!records.exists("note:1").await.unwrap());
        assert!(!records.remove("note:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_scan_fails_on_corrupt_record() {
        let kv = Arc::new(MemoryStore::new());
        kv.set("note:1", b"not json".to_vec()).await.unwrap();
        let records = Records::new(kv);
        assert!(records.scan::<Note>("note:").await.is_err());
    }
}
