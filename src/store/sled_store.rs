//! Persistent key-value backend on sled

use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use tracing::info;

use super::KvStore;
use crate::error::StoreError;

/// Embedded database; keys are stored as their UTF-8 bytes
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open or create the database directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Opened sled store");
        Ok(Self { db })
    }
}

#[async_trait]
impl KvStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key.as_bytes())?.map(|value| value.to_vec()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.db.insert(key.as_bytes(), value)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(key.as_bytes())?)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let mut entries = Vec::new();
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, value) = item?;
            entries.push((String::from_utf8(key.to_vec())?, value.to_vec()));
        }
        Ok(entries)
    }
}
