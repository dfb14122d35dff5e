use crate::core::cache::KeyValueCollection;
use crate::core::error::DataError;
use anyhow::Result;
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<SystemTime>,
}

impl CacheEntry {
    fn is_expired(&self, now: SystemTime) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// Collection persisted in a fjall partition; survives process restarts until expiry.
pub struct DiskCollection {
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }

    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(raw) = self.partition.get(key)? else {
            return Ok(None);
        };
        let entry: CacheEntry = serde_json::from_slice(&raw)?;
        if entry.is_expired(SystemTime::now()) {
            debug!(
                "Cache entry expired for key: {}",
                String::from_utf8_lossy(key)
            );
            self.partition.remove(key)?;
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    fn write(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value: value.to_vec(),
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition.insert(key, serde_json::to_vec(&entry)?)?;
        Ok(())
    }

    /// Removes expired and unreadable entries, returning how many were dropped.
    /// Keys that are never read again would otherwise stay on disk forever.
    pub fn purge_expired(&self) -> Result<usize, DataError> {
        let now = SystemTime::now();
        let mut stale = Vec::new();
        for item in self.partition.iter() {
            let (key, raw) = item.map_err(|e| DataError::Cache(e.to_string()))?;
            let expired = serde_json::from_slice::<CacheEntry>(&raw)
                .map(|entry| entry.is_expired(now))
                .unwrap_or(true);
            if expired {
                stale.push(key);
            }
        }

        let purged = stale.len();
        for key in stale {
            self.partition
                .remove(key)
                .map_err(|e| DataError::Cache(e.to_string()))?;
        }
        Ok(purged)
    }

    fn clear_all(&self) -> Result<()> {
        let keys = self
            .partition
            .keys()
            .collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let key_str = String::from_utf8_lossy(key);
        match self.read(key) {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {}", key_str);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", key_str);
                None
            }
            Err(e) => {
                debug!("DiskCollection get error for key {}: {}", key_str, e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) {
        match self.write(key, value, ttl) {
            Ok(()) => debug!("Cache PUT for key: {}", String::from_utf8_lossy(key)),
            Err(e) => debug!("DiskCollection put error: {}", e),
        }
    }

    async fn remove(&self, key: &[u8]) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskCollection remove error: {}", e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.clear_all() {
            debug!("DiskCollection clear error: {}", e)
        }
    }
}
