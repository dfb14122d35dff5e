//! Time-boxed key-value storage used to memoize fetched series.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A byte-oriented collection whose entries may expire.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    /// Returns the value, or `None` when missing or expired.
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>);
    async fn remove(&self, key: &[u8]);
    async fn clear(&self);
}

/// Hands out named collections, either in memory or persisted on disk.
pub trait Store: Send + Sync {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;

    fn remove_collection(&self, name: &str) -> bool;
}
