use crate::core::cache::KeyValueCollection;
use crate::core::error::DataError;
use crate::core::provider::SeriesProvider;
use crate::core::series::TimeSeries;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Memoizes successful fetches of an inner provider for a fixed time-to-live.
/// Failures are not cached, so the next call tries the network again.
pub struct CachingSeriesProvider<T: SeriesProvider> {
    inner: T,
    cache: Arc<dyn KeyValueCollection>,
    ttl: Duration,
}

impl<T: SeriesProvider> CachingSeriesProvider<T> {
    pub fn new(inner: T, cache: Arc<dyn KeyValueCollection>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn cache_key(&self, id: &str, start: NaiveDate) -> String {
        format!("{}:{}:{}", self.inner.name(), id, start)
    }
}

#[async_trait]
impl<T: SeriesProvider> SeriesProvider for CachingSeriesProvider<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch_series(&self, id: &str, start: NaiveDate) -> Result<TimeSeries, DataError> {
        let key = self.cache_key(id, start);
        if let Some(cached) = self.cache.get(key.as_bytes()).await {
            match serde_json::from_slice::<TimeSeries>(&cached) {
                Ok(series) => {
                    debug!("Cache hit for series: {}", key);
                    return Ok(series);
                }
                Err(e) => {
                    warn!("Discarding unreadable cache entry {}: {}", key, e);
                    self.cache.remove(key.as_bytes()).await;
                }
            }
        }

        debug!("Cache miss for series: {}", key);
        let series = self.inner.fetch_series(id, start).await?;
        match serde_json::to_vec(&series) {
            Ok(bytes) => self.cache.put(key.as_bytes(), &bytes, Some(self.ttl)).await,
            Err(e) => warn!("Could not serialize series {} for cache: {}", key, e),
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::Observation;
    use crate::store::memory::MemoryCollection;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockInnerProvider {
        call_count: AtomicUsize,
    }

    impl MockInnerProvider {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SeriesProvider for &MockInnerProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_series(&self, id: &str, start: NaiveDate) -> Result<TimeSeries, DataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if id == "DGS10" {
                Ok(TimeSeries::new(id, vec![Observation::new(start, 4.2)]))
            } else {
                Err(DataError::NoData(id.to_string()))
            }
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_caching_series_provider() {
        let inner_provider = MockInnerProvider::new();
        let caching_provider = CachingSeriesProvider::new(
            &inner_provider,
            Arc::new(MemoryCollection::new()),
            Duration::from_secs(3600),
        );

        // First call - should hit inner provider
        let first = caching_provider.fetch_series("DGS10", start()).await.unwrap();
        assert_eq!(first.last().unwrap().value, 4.2);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 1);

        // Second call - should be cached
        let second = caching_provider.fetch_series("DGS10", start()).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 1);

        // A different window is a different key
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        caching_provider.fetch_series("DGS10", later).await.unwrap();
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let inner_provider = MockInnerProvider::new();
        let caching_provider = CachingSeriesProvider::new(
            &inner_provider,
            Arc::new(MemoryCollection::new()),
            Duration::from_secs(3600),
        );

        assert!(caching_provider.fetch_series("GOOG", start()).await.is_err());
        assert!(caching_provider.fetch_series("GOOG", start()).await.is_err());
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let inner_provider = MockInnerProvider::new();
        let caching_provider = CachingSeriesProvider::new(
            &inner_provider,
            Arc::new(MemoryCollection::new()),
            Duration::from_millis(10),
        );

        caching_provider.fetch_series("DGS10", start()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        caching_provider.fetch_series("DGS10", start()).await.unwrap();
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_replaced() {
        let inner_provider = MockInnerProvider::new();
        let cache = Arc::new(MemoryCollection::new());
        cache.put(b"mock:DGS10:2024-01-01", b"not json", None).await;
        let caching_provider =
            CachingSeriesProvider::new(&inner_provider, cache, Duration::from_secs(60));

        let series = caching_provider.fetch_series("DGS10", start()).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(inner_provider.call_count.load(Ordering::SeqCst), 1);
    }
}
