//! Moka-backed in-process chart cache

use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;

use super::traits::ChartCache;

/// Bounded in-process cache over serialized charts.
///
/// Size-bounded only; there is no TTL. Entries are refreshed on every
/// successful store write, never served past an explicit refresh.
pub struct MemoryChartCache {
    inner: Cache<String, serde_json::Value>,
}

impl MemoryChartCache {
    /// Create a cache holding at most `capacity` charts
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }
}

#[async_trait]
impl ChartCache for MemoryChartCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.inner.get(key).await)
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.inner.insert(key.to_string(), value.clone()).await;
        Ok(())
    }
}
