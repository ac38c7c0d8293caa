//! ChartCache trait definition
//!
//! The cache is a read-through/write-through shadow of the chart store,
//! addressed by the canonical key from `synthesis::pair::cache_key`. It is
//! only ever written after a successful store read or write; the store is
//! the source of truth and the cache is always subordinate to it.

use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface for the fast key-value chart cache.
#[async_trait]
pub trait ChartCache: Send + Sync {
    /// Fetch a cached chart by canonical key; `None` is a miss
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store or refresh the entry for a canonical key
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}
