//! Cache store abstractions.
//!
//! Two key families:
//! - `search:<siteName>:<normalizedKeyword>`: per-query search results
//! - `app:site_config`: the discovered site mapping
//!
//! Values are the exact serialized JSON response bodies. The store is an
//! external collaborator: every failure at a call site is logged and
//! swallowed so the system degrades to always-scrape instead of failing
//! the request.

pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CacheConfig;
use crate::utils::normalize_keyword;

// Re-export for convenience
pub use memory::MemoryCache;
pub use redis::RedisCache;

/// Fixed key for the discovered site mapping.
pub const SITE_CONFIG_KEY: &str = "app:site_config";

/// Cache key for one (site, keyword) search. The keyword is normalized so
/// `" Batman "` and `"batman"` share an entry; the site name prevents
/// collisions across sites.
pub fn search_key(site_name: &str, keyword: &str) -> String {
    format!("search:{}:{}", site_name, normalize_keyword(keyword))
}

/// Trait for cache store backends.
///
/// Concurrent reads and last-writer-wins concurrent writes; no
/// transactional guarantee. Entries expire passively via TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value; `None` on absence or expiry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value with a TTL, overwriting any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Select a cache backend from configuration and environment.
///
/// `REDIS_URL` or `KV_URL` (either accepted, in that order) override the
/// config file. With no URL at all, or when the Redis connection cannot be
/// established, an in-process memory store is used so the scraper keeps
/// working.
pub async fn connect(config: &CacheConfig) -> Arc<dyn CacheStore> {
    let url = std::env::var("REDIS_URL")
        .or_else(|_| std::env::var("KV_URL"))
        .ok()
        .or_else(|| config.url.clone());

    match url {
        Some(url) => match RedisCache::connect(&url).await {
            Ok(cache) => {
                log::info!("Connected to cache store");
                Arc::new(cache)
            }
            Err(error) => {
                log::warn!(
                    "Cache store unavailable ({}); falling back to in-process cache",
                    error
                );
                Arc::new(MemoryCache::new())
            }
        },
        None => {
            log::info!("No cache URL configured; using in-process cache");
            Arc::new(MemoryCache::new())
        }
    }
}
