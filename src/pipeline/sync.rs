// src/pipeline/sync.rs

//! Site discovery pipeline: cache check, discovery pass, publish.

use std::time::Duration;

use crate::cache::{CacheStore, SITE_CONFIG_KEY};
use crate::models::{CacheConfig, SiteMap};
use crate::services::SiteDiscovery;

/// Result of a sync run, with cache provenance for diagnostics.
#[derive(Debug)]
pub struct SyncOutcome {
    pub sites: SiteMap,
    pub cache_hit: bool,
}

/// Run the discovery pipeline.
///
/// A cached mapping short-circuits the pass unless `force` is set. The
/// discovery pass itself is infallible; cache failures on either side are
/// logged and swallowed so an unreachable store degrades to always-scrape.
pub async fn run_sync(
    discovery: &SiteDiscovery,
    cache: &dyn CacheStore,
    config: &CacheConfig,
    force: bool,
) -> SyncOutcome {
    if !force {
        match cache.get(SITE_CONFIG_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<SiteMap>(&json) {
                Ok(sites) => {
                    log::debug!("Sync served from cache ({} sites)", sites.len());
                    return SyncOutcome {
                        sites,
                        cache_hit: true,
                    };
                }
                Err(error) => {
                    log::warn!("Discarding corrupt cached site map: {}", error);
                }
            },
            Ok(None) => {}
            Err(error) => {
                log::warn!("Cache read failed for {}: {}", SITE_CONFIG_KEY, error);
            }
        }
    }

    let sites = discovery.discover().await;
    log::info!("Discovery pass found {} sites", sites.len());

    publish(cache, config, &sites).await;

    SyncOutcome {
        sites,
        cache_hit: false,
    }
}

/// Write the mapping under the fixed key. At most one cache write per pass.
async fn publish(cache: &dyn CacheStore, config: &CacheConfig, sites: &SiteMap) {
    let json = match serde_json::to_string(sites) {
        Ok(json) => json,
        Err(error) => {
            log::warn!("Failed to serialize site map: {}", error);
            return;
        }
    };

    let ttl = Duration::from_secs(config.sites_ttl_secs);
    if let Err(error) = cache.set(SITE_CONFIG_KEY, &json, ttl).await {
        log::warn!("Cache write failed for {}: {}", SITE_CONFIG_KEY, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::{BrandDef, BrandPolicy, DiscoveryConfig, FallbackSite};
    use crate::services::BrandRegistry;

    fn offline_discovery() -> SiteDiscovery {
        let config = DiscoveryConfig {
            redirect_sources: vec![],
            hub_sources: vec![],
            ignored_domains: vec![],
            fallback_sites: vec![FallbackSite {
                url: "https://moviesmod.town/".to_string(),
                name: "MoviesMod".to_string(),
            }],
            min_brand_key_len: 3,
            policy: BrandPolicy::Permissive,
        };
        let registry = BrandRegistry::new(vec![BrandDef {
            key: "moviesmod".to_string(),
            name: "MoviesMod".to_string(),
            categories: vec![],
        }]);
        SiteDiscovery::new(config, registry, reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_sync_publishes_then_hits_cache() {
        let discovery = offline_discovery();
        let cache = MemoryCache::new();
        let config = CacheConfig::default();

        let first = run_sync(&discovery, &cache, &config, false).await;
        assert!(!first.cache_hit);
        assert_eq!(first.sites.len(), 1);

        let second = run_sync(&discovery, &cache, &config, false).await;
        assert!(second.cache_hit);
        assert_eq!(second.sites.sites, first.sites.sites);
    }

    #[tokio::test]
    async fn test_force_bypasses_cache_read() {
        let discovery = offline_discovery();
        let cache = MemoryCache::new();
        let config = CacheConfig::default();

        run_sync(&discovery, &cache, &config, false).await;
        let forced = run_sync(&discovery, &cache, &config, true).await;
        assert!(!forced.cache_hit);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_triggers_fresh_pass() {
        let discovery = offline_discovery();
        let cache = MemoryCache::new();
        let config = CacheConfig::default();

        cache
            .set(SITE_CONFIG_KEY, "not json", Duration::from_secs(60))
            .await
            .unwrap();

        let outcome = run_sync(&discovery, &cache, &config, false).await;
        assert!(!outcome.cache_hit);
        assert_eq!(outcome.sites.len(), 1);
    }
}
