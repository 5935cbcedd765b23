// src/pipeline/search.rs

//! Search pipeline: read-through cache around the search scraper.

use std::time::Duration;

use crate::cache::{CacheStore, search_key};
use crate::models::{CacheConfig, SearchResponse};
use crate::services::SearchScraper;

/// Result of a cached search, with cache provenance for diagnostics.
#[derive(Debug)]
pub struct SearchOutcome {
    pub response: SearchResponse,
    pub cache_hit: bool,
}

/// Search one site with read-through caching.
///
/// Only successful, non-empty responses are written back: caching a
/// blocked or empty state would pin a transient failure for the full TTL.
/// Cache failures on either side are logged and swallowed.
pub async fn run_search(
    scraper: &SearchScraper,
    cache: &dyn CacheStore,
    config: &CacheConfig,
    keyword: &str,
    site_url: &str,
    site_name: &str,
) -> SearchOutcome {
    let key = search_key(site_name, keyword);

    match cache.get(&key).await {
        Ok(Some(json)) => match serde_json::from_str::<SearchResponse>(&json) {
            Ok(response) => {
                log::debug!("Search served from cache: {}", key);
                return SearchOutcome {
                    response,
                    cache_hit: true,
                };
            }
            Err(error) => {
                log::warn!("Discarding corrupt cached search entry {}: {}", key, error);
            }
        },
        Ok(None) => {}
        Err(error) => {
            log::warn!("Cache read failed for {}: {}", key, error);
        }
    }

    let response = scraper.search(keyword, site_url, site_name).await;

    if response.cacheable() {
        match serde_json::to_string(&response) {
            Ok(json) => {
                let ttl = Duration::from_secs(config.search_ttl_secs);
                if let Err(error) = cache.set(&key, &json, ttl).await {
                    log::warn!("Cache write failed for {}: {}", key, error);
                }
            }
            Err(error) => {
                log::warn!("Failed to serialize search response: {}", error);
            }
        }
    }

    SearchOutcome {
        response,
        cache_hit: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::{ExtractorConfig, ScraperConfig, SearchStatus};

    const RESULT_PAGE: &str = r#"<html><body>
        <h2 class="entry-title">
          <a href="https://example.com/batman-begins">Batman Begins</a>
        </h2>
    </body></html>"#;

    fn scraper() -> SearchScraper {
        SearchScraper::new(ScraperConfig::default(), ExtractorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_successful_search_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(RESULT_PAGE)
            .expect(1)
            .create_async()
            .await;

        let scraper = scraper();
        let cache = MemoryCache::new();
        let config = CacheConfig::default();

        let first =
            run_search(&scraper, &cache, &config, "batman", &server.url(), "Example").await;
        assert!(!first.cache_hit);
        assert_eq!(first.response.status, SearchStatus::Ok);

        // Second identical query is served from cache: the mock only
        // tolerates one upstream hit.
        let second =
            run_search(&scraper, &cache, &config, "batman", &server.url(), "Example").await;
        assert!(second.cache_hit);
        assert_eq!(second.response, first.response);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blocked_response_is_never_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .expect(2)
            .create_async()
            .await;

        let scraper = scraper();
        let cache = MemoryCache::new();
        let config = CacheConfig::default();

        let first =
            run_search(&scraper, &cache, &config, "batman", &server.url(), "Example").await;
        assert_eq!(first.response.status, SearchStatus::Blocked);
        assert_eq!(cache.len(), 0);

        // The follow-up call misses the cache and fetches again.
        let second =
            run_search(&scraper, &cache, &config, "batman", &server.url(), "Example").await;
        assert!(!second.cache_hit);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_response_is_never_cached() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html><head><title>Example</title></head><body></body></html>")
            .create_async()
            .await;

        let scraper = scraper();
        let cache = MemoryCache::new();
        let config = CacheConfig::default();

        run_search(&scraper, &cache, &config, "batman", &server.url(), "Example").await;
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_keyword_normalization_shares_cache_entries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(RESULT_PAGE)
            .expect(1)
            .create_async()
            .await;

        let scraper = scraper();
        let cache = MemoryCache::new();
        let config = CacheConfig::default();

        run_search(&scraper, &cache, &config, "batman", &server.url(), "Example").await;
        let second =
            run_search(&scraper, &cache, &config, "  BATMAN ", &server.url(), "Example").await;
        assert!(second.cache_hit);
        mock.assert_async().await;
    }
}
