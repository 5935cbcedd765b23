// src/services/search.rs

//! Keyword search service.
//!
//! Fetches a site's search endpoint and runs the link extractor over the
//! response. This tier never propagates errors: it is invoked in a fan-out
//! over many independent sites, and one site's failure must not affect the
//! others. Every failure mode collapses into a [`SearchStatus`] variant.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::Result;
use crate::models::{
    ExtractorConfig, ScraperConfig, SearchResponse, SearchResult, SearchStatus, SiteMap,
};
use crate::services::extract::{LinkExtractor, page_title};
use crate::utils::http::{create_async_client, fetch_page};

/// Service for searching target sites by keyword.
pub struct SearchScraper {
    config: ScraperConfig,
    client: Client,
    extractor: LinkExtractor,
}

impl SearchScraper {
    /// Create a new search scraper with the given configuration.
    pub fn new(config: ScraperConfig, extractor_config: ExtractorConfig) -> Result<Self> {
        let client = create_async_client(&config)?;
        Ok(Self {
            config,
            client,
            extractor: LinkExtractor::new(extractor_config),
        })
    }

    /// Build the conventional WordPress-style search URL for a site.
    ///
    /// Spaces in the keyword become `+`, everything else is form-encoded.
    pub fn build_search_url(site_url: &str, keyword: &str) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(keyword.trim().as_bytes()).collect();
        format!("{}/?s={}", site_url.trim_end_matches('/'), encoded)
    }

    /// Search one site for a keyword. Infallible by design.
    pub async fn search(&self, keyword: &str, site_url: &str, site_name: &str) -> SearchResponse {
        let search_url = Self::build_search_url(site_url, keyword);
        log::debug!("Searching {}: {}", site_name, search_url);

        // Referer mimicry: some anti-bot layers reject referrer-less clients.
        let page = match fetch_page(&self.client, &search_url, Some(site_url)).await {
            Ok(page) => page,
            Err(error) => {
                log::warn!("Search fetch failed for {} ({}): {}", site_name, search_url, error);
                return SearchResponse::empty(SearchStatus::NetworkError);
            }
        };

        match page.status {
            403 | 503 => SearchResponse::empty(SearchStatus::Blocked),
            status if !page.is_success() => {
                SearchResponse::empty(SearchStatus::HttpError { code: status })
            }
            _ => {
                let links = self.extractor.extract(&page.body, keyword);
                if links.is_empty() {
                    SearchResponse::empty(SearchStatus::OkEmpty {
                        page_title: page_title(&page.body).unwrap_or_default(),
                    })
                } else {
                    SearchResponse {
                        results: links
                            .into_iter()
                            .map(|l| SearchResult {
                                title: l.title,
                                link: l.link,
                                site: site_name.to_string(),
                            })
                            .collect(),
                        status: SearchStatus::Ok,
                    }
                }
            }
        }
    }

    /// Search every site in a map concurrently, bounded by `max_concurrent`.
    ///
    /// Returns one `(site name, response)` pair per site; failed sites come
    /// back with their failure status rather than being dropped.
    pub async fn search_all(
        &self,
        keyword: &str,
        sites: &SiteMap,
    ) -> Vec<(String, SearchResponse)> {
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let concurrency = self.config.max_concurrent.max(1);

        let mut site_stream = stream::iter(sites.iter())
            .map(|(url, brand)| async move {
                let response = self.search(keyword, url, &brand.name).await;
                (brand.name.clone(), response)
            })
            .buffer_unordered(concurrency);

        let mut responses = Vec::with_capacity(sites.len());
        while let Some(entry) = site_stream.next().await {
            responses.push(entry);

            if delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }
        }

        responses
    }
}
