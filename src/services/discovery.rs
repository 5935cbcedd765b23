// src/services/discovery.rs

//! Site discovery service.
//!
//! Target sites change domains frequently to evade takedowns, so the
//! mapping of brand → current URL has to be rebuilt from two kinds of
//! sources: "magic" redirect URLs that forward to a brand's live domain,
//! and hub pages that index many working mirrors. Every per-source failure
//! is contained as a `Result` and contributes nothing to the pass.

use std::collections::BTreeMap;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::FetchError;
use crate::models::{BrandPolicy, DiscoveryConfig, RedirectSource, SiteBrand, SiteMap};
use crate::services::brands::BrandRegistry;
use crate::services::extract::page_title;
use crate::utils::http::fetch_page;
use crate::utils::url::{brand_key_from_url, choose_canonical, host_without_www, normalize};

/// Maximum concurrency for discovery fetches.
const CONCURRENCY_LIMIT: usize = 8;

/// One recorded (url, brand) pair awaiting deduplication.
#[derive(Debug, Clone)]
struct Candidate {
    url: String,
    brand: SiteBrand,
}

/// Service for discovering current working domains per brand.
pub struct SiteDiscovery {
    config: DiscoveryConfig,
    registry: BrandRegistry,
    client: Client,
}

impl SiteDiscovery {
    /// Create a new discovery service.
    pub fn new(config: DiscoveryConfig, registry: BrandRegistry, client: Client) -> Self {
        Self {
            config,
            registry,
            client,
        }
    }

    /// Run one full discovery pass. Infallible: the configured fallback
    /// sites seed the result, so the output is never empty even when every
    /// network call fails.
    pub async fn discover(&self) -> SiteMap {
        let mut candidates = self.seed_candidates();

        // Tier 1: resolve magic redirect URLs.
        let mut redirect_stream = stream::iter(&self.config.redirect_sources)
            .map(|source| self.resolve_redirect_tagged(source))
            .buffer_unordered(CONCURRENCY_LIMIT);

        while let Some((source, result)) = redirect_stream.next().await {
            match result {
                Ok(Some(candidate)) => {
                    log::debug!("Resolved {} -> {}", source.url, candidate.url);
                    candidates.push(candidate);
                }
                Ok(None) => {
                    log::info!("Discarding parked domain behind {}", source.url);
                }
                Err(error) => {
                    log::warn!("Failed to resolve {}: {}", source.url, error);
                }
            }
        }

        // Tier 2: crawl hub index pages.
        let mut hub_stream = stream::iter(&self.config.hub_sources)
            .map(|hub| self.crawl_hub_tagged(hub))
            .buffer_unordered(CONCURRENCY_LIMIT);

        while let Some((hub, result)) = hub_stream.next().await {
            match result {
                Ok(found) => {
                    log::debug!("Hub {} yielded {} candidates", hub, found.len());
                    candidates.extend(found);
                }
                Err(error) => {
                    log::warn!("Failed to crawl hub {}: {}", hub, error);
                }
            }
        }

        Self::deduplicate(candidates)
    }

    /// Tagging wrapper so `buffer_unordered` results carry their source.
    /// Separate `async fn` (vs. an inline `async move` block) so the future
    /// is higher-ranked over the borrowed `source` lifetime.
    async fn resolve_redirect_tagged<'a>(
        &self,
        source: &'a RedirectSource,
    ) -> (&'a RedirectSource, Result<Option<Candidate>, FetchError>) {
        let result = self.resolve_redirect(source).await;
        (source, result)
    }

    /// Tagging wrapper so `buffer_unordered` results carry their hub URL.
    async fn crawl_hub_tagged<'a>(
        &self,
        hub: &'a String,
    ) -> (&'a String, Result<Vec<Candidate>, FetchError>) {
        let result = self.crawl_hub(hub).await;
        (hub, result)
    }

    /// Fetch a magic URL with redirects followed and validate where it
    /// landed. `Ok(None)` means the final page looked like a parked domain.
    async fn resolve_redirect(
        &self,
        source: &RedirectSource,
    ) -> Result<Option<Candidate>, FetchError> {
        let page = fetch_page(&self.client, &source.url, None).await?;
        if !page.is_success() {
            return Err(FetchError::from_status(page.status));
        }

        // Parked-domain heuristic: lapsed domains serve a for-sale page.
        if let Some(title) = page_title(&page.body) {
            let title = title.to_lowercase();
            if title.contains("domain") || title.contains("sale") {
                return Ok(None);
            }
        }

        Ok(Some(Candidate {
            url: normalize(&page.final_url),
            brand: self.registry.brand_for(&source.brand),
        }))
    }

    /// Fetch one hub page and report the (url, brand) candidates it yields.
    ///
    /// Diagnostic entry point for hub vetting; the discovery pass itself
    /// goes through [`Self::discover`].
    pub async fn probe_hub(
        &self,
        hub_url: &str,
    ) -> Result<Vec<(String, SiteBrand)>, FetchError> {
        let candidates = self.crawl_hub(hub_url).await?;
        Ok(candidates.into_iter().map(|c| (c.url, c.brand)).collect())
    }

    /// Fetch one hub page and collect brand candidates from its links.
    async fn crawl_hub(&self, hub_url: &str) -> Result<Vec<Candidate>, FetchError> {
        let page = fetch_page(&self.client, hub_url, None).await?;
        if !page.is_success() {
            return Err(FetchError::from_status(page.status));
        }
        Ok(self.hub_candidates(&page.body, hub_url))
    }

    /// Pure link-filtering pass over a hub page body.
    fn hub_candidates(&self, body: &str, hub_url: &str) -> Vec<Candidate> {
        let document = Html::parse_document(body);
        let link_sel = Selector::parse("a[href]").unwrap();
        let hub_host = host_without_www(hub_url);

        let mut candidates = Vec::new();
        for element in document.select(&link_sel) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let href = href.trim().to_lowercase();

            if !href.starts_with("http://") && !href.starts_with("https://") {
                continue;
            }

            // A hub's links to itself are navigation, not mirrors.
            let link_host = host_without_www(&href);
            if link_host.is_none() || link_host == hub_host {
                continue;
            }

            if self.config.ignored_domains.iter().any(|d| href.contains(d)) {
                continue;
            }

            let url = normalize(&href);
            if let Some(brand) = self.classify(&url) {
                candidates.push(Candidate { url, brand });
            }
        }
        candidates
    }

    /// Resolve a URL to a brand identity under the configured policy.
    fn classify(&self, url: &str) -> Option<SiteBrand> {
        if let Some(def) = self.registry.match_url(url) {
            return Some(self.registry.brand_for(&def.key));
        }

        match self.config.policy {
            BrandPolicy::Permissive => {
                let key = brand_key_from_url(url, self.config.min_brand_key_len)?;
                Some(SiteBrand {
                    name: key.to_uppercase(),
                    key,
                    categories: Vec::new(),
                })
            }
            BrandPolicy::Whitelist => None,
        }
    }

    /// Candidates derived from the hardcoded fallback sites.
    fn seed_candidates(&self) -> Vec<Candidate> {
        self.config
            .fallback_sites
            .iter()
            .map(|site| {
                let url = normalize(&site.url);
                let brand = match self.registry.match_url(&url) {
                    Some(def) => self.registry.brand_for(&def.key),
                    None => SiteBrand {
                        key: site.name.to_lowercase(),
                        name: site.name.clone(),
                        categories: Vec::new(),
                    },
                };
                Candidate { url, brand }
            })
            .collect()
    }

    /// Group candidates by brand key and pick one canonical URL per brand.
    fn deduplicate(candidates: Vec<Candidate>) -> SiteMap {
        let mut groups: BTreeMap<String, (SiteBrand, Vec<String>)> = BTreeMap::new();
        for candidate in candidates {
            groups
                .entry(candidate.brand.key.clone())
                .or_insert_with(|| (candidate.brand.clone(), Vec::new()))
                .1
                .push(candidate.url);
        }

        let mut map = SiteMap {
            synced_at: Some(Utc::now()),
            sites: BTreeMap::new(),
        };
        for (_, (brand, urls)) in groups {
            if let Some(url) = choose_canonical(&urls) {
                map.sites.insert(url, brand);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrandDef, FallbackSite};

    fn discovery(policy: BrandPolicy) -> SiteDiscovery {
        let config = DiscoveryConfig {
            redirect_sources: vec![],
            hub_sources: vec![],
            ignored_domains: vec!["t.me".to_string(), "facebook.com".to_string()],
            fallback_sites: vec![FallbackSite {
                url: "https://moviesmod.town/".to_string(),
                name: "MoviesMod".to_string(),
            }],
            min_brand_key_len: 3,
            policy,
        };
        let registry = BrandRegistry::new(vec![BrandDef {
            key: "moviesmod".to_string(),
            name: "MoviesMod".to_string(),
            categories: vec![],
        }]);
        SiteDiscovery::new(config, registry, Client::new())
    }

    #[test]
    fn test_hub_candidates_exclude_self_links() {
        let body = r#"
            <a href="https://modlist.in/about">About</a>
            <a href="https://www.modlist.in/contact">Contact</a>
            <a href="https://moviesmod.town">MoviesMod</a>
        "#;
        let candidates = discovery(BrandPolicy::Permissive)
            .hub_candidates(body, "https://modlist.in/");
        let urls: Vec<_> = candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://moviesmod.town/"]);
    }

    #[test]
    fn test_hub_candidates_apply_ignore_list() {
        let body = r#"
            <a href="https://t.me/moviesmod">Telegram</a>
            <a href="https://facebook.com/moviesmod">Facebook</a>
            <a href="https://vegamovies.gratis/">VegaMovies</a>
        "#;
        let candidates = discovery(BrandPolicy::Permissive)
            .hub_candidates(body, "https://modlist.in/");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://vegamovies.gratis/");
        // Unknown brand under permissive policy: heuristic identity
        assert_eq!(candidates[0].brand.key, "vegamovies");
        assert_eq!(candidates[0].brand.name, "VEGAMOVIES");
    }

    #[test]
    fn test_hub_candidates_whitelist_drops_unknown_brands() {
        let body = r#"
            <a href="https://vegamovies.gratis/">VegaMovies</a>
            <a href="https://moviesmod.dad/">MoviesMod mirror</a>
        "#;
        let candidates = discovery(BrandPolicy::Whitelist)
            .hub_candidates(body, "https://modlist.in/");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].brand.key, "moviesmod");
    }

    #[test]
    fn test_hub_candidates_skip_relative_links() {
        let body = r#"<a href="/mirrors">Mirrors</a>"#;
        assert!(discovery(BrandPolicy::Permissive)
            .hub_candidates(body, "https://modlist.in/")
            .is_empty());
    }

    #[test]
    fn test_permissive_rejects_short_host_labels() {
        let body = r#"<a href="https://abc.example-index.com/">abc</a>"#;
        assert!(discovery(BrandPolicy::Permissive)
            .hub_candidates(body, "https://modlist.in/")
            .is_empty());
    }

    #[test]
    fn test_deduplicate_one_entry_per_brand() {
        let brand = SiteBrand {
            key: "moviesmod".to_string(),
            name: "MoviesMod".to_string(),
            categories: vec![],
        };
        let candidates = vec![
            Candidate {
                url: "http://moviesmod.town/".to_string(),
                brand: brand.clone(),
            },
            Candidate {
                url: "https://moviesmod.town/".to_string(),
                brand: brand.clone(),
            },
            Candidate {
                url: "https://moviesmod.day/".to_string(),
                brand: brand.clone(),
            },
        ];
        let map = SiteDiscovery::deduplicate(candidates);
        assert_eq!(map.len(), 1);
        // https beats http, then the shorter string wins.
        assert!(map.sites.contains_key("https://moviesmod.day/"));
    }

    #[tokio::test]
    async fn test_discover_survives_total_network_failure() {
        let mut disco = discovery(BrandPolicy::Permissive);
        disco.config.redirect_sources = vec![RedirectSource {
            url: "http://127.0.0.1:1/".to_string(),
            brand: "moviesmod".to_string(),
        }];
        disco.config.hub_sources = vec!["http://127.0.0.1:1/".to_string()];

        let map = disco.discover().await;
        // Fallback seeding keeps the output non-empty.
        assert_eq!(map.len(), 1);
        assert!(map.sites.contains_key("https://moviesmod.town/"));
    }

    #[tokio::test]
    async fn test_resolve_redirect_discards_parked_domains() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><head><title>This domain is for sale</title></head></html>")
            .create_async()
            .await;

        let disco = discovery(BrandPolicy::Permissive);
        let source = RedirectSource {
            url: format!("{}/", server.url()),
            brand: "moviesmod".to_string(),
        };
        let resolved = disco.resolve_redirect(&source).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_resolve_redirect_records_final_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><head><title>MoviesMod</title></head></html>")
            .create_async()
            .await;

        let disco = discovery(BrandPolicy::Permissive);
        let source = RedirectSource {
            url: format!("{}/", server.url()),
            brand: "moviesmod".to_string(),
        };
        let resolved = disco.resolve_redirect(&source).await.unwrap().unwrap();
        assert_eq!(resolved.url, format!("{}/", server.url()));
        assert_eq!(resolved.brand.name, "MoviesMod");
    }
}
