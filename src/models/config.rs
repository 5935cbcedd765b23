//! Application configuration structures.
//!
//! All tables that drive discovery and extraction (brand registry, hub lists,
//! ignore lists, heuristic thresholds) live here as explicit, immutable
//! configuration passed into the engines at construction time, so tests can
//! substitute fixtures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Domain discovery rules
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Link extraction thresholds
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Cache store settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Known brand definitions, matched in declaration order
    #[serde(default = "defaults::brands")]
    pub brands: Vec<BrandDef>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if self.cache.search_ttl_secs == 0 || self.cache.sites_ttl_secs == 0 {
            return Err(AppError::validation("cache TTLs must be > 0"));
        }
        if self.discovery.fallback_sites.is_empty() {
            return Err(AppError::validation(
                "discovery.fallback_sites must not be empty (sync output would be empty when every fetch fails)",
            ));
        }
        if self.brands.is_empty() {
            return Err(AppError::validation("No brands defined"));
        }
        for brand in &self.brands {
            if brand.key.trim().is_empty() || brand.key != brand.key.to_lowercase() {
                return Err(AppError::validation(format!(
                    "brand key '{}' must be non-empty lowercase",
                    brand.key
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            discovery: DiscoveryConfig::default(),
            extractor: ExtractorConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            brands: defaults::brands(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds for search fetches
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent outbound requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Domain discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Known redirect entry points that forward to a brand's live domain
    #[serde(default = "defaults::redirect_sources")]
    pub redirect_sources: Vec<RedirectSource>,

    /// Index pages listing links to many target sites
    #[serde(default = "defaults::hub_sources")]
    pub hub_sources: Vec<String>,

    /// Substrings identifying social/media platforms and other noise links
    #[serde(default = "defaults::ignored_domains")]
    pub ignored_domains: Vec<String>,

    /// Hardcoded fallback sites seeding every discovery pass
    #[serde(default = "defaults::fallback_sites")]
    pub fallback_sites: Vec<FallbackSite>,

    /// Hostname labels this short or shorter are noise, not a brand key
    #[serde(default = "defaults::min_brand_key_len")]
    pub min_brand_key_len: usize,

    /// How to classify hub links that match no configured brand
    #[serde(default)]
    pub policy: BrandPolicy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            redirect_sources: defaults::redirect_sources(),
            hub_sources: defaults::hub_sources(),
            ignored_domains: defaults::ignored_domains(),
            fallback_sites: defaults::fallback_sites(),
            min_brand_key_len: defaults::min_brand_key_len(),
            policy: BrandPolicy::default(),
        }
    }
}

/// Classification policy for hub links with no registry match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrandPolicy {
    /// Keep unknown sites under a heuristically derived name
    #[default]
    Permissive,
    /// Drop anything the registry does not recognize
    Whitelist,
}

/// A "magic" redirect URL paired with the brand it forwards to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectSource {
    pub url: String,
    pub brand: String,
}

/// A hardcoded fallback site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSite {
    pub url: String,
    pub name: String,
}

/// Link extraction thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Link text this short or shorter is never a result title
    #[serde(default = "defaults::min_title_len")]
    pub min_title_len: usize,

    /// Run the greedy fallback tier when structured extraction found fewer
    /// results than this
    #[serde(default = "defaults::structured_threshold")]
    pub structured_threshold: usize,

    /// Hrefs containing any of these substrings are never content pages
    #[serde(default = "defaults::excluded_markers")]
    pub excluded_markers: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_title_len: defaults::min_title_len(),
            structured_threshold: defaults::structured_threshold(),
            excluded_markers: defaults::excluded_markers(),
        }
    }
}

/// Cache store settings.
///
/// The connection URL may also come from the environment (`REDIS_URL` or
/// `KV_URL`, either accepted); the environment wins over the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection string; None selects the in-process memory store
    #[serde(default)]
    pub url: Option<String>,

    /// TTL for per-query search results
    #[serde(default = "defaults::search_ttl")]
    pub search_ttl_secs: u64,

    /// TTL for the discovered site mapping
    #[serde(default = "defaults::sites_ttl")]
    pub sites_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            search_ttl_secs: defaults::search_ttl(),
            sites_ttl_secs: defaults::sites_ttl(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the HTTP API
    #[serde(default = "defaults::listen_addr")]
    pub listen_addr: String,

    /// Allow cross-origin requests (the UI is served from elsewhere)
    #[serde(default = "defaults::cors_enabled")]
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: defaults::listen_addr(),
            cors_enabled: defaults::cors_enabled(),
        }
    }
}

/// A known brand: stable key, display name, optional category tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandDef {
    /// Lowercase identifier, stable across domain changes (e.g. "moviesmod")
    pub key: String,

    /// Human-readable name (e.g. "MoviesMod")
    pub name: String,

    /// Category tags; empty set allowed
    #[serde(default)]
    pub categories: Vec<String>,
}

mod defaults {
    use super::{BrandDef, FallbackSite, RedirectSource};

    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        7
    }
    pub fn request_delay() -> u64 {
        0
    }
    pub fn max_concurrent() -> usize {
        8
    }

    // Extractor defaults
    pub fn min_title_len() -> usize {
        3
    }
    pub fn structured_threshold() -> usize {
        2
    }
    pub fn excluded_markers() -> Vec<String> {
        vec!["/?s=".into(), "wp-json".into()]
    }

    // Cache defaults
    pub fn search_ttl() -> u64 {
        60 * 60 * 24
    }
    pub fn sites_ttl() -> u64 {
        60 * 60 * 12
    }

    // Server defaults
    pub fn listen_addr() -> String {
        "0.0.0.0:8080".into()
    }
    pub fn cors_enabled() -> bool {
        true
    }

    // Discovery defaults
    pub fn min_brand_key_len() -> usize {
        3
    }

    pub fn redirect_sources() -> Vec<RedirectSource> {
        vec![
            RedirectSource {
                url: "https://vegamovies.la".into(),
                brand: "vegamovies".into(),
            },
            RedirectSource {
                url: "https://hdhub4u.tv".into(),
                brand: "hdhub4u".into(),
            },
            RedirectSource {
                url: "https://bolly4u.cl".into(),
                brand: "bolly4u".into(),
            },
        ]
    }

    pub fn hub_sources() -> Vec<String> {
        vec![
            "https://vglist.cv/".into(),
            "https://www.modlist.in/".into(),
            "https://mmodlist.net/".into(),
            "https://hdhub4u.catering/".into(),
        ]
    }

    pub fn ignored_domains() -> Vec<String> {
        [
            "t.me",
            "telegram.me",
            "facebook.com",
            "fb.com",
            "whatsapp.com",
            "wa.me",
            "instagram.com",
            "twitter.com",
            "x.com",
            "discord.gg",
            "discord.com",
            "youtube.com",
            "youtu.be",
            "pinterest.com",
            "reddit.com",
            "linkedin.com",
            "google.com",
            "bing.com",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn fallback_sites() -> Vec<FallbackSite> {
        [
            ("https://moviesmod.town/", "MoviesMod"),
            ("https://moviesleech.zip/", "MoviesLeech"),
            ("https://rogmovies.world/", "RogMovies"),
            ("https://new3.hdhub4u.fo/", "HDHub4u"),
            ("https://vegamovies.gratis/", "VegaMovies"),
            ("https://vegamovies.kg/", "VegaMovies"),
            ("https://bolly4u.fyi/", "Bolly4u"),
        ]
        .into_iter()
        .map(|(url, name)| FallbackSite {
            url: url.into(),
            name: name.into(),
        })
        .collect()
    }

    pub fn brands() -> Vec<BrandDef> {
        vec![
            BrandDef {
                key: "vegamovies".into(),
                name: "VegaMovies".into(),
                categories: vec!["bollywood".into(), "dual-audio".into()],
            },
            BrandDef {
                key: "moviesmod".into(),
                name: "MoviesMod".into(),
                categories: vec!["hollywood".into(), "dual-audio".into()],
            },
            BrandDef {
                key: "hdhub4u".into(),
                name: "HDHub4u".into(),
                categories: vec!["bollywood".into(), "south".into()],
            },
            BrandDef {
                key: "bolly4u".into(),
                name: "Bolly4u".into(),
                categories: vec!["bollywood".into()],
            },
            BrandDef {
                key: "moviesleech".into(),
                name: "MoviesLeech".into(),
                categories: vec![],
            },
            BrandDef {
                key: "rogmovies".into(),
                name: "RogMovies".into(),
                categories: vec!["hollywood".into()],
            },
            BrandDef {
                key: "uhdmovies".into(),
                name: "UHDMovies".into(),
                categories: vec!["4k".into()],
            },
        ]
    }
}
