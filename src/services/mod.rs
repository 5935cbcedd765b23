//! Core scraping services.
//!
//! - `brands`: ordered brand-identity resolution
//! - `extract`: tiered search-result link extraction
//! - `search`: per-site keyword search with fan-out
//! - `discovery`: redirect + hub based domain discovery

pub mod brands;
pub mod discovery;
pub mod extract;
pub mod search;

pub use brands::BrandRegistry;
pub use discovery::SiteDiscovery;
pub use extract::LinkExtractor;
pub use search::SearchScraper;
