//! reelscout CLI
//!
//! Local entry point for serving the HTTP API and for one-off scraping
//! runs against the configured sites.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reelscout::{
    cache,
    error::Result,
    models::{Config, SearchStatus},
    pipeline,
    server::{AppState, HttpServer},
    services::{BrandRegistry, SearchScraper, SiteDiscovery},
    utils::http::{create_async_client, fetch_page},
    utils::url::brand_key_from_url,
};

/// reelscout - multi-site movie search scraper
#[derive(Parser, Debug)]
#[command(name = "reelscout", version, about = "Multi-site movie search scraper")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Override the configured listen address
        #[arg(long)]
        addr: Option<String>,
    },

    /// Discover current working domains for all brands
    Sync {
        /// Bypass the cached mapping and run a full pass
        #[arg(long)]
        force: bool,
    },

    /// Search sites for a keyword
    Search {
        /// Keyword to search for
        keyword: String,

        /// Search only this site instead of the whole synced map
        #[arg(long)]
        url: Option<String>,

        /// Display name for --url (derived from the hostname if omitted)
        #[arg(long)]
        name: Option<String>,
    },

    /// Check one site: connection, redirects, page title, optional search
    Probe {
        /// Site URL to test
        url: String,

        /// Also run a keyword search against the site
        #[arg(long)]
        keyword: Option<String>,
    },

    /// Preview which brand candidates a hub page yields
    ProbeHub {
        /// Hub URL to scrape
        url: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_state(config: Config) -> Result<AppState> {
    let config = Arc::new(config);
    let client = create_async_client(&config.scraper)?;
    let scraper = SearchScraper::new(config.scraper.clone(), config.extractor.clone())?;
    let discovery = SiteDiscovery::new(
        config.discovery.clone(),
        BrandRegistry::new(config.brands.clone()),
        client,
    );

    Ok(AppState {
        scraper: Arc::new(scraper),
        discovery: Arc::new(discovery),
        cache: Arc::new(cache::MemoryCache::new()),
        config,
    })
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Serve { addr } => {
            if let Some(addr) = addr {
                config.server.listen_addr = addr;
            }
            config.validate()?;

            let mut state = build_state(config)?;
            state.cache = cache::connect(&state.config.cache).await;

            HttpServer::new(state).run().await?;
        }

        Command::Sync { force } => {
            let state = build_state(config)?;
            let cache = cache::connect(&state.config.cache).await;

            let outcome =
                pipeline::run_sync(&state.discovery, cache.as_ref(), &state.config.cache, force)
                    .await;

            log::info!(
                "Synced {} sites ({})",
                outcome.sites.len(),
                if outcome.cache_hit { "cached" } else { "fresh" }
            );
            for (url, brand) in outcome.sites.iter() {
                log::info!("  {} -> {}", brand.name, url);
            }
        }

        Command::Search { keyword, url, name } => {
            let state = build_state(config)?;

            if let Some(site_url) = url {
                let site_name = name
                    .or_else(|| {
                        brand_key_from_url(&site_url, state.config.discovery.min_brand_key_len)
                            .map(|key| key.to_uppercase())
                    })
                    .unwrap_or_else(|| "Unknown".to_string());

                let response = state.scraper.search(&keyword, &site_url, &site_name).await;
                report_search(&site_name, &response.status, response.results.len());
                for result in &response.results {
                    log::info!("  {} -> {}", result.title, result.link);
                }
                return Ok(());
            }

            // No site given: sync first, then fan out over the whole map.
            let cache = cache::connect(&state.config.cache).await;
            let sites =
                pipeline::run_sync(&state.discovery, cache.as_ref(), &state.config.cache, false)
                    .await
                    .sites;
            log::info!("Searching {} sites for '{}'", sites.len(), keyword);

            let mut total = 0;
            for (site_name, response) in state.scraper.search_all(&keyword, &sites).await {
                report_search(&site_name, &response.status, response.results.len());
                for result in &response.results {
                    log::info!("  {} -> {}", result.title, result.link);
                }
                total += response.results.len();
            }
            log::info!("{} results total", total);
        }

        Command::Probe { url, keyword } => {
            let client = create_async_client(&config.scraper)?;

            match fetch_page(&client, &url, None).await {
                Ok(page) => {
                    log::info!("Status:    {}", page.status);
                    log::info!("Final URL: {}", page.final_url);
                    log::info!(
                        "Title:     {}",
                        reelscout::services::extract::page_title(&page.body)
                            .unwrap_or_else(|| "No Title".to_string())
                    );

                    if let Some(keyword) = keyword {
                        let scraper =
                            SearchScraper::new(config.scraper.clone(), config.extractor.clone())?;
                        let response = scraper.search(&keyword, &page.final_url, "probe").await;
                        report_search(&page.final_url, &response.status, response.results.len());
                        for result in response.results.iter().take(5) {
                            log::info!("  {} -> {}", result.title, result.link);
                        }
                    }
                }
                Err(error) => log::error!("Probe failed: {}", error),
            }
        }

        Command::ProbeHub { url } => {
            let state = build_state(config)?;

            match state.discovery.probe_hub(&url).await {
                Ok(candidates) => {
                    log::info!("Hub yielded {} candidates:", candidates.len());
                    for (url, brand) in candidates {
                        log::info!("  {} -> {}", brand.name, url);
                    }
                }
                Err(error) => log::error!("Hub unreachable: {}", error),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!(
                "Config OK ({} brands, {} hubs, {} fallback sites)",
                config.brands.len(),
                config.discovery.hub_sources.len(),
                config.discovery.fallback_sites.len()
            );
        }
    }

    Ok(())
}

fn report_search(site: &str, status: &SearchStatus, count: usize) {
    match status {
        SearchStatus::Ok => log::info!("[{}] {} results", site, count),
        SearchStatus::OkEmpty { page_title } => {
            log::info!("[{}] no matches (page title: {})", site, page_title)
        }
        SearchStatus::Blocked => log::warn!("[{}] blocked by anti-bot challenge", site),
        SearchStatus::HttpError { code } => log::warn!("[{}] HTTP error {}", site, code),
        SearchStatus::NetworkError => log::warn!("[{}] network error", site),
    }
}
