//! HTTP API request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::HeaderName},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStore;
use crate::models::Config;
use crate::pipeline::{run_search, run_sync};
use crate::services::{SearchScraper, SiteDiscovery};
use crate::utils::url::brand_key_from_url;

/// Diagnostic header: whether the response came from cache.
static X_CACHE: HeaderName = HeaderName::from_static("x-cache");
/// Diagnostic header: upstream scrape status of a search.
static X_SCRAPE_STATUS: HeaderName = HeaderName::from_static("x-scrape-status");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<dyn CacheStore>,
    pub scraper: Arc<SearchScraper>,
    pub discovery: Arc<SiteDiscovery>,
}

/// Structured error body for validation failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn missing_param(name: &str) -> Json<Self> {
        Json(Self {
            error: format!("Missing required parameter: {name}"),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub url: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SyncParams {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    healthy: bool,
    version: String,
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /search?q=<keyword>&url=<siteUrl>[&name=<siteName>]`
///
/// Missing `q` or `url` is the only failure surfaced as a non-200; every
/// upstream problem comes back as a 200 with a diagnostic `status` field.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let Some(keyword) = params.q.filter(|q| !q.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, ErrorResponse::missing_param("q")).into_response();
    };
    let Some(site_url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, ErrorResponse::missing_param("url")).into_response();
    };

    let site_name = params
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| {
            brand_key_from_url(&site_url, state.config.discovery.min_brand_key_len)
                .map(|key| key.to_uppercase())
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let outcome = run_search(
        &state.scraper,
        state.cache.as_ref(),
        &state.config.cache,
        &keyword,
        &site_url,
        &site_name,
    )
    .await;

    let mut headers = HeaderMap::new();
    headers.insert(X_CACHE.clone(), cache_header(outcome.cache_hit));
    if let Ok(value) = HeaderValue::from_str(outcome.response.status.as_str()) {
        headers.insert(X_SCRAPE_STATUS.clone(), value);
    }

    (StatusCode::OK, headers, Json(outcome.response)).into_response()
}

/// `GET /sync[?force=true]`
pub async fn sync(
    State(state): State<AppState>,
    Query(params): Query<SyncParams>,
) -> impl IntoResponse {
    let outcome = run_sync(
        &state.discovery,
        state.cache.as_ref(),
        &state.config.cache,
        params.force,
    )
    .await;

    let mut headers = HeaderMap::new();
    headers.insert(X_CACHE.clone(), cache_header(outcome.cache_hit));

    (StatusCode::OK, headers, Json(outcome.sites)).into_response()
}

fn cache_header(hit: bool) -> HeaderValue {
    if hit {
        HeaderValue::from_static("HIT")
    } else {
        HeaderValue::from_static("MISS")
    }
}
