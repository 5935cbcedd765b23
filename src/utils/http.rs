// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::REFERER;

use crate::error::{FetchError, Result};
use crate::models::ScraperConfig;

/// A fetched page, with the URL the request finally landed on after
/// redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

impl FetchedPage {
    /// True when the upstream served actual content.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Create a configured asynchronous HTTP client.
///
/// Redirect following stays enabled (reqwest's default): resolving "magic"
/// redirect URLs depends on it.
pub fn create_async_client(config: &ScraperConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page, returning its status, final URL, and body.
///
/// Transport failures (timeout, DNS, reset) collapse to
/// [`FetchError::Network`]. Non-success statuses are returned as a page so
/// the caller can classify them; bodies of error pages are not read.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    referer: Option<&str>,
) -> std::result::Result<FetchedPage, FetchError> {
    let mut request = client.get(url);
    if let Some(referer) = referer {
        request = request.header(REFERER, referer);
    }

    let response = request.send().await?;
    let status = response.status().as_u16();
    let final_url = response.url().to_string();

    let body = if (200..300).contains(&status) {
        response.text().await?
    } else {
        String::new()
    };

    Ok(FetchedPage {
        status,
        final_url,
        body,
    })
}
