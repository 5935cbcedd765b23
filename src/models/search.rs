// src/models/search.rs

//! Search result and response structures.

use serde::{Deserialize, Serialize};

/// One extracted candidate match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    /// Trimmed link text, longer than the extractor's minimum
    pub title: String,

    /// Absolute http(s) URL of the content page
    pub link: String,

    /// Display name of the originating site
    pub site: String,
}

/// Outcome classification of one search against one site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
    /// 200 with at least one extracted result
    Ok,
    /// 200 but the extractor found nothing; page title kept for diagnostics
    OkEmpty { page_title: String },
    /// HTTP 403/503 anti-bot challenge
    Blocked,
    /// Any other non-2xx status
    HttpError { code: u16 },
    /// Timeout, DNS failure, connection reset
    NetworkError,
}

impl SearchStatus {
    /// Short identifier for logs and diagnostic headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::OkEmpty { .. } => "ok_empty",
            Self::Blocked => "blocked",
            Self::HttpError { .. } => "http_error",
            Self::NetworkError => "network_error",
        }
    }
}

/// The full response for one search against one site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(flatten)]
    pub status: SearchStatus,
}

impl SearchResponse {
    /// A response with no results and the given status.
    pub fn empty(status: SearchStatus) -> Self {
        Self {
            results: Vec::new(),
            status,
        }
    }

    /// Cache-eligibility rule: only successful, non-empty responses.
    ///
    /// Caching a blocked or empty state would poison the key with a
    /// transient failure for the full TTL.
    pub fn cacheable(&self) -> bool {
        matches!(self.status, SearchStatus::Ok) && !self.results.is_empty()
    }
}
