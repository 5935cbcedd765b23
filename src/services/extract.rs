// src/services/extract.rs

//! Tiered search-result link extraction.
//!
//! Target sites vary wildly in markup quality. Structured heading markup
//! gives high-precision results when present; a greedy scan over every
//! anchor guarantees some recall on minimal or unknown markup at the cost
//! of noise. The greedy tier only runs when the structured tier came up
//! short.
//!
//! Extraction is pure, synchronous computation over an in-memory body and
//! never fails: the worst outcome is an empty list.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::models::ExtractorConfig;
use crate::utils::{normalize_keyword, normalize_whitespace};

/// A candidate (title, link) pair before site attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub title: String,
    pub link: String,
}

/// Two-tier link extractor.
pub struct LinkExtractor {
    config: ExtractorConfig,
}

impl LinkExtractor {
    /// Create an extractor with the given thresholds.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract candidate links matching `keyword` from an HTML body.
    ///
    /// Candidates whose link exactly matches one already accepted in this
    /// call are discarded.
    pub fn extract(&self, body: &str, keyword: &str) -> Vec<ExtractedLink> {
        let document = Html::parse_document(body);
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        self.extract_structured(&document, &keyword, &mut seen, &mut results);

        if results.len() < self.config.structured_threshold {
            self.extract_greedy(&document, &keyword, &mut seen, &mut results);
        }

        results
    }

    /// Tier 1: headings with a `title`/`entry`/`post` class, first link inside.
    fn extract_structured(
        &self,
        document: &Html,
        keyword: &str,
        seen: &mut HashSet<String>,
        results: &mut Vec<ExtractedLink>,
    ) {
        let heading_sel = Selector::parse("h1, h2, h3, h4").unwrap();
        let link_sel = Selector::parse("a[href]").unwrap();

        for heading in document.select(&heading_sel) {
            let Some(class) = heading.value().attr("class") else {
                continue;
            };
            if !["title", "entry", "post"].iter().any(|m| class.contains(m)) {
                continue;
            }

            let Some(link) = heading.select(&link_sel).next() else {
                continue;
            };
            let title = link_text(&link);
            let Some(href) = link.value().attr("href") else {
                continue;
            };

            if title.chars().count() <= self.config.min_title_len {
                continue;
            }
            if !title.to_lowercase().contains(keyword) {
                continue;
            }
            if seen.insert(href.to_string()) {
                results.push(ExtractedLink {
                    title,
                    link: href.to_string(),
                });
            }
        }
    }

    /// Tier 2: every anchor on the page, with noise filters.
    fn extract_greedy(
        &self,
        document: &Html,
        keyword: &str,
        seen: &mut HashSet<String>,
        results: &mut Vec<ExtractedLink>,
    ) {
        let link_sel = Selector::parse("a[href]").unwrap();

        for link in document.select(&link_sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let title = link_text(&link);

            if title.chars().count() <= self.config.min_title_len {
                continue;
            }
            if !title.to_lowercase().contains(keyword) {
                continue;
            }
            if !href.starts_with("http://") && !href.starts_with("https://") {
                continue;
            }
            if self.config.excluded_markers.iter().any(|m| href.contains(m)) {
                continue;
            }
            if seen.insert(href.to_string()) {
                results.push(ExtractedLink {
                    title,
                    link: href.to_string(),
                });
            }
        }
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

fn link_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Extract the `<title>` of a page, whitespace-collapsed.
pub fn page_title(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let title_sel = Selector::parse("title").unwrap();
    document
        .select(&title_sel)
        .next()
        .map(|t| normalize_whitespace(&t.text().collect::<String>()))
}
