// src/models/site.rs

//! Discovered site mapping structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Brand identity attached to a discovered URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteBrand {
    /// Lowercase identifier, stable across domain changes
    pub key: String,

    /// Human-readable brand name
    pub name: String,

    /// Category tags; empty set allowed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

/// The published brand → URL mapping of one discovery pass.
///
/// Keyed by canonical URL to match the wire shape
/// `{"sites": {url: brandInfo, ...}}`; the builder guarantees at most one
/// entry per brand key. Replaced wholesale on each successful pass.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteMap {
    /// When this mapping was produced
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,

    /// Canonical URL → brand identity
    pub sites: BTreeMap<String, SiteBrand>,
}

impl SiteMap {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Iterate as (url, brand) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SiteBrand)> {
        self.sites.iter()
    }
}
