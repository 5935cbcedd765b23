// src/services/brands.rs

//! Brand registry service.
//!
//! Classifies URLs against the configured brand table. Match order is
//! declaration order: some keys are substrings of other domains'
//! neighborhoods, so the first configured match must win deterministically.

use crate::models::{BrandDef, SiteBrand};

/// Ordered lookup of known brands.
pub struct BrandRegistry {
    brands: Vec<BrandDef>,
}

impl BrandRegistry {
    /// Create a registry from configured brand definitions.
    pub fn new(brands: Vec<BrandDef>) -> Self {
        Self { brands }
    }

    /// Look up a brand by its stable key.
    pub fn get(&self, key: &str) -> Option<&BrandDef> {
        self.brands.iter().find(|b| b.key == key)
    }

    /// Return the first configured brand whose key occurs in the lowercased
    /// URL, in declaration order.
    pub fn match_url(&self, url: &str) -> Option<&BrandDef> {
        let url = url.to_lowercase();
        self.brands.iter().find(|b| url.contains(&b.key))
    }

    /// Build the published identity for a known brand key, falling back to
    /// an uppercased heuristic name when the key is not configured.
    pub fn brand_for(&self, key: &str) -> SiteBrand {
        match self.get(key) {
            Some(def) => SiteBrand {
                key: def.key.clone(),
                name: def.name.clone(),
                categories: def.categories.clone(),
            },
            None => SiteBrand {
                key: key.to_lowercase(),
                name: key.to_uppercase(),
                categories: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BrandRegistry {
        BrandRegistry::new(vec![
            BrandDef {
                key: "vegamovies".to_string(),
                name: "VegaMovies".to_string(),
                categories: vec!["bollywood".to_string()],
            },
            BrandDef {
                key: "bolly4u".to_string(),
                name: "Bolly4u".to_string(),
                categories: vec![],
            },
        ])
    }

    #[test]
    fn test_match_url_by_substring() {
        let registry = registry();
        let matched = registry.match_url("https://VegaMovies.Gratis/").unwrap();
        assert_eq!(matched.key, "vegamovies");
        assert!(registry.match_url("https://example.com/").is_none());
    }

    #[test]
    fn test_match_order_is_declaration_order() {
        // Both keys occur in the URL; the first configured one wins.
        let registry = BrandRegistry::new(vec![
            BrandDef {
                key: "bolly4u".to_string(),
                name: "Bolly4u".to_string(),
                categories: vec![],
            },
            BrandDef {
                key: "bolly".to_string(),
                name: "Bolly".to_string(),
                categories: vec![],
            },
        ]);
        let matched = registry.match_url("https://bolly4u.fyi/").unwrap();
        assert_eq!(matched.key, "bolly4u");
    }

    #[test]
    fn test_brand_for_unknown_key_uses_heuristic_name() {
        let brand = registry().brand_for("moviesleech");
        assert_eq!(brand.key, "moviesleech");
        assert_eq!(brand.name, "MOVIESLEECH");
        assert!(brand.categories.is_empty());
    }
}
