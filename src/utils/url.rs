// src/utils/url.rs

//! URL normalization and canonical-choice rules.
//!
//! Target sites surface the same brand under many spellings (www vs bare,
//! http vs https, subdomain vs apex), so every URL that enters a site map
//! goes through [`normalize`] and duplicates are resolved with
//! [`choose_canonical`].

use url::Url;

/// Normalize a site URL: lowercase, exactly one trailing slash.
///
/// Idempotent: `normalize(normalize(u)) == normalize(u)`.
///
/// # Examples
/// ```
/// use reelscout::utils::url::normalize;
///
/// assert_eq!(normalize("https://MoviesMod.Town"), "https://moviesmod.town/");
/// assert_eq!(normalize("https://moviesmod.town/"), "https://moviesmod.town/");
/// ```
pub fn normalize(url: &str) -> String {
    let mut normalized = url.trim().to_lowercase();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Derive a brand key from a URL's hostname.
///
/// Strips a leading `www.` and takes the first hostname label, lowercased.
/// Labels of `min_len` characters or fewer are noise (`new3`, `cdn`, `m`),
/// not a brand identity, and yield `None`.
pub fn brand_key_from_url(url: &str, min_len: usize) -> Option<String> {
    let host = host_without_www(url)?;
    let label = host.split('.').next()?.to_lowercase();
    if label.chars().count() > min_len {
        Some(label)
    } else {
        None
    }
}

/// Extract the hostname from a URL, lowercased, with any leading `www.`
/// removed.
pub fn host_without_www(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Pick one canonical URL out of a set of candidates for the same brand.
///
/// Preference order: `https` over `http`, then the lexicographically shortest
/// string, then first-seen. Deterministic for any input order.
pub fn choose_canonical(candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(index, url)| (scheme_rank(url), url.len(), *index))
        .map(|(_, url)| url.clone())
}

fn scheme_rank(url: &str) -> u8 {
    if url.starts_with("https://") {
        0
    } else if url.starts_with("http://") {
        1
    } else {
        2
    }
}
