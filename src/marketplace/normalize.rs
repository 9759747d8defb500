// Normalization helpers: price-string parsing, store inference from result
// URLs, and identity derivation for web-search results.

use regex::Regex;
use std::sync::OnceLock;

/// Marketplace domain substrings checked in priority order; first match wins.
const STORE_DOMAINS: [(&str, &str); 4] = [
    ("kaspi.kz", "kaspi"),
    ("wildberries", "wildberries"),
    ("aliexpress", "aliexpress"),
    ("ozon", "ozon"),
];

static PRICE_CLEANER: OnceLock<Regex> = OnceLock::new();

/// Parse a free-form price string ("12,999 ₸", "$59.99", "N/A").
///
/// Everything but ASCII digits and the decimal point is stripped before
/// parsing; an unparseable remainder normalizes to 0 rather than an error.
pub fn parse_price(raw: &str) -> f64 {
    let cleaner = PRICE_CLEANER.get_or_init(|| Regex::new(r"[^0-9.]").expect("static pattern"));
    cleaner.replace_all(raw, "").parse::<f64>().unwrap_or(0.0)
}

/// Guess the originating store for a generic web-search result from known
/// marketplace domains in its URL. No match means "unknown".
pub fn infer_store(url: &str) -> &'static str {
    for (domain, store) in STORE_DOMAINS {
        if url.contains(domain) {
            return store;
        }
    }
    "unknown"
}

/// Identity for shopping results: drop the scheme and host, join the
/// remaining path segments with '-'. URLs too short to carry a path are
/// used whole.
pub fn path_identity(url: &str) -> String {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() > 3 {
        parts[3..].join("-")
    } else {
        parts.join("-")
    }
}
