// Canonical product model shared by every provider

use serde::{Deserialize, Serialize};

/// Store tag applied to structured-catalog scan results.
pub const STORE_CATALOG: &str = "catalog";

/// Unified product entity. Providers normalize their raw payloads into this
/// shape; nothing downstream of the aggregator sees a provider-native type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Dedup identity. Catalog record key, or derived from the source URL.
    /// Not guaranteed globally unique across providers.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub category: String,
}

/// Inclusive price bound. `min == 0 && max == 0` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min <= 0.0 && self.max <= 0.0
    }
}

/// Input to every provider search and to the aggregator itself.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub categories: Vec<String>,
    pub price_range: PriceRange,
    pub marketplace: Option<String>,
}

impl SearchQuery {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            categories,
            price_range: PriceRange::default(),
            marketplace: None,
        }
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price_range = range;
        self
    }

    pub fn with_marketplace(mut self, marketplace: impl Into<String>) -> Self {
        let m = marketplace.into();
        self.marketplace = if m.trim().is_empty() { None } else { Some(m) };
        self
    }
}
