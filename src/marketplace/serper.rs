// Serper.dev search providers: shopping vertical and organic web search.
// Both build a free-text query from the requested categories and normalize
// heterogeneous result shapes into the canonical Product model.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::normalize::{infer_store, parse_price, path_identity};
use super::product::{Product, SearchQuery};
use super::provider::{provider_timeout, ProductProvider};

const SHOPPING_ENDPOINT: &str = "https://google.serper.dev/shopping";
const WEB_ENDPOINT: &str = "https://google.serper.dev/search";

fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        s.truncate(max_len);
        s.push('…');
    }
    s
}

/// Free-text query: categories joined by spaces, an optional price hint, an
/// optional site: restriction, and a regional buy hint for relevance.
pub fn build_search_query(query: &SearchQuery) -> String {
    let mut q = query.categories.iter().join(" ");

    let range = &query.price_range;
    if !range.is_unbounded() {
        q.push_str(&format!(
            " price {}-{} тенге",
            range.min as i64, range.max as i64
        ));
    }
    if let Some(marketplace) = query.marketplace.as_deref() {
        q.push_str(" site:");
        q.push_str(marketplace);
    }
    q.push_str(" купить в Казахстане");
    q
}

#[derive(Debug, Serialize)]
struct ShoppingRequest<'a> {
    q: &'a str,
    gl: &'a str,
    num: u32,
    #[serde(rename = "type")]
    search_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ShoppingResponse {
    #[serde(default)]
    shopping: Vec<ShoppingResult>,
}

#[derive(Debug, Deserialize)]
struct ShoppingResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    source: String,
    #[serde(default, rename = "imageUrl")]
    image_url: String,
}

/// Shopping-vertical provider. Result identity is the link URL with scheme
/// and domain stripped; the result's own source string becomes the store.
pub struct SerperShoppingProvider {
    api_key: String,
    http: Client,
}

impl SerperShoppingProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent("gift-search/0.1")
            .timeout(provider_timeout())
            .build()?;
        Ok(Self { api_key, http })
    }

    fn to_products(&self, results: Vec<ShoppingResult>, category: &str) -> Vec<Product> {
        results
            .into_iter()
            .map(|r| Product {
                id: path_identity(&r.link),
                // Shopping results carry no separate description; reuse
                // the title.
                description: r.title.clone(),
                title: r.title,
                price: parse_price(&r.price),
                rating: 0.0,
                url: r.link,
                image_url: r.image_url,
                store: if r.source.is_empty() {
                    "unknown".to_string()
                } else {
                    r.source
                },
                category: category.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl ProductProvider for SerperShoppingProvider {
    fn name(&self) -> &'static str {
        "serper_shopping"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>> {
        let q = build_search_query(query);
        let body = ShoppingRequest {
            q: &q,
            gl: "kz",
            num: 20,
            search_type: "shopping",
        };

        let resp = self
            .http
            .post(SHOPPING_ENDPOINT)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            return Err(anyhow!("serper shopping search failed: {status} body={body}"));
        }

        let parsed: ShoppingResponse = resp.json().await?;
        // A result is tagged with the first query category, not the full set.
        let category = query.categories.first().map(String::as_str).unwrap_or("");
        Ok(self.to_products(parsed.shopping, category))
    }
}

#[derive(Debug, Serialize)]
struct WebRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct WebResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default, rename = "imageUrl")]
    image_url: String,
    #[serde(default)]
    price: String,
}

/// Organic web-search provider. Result identity is the raw link URL; the
/// store is inferred from known marketplace domains in the link.
pub struct SerperWebProvider {
    api_key: String,
    http: Client,
}

impl SerperWebProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent("gift-search/0.1")
            .timeout(provider_timeout())
            .build()?;
        Ok(Self { api_key, http })
    }

    fn to_products(&self, results: Vec<OrganicResult>, category: &str) -> Vec<Product> {
        results
            .into_iter()
            .map(|r| Product {
                id: r.link.clone(),
                title: r.title,
                description: r.snippet,
                price: parse_price(&r.price),
                rating: 0.0,
                store: infer_store(&r.link).to_string(),
                url: r.link,
                image_url: r.image_url,
                category: category.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl ProductProvider for SerperWebProvider {
    fn name(&self) -> &'static str {
        "serper_web"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>> {
        let q = build_search_query(query);
        let resp = self
            .http
            .post(WEB_ENDPOINT)
            .header("X-API-KEY", &self.api_key)
            .json(&WebRequest { q: &q })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            return Err(anyhow!("serper web search failed: {status} body={body}"));
        }

        let parsed: WebResponse = resp.json().await?;
        let category = query.categories.first().map(String::as_str).unwrap_or("");
        Ok(self.to_products(parsed.organic, category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::product::PriceRange;

    #[test]
    fn query_joins_categories_and_appends_hints() {
        let query = SearchQuery::new(vec!["electronics".to_string(), "books".to_string()]);
        assert_eq!(
            build_search_query(&query),
            "electronics books купить в Казахстане"
        );
    }

    #[test]
    fn query_includes_price_and_marketplace_hints() {
        let query = SearchQuery::new(vec!["toys".to_string()])
            .with_price_range(PriceRange::new(1000.0, 5000.0))
            .with_marketplace("kaspi");
        assert_eq!(
            build_search_query(&query),
            "toys price 1000-5000 тенге site:kaspi купить в Казахстане"
        );
    }

    #[test]
    fn shopping_results_normalize_price_and_identity() {
        let provider = SerperShoppingProvider::new("test-key".into()).unwrap();
        let results = vec![ShoppingResult {
            title: "Lego set".into(),
            link: "https://kaspi.kz/shop/p/lego-42115".into(),
            price: "24 990 ₸".into(),
            source: "kaspi".into(),
            image_url: "https://img.kaspi.kz/lego.jpg".into(),
        }];
        let products = provider.to_products(results, "toys");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "shop-p-lego-42115");
        assert_eq!(products[0].price, 24990.0);
        assert_eq!(products[0].store, "kaspi");
        assert_eq!(products[0].category, "toys");
    }

    #[test]
    fn organic_results_infer_store_from_link() {
        let provider = SerperWebProvider::new("test-key".into()).unwrap();
        let results = vec![
            OrganicResult {
                title: "Wildberries find".into(),
                link: "https://www.wildberries.ru/catalog/1".into(),
                snippet: "a thing".into(),
                image_url: String::new(),
                price: String::new(),
            },
            OrganicResult {
                title: "Elsewhere".into(),
                link: "https://example.com/2".into(),
                snippet: String::new(),
                image_url: String::new(),
                price: "N/A".into(),
            },
        ];
        let products = provider.to_products(results, "books");
        assert_eq!(products[0].store, "wildberries");
        assert_eq!(products[0].id, "https://www.wildberries.ru/catalog/1");
        assert_eq!(products[1].store, "unknown");
        assert_eq!(products[1].price, 0.0);
    }
}
