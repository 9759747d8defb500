// Direct marketplace API clients (kaspi / aliexpress / wildberries / ozon).
// Each is enabled only when its token is configured, maps categories through
// the per-marketplace vocabulary table, and returns provider-native JSON
// deserialized straight into the Product shape.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;

use super::categories::CategoryTables;
use super::product::{Product, SearchQuery};
use super::provider::{provider_timeout, ProductProvider};

const KASPI_ENDPOINT: &str = "https://kaspi.kz/shop/api/products/search";
const ALIEXPRESS_ENDPOINT: &str = "https://api.aliexpress.com/v2/products/search";
const WILDBERRIES_ENDPOINT: &str = "https://suppliers-api.wildberries.ru/api/v3/products";
const OZON_ENDPOINT: &str = "https://api-seller.ozon.ru/v3/product/list";

pub struct DirectMarketplaceProvider {
    marketplace: &'static str,
    token: String,
    http: Client,
    tables: Arc<CategoryTables>,
}

impl DirectMarketplaceProvider {
    fn new(marketplace: &'static str, token: String, tables: Arc<CategoryTables>) -> Result<Self> {
        let http = Client::builder()
            .user_agent("gift-search/0.1")
            .timeout(provider_timeout())
            .build()?;
        Ok(Self {
            marketplace,
            token,
            http,
            tables,
        })
    }

    pub fn kaspi(token: String, tables: Arc<CategoryTables>) -> Result<Self> {
        Self::new("kaspi", token, tables)
    }

    pub fn aliexpress(token: String, tables: Arc<CategoryTables>) -> Result<Self> {
        Self::new("aliexpress", token, tables)
    }

    pub fn wildberries(token: String, tables: Arc<CategoryTables>) -> Result<Self> {
        Self::new("wildberries", token, tables)
    }

    pub fn ozon(token: String, tables: Arc<CategoryTables>) -> Result<Self> {
        Self::new("ozon", token, tables)
    }

    async fn fetch(&self, query: &SearchQuery, mapped: &[String]) -> Result<Vec<Product>> {
        let range = &query.price_range;
        let joined = mapped.join(",");

        let req = match self.marketplace {
            "kaspi" => self
                .http
                .get(KASPI_ENDPOINT)
                .bearer_auth(&self.token)
                .query(&[
                    ("categories", joined.as_str()),
                    ("price_from", &format!("{:.0}", range.min)),
                    ("price_to", &format!("{:.0}", range.max)),
                ]),
            "aliexpress" => self
                .http
                .get(ALIEXPRESS_ENDPOINT)
                .bearer_auth(&self.token)
                .query(&[
                    ("categories", joined.as_str()),
                    ("price_min", &format!("{:.2}", range.min)),
                    ("price_max", &format!("{:.2}", range.max)),
                ]),
            "wildberries" => self
                .http
                .get(WILDBERRIES_ENDPOINT)
                .header("Authorization", &self.token)
                .query(&[
                    ("subjects", joined.as_str()),
                    ("priceFrom", &format!("{:.0}", range.min)),
                    ("priceTo", &format!("{:.0}", range.max)),
                ]),
            "ozon" => self
                .http
                .post(OZON_ENDPOINT)
                .header("Client-Id", &self.token)
                .header("Api-Key", &self.token)
                .json(&json!({
                    "categories": mapped,
                    "price": { "from": range.min, "to": range.max },
                })),
            other => return Err(anyhow!("unsupported marketplace: {other}")),
        };

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!(
                "{} search failed: {status}",
                self.marketplace
            ));
        }

        let mut products: Vec<Product> = resp.json().await?;
        for product in &mut products {
            product.store = self.marketplace.to_string();
        }
        Ok(products)
    }
}

#[async_trait]
impl ProductProvider for DirectMarketplaceProvider {
    fn name(&self) -> &'static str {
        self.marketplace
    }

    fn prefiltered(&self) -> bool {
        true
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>> {
        // A marketplace-scoped query is answered by that marketplace alone.
        if query
            .marketplace
            .as_deref()
            .is_some_and(|m| m != self.marketplace)
        {
            return Ok(Vec::new());
        }

        let mapped = self
            .tables
            .map_for_marketplace(self.marketplace, &query.categories);
        if mapped.is_empty() {
            // Every requested category fell outside this marketplace's
            // vocabulary; nothing to ask for.
            return Ok(Vec::new());
        }

        self.fetch(query, &mapped).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn other_marketplace_scope_short_circuits() {
        let tables = Arc::new(CategoryTables::new());
        let provider = DirectMarketplaceProvider::kaspi("token".into(), tables).unwrap();
        let query =
            SearchQuery::new(vec!["electronics".to_string()]).with_marketplace("ozon");
        let out = provider.search(&query).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn fully_unmapped_categories_yield_empty_without_a_call() {
        let tables = Arc::new(CategoryTables::new());
        let provider = DirectMarketplaceProvider::wildberries("token".into(), tables).unwrap();
        let query = SearchQuery::new(vec!["spaceships".to_string()]);
        let out = provider.search(&query).await.unwrap();
        assert!(out.is_empty());
    }
}
