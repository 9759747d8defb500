// Multi-source product search: provider abstraction, normalization,
// filtering/dedup, and the concurrent aggregator that ties them together.

pub mod categories;
pub mod direct;
pub mod filter;
pub mod normalize;
pub mod product;
pub mod provider;
pub mod serper;

use anyhow::{anyhow, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use categories::CategoryTables;
use direct::DirectMarketplaceProvider;
use filter::{filter_and_dedup, ProviderBatch};
use product::{Product, SearchQuery};
use provider::{provider_timeout, ProductProvider};
use serper::{SerperShoppingProvider, SerperWebProvider};

/// Concurrent multi-source search aggregator.
///
/// Fans out one search per active provider, waits for all of them at a
/// single join point, then merges, filters, and deduplicates the partial
/// results. A provider failure is recorded and logged but never aborts the
/// operation; even a total failure returns success with an empty list.
pub struct ProductSearchService {
    providers: Vec<Arc<dyn ProductProvider>>,
    timeout: Duration,
}

impl ProductSearchService {
    pub fn new(providers: Vec<Arc<dyn ProductProvider>>) -> Self {
        Self {
            providers,
            timeout: provider_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Search every active provider concurrently and merge the results.
    ///
    /// All provider futures live inside this future, so caller cancellation
    /// (dropping the future) cancels every in-flight upstream call. Each
    /// provider additionally runs under a deadline so a stalled upstream
    /// cannot hold the barrier open.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>> {
        let mut tasks = FuturesUnordered::new();
        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let query = query.clone();
            let deadline = self.timeout;
            tasks.push(async move {
                let result = match tokio::time::timeout(deadline, provider.search(&query)).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("timed out after {deadline:?}")),
                };
                (provider.name(), provider.prefiltered(), result)
            });
        }

        // Barrier: drain every provider, success or failure. The merge
        // below is single-threaded; provider futures never share state.
        let mut batches: Vec<ProviderBatch> = Vec::new();
        let mut failures: Vec<String> = Vec::new();
        while let Some((name, prefiltered, result)) = tasks.next().await {
            match result {
                Ok(products) => {
                    debug!(provider = name, count = products.len(), "provider search ok");
                    batches.push(ProviderBatch {
                        provider: name,
                        prefiltered,
                        products,
                    });
                }
                Err(err) => {
                    warn!(provider = name, error = %err, "provider search failed");
                    failures.push(format!("{name}: {err:#}"));
                }
            }
        }

        if batches.is_empty() && !failures.is_empty() {
            // Still a success with zero products; the consolidated warning
            // lets operators tell "nothing matched" from "everything down".
            warn!(errors = ?failures, "every provider failed; returning empty result set");
        }

        Ok(filter_and_dedup(query, batches))
    }
}

/// Assemble the web-search and direct-marketplace providers whose
/// credentials are configured. A provider without credentials is simply
/// absent from the active set, not an error.
pub fn providers_from_env(tables: Arc<CategoryTables>) -> Result<Vec<Arc<dyn ProductProvider>>> {
    use crate::util::env::env_opt;

    let mut providers: Vec<Arc<dyn ProductProvider>> = Vec::new();

    if let Some(key) = env_opt("SERPER_API_TOKEN") {
        providers.push(Arc::new(SerperShoppingProvider::new(key)?));
    }
    if let Some(key) = env_opt("SERPER_API_KEY") {
        providers.push(Arc::new(SerperWebProvider::new(key)?));
    }
    if let Some(token) = env_opt("KASPI_API_TOKEN") {
        providers.push(Arc::new(DirectMarketplaceProvider::kaspi(
            token,
            Arc::clone(&tables),
        )?));
    }
    if let Some(token) = env_opt("ALIEXPRESS_API_TOKEN") {
        providers.push(Arc::new(DirectMarketplaceProvider::aliexpress(
            token,
            Arc::clone(&tables),
        )?));
    }
    if let Some(token) = env_opt("WILDBERRIES_API_TOKEN") {
        providers.push(Arc::new(DirectMarketplaceProvider::wildberries(
            token,
            Arc::clone(&tables),
        )?));
    }
    if let Some(token) = env_opt("OZON_API_TOKEN") {
        providers.push(Arc::new(DirectMarketplaceProvider::ozon(
            token,
            Arc::clone(&tables),
        )?));
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::product::{PriceRange, STORE_CATALOG};
    use super::*;
    use async_trait::async_trait;

    struct MockProvider {
        name: &'static str,
        prefiltered: bool,
        products: Vec<Product>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockProvider {
        fn ok(
            name: &'static str,
            prefiltered: bool,
            products: Vec<Product>,
        ) -> Arc<dyn ProductProvider> {
            Arc::new(Self {
                name,
                prefiltered,
                products,
                fail: false,
                delay: None,
            })
        }

        fn failing(name: &'static str) -> Arc<dyn ProductProvider> {
            Arc::new(Self {
                name,
                prefiltered: false,
                products: Vec::new(),
                fail: true,
                delay: None,
            })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<dyn ProductProvider> {
            Arc::new(Self {
                name,
                prefiltered: false,
                products: Vec::new(),
                fail: false,
                delay: Some(delay),
            })
        }
    }

    #[async_trait]
    impl ProductProvider for MockProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn prefiltered(&self) -> bool {
            self.prefiltered
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<Product>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(anyhow!("upstream unavailable"));
            }
            Ok(self.products.clone())
        }
    }

    fn product(id: &str, store: &str, category: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            title: format!("item {id}"),
            description: String::new(),
            price,
            rating: 0.0,
            url: format!("https://example.com/{id}"),
            image_url: String::new(),
            store: store.to_string(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn merges_catalog_and_web_results_with_shared_identity() {
        let catalog = MockProvider::ok(
            "catalog",
            true,
            vec![
                product("c1", STORE_CATALOG, "electronics", 100.0),
                product("c2", STORE_CATALOG, "electronics", 200.0),
                product("shared", STORE_CATALOG, "electronics", 300.0),
            ],
        );
        let web = MockProvider::ok(
            "serper_shopping",
            false,
            vec![
                product("w1", "kaspi", "electronics", 150.0),
                product("shared", "kaspi", "electronics", 310.0),
            ],
        );
        let service = ProductSearchService::new(vec![catalog, web]);
        let query = SearchQuery::new(vec!["electronics".to_string()]);

        let out = service.search(&query).await.unwrap();
        assert_eq!(out.len(), 4);

        let mut ids: Vec<&str> = out.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["c1", "c2", "shared", "w1"]);

        // The shared identity resolves to the live entry.
        let shared = out.iter().find(|p| p.id == "shared").unwrap();
        assert_eq!(shared.store, "kaspi");
    }

    #[tokio::test]
    async fn total_failure_is_success_with_empty_list() {
        let service = ProductSearchService::new(vec![
            MockProvider::failing("serper_shopping"),
            MockProvider::failing("catalog"),
        ]);
        let query = SearchQuery::new(vec!["books".to_string()]);
        let out = service.search(&query).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn partial_failure_keeps_surviving_provider_results() {
        let web = MockProvider::ok(
            "serper_web",
            false,
            vec![product("w1", "ozon", "books", 42.0)],
        );
        let service =
            ProductSearchService::new(vec![MockProvider::failing("catalog"), web]);
        let query = SearchQuery::new(vec!["books".to_string()]);
        let out = service.search(&query).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "w1");
    }

    #[tokio::test]
    async fn marketplace_scope_excludes_other_stores() {
        let catalog = MockProvider::ok(
            "catalog",
            true,
            vec![product("c1", STORE_CATALOG, "books", 10.0)],
        );
        let web = MockProvider::ok(
            "serper_web",
            false,
            vec![
                product("k1", "kaspi", "books", 20.0),
                product("o1", "ozon", "books", 30.0),
            ],
        );
        let service = ProductSearchService::new(vec![catalog, web]);
        let query =
            SearchQuery::new(vec!["books".to_string()]).with_marketplace("kaspi");
        let out = service.search(&query).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store, "kaspi");
    }

    #[tokio::test]
    async fn slow_provider_hits_deadline_without_stalling_the_rest() {
        let fast = MockProvider::ok(
            "serper_shopping",
            false,
            vec![product("w1", "kaspi", "toys", 5.0)],
        );
        let slow = MockProvider::slow("serper_web", Duration::from_secs(30));
        let service = ProductSearchService::new(vec![fast, slow])
            .with_timeout(Duration::from_millis(50));
        let query = SearchQuery::new(vec!["toys".to_string()]);
        let out = service.search(&query).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "w1");
    }

    #[tokio::test]
    async fn no_providers_yields_empty_success() {
        let service = ProductSearchService::new(Vec::new());
        let query = SearchQuery::new(vec!["toys".to_string()])
            .with_price_range(PriceRange::new(0.0, 0.0));
        let out = service.search(&query).await.unwrap();
        assert!(out.is_empty());
    }
}
