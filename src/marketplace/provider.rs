// Provider capability abstraction

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use super::product::{Product, SearchQuery};

/// Default per-provider network deadline; one slow upstream must not hold
/// the aggregation barrier open when the caller supplied no deadline.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// One external product source. Implementations translate the query into
/// their own vocabulary, call the upstream, and normalize the response into
/// canonical `Product`s with `store` always set.
#[async_trait]
pub trait ProductProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the source applies category/price/marketplace filters
    /// server-side. Non-prefiltered sources get the category predicate
    /// applied after the merge.
    fn prefiltered(&self) -> bool {
        false
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>>;
}

/// Provider request deadline, env-overridable via PROVIDER_TIMEOUT_SECS.
pub fn provider_timeout() -> Duration {
    let secs: u64 =
        crate::util::env::env_parse("PROVIDER_TIMEOUT_SECS", DEFAULT_PROVIDER_TIMEOUT_SECS);
    Duration::from_secs(secs.max(1))
}
