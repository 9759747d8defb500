// Post-merge filtering and identity-based deduplication.

use indexmap::IndexMap;

use super::product::{PriceRange, Product, SearchQuery, STORE_CATALOG};

/// One provider's contribution to a merged result set.
#[derive(Debug)]
pub struct ProviderBatch {
    pub provider: &'static str,
    /// Whether the source already filtered server-side. Prefiltered batches
    /// skip the category predicate; price and marketplace predicates apply
    /// to everything.
    pub prefiltered: bool,
    pub products: Vec<Product>,
}

/// Merge provider batches into one filtered, deduplicated product list.
///
/// Dedup rule: first-seen wins, except a catalog-sourced entry is replaced
/// by a later live (non-catalog) entry sharing its identity. Live data is
/// fresher than the catalog snapshot; among live entries the earlier one is
/// kept. Output preserves insertion order of the merged set.
pub fn filter_and_dedup(query: &SearchQuery, batches: Vec<ProviderBatch>) -> Vec<Product> {
    let mut unique: IndexMap<String, Product> = IndexMap::new();

    for batch in batches {
        for product in batch.products {
            if !batch.prefiltered && !matches_category(&product, &query.categories) {
                continue;
            }
            if !matches_price(&product, &query.price_range) {
                continue;
            }
            if !matches_marketplace(&product, query.marketplace.as_deref()) {
                continue;
            }

            let keep = match unique.get(&product.id) {
                None => true,
                // Replacing through insert keeps the original position, so
                // insertion order stays stable.
                Some(existing) => {
                    existing.store == STORE_CATALOG && product.store != STORE_CATALOG
                }
            };
            if keep {
                unique.insert(product.id.clone(), product);
            }
        }
    }

    unique.into_values().collect()
}

/// Case-insensitive substring match, in either direction, against any of
/// the requested categories.
fn matches_category(product: &Product, categories: &[String]) -> bool {
    let product_cat = product.category.to_lowercase();
    categories.iter().any(|cat| {
        let wanted = cat.to_lowercase();
        product_cat.contains(&wanted) || wanted.contains(&product_cat)
    })
}

fn matches_price(product: &Product, range: &PriceRange) -> bool {
    if range.min > 0.0 && product.price < range.min {
        return false;
    }
    if range.max > 0.0 && product.price > range.max {
        return false;
    }
    true
}

fn matches_marketplace(product: &Product, marketplace: Option<&str>) -> bool {
    match marketplace {
        Some(m) => product.store == m,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::product::SearchQuery;

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

    fn batch(prefiltered: bool, products: Vec<Product>) -> ProviderBatch {
        ProviderBatch {
            provider: "test",
            prefiltered,
            products,
        }
    }

    #[test]
    fn category_matches_substring_both_directions() {
        let query = SearchQuery::new(vec!["electronics".to_string()]);
        let exact = product("a", "kaspi", "Electronics", 10.0);
        let wider = product("b", "kaspi", "electronics & gadgets", 10.0);
        let narrower = product("c", "kaspi", "electro", 10.0);
        let miss = product("d", "kaspi", "books", 10.0);

        let out = filter_and_dedup(&query, vec![batch(false, vec![exact, wider, narrower, miss])]);
        let ids: Vec<&str> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn prefiltered_batches_skip_category_predicate() {
        let query = SearchQuery::new(vec!["electronics".to_string()]);
        let unrelated = product("a", STORE_CATALOG, "совсем другое", 10.0);
        let out = filter_and_dedup(&query, vec![batch(true, vec![unrelated])]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn price_bounds_apply_when_positive() {
        let query = SearchQuery::new(vec!["toys".to_string()])
            .with_price_range(PriceRange::new(100.0, 500.0));
        let low = product("a", "kaspi", "toys", 50.0);
        let inside = product("b", "kaspi", "toys", 100.0);
        let high = product("c", "kaspi", "toys", 501.0);
        let out = filter_and_dedup(&query, vec![batch(false, vec![low, inside, high])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "b");
    }

    #[test]
    fn zero_bounds_mean_unbounded() {
        let query = SearchQuery::new(vec!["toys".to_string()]);
        let free = product("a", "kaspi", "toys", 0.0);
        let pricey = product("b", "kaspi", "toys", 1_000_000.0);
        let out = filter_and_dedup(&query, vec![batch(false, vec![free, pricey])]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn marketplace_filter_is_exact_and_applies_to_all_sources() {
        let query =
            SearchQuery::new(vec!["books".to_string()]).with_marketplace("kaspi");
        let kaspi = product("a", "kaspi", "books", 10.0);
        let ozon = product("b", "ozon", "books", 10.0);
        let catalog = product("c", STORE_CATALOG, "books", 10.0);
        let out = filter_and_dedup(
            &query,
            vec![batch(true, vec![catalog]), batch(false, vec![kaspi, ozon])],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store, "kaspi");
    }

    #[test]
    fn dedup_prefers_live_entry_over_catalog() {
        let query = SearchQuery::new(vec!["toys".to_string()]);
        let from_catalog = product("same", STORE_CATALOG, "toys", 10.0);
        let from_web = product("same", "kaspi", "toys", 12.0);
        let out = filter_and_dedup(
            &query,
            vec![
                batch(true, vec![from_catalog]),
                batch(false, vec![from_web]),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store, "kaspi");
        assert_eq!(out[0].price, 12.0);
    }

    #[test]
    fn dedup_keeps_first_seen_among_live_entries() {
        let query = SearchQuery::new(vec!["toys".to_string()]);
        let first = product("same", "kaspi", "toys", 10.0);
        let second = product("same", "ozon", "toys", 12.0);
        let out = filter_and_dedup(&query, vec![batch(false, vec![first, second])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store, "kaspi");
    }

    #[test]
    fn catalog_entry_is_not_displaced_by_another_catalog_entry() {
        let query = SearchQuery::new(vec!["toys".to_string()]);
        let first = product("same", STORE_CATALOG, "toys", 10.0);
        let mut second = product("same", STORE_CATALOG, "toys", 99.0);
        second.title = "later duplicate".to_string();
        let out = filter_and_dedup(&query, vec![batch(true, vec![first, second])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].price, 10.0);
    }
}
