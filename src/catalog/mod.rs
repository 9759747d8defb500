// Structured-store provider: a filtered bulk scan over the product catalog
// table, with every returned row tagged with the catalog store id.

pub mod db;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::marketplace::product::{Product, SearchQuery, STORE_CATALOG};
use crate::marketplace::provider::ProductProvider;

pub use db::Db;

const CATALOG_TABLE: &str = "products";

#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    title: String,
    description: Option<String>,
    price: f64,
    rating: Option<f64>,
    url: Option<String>,
    image_url: Option<String>,
    category: Option<String>,
}

impl From<CatalogRow> for Product {
    fn from(row: CatalogRow) -> Self {
        Product {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            price: row.price,
            rating: row.rating.unwrap_or(0.0),
            url: row.url.unwrap_or_default(),
            image_url: row.image_url.unwrap_or_default(),
            // Raw rows carry a marketplace column; the store tag is always
            // overwritten so catalog origin stays visible to dedup.
            store: STORE_CATALOG.to_string(),
            category: row.category.unwrap_or_default(),
        }
    }
}

pub struct CatalogProvider {
    db: Db,
}

impl CatalogProvider {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductProvider for CatalogProvider {
    fn name(&self) -> &'static str {
        "catalog"
    }

    // The scan filters by category, marketplace, and price server-side.
    fn prefiltered(&self) -> bool {
        true
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>> {
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT id, title, description, price, rating, url, image_url, category FROM ",
        );
        qb.push(CATALOG_TABLE);
        qb.push(" WHERE category = ANY(");
        qb.push_bind(&query.categories);
        qb.push(")");

        if let Some(marketplace) = query.marketplace.as_deref() {
            qb.push(" AND marketplace = ");
            qb.push_bind(marketplace);
        }
        // A zero bound means unbounded on that side.
        if query.price_range.min > 0.0 {
            qb.push(" AND price >= ");
            qb.push_bind(query.price_range.min);
        }
        if query.price_range.max > 0.0 {
            qb.push(" AND price <= ");
            qb.push_bind(query.price_range.max);
        }

        let rows: Vec<CatalogRow> = qb.build_query_as().fetch_all(&self.db.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}
