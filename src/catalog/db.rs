use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct Db {
    pub pool: PgPool,
}

impl Db {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;
        info!("connected to catalog db");

        // Optional schema bootstrap (default: OFF). Production deployments
        // own the schema; enable explicitly with AUTO_MIGRATE=1/true/on.
        if crate::util::env::env_flag("AUTO_MIGRATE", false) {
            info!("ensuring catalog schema (AUTO_MIGRATE=on)");
            Self::ensure_schema(&pool).await?;
        }

        Ok(Self { pool })
    }

    async fn ensure_schema(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT,
                price       DOUBLE PRECISION NOT NULL DEFAULT 0,
                rating      DOUBLE PRECISION NOT NULL DEFAULT 0,
                url         TEXT,
                image_url   TEXT,
                marketplace TEXT,
                category    TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}
