// HTTP API server binary for gift-search

use anyhow::Result;
use gift_search::api::{ApiServer, AppState};
use gift_search::catalog::{CatalogProvider, Db};
use gift_search::gift::image::ImageAnalyzer;
use gift_search::gift::speech::SpeechSynthesizer;
use gift_search::gift::translate::Translator;
use gift_search::gift::GiftService;
use gift_search::marketplace::categories::CategoryTables;
use gift_search::marketplace::provider::ProductProvider;
use gift_search::marketplace::{self, ProductSearchService};
use gift_search::util::env as env_util;
use std::sync::Arc;
use std::time::Instant;

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize logging
    gift_search::logging::init_tracing("info,sqlx=warn")?;

    tracing::info!("Initializing gift-search API server");

    // Load dotenv/env once (safe to call multiple times)
    env_util::init_env();
    env_util::preflight_check(
        "gift-search api",
        &[],
        &[
            "API_HOST",
            "API_PORT",
            "DATABASE_URL",
            "SERPER_API_TOKEN",
            "KASPI_API_TOKEN",
            "ALIEXPRESS_API_TOKEN",
            "WILDBERRIES_API_TOKEN",
            "OZON_API_TOKEN",
            "TRANSLATE_API_URL",
            "SPEECH_API_URL",
            "LABEL_API_URL",
        ],
    )?;

    let server = ApiServer::from_env()?;
    let tables = Arc::new(CategoryTables::new());

    // Database is optional; without it the catalog provider is skipped.
    let db = match env_util::db_url_opt() {
        Some(database_url) => {
            let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 10u32);
            let db = Db::connect(&database_url, max_connections).await?;
            tracing::info!("Database connected successfully");
            Some(db)
        }
        None => {
            tracing::warn!("no database URL configured; catalog provider disabled");
            None
        }
    };

    let mut providers: Vec<Arc<dyn ProductProvider>> =
        marketplace::providers_from_env(tables.clone())?;
    if let Some(db) = db.clone() {
        providers.push(Arc::new(CatalogProvider::new(db)));
    }
    tracing::info!(count = providers.len(), "providers configured");

    let search = Arc::new(ProductSearchService::new(providers));
    let analyzer = ImageAnalyzer::from_env()?.map(Arc::new);
    let translator = Translator::from_env()?.map(Arc::new);
    let speech = SpeechSynthesizer::from_env()?.map(Arc::new);

    let gift = Arc::new(GiftService::new(
        tables.clone(),
        search.clone(),
        analyzer.clone(),
        translator.clone(),
        speech.clone(),
    ));

    let state = AppState {
        gift,
        search,
        tables,
        db,
        analyzer,
        translator,
        speech,
        started_at: Instant::now(),
    };

    server.run(state).await?;

    Ok(())
}
