// HTTP request handlers for API endpoints

use crate::api::models::*;
use crate::catalog::Db;
use crate::gift::image::ImageAnalyzer;
use crate::gift::speech::SpeechSynthesizer;
use crate::gift::translate::Translator;
use crate::gift::{GiftRequest, GiftService};
use crate::marketplace::categories::CategoryTables;
use crate::marketplace::product::SearchQuery;
use crate::marketplace::ProductSearchService;
use actix_web::{web, HttpResponse, Result};
use std::sync::Arc;
use std::time::Instant;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub gift: Arc<GiftService>,
    pub search: Arc<ProductSearchService>,
    pub tables: Arc<CategoryTables>,
    pub db: Option<Db>,
    pub analyzer: Option<Arc<ImageAnalyzer>>,
    pub translator: Option<Arc<Translator>>,
    pub speech: Option<Arc<SpeechSynthesizer>>,
    pub started_at: Instant,
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()>::error(message))
}

fn unavailable(message: impl Into<String>) -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ApiResponse::<()>::error(message))
}

fn internal(message: impl Into<String>) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::<()>::error(message))
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db_status = match &state.db {
        Some(db) => match sqlx::query_scalar::<_, bool>("SELECT true")
            .fetch_one(&db.pool)
            .await
        {
            Ok(_) => "connected",
            Err(_) => "disconnected",
        },
        None => "not configured",
    };

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        providers: state.search.provider_count(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Fan-out product search across the configured providers
pub async fn search_products(
    payload: web::Json<ProductSearchRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if payload.categories.iter().all(|c| c.trim().is_empty()) {
        return Ok(bad_request("at least one category is required"));
    }

    let mut query =
        SearchQuery::new(payload.categories.clone()).with_price_range(payload.price_range);
    if let Some(marketplace) = payload.marketplace.as_deref() {
        query = query.with_marketplace(marketplace);
    }

    tracing::info!(
        categories = ?query.categories,
        marketplace = ?query.marketplace,
        "Product search requested"
    );

    match state.search.search(&query).await {
        Ok(products) => {
            let count = products.len();
            Ok(HttpResponse::Ok().json(ApiResponse::success(ProductSearchResponse {
                products,
                count,
            })))
        }
        Err(err) => {
            tracing::error!(error = %err, "Product search failed");
            Ok(internal("product search failed"))
        }
    }
}

/// End-to-end gift recommendation
pub async fn recommend_gifts(
    payload: web::Json<GiftRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    tracing::info!(
        occasion = %payload.occasion,
        age = payload.age,
        language = %payload.language,
        "Gift recommendation requested"
    );

    match state.gift.recommend(&payload).await {
        Ok(recommendation) => Ok(HttpResponse::Ok().json(ApiResponse::success(recommendation))),
        Err(err) => {
            tracing::error!(error = %err, "Gift recommendation failed");
            Ok(internal("gift recommendation failed"))
        }
    }
}

/// Translate arbitrary text
pub async fn translate_text(
    payload: web::Json<TranslationRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if payload.text.trim().is_empty() {
        return Ok(bad_request("text is required"));
    }
    if payload.target_language.trim().is_empty() {
        return Ok(bad_request("target_language is required"));
    }
    let Some(translator) = state.translator.as_deref() else {
        return Ok(unavailable("translation is not configured"));
    };

    match translator
        .translate(&payload.text, &payload.target_language)
        .await
    {
        Ok(translated_text) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            TranslationResponse {
                translated_text,
                target_language: payload.target_language.clone(),
            },
        ))),
        Err(err) => {
            tracing::error!(error = %err, "Translation failed");
            Ok(internal("translation failed"))
        }
    }
}

/// Synthesize speech and return the stored audio URL
pub async fn synthesize_speech(
    payload: web::Json<SpeechRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if payload.text.trim().is_empty() {
        return Ok(bad_request("text is required"));
    }
    let Some(speech) = state.speech.as_deref() else {
        return Ok(unavailable("speech synthesis is not configured"));
    };

    match speech.synthesize(&payload.text, &payload.language).await {
        Ok(audio_url) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(SpeechResponse { audio_url })))
        }
        Err(err) => {
            tracing::error!(error = %err, "Speech synthesis failed");
            Ok(internal("speech synthesis failed"))
        }
    }
}

/// Detect image labels and map them to gift categories
pub async fn analyze_image(
    payload: web::Json<ImageAnalysisRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some(analyzer) = state.analyzer.as_deref() else {
        return Ok(unavailable("image analysis is not configured"));
    };

    if let Some(source) = payload.image_source.as_deref() {
        let consistent = match source {
            "url" => payload.image_url.is_some(),
            "base64" => payload.image_base64.is_some(),
            _ => false,
        };
        if !consistent {
            return Ok(bad_request("image_source does not match the provided image field"));
        }
    }

    let image = match (payload.image_url.as_deref(), payload.image_base64.as_deref()) {
        (Some(url), None) => match analyzer.fetch_image(url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = %err, "Image download failed");
                return Ok(bad_request("could not download image"));
            }
        },
        (None, Some(data)) => match ImageAnalyzer::decode_base64(data) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(bad_request("invalid base64 image")),
        },
        _ => return Ok(bad_request("exactly one of image_url or image_base64 is required")),
    };

    match analyzer.detect_labels(&image).await {
        Ok(labels) => {
            let mut categories: Vec<String> = Vec::new();
            for label in &labels {
                for cat in state.tables.label_categories(label) {
                    let cat = (*cat).to_string();
                    if !categories.contains(&cat) {
                        categories.push(cat);
                    }
                }
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(ImageAnalysisResponse {
                labels,
                categories,
            })))
        }
        Err(err) => {
            tracing::error!(error = %err, "Label detection failed");
            Ok(internal("image analysis failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes;
    use actix_web::{test, App};

    fn empty_state() -> AppState {
        let tables = Arc::new(CategoryTables::new());
        let search = Arc::new(ProductSearchService::new(Vec::new()));
        AppState {
            gift: Arc::new(GiftService::new(
                tables.clone(),
                search.clone(),
                None,
                None,
                None,
            )),
            search,
            tables,
            db: None,
            analyzer: None,
            translator: None,
            speech: None,
            started_at: Instant::now(),
        }
    }

    #[actix_web::test]
    async fn health_reports_unconfigured_database() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(empty_state()))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp: ApiResponse<HealthResponse> = test::call_and_read_body_json(&app, req).await;
        assert!(resp.success);
        let health = resp.data.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.database, "not configured");
        assert_eq!(health.providers, 0);
    }

    #[actix_web::test]
    async fn search_rejects_empty_categories() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(empty_state()))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/products/search")
            .set_json(serde_json::json!({ "categories": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn translate_without_backend_is_unavailable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(empty_state()))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/translate")
            .set_json(serde_json::json!({ "text": "hello", "target_language": "ru" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[actix_web::test]
    async fn recommend_with_no_providers_returns_empty_list() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(empty_state()))
                .configure(routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/gifts/recommend")
            .set_json(serde_json::json!({ "occasion": "birthday", "age": 8 }))
            .to_request();
        let resp: ApiResponse<crate::gift::GiftRecommendation> =
            test::call_and_read_body_json(&app, req).await;
        assert!(resp.success);
        assert!(resp.data.unwrap().products.is_empty());
    }
}
