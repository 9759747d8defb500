// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                .route(
                    "/products/search",
                    web::post().to(handlers::search_products),
                )
                .route(
                    "/gifts/recommend",
                    web::post().to(handlers::recommend_gifts),
                )
                .route("/translate", web::post().to(handlers::translate_text))
                .route("/speech", web::post().to(handlers::synthesize_speech))
                .route("/images/analyze", web::post().to(handlers::analyze_image)),
        );
}
