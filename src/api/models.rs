// API request/response models (DTOs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::product::{PriceRange, Product};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: Some(Meta::now()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            meta: Some(Meta::now()),
        }
    }
}

/// Metadata included in all API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub version: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub providers: usize,
    pub uptime_seconds: u64,
}

/// Product search request
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductSearchRequest {
    pub categories: Vec<String>,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub marketplace: Option<String>,
}

/// Product search response
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductSearchResponse {
    pub products: Vec<Product>,
    pub count: usize,
}

/// Translation request
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub target_language: String,
}

/// Translation response
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_text: String,
    pub target_language: String,
}

/// Speech synthesis request
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_speech_language")]
    pub language: String,
}

fn default_speech_language() -> String {
    "en".to_string()
}

/// Speech synthesis response
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechResponse {
    pub audio_url: String,
}

/// Image analysis request; exactly one of the two sources must be set.
/// `image_source` ("url" / "base64") is optional and only has to agree
/// with the field that was actually provided.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageAnalysisRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_source: Option<String>,
}

/// Image analysis response
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageAnalysisResponse {
    pub labels: Vec<String>,
    /// Gift categories the detected labels map to
    pub categories: Vec<String>,
}
