// Gift orchestrator: composes search categories from image labels, age
// group, and occasion, runs the product search aggregator, and optionally
// translates / voices the summary.

pub mod image;
pub mod speech;
pub mod translate;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::marketplace::categories::CategoryTables;
use crate::marketplace::product::{PriceRange, Product, SearchQuery};
use crate::marketplace::ProductSearchService;
use image::ImageAnalyzer;
use speech::SpeechSynthesizer;
use translate::Translator;

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftRequest {
    #[serde(default)]
    pub occasion: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub marketplace: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub voice_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GiftRecommendation {
    pub products: Vec<Product>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

pub struct GiftService {
    tables: Arc<CategoryTables>,
    search: Arc<ProductSearchService>,
    analyzer: Option<Arc<ImageAnalyzer>>,
    translator: Option<Arc<Translator>>,
    speech: Option<Arc<SpeechSynthesizer>>,
}

impl GiftService {
    pub fn new(
        tables: Arc<CategoryTables>,
        search: Arc<ProductSearchService>,
        analyzer: Option<Arc<ImageAnalyzer>>,
        translator: Option<Arc<Translator>>,
        speech: Option<Arc<SpeechSynthesizer>>,
    ) -> Self {
        Self {
            tables,
            search,
            analyzer,
            translator,
            speech,
        }
    }

    pub async fn recommend(&self, request: &GiftRequest) -> Result<GiftRecommendation> {
        let categories = self.compose_categories(request).await;

        let mut query = SearchQuery::new(categories).with_price_range(request.price_range);
        if let Some(marketplace) = request.marketplace.as_deref() {
            query = query.with_marketplace(marketplace);
        }
        let products = self.search.search(&query).await?;

        let mut summary = compose_summary(&products, request);
        if request.language != "en" {
            if let Some(translator) = self.translator.as_deref() {
                match translator.translate(&summary, &request.language).await {
                    Ok(translated) => summary = translated,
                    // Degrade to the untranslated summary.
                    Err(err) => warn!(error = %err, "summary translation failed"),
                }
            }
        }

        let mut audio_url = None;
        if request.voice_enabled {
            if let Some(speech) = self.speech.as_deref() {
                match speech.synthesize(&summary, &request.language).await {
                    Ok(url) => audio_url = Some(url),
                    Err(err) => warn!(error = %err, "summary voicing failed"),
                }
            }
        }

        Ok(GiftRecommendation {
            products,
            summary,
            audio_url,
        })
    }

    /// Explicit interests first, then image labels (when an image was
    /// supplied and the analyzer is configured), then age-group and
    /// occasion categories. Order-preserving dedup; an image-analysis
    /// failure only narrows the category set.
    async fn compose_categories(&self, request: &GiftRequest) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();

        for interest in &request.interests {
            let interest = interest.trim();
            if !interest.is_empty() {
                categories.push(interest.to_lowercase());
            }
        }

        if let (Some(image_url), Some(analyzer)) =
            (request.image_url.as_deref(), self.analyzer.as_deref())
        {
            match self.labels_for_url(analyzer, image_url).await {
                Ok(labels) => {
                    for label in &labels {
                        for cat in self.tables.label_categories(label) {
                            categories.push((*cat).to_string());
                        }
                    }
                }
                Err(err) => warn!(error = %err, "image analysis failed"),
            }
        }

        for cat in self.tables.age_categories(request.age) {
            categories.push((*cat).to_string());
        }
        for cat in self.tables.occasion_categories(&request.occasion) {
            categories.push((*cat).to_string());
        }

        let mut seen = std::collections::HashSet::new();
        categories.retain(|c| seen.insert(c.clone()));
        categories
    }

    async fn labels_for_url(&self, analyzer: &ImageAnalyzer, url: &str) -> Result<Vec<String>> {
        let image = analyzer.fetch_image(url).await?;
        analyzer.detect_labels(&image).await
    }
}

/// Deterministic summary of the result set; the interesting output is the
/// product list, this is the sentence the voice/translation path consumes.
fn compose_summary(products: &[Product], request: &GiftRequest) -> String {
    if products.is_empty() {
        return "No gift ideas matched the request; try widening the price range or categories."
            .to_string();
    }

    let top: Vec<&str> = products.iter().take(3).map(|p| p.title.as_str()).collect();
    let occasion = if request.occasion.is_empty() {
        "the occasion".to_string()
    } else {
        request.occasion.clone()
    };
    format!(
        "Found {} gift ideas for {}. Top picks: {}.",
        products.len(),
        occasion,
        top.join(", ")
    )
}
