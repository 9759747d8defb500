// Image label-detection adapter. The heavy lifting happens upstream; this
// client resolves the image bytes (url / base64 / raw file), ships them to
// the label-detection endpoint, and keeps labels above the confidence
// threshold.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_MAX_LABELS: u32 = 10;
const DEFAULT_MIN_CONFIDENCE: f32 = 70.0;

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    image_base64: &'a str,
    max_labels: u32,
    min_confidence: f32,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    labels: Vec<DetectedLabel>,
}

#[derive(Debug, Deserialize)]
struct DetectedLabel {
    name: String,
    #[serde(default)]
    confidence: f32,
}

pub struct ImageAnalyzer {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
    min_confidence: f32,
}

impl ImageAnalyzer {
    /// Present only when LABEL_API_URL is configured.
    pub fn from_env() -> Result<Option<Self>> {
        use crate::util::env::{env_opt, env_parse};

        let Some(endpoint) = env_opt("LABEL_API_URL") else {
            return Ok(None);
        };
        let http = Client::builder()
            .user_agent("gift-search/0.1")
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Some(Self {
            endpoint,
            api_key: env_opt("LABEL_API_KEY"),
            http,
            min_confidence: env_parse("LABEL_MIN_CONFIDENCE", DEFAULT_MIN_CONFIDENCE),
        }))
    }

    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to download image from {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("image download failed: {status}"));
        }
        let bytes = resp.bytes().await.context("failed to read image body")?;
        debug!(size = bytes.len(), "downloaded image");
        Ok(bytes.to_vec())
    }

    /// Decode a base64 image, tolerating a `data:image/...;base64,` prefix.
    pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
        let payload = match data.find(',') {
            Some(idx) if data[..idx].contains("base64") => &data[idx + 1..],
            _ => data,
        };
        BASE64
            .decode(payload.trim())
            .context("failed to decode base64 image")
    }

    /// Detect labels for an image, keeping only those above the confidence
    /// threshold.
    pub async fn detect_labels(&self, image: &[u8]) -> Result<Vec<String>> {
        let encoded = BASE64.encode(image);
        let body = DetectRequest {
            image_base64: &encoded,
            max_labels: DEFAULT_MAX_LABELS,
            min_confidence: self.min_confidence,
        };

        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            req = req.header("X-API-KEY", key);
        }

        let resp = req.send().await.context("label detection request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("label detection failed: {status}"));
        }

        let parsed: DetectResponse = resp.json().await?;
        let labels: Vec<String> = parsed
            .labels
            .into_iter()
            .filter(|l| l.confidence >= self.min_confidence)
            .map(|l| l.name)
            .collect();
        debug!(count = labels.len(), "labels detected");
        Ok(labels)
    }
}
