// Text translation adapter.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

pub struct Translator {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl Translator {
    /// Present only when TRANSLATE_API_URL is configured.
    pub fn from_env() -> Result<Option<Self>> {
        use crate::util::env::env_opt;

        let Some(endpoint) = env_opt("TRANSLATE_API_URL") else {
            return Ok(None);
        };
        let http = Client::builder()
            .user_agent("gift-search/0.1")
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Some(Self {
            endpoint,
            api_key: env_opt("TRANSLATE_API_KEY"),
            http,
        }))
    }

    /// Translate text into the target language. The source language is
    /// auto-detected upstream.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let body = TranslateRequest {
            text,
            source_language: "auto",
            target_language,
        };

        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            req = req.header("X-API-KEY", key);
        }

        let resp = req.send().await.context("translation request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("translation failed: {status}"));
        }

        let parsed: TranslateResponse = resp.json().await?;
        debug!(target = target_language, "translation ok");
        Ok(parsed.translated_text)
    }
}
