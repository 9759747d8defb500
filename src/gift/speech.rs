// Text-to-speech adapter: synthesize audio upstream, store the object in
// the audio bucket, return its public URL.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    voice: &'a str,
    format: &'a str,
}

pub struct SpeechSynthesizer {
    endpoint: String,
    audio_store_url: String,
    api_key: Option<String>,
    http: Client,
}

impl SpeechSynthesizer {
    /// Present only when both SPEECH_API_URL and AUDIO_STORE_URL are
    /// configured.
    pub fn from_env() -> Result<Option<Self>> {
        use crate::util::env::env_opt;

        let (Some(endpoint), Some(audio_store_url)) =
            (env_opt("SPEECH_API_URL"), env_opt("AUDIO_STORE_URL"))
        else {
            return Ok(None);
        };
        let http = Client::builder()
            .user_agent("gift-search/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Some(Self {
            endpoint,
            audio_store_url,
            api_key: env_opt("SPEECH_API_KEY"),
            http,
        }))
    }

    /// Voice per language; kk has no dedicated voice upstream, so it falls
    /// back to English.
    fn select_voice(language: &str) -> &'static str {
        match language {
            "ru" => "maxim",
            "kk" => "salli",
            _ => "joanna",
        }
    }

    /// Object key: voice + a slug of the leading words + a short unique
    /// suffix so repeated texts do not overwrite each other.
    fn object_key(text: &str, voice: &str) -> String {
        let prefix: String = text
            .chars()
            .take(20)
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("audio/{voice}_{prefix}_{}.mp3", &suffix[..8])
    }

    pub async fn synthesize(&self, text: &str, language: &str) -> Result<String> {
        let voice = Self::select_voice(language);
        let body = SynthesizeRequest {
            text,
            voice,
            format: "mp3",
        };

        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            req = req.header("X-API-KEY", key);
        }

        let resp = req.send().await.context("speech synthesis request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("speech synthesis failed: {status}"));
        }
        let audio = resp.bytes().await.context("failed to read audio body")?;

        // Upload to the audio store and hand back the object URL.
        let key = Self::object_key(text, voice);
        let object_url = Url::parse(&self.audio_store_url)
            .and_then(|base| base.join(&key))
            .with_context(|| format!("invalid AUDIO_STORE_URL {}", self.audio_store_url))?;

        let put = self
            .http
            .put(object_url.clone())
            .header("Content-Type", "audio/mpeg")
            .body(audio.to_vec())
            .send()
            .await
            .context("audio upload failed")?;
        if !put.status().is_success() {
            return Err(anyhow!("audio upload failed: {}", put.status()));
        }

        debug!(url = %object_url, "audio stored");
        Ok(object_url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_selection_per_language() {
        assert_eq!(SpeechSynthesizer::select_voice("ru"), "maxim");
        assert_eq!(SpeechSynthesizer::select_voice("kk"), "salli");
        assert_eq!(SpeechSynthesizer::select_voice("en"), "joanna");
        assert_eq!(SpeechSynthesizer::select_voice("de"), "joanna");
    }

    #[test]
    fn object_key_is_safe_for_multibyte_text() {
        // Cyrillic text must be sliced by characters, not bytes.
        let key = SpeechSynthesizer::object_key("Вот несколько идей для подарка", "maxim");
        assert!(key.starts_with("audio/maxim_Вот_несколько_идей_"));
        assert!(key.ends_with(".mp3"));
    }
}
