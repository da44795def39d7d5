//! Translation: network call to the translation capability, with fallback.
//!
//! A failed translation must never abort the pipeline — the user would
//! rather hear the document in its original language than get an error.
//! The only entry point the orchestrator uses is
//! [`translate_or_original`], which encodes that contract in its return
//! type: a plain `String`, never a `Result`.

use crate::error::Doc2SpeechError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// A machine-translation capability.
///
/// `source` and `target` are ISO 639-1 codes. Implementations may fail
/// freely — the fallback wrapper absorbs every error.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, Doc2SpeechError>;
}

/// Translate `text`, returning it unchanged if the backend fails.
///
/// The failure (network, quota, timeout, malformed response) is logged and
/// otherwise invisible to the caller; the returned bool records whether the
/// fallback was taken so the run stats can report it.
pub async fn translate_or_original(
    backend: &dyn TranslationBackend,
    text: &str,
    source: &str,
    target: &str,
) -> (String, bool) {
    match backend.translate(text, source, target).await {
        Ok(translated) => {
            debug!("Translated {} chars → {} chars", text.len(), translated.len());
            (translated, false)
        }
        Err(e) => {
            warn!("Translation error, continuing with original text: {}", e);
            (text.to_string(), true)
        }
    }
}

/// Translation backend using the public Google Translate web endpoint.
///
/// The same unauthenticated `translate_a/single` endpoint the `googletrans`
/// ecosystem drives: `client=gtx`, `dt=t` returns a nested JSON array whose
/// first element lists translated segments.
pub struct GoogleTranslate {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslate {
    const ENDPOINT: &'static str = "https://translate.googleapis.com/translate_a/single";

    /// Build a backend with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, Doc2SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Doc2SpeechError::TranslationFailed {
                detail: format!("HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: Self::ENDPOINT.to_string(),
        })
    }

    /// Point the backend at a different endpoint (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Join the translated segments out of the response's nested arrays.
    fn parse_response(body: &str) -> Result<String, Doc2SpeechError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| Doc2SpeechError::TranslationFailed {
                detail: format!("malformed response: {e}"),
            })?;

        let segments = value
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| Doc2SpeechError::TranslationFailed {
                detail: "unexpected response shape".into(),
            })?;

        let translated: String = segments
            .iter()
            .filter_map(|seg| seg.get(0).and_then(Value::as_str))
            .collect();

        if translated.is_empty() {
            return Err(Doc2SpeechError::TranslationFailed {
                detail: "empty translation".into(),
            });
        }
        Ok(translated)
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslate {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, Doc2SpeechError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| Doc2SpeechError::TranslationFailed {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Doc2SpeechError::TranslationFailed {
                detail: format!("HTTP {}", response.status()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Doc2SpeechError::TranslationFailed {
                detail: e.to_string(),
            })?;

        Self::parse_response(&body)
    }
}
