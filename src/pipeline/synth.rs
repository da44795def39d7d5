//! Speech synthesis: translated text to an MP3 artifact on disk.
//!
//! Unlike extraction and translation, synthesis failure is terminal for the
//! request: there is no audio to fall back to. The orchestrator surfaces
//! [`Doc2SpeechError::SynthesisFailed`] to the user and does not retry.

use crate::error::Doc2SpeechError;
use crate::output::AudioArtifact;
use crate::storage::Storage;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// A text-to-speech capability producing encoded audio bytes.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize speech for `text` in language `lang`, returning MP3 bytes.
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, Doc2SpeechError>;
}

/// Synthesize `text` and write it to storage under a collision-free name.
///
/// Empty text is rejected up front — the backend would either error
/// confusingly or return a silent clip. The artifact keeps the
/// `audio_<uuid>.mp3` naming scheme so references stay opaque and
/// collision-free across concurrent requests.
pub async fn synthesize_to_file(
    backend: &dyn SpeechBackend,
    storage: &Storage,
    text: &str,
    lang: &str,
) -> Result<AudioArtifact, Doc2SpeechError> {
    if text.trim().is_empty() {
        return Err(Doc2SpeechError::SynthesisFailed {
            detail: "nothing to synthesize".into(),
        });
    }

    let bytes = backend.synthesize(text, lang).await?;
    if bytes.is_empty() {
        return Err(Doc2SpeechError::SynthesisFailed {
            detail: "backend returned no audio".into(),
        });
    }

    let file_name = storage.unique_name("audio", "mp3");
    let path = storage.root().join(&file_name);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| Doc2SpeechError::SynthesisFailed {
            detail: format!("writing {}: {e}", path.display()),
        })?;

    info!("Wrote {} bytes of audio to {}", bytes.len(), path.display());
    Ok(AudioArtifact { file_name, path })
}

/// Speech backend using the public Google Translate TTS web endpoint.
///
/// The endpoint caps the `q` parameter at roughly 200 characters, so longer
/// text is split at whitespace into bounded chunks, fetched sequentially,
/// and the MP3 payloads concatenated — MPEG audio frames are
/// self-delimiting, so naive concatenation plays back correctly.
pub struct GoogleSpeech {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleSpeech {
    const ENDPOINT: &'static str = "https://translate.google.com/translate_tts";

    /// Maximum characters per TTS request.
    const CHUNK_CHARS: usize = 200;

    /// Build a backend with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, Doc2SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Doc2SpeechError::SynthesisFailed {
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

    /// Split text into whitespace-aligned chunks of at most `max_chars`
    /// characters. A single word longer than the cap becomes its own chunk
    /// rather than being split mid-word.
    fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            if !current.is_empty()
                && current.chars().count() + 1 + word.chars().count() > max_chars
            {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    async fn fetch_chunk(&self, text: &str, lang: &str) -> Result<Vec<u8>, Doc2SpeechError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| Doc2SpeechError::SynthesisFailed {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Doc2SpeechError::SynthesisFailed {
                detail: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Doc2SpeechError::SynthesisFailed {
                detail: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechBackend for GoogleSpeech {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, Doc2SpeechError> {
        let chunks = Self::chunk_text(text, Self::CHUNK_CHARS);
        debug!("Synthesizing {} chars in {} chunk(s)", text.len(), chunks.len());

        let mut audio = Vec::new();
        for chunk in &chunks {
            audio.extend(self.fetch_chunk(chunk, lang).await?);
        }
        Ok(audio)
    }
}
