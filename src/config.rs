//! Configuration for a document-to-speech pipeline run.
//!
//! Everything a run depends on — the storage directory, the language pair,
//! size limits, timeouts, and the capability backends — lives in one
//! [`PipelineConfig`] built via its [`PipelineConfigBuilder`]. Keeping the
//! configuration an explicit value (rather than process-wide state) lets
//! every test run against its own temporary directory and its own mock
//! backends.
//!
//! # Design choice: builder over constructor
//! A constructor taking a dozen positional fields is unreadable and breaks
//! on every new field. The builder lets callers set only what they care
//! about and rely on documented defaults for the rest.

use crate::error::Doc2SpeechError;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::synth::SpeechBackend;
use crate::pipeline::translate::TranslationBackend;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the extraction → translation → synthesis pipeline.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2speech::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .storage_dir("uploads")
///     .source_lang("en")
///     .target_lang("te")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Directory for staged uploads and generated audio. Default: `uploads`.
    ///
    /// Created on first use. Shared between concurrent runs; all names in it
    /// are allocated through [`crate::storage::Storage::unique_name`] so runs
    /// never collide.
    pub storage_dir: PathBuf,

    /// Language the document text is assumed to be in. Default: `"en"`.
    pub source_lang: String,

    /// Language to translate into and synthesize speech for. Default: `"te"`.
    pub target_lang: String,

    /// Tesseract language code used for OCR. Default: `"eng"`.
    ///
    /// Kept separate from `source_lang` because OCR engines use their own
    /// three-letter codes (`eng`, `tel`, `deu`, …).
    pub ocr_lang: String,

    /// Maximum accepted upload size in bytes. Default: 30 MiB.
    pub max_upload_bytes: u64,

    /// Longest-edge cap in pixels when rasterising a PDF page for OCR.
    /// Default: 2000.
    ///
    /// A safety cap independent of page size: an A0 poster page could
    /// otherwise rasterise to a pixel buffer of several hundred megabytes.
    /// The preprocessing halving in the OCR stage applies on top of this.
    pub max_rendered_pixels: u32,

    /// Timeout for a translation request in seconds. Default: 30.
    ///
    /// On timeout the translation stage degrades to the original text, the
    /// same as any other translation failure.
    pub translate_timeout_secs: u64,

    /// Timeout for a speech-synthesis request in seconds. Default: 60.
    ///
    /// On timeout synthesis fails terminally for the request — same as any
    /// other synthesis failure; there is no retry.
    pub synth_timeout_secs: u64,

    /// OCR engine override. Default: `None` (tesseract CLI).
    pub ocr: Option<Arc<dyn OcrEngine>>,

    /// Translation backend override. Default: `None` (Google Translate web
    /// endpoint).
    pub translator: Option<Arc<dyn TranslationBackend>>,

    /// Speech-synthesis backend override. Default: `None` (Google TTS web
    /// endpoint).
    pub synthesizer: Option<Arc<dyn SpeechBackend>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("uploads"),
            source_lang: "en".to_string(),
            target_lang: "te".to_string(),
            ocr_lang: "eng".to_string(),
            max_upload_bytes: 30 * 1024 * 1024,
            max_rendered_pixels: 2000,
            translate_timeout_secs: 30,
            synth_timeout_secs: 60,
            ocr: None,
            translator: None,
            synthesizer: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("storage_dir", &self.storage_dir)
            .field("source_lang", &self.source_lang)
            .field("target_lang", &self.target_lang)
            .field("ocr_lang", &self.ocr_lang)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("translate_timeout_secs", &self.translate_timeout_secs)
            .field("synth_timeout_secs", &self.synth_timeout_secs)
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn OcrEngine>"))
            .field("translator", &self.translator.as_ref().map(|_| "<dyn TranslationBackend>"))
            .field("synthesizer", &self.synthesizer.as_ref().map(|_| "<dyn SpeechBackend>"))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = dir.into();
        self
    }

    pub fn source_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.source_lang = lang.into();
        self
    }

    pub fn target_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.target_lang = lang.into();
        self
    }

    pub fn ocr_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_lang = lang.into();
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn translate_timeout_secs(mut self, secs: u64) -> Self {
        self.config.translate_timeout_secs = secs;
        self
    }

    pub fn synth_timeout_secs(mut self, secs: u64) -> Self {
        self.config.synth_timeout_secs = secs;
        self
    }

    pub fn ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr = Some(engine);
        self
    }

    pub fn translator(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.config.translator = Some(backend);
        self
    }

    pub fn synthesizer(mut self, backend: Arc<dyn SpeechBackend>) -> Self {
        self.config.synthesizer = Some(backend);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Doc2SpeechError> {
        let c = &self.config;
        if c.source_lang.is_empty() || c.target_lang.is_empty() {
            return Err(Doc2SpeechError::InvalidConfig(
                "Source and target languages must be non-empty".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(Doc2SpeechError::InvalidConfig(
                "Upload size limit must be ≥ 1 byte".into(),
            ));
        }
        if c.translate_timeout_secs == 0 || c.synth_timeout_secs == 0 {
            return Err(Doc2SpeechError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let c = PipelineConfig::default();
        assert_eq!(c.source_lang, "en");
        assert_eq!(c.target_lang, "te");
        assert_eq!(c.max_upload_bytes, 30 * 1024 * 1024);
    }

    #[test]
    fn builder_rejects_empty_language() {
        let err = PipelineConfig::builder().target_lang("").build().unwrap_err();
        assert!(matches!(err, Doc2SpeechError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = PipelineConfig::builder()
            .translate_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Doc2SpeechError::InvalidConfig(_)));
    }
}
