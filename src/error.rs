//! Error types for the doc2speech library.
//!
//! Only a subset of these variants ever reaches a user:
//!
//! * [`Doc2SpeechError::NoFileProvided`], [`Doc2SpeechError::EmptyText`],
//!   [`Doc2SpeechError::SynthesisFailed`], [`Doc2SpeechError::AudioNotFound`],
//!   [`Doc2SpeechError::UploadTooLarge`] and [`Doc2SpeechError::Internal`]
//!   terminate a pipeline run and are surfaced in the result.
//!
//! * [`Doc2SpeechError::OcrFailed`] and [`Doc2SpeechError::TranslationFailed`]
//!   exist only as the error type of the capability traits. Both stages
//!   degrade on failure — OCR to an empty string, translation to the
//!   original-language text — so these variants are logged at the stage
//!   boundary and never propagate past it.
//!
//! Keeping the degraded variants in the same enum (rather than giving each
//! capability its own error type) lets mock backends in tests construct
//! failures without extra conversion plumbing.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the doc2speech library.
#[derive(Debug, Error)]
pub enum Doc2SpeechError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The caller submitted a request without a file.
    #[error("No file uploaded")]
    NoFileProvided,

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Upload exceeds the configured size limit.
    #[error("Upload of {size} bytes exceeds the {limit}-byte limit")]
    UploadTooLarge { size: u64, limit: u64 },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// Extraction produced no text (unreadable document, blank pages, or
    /// OCR found nothing). Terminal for the request.
    #[error("No text extracted")]
    EmptyText,

    /// The OCR engine failed on an image. Consumed by the extraction stage,
    /// which degrades to an empty string; never user-visible.
    #[error("OCR failed: {detail}")]
    OcrFailed { detail: String },

    /// The translation capability failed. Consumed by the translation stage,
    /// which falls back to the original-language text; never user-visible.
    #[error("Translation failed: {detail}")]
    TranslationFailed { detail: String },

    /// Speech synthesis failed (empty text, unsupported language, network or
    /// I/O error). Terminal for the request — not retried.
    #[error("Failed to generate audio: {detail}")]
    SynthesisFailed { detail: String },

    // ── Retrieval errors ──────────────────────────────────────────────────
    /// The requested audio reference does not resolve to an existing file.
    #[error("Audio file not found: '{name}'")]
    AudioNotFound { name: String },

    /// The audio reference contains path separators or parent components.
    #[error("Invalid audio file name: '{name}'")]
    InvalidAudioName { name: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A storage operation (create dir, write upload, write audio) failed.
    #[error("Storage operation failed for '{path}': {source}")]
    StorageFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (including caught panics in the pipeline).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Doc2SpeechError {
    /// Whether this error may be shown to the end user verbatim.
    ///
    /// Degraded-stage variants are excluded: by the time a run finishes they
    /// have already been replaced by a fallback value, so encountering one
    /// here would indicate a plumbing bug.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            Doc2SpeechError::OcrFailed { .. } | Doc2SpeechError::TranslationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_display() {
        assert_eq!(Doc2SpeechError::EmptyText.to_string(), "No text extracted");
    }

    #[test]
    fn synthesis_failed_display() {
        let e = Doc2SpeechError::SynthesisFailed {
            detail: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Failed to generate audio"), "got: {msg}");
        assert!(msg.contains("HTTP 503"));
    }

    #[test]
    fn upload_too_large_display() {
        let e = Doc2SpeechError::UploadTooLarge {
            size: 40_000_000,
            limit: 31_457_280,
        };
        assert!(e.to_string().contains("40000000"));
    }

    #[test]
    fn degraded_variants_are_not_user_visible() {
        assert!(!Doc2SpeechError::OcrFailed { detail: "x".into() }.is_user_visible());
        assert!(!Doc2SpeechError::TranslationFailed { detail: "x".into() }.is_user_visible());
        assert!(Doc2SpeechError::EmptyText.is_user_visible());
        assert!(Doc2SpeechError::NoFileProvided.is_user_visible());
    }
}
