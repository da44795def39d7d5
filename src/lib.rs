//! # doc2speech
//!
//! Convert a document (PDF or image) into spoken audio in a target language:
//! extract its text, translate it, and synthesize speech.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document (PDF / image)
//!  │
//!  ├─ 1. Extract    embedded PDF text via pdfium; OCR fallback while the
//!  │                cumulative text is still blank; image files go straight
//!  │                to OCR (grayscale + half-downscale first)
//!  ├─ 2. Normalize  collapse whitespace to single spaces
//!  ├─ 3. Translate  source → target language; falls back to the original
//!  │                text on any failure
//!  ├─ 4. Synthesize MP3 written under a collision-free audio_<uuid>.mp3
//!  └─ 5. Cleanup    the uploaded document is deleted on every exit path
//! ```
//!
//! The OCR engine, translation service, and speech service are capability
//! traits ([`OcrEngine`], [`TranslationBackend`], [`SpeechBackend`]) with
//! network/CLI-backed defaults; tests and embedders can inject their own via
//! [`PipelineConfig`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2speech::{run, PipelineConfig, SourceDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .storage_dir("uploads")
//!         .source_lang("en")
//!         .target_lang("te")
//!         .build()?;
//!
//!     // The pipeline takes ownership of the file and deletes it when done;
//!     // stage a copy via Storage::ingest to keep the original.
//!     let document = SourceDocument::from_path("scan.pdf")?;
//!     let output = run(document, &config).await?;
//!     println!("audio at {}", output.audio.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `doc2speech` binary (clap + anyhow + tracing-subscriber) |
//! | `bundled` | on      | Embeds the pdfium shared library at compile time |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2speech = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod run;
pub mod storage;
pub mod text;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::Doc2SpeechError;
pub use output::{AudioArtifact, PipelineOutput, PipelineResponse, PipelineStats};
pub use pipeline::ocr::{OcrEngine, TesseractOcr};
pub use pipeline::synth::{GoogleSpeech, SpeechBackend};
pub use pipeline::translate::{GoogleTranslate, TranslationBackend};
pub use run::{run, run_sync, run_upload};
pub use storage::{SourceDocument, SourceKind, Storage};
pub use text::normalize;
