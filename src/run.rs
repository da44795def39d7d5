//! Pipeline orchestration: extract → translate → synthesize, with the
//! hard source-cleanup guarantee.
//!
//! ## Exit paths
//!
//! ```text
//! RECEIVED ─▶ EXTRACTING ─▶ EmptyText (terminal, error)
//!                        ─▶ TRANSLATING ─▶ SYNTHESIZING ─▶ SynthesisFailed (terminal, error)
//!                                                       ─▶ done (terminal, success)
//! ```
//!
//! Whatever happens — success, a terminal error, or a panic somewhere in a
//! stage — the uploaded source document is removed from storage before
//! [`run`] returns. The panic case is why the stage future runs under
//! `catch_unwind`: in this pipeline a leaked upload is a defect, not a
//! tolerable edge case.

use crate::config::PipelineConfig;
use crate::error::Doc2SpeechError;
use crate::output::{PipelineOutput, PipelineStats};
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use crate::pipeline::synth::{GoogleSpeech, SpeechBackend};
use crate::pipeline::translate::{GoogleTranslate, TranslationBackend};
use crate::pipeline::{extract, synth, translate};
use crate::storage::{SourceDocument, Storage};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Run the full document-to-speech pipeline on a staged document.
///
/// This is the primary entry point for the library. The pipeline takes
/// ownership of the document's file: it is deleted before this function
/// returns, on every exit path.
///
/// # Errors
/// - [`Doc2SpeechError::EmptyText`] — no text could be extracted
/// - [`Doc2SpeechError::SynthesisFailed`] — the speech capability failed
/// - [`Doc2SpeechError::Internal`] — a stage panicked; message surfaced,
///   detail logged
///
/// Extraction and translation failures never surface here: they degrade to
/// empty text and original-language text respectively.
pub async fn run(
    document: SourceDocument,
    config: &PipelineConfig,
) -> Result<PipelineOutput, Doc2SpeechError> {
    let total_start = Instant::now();
    let source_path = document.path().to_path_buf();
    info!("Starting pipeline for {}", source_path.display());

    let storage = match Storage::new(&config.storage_dir) {
        Ok(s) => s,
        Err(e) => {
            // Even a failed start must not leak the upload.
            let _ = std::fs::remove_file(&source_path);
            return Err(e);
        }
    };

    let outcome = AssertUnwindSafe(run_stages(document, &storage, config))
        .catch_unwind()
        .await;

    // Hard cleanup guarantee: the uploaded document never outlives its run.
    storage.remove(&source_path);

    let mut result = match outcome {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "pipeline stage panicked".to_string());
            error!("Unexpected pipeline failure: {}", detail);
            Err(Doc2SpeechError::Internal(detail))
        }
    };

    if let Ok(output) = result.as_mut() {
        output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        info!(
            "Pipeline complete: {} ({}ms)",
            output.audio.file_name, output.stats.total_duration_ms
        );
    }
    result
}

/// Stage an uploaded file into storage and run the pipeline on it.
///
/// Convenience wrapper for callers holding raw upload bytes (the web
/// layer). `original_name` contributes only the extension; the staged copy
/// gets a collision-free name and is cleaned up by [`run`] as usual.
pub async fn run_upload(
    original_name: &str,
    bytes: &[u8],
    config: &PipelineConfig,
) -> Result<PipelineOutput, Doc2SpeechError> {
    let storage = Storage::new(&config.storage_dir)?;
    let document = storage.ingest(original_name, bytes, config.max_upload_bytes)?;
    run(document, config).await
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(
    document: SourceDocument,
    config: &PipelineConfig,
) -> Result<PipelineOutput, Doc2SpeechError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2SpeechError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(run(document, config))
}

/// The strictly sequential stage chain. Cleanup is handled by [`run`].
async fn run_stages(
    document: SourceDocument,
    storage: &Storage,
    config: &PipelineConfig,
) -> Result<PipelineOutput, Doc2SpeechError> {
    // ── Step 1: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let text = extract::extract_text(&document, resolve_ocr(config), config).await;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    if text.is_empty() {
        return Err(Doc2SpeechError::EmptyText);
    }
    info!("Extracted {} chars in {}ms", text.len(), extract_duration_ms);

    // ── Step 2: Translate (degrading) ────────────────────────────────────
    let translator = resolve_translator(config)?;
    let translate_start = Instant::now();
    let (translated, translation_fell_back) = translate::translate_or_original(
        translator.as_ref(),
        &text,
        &config.source_lang,
        &config.target_lang,
    )
    .await;
    let translate_duration_ms = translate_start.elapsed().as_millis() as u64;

    // ── Step 3: Synthesize speech ────────────────────────────────────────
    let synthesizer = resolve_synthesizer(config)?;
    let synth_start = Instant::now();
    let audio = synth::synthesize_to_file(
        synthesizer.as_ref(),
        storage,
        &translated,
        &config.target_lang,
    )
    .await?;
    let synth_duration_ms = synth_start.elapsed().as_millis() as u64;

    Ok(PipelineOutput {
        audio,
        message: "Audio generated successfully".to_string(),
        stats: PipelineStats {
            chars_extracted: text.len(),
            translation_fell_back,
            extract_duration_ms,
            translate_duration_ms,
            synth_duration_ms,
            total_duration_ms: 0, // filled in by `run`
        },
    })
}

// ── Backend resolution ───────────────────────────────────────────────────

fn resolve_ocr(config: &PipelineConfig) -> Arc<dyn OcrEngine> {
    config
        .ocr
        .clone()
        .unwrap_or_else(|| Arc::new(TesseractOcr::new()))
}

fn resolve_translator(
    config: &PipelineConfig,
) -> Result<Arc<dyn TranslationBackend>, Doc2SpeechError> {
    if let Some(ref backend) = config.translator {
        return Ok(Arc::clone(backend));
    }
    let backend = GoogleTranslate::new(Duration::from_secs(config.translate_timeout_secs))
        .map_err(|e| Doc2SpeechError::Internal(e.to_string()))?;
    Ok(Arc::new(backend))
}

fn resolve_synthesizer(
    config: &PipelineConfig,
) -> Result<Arc<dyn SpeechBackend>, Doc2SpeechError> {
    if let Some(ref backend) = config.synthesizer {
        return Ok(Arc::clone(backend));
    }
    let backend = GoogleSpeech::new(Duration::from_secs(config.synth_timeout_secs))
        .map_err(|e| Doc2SpeechError::Internal(e.to_string()))?;
    Ok(Arc::new(backend))
}
