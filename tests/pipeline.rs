//! End-to-end pipeline tests with mock capability backends.
//!
//! Every scenario runs against its own temporary storage directory and
//! injects in-memory OCR/translation/speech backends through
//! `PipelineConfig`, so no network, tesseract install, or pdfium library is
//! needed. The one test that exercises the real PDF branch is gated behind
//! the `E2E_ENABLED` environment variable, matching how slow external
//! dependencies are opted into elsewhere in the test suite.
//!
//! Run with:
//!   cargo test --test pipeline

use async_trait::async_trait;
use doc2speech::{
    run, run_upload, Doc2SpeechError, OcrEngine, PipelineConfig, PipelineResponse, SourceDocument,
    SpeechBackend, Storage, TranslationBackend,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// ── Mock backends ────────────────────────────────────────────────────────────

/// OCR engine returning a fixed string (empty string simulates a blank page).
struct StubOcr(&'static str);

impl OcrEngine for StubOcr {
    fn recognize(&self, _image: &DynamicImage, _lang: &str) -> Result<String, Doc2SpeechError> {
        Ok(self.0.to_string())
    }
}

/// Identity translator that counts invocations.
#[derive(Default)]
struct IdentityTranslator {
    calls: AtomicUsize,
}

#[async_trait]
impl TranslationBackend for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, Doc2SpeechError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.to_string())
    }
}

struct FailingTranslator;

#[async_trait]
impl TranslationBackend for FailingTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, Doc2SpeechError> {
        Err(Doc2SpeechError::TranslationFailed {
            detail: "simulated outage".into(),
        })
    }
}

struct PanickingTranslator;

#[async_trait]
impl TranslationBackend for PanickingTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, Doc2SpeechError> {
        panic!("translator blew up");
    }
}

struct StubSpeech;

#[async_trait]
impl SpeechBackend for StubSpeech {
    async fn synthesize(&self, _text: &str, _lang: &str) -> Result<Vec<u8>, Doc2SpeechError> {
        // A single MPEG frame header is plenty for an artifact-existence test.
        Ok(vec![0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00])
    }
}

struct FailingSpeech;

#[async_trait]
impl SpeechBackend for FailingSpeech {
    async fn synthesize(&self, _text: &str, _lang: &str) -> Result<Vec<u8>, Doc2SpeechError> {
        Err(Doc2SpeechError::SynthesisFailed {
            detail: "simulated TTS outage".into(),
        })
    }
}

// ── Test helpers ─────────────────────────────────────────────────────────────

fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        64,
        64,
        Rgba([255, 255, 255, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("PNG encode");
    buf
}

fn config_with(
    dir: &TempDir,
    ocr: &'static str,
    translator: Arc<dyn TranslationBackend>,
    speech: Arc<dyn SpeechBackend>,
) -> PipelineConfig {
    PipelineConfig::builder()
        .storage_dir(dir.path())
        .ocr(Arc::new(StubOcr(ocr)))
        .translator(translator)
        .synthesizer(speech)
        .build()
        .expect("valid config")
}

/// Stage an image upload and return its on-disk path for later existence checks.
fn stage_image(dir: &TempDir) -> SourceDocument {
    let storage = Storage::new(dir.path()).unwrap();
    storage
        .ingest("photo.png", &png_bytes(), 30 * 1024 * 1024)
        .unwrap()
}

fn assert_no_uploads_left(dir: &TempDir) {
    let leftover: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("upload_"))
        .collect();
    assert!(leftover.is_empty(), "uploads leaked: {leftover:?}");
}

// ── Scenario 1: image with visible text → success ───────────────────────────

#[tokio::test]
async fn image_with_text_produces_audio() {
    let dir = TempDir::new().unwrap();
    let translator = Arc::new(IdentityTranslator::default());
    let config = config_with(&dir, "HELLO WORLD", translator.clone(), Arc::new(StubSpeech));

    let document = stage_image(&dir);
    let upload_path = document.path().to_path_buf();

    let output = run(document, &config).await.expect("pipeline should succeed");

    assert_eq!(output.message, "Audio generated successfully");
    assert_eq!(output.stats.chars_extracted, "HELLO WORLD".len());
    assert!(!output.stats.translation_fell_back);
    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);

    // The artifact exists and resolves through the retrieval path.
    assert!(output.audio.path.is_file());
    let storage = Storage::new(dir.path()).unwrap();
    let resolved = storage.resolve_audio(&output.audio.file_name).unwrap();
    assert_eq!(resolved, output.audio.path);
    assert!(output.audio.download_url().ends_with(&output.audio.file_name));

    // The upload is gone.
    assert!(!upload_path.exists());
    assert_no_uploads_left(&dir);
}

// ── Scenario 2: blank image → EmptyText, upload removed ─────────────────────

#[tokio::test]
async fn blank_image_is_an_empty_text_error() {
    let dir = TempDir::new().unwrap();
    let config = config_with(
        &dir,
        "", // OCR finds nothing on a blank white image
        Arc::new(IdentityTranslator::default()),
        Arc::new(StubSpeech),
    );

    let document = stage_image(&dir);
    let upload_path = document.path().to_path_buf();

    let err = run(document, &config).await.unwrap_err();
    assert!(matches!(err, Doc2SpeechError::EmptyText));
    assert_eq!(err.to_string(), "No text extracted");

    assert!(!upload_path.exists());
    assert_no_uploads_left(&dir);
}

// ── Scenario 3: synthesis failure → terminal error, upload removed ──────────

#[tokio::test]
async fn synthesis_failure_is_terminal_and_still_cleans_up() {
    let dir = TempDir::new().unwrap();
    let config = config_with(
        &dir,
        "some text",
        Arc::new(IdentityTranslator::default()),
        Arc::new(FailingSpeech),
    );

    let document = stage_image(&dir);
    let upload_path = document.path().to_path_buf();

    let err = run(document, &config).await.unwrap_err();
    assert!(matches!(err, Doc2SpeechError::SynthesisFailed { .. }));

    assert!(!upload_path.exists());
    assert_no_uploads_left(&dir);
    // No audio artifact should have been produced either.
    let audio_files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("audio_"))
        .collect();
    assert!(audio_files.is_empty());
}

// ── Translation fallback is not an error ────────────────────────────────────

#[tokio::test]
async fn translation_failure_degrades_to_original_text() {
    let dir = TempDir::new().unwrap();
    let config = config_with(
        &dir,
        "hello",
        Arc::new(FailingTranslator),
        Arc::new(StubSpeech),
    );

    let document = stage_image(&dir);
    let output = run(document, &config)
        .await
        .expect("translation failure must not abort the pipeline");

    assert!(output.stats.translation_fell_back);
    assert!(output.audio.path.is_file());
    assert_no_uploads_left(&dir);
}

// ── A panicking stage surfaces as Internal and still cleans up ──────────────

#[tokio::test]
async fn stage_panic_is_caught_and_upload_still_removed() {
    let dir = TempDir::new().unwrap();
    let config = config_with(
        &dir,
        "hello",
        Arc::new(PanickingTranslator),
        Arc::new(StubSpeech),
    );

    let document = stage_image(&dir);
    let upload_path = document.path().to_path_buf();

    let err = run(document, &config).await.unwrap_err();
    assert!(matches!(err, Doc2SpeechError::Internal(_)));
    assert!(err.to_string().contains("translator blew up"));

    assert!(!upload_path.exists());
    assert_no_uploads_left(&dir);
}

// ── Concurrent runs never collide ───────────────────────────────────────────

#[tokio::test]
async fn concurrent_runs_produce_distinct_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = config_with(
        &dir,
        "parallel text",
        Arc::new(IdentityTranslator::default()),
        Arc::new(StubSpeech),
    );

    let mut handles = Vec::new();
    for _ in 0..16 {
        let config = config.clone();
        let document = stage_image(&dir);
        handles.push(tokio::spawn(async move { run(document, &config).await }));
    }

    let mut names = std::collections::HashSet::new();
    for handle in handles {
        let output = handle.await.unwrap().expect("run should succeed");
        assert!(
            names.insert(output.audio.file_name.clone()),
            "duplicate artifact name: {}",
            output.audio.file_name
        );
    }
    assert_eq!(names.len(), 16);
    assert_no_uploads_left(&dir);
}

// ── Upload boundary: run_upload + response envelope ─────────────────────────

#[tokio::test]
async fn run_upload_stages_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let config = config_with(
        &dir,
        "uploaded text",
        Arc::new(IdentityTranslator::default()),
        Arc::new(StubSpeech),
    );

    let result = run_upload("photo.png", &png_bytes(), &config).await;
    let envelope = PipelineResponse::from_result(&result);
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Audio generated successfully");
    assert!(json["audio_url"]
        .as_str()
        .unwrap()
        .starts_with("/download/audio_"));

    assert_no_uploads_left(&dir);
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_the_pipeline() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::builder()
        .storage_dir(dir.path())
        .max_upload_bytes(16)
        .ocr(Arc::new(StubOcr("unreached")))
        .translator(Arc::new(IdentityTranslator::default()))
        .synthesizer(Arc::new(StubSpeech))
        .build()
        .unwrap();

    let err = run_upload("photo.png", &png_bytes(), &config).await.unwrap_err();
    assert!(matches!(err, Doc2SpeechError::UploadTooLarge { .. }));
    assert_no_uploads_left(&dir);
}

// ── Real-PDF branch (opt-in: needs pdfium + a test file) ────────────────────

#[tokio::test]
async fn pdf_with_embedded_text_skips_ocr() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run pdfium-backed tests");
        return;
    }
    let pdf = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_cases/embedded_text.pdf");
    if !pdf.exists() {
        println!("SKIP — test file not found: {}", pdf.display());
        return;
    }

    struct NeverOcr;
    impl OcrEngine for NeverOcr {
        fn recognize(&self, _: &DynamicImage, _: &str) -> Result<String, Doc2SpeechError> {
            panic!("OCR must not run for a PDF with embedded text");
        }
    }

    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).unwrap();
    let bytes = std::fs::read(&pdf).unwrap();
    let document = storage.ingest("embedded_text.pdf", &bytes, 30 * 1024 * 1024).unwrap();

    let config = PipelineConfig::builder()
        .storage_dir(dir.path())
        .ocr(Arc::new(NeverOcr))
        .translator(Arc::new(IdentityTranslator::default()))
        .synthesizer(Arc::new(StubSpeech))
        .build()
        .unwrap();

    let output = run(document, &config).await.expect("pipeline should succeed");
    assert!(output.stats.chars_extracted > 0);
    assert_no_uploads_left(&dir);
}
