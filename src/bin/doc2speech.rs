//! CLI binary for doc2speech.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use doc2speech::{run_upload, PipelineConfig, PipelineResponse};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # English PDF to Telugu speech (default language pair)
  doc2speech scan.pdf

  # Image input, explicit language pair
  doc2speech --from en --to hi photo.png

  # Keep artifacts in a custom directory
  doc2speech --storage-dir /var/lib/doc2speech report.pdf

  # Machine-readable result
  doc2speech --json scan.pdf

REQUIREMENTS:
  tesseract        OCR fallback for scanned pages and image inputs
                   (install language data for --ocr-lang, e.g. tesseract-ocr-eng)
  network access   translation and speech synthesis use public web endpoints

ENVIRONMENT VARIABLES:
  DOC2SPEECH_STORAGE_DIR   Storage directory for uploads and audio
  PDFIUM_LIB_PATH          Path to an existing libpdfium — skips auto-download

The input file itself is never modified or deleted: a copy is staged into
the storage directory and that copy is cleaned up after the run. The
generated audio file stays in the storage directory until you delete it.
"#;

/// Convert PDF and image documents into spoken audio.
#[derive(Parser, Debug)]
#[command(
    name = "doc2speech",
    version,
    about = "Convert PDF and image documents into spoken audio",
    long_about = "Extract text from a PDF (embedded text layer, with OCR fallback for scanned \
pages) or an image, translate it, and synthesize speech into an MP3 file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to a PDF or image file.
    input: PathBuf,

    /// Directory for staged uploads and generated audio.
    #[arg(long, env = "DOC2SPEECH_STORAGE_DIR", default_value = "uploads")]
    storage_dir: PathBuf,

    /// Source language of the document (ISO 639-1).
    #[arg(long = "from", env = "DOC2SPEECH_SOURCE_LANG", default_value = "en")]
    source_lang: String,

    /// Target language for translation and speech (ISO 639-1).
    #[arg(long = "to", env = "DOC2SPEECH_TARGET_LANG", default_value = "te")]
    target_lang: String,

    /// Tesseract language code for OCR.
    #[arg(long, env = "DOC2SPEECH_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Translation request timeout in seconds.
    #[arg(long, env = "DOC2SPEECH_TRANSLATE_TIMEOUT", default_value_t = 30)]
    translate_timeout: u64,

    /// Speech-synthesis request timeout in seconds.
    #[arg(long, env = "DOC2SPEECH_SYNTH_TIMEOUT", default_value_t = 60)]
    synth_timeout: u64,

    /// Output the result envelope as JSON instead of human-readable text.
    #[arg(long, env = "DOC2SPEECH_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2SPEECH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2SPEECH_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ensure the pdfium engine is available ────────────────────────────
    // With `--features bundled` the shared library was embedded at compile
    // time and only needs extracting; otherwise the first run downloads it.
    #[cfg(feature = "bundled")]
    {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_bundled())
            .context("Failed to extract bundled PDFium engine")?;
    }

    #[cfg(not(feature = "bundled"))]
    if !pdfium_auto::is_pdfium_cached() {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
    }

    // ── Build config and run ─────────────────────────────────────────────
    let config = PipelineConfig::builder()
        .storage_dir(&cli.storage_dir)
        .source_lang(&cli.source_lang)
        .target_lang(&cli.target_lang)
        .ocr_lang(&cli.ocr_lang)
        .translate_timeout_secs(cli.translate_timeout)
        .synth_timeout_secs(cli.synth_timeout)
        .build()
        .context("Invalid configuration")?;

    let original_name = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.bin")
        .to_string();
    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    // Stage a copy: the pipeline deletes its input, and the user's own file
    // should survive the run.
    let result = run_upload(&original_name, &bytes, &config).await;

    if cli.json {
        let envelope = PipelineResponse::from_result(&result);
        let json = serde_json::to_string_pretty(&envelope).context("Failed to serialise result")?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        return match result {
            Ok(_) => Ok(()),
            Err(e) => Err(e.into()),
        };
    }

    let output = result.context("Pipeline failed")?;
    println!("{}", output.audio.path.display());
    if !cli.quiet {
        eprintln!(
            "✔ {}  ({} chars extracted, {}ms total{})",
            output.message,
            output.stats.chars_extracted,
            output.stats.total_duration_ms,
            if output.stats.translation_fell_back {
                ", translation fell back to source text"
            } else {
                ""
            },
        );
    }

    Ok(())
}
