//! Text acquisition: embedded PDF text with OCR fallback, or direct image OCR.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the whole extraction —
//! pdfium iteration, rasterisation, and the synchronous OCR engine — onto a
//! thread designed for blocking work.
//!
//! ## Why does extraction never fail?
//!
//! Extraction is best-effort by contract: a corrupt PDF, an unreadable
//! image, or a crashed OCR engine all degrade to an empty string, which the
//! orchestrator then reports as the single user-visible "No text extracted"
//! condition. The original cause is logged here, not propagated.

use crate::config::PipelineConfig;
use crate::pipeline::ocr::{self, OcrEngine};
use crate::storage::{SourceDocument, SourceKind};
use crate::text::normalize;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extract normalized text from a PDF or image document.
///
/// Never fails: every internal error degrades to an empty result. An empty
/// or whitespace-only return value is the distinguished "no text found"
/// state the orchestrator checks for.
pub async fn extract_text(
    document: &SourceDocument,
    engine: Arc<dyn OcrEngine>,
    config: &PipelineConfig,
) -> String {
    let path = document.path().to_path_buf();
    let kind = document.kind();
    let lang = config.ocr_lang.clone();
    let max_pixels = config.max_rendered_pixels;

    let raw = tokio::task::spawn_blocking(move || match kind {
        SourceKind::Pdf => extract_pdf_blocking(&path, engine.as_ref(), &lang, max_pixels),
        SourceKind::Image => extract_image_blocking(&path, engine.as_ref(), &lang),
    })
    .await
    .unwrap_or_else(|e| {
        warn!("Extraction task panicked, degrading to empty text: {}", e);
        String::new()
    });

    let text = normalize(&raw);
    info!("Extraction produced {} chars", text.len());
    text
}

/// Fold per-page embedded text into one string, firing OCR while the
/// cumulative result is still blank.
///
/// The trigger is deliberately the *cumulative* text across all pages
/// processed so far, not a per-page emptiness check: once any page has
/// contributed text, later blank pages are not OCRed, but several leading
/// blank pages each get an OCR pass even if one of them already failed to
/// produce anything. This mirrors the long-observed behaviour of the
/// deployment and is kept as-is despite looking like an accident of control
/// flow. Do not "simplify" it to a per-page check.
fn accumulate_page_text<F>(embedded: Vec<String>, mut ocr_page: F) -> String
where
    F: FnMut(usize) -> String,
{
    let mut text = String::new();
    for (idx, page_text) in embedded.into_iter().enumerate() {
        text.push_str(&page_text);
        text.push(' ');
        if text.trim().is_empty() {
            debug!("Cumulative text blank after page {}, trying OCR", idx + 1);
            text.push_str(&ocr_page(idx));
            text.push(' ');
        }
    }
    text
}

/// Blocking PDF branch: embedded text per page plus cumulative-blankness OCR.
fn extract_pdf_blocking(
    pdf_path: &Path,
    engine: &dyn OcrEngine,
    lang: &str,
    max_pixels: u32,
) -> String {
    let pdfium = Pdfium::default();

    let document = match pdfium.load_pdf_from_file(pdf_path, None) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Error processing PDF {}: {:?}", pdf_path.display(), e);
            return String::new();
        }
    };

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    // Embedded text never depends on OCR output, so it can be gathered in a
    // first pass; pages are only re-fetched for rasterisation when the
    // cumulative rule fires.
    let embedded: Vec<String> = pages
        .iter()
        .enumerate()
        .map(|(idx, page)| match page.text() {
            Ok(text) => text.all(),
            Err(e) => {
                warn!("No text layer on page {}: {:?}", idx + 1, e);
                String::new()
            }
        })
        .collect();

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    accumulate_page_text(embedded, |idx| {
        match render_page(&pages, idx, &render_config) {
            Some(image) => ocr::recognize(engine, &image, lang),
            None => String::new(),
        }
    })
}

/// Rasterise one page, degrading failure to `None`.
fn render_page(
    pages: &PdfPages<'_>,
    idx: usize,
    render_config: &PdfRenderConfig,
) -> Option<DynamicImage> {
    let page = pages
        .get(idx as u16)
        .map_err(|e| warn!("Failed to re-open page {} for OCR: {:?}", idx + 1, e))
        .ok()?;
    let bitmap = page
        .render_with_config(render_config)
        .map_err(|e| warn!("Rasterisation failed for page {}: {:?}", idx + 1, e))
        .ok()?;
    let image = bitmap.as_image();
    debug!("Rendered page {} → {}x{} px", idx + 1, image.width(), image.height());
    Some(image)
}

/// Blocking image branch: load the file and OCR it directly.
fn extract_image_blocking(path: &Path, engine: &dyn OcrEngine, lang: &str) -> String {
    match image::open(path) {
        Ok(image) => ocr::recognize(engine, &image, lang),
        Err(e) => {
            warn!("Error processing image {}: {}", path.display(), e);
            String::new()
        }
    }
}
