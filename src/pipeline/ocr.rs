//! OCR fallback: preprocessing plus a pluggable recognition engine.
//!
//! ## Why preprocess at all?
//!
//! Recognition runs on rasterised PDF pages and phone-camera uploads alike.
//! Converting to single-channel grayscale strips colour noise the engine
//! would otherwise have to model, and halving both dimensions cuts
//! recognition time roughly 4× at a small accuracy cost. The halving is a
//! fixed speed/accuracy trade-off of this pipeline, not a knob.
//!
//! ## The engine seam
//!
//! [`OcrEngine`] is the black-box capability boundary. The default
//! [`TesseractOcr`] shells out to the `tesseract` CLI; tests inject
//! in-memory fakes. Engines are synchronous because every call site already
//! runs inside `spawn_blocking` (pdfium lives there too) and the tesseract
//! process call is blocking anyway.

use crate::error::Doc2SpeechError;
use image::DynamicImage;
use image::imageops::FilterType;
use std::io::Write;
use std::process::Command;
use tracing::{debug, warn};

/// A text-recognition engine operating on a preprocessed page image.
///
/// Implementations may fail however they like; the pipeline never lets an
/// engine error escape [`recognize`].
pub trait OcrEngine: Send + Sync {
    /// Recognise text in `image`. `lang` is an engine-specific language code.
    fn recognize(&self, image: &DynamicImage, lang: &str) -> Result<String, Doc2SpeechError>;
}

/// Grayscale + exact half-downscale, the fixed preprocessing step.
///
/// Dimensions floor-divide by two with a 1 px minimum so degenerate inputs
/// (1×1 images) stay valid.
pub fn preprocess(image: &DynamicImage) -> DynamicImage {
    let w = (image.width() / 2).max(1);
    let h = (image.height() / 2).max(1);
    // to_luma8 rather than grayscale(): the latter keeps an alpha channel
    // for RGBA inputs, and engines want a true single-channel image.
    DynamicImage::ImageLuma8(image.to_luma8()).resize_exact(w, h, FilterType::Triangle)
}

/// Run OCR on `image`, degrading every failure to an empty string.
///
/// This is the only entry point the extraction stage uses: preprocessing is
/// mandatory and engine errors are logged here, never propagated.
pub fn recognize(engine: &dyn OcrEngine, image: &DynamicImage, lang: &str) -> String {
    let prepared = preprocess(image);
    match engine.recognize(&prepared, lang) {
        Ok(text) => {
            debug!("OCR produced {} chars", text.len());
            text
        }
        Err(e) => {
            warn!("OCR failed, degrading to empty text: {}", e);
            String::new()
        }
    }
}

/// OCR engine driving the `tesseract` command-line tool.
///
/// The image is written to a scratch PNG in a temp directory and read back
/// from tesseract's stdout. Requires `tesseract` on `$PATH` (plus the
/// language data for the configured `ocr_lang`).
#[derive(Debug, Default)]
pub struct TesseractOcr;

impl TesseractOcr {
    pub fn new() -> Self {
        Self
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage, lang: &str) -> Result<String, Doc2SpeechError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("doc2speech-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| Doc2SpeechError::OcrFailed {
                detail: format!("scratch file: {e}"),
            })?;

        let mut png = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| Doc2SpeechError::OcrFailed {
                detail: format!("PNG encode: {e}"),
            })?;
        scratch
            .write_all(&png)
            .map_err(|e| Doc2SpeechError::OcrFailed {
                detail: format!("scratch write: {e}"),
            })?;

        let output = Command::new("tesseract")
            .arg(scratch.path())
            .arg("stdout")
            .args(["-l", lang])
            .output()
            .map_err(|e| Doc2SpeechError::OcrFailed {
                detail: format!("failed to launch tesseract: {e}"),
            })?;

        if !output.status.success() {
            return Err(Doc2SpeechError::OcrFailed {
                detail: format!(
                    "tesseract exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    struct FixedText(&'static str);

    impl OcrEngine for FixedText {
        fn recognize(&self, _image: &DynamicImage, _lang: &str) -> Result<String, Doc2SpeechError> {
            Ok(self.0.to_string())
        }
    }

    struct AlwaysFails;

    impl OcrEngine for AlwaysFails {
        fn recognize(&self, _image: &DynamicImage, _lang: &str) -> Result<String, Doc2SpeechError> {
            Err(Doc2SpeechError::OcrFailed {
                detail: "simulated engine crash".into(),
            })
        }
    }

    fn white_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn preprocess_halves_both_dimensions() {
        let out = preprocess(&white_image(640, 480));
        assert_eq!((out.width(), out.height()), (320, 240));
    }

    #[test]
    fn preprocess_floors_odd_dimensions() {
        let out = preprocess(&white_image(641, 479));
        assert_eq!((out.width(), out.height()), (320, 239));
    }

    #[test]
    fn preprocess_keeps_degenerate_images_valid() {
        let out = preprocess(&white_image(1, 1));
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn preprocess_produces_grayscale() {
        let out = preprocess(&white_image(8, 8));
        assert_eq!(out.color().channel_count(), 1);
    }

    #[test]
    fn recognize_passes_engine_text_through() {
        let text = recognize(&FixedText("HELLO WORLD"), &white_image(10, 10), "eng");
        assert_eq!(text, "HELLO WORLD");
    }

    #[test]
    fn recognize_degrades_engine_failure_to_empty() {
        let text = recognize(&AlwaysFails, &white_image(10, 10), "eng");
        assert_eq!(text, "");
    }
}
