//! Pipeline stages for document-to-speech conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap a
//! capability backend (OCR engine, translation service, speech service)
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ translate ──▶ synth
//! (pdfium+OCR)  (fallback)   (audio file)
//! ```
//!
//! 1. [`extract`]   — pull text out of a PDF's embedded layer or an image,
//!    falling back to OCR while the cumulative text is still blank; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`ocr`]       — mandatory grayscale + half-downscale preprocessing in
//!    front of a pluggable recognition engine
//! 3. [`translate`] — network call to the translation capability; degrades
//!    to the original text on any failure
//! 4. [`synth`]     — network call to the speech capability; writes the
//!    audio artifact under a collision-free name
//!
//! The degradation contracts differ per stage and are deliberate: extraction
//! and translation never fail (they fall back to `""` / the original text),
//! while synthesis failure is terminal for the request.

pub mod extract;
pub mod ocr;
pub mod synth;
pub mod translate;
