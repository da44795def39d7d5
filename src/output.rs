//! Output types: the audio artifact, run statistics, and the response
//! envelope handed to the web layer.

use crate::error::Doc2SpeechError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A generated audio file in storage.
///
/// Owned by the pipeline until served for download; referenced by its
/// opaque `file_name`, never by raw bytes. Artifacts are not cleaned up
/// after being served — the deployment has no retention policy, a known
/// lifecycle gap left as-is rather than inventing unverified semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Collision-free file name (`audio_<uuid>.mp3`), the public reference.
    pub file_name: String,
    /// Absolute or storage-relative path to the file on disk.
    pub path: PathBuf,
}

impl AudioArtifact {
    /// The download route the web layer serves this artifact under.
    pub fn download_url(&self) -> String {
        format!("/download/{}", self.file_name)
    }
}

/// Statistics for a single pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Length in bytes of the normalized text the extractor produced.
    pub chars_extracted: usize,
    /// Whether translation failed and the original-language text was used.
    pub translation_fell_back: bool,
    /// Wall-clock milliseconds spent extracting text.
    pub extract_duration_ms: u64,
    /// Wall-clock milliseconds spent translating.
    pub translate_duration_ms: u64,
    /// Wall-clock milliseconds spent synthesizing and writing audio.
    pub synth_duration_ms: u64,
    /// End-to-end milliseconds including cleanup.
    pub total_duration_ms: u64,
}

/// Successful result of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// The generated audio artifact.
    pub audio: AudioArtifact,
    /// Human-readable status message.
    pub message: String,
    /// Per-stage timings and counters.
    pub stats: PipelineStats,
}

/// The boundary contract exposed to the (external) web layer.
///
/// Serialises to `{"status": "success", "audio": "...", "message": "..."}`
/// or `{"status": "error", "message": "..."}`, mirroring what the upload
/// view renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineResponse {
    Success {
        /// Opaque audio reference, resolvable via `Storage::resolve_audio`.
        audio: String,
        /// Download route for the artifact.
        audio_url: String,
        message: String,
    },
    Error {
        message: String,
    },
}

impl PipelineResponse {
    /// Map a run result to the envelope the web layer returns.
    pub fn from_result(result: &Result<PipelineOutput, Doc2SpeechError>) -> Self {
        match result {
            Ok(output) => PipelineResponse::Success {
                audio: output.audio.file_name.clone(),
                audio_url: output.audio.download_url(),
                message: output.message.clone(),
            },
            Err(e) => PipelineResponse::Error {
                message: e.to_string(),
            },
        }
    }
}
