//! Transient file storage for uploads and generated audio.
//!
//! ## Why unique names everywhere?
//!
//! The storage directory is the only mutable resource shared between
//! concurrent pipeline runs. Writing an upload under its client-provided
//! name would let two requests for `scan.pdf` clobber each other, so every
//! file — uploaded document and audio artifact alike — is written under a
//! name allocated by [`Storage::unique_name`]. A UUID v4 carries 122 random
//! bits, which makes a collision between concurrent requests negligible
//! without any cross-request coordination.
//!
//! [`Storage`] is an explicit value passed into the pipeline rather than
//! process-wide state, so tests can point each run at its own temporary
//! directory.

use crate::error::Doc2SpeechError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// The kind of a source document, decided by its file extension.
///
/// Anything that is not `.pdf` takes the image branch of the extractor;
/// unsupported formats simply fail OCR and degrade to empty text there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
}

impl SourceKind {
    /// Classify a path by extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => SourceKind::Pdf,
            _ => SourceKind::Image,
        }
    }
}

/// An uploaded document staged in storage, owned by a single pipeline run.
///
/// The document is removed unconditionally when the run finishes, on every
/// exit path — success, terminal error, or caught panic.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    kind: SourceKind,
}

impl SourceDocument {
    /// Wrap an existing file without copying it into storage.
    ///
    /// The pipeline takes ownership: the file at `path` will be deleted when
    /// the run completes. Callers that want to keep their file should stage
    /// a copy via [`Storage::ingest`] instead.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, Doc2SpeechError> {
        let path = path.into();
        if !path.is_file() {
            return Err(Doc2SpeechError::FileNotFound { path });
        }
        let kind = SourceKind::from_path(&path);
        Ok(Self { path, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

/// A directory holding transient uploads and generated audio files.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open (and create if needed) the storage directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Doc2SpeechError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| Doc2SpeechError::StorageFailed {
            path: root.clone(),
            source: e,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a collision-free file name `{prefix}_{uuid}.{ext}`.
    ///
    /// Shared by upload staging and audio synthesis so the no-collision
    /// guarantee holds uniformly across everything written to the directory.
    pub fn unique_name(&self, prefix: &str, ext: &str) -> String {
        format!("{prefix}_{}.{ext}", Uuid::new_v4())
    }

    /// Stage an uploaded file under a unique name, preserving its extension.
    ///
    /// The client-supplied `original_name` contributes only the extension
    /// (needed for [`SourceKind`] detection) — never the name itself, so a
    /// hostile or merely unlucky filename cannot escape the directory or
    /// collide with another request.
    pub fn ingest(
        &self,
        original_name: &str,
        bytes: &[u8],
        max_bytes: u64,
    ) -> Result<SourceDocument, Doc2SpeechError> {
        if original_name.is_empty() {
            return Err(Doc2SpeechError::NoFileProvided);
        }
        if bytes.len() as u64 > max_bytes {
            return Err(Doc2SpeechError::UploadTooLarge {
                size: bytes.len() as u64,
                limit: max_bytes,
            });
        }

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin");

        let path = self.root.join(self.unique_name("upload", &ext.to_ascii_lowercase()));
        std::fs::write(&path, bytes).map_err(|e| Doc2SpeechError::StorageFailed {
            path: path.clone(),
            source: e,
        })?;

        debug!("Staged upload '{}' as {}", original_name, path.display());
        let kind = SourceKind::from_path(&path);
        Ok(SourceDocument { path, kind })
    }

    /// Remove a file, logging (not propagating) any failure.
    ///
    /// Used by the end-of-run cleanup guarantee: by that point the run's
    /// outcome is already decided and a deletion error must not replace it.
    pub fn remove(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    /// Resolve an audio reference to a file path for download.
    ///
    /// Rejects references containing path separators or parent components so
    /// the web layer can pass client input straight through.
    pub fn resolve_audio(&self, name: &str) -> Result<PathBuf, Doc2SpeechError> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(Doc2SpeechError::InvalidAudioName {
                name: name.to_string(),
            });
        }
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(Doc2SpeechError::AudioNotFound {
                name: name.to_string(),
            });
        }
        Ok(path)
    }
}
