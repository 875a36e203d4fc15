//! Screenshot artifacts and payloads
//!
//! The capture tool writes to a file, so each capture gets its own uniquely
//! named temporary path. [`TempArtifact`] owns that path and removes the file
//! when dropped, whatever happened in between.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;

/// A temporary file that is removed on drop
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Reserve a fresh path in the system temp dir; nothing is created yet
    pub fn unique(prefix: &str, extension: &str) -> Self {
        Self::unique_in(&std::env::temp_dir(), prefix, extension)
    }

    pub fn unique_in(dir: &Path, prefix: &str, extension: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let name = format!("{prefix}-{nanos}-{}.{extension}", uuid::Uuid::new_v4().simple());
        Self {
            path: dir.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// A captured screen image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl Screenshot {
    /// Wrap raw image bytes, sniffing the format from the content
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        // scrot writes PNG unless told otherwise
        let mime_type = image::guess_format(&bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("image/png");
        Self { bytes, mime_type }
    }

    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}
