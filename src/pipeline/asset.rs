//! In-flight asset records.
//!
//! An [`Asset`] is a file as it passes through successive transform stages
//! from source to destination: a destination-relative path plus raw bytes.
//! Reads are binary-safe everywhere; text stages convert lossily only when
//! they actually transform content.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// One file flowing through a pipeline.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Path relative to the destination directory
    pub rel_path: PathBuf,
    /// File contents
    pub contents: Vec<u8>,
    /// Absolute origin on disk, if the asset came from a source read
    pub source: Option<PathBuf>,
    /// Source names recorded for sourcemap emission, when enabled
    pub map_sources: Option<Vec<String>>,
}

impl Asset {
    /// Create an asset from a relative path and contents.
    pub fn new(rel_path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self { rel_path: rel_path.into(), contents, source: None, map_sources: None }
    }

    /// Attach the on-disk origin.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Contents as text (lossy for invalid UTF-8).
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }

    /// Replace contents with text.
    pub fn set_text(&mut self, text: String) {
        self.contents = text.into_bytes();
    }

    /// Lowercased extension of the relative path, if any.
    pub fn extension(&self) -> Option<String> {
        self.rel_path.extension().map(|e| e.to_string_lossy().to_lowercase())
    }

    /// File name of the relative path.
    pub fn file_name(&self) -> String {
        self.rel_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Replace the extension (given without a leading dot).
    pub fn set_extension(&mut self, ext: &str) {
        self.rel_path.set_extension(ext);
    }

    /// Split the relative path into (directory, stem, extension-with-dot).
    pub fn path_parts(&self) -> (PathBuf, String, String) {
        let dir = self.rel_path.parent().unwrap_or(Path::new("")).to_path_buf();
        let stem = self
            .rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .rel_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (dir, stem, ext)
    }
}
