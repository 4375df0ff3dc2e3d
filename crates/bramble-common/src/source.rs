//! Markup sources.
//!
//! A [`SourceFile`] is the file a document is built from: its content plus
//! where it came from, so diagnostics and relative links can name it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error loading a markup source from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The path exists but is not a regular file.
    #[error("{path} is not a file")]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },
}

/// A markup file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    location: PathBuf,
    content: String,
}

impl SourceFile {
    /// Wrap content that did not come from disk.
    ///
    /// `location` is only used for display; nothing is read from it.
    #[must_use]
    pub fn from_content(location: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected; markup in
    /// the wild is frequently mislabelled.
    ///
    /// # Errors
    /// Returns [`LoadError::NotAFile`] for directories and other non-files,
    /// and [`LoadError::Io`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(LoadError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            location: path.to_path_buf(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    /// Full path the content was read from.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Final path component, or the empty string if there is none.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.location
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// The markup.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume the source, keeping only the markup.
    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }
}
