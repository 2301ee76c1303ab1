//! Typed failures surfaced by the loading and persistence layers.
//!
//! Engine-level edge cases (out-of-range indices, empty paragraphs) never
//! become errors; they are clamped or skipped where they occur.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a book could not be turned into a readable document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file type `{extension}` (expected .epub or .txt)")]
    Unsupported { extension: String },
    #[error("could not read EPUB archive {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },
    #[error("the EPUB spine is empty: no chapters to read")]
    EmptySpine,
    #[error("no readable text found in this book")]
    EmptyDocument,
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("loading was cancelled at stage={0}")]
    Cancelled(&'static str),
}

impl LoadError {
    /// Short label for status lines; the `Display` impl carries the detail.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::NotFound(_) => "not-found",
            LoadError::Unsupported { .. } => "unsupported",
            LoadError::Archive { .. } => "archive",
            LoadError::EmptySpine => "empty-spine",
            LoadError::EmptyDocument => "empty-document",
            LoadError::Io { .. } => "io",
            LoadError::Cancelled(_) => "cancelled",
        }
    }
}

/// Failures writing to the key-value store. Logged, never fatal.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_messages_name_the_reason() {
        let err = LoadError::Archive {
            path: PathBuf::from("book.epub"),
            reason: "missing META-INF/container.xml".to_string(),
        };
        assert_eq!(err.kind(), "archive");
        assert!(err.to_string().contains("missing META-INF/container.xml"));
        assert_eq!(
            LoadError::EmptyDocument.to_string(),
            "no readable text found in this book"
        );
    }
}
