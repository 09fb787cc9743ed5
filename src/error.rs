//! Error types for the chat-book pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for chat-book operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing, laying out or writing a book.
#[derive(Error, Debug)]
pub enum Error {
    /// A style name that is not part of the registry was looked up.
    #[error("Unknown style: {0:?}")]
    UnknownStyle(String),

    /// The finished document could not be written to its destination.
    #[error("Failed to write document to {}: {source}", path.display())]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The PDF backend could not produce the document bytes.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A font file could not be parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// A request or layout snapshot could not be (de)serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::DocumentWrite {
            path: path.into(),
            source,
        }
    }
}
