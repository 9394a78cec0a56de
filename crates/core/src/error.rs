//! Error types for building, loading and patching decks.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, reading, patching or writing a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// ZIP container error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or generation error.
    #[error("XML error: {0}")]
    XmlError(String),

    /// A part the package structure requires is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// The presentation package is structurally invalid.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// The word-processing package is structurally invalid.
    #[error("DOCX parsing error: {0}")]
    DocxParseError(String),

    /// A slide was requested with a layout the document does not have.
    #[error("Layout index {index} does not exist (document has {available} layouts)")]
    LayoutNotFound { index: usize, available: usize },

    /// A shape was matched by more than one rule under the reject policy.
    #[error("Shape '{shape}' on slide {slide} is matched by several rules: {}", rules.join(", "))]
    AmbiguousMatch {
        slide: usize,
        shape: String,
        rules: Vec<String>,
    },

    /// A configuration value could not be interpreted.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The requested operation is not supported for this document.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}
