//! Error types for document conversion operations.
//!
//! Every fallible operation in the core and backend crates returns
//! [`ConvertError`] through the [`Result`] alias.

use thiserror::Error;

/// Error types that can occur while converting a DocBook document.
///
/// # Examples
///
/// ```rust,ignore
/// // Note: DocumentConverter is in docbook-rst-backend crate
/// use docbook_rst_backend::DocumentConverter;
/// use docbook_rst_core::ConvertError;
///
/// let converter = DocumentConverter::new();
///
/// match converter.convert("guide.xml") {
///     Ok(result) => print!("{}", result.rst),
///     Err(ConvertError::IoError(e)) => eprintln!("File error: {e}"),
///     Err(ConvertError::ParseError(msg)) => eprintln!("Malformed DocBook: {msg}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum ConvertError {
    /// File I/O error.
    ///
    /// Reading the input or writing the output failed (missing file,
    /// permission denied, disk full).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input is not well-formed XML or not valid UTF-8.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The input contains no XML at all (zero bytes or whitespace only).
    ///
    /// A root element without content is *not* an error; it converts to
    /// empty output.
    #[error("Empty document: {0}")]
    EmptyDocument(String),

    /// The input format is not one the backend understands.
    #[error("Format detection error: {0}")]
    FormatError(String),

    /// Backend-specific failure that does not fit the other variants.
    #[error("Backend error: {0}")]
    BackendError(String),

    /// JSON serialization of the document model failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ConvertError {
    /// Returns `true` when the underlying cause is a missing file.
    #[inline]
    #[must_use = "checks whether the error is a not-found I/O error"]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IoError(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Type alias for [`Result<T, ConvertError>`].
pub type Result<T> = std::result::Result<T, ConvertError>;
