//! Core trait definitions for document backends

use docbook_rst_core::{ConvertError, Document};
use std::fs;
use std::path::Path;

/// Default limit on element nesting while walking a document.
///
/// Real DocBook rarely nests beyond 20 levels; the limit keeps pathological
/// input from exhausting the stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for backend processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendOptions {
    /// Maximum element nesting depth before parsing fails
    pub max_depth: usize,

    /// Reject documents whose root element is not a DocBook container
    /// (`article`, `book`, `chapter`, `section`, ...).
    ///
    /// When `false` (default), any root is walked as a block container.
    pub strict_root: bool,
}

impl BackendOptions {
    /// Set the maximum nesting depth
    #[inline]
    #[must_use = "returns options with maximum depth configured"]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Require a DocBook root element
    #[inline]
    #[must_use = "returns options with strict root checking configured"]
    pub const fn with_strict_root(mut self, strict: bool) -> Self {
        self.strict_root = strict;
        self
    }
}

impl Default for BackendOptions {
    #[inline]
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_root: false,
        }
    }
}

/// A parser from some input format into a [`Document`].
pub trait DocumentBackend {
    /// Human-readable backend name used in logs and errors
    fn name(&self) -> &'static str;

    /// Parse a document held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ParseError`] for malformed input and
    /// [`ConvertError::EmptyDocument`] when the input has no content.
    fn parse_bytes(&self, bytes: &[u8], options: &BackendOptions)
        -> Result<Document, ConvertError>;

    /// Parse a document from disk.
    ///
    /// The default implementation reads the whole file, delegates to
    /// [`parse_bytes`](Self::parse_bytes) and records the file stem.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::IoError`] if the file cannot be read, plus any
    /// error from `parse_bytes` with the file name appended.
    fn parse_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &BackendOptions,
    ) -> Result<Document, ConvertError> {
        let path = path.as_ref();
        let filename = path.display().to_string();

        let bytes = fs::read(path)?;
        let mut document = self.parse_bytes(&bytes, options).map_err(|err| match err {
            ConvertError::ParseError(msg) => ConvertError::ParseError(format!("{msg}: {filename}")),
            ConvertError::EmptyDocument(msg) => {
                ConvertError::EmptyDocument(format!("{msg}: {filename}"))
            }
            other => other,
        })?;

        document.metadata.source = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(ToString::to_string);
        Ok(document)
    }
}
