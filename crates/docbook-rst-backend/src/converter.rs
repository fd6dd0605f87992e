//! Document converter facade: parse with a backend, render to RST.

use crate::docbook::DocBookBackend;
use crate::traits::{BackendOptions, DocumentBackend};
use docbook_rst_core::{ConvertError, Document, RstOptions, RstSerializer};
use log::{debug, warn};
use std::path::Path;
use std::time::{Duration, Instant};

/// File extensions conventionally used for DocBook sources
pub const DOCBOOK_EXTENSIONS: &[&str] = &["xml", "dbk", "docbook", "docbook4", "docbook5"];

/// Result of a single conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Parsed document model
    pub document: Document,
    /// Rendered reStructuredText
    pub rst: String,
    /// Time spent parsing and rendering
    pub latency: Duration,
}

/// Converts DocBook files to reStructuredText.
///
/// # Examples
///
/// ```rust,no_run
/// use docbook_rst_backend::DocumentConverter;
///
/// let converter = DocumentConverter::new();
/// let result = converter.convert("guide.xml")?;
/// print!("{}", result.rst);
/// # Ok::<(), docbook_rst_core::ConvertError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentConverter {
    backend: DocBookBackend,
    options: BackendOptions,
    serializer: RstSerializer,
}

impl DocumentConverter {
    /// Converter with default backend and serializer options
    #[inline]
    #[must_use = "creates a document converter"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter with explicit options
    #[inline]
    #[must_use = "creates a document converter"]
    pub fn with_options(options: BackendOptions, rst_options: RstOptions) -> Self {
        Self {
            backend: DocBookBackend::new(),
            options,
            serializer: RstSerializer::with_options(rst_options),
        }
    }

    /// Backend options in effect
    #[inline]
    #[must_use = "returns the backend options"]
    pub const fn backend_options(&self) -> &BackendOptions {
        &self.options
    }

    /// Convert a file on disk.
    ///
    /// Files without a DocBook-like extension are still parsed; a warning is
    /// logged since the content decides, not the name.
    ///
    /// # Errors
    ///
    /// Propagates I/O and parse errors from the backend.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<ConversionResult, ConvertError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase);
        if !ext
            .as_deref()
            .is_some_and(|e| DOCBOOK_EXTENSIONS.contains(&e))
        {
            warn!(
                "{} does not have a DocBook extension; parsing as DocBook anyway",
                path.display()
            );
        }

        let start = Instant::now();
        let document = self.backend.parse_file(path, &self.options)?;
        Ok(self.finish(document, start))
    }

    /// Convert an in-memory DocBook document.
    ///
    /// # Errors
    ///
    /// Propagates parse errors from the backend.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<ConversionResult, ConvertError> {
        let start = Instant::now();
        let document = self.backend.parse_bytes(bytes, &self.options)?;
        Ok(self.finish(document, start))
    }

    fn finish(&self, mut document: Document, start: Instant) -> ConversionResult {
        let rst = self.serializer.serialize(&document);
        document.metadata.num_characters = Some(rst.chars().count());
        let latency = start.elapsed();
        debug!(
            "{} conversion: {} blocks -> {} bytes of RST in {:?}",
            self.backend.name(),
            document.items.len(),
            rst.len(),
            latency
        );
        ConversionResult {
            document,
            rst,
            latency,
        }
    }
}
