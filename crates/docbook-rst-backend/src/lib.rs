//! DocBook parsing backend for docbook-rst
//!
//! [`DocBookBackend`] turns DocBook 4/5 XML into the
//! [`Document`](docbook_rst_core::Document) model; [`DocumentConverter`]
//! wraps parsing and RST rendering behind a single call.
//!
//! ```rust
//! use docbook_rst_backend::DocumentConverter;
//!
//! let xml = br#"<section>
//!   <title>Code Example</title>
//!   <programlisting language="python">print("hi")</programlisting>
//! </section>"#;
//!
//! let result = DocumentConverter::new().convert_bytes(xml)?;
//! assert_eq!(
//!     result.rst,
//!     "Code Example\n============\n\n.. code-block:: python\n\n    print(\"hi\")\n"
//! );
//! # Ok::<(), docbook_rst_core::ConvertError>(())
//! ```

pub mod converter;
pub mod docbook;
pub mod traits;

pub use converter::{ConversionResult, DocumentConverter, DOCBOOK_EXTENSIONS};
pub use docbook::DocBookBackend;
pub use traits::{BackendOptions, DocumentBackend, DEFAULT_MAX_DEPTH};
