//! # docbook-rst core
//!
//! Document model, error type and serializers shared by the DocBook backend
//! and the command-line tools.
//!
//! ## Quick Start
//!
//! ```rust
//! use docbook_rst_core::{DocItem, Document, Inline};
//!
//! let mut doc = Document::new("section");
//! doc.items.push(DocItem::Heading {
//!     level: 1,
//!     text: vec![Inline::Text("Code Example".to_string())],
//! });
//! doc.items.push(DocItem::text_paragraph("Body text."));
//!
//! assert_eq!(doc.to_rst(), "Code Example\n============\n\nBody text.\n");
//! ```
//!
//! Parsing lives in `docbook-rst-backend`; this crate has no XML dependency.

pub mod content;
pub mod document;
pub mod error;
pub mod serializer;

pub use content::{plain_text, AdmonitionKind, Definition, DocItem, Inline};
pub use document::{Document, DocumentMetadata};
pub use error::{ConvertError, Result};
pub use serializer::{JsonOptions, JsonSerializer, RstOptions, RstSerializer};
