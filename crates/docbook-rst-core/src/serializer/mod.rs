//! Document serialization module
//!
//! This module provides serializers for converting a parsed [`Document`](crate::Document)
//! to output formats. RST is the primary target; JSON exposes the document model
//! for debugging backends.

pub mod json;
pub mod rst;

pub use json::{JsonOptions, JsonSerializer};
pub use rst::{escape_text, render_inlines, RstOptions, RstSerializer, DEFAULT_HEADING_CHARS};
