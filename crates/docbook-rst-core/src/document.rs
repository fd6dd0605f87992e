//! Parsed document and its metadata.

use crate::content::{DocItem, Inline};
use crate::serializer::{RstOptions, RstSerializer};
use serde::{Deserialize, Serialize};

/// Metadata collected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Local name of the XML root element (e.g. `article`, `section`)
    pub root_element: String,
    /// Number of top-level block items
    pub num_blocks: usize,
    /// Number of characters in the rendered RST, filled in after serialization
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub num_characters: Option<usize>,
    /// Source file stem when parsed from a file
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
}

/// A converted document: an ordered block list plus collected footnotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document title in plain text, if the root carried one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// Block content in document order
    pub items: Vec<DocItem>,
    /// Footnote bodies, referenced by `Inline::FootnoteRef(index)`
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub footnotes: Vec<Vec<Inline>>,
    /// Parse metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create an empty document for the given root element.
    #[inline]
    #[must_use = "returns a new empty document"]
    pub fn new(root_element: impl Into<String>) -> Self {
        Self {
            metadata: DocumentMetadata {
                root_element: root_element.into(),
                ..DocumentMetadata::default()
            },
            ..Self::default()
        }
    }

    /// `true` when nothing would be rendered.
    #[inline]
    #[must_use = "checks whether the document has content"]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.footnotes.is_empty()
    }

    /// Render with default [`RstOptions`].
    #[must_use = "returns the rendered reStructuredText"]
    pub fn to_rst(&self) -> String {
        RstSerializer::new().serialize(self)
    }

    /// Render with explicit options.
    #[must_use = "returns the rendered reStructuredText"]
    pub fn to_rst_with(&self, options: RstOptions) -> String {
        RstSerializer::with_options(options).serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new("article");
        assert!(doc.is_empty());
        assert_eq!(doc.metadata.root_element, "article");
        assert_eq!(doc.to_rst(), "");
    }

    #[test]
    fn test_document_with_items_is_not_empty() {
        let mut doc = Document::new("section");
        doc.items.push(DocItem::text_paragraph("Hello."));
        assert!(!doc.is_empty());
        assert_eq!(doc.to_rst(), "Hello.\n");
    }
}
