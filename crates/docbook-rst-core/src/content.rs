//! Structured content produced by backends and consumed by serializers.
//!
//! The model is deliberately close to what reStructuredText can express:
//! block items ([`DocItem`]) own inline runs ([`Inline`]), and nesting
//! (lists, admonitions, block quotes) is expressed by owned child vectors
//! rather than by reference paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline content inside a paragraph, list term, title, or table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text, whitespace already collapsed
    Text(String),
    /// Emphasised text (`*x*`)
    Emphasis(Vec<Inline>),
    /// Strong text (`**x**`)
    Strong(Vec<Inline>),
    /// Inline literal (``x``); content is taken verbatim
    Literal(String),
    /// External hyperlink
    Link {
        /// Link text (empty means "show the URL")
        text: Vec<Inline>,
        /// Target URL
        url: String,
    },
    /// Cross-reference to a label inside the document
    Reference {
        /// Explicit link text, if any
        text: Vec<Inline>,
        /// Target label id
        target: String,
    },
    /// Auto-numbered footnote reference; index into `Document::footnotes`
    FootnoteRef(usize),
    /// Subscript text
    Subscript(Vec<Inline>),
    /// Superscript text
    Superscript(Vec<Inline>),
}

impl Inline {
    /// Plain text of this inline with all markup stripped.
    #[must_use = "returns the plain text content"]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(t) | Self::Literal(t) => t.clone(),
            Self::Emphasis(c) | Self::Strong(c) | Self::Subscript(c) | Self::Superscript(c) => {
                plain_text(c)
            }
            Self::Link { text, url } => {
                if text.is_empty() {
                    url.clone()
                } else {
                    plain_text(text)
                }
            }
            Self::Reference { text, target } => {
                if text.is_empty() {
                    target.clone()
                } else {
                    plain_text(text)
                }
            }
            Self::FootnoteRef(_) => String::new(),
        }
    }
}

/// Concatenated plain text of a run of inlines.
#[must_use = "returns the plain text content"]
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

/// Admonition flavours shared by DocBook and RST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmonitionKind {
    Note,
    Tip,
    Warning,
    Important,
    Caution,
    Danger,
}

impl AdmonitionKind {
    /// Map a DocBook element name to an admonition kind.
    #[inline]
    #[must_use = "maps element name to admonition kind"]
    pub fn from_element(name: &str) -> Option<Self> {
        match name {
            "note" => Some(Self::Note),
            "tip" => Some(Self::Tip),
            "warning" => Some(Self::Warning),
            "important" => Some(Self::Important),
            "caution" => Some(Self::Caution),
            "danger" => Some(Self::Danger),
            _ => None,
        }
    }

    /// RST directive name
    #[inline]
    #[must_use = "returns the directive name"]
    pub const fn directive(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Warning => "warning",
            Self::Important => "important",
            Self::Caution => "caution",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for AdmonitionKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}

/// One entry of a definition list (`variablelist` in DocBook).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// One or more terms; rendered joined by `, `
    pub terms: Vec<Vec<Inline>>,
    /// Definition body
    pub body: Vec<DocItem>,
}

/// Block-level document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocItem {
    /// Section or document title.
    ///
    /// Level 0 is the document title; levels from 1 are section depths.
    Heading {
        level: usize,
        text: Vec<Inline>,
    },
    /// Explicit hyperlink target (`.. _id:`)
    Label { id: String },
    /// Paragraph of inline content
    Paragraph { content: Vec<Inline> },
    /// Source code with an optional highlighting language
    CodeBlock {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        language: Option<String>,
        code: String,
    },
    /// Verbatim text without highlighting
    LiteralBlock { text: String },
    /// Bulleted or enumerated list; each item is a block sequence
    List {
        ordered: bool,
        items: Vec<Vec<DocItem>>,
    },
    /// Term/definition pairs
    DefinitionList { entries: Vec<Definition> },
    /// Note, warning and friends
    Admonition {
        kind: AdmonitionKind,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        title: Option<Vec<Inline>>,
        body: Vec<DocItem>,
    },
    /// Indented quotation
    BlockQuote {
        body: Vec<DocItem>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        attribution: Option<Vec<Inline>>,
    },
    /// Grid of cells; the first `header_rows` rows are headers
    Table {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        title: Option<Vec<Inline>>,
        header_rows: usize,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    /// Image, optionally a figure when a caption is present
    Image {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        alt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        caption: Option<Vec<Inline>>,
    },
}

impl DocItem {
    /// Convenience constructor for a paragraph of plain text.
    #[inline]
    #[must_use = "returns a new paragraph item"]
    pub fn text_paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            content: vec![Inline::Text(text.into())],
        }
    }

    /// Short type name used in logs and statistics.
    #[inline]
    #[must_use = "returns the item kind name"]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Label { .. } => "label",
            Self::Paragraph { .. } => "paragraph",
            Self::CodeBlock { .. } => "code_block",
            Self::LiteralBlock { .. } => "literal_block",
            Self::List { .. } => "list",
            Self::DefinitionList { .. } => "definition_list",
            Self::Admonition { .. } => "admonition",
            Self::BlockQuote { .. } => "block_quote",
            Self::Table { .. } => "table",
            Self::Image { .. } => "image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_markup() {
        let inlines = vec![
            Inline::Text("Run ".to_string()),
            Inline::Literal("make".to_string()),
            Inline::Text(" then ".to_string()),
            Inline::Strong(vec![Inline::Text("wait".to_string())]),
            Inline::FootnoteRef(0),
        ];
        assert_eq!(plain_text(&inlines), "Run make then wait");
    }

    #[test]
    fn test_link_plain_text_falls_back_to_url() {
        let link = Inline::Link {
            text: Vec::new(),
            url: "https://docbook.org".to_string(),
        };
        assert_eq!(link.plain_text(), "https://docbook.org");

        let reference = Inline::Reference {
            text: Vec::new(),
            target: "install".to_string(),
        };
        assert_eq!(reference.plain_text(), "install");
    }

    #[test]
    fn test_admonition_from_element() {
        assert_eq!(AdmonitionKind::from_element("note"), Some(AdmonitionKind::Note));
        assert_eq!(
            AdmonitionKind::from_element("caution"),
            Some(AdmonitionKind::Caution)
        );
        assert_eq!(AdmonitionKind::from_element("para"), None);
        assert_eq!(AdmonitionKind::Warning.to_string(), "warning");
    }

    #[test]
    fn test_docitem_json_tagging() {
        let item = DocItem::CodeBlock {
            language: Some("python".to_string()),
            code: "print(\"hi\")".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "code_block");
        assert_eq!(json["language"], "python");

        let back: DocItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DocItem::text_paragraph("x").kind(), "paragraph");
        assert_eq!(
            DocItem::Label {
                id: "a".to_string()
            }
            .kind(),
            "label"
        );
    }
}
