//! DocBook XML document parser
//!
//! # Architecture
//!
//! XML parsing using roxmltree (DOM-like tree walking). Both DocBook 4
//! (DOCTYPE, un-namespaced) and DocBook 5 (`http://docbook.org/ns/docbook`)
//! are accepted; elements are matched on their local name only.
//!
//! The walker has two modes:
//!
//! - **Block mode** turns container children into [`DocItem`]s. Text and
//!   inline elements that appear directly inside a container are gathered
//!   into a pending run and flushed as a paragraph when the next block
//!   element starts. This is what lets `<para>` hold nested lists or
//!   program listings, which DocBook 4 permits.
//! - **Inline mode** turns mixed content into [`Inline`] runs with
//!   whitespace collapsed.
//!
//! # Sections
//!
//! The title of an `article`/`book`/`set`/`part` root becomes the level-0
//! document title. Any other sectioning root starts at level 1. Each nested
//! section adds one level. Section ids (`id` or `xml:id`) become labels.

use crate::traits::{BackendOptions, DocumentBackend};
use docbook_rst_core::content::{plain_text, AdmonitionKind, Definition, DocItem, Inline};
use docbook_rst_core::{ConvertError, Document};
use log::{debug, trace};
use roxmltree::Node;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Roots whose title is the document title (level 0)
const DOCUMENT_ROOTS: &[&str] = &["article", "book", "set", "part"];

/// Elements that open a new section level
const SECTION_ELEMENTS: &[&str] = &[
    "article",
    "book",
    "set",
    "part",
    "chapter",
    "appendix",
    "preface",
    "section",
    "sect1",
    "sect2",
    "sect3",
    "sect4",
    "sect5",
    "simplesect",
    "refentry",
    "refsection",
    "refsect1",
    "refsect2",
    "refsect3",
    "glossary",
    "bibliography",
    "colophon",
    "dedication",
];

/// Metadata containers and elements with no RST rendering
const SKIPPED_ELEMENTS: &[&str] = &[
    "title",
    "subtitle",
    "titleabbrev",
    "info",
    "articleinfo",
    "bookinfo",
    "chapterinfo",
    "sectioninfo",
    "sect1info",
    "sect2info",
    "sect3info",
    "appendixinfo",
    "prefaceinfo",
    "partinfo",
    "setinfo",
    "refmeta",
    "refnamediv",
    "remark",
    "indexterm",
    "toc",
    "index",
];

/// Info wrappers that may carry the title
const INFO_ELEMENTS: &[&str] = &[
    "info",
    "articleinfo",
    "bookinfo",
    "chapterinfo",
    "sectioninfo",
    "sect1info",
    "sect2info",
    "sect3info",
    "appendixinfo",
    "prefaceinfo",
    "partinfo",
    "setinfo",
];

/// Inline elements rendered as literals
const LITERAL_ELEMENTS: &[&str] = &[
    "literal",
    "code",
    "command",
    "filename",
    "option",
    "varname",
    "function",
    "classname",
    "methodname",
    "parameter",
    "type",
    "userinput",
    "computeroutput",
    "envar",
    "constant",
    "systemitem",
    "prompt",
    "markup",
    "tag",
    "sgmltag",
    "uri",
    "email",
];

/// Elements that are block-level in DocBook
const BLOCK_ELEMENTS: &[&str] = &[
    "para",
    "simpara",
    "formalpara",
    "programlisting",
    "screen",
    "synopsis",
    "literallayout",
    "itemizedlist",
    "orderedlist",
    "simplelist",
    "variablelist",
    "procedure",
    "note",
    "tip",
    "warning",
    "important",
    "caution",
    "danger",
    "blockquote",
    "epigraph",
    "table",
    "informaltable",
    "figure",
    "informalfigure",
    "mediaobject",
    "screenshot",
    "example",
    "informalexample",
    "sidebar",
    "abstract",
    "partintro",
    "legalnotice",
    "bridgehead",
];

#[inline]
fn local_name<'a>(node: &Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

#[inline]
fn is_named(node: &Node, names: &[&str]) -> bool {
    node.is_element() && names.contains(&node.tag_name().name())
}

fn is_block(node: &Node) -> bool {
    is_named(node, BLOCK_ELEMENTS) || is_named(node, SECTION_ELEMENTS)
}

/// `id` (DocBook 4) or `xml:id` (DocBook 5)
fn element_id<'a>(node: &Node<'a, '_>) -> Option<&'a str> {
    node.attribute("id")
        .or_else(|| node.attribute((XML_NS, "id")))
        .filter(|id| !id.trim().is_empty())
}

fn first_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && local_name(c) == name)
}

/// Direct `<title>`, or the title inside an info wrapper.
fn find_title<'a, 'input>(node: &Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    first_child(node, "title").or_else(|| {
        node.children()
            .filter(|c| is_named(c, INFO_ELEMENTS))
            .find_map(|info| first_child(&info, "title"))
    })
}

/// Concatenate every descendant text node verbatim.
fn raw_text(node: &Node) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

/// Collapse runs of XML whitespace to a single space.
///
/// Leading and trailing whitespace is kept (as one space) so that text on
/// either side of an inline element stays separated.
#[must_use = "returns the collapsed text"]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Prepare program listing text for an indented literal block.
///
/// Leading blank lines and trailing whitespace are removed; indentation of
/// the remaining lines is preserved. CRLF line endings become LF.
#[must_use = "returns the cleaned code"]
pub fn clean_code(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    let mut start = 0;
    for line in normalized.split_inclusive('\n') {
        if line.trim().is_empty() {
            start += line.len();
        } else {
            break;
        }
    }
    normalized[start..].trim_end().to_string()
}

/// Merge adjacent text runs, collapse whitespace and trim the run edges.
fn normalize_inlines(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if let Inline::Text(next) = &inline {
            if let Some(Inline::Text(prev)) = merged.last_mut() {
                prev.push_str(next);
                continue;
            }
        }
        merged.push(inline);
    }

    for inline in &mut merged {
        if let Inline::Text(text) = inline {
            *text = collapse_whitespace(text);
        }
    }
    if let Some(Inline::Text(first)) = merged.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(Inline::Text(last)) = merged.last_mut() {
        *last = last.trim_end().to_string();
    }
    merged.retain(|i| !matches!(i, Inline::Text(t) if t.is_empty()));
    merged
}

/// DocBook backend for parsing DocBook 4/5 XML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DocBookBackend;

impl DocumentBackend for DocBookBackend {
    #[inline]
    fn name(&self) -> &'static str {
        "DocBook"
    }

    fn parse_bytes(
        &self,
        bytes: &[u8],
        options: &BackendOptions,
    ) -> Result<Document, ConvertError> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| ConvertError::ParseError(format!("Invalid UTF-8 in DocBook file: {e}")))?;
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        self.parse_docbook_xml(xml, options)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)] // Unit struct methods conventionally take &self
impl DocBookBackend {
    /// Create a new backend
    #[inline]
    #[must_use = "creates a DocBook backend"]
    pub const fn new() -> Self {
        Self
    }

    /// Parse DocBook XML text into a [`Document`].
    ///
    /// # Errors
    ///
    /// - [`ConvertError::EmptyDocument`] when `xml` is empty or whitespace
    /// - [`ConvertError::ParseError`] when `xml` is not well-formed
    /// - [`ConvertError::FormatError`] when `strict_root` is set and the root
    ///   is not a DocBook container
    /// - [`ConvertError::BackendError`] when nesting exceeds `max_depth`
    pub fn parse_docbook_xml(
        &self,
        xml: &str,
        options: &BackendOptions,
    ) -> Result<Document, ConvertError> {
        if xml.trim().is_empty() {
            return Err(ConvertError::EmptyDocument(
                "input contains no XML".to_string(),
            ));
        }

        let parse_options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let xml_doc = roxmltree::Document::parse_with_options(xml, parse_options)
            .map_err(|e| ConvertError::ParseError(format!("Invalid DocBook XML: {e}")))?;

        let root = xml_doc.root_element();
        let root_name = local_name(&root);
        let is_docbook_root = SECTION_ELEMENTS.contains(&root_name)
            || BLOCK_ELEMENTS.contains(&root_name);
        if options.strict_root && !is_docbook_root {
            return Err(ConvertError::FormatError(format!(
                "<{root_name}> is not a DocBook root element"
            )));
        }

        let mut walker = Walker::new(options);
        let mut items = Vec::new();
        if DOCUMENT_ROOTS.contains(&root_name) {
            walker.section(root, 0, &mut items, 0)?;
        } else if SECTION_ELEMENTS.contains(&root_name) {
            walker.section(root, 1, &mut items, 0)?;
        } else if is_block(&root) {
            walker.block_element(root, 1, &mut items, 0)?;
        } else {
            walker.blocks(root, 1, &mut items, 0)?;
        }

        let mut document = Document::new(root_name);
        document.title = walker.title;
        document.metadata.num_blocks = items.len();
        document.items = items;
        document.footnotes = walker.footnotes;

        debug!(
            "Parsed DocBook <{}>: {} blocks, {} footnotes",
            root_name,
            document.items.len(),
            document.footnotes.len()
        );
        Ok(document)
    }
}

/// Tree walker state shared across one parse.
struct Walker<'o> {
    options: &'o BackendOptions,
    title: Option<String>,
    footnotes: Vec<Vec<Inline>>,
}

impl<'o> Walker<'o> {
    const fn new(options: &'o BackendOptions) -> Self {
        Self {
            options,
            title: None,
            footnotes: Vec::new(),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), ConvertError> {
        if depth > self.options.max_depth {
            return Err(ConvertError::BackendError(format!(
                "element nesting exceeds maximum depth of {}",
                self.options.max_depth
            )));
        }
        Ok(())
    }

    /// Emit label, heading and body of a sectioning element.
    fn section(
        &mut self,
        node: Node,
        level: usize,
        out: &mut Vec<DocItem>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        self.check_depth(depth)?;

        if let Some(id) = element_id(&node) {
            out.push(DocItem::Label { id: id.to_string() });
        }
        if let Some(title) = find_title(&node) {
            let text = self.inlines(title, depth + 1)?;
            if !text.is_empty() {
                if level == 0 {
                    self.title = Some(plain_text(&text));
                }
                out.push(DocItem::Heading { level, text });
            }
        }
        self.blocks(node, level + 1, out, depth + 1)
    }

    /// Walk the children of a container in block mode.
    fn blocks(
        &mut self,
        node: Node,
        level: usize,
        out: &mut Vec<DocItem>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        self.check_depth(depth)?;

        let mut pending: Vec<Node> = Vec::new();
        for child in node.children() {
            if child.is_text() {
                pending.push(child);
                continue;
            }
            if !child.is_element() {
                continue;
            }
            if is_named(&child, SKIPPED_ELEMENTS) {
                trace!("skipping <{}>", local_name(&child));
                continue;
            }
            let contains_blocks =
                local_name(&child) != "footnote" && child.children().any(|c| is_block(&c));
            if is_block(&child) || contains_blocks {
                self.flush_paragraph(&mut pending, out, depth)?;
                self.block_element(child, level, out, depth + 1)?;
            } else if local_name(&child) == "anchor" {
                self.flush_paragraph(&mut pending, out, depth)?;
                if let Some(id) = element_id(&child) {
                    out.push(DocItem::Label { id: id.to_string() });
                }
            } else {
                pending.push(child);
            }
        }
        self.flush_paragraph(&mut pending, out, depth)
    }

    /// Collect a container's blocks into a fresh vector.
    fn block_vec(
        &mut self,
        node: Node,
        level: usize,
        depth: usize,
    ) -> Result<Vec<DocItem>, ConvertError> {
        let mut items = Vec::new();
        self.blocks(node, level, &mut items, depth)?;
        Ok(items)
    }

    fn flush_paragraph(
        &mut self,
        pending: &mut Vec<Node>,
        out: &mut Vec<DocItem>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        if pending.is_empty() {
            return Ok(());
        }
        let mut content = Vec::new();
        for node in pending.drain(..) {
            self.inline_node(node, &mut content, depth + 1)?;
        }
        let content = normalize_inlines(content);
        if !content.is_empty() {
            out.push(DocItem::Paragraph { content });
        }
        Ok(())
    }

    /// Convert one block-level element.
    #[allow(clippy::too_many_lines)] // one arm per DocBook block element
    fn block_element(
        &mut self,
        node: Node,
        level: usize,
        out: &mut Vec<DocItem>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        self.check_depth(depth)?;
        let name = local_name(&node);

        if SECTION_ELEMENTS.contains(&name) {
            return self.section(node, level, out, depth);
        }

        match name {
            "programlisting" | "screen" | "synopsis" => {
                let language = node
                    .attribute("language")
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(ToString::to_string);
                out.push(DocItem::CodeBlock {
                    language,
                    code: clean_code(&raw_text(&node)),
                });
            }
            "literallayout" => out.push(DocItem::LiteralBlock {
                text: clean_code(&raw_text(&node)),
            }),
            "itemizedlist" | "orderedlist" => {
                if let Some(title) = find_title(&node) {
                    self.push_title_paragraph(title, out, depth)?;
                }
                let mut items = Vec::new();
                for item in node.children().filter(|c| is_named(c, &["listitem"])) {
                    items.push(self.block_vec(item, level, depth + 1)?);
                }
                out.push(DocItem::List {
                    ordered: name == "orderedlist",
                    items,
                });
            }
            "simplelist" => {
                let mut items = Vec::new();
                for member in node.children().filter(|c| is_named(c, &["member"])) {
                    let content = self.inlines(member, depth + 1)?;
                    items.push(vec![DocItem::Paragraph { content }]);
                }
                out.push(DocItem::List {
                    ordered: false,
                    items,
                });
            }
            "procedure" => {
                if let Some(title) = find_title(&node) {
                    self.push_title_paragraph(title, out, depth)?;
                }
                let mut items = Vec::new();
                for step in node.children().filter(|c| is_named(c, &["step"])) {
                    items.push(self.block_vec(step, level, depth + 1)?);
                }
                out.push(DocItem::List {
                    ordered: true,
                    items,
                });
            }
            "variablelist" => {
                if let Some(title) = find_title(&node) {
                    self.push_title_paragraph(title, out, depth)?;
                }
                let mut entries = Vec::new();
                for entry in node.children().filter(|c| is_named(c, &["varlistentry"])) {
                    let mut terms = Vec::new();
                    for term in entry.children().filter(|c| is_named(c, &["term"])) {
                        terms.push(self.inlines(term, depth + 1)?);
                    }
                    let body = match first_child(&entry, "listitem") {
                        Some(item) => self.block_vec(item, level, depth + 1)?,
                        None => Vec::new(),
                    };
                    entries.push(Definition { terms, body });
                }
                out.push(DocItem::DefinitionList { entries });
            }
            "note" | "tip" | "warning" | "important" | "caution" | "danger" => {
                let kind = AdmonitionKind::from_element(name).unwrap_or(AdmonitionKind::Note);
                let title = match find_title(&node) {
                    Some(t) => Some(self.inlines(t, depth + 1)?).filter(|t| !t.is_empty()),
                    None => None,
                };
                let body = self.block_vec(node, level, depth + 1)?;
                out.push(DocItem::Admonition { kind, title, body });
            }
            "blockquote" | "epigraph" => {
                let mut body = Vec::new();
                let mut pending = Vec::new();
                for child in node.children() {
                    if is_named(&child, &["attribution"]) || is_named(&child, SKIPPED_ELEMENTS) {
                        continue;
                    }
                    if is_block(&child) {
                        self.flush_paragraph(&mut pending, &mut body, depth)?;
                        self.block_element(child, level, &mut body, depth + 1)?;
                    } else if child.is_text() || child.is_element() {
                        pending.push(child);
                    }
                }
                self.flush_paragraph(&mut pending, &mut body, depth)?;
                // Rendered after the body, so its footnotes come last
                let attribution = match first_child(&node, "attribution") {
                    Some(a) => Some(self.inlines(a, depth + 1)?).filter(|a| !a.is_empty()),
                    None => None,
                };
                out.push(DocItem::BlockQuote { body, attribution });
            }
            "table" | "informaltable" => self.table(node, out, depth)?,
            "figure" | "informalfigure" => {
                let caption = match find_title(&node) {
                    Some(t) => Some(self.inlines(t, depth + 1)?).filter(|c| !c.is_empty()),
                    None => None,
                };
                self.image(node, caption, out, depth)?;
            }
            "mediaobject" | "screenshot" => {
                let caption = match node.descendants().find(|d| is_named(d, &["caption"])) {
                    Some(c) => Some(self.inlines(c, depth + 1)?).filter(|c| !c.is_empty()),
                    None => None,
                };
                self.image(node, caption, out, depth)?;
            }
            "formalpara" => {
                let title = match find_title(&node) {
                    Some(t) => self.inlines(t, depth + 1)?,
                    None => Vec::new(),
                };
                let mut body = self.block_vec(node, level, depth + 1)?;
                if !title.is_empty() {
                    let prefix = Inline::Strong(title);
                    match body.first_mut() {
                        Some(DocItem::Paragraph { content }) => {
                            content.insert(0, Inline::Text(" ".to_string()));
                            content.insert(0, prefix);
                        }
                        _ => body.insert(
                            0,
                            DocItem::Paragraph {
                                content: vec![prefix],
                            },
                        ),
                    }
                }
                out.extend(body);
            }
            "bridgehead" => {
                let content = self.inlines(node, depth + 1)?;
                if !content.is_empty() {
                    out.push(DocItem::Paragraph {
                        content: vec![Inline::Strong(content)],
                    });
                }
            }
            "example" | "informalexample" | "sidebar" | "abstract" | "partintro"
            | "legalnotice" => {
                if let Some(title) = find_title(&node) {
                    self.push_title_paragraph(title, out, depth)?;
                }
                self.blocks(node, level, out, depth + 1)?;
            }
            // para, simpara and unknown containers holding blocks
            _ => self.blocks(node, level, out, depth + 1)?,
        }
        Ok(())
    }

    /// Emit a title as a bold paragraph (for non-sectioning titled blocks).
    fn push_title_paragraph(
        &mut self,
        title: Node,
        out: &mut Vec<DocItem>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        let text = self.inlines(title, depth + 1)?;
        if !text.is_empty() {
            out.push(DocItem::Paragraph {
                content: vec![Inline::Strong(text)],
            });
        }
        Ok(())
    }

    fn table(
        &mut self,
        node: Node,
        out: &mut Vec<DocItem>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        let title = match find_title(&node) {
            Some(t) => Some(self.inlines(t, depth + 1)?).filter(|t| !t.is_empty()),
            None => None,
        };

        // thead rows may follow tbody in the source; headers are emitted (and
        // their footnotes numbered) first
        let (head, body): (Vec<Node>, Vec<Node>) = node
            .descendants()
            .filter(|d| is_named(d, &["row", "tr"]))
            .partition(|row| row.ancestors().any(|a| is_named(&a, &["thead"])));
        let header_rows = head.len();
        let mut rows = Vec::with_capacity(head.len() + body.len());
        for row in head.into_iter().chain(body) {
            let mut cells = Vec::new();
            for cell in row.children().filter(|c| is_named(c, &["entry", "td", "th"])) {
                cells.push(self.inlines(cell, depth + 1)?);
            }
            rows.push(cells);
        }

        out.push(DocItem::Table {
            title,
            header_rows,
            rows,
        });
        Ok(())
    }

    fn image(
        &mut self,
        node: Node,
        caption: Option<Vec<Inline>>,
        out: &mut Vec<DocItem>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        self.check_depth(depth)?;
        let uri = node
            .descendants()
            .filter(|d| is_named(d, &["imagedata", "graphic"]))
            .find_map(|d| d.attribute("fileref").or_else(|| d.attribute("entityref")));
        let Some(uri) = uri else {
            trace!("<{}> without image data", local_name(&node));
            return Ok(());
        };
        let alt = node
            .descendants()
            .find(|d| is_named(d, &["alt", "phrase"]))
            .map(|d| collapse_whitespace(&raw_text(&d)).trim().to_string())
            .filter(|a| !a.is_empty());

        out.push(DocItem::Image {
            uri: uri.to_string(),
            alt,
            caption,
        });
        Ok(())
    }

    /// Inline content of `node`'s children, normalized.
    fn inlines(&mut self, node: Node, depth: usize) -> Result<Vec<Inline>, ConvertError> {
        let mut content = Vec::new();
        for child in node.children() {
            self.inline_node(child, &mut content, depth + 1)?;
        }
        Ok(normalize_inlines(content))
    }

    /// Inline content without edge trimming, for nested markup.
    fn inline_children(
        &mut self,
        node: Node,
        depth: usize,
    ) -> Result<Vec<Inline>, ConvertError> {
        let mut content = Vec::new();
        for child in node.children() {
            self.inline_node(child, &mut content, depth + 1)?;
        }
        Ok(content)
    }

    fn inline_node(
        &mut self,
        node: Node,
        out: &mut Vec<Inline>,
        depth: usize,
    ) -> Result<(), ConvertError> {
        self.check_depth(depth)?;

        if node.is_text() {
            if let Some(text) = node.text() {
                out.push(Inline::Text(collapse_whitespace(text)));
            }
            return Ok(());
        }
        if !node.is_element() {
            return Ok(());
        }

        let name = local_name(&node);
        if LITERAL_ELEMENTS.contains(&name) {
            let text = collapse_whitespace(&raw_text(&node));
            if !text.trim().is_empty() {
                out.push(Inline::Literal(text.trim().to_string()));
            }
            return Ok(());
        }

        match name {
            "emphasis" => {
                let children = self.inline_children(node, depth)?;
                let strong = matches!(node.attribute("role"), Some("bold" | "strong"));
                out.push(if strong {
                    Inline::Strong(children)
                } else {
                    Inline::Emphasis(children)
                });
            }
            "replaceable" | "citetitle" | "foreignphrase" | "firstterm" => {
                out.push(Inline::Emphasis(self.inline_children(node, depth)?));
            }
            "quote" => {
                out.push(Inline::Text("\"".to_string()));
                out.extend(self.inline_children(node, depth)?);
                out.push(Inline::Text("\"".to_string()));
            }
            "subscript" => out.push(Inline::Subscript(self.inline_children(node, depth)?)),
            "superscript" => out.push(Inline::Superscript(self.inline_children(node, depth)?)),
            "ulink" => {
                let text = normalize_inlines(self.inline_children(node, depth)?);
                match node.attribute("url") {
                    Some(url) => out.push(Inline::Link {
                        text,
                        url: url.trim().to_string(),
                    }),
                    None => out.extend(text),
                }
            }
            "link" => {
                let text = normalize_inlines(self.inline_children(node, depth)?);
                if let Some(url) = node.attribute((XLINK_NS, "href")) {
                    out.push(Inline::Link {
                        text,
                        url: url.trim().to_string(),
                    });
                } else if let Some(target) = node.attribute("linkend") {
                    out.push(Inline::Reference {
                        text,
                        target: target.trim().to_string(),
                    });
                } else {
                    out.extend(text);
                }
            }
            "xref" => {
                if let Some(target) = node.attribute("linkend") {
                    out.push(Inline::Reference {
                        text: Vec::new(),
                        target: target.trim().to_string(),
                    });
                }
            }
            "footnote" => {
                let index = self.footnotes.len();
                self.footnotes.push(Vec::new());
                let body = self.inlines(node, depth)?;
                self.footnotes[index] = body;
                out.push(Inline::FootnoteRef(index));
            }
            "para" | "simpara" | "member" | "term" | "entry" => {
                out.push(Inline::Text(" ".to_string()));
                out.extend(self.inline_children(node, depth)?);
                out.push(Inline::Text(" ".to_string()));
            }
            "remark" | "indexterm" | "co" | "anchor" | "inlinemediaobject" | "alt" => {
                trace!("skipping inline <{name}>");
            }
            _ => out.extend(self.inline_children(node, depth)?),
        }
        Ok(())
    }
}
