//! reStructuredText serialization for [`Document`].
//!
//! The serializer is a single pass over the block list. Every block renders
//! to a self-contained string without a trailing newline; blocks are joined
//! by exactly one blank line and non-empty output ends with a single `\n`.
//! Nested content (list items, directive bodies) is rendered recursively and
//! then indented, so the same rules apply at every depth.
//!
//! # Examples
//!
//! ```rust
//! use docbook_rst_core::{DocItem, Document, RstSerializer};
//!
//! let mut doc = Document::new("section");
//! doc.items.push(DocItem::CodeBlock {
//!     language: Some("python".to_string()),
//!     code: "print(\"hi\")".to_string(),
//! });
//!
//! let rst = RstSerializer::new().serialize(&doc);
//! assert_eq!(rst, ".. code-block:: python\n\n    print(\"hi\")\n");
//! ```

use crate::content::{plain_text, DocItem, Inline};
use crate::document::Document;
use log::trace;
use unicode_width::UnicodeWidthStr;

/// Default section adornment characters, outermost first.
pub const DEFAULT_HEADING_CHARS: &[char] = &['=', '-', '~', '^', '"', '\''];

/// Configuration options for RST serialization.
///
/// # Examples
///
/// ```rust
/// use docbook_rst_core::RstOptions;
///
/// let options = RstOptions::default();
/// assert_eq!(options.indent, 4);
/// assert_eq!(options.bullet, '-');
/// assert_eq!(options.heading_chars[0], '=');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RstOptions {
    /// Spaces used for directive bodies, code and definitions.
    ///
    /// Default: 4.
    pub indent: usize,

    /// Adornment characters per section level; level 1 uses the first.
    ///
    /// Levels deeper than the list reuse the last character.
    pub heading_chars: Vec<char>,

    /// Bullet character for itemized lists (`-`, `*` or `+`).
    pub bullet: char,

    /// Render the level-0 document title with an overline.
    ///
    /// When `false` the title is rendered like a level-1 section.
    pub title_overline: bool,
}

impl Default for RstOptions {
    #[inline]
    fn default() -> Self {
        Self {
            indent: 4,
            heading_chars: DEFAULT_HEADING_CHARS.to_vec(),
            bullet: '-',
            title_overline: true,
        }
    }
}

/// Serializer from [`Document`] to reStructuredText.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RstSerializer {
    options: RstOptions,
}

impl RstSerializer {
    /// Create a serializer with default options
    #[inline]
    #[must_use = "returns a new serializer"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a serializer with custom options
    #[inline]
    #[must_use = "returns a new serializer"]
    pub const fn with_options(options: RstOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[inline]
    #[must_use = "returns the serializer options"]
    pub const fn options(&self) -> &RstOptions {
        &self.options
    }

    /// Render a whole document.
    ///
    /// An empty document renders to the empty string.
    #[must_use = "returns the rendered reStructuredText"]
    pub fn serialize(&self, doc: &Document) -> String {
        let mut blocks = self.render_blocks(&doc.items);

        for body in &doc.footnotes {
            let text = render_inlines(body);
            if text.is_empty() {
                blocks.push(".. [#]".to_string());
            } else {
                blocks.push(format!(".. [#] {text}"));
            }
        }

        if blocks.is_empty() {
            return String::new();
        }

        let mut out = blocks.join("\n\n");
        out.push('\n');
        out
    }

    /// Render a block sequence; empty blocks are dropped.
    fn render_blocks(&self, items: &[DocItem]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| {
                let rendered = self.render_block(item);
                if rendered.is_none() {
                    trace!("dropping empty {} block", item.kind());
                }
                rendered
            })
            .collect()
    }

    fn render_body(&self, items: &[DocItem]) -> String {
        self.render_blocks(items).join("\n\n")
    }

    fn render_block(&self, item: &DocItem) -> Option<String> {
        match item {
            DocItem::Heading { level, text } => self.render_heading(*level, text),
            DocItem::Label { id } => Some(format!(".. _{id}:")),
            DocItem::Paragraph { content } => render_paragraph(content),
            DocItem::CodeBlock { language, code } => {
                if code.trim().is_empty() {
                    return None;
                }
                let header = match language {
                    Some(lang) if !lang.is_empty() => format!(".. code-block:: {lang}"),
                    _ => "::".to_string(),
                };
                Some(format!("{header}\n\n{}", indent(code, self.options.indent)))
            }
            DocItem::LiteralBlock { text } => {
                if text.trim().is_empty() {
                    return None;
                }
                Some(format!("::\n\n{}", indent(text, self.options.indent)))
            }
            DocItem::List { ordered, items } => self.render_list(*ordered, items),
            DocItem::DefinitionList { entries } => {
                let rendered: Vec<String> = entries
                    .iter()
                    .filter_map(|entry| {
                        let term = entry
                            .terms
                            .iter()
                            .map(|t| render_inlines(t))
                            .filter(|t| !t.is_empty())
                            .collect::<Vec<_>>()
                            .join(", ");
                        if term.is_empty() {
                            return None;
                        }
                        let body = self.render_body(&entry.body);
                        if body.is_empty() {
                            Some(term)
                        } else {
                            Some(format!("{term}\n{}", indent(&body, self.options.indent)))
                        }
                    })
                    .collect();
                if rendered.is_empty() {
                    None
                } else {
                    Some(rendered.join("\n\n"))
                }
            }
            DocItem::Admonition { kind, title, body } => {
                let mut blocks = Vec::new();
                if let Some(title) = title {
                    let title = render_inlines(title);
                    if !title.is_empty() {
                        blocks.push(format!("**{title}**"));
                    }
                }
                blocks.extend(self.render_blocks(body));
                let header = format!(".. {}::", kind.directive());
                if blocks.is_empty() {
                    Some(header)
                } else {
                    Some(format!(
                        "{header}\n\n{}",
                        indent(&blocks.join("\n\n"), self.options.indent)
                    ))
                }
            }
            DocItem::BlockQuote { body, attribution } => {
                let mut text = self.render_body(body);
                if let Some(attribution) = attribution {
                    let attribution = render_inlines(attribution);
                    if !attribution.is_empty() {
                        if !text.is_empty() {
                            text.push_str("\n\n");
                        }
                        text.push_str("-- ");
                        text.push_str(&attribution);
                    }
                }
                if text.is_empty() {
                    None
                } else {
                    Some(indent(&text, self.options.indent))
                }
            }
            DocItem::Table {
                title,
                header_rows,
                rows,
            } => self.render_table(title.as_deref(), *header_rows, rows),
            DocItem::Image { uri, alt, caption } => {
                if uri.is_empty() {
                    return None;
                }
                let pad = " ".repeat(self.options.indent);
                let caption = caption
                    .as_deref()
                    .map(render_inlines)
                    .filter(|c| !c.is_empty());
                let directive = if caption.is_some() { "figure" } else { "image" };
                let mut out = format!(".. {directive}:: {uri}");
                if let Some(alt) = alt.as_deref().filter(|a| !a.is_empty()) {
                    out.push_str(&format!("\n{pad}:alt: {alt}"));
                }
                if let Some(caption) = caption {
                    out.push_str(&format!("\n\n{pad}{caption}"));
                }
                Some(out)
            }
        }
    }

    fn render_heading(&self, level: usize, text: &[Inline]) -> Option<String> {
        let text = render_inlines(text);
        if text.is_empty() {
            return None;
        }
        let width = UnicodeWidthStr::width(text.as_str()).max(1);
        let chars = &self.options.heading_chars;
        let adornment_for = |depth: usize| -> char {
            chars
                .get(depth.min(chars.len().saturating_sub(1)))
                .copied()
                .unwrap_or('=')
        };

        if level == 0 && self.options.title_overline {
            let line: String = std::iter::repeat(adornment_for(0)).take(width).collect();
            return Some(format!("{line}\n{text}\n{line}"));
        }

        let line: String = std::iter::repeat(adornment_for(level.saturating_sub(1)))
            .take(width)
            .collect();
        Some(format!("{text}\n{line}"))
    }

    fn render_list(&self, ordered: bool, items: &[Vec<DocItem>]) -> Option<String> {
        if items.is_empty() {
            return None;
        }
        let marker = if ordered {
            "#. ".to_string()
        } else {
            format!("{} ", self.options.bullet)
        };

        let bodies: Vec<String> = items.iter().map(|item| self.render_body(item)).collect();
        let compact = bodies.iter().all(|b| !b.contains('\n'));

        let rendered: Vec<String> = bodies
            .iter()
            .map(|body| hanging_indent(&marker, body))
            .collect();
        Some(rendered.join(if compact { "\n" } else { "\n\n" }))
    }

    fn render_table(
        &self,
        title: Option<&[Inline]>,
        header_rows: usize,
        rows: &[Vec<Vec<Inline>>],
    ) -> Option<String> {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return None;
        }
        let pad = " ".repeat(self.options.indent);

        let mut out = String::from(".. list-table::");
        if let Some(title) = title.map(render_inlines).filter(|t| !t.is_empty()) {
            out.push(' ');
            out.push_str(&title);
        }
        let header_rows = header_rows.min(rows.len());
        if header_rows > 0 {
            out.push_str(&format!("\n{pad}:header-rows: {header_rows}"));
        }
        out.push('\n');

        for row in rows {
            for col in 0..columns {
                let cell = row
                    .get(col)
                    .map(|c| protect_block_start(render_inlines(c)))
                    .unwrap_or_default();
                let bullet = if col == 0 { "* - " } else { "  - " };
                out.push('\n');
                out.push_str(format!("{pad}{bullet}{cell}").trim_end());
            }
        }
        Some(out)
    }
}

/// Render a paragraph, protecting text that RST would read as block markup.
fn render_paragraph(content: &[Inline]) -> Option<String> {
    let text = render_inlines(content);
    if text.is_empty() {
        return None;
    }
    Some(protect_block_start(text))
}

/// Backslash-escape the first character when the line would otherwise open
/// a list, field list, comment or doctest block.
fn protect_block_start(text: String) -> String {
    if starts_block_markup(&text) {
        format!("\\{text}")
    } else {
        text
    }
}

fn starts_block_markup(text: &str) -> bool {
    const BULLETS: &[&str] = &["-", "+", "\u{2022}", "\u{2023}", "\u{2043}"];
    let first = text.split(' ').next().unwrap_or_default();
    BULLETS.contains(&first)
        || first == ".."
        || first == ">>>"
        || is_enumerator_token(first)
        || is_field_marker(text)
}

/// `1.`, `A)`, `(iv)`, `#.` and the other enumerator forms.
fn is_enumerator_token(word: &str) -> bool {
    let token = match word.strip_prefix('(') {
        Some(inner) => inner.strip_suffix(')'),
        None => word.strip_suffix('.').or_else(|| word.strip_suffix(')')),
    };
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return false;
    };
    let roman = |digits: &str| token.chars().all(|c| digits.contains(c));
    token == "#"
        || token.chars().all(|c| c.is_ascii_digit())
        || (token.len() == 1 && token.chars().all(|c| c.is_ascii_alphabetic()))
        || roman("ivxlcdm")
        || roman("IVXLCDM")
}

/// `:name:` followed by whitespace or the end of the line.
fn is_field_marker(text: &str) -> bool {
    let Some(rest) = text.strip_prefix(':') else {
        return false;
    };
    let Some(end) = rest.find(':') else {
        return false;
    };
    let name = &rest[..end];
    let after = &rest[end + 1..];
    !name.is_empty() && !name.starts_with(' ') && (after.is_empty() || after.starts_with(' '))
}

/// Indent every non-blank line; blank lines stay empty.
fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix the first line with `marker` and align continuation lines under it.
fn hanging_indent(marker: &str, body: &str) -> String {
    if body.is_empty() {
        return marker.trim_end().to_string();
    }
    let pad = " ".repeat(marker.len());
    body.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{marker}{line}")
            } else if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape characters that start inline markup in plain text.
///
/// `_` is only escaped where it would end a reference name (`word_ `).
#[must_use = "returns the escaped text"]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(c) = chars.next() {
        match c {
            '\\' | '*' | '`' | '|' => {
                out.push('\\');
                out.push(c);
            }
            '_' => {
                let ends_word = chars.peek().map_or(true, |n| !n.is_alphanumeric() && *n != '_');
                let after_word = prev.is_some_and(char::is_alphanumeric);
                if ends_word && after_word {
                    out.push('\\');
                }
                out.push(c);
            }
            _ => out.push(c),
        }
        prev = Some(c);
    }
    out
}

/// Render inline content to a single line of RST.
#[must_use = "returns the rendered inline text"]
pub fn render_inlines(inlines: &[Inline]) -> String {
    let mut writer = InlineWriter::default();
    for inline in inlines {
        writer.push_inline(inline);
    }
    writer.finish()
}

/// Characters that may directly precede an inline markup start-string.
const OPENING_PUNCT: &[char] = &['-', ':', '/', '\'', '"', '<', '(', '[', '{'];

/// Characters that may directly follow an inline markup end-string.
const CLOSING_PUNCT: &[char] = &[
    '-', '.', ',', ':', ';', '!', '?', '\\', '/', '\'', '"', ')', ']', '}', '>',
];

/// Accumulates inline output and inserts `\ ` where markup would not be
/// recognized next to its neighbours.
#[derive(Debug, Default)]
struct InlineWriter {
    out: String,
    after_markup: bool,
}

impl InlineWriter {
    fn push_inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text(text) => self.push_text(&escape_text(text)),
            Inline::Emphasis(children) => self.push_span("*", children, "*"),
            Inline::Strong(children) => self.push_span("**", children, "**"),
            Inline::Literal(code) => self.push_wrapped("``", code, "``", 0),
            Inline::Subscript(children) => self.push_span(":sub:`", children, "`"),
            Inline::Superscript(children) => self.push_span(":sup:`", children, "`"),
            Inline::Link { text, url } => {
                let label = escape_link_text(&plain_text(text));
                let label = label.trim();
                if label.is_empty() {
                    self.push_markup(&format!("`<{url}>`__"));
                } else {
                    self.push_markup(&format!("`{label} <{url}>`__"));
                }
                self.push_footnote_refs(footnote_refs(text));
            }
            Inline::Reference { text, target } => {
                let label = escape_link_text(&plain_text(text));
                let label = label.trim();
                if label.is_empty() {
                    self.push_markup(&format!(":ref:`{target}`"));
                } else {
                    self.push_markup(&format!(":ref:`{label} <{target}>`"));
                }
                self.push_footnote_refs(footnote_refs(text));
            }
            Inline::FootnoteRef(_) => self.push_markup("[#]_"),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let closes_markup =
            text.starts_with(|c: char| c.is_whitespace() || CLOSING_PUNCT.contains(&c));
        if self.after_markup && !closes_markup {
            self.out.push_str("\\ ");
        }
        self.after_markup = false;
        self.out.push_str(text);
    }

    /// Markup spans cannot nest in RST: the children render as plain text
    /// and any footnote references inside follow the span.
    fn push_span(&mut self, open: &str, children: &[Inline], close: &str) {
        let content = escape_text(&plain_text(children));
        self.push_wrapped(open, &content, close, footnote_refs(children));
    }

    /// Emit `open content close`, keeping edge whitespace outside the markup.
    fn push_wrapped(&mut self, open: &str, content: &str, close: &str, footnotes: usize) {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            self.push_footnote_refs(footnotes);
            self.push_text(content);
            return;
        }
        if content.starts_with(char::is_whitespace) {
            self.push_text(" ");
        }
        self.push_markup(&format!("{open}{trimmed}{close}"));
        self.push_footnote_refs(footnotes);
        if content.ends_with(char::is_whitespace) {
            self.push_text(" ");
        }
    }

    fn push_footnote_refs(&mut self, count: usize) {
        for _ in 0..count {
            self.push_markup("[#]_");
        }
    }

    fn push_markup(&mut self, markup: &str) {
        let opens_markup = self
            .out
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || OPENING_PUNCT.contains(&c));
        if self.after_markup || !opens_markup {
            self.out.push_str("\\ ");
        }
        self.out.push_str(markup);
        self.after_markup = true;
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }
}

/// Footnote references anywhere inside `inlines`, in document order.
fn footnote_refs(inlines: &[Inline]) -> usize {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::FootnoteRef(_) => 1,
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Subscript(children)
            | Inline::Superscript(children)
            | Inline::Link { text: children, .. }
            | Inline::Reference { text: children, .. } => footnote_refs(children),
            Inline::Text(_) | Inline::Literal(_) => 0,
        })
        .sum()
}

/// Link text additionally escapes `<` so it is not read as the target.
fn escape_link_text(text: &str) -> String {
    escape_text(text).replace('<', "\\<")
}
