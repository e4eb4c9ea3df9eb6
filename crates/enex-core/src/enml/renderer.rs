//! ENML to markdown rendering.
//!
//! The tree is walked pre-order. Each element is classified into a small
//! closed set of kinds; the kind decides what is emitted before the element's
//! content, whether its content is rendered at all, and what is emitted after
//! it. Everything that is not a link, `<div>` or `<br>` is a plain container.

use super::parser::EnmlParser;
use crate::error::RenderError;
use crate::tree::ElementNode;

/// Maximum number of consecutive blank lines in rendered output.
const MAX_BLANK_LINES: usize = 2;

/// Render an ENML body to markdown.
///
/// # Errors
///
/// Returns an error if the body is not well-formed or its root is not
/// `<en-note>`.
///
/// # Examples
///
/// ```
/// let md = enex_core::render(r#"<en-note><a href="http://x.com">X</a></en-note>"#)?;
/// assert_eq!(md, "[X](http://x.com)");
/// # Ok::<(), enex_core::RenderError>(())
/// ```
pub fn render(enml: &str) -> Result<String, RenderError> {
    EnmlRenderer::new().render(enml)
}

/// Renders ENML bodies to markdown text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnmlRenderer {
    parser: EnmlParser,
}

impl EnmlRenderer {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: EnmlParser::new(),
        }
    }

    /// Parse and render an ENML body.
    ///
    /// # Errors
    ///
    /// See [`render`].
    pub fn render(&self, enml: &str) -> Result<String, RenderError> {
        let root = self.parser.parse(enml)?;
        Ok(self.render_tree(&root))
    }

    /// Render an already parsed tree. The root tag is not checked.
    #[must_use]
    pub fn render_tree(&self, root: &ElementNode) -> String {
        let mut lines = Vec::new();
        render_element(root, &mut lines);
        collapse_blank_lines(lines).join("\n")
    }
}

/// ENML element kinds with special rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Link,
    Paragraph,
    LineBreak,
    Generic,
}

impl ElementKind {
    fn of(element: &ElementNode) -> Self {
        match element.tag.as_str() {
            "a" => Self::Link,
            "div" => Self::Paragraph,
            "br" => Self::LineBreak,
            _ => Self::Generic,
        }
    }

    /// Decide how an element of this kind is rendered.
    fn visit(self, element: &ElementNode) -> Visit {
        match self {
            // The whole link subtree collapses into one line
            Self::Link => Visit {
                descend: false,
                before: link_line(element).into_iter().collect(),
                after: Vec::new(),
            },
            Self::Paragraph => Visit {
                descend: true,
                before: blank_lines(),
                after: blank_lines(),
            },
            // Markdown has no single line break, so <br> becomes a paragraph gap
            Self::LineBreak => Visit {
                descend: true,
                before: Vec::new(),
                after: blank_lines(),
            },
            Self::Generic => Visit {
                descend: true,
                before: Vec::new(),
                after: Vec::new(),
            },
        }
    }
}

/// Lines emitted around an element and whether its content is rendered.
struct Visit {
    descend: bool,
    before: Vec<String>,
    after: Vec<String>,
}

fn render_element(element: &ElementNode, lines: &mut Vec<String>) {
    let visit = ElementKind::of(element).visit(element);

    lines.extend(visit.before);
    if visit.descend {
        push_trimmed(lines, &element.text);
        for child in &element.children {
            render_element(child, lines);
        }
    }
    lines.extend(visit.after);
    push_trimmed(lines, &element.tail);
}

/// `[text](url)` for a link with a usable href.
///
/// A missing or blank href yields nothing, even when the link has text. A
/// link without text uses its url as the text.
fn link_line(element: &ElementNode) -> Option<String> {
    let url = element.attr("href").map(str::trim).filter(|url| !url.is_empty())?;
    let text = element.text.trim();
    let text = if text.is_empty() { url } else { text };
    Some(format!("[{text}]({url})"))
}

fn blank_lines() -> Vec<String> {
    vec![String::new(); MAX_BLANK_LINES]
}

fn push_trimmed(lines: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(text.to_owned());
    }
}

/// Shorten every run of blank lines to at most [`MAX_BLANK_LINES`].
fn collapse_blank_lines(lines: Vec<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(lines.len());
    let mut blank_run = 0;
    for line in lines {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > MAX_BLANK_LINES {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push(line);
    }
    result
}
