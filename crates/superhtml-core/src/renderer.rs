//! Canonical pretty-printer for an [`HtmlAst`]: normalizes quoting and
//! indentation while leaving attribute order, raw-text bodies, comments
//! and doctypes untouched.
//!
//! Error-gated per `spec.md` §4.4 — callers must check
//! [`HtmlAst::has_errors`] themselves; [`render`] refuses to guess at a
//! canonical form for a tree that failed to parse cleanly.

use crate::html_ast::{Direction, HtmlAst, Node, NodeKind};
use crate::span::Span;
use crate::tokenizer::{Attribute, QuoteStyle};

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotRendered;

impl std::fmt::Display for NotRendered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "refusing to render an AST with outstanding errors")
    }
}

/// Renders `html` back to canonical source text. Returns [`NotRendered`]
/// if `html` carries any non-warning error — rendering a tree the parser
/// itself couldn't make sense of would just manufacture plausible-looking
/// garbage.
pub fn render(html: &HtmlAst, source: &[u8]) -> Result<String, NotRendered> {
    if html.has_errors() {
        return Err(NotRendered);
    }
    let mut printer = Printer {
        html,
        source,
        out: String::new(),
        depth: -1,
        last_was_inline_text: false,
    };
    let mut cursor = html.cursor();
    while let Some((idx, dir)) = cursor.next() {
        if idx == 0 {
            continue;
        }
        let node = &html.nodes[idx as usize];
        match dir {
            Direction::Enter => {
                printer.enter(idx, node);
                if is_block_like(node) {
                    printer.depth += 1;
                }
            }
            Direction::Exit => {
                if is_block_like(node) {
                    printer.depth -= 1;
                }
                printer.exit(node);
            }
        }
    }
    let mut out = printer.out;
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

struct Printer<'a> {
    html: &'a HtmlAst,
    source: &'a [u8],
    out: String,
    depth: i32,
    last_was_inline_text: bool,
}

impl<'a> Printer<'a> {
    fn newline_indent(&mut self) {
        let depth = self.depth.max(0);
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    fn enter(&mut self, idx: u32, node: &Node) {
        match node.kind {
            NodeKind::Doctype | NodeKind::Comment => {
                self.newline_indent();
                self.out.push_str(&String::from_utf8_lossy(node.open.text(self.source)));
                self.last_was_inline_text = false;
            }
            NodeKind::Text => {
                let text = String::from_utf8_lossy(node.open.text(self.source));
                let collapsed = collapse_whitespace(&text);
                if collapsed.is_empty() {
                    return;
                }
                if !self.last_was_inline_text {
                    self.newline_indent();
                } else {
                    self.out.push(' ');
                }
                self.out.push_str(&collapsed);
                self.last_was_inline_text = true;
            }
            NodeKind::Element | NodeKind::ElementVoid | NodeKind::ElementSelfClosing => {
                if is_block_like(node) || !self.last_was_inline_text {
                    self.newline_indent();
                }
                self.render_open_tag(idx, node);
                self.last_was_inline_text = false;
            }
            NodeKind::Root => unreachable!("root is skipped by the driver"),
        }
    }

    fn exit(&mut self, node: &Node) {
        if matches!(node.kind, NodeKind::Element) && !node.close.is_empty() {
            if is_block_like(node) && node.first_child_idx != crate::html_ast::NULL {
                self.newline_indent();
            }
            let name = node.name_span.text(self.source);
            self.out.push_str("</");
            self.out.push_str(&String::from_utf8_lossy(name));
            self.out.push('>');
        }
    }

    fn render_open_tag(&mut self, idx: u32, node: &Node) {
        let name = String::from_utf8_lossy(node.name_span.text(self.source));
        self.out.push('<');
        self.out.push_str(&name);
        for attr in self.html.attributes_of(idx) {
            render_attribute(&mut self.out, self.source, attr);
        }
        if matches!(node.kind, NodeKind::ElementSelfClosing) {
            self.out.push_str(" />");
        } else {
            self.out.push('>');
        }
        if let Some(info) = node.element {
            if info.raw_text_mode != crate::elements::RawTextMode::Off && !node.close.is_empty() {
                let body_start = node.open.end;
                let body_end = node.close.start;
                if body_end > body_start {
                    self.out
                        .push_str(&String::from_utf8_lossy(Span::new(body_start, body_end).text(self.source)));
                }
            }
        }
    }
}

fn is_block_like(node: &Node) -> bool {
    match node.kind {
        NodeKind::Element => !node.element.map(|e| e.is_phrasing).unwrap_or(false),
        _ => false,
    }
}

fn render_attribute(out: &mut String, source: &[u8], attr: &Attribute) {
    out.push(' ');
    out.push_str(&String::from_utf8_lossy(attr.name_span.text(source)));
    let Some(value) = attr.value else { return };
    if matches!(value.quote, QuoteStyle::None) && value.span.is_empty() {
        // Boolean-style attribute written with a trailing `=` but no
        // value (`disabled=`) — normalize away the `=`.
        return;
    }
    out.push_str("=\"");
    let raw = value.span.text(source);
    out.push_str(&String::from_utf8_lossy(raw).replace('"', "&quot;"));
    out.push('"');
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ValidationMode;
    use crate::lang::Lang;

    fn parse(source: &[u8]) -> HtmlAst {
        crate::html_ast::build(source, Lang::Html, ValidationMode::Standard)
    }

    #[test]
    fn refuses_to_render_with_errors() {
        let html = parse(b"<div><p>x</div>");
        assert!(html.has_errors());
        assert_eq!(render(&html, b"<div><p>x</div>"), Err(NotRendered));
    }

    #[test]
    fn normalizes_single_quotes_to_double() {
        let src: &[u8] = b"<div class='a'>hi</div>";
        let html = parse(src);
        let rendered = render(&html, src).unwrap();
        assert!(rendered.contains("class=\"a\""));
    }

    #[test]
    fn idempotent_on_already_canonical_input() {
        let src: &[u8] = b"<div>\n  <p>hello</p>\n</div>\n";
        let html1 = parse(src);
        let once = render(&html1, src).unwrap();
        let html2 = parse(once.as_bytes());
        let twice = render(&html2, once.as_bytes()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_raw_text_verbatim() {
        let src: &[u8] = b"<script>if (a < b) { x(); }</script>";
        let html = parse(src);
        let rendered = render(&html, src).unwrap();
        assert!(rendered.contains("if (a < b) { x(); }"));
    }
}
