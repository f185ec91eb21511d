//! Presentation and code-action layer over the error types produced by
//! [`crate::html_ast`] and [`crate::template_ast`].
//!
//! This module owns nothing an LSP server couldn't reconstruct itself —
//! it exists so every host (CLI, LSP, tests) formats `file:row:col`
//! snippets and derives code actions the same way, instead of each
//! reimplementing span→position math.

use crate::elements;
use crate::html_ast::{AstError, HtmlAst, NodeKind};
use crate::span::Span;
use crate::template_ast::TemplateError;

/// Either a secondary span, or — for taxa whose "related" information
/// isn't itself a location (e.g. a plain-text reason) — a string. Every
/// current taxon in this crate carries a span when it has a related
/// entry at all, so this stays a thin wrapper rather than gaining a text
/// variant prematurely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Related {
    pub span: Span,
}

/// A presentable diagnostic: the kebab-case tag from `spec.md`'s
/// taxonomy, a primary span, an optional related span, and a
/// human-readable message (the `Display` text of the source error).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub tag: String,
    pub message: String,
    pub main_location: Span,
    pub related: Option<Related>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

fn ast_error_tag(err: &AstError) -> &'static str {
    match err {
        AstError::MissingEndTag { .. } => "missing_end_tag",
        AstError::ErroneousEndTag { .. } => "erroneous_end_tag",
        AstError::InvalidNesting { .. } => "invalid_nesting",
        AstError::DuplicateAttributeName { .. } => "duplicate_attribute_name",
        AstError::DuplicateClass { .. } => "duplicate_class",
        AstError::DuplicateChild { .. } => "duplicate_child",
        AstError::InvalidHtmlTagName { .. } => "invalid_html_tag_name",
        AstError::UnsupportedDoctype { .. } => "unsupported_doctype",
    }
}

impl From<&AstError> for Diagnostic {
    fn from(err: &AstError) -> Self {
        Diagnostic {
            tag: ast_error_tag(err).to_string(),
            message: err.to_string(),
            main_location: err.main_location(),
            related: err.related().map(|span| Related { span }),
            severity: if err.is_warning() { Severity::Warning } else { Severity::Error },
        }
    }
}

impl From<&TemplateError> for Diagnostic {
    fn from(err: &TemplateError) -> Self {
        // `TemplateError`'s own `Display` already yields the tag slug
        // (see `template_ast.rs`); there's no separate human-readable
        // message to prefer over it.
        let tag = err.to_string();
        Diagnostic {
            message: tag.replace('-', " "),
            tag,
            main_location: err.main_location(),
            related: err.related().map(|span| Related { span }),
            severity: Severity::Error,
        }
    }
}

/// Converts a byte offset into a `path:row:col` string for terminal/LSP
/// style presentation.
pub fn locate(path: &str, source: &[u8], offset: u32) -> String {
    let (row, col) = Span::row_col(source, offset);
    format!("{path}:{row}:{col}")
}

/// Renders a multi-line snippet around `span` with a caret range under
/// the offending bytes, the shape terminal diagnostics use.
pub fn render_snippet(source: &[u8], span: Span) -> String {
    let (start_row, start_col) = Span::row_col(source, span.start);
    let line_start = source[..span.start as usize]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let line_end = source[span.start as usize..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| span.start as usize + i)
        .unwrap_or(source.len());
    let line = String::from_utf8_lossy(&source[line_start..line_end]);
    let caret_len = if span.is_empty() { 1 } else { (span.end.min(line_end as u32) - span.start).max(1) } as usize;
    let mut out = String::new();
    out.push_str(&format!("{start_row} | {line}\n"));
    out.push_str(&" ".repeat(format!("{start_row} | ").len() + (start_col as usize - 1)));
    out.push_str(&"^".repeat(caret_len));
    out
}

/// A proposed fix, paired with human-readable `title` text per the LSP
/// `CodeAction` shape.
#[derive(Debug, Clone)]
pub struct CodeAction {
    pub title: String,
    pub edits: Vec<TextEdit>,
}

#[derive(Debug, Clone)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

/// `invalid_html_tag_name` fix: offers to replace the tag name with
/// `div`. Returns both the open and close name-span edits when the
/// element isn't void and has a proper closing tag — editing only one
/// side would leave the document unbalanced.
pub fn fix_invalid_tag_name(html: &HtmlAst, node_idx: u32) -> Option<CodeAction> {
    let node = &html.nodes[node_idx as usize];
    if !matches!(node.kind, NodeKind::Element | NodeKind::ElementVoid | NodeKind::ElementSelfClosing) {
        return None;
    }
    let mut edits = vec![TextEdit { span: node.name_span, replacement: "div".to_string() }];
    if !node.is_void() && !node.close.is_empty() {
        // The close tag's name sits right after `</`.
        let close_name_start = node.close.start + 2;
        let close_name_end = node.close.end.saturating_sub(1);
        edits.push(TextEdit { span: Span::new(close_name_start, close_name_end), replacement: "div".to_string() });
    }
    Some(CodeAction { title: "Replace with 'div'".to_string(), edits })
}

/// Rename support: the open-tag-name span, and the close-tag-name span
/// when the element has one, for the element containing `offset`.
pub fn rename_spans(html: &HtmlAst, offset: u32) -> Option<(Span, Option<Span>)> {
    let node_idx = find_node_tags_at(html, offset)?;
    let node = &html.nodes[node_idx as usize];
    let close = if node.close.is_empty() {
        None
    } else {
        let start = node.close.start + 2;
        let end = node.close.end.saturating_sub(1);
        Some(Span::new(start, end))
    };
    Some((node.name_span, close))
}

fn find_node_tags_at(html: &HtmlAst, offset: u32) -> Option<u32> {
    html.nodes.iter().enumerate().skip(1).find_map(|(idx, node)| {
        let tags_contain = node.open.contains_inclusive(offset)
            || (!node.close.is_empty() && node.close.contains_inclusive(offset));
        tags_contain.then_some(idx as u32)
    })
}

/// References on a `class` token: scans every `class` attribute value in
/// the document, tokenizes by ASCII space, and returns the span of every
/// exact match.
pub fn class_token_references(html: &HtmlAst, source: &[u8], token: &str) -> Vec<Span> {
    let mut out = Vec::new();
    for idx in 1..html.nodes.len() {
        for attr in html.attributes_of(idx as u32) {
            if !attr.name_span.text(source).eq_ignore_ascii_case(b"class") {
                continue;
            }
            let Some(value) = attr.value else { continue };
            let text = value.span.text(source);
            let mut pos = value.span.start;
            for piece in text.split(|&b| b == b' ') {
                let piece_start = pos;
                pos += piece.len() as u32 + 1;
                if piece == token.as_bytes() {
                    out.push(Span::new(piece_start, piece_start + piece.len() as u32));
                }
            }
        }
    }
    out
}

/// Description text for the element under `offset`, per `spec.md` §4.2's
/// `description(offset)` — delegates straight to the element table,
/// since that is the only source of prose this crate has.
pub fn describe(html: &HtmlAst, source: &[u8], offset: u32) -> Option<String> {
    let node_idx = find_node_tags_at(html, offset)?;
    let node = &html.nodes[node_idx as usize];
    let info = node.element.copied().or_else(|| elements::lookup(node.name_span.text(source)).copied());
    info.map(|i| format!("<{}>: {:?} content model", i.name, i.content_model))
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
    fn ast_error_carries_its_tag_and_severity() {
        let src: &[u8] = b"<p><div>x</div></p>";
        let html = parse(src);
        let diags: Vec<Diagnostic> = html.errors.iter().map(Diagnostic::from).collect();
        assert!(diags.iter().any(|d| d.tag == "invalid_nesting" && d.severity == Severity::Error));
    }

    #[test]
    fn unsupported_doctype_is_a_warning() {
        let src: &[u8] = b"<!DOCTYPE html SYSTEM \"about:legacy-compat\"><div></div>";
        let html = parse(src);
        let diags: Vec<Diagnostic> = html.errors.iter().map(Diagnostic::from).collect();
        assert!(diags.iter().any(|d| d.tag == "unsupported_doctype" && d.severity == Severity::Warning));
    }

    #[test]
    fn class_references_find_exact_token_matches() {
        let src: &[u8] = b"<div class=\"a b\"></div><span class=\"b c\"></span>";
        let html = parse(src);
        let spans = class_token_references(&html, src, "b");
        assert_eq!(spans.len(), 2);
        for span in spans {
            assert_eq!(span.text(src), b"b");
        }
    }

    #[test]
    fn fix_invalid_tag_name_edits_both_tags() {
        let src: &[u8] = b"<foo>x</foo>";
        let html = parse(src);
        let action = fix_invalid_tag_name(&html, 1).unwrap();
        assert_eq!(action.edits.len(), 2);
        assert_eq!(action.title, "Replace with 'div'");
    }

    #[test]
    fn locate_reports_one_indexed_row_col() {
        let src: &[u8] = b"<div>\n<p>x</p>\n</div>";
        assert_eq!(locate("f.html", src, 6), "f.html:2:1");
    }
}
