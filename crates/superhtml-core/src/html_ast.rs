//! Builds an immutable HTML tree from a [`Tokenizer`], validating nesting
//! and attributes against [`crate::elements`] along the way.
//!
//! The tree is a flat array addressed by `u32` index, following the same
//! "index 0 is the null sentinel" convention the tokenizer's teacher uses
//! for its open-elements stack: index 0 holds the root node, and every
//! `parent_idx`/`first_child_idx`/`next_idx` field that would otherwise
//! need an `Option<u32>` uses 0 to mean "none" instead, since nothing but
//! the root ever legitimately sits at index 0.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::doctype::DoctypeInfo;
use crate::elements::{self, ContentModel, ElementInfo, ValidationMode};
use crate::lang::Lang;
use crate::span::Span;
use crate::tokenizer::{Attribute, ParseErrorTag, Token, Tokenizer};

pub const NULL: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Doctype,
    Comment,
    Text,
    Element,
    ElementVoid,
    ElementSelfClosing,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub open: Span,
    pub close: Span,
    pub parent_idx: u32,
    pub first_child_idx: u32,
    pub next_idx: u32,
    /// Tag name span (element/doctype kinds only); empty otherwise.
    pub name_span: Span,
    pub element: Option<&'static ElementInfo>,
    attrs_start: u32,
    attrs_len: u32,
}

impl Node {
    pub fn is_void(&self) -> bool {
        matches!(self.kind, NodeKind::ElementVoid | NodeKind::ElementSelfClosing)
    }

    /// The full span a node occupies in the source, open tag through close
    /// tag inclusive (or just `open` for leaf/void kinds).
    pub fn full_span(&self) -> Span {
        if self.close.is_empty() {
            self.open
        } else {
            self.open.join(self.close)
        }
    }
}

/// HTML-AST-level structural diagnostics. Each carries its own primary
/// span and, where relevant, a related span pointing at the earlier
/// occurrence it conflicts with.
#[derive(Debug, Clone)]
pub enum AstError {
    MissingEndTag { span: Span },
    ErroneousEndTag { span: Span },
    InvalidNesting {
        span: Span,
        related: Span,
        reason: String,
    },
    DuplicateAttributeName { span: Span, first: Span },
    DuplicateClass { span: Span, first: Span },
    DuplicateChild { span: Span, first: Span },
    InvalidHtmlTagName { span: Span },
    UnsupportedDoctype { span: Span },
}

impl AstError {
    pub fn main_location(&self) -> Span {
        match self {
            AstError::MissingEndTag { span }
            | AstError::ErroneousEndTag { span }
            | AstError::InvalidNesting { span, .. }
            | AstError::DuplicateAttributeName { span, .. }
            | AstError::DuplicateClass { span, .. }
            | AstError::DuplicateChild { span, .. }
            | AstError::InvalidHtmlTagName { span }
            | AstError::UnsupportedDoctype { span } => *span,
        }
    }

    pub fn related(&self) -> Option<Span> {
        match self {
            AstError::InvalidNesting { related, .. } => Some(*related),
            AstError::DuplicateAttributeName { first, .. }
            | AstError::DuplicateClass { first, .. }
            | AstError::DuplicateChild { first, .. } => Some(*first),
            _ => None,
        }
    }

    /// Whether this is a warning rather than a hard error. Matches the LSP
    /// severities in `spec.md` §6: `unsupported_doctype`/`duplicate_class`
    /// are warnings, everything else is an error.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            AstError::UnsupportedDoctype { .. } | AstError::DuplicateClass { .. }
        )
    }
}

impl fmt::Display for AstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstError::MissingEndTag { .. } => write!(f, "missing end tag"),
            AstError::ErroneousEndTag { .. } => write!(f, "end tag without a matching start tag"),
            AstError::InvalidNesting { reason, .. } => write!(f, "{reason}"),
            AstError::DuplicateAttributeName { .. } => write!(f, "duplicate attribute"),
            AstError::DuplicateClass { .. } => write!(f, "duplicate class name"),
            AstError::DuplicateChild { .. } => write!(f, "duplicate id"),
            AstError::InvalidHtmlTagName { .. } => write!(f, "unrecognized tag name"),
            AstError::UnsupportedDoctype { .. } => write!(f, "doctype other than <!DOCTYPE html>"),
        }
    }
}

pub struct HtmlAst {
    pub source_len: u32,
    pub lang: Lang,
    pub nodes: Vec<Node>,
    pub attributes: Vec<Attribute>,
    pub doctypes: Vec<(u32, DoctypeInfo)>,
    pub errors: Vec<AstError>,
    pub token_errors: Vec<(ParseErrorTag, Span)>,
}

impl HtmlAst {
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.is_warning()) || !self.token_errors.is_empty()
    }

    pub fn attributes_of(&self, node_idx: u32) -> &[Attribute] {
        let node = &self.nodes[node_idx as usize];
        &self.attributes[node.attrs_start as usize..(node.attrs_start + node.attrs_len) as usize]
    }

    pub fn attribute_value<'a>(
        &self,
        node_idx: u32,
        name: &[u8],
        source: &'a [u8],
    ) -> Option<&'a [u8]> {
        self.attributes_of(node_idx).iter().find_map(|a| {
            if a.name_span.text(source).eq_ignore_ascii_case(name) {
                a.value.map(|v| v.span.text(source))
            } else {
                None
            }
        })
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Returns the innermost node whose span contains `offset`.
    pub fn find_node_containing(&self, offset: u32) -> Option<u32> {
        let mut best: Option<(u32, u32)> = None; // (idx, span length)
        for (idx, node) in self.nodes.iter().enumerate() {
            if idx == 0 {
                continue;
            }
            let span = node.full_span();
            if span.start <= offset && offset < span.end {
                let len = span.len();
                if best.map(|(_, best_len)| len < best_len).unwrap_or(true) {
                    best = Some((idx as u32, len));
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Returns the element whose open *or* close tag span contains
    /// `offset` — used for rename/highlight/linked-editing requests.
    pub fn find_node_tags_at(&self, offset: u32) -> Option<u32> {
        self.nodes.iter().enumerate().find_map(|(idx, node)| {
            if idx != 0
                && (node.open.contains_inclusive(offset) || node.close.contains_inclusive(offset))
            {
                Some(idx as u32)
            } else {
                None
            }
        })
    }

    pub fn description_at(&self, offset: u32, source: &[u8]) -> Option<String> {
        let idx = self.find_node_containing(offset)?;
        let node = &self.nodes[idx as usize];
        match node.kind {
            NodeKind::Element | NodeKind::ElementVoid | NodeKind::ElementSelfClosing => {
                let name = node.name_span.text(source);
                let name = String::from_utf8_lossy(name);
                Some(format!("The <{name}> element."))
            }
            NodeKind::Doctype => Some("A document type declaration.".to_string()),
            NodeKind::Comment => Some("A comment.".to_string()),
            _ => None,
        }
    }

    /// Candidate element or attribute names for the position at `offset`,
    /// for editor completion.
    pub fn completions_at(&self, offset: u32, source: &[u8]) -> Vec<String> {
        for (idx, node) in self.nodes.iter().enumerate() {
            if idx == 0 {
                continue;
            }
            if node.name_span.contains_inclusive(offset) {
                return elements::ELEMENTS.iter().map(|e| e.name.to_string()).collect();
            }
            for attr in self.attributes_of(idx as u32) {
                if attr.name_span.contains_inclusive(offset) {
                    let mut names: Vec<String> =
                        elements::GLOBAL_ATTRIBUTES.iter().map(|a| a.to_string()).collect();
                    if let Some(info) = node.element {
                        names.extend(info.attributes.iter().map(|a| a.to_string()));
                    }
                    return names;
                }
            }
            let _ = source;
        }
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Enter,
    Exit,
}

/// Pre/post-order traversal over an [`HtmlAst`]'s flat node array.
pub struct Cursor<'a> {
    ast: &'a HtmlAst,
    idx: u32,
    direction: Direction,
    started: bool,
}

impl<'a> Cursor<'a> {
    fn new(ast: &'a HtmlAst) -> Self {
        Self {
            ast,
            idx: 0,
            direction: Direction::Enter,
            started: false,
        }
    }

    /// Rewinds the cursor to re-enter `idx`, used to replay a loop body.
    pub fn move_to(&mut self, idx: u32) {
        self.idx = idx;
        self.direction = Direction::Enter;
        self.started = true;
    }

    pub fn next(&mut self) -> Option<(u32, Direction)> {
        if !self.started {
            self.started = true;
            return Some((0, Direction::Enter));
        }

        let node = &self.ast.nodes[self.idx as usize];
        match self.direction {
            Direction::Enter => {
                if node.first_child_idx != NULL && !node.is_void() {
                    self.idx = node.first_child_idx;
                    self.direction = Direction::Enter;
                    Some((self.idx, Direction::Enter))
                } else {
                    self.direction = Direction::Exit;
                    Some((self.idx, Direction::Exit))
                }
            }
            Direction::Exit => {
                if self.idx == 0 {
                    return None;
                }
                if node.next_idx != NULL {
                    self.idx = node.next_idx;
                    self.direction = Direction::Enter;
                    Some((self.idx, Direction::Enter))
                } else {
                    self.idx = node.parent_idx;
                    self.direction = Direction::Exit;
                    Some((self.idx, Direction::Exit))
                }
            }
        }
    }
}

struct Frame {
    node_idx: u32,
    last_child_idx: u32,
}

struct Builder<'a> {
    source: &'a [u8],
    lang: Lang,
    mode: ValidationMode,
    nodes: Vec<Node>,
    attributes: Vec<Attribute>,
    doctypes: Vec<(u32, DoctypeInfo)>,
    errors: Vec<AstError>,
    token_errors: Vec<(ParseErrorTag, Span)>,
    stack: Vec<Frame>,
    seen_ids: FxHashMap<Box<[u8]>, Span>,
}

impl<'a> Builder<'a> {
    fn new(source: &'a [u8], lang: Lang, mode: ValidationMode) -> Self {
        let root = Node {
            kind: NodeKind::Root,
            open: Span::default(),
            close: Span::default(),
            parent_idx: NULL,
            first_child_idx: NULL,
            next_idx: NULL,
            name_span: Span::default(),
            element: None,
            attrs_start: 0,
            attrs_len: 0,
        };
        Self {
            source,
            lang,
            mode,
            nodes: vec![root],
            attributes: Vec::new(),
            doctypes: Vec::new(),
            errors: Vec::new(),
            token_errors: Vec::new(),
            stack: vec![Frame {
                node_idx: 0,
                last_child_idx: NULL,
            }],
            seen_ids: FxHashMap::default(),
        }
    }

    fn top(&self) -> &Frame {
        self.stack.last().expect("root frame always present")
    }

    fn top_element(&self) -> Option<&'static ElementInfo> {
        self.nodes[self.top().node_idx as usize].element
    }

    fn append_child(&mut self, node: Node) -> u32 {
        let idx = self.nodes.len() as u32;
        self.nodes.push(node);
        let parent_idx = self.top().node_idx;
        self.nodes[idx as usize].parent_idx = parent_idx;

        let last = self.top().last_child_idx;
        if last == NULL {
            self.nodes[parent_idx as usize].first_child_idx = idx;
        } else {
            self.nodes[last as usize].next_idx = idx;
        }
        self.stack.last_mut().unwrap().last_child_idx = idx;
        idx
    }

    fn check_nesting(&mut self, child_name_lower: &[u8], child_info: Option<&ElementInfo>, child_open: Span) {
        let Some(parent) = self.top_element() else {
            return; // root, or an unknown element with no recorded content model
        };
        let reason = match parent.content_model {
            ContentModel::None => Some(format!("{} cannot contain children", parent.name)),
            ContentModel::Metadata => {
                let ok = child_info.map(|c| !c.is_flow).unwrap_or(false);
                (!ok).then(|| format!("{} can only contain metadata content", parent.name))
            }
            ContentModel::Phrasing => {
                let ok = child_info.map(|c| c.is_phrasing).unwrap_or(true);
                (!ok).then(|| {
                    format!(
                        "{} cannot contain flow content {}",
                        parent.name,
                        child_info.map(|c| c.name).unwrap_or("element")
                    )
                })
            }
            ContentModel::Flow => None,
            ContentModel::Only(allowed) => {
                let ok = allowed.iter().any(|a| a.as_bytes() == child_name_lower);
                (!ok).then(|| format!("{} can only contain {}", parent.name, allowed.join(", ")))
            }
        };
        if let Some(reason) = reason {
            let parent_span = self.nodes[self.top().node_idx as usize].open;
            self.errors.push(AstError::InvalidNesting {
                span: child_open,
                related: parent_span,
                reason,
            });
        }
    }

    fn process_attributes(&mut self, tag: &crate::tokenizer::TagToken) -> (u32, u32) {
        let start = self.attributes.len() as u32;
        let mut seen_names: FxHashMap<Vec<u8>, Span> = FxHashMap::default();
        let mut seen_classes: FxHashMap<Vec<u8>, Span> = FxHashMap::default();

        for attr in tag.attributes(self.source) {
            let name_lower = attr.name_span.text(self.source).to_ascii_lowercase();
            if let Some(&first) = seen_names.get(&name_lower) {
                self.errors.push(AstError::DuplicateAttributeName {
                    span: attr.name_span,
                    first,
                });
            } else {
                seen_names.insert(name_lower.clone(), attr.name_span);
            }

            if name_lower == b"class" {
                if let Some(value) = attr.value {
                    let text = value.span.text(self.source);
                    let mut offset = value.span.start;
                    for token in text.split(|&b| b == b' ') {
                        if !token.is_empty() {
                            let token_span = Span::new(offset, offset + token.len() as u32);
                            if let Some(&first) = seen_classes.get(token) {
                                self.errors.push(AstError::DuplicateClass {
                                    span: token_span,
                                    first,
                                });
                            } else {
                                seen_classes.insert(token.to_vec(), token_span);
                            }
                        }
                        offset += token.len() as u32 + 1;
                    }
                }
            }

            if name_lower == b"id" {
                if let Some(value) = attr.value {
                    let id_bytes = value.span.text(self.source).to_vec();
                    if let Some(&first) = self.seen_ids.get(id_bytes.as_slice()) {
                        self.errors.push(AstError::DuplicateChild {
                            span: attr.name_span,
                            first,
                        });
                    } else {
                        self.seen_ids.insert(id_bytes.into_boxed_slice(), attr.name_span);
                    }
                }
            }

            self.attributes.push(attr);
        }

        (start, self.attributes.len() as u32 - start)
    }

    fn handle_start_or_self_closing(&mut self, tag: crate::tokenizer::TagToken, token_is_self_closing: bool) {
        let lower_name = tag.name_span.text(self.source).to_ascii_lowercase();
        let element = elements::lookup(&lower_name);

        if element.is_none() && !self.mode.accepts_unknown_tag(&lower_name) {
            self.errors.push(AstError::InvalidHtmlTagName {
                span: tag.name_span,
            });
        }

        self.check_nesting(&lower_name, element, tag.name_span);

        let (attrs_start, attrs_len) = self.process_attributes(&tag);

        let is_void = element.map(|e| e.void).unwrap_or(false);
        let kind = if is_void {
            NodeKind::ElementVoid
        } else if token_is_self_closing {
            NodeKind::ElementSelfClosing
        } else {
            NodeKind::Element
        };

        let close = if matches!(kind, NodeKind::ElementVoid | NodeKind::ElementSelfClosing) {
            Span::at(tag.span.end)
        } else {
            Span::default()
        };

        let node = Node {
            kind,
            open: tag.span,
            close,
            parent_idx: NULL,
            first_child_idx: NULL,
            next_idx: NULL,
            name_span: tag.name_span,
            element,
            attrs_start,
            attrs_len,
        };
        let idx = self.append_child(node);

        if matches!(kind, NodeKind::Element) {
            self.stack.push(Frame {
                node_idx: idx,
                last_child_idx: NULL,
            });
        }
    }

    fn handle_end_tag(&mut self, tag: crate::tokenizer::TagToken) {
        let lower_name = tag.name_span.text(self.source).to_ascii_lowercase();

        let mut target_depth = None;
        for (depth, frame) in self.stack.iter().enumerate().skip(1).rev() {
            let node = &self.nodes[frame.node_idx as usize];
            if node.name_span.text(self.source).eq_ignore_ascii_case(&lower_name) {
                target_depth = Some(depth);
                break;
            }
        }

        let Some(target_depth) = target_depth else {
            self.errors.push(AstError::ErroneousEndTag { span: tag.span });
            return;
        };

        while self.stack.len() - 1 > target_depth {
            let frame = self.stack.pop().unwrap();
            let open_span = self.nodes[frame.node_idx as usize].open;
            self.errors.push(AstError::MissingEndTag { span: open_span });
        }

        let frame = self.stack.pop().unwrap();
        self.nodes[frame.node_idx as usize].close = tag.span;
    }

    fn finish(mut self) -> HtmlAst {
        while self.stack.len() > 1 {
            let frame = self.stack.pop().unwrap();
            let open_span = self.nodes[frame.node_idx as usize].open;
            self.errors.push(AstError::MissingEndTag { span: open_span });
        }

        HtmlAst {
            source_len: self.source.len() as u32,
            lang: self.lang,
            nodes: self.nodes,
            attributes: self.attributes,
            doctypes: self.doctypes,
            errors: self.errors,
            token_errors: self.token_errors,
        }
    }
}

/// Parses `source` into an [`HtmlAst`], collecting diagnostics rather than
/// aborting on the first error.
pub fn build(source: &[u8], lang: Lang, mode: ValidationMode) -> HtmlAst {
    let mut builder = Builder::new(source, lang, mode);
    let mut tokenizer = Tokenizer::new(source, lang);

    while let Some(token) = tokenizer.next() {
        match token {
            Token::Doctype(d) => {
                let node = Node {
                    kind: NodeKind::Doctype,
                    open: d.span,
                    close: Span::default(),
                    parent_idx: NULL,
                    first_child_idx: NULL,
                    next_idx: NULL,
                    name_span: d.name_span.unwrap_or_default(),
                    element: None,
                    attrs_start: 0,
                    attrs_len: 0,
                };
                let idx = builder.append_child(node);

                let text = d.span.text(source);
                if !text.eq_ignore_ascii_case(b"<!DOCTYPE html>") {
                    builder
                        .errors
                        .push(AstError::UnsupportedDoctype { span: d.span });
                }
                if let Some(info) = DoctypeInfo::from_doctype_token(text) {
                    builder.doctypes.push((idx, info));
                }
            }
            Token::Comment(span) => {
                builder.append_child(Node {
                    kind: NodeKind::Comment,
                    open: span,
                    close: Span::default(),
                    parent_idx: NULL,
                    first_child_idx: NULL,
                    next_idx: NULL,
                    name_span: Span::default(),
                    element: None,
                    attrs_start: 0,
                    attrs_len: 0,
                });
            }
            Token::Text(span) => {
                builder.append_child(Node {
                    kind: NodeKind::Text,
                    open: span,
                    close: Span::default(),
                    parent_idx: NULL,
                    first_child_idx: NULL,
                    next_idx: NULL,
                    name_span: Span::default(),
                    element: None,
                    attrs_start: 0,
                    attrs_len: 0,
                });
            }
            Token::StartTag(tag) => builder.handle_start_or_self_closing(tag, false),
            Token::SelfClosingTag(tag) => builder.handle_start_or_self_closing(tag, true),
            Token::EndTag(tag) => builder.handle_end_tag(tag),
            Token::ParseError(tag, span) => builder.token_errors.push((tag, span)),
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_document_has_no_errors() {
        let source = b"<!DOCTYPE html><html><body>hi</body></html>";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        assert!(!ast.has_errors(), "{:?}", ast.errors);
    }

    #[test]
    fn void_and_self_closing_elements_have_empty_close_spans() {
        let source = b"<img src=\"a\"><br/>";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        assert!(!ast.has_errors());
        let img = &ast.nodes[1];
        let br = &ast.nodes[2];
        assert_eq!(img.kind, NodeKind::ElementVoid);
        assert!(img.close.is_empty());
        assert_eq!(br.kind, NodeKind::ElementSelfClosing);
        assert!(br.close.is_empty());
    }

    #[test]
    fn invalid_nesting_flags_div_inside_p() {
        let source = b"<p><div>x</div></p>";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        let nesting_errors: Vec<_> = ast
            .errors
            .iter()
            .filter(|e| matches!(e, AstError::InvalidNesting { .. }))
            .collect();
        assert_eq!(nesting_errors.len(), 1);
        match nesting_errors[0] {
            AstError::InvalidNesting { span, .. } => {
                assert_eq!(span.text(source), b"div");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn duplicate_attribute_name_points_at_the_second_occurrence() {
        let source = b"<div id=\"a\" id=\"b\"></div>";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        let dup = ast
            .errors
            .iter()
            .find_map(|e| match e {
                AstError::DuplicateAttributeName { span, first } => Some((*span, *first)),
                _ => None,
            })
            .expect("expected a duplicate attribute diagnostic");
        assert_eq!(dup.0.text(source), b"id");
        assert!(dup.1.end < dup.0.start);
    }

    #[test]
    fn erroneous_end_tag_is_reported_and_discarded() {
        let source = b"<div>hi</span></div>";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        assert!(ast
            .errors
            .iter()
            .any(|e| matches!(e, AstError::ErroneousEndTag { .. })));
        // The div's own close is still recorded despite the bogus </span>.
        assert!(!ast.nodes[1].close.is_empty());
    }

    #[test]
    fn missing_end_tag_is_reported_for_unclosed_elements() {
        let source = b"<div><span>hi</div>";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        assert!(ast
            .errors
            .iter()
            .any(|e| matches!(e, AstError::MissingEndTag { .. })));
    }

    #[test]
    fn unsupported_doctype_is_a_warning() {
        let source = b"<!DOCTYPE html PUBLIC \"x\">";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        let err = ast
            .errors
            .iter()
            .find(|e| matches!(e, AstError::UnsupportedDoctype { .. }))
            .unwrap();
        assert!(err.is_warning());
        assert!(!ast.has_errors());
    }

    #[test]
    fn invalid_html_tag_name_flagged_in_standard_mode_only() {
        let source = b"<frobnicate></frobnicate>";
        let standard = build(source, Lang::Html, ValidationMode::Standard);
        assert!(standard
            .errors
            .iter()
            .any(|e| matches!(e, AstError::InvalidHtmlTagName { .. })));

        let off = build(source, Lang::Html, ValidationMode::Off);
        assert!(!off
            .errors
            .iter()
            .any(|e| matches!(e, AstError::InvalidHtmlTagName { .. })));
    }

    #[test]
    fn cursor_visits_nodes_in_document_order() {
        let source = b"<div><span>a</span></div>";
        let ast = build(source, Lang::Html, ValidationMode::Standard);
        let mut cursor = ast.cursor();
        let mut order = Vec::new();
        while let Some((idx, dir)) = cursor.next() {
            order.push((idx, dir));
        }
        assert_eq!(order[0], (0, Direction::Enter));
        assert_eq!(order.last().unwrap(), &(0, Direction::Exit));
    }
}
