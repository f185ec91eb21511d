//! Builds the template-construct overlay on top of an [`HtmlAst`]:
//! `extend`/`super`/`ctx`/block discovery, special-attribute validation
//! (`:if`/`:loop`/`:else`/`:text`/`:html`), and the per-template interface
//! the interpreter later stitches extend chains together with.
//!
//! Like `html_ast`, this is a flat array addressed by `u32`, index 0 is
//! the root/null sentinel, and the tree is built once and never mutated
//! by the interpreter afterwards.

use std::fmt;

use crate::html_ast::{self, HtmlAst};
use crate::span::Span;

pub const NULL: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Extend,
    Super,
    Ctx,
    Block,
    SuperBlock,
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    If,
    Loop,
    Text,
    Html,
}

#[derive(Debug, Clone, Copy)]
pub struct SpecialAttr {
    pub kind: SpecialKind,
    /// The attribute's value span (always present for `:if`/`:loop`/
    /// `:text`/`:html`; entity-decoding is deferred to evaluation time).
    pub value: Span,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub depth: u32,
    pub parent_idx: u32,
    pub first_child_idx: u32,
    pub next_idx: u32,
    /// Index of the underlying node in the [`HtmlAst`] this overlays.
    pub elem_idx: u32,
    /// Interpretation depends on `kind`: the `id` value for
    /// `block`/`super_block`, the `template` attribute's value for
    /// `extend`, unused otherwise.
    pub id_template_parentid: Option<Span>,
    pub if_loop: Option<SpecialAttr>,
    pub html_text: Option<SpecialAttr>,
    pub is_else: bool,
    /// Set when this element has at least one plain attribute whose value
    /// begins with `$`, even absent any special attribute.
    pub scripted: bool,
}

#[derive(Debug, Clone)]
pub enum TemplateError {
    ExtendWithoutTemplateAttr { span: Span },
    MissingTemplateValue { span: Span },
    UnexpectedExtend { span: Span },
    TopLevelSuper { span: Span },
    SuperWantsNoAttributes { span: Span },
    SuperParentElementMissingId { span: Span },
    TwoSupersOneId { span: Span, first: Span },
    SuperUnderBranching { span: Span, related: Span },
    BlockMissingId { span: Span },
    BlockWithScriptedId { span: Span },
    TemplateInterfaceIdCollision { span: Span, first: Span },
    DuplicateBlock { span: Span, first: Span },
    ElseMustBeFirstAttr { span: Span },
    ElseWithValue { span: Span },
    OneBranchingAttributePerElement { span: Span },
    TextAndHtmlAreMutuallyExclusive { span: Span },
    TextAndHtmlRequireAnEmptyElement { span: Span },
    MissingAttributeValue { span: Span },
    UnscriptedAttr { span: Span },
    IdUnderLoop { span: Span },
    CtxAttrsMustBeScripted { span: Span },
    /// Not in spec's named taxonomy (explicitly "non-exhaustive"): a
    /// `:if`/`:loop`/`:else` attribute appearing anywhere but first.
    BranchingAttrMustBeFirst { span: Span },
}

impl TemplateError {
    pub fn main_location(&self) -> Span {
        match self {
            TemplateError::ExtendWithoutTemplateAttr { span }
            | TemplateError::MissingTemplateValue { span }
            | TemplateError::UnexpectedExtend { span }
            | TemplateError::TopLevelSuper { span }
            | TemplateError::SuperWantsNoAttributes { span }
            | TemplateError::SuperParentElementMissingId { span }
            | TemplateError::TwoSupersOneId { span, .. }
            | TemplateError::SuperUnderBranching { span, .. }
            | TemplateError::BlockMissingId { span }
            | TemplateError::BlockWithScriptedId { span }
            | TemplateError::TemplateInterfaceIdCollision { span, .. }
            | TemplateError::DuplicateBlock { span, .. }
            | TemplateError::ElseMustBeFirstAttr { span }
            | TemplateError::ElseWithValue { span }
            | TemplateError::OneBranchingAttributePerElement { span }
            | TemplateError::TextAndHtmlAreMutuallyExclusive { span }
            | TemplateError::TextAndHtmlRequireAnEmptyElement { span }
            | TemplateError::MissingAttributeValue { span }
            | TemplateError::UnscriptedAttr { span }
            | TemplateError::IdUnderLoop { span }
            | TemplateError::CtxAttrsMustBeScripted { span }
            | TemplateError::BranchingAttrMustBeFirst { span } => *span,
        }
    }

    pub fn related(&self) -> Option<Span> {
        match self {
            TemplateError::TwoSupersOneId { first, .. }
            | TemplateError::TemplateInterfaceIdCollision { first, .. }
            | TemplateError::DuplicateBlock { first, .. } => Some(*first),
            TemplateError::SuperUnderBranching { related, .. } => Some(*related),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TemplateError::ExtendWithoutTemplateAttr { .. } => "extend-without-template-attr",
            TemplateError::MissingTemplateValue { .. } => "missing-template-value",
            TemplateError::UnexpectedExtend { .. } => "unexpected-extend",
            TemplateError::TopLevelSuper { .. } => "top-level-super",
            TemplateError::SuperWantsNoAttributes { .. } => "super-wants-no-attributes",
            TemplateError::SuperParentElementMissingId { .. } => "super-parent-element-missing-id",
            TemplateError::TwoSupersOneId { .. } => "two-supers-one-id",
            TemplateError::SuperUnderBranching { .. } => "super-under-branching",
            TemplateError::BlockMissingId { .. } => "block-missing-id",
            TemplateError::BlockWithScriptedId { .. } => "block-with-scripted-id",
            TemplateError::TemplateInterfaceIdCollision { .. } => "template-interface-id-collision",
            TemplateError::DuplicateBlock { .. } => "duplicate-block",
            TemplateError::ElseMustBeFirstAttr { .. } => "else-must-be-first-attr",
            TemplateError::ElseWithValue { .. } => "else-with-value",
            TemplateError::OneBranchingAttributePerElement { .. } => {
                "one-branching-attribute-per-element"
            }
            TemplateError::TextAndHtmlAreMutuallyExclusive { .. } => {
                "text-and-html-are-mutually-exclusive"
            }
            TemplateError::TextAndHtmlRequireAnEmptyElement { .. } => {
                "text-and-html-require-an-empty-element"
            }
            TemplateError::MissingAttributeValue { .. } => "missing-attribute-value",
            TemplateError::UnscriptedAttr { .. } => "unscripted-attr",
            TemplateError::IdUnderLoop { .. } => "id-under-loop",
            TemplateError::CtxAttrsMustBeScripted { .. } => "ctx-attrs-must-be-scripted",
            TemplateError::BranchingAttrMustBeFirst { .. } => "branching-attr-must-be-first",
        };
        f.write_str(msg)
    }
}

pub struct TemplateAst {
    pub nodes: Vec<Node>,
    /// Index of the `<extend>` node, or 0 if this template does not extend.
    pub extends_idx: u32,
    /// id → template node index of the `<super>`'s parent element;
    /// populated only when this template is itself extended by another.
    pub interface: Vec<(Box<str>, u32)>,
    /// id → template node index of a top-level block; populated only
    /// when this template extends another.
    pub blocks: Vec<(Box<str>, u32)>,
    pub errors: Vec<TemplateError>,
}

impl TemplateAst {
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn find_block(&self, id: &str) -> Option<u32> {
        self.blocks.iter().find(|(k, _)| k.as_ref() == id).map(|(_, v)| *v)
    }

    pub fn find_interface(&self, id: &str) -> Option<u32> {
        self.interface.iter().find(|(k, _)| k.as_ref() == id).map(|(_, v)| *v)
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }
}

pub use crate::html_ast::Direction;

/// Pre/post-order traversal over a [`TemplateAst`]'s flat node array, the
/// same shape as [`crate::html_ast::Cursor`] — the interpreter's
/// evaluation walk in `spec.md` §4.6 is defined over exactly this kind of
/// forward cursor.
pub struct Cursor<'a> {
    ast: &'a TemplateAst,
    idx: u32,
    direction: Direction,
    started: bool,
}

impl<'a> Cursor<'a> {
    fn new(ast: &'a TemplateAst) -> Self {
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

    pub fn position(&self) -> (u32, Direction) {
        (self.idx, self.direction)
    }

    pub fn next(&mut self) -> Option<(u32, Direction)> {
        if !self.started {
            self.started = true;
            return Some((0, Direction::Enter));
        }

        let node = &self.ast.nodes[self.idx as usize];
        match self.direction {
            Direction::Enter => {
                if node.first_child_idx != NULL {
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

fn is_special_name(name: &[u8]) -> Option<SpecialKindOrElse> {
    match name {
        b":if" => Some(SpecialKindOrElse::Kind(SpecialKind::If)),
        b":loop" => Some(SpecialKindOrElse::Kind(SpecialKind::Loop)),
        b":text" => Some(SpecialKindOrElse::Kind(SpecialKind::Text)),
        b":html" => Some(SpecialKindOrElse::Kind(SpecialKind::Html)),
        b":else" => Some(SpecialKindOrElse::Else),
        _ => None,
    }
}

enum SpecialKindOrElse {
    Kind(SpecialKind),
    Else,
}

fn is_scripted_value(value: &[u8]) -> bool {
    value.first() == Some(&b'$')
}

struct ParsedAttrs {
    if_loop: Option<SpecialAttr>,
    html_text: Option<SpecialAttr>,
    is_else: bool,
    scripted: bool,
    errors: Vec<TemplateError>,
}

fn parse_special_attrs(html: &HtmlAst, html_idx: u32, source: &[u8]) -> ParsedAttrs {
    let attrs = html.attributes_of(html_idx);
    let mut out = ParsedAttrs {
        if_loop: None,
        html_text: None,
        is_else: false,
        scripted: false,
        errors: Vec::new(),
    };

    for (i, attr) in attrs.iter().enumerate() {
        let name = attr.name_span.text(source);
        let lname = name.to_ascii_lowercase();
        let Some(kind) = is_special_name(&lname) else {
            if let Some(value) = attr.value {
                if is_scripted_value(value.span.text(source)) {
                    out.scripted = true;
                }
            }
            continue;
        };

        match kind {
            SpecialKindOrElse::Else => {
                if i != 0 {
                    out.errors.push(TemplateError::ElseMustBeFirstAttr {
                        span: attr.name_span,
                    });
                }
                if attr.value.is_some() {
                    out.errors.push(TemplateError::ElseWithValue {
                        span: attr.name_span,
                    });
                }
                out.is_else = true;
            }
            SpecialKindOrElse::Kind(kind @ (SpecialKind::If | SpecialKind::Loop)) => {
                if i != 0 {
                    out.errors.push(TemplateError::BranchingAttrMustBeFirst {
                        span: attr.name_span,
                    });
                }
                if out.if_loop.is_some() {
                    out.errors.push(TemplateError::OneBranchingAttributePerElement {
                        span: attr.name_span,
                    });
                }
                match attr.value {
                    Some(value) if is_scripted_value(value.span.text(source)) => {
                        out.if_loop = Some(SpecialAttr {
                            kind,
                            value: value.span,
                        });
                    }
                    Some(value) => {
                        out.errors
                            .push(TemplateError::UnscriptedAttr { span: value.span });
                    }
                    None => out
                        .errors
                        .push(TemplateError::MissingAttributeValue { span: attr.name_span }),
                }
            }
            SpecialKindOrElse::Kind(kind @ (SpecialKind::Text | SpecialKind::Html)) => {
                if out.html_text.is_some() {
                    out.errors.push(TemplateError::TextAndHtmlAreMutuallyExclusive {
                        span: attr.name_span,
                    });
                }
                match attr.value {
                    Some(value) if is_scripted_value(value.span.text(source)) => {
                        out.html_text = Some(SpecialAttr {
                            kind,
                            value: value.span,
                        });
                    }
                    Some(value) => {
                        out.errors
                            .push(TemplateError::UnscriptedAttr { span: value.span });
                    }
                    None => out
                        .errors
                        .push(TemplateError::MissingAttributeValue { span: attr.name_span }),
                }
            }
        }
    }

    if out.html_text.is_some() {
        let has_children = html.nodes[html_idx as usize].first_child_idx != html_ast::NULL;
        if has_children {
            let open = html.nodes[html_idx as usize].open;
            out.errors
                .push(TemplateError::TextAndHtmlRequireAnEmptyElement { span: open });
        }
    }

    out
}

fn tag_name_lower(html: &HtmlAst, html_idx: u32, source: &[u8]) -> Vec<u8> {
    html.nodes[html_idx as usize]
        .name_span
        .text(source)
        .to_ascii_lowercase()
}

/// Finds the first element/text/doctype-skipping "significant" top-level
/// child of the HTML AST's root, returning its HTML node index if it is
/// an `<extend>` element.
fn find_leading_extend(html: &HtmlAst, source: &[u8]) -> Option<u32> {
    let mut idx = html.root().first_child_idx;
    while idx != html_ast::NULL {
        let node = &html.nodes[idx as usize];
        match node.kind {
            html_ast::NodeKind::Comment | html_ast::NodeKind::Doctype => {}
            html_ast::NodeKind::Text => {
                if !node.open.text(source).iter().all(|b| b.is_ascii_whitespace()) {
                    return None;
                }
            }
            html_ast::NodeKind::Element
            | html_ast::NodeKind::ElementVoid
            | html_ast::NodeKind::ElementSelfClosing => {
                return if tag_name_lower(html, idx, source) == b"extend" {
                    Some(idx)
                } else {
                    None
                };
            }
            html_ast::NodeKind::Root => unreachable!("root cannot be its own child"),
        }
        idx = node.next_idx;
    }
    None
}

struct TplFrame {
    tpl_idx: u32,
    last_child_idx: u32,
}

struct Builder<'a> {
    html: &'a HtmlAst,
    source: &'a [u8],
    nodes: Vec<Node>,
    errors: Vec<TemplateError>,
    interface: Vec<(Box<str>, u32)>,
    blocks: Vec<(Box<str>, u32)>,
    stack: Vec<TplFrame>,
    /// Whether the frame at the matching html depth pushed a `TplFrame`,
    /// so `Exit` events know whether to pop the real stack.
    kept_flags: Vec<bool>,
    branching_depth: u32,
    loop_depth: u32,
    extend_html_idx: Option<u32>,
    block_mode: bool,
    /// template idx of a parent that already received one `<super>` child,
    /// mapped to that first `<super>`'s own span.
    super_seen: std::collections::HashMap<u32, Span>,
}

impl<'a> Builder<'a> {
    fn top(&self) -> &TplFrame {
        self.stack.last().expect("root frame always present")
    }

    /// The HTML-level open-tag span backing template node `tpl_idx`.
    fn html_open(&self, tpl_idx: u32) -> Span {
        self.html.nodes[self.nodes[tpl_idx as usize].elem_idx as usize].open
    }

    fn append(&mut self, node: Node) -> u32 {
        let idx = self.nodes.len() as u32;
        let parent_idx = self.top().tpl_idx;
        let depth = self.nodes[parent_idx as usize].depth + 1;
        let mut node = node;
        node.parent_idx = parent_idx;
        node.depth = depth;
        self.nodes.push(node);

        let last = self.top().last_child_idx;
        if last == NULL {
            self.nodes[parent_idx as usize].first_child_idx = idx;
        } else {
            self.nodes[last as usize].next_idx = idx;
        }
        self.stack.last_mut().unwrap().last_child_idx = idx;
        idx
    }

    fn visit_enter(&mut self, html_idx: u32) {
        let node = &self.html.nodes[html_idx as usize];
        let is_element = matches!(
            node.kind,
            html_ast::NodeKind::Element
                | html_ast::NodeKind::ElementVoid
                | html_ast::NodeKind::ElementSelfClosing
        );
        if !is_element {
            self.kept_flags.push(false);
            return;
        }

        let lname = tag_name_lower(self.html, html_idx, self.source);
        let parsed = parse_special_attrs(self.html, html_idx, self.source);
        self.errors.extend(parsed.errors);

        let is_top_level = self.stack.len() == 1;
        let is_leading_extend = self.extend_html_idx == Some(html_idx);

        let kind = if lname == b"extend" {
            if !is_leading_extend {
                self.errors
                    .push(TemplateError::UnexpectedExtend { span: node.open });
            }
            NodeKind::Extend
        } else if lname == b"super" {
            NodeKind::Super
        } else if lname == b"ctx" {
            NodeKind::Ctx
        } else if self.block_mode && is_top_level {
            NodeKind::Block
        } else {
            NodeKind::Element
        };

        let keep = !matches!(kind, NodeKind::Element)
            || parsed.if_loop.is_some()
            || parsed.html_text.is_some()
            || parsed.is_else
            || parsed.scripted;

        if !keep {
            self.kept_flags.push(false);
            return;
        }

        let branching = parsed.if_loop.is_some();
        let is_loop = matches!(parsed.if_loop, Some(SpecialAttr { kind: SpecialKind::Loop, .. }));
        if branching {
            self.branching_depth += 1;
        }
        if is_loop {
            self.loop_depth += 1;
        }

        let mut id_template_parentid = None;

        match kind {
            NodeKind::Extend => {
                let template_attr =
                    self.html.attribute_value(html_idx, b"template", self.source);
                match template_attr {
                    None => self
                        .errors
                        .push(TemplateError::ExtendWithoutTemplateAttr { span: node.open }),
                    Some(value) if value.is_empty() => self
                        .errors
                        .push(TemplateError::MissingTemplateValue { span: node.open }),
                    Some(_) => {
                        id_template_parentid = self
                            .html
                            .attributes_of(html_idx)
                            .iter()
                            .find(|a| a.name_span.text(self.source).eq_ignore_ascii_case(b"template"))
                            .and_then(|a| a.value)
                            .map(|v| v.span);
                    }
                }
            }
            NodeKind::Block => {
                let id_value = self.html.attribute_value(html_idx, b"id", self.source);
                match id_value {
                    None => self.errors.push(TemplateError::BlockMissingId { span: node.open }),
                    Some(value) => {
                        if is_scripted_value(value) {
                            self.errors
                                .push(TemplateError::BlockWithScriptedId { span: node.open });
                        }
                        let id = String::from_utf8_lossy(value).into_owned().into_boxed_str();
                        if let Some((_, first)) = self.blocks.iter().find(|(k, _)| *k == id) {
                            self.errors.push(TemplateError::DuplicateBlock {
                                span: node.open,
                                first: self.html_open(*first),
                            });
                        }
                        id_template_parentid = self
                            .html
                            .attributes_of(html_idx)
                            .iter()
                            .find(|a| a.name_span.text(self.source).eq_ignore_ascii_case(b"id"))
                            .and_then(|a| a.value)
                            .map(|v| v.span);
                    }
                }
            }
            NodeKind::Super => {
                if self.stack.len() <= 1 {
                    self.errors.push(TemplateError::TopLevelSuper { span: node.open });
                } else if !self.html.attributes_of(html_idx).is_empty() {
                    self.errors
                        .push(TemplateError::SuperWantsNoAttributes { span: node.open });
                }
                if self.branching_depth > (branching as u32) {
                    let related = self.html_open(self.top().tpl_idx);
                    self.errors.push(TemplateError::SuperUnderBranching {
                        span: node.open,
                        related,
                    });
                }

                let parent_tpl = self.top().tpl_idx;
                let parent_html_idx = self.nodes[parent_tpl as usize].elem_idx;
                let parent_id = self.html.attribute_value(parent_html_idx, b"id", self.source);
                match parent_id {
                    None => self
                        .errors
                        .push(TemplateError::SuperParentElementMissingId { span: node.open }),
                    Some(id_bytes) => {
                        match self.super_seen.get(&parent_tpl).copied() {
                            Some(first) => {
                                self.errors.push(TemplateError::TwoSupersOneId {
                                    span: node.open,
                                    first,
                                });
                            }
                            None => {
                                self.super_seen.insert(parent_tpl, node.open);
                            }
                        }
                        self.nodes[parent_tpl as usize].kind = NodeKind::SuperBlock;
                        let id = String::from_utf8_lossy(id_bytes).into_owned().into_boxed_str();
                        let parent_id_span = self
                            .html
                            .attributes_of(parent_html_idx)
                            .iter()
                            .find(|a| a.name_span.text(self.source).eq_ignore_ascii_case(b"id"))
                            .and_then(|a| a.value)
                            .map(|v| v.span);
                        self.nodes[parent_tpl as usize].id_template_parentid = parent_id_span;
                        if let Some((_, first)) = self.interface.iter().find(|(k, _)| **k == *id) {
                            let first_span = self.html_open(*first);
                            self.errors.push(TemplateError::TemplateInterfaceIdCollision {
                                span: node.open,
                                first: first_span,
                            });
                        } else {
                            self.interface.push((id, parent_tpl));
                        }
                    }
                }
            }
            NodeKind::Ctx => {
                for attr in self.html.attributes_of(html_idx) {
                    let name = attr.name_span.text(self.source).to_ascii_lowercase();
                    if is_special_name(&name).is_some() {
                        continue;
                    }
                    let ok = attr
                        .value
                        .map(|v| is_scripted_value(v.span.text(self.source)))
                        .unwrap_or(false);
                    if !ok {
                        self.errors
                            .push(TemplateError::CtxAttrsMustBeScripted { span: attr.name_span });
                    }
                }
            }
            NodeKind::Element => {
                if self.loop_depth > 0 {
                    if let Some(id_val) =
                        self.html.attribute_value(html_idx, b"id", self.source)
                    {
                        if !is_scripted_value(id_val) {
                            // A literal id repeated on every loop iteration
                            // would collide; scripted ids are exempt.
                            self.errors.push(TemplateError::IdUnderLoop { span: node.open });
                        }
                    }
                }
            }
            NodeKind::Root | NodeKind::SuperBlock | NodeKind::Block => {}
        }

        let tpl_node = Node {
            kind,
            depth: 0,
            parent_idx: NULL,
            first_child_idx: NULL,
            next_idx: NULL,
            elem_idx: html_idx,
            id_template_parentid,
            if_loop: parsed.if_loop,
            html_text: parsed.html_text,
            is_else: parsed.is_else,
            scripted: parsed.scripted,
        };
        let tpl_idx = self.append(tpl_node);
        if kind == NodeKind::Block {
            // id already validated above; only record when present.
            if let Some(id_value) = self.html.attribute_value(html_idx, b"id", self.source) {
                let id = String::from_utf8_lossy(id_value).into_owned().into_boxed_str();
                if !self.blocks.iter().any(|(k, _)| *k == id) {
                    self.blocks.push((id, tpl_idx));
                }
            }
        }

        self.kept_flags.push(true);
        self.stack.push(TplFrame {
            tpl_idx,
            last_child_idx: NULL,
        });
    }

    fn visit_exit(&mut self) {
        let was_kept = self.kept_flags.pop().unwrap_or(false);
        if !was_kept {
            return;
        }
        let frame = self.stack.pop().expect("pushed on matching enter");
        match self.nodes[frame.tpl_idx as usize].if_loop.map(|s| s.kind) {
            Some(SpecialKind::If) => {
                self.branching_depth = self.branching_depth.saturating_sub(1);
            }
            Some(SpecialKind::Loop) => {
                self.branching_depth = self.branching_depth.saturating_sub(1);
                self.loop_depth = self.loop_depth.saturating_sub(1);
            }
            _ => {}
        }
    }
}

/// Builds the template overlay for `html` (already parsed from `source`).
pub fn build(html: &HtmlAst, source: &[u8]) -> TemplateAst {
    let root = Node {
        kind: NodeKind::Root,
        depth: 0,
        parent_idx: NULL,
        first_child_idx: NULL,
        next_idx: NULL,
        elem_idx: 0,
        id_template_parentid: None,
        if_loop: None,
        html_text: None,
        is_else: false,
        scripted: false,
    };

    let extend_html_idx = find_leading_extend(html, source);

    let mut builder = Builder {
        html,
        source,
        nodes: vec![root],
        errors: Vec::new(),
        interface: Vec::new(),
        blocks: Vec::new(),
        stack: vec![TplFrame {
            tpl_idx: 0,
            last_child_idx: NULL,
        }],
        kept_flags: Vec::new(),
        branching_depth: 0,
        loop_depth: 0,
        extend_html_idx,
        block_mode: extend_html_idx.is_some(),
        super_seen: std::collections::HashMap::new(),
    };

    let mut cursor = html.cursor();
    while let Some((idx, direction)) = cursor.next() {
        if idx == 0 {
            continue; // HTML root itself never becomes a template node
        }
        match direction {
            html_ast::Direction::Enter => builder.visit_enter(idx),
            html_ast::Direction::Exit => builder.visit_exit(),
        }
    }

    let extends_idx = extend_html_idx
        .and_then(|html_idx| builder.nodes.iter().position(|n| n.elem_idx == html_idx))
        .map(|i| i as u32)
        .unwrap_or(0);

    TemplateAst {
        nodes: builder.nodes,
        extends_idx,
        interface: builder.interface,
        blocks: builder.blocks,
        errors: builder.errors,
    }
}
