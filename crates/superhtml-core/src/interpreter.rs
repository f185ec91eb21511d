//! Drives a content template plus its chain of `<extend>`d templates,
//! switching between them at `<super>`/block boundaries and calling out to
//! a host-supplied [`ExprVm`] for every scripted attribute and special
//! attribute along the way.
//!
//! The only suspension point is `WantTemplate`: resolving an `<extend>`
//! chain requires the host to fetch and parse more source, which this
//! crate cannot do on its own. Everything past discovery — the actual
//! render walk — is synchronous, since expression evaluation itself never
//! suspends.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::html_ast::HtmlAst;
use crate::span::Span;
use crate::template_ast::{Direction, NodeKind, SpecialKind, TemplateAst};
use crate::tokenizer::Attribute;
use crate::value::{
    Arena, Configuration, ExprError, ExprVm, FetchError, FetchedTemplate, LoopView, Value,
    ValueIterator,
};

pub use crate::template_ast::NULL;

#[derive(Debug)]
pub enum InterpreterState {
    Init,
    Discovering,
    Running,
    Done,
    Fatal(FatalError),
    WantTemplate { name: Box<str>, span: Span },
}

/// An interpreter error, fatal in the sense that the interpreter aborts
/// and never produces a retryable partial result.
#[derive(Debug)]
pub enum FatalError {
    ExtensionLoopDetected { name: Box<str>, trace: Vec<Box<str>> },
    InterfaceMismatch { message: Box<str> },
    ExpressionTypeMismatch { message: Box<str>, span: Span },
    QuotaExhausted,
    Io(Box<str>),
    Expression(ExprError),
    /// A runtime invariant the template-AST builder could not catch
    /// statically, e.g. a dangling `:else`.
    Structural { message: Box<str> },
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::ExtensionLoopDetected { name, .. } => {
                write!(f, "EXTENSION LOOP DETECTED: '{name}'")
            }
            FatalError::InterfaceMismatch { message } => f.write_str(message),
            FatalError::ExpressionTypeMismatch { message, .. } => f.write_str(message),
            FatalError::QuotaExhausted => write!(f, "INFINITE LOOP: evaluation quota exhausted"),
            FatalError::Io(msg) => write!(f, "I/O error: {msg}"),
            FatalError::Expression(e) => fmt::Display::fmt(e, f),
            FatalError::Structural { message } => f.write_str(message),
        }
    }
}

struct LoadedTemplate {
    path: Box<str>,
    src: Box<[u8]>,
    html_ast: HtmlAst,
    template_ast: TemplateAst,
}

struct LoopEntry {
    node_idx: u32,
    iterator: Box<dyn ValueIterator>,
    current: Option<Value>,
}

struct IfEntry {
    node_idx: u32,
    unwrapped: Value,
}

/// One template's position in the overall evaluation walk. Pushed when a
/// `<super>` activates a block in a more specific template, popped on
/// block completion.
struct ExecFrame {
    template_index: usize,
    pos: (u32, Direction),
    print_cursor: u32,
    print_end: u32,
}

struct PendingResume {
    frame_idx: usize,
    next_pos: (u32, Direction),
}

/// Drives one `content` template plus whatever it `<extend>`s. `templates`
/// is ordered innermost (the originally requested content, index 0) to
/// outermost (the topmost `<extend>`, last index) — the order discovery
/// naturally produces by pushing each newly resolved ancestor on top.
pub struct Interpreter {
    config: Configuration,
    templates: Vec<LoadedTemplate>,
    seen_names: std::collections::HashSet<Box<str>>,
    state: InterpreterState,
    exec_stack: Vec<ExecFrame>,
    loop_stack: Vec<LoopEntry>,
    if_stack: Vec<IfEntry>,
    ctx_stack: Vec<(Box<str>, Value)>,
    /// Per-`<ctx>`-node count of bindings it pushed, popped in one go on
    /// `ctx/exit`.
    ctx_pop_counts: Vec<(u32, u32)>,
    /// Most recently evaluated `:if` sibling per parent, consumed by an
    /// adjacent `:else`.
    last_if_by_parent: FxHashMap<u32, (u32, bool)>,
    pending_resume: Vec<PendingResume>,
    output: Vec<u8>,
    ticks: u32,
}

impl Interpreter {
    pub fn new(content: FetchedTemplate, config: Configuration) -> Self {
        let content = LoadedTemplate {
            path: content.path,
            src: content.src,
            html_ast: content.html_ast,
            template_ast: content.template_ast,
        };
        Self {
            config,
            templates: vec![content],
            seen_names: std::collections::HashSet::new(),
            state: InterpreterState::Init,
            exec_stack: Vec::new(),
            loop_stack: Vec::new(),
            if_stack: Vec::new(),
            ctx_stack: Vec::new(),
            ctx_pop_counts: Vec::new(),
            last_if_by_parent: FxHashMap::default(),
            pending_resume: Vec::new(),
            output: Vec::new(),
            ticks: 0,
        }
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Template chain from outermost to innermost, ending with the content
    /// template's own path — the trace a fatal error is reported with.
    pub fn trace(&self) -> Vec<Box<str>> {
        self.templates.iter().rev().map(|t| t.path.clone()).collect()
    }

    /// Supplies the template the interpreter suspended on with
    /// `WantTemplate`. Panics if called outside that state.
    pub fn insert_template(&mut self, fetched: FetchedTemplate) {
        assert!(
            matches!(self.state, InterpreterState::WantTemplate { .. }),
            "insert_template called without a pending WantTemplate"
        );
        self.templates.push(LoadedTemplate {
            path: fetched.path,
            src: fetched.src,
            html_ast: fetched.html_ast,
            template_ast: fetched.template_ast,
        });
        self.state = InterpreterState::Discovering;
    }

    /// Reports that fetching the template named in the last `WantTemplate`
    /// failed; the interpreter goes fatal.
    pub fn fail_fetch(&mut self, name: &str, err: FetchError) {
        self.state = InterpreterState::Fatal(FatalError::Io(
            format!("fetching '{name}': {err}").into_boxed_str().into(),
        ));
    }

    /// Advances the interpreter as far as it can without blocking. Call in
    /// a loop: while the returned state is `WantTemplate`, fetch the named
    /// template and call [`Self::insert_template`], then call `advance`
    /// again. Once it returns `Done`/`Fatal`, stop; [`Self::output`] holds
    /// the render (valid prefix up to the fatal point on error).
    pub fn advance(&mut self, vm: &mut dyn ExprVm) -> &InterpreterState {
        loop {
            match &self.state {
                InterpreterState::Fatal(_) | InterpreterState::Done => return &self.state,
                InterpreterState::WantTemplate { .. } => return &self.state,
                InterpreterState::Init => {
                    self.state = InterpreterState::Discovering;
                }
                InterpreterState::Discovering => match self.discover_step(vm) {
                    Ok(DiscoverProgress::Continue) => {}
                    Ok(DiscoverProgress::Suspend(name, span)) => {
                        self.state = InterpreterState::WantTemplate { name, span };
                        return &self.state;
                    }
                    Ok(DiscoverProgress::Finished) => {
                        if let Err(fatal) = self.validate_interfaces() {
                            self.state = InterpreterState::Fatal(fatal);
                            return &self.state;
                        }
                        self.begin_execution();
                        self.state = InterpreterState::Running;
                    }
                    Err(fatal) => {
                        self.state = InterpreterState::Fatal(fatal);
                        return &self.state;
                    }
                },
                InterpreterState::Running => {
                    self.state = match self.run_to_completion(vm) {
                        Ok(()) => InterpreterState::Done,
                        Err(fatal) => InterpreterState::Fatal(fatal),
                    };
                    return &self.state;
                }
            }
        }
    }

    fn discover_step(&mut self, vm: &mut dyn ExprVm) -> Result<DiscoverProgress, FatalError> {
        let top = self.templates.len() - 1;
        if self.templates[top].template_ast.extends_idx == NULL {
            return Ok(DiscoverProgress::Finished);
        }
        let name = self.resolve_extend_name(vm, top)?;
        if !self.seen_names.insert(name.clone()) {
            let mut trace: Vec<Box<str>> = self.templates.iter().map(|t| t.path.clone()).collect();
            trace.push(name.clone());
            return Err(FatalError::ExtensionLoopDetected { name, trace });
        }
        let extend_node = &self.templates[top].template_ast.nodes[self.templates[top].template_ast.extends_idx as usize];
        let span = self.templates[top].html_ast.nodes[extend_node.elem_idx as usize].open;
        Ok(DiscoverProgress::Suspend(name, span))
    }

    fn resolve_extend_name(&self, vm: &mut dyn ExprVm, template_index: usize) -> Result<Box<str>, FatalError> {
        let tpl = &self.templates[template_index];
        let extend_node = &tpl.template_ast.nodes[tpl.template_ast.extends_idx as usize];
        let value_span = extend_node
            .id_template_parentid
            .expect("extend-without-template-attr already rejected by the template-AST builder");
        let text = value_span.text(&tpl.src);
        if text.first() == Some(&b'$') {
            let outcome = self.eval_expr(vm, text).map_err(FatalError::Expression)?;
            outcome.value.as_str().map(Into::into).ok_or_else(|| FatalError::ExpressionTypeMismatch {
                message: "`extend`'s `template` attribute must evaluate to a string".into(),
                span: value_span,
            })
        } else {
            Ok(String::from_utf8_lossy(text).into_owned().into_boxed_str())
        }
    }

    fn validate_interfaces(&self) -> Result<(), FatalError> {
        for i in 0..self.templates.len().saturating_sub(1) {
            let e = &self.templates[i];
            let x = &self.templates[i + 1];
            for (id, super_tpl_idx) in &x.template_ast.interface {
                match e.template_ast.find_block(id) {
                    None => {
                        return Err(FatalError::InterfaceMismatch {
                            message: format!(
                                "MISSING TOP-LEVEL BLOCK: '{id}' required by '{}' but not defined in '{}'",
                                x.path, e.path
                            )
                            .into(),
                        })
                    }
                    Some(block_tpl_idx) => {
                        let block_html_idx = e.template_ast.nodes[block_tpl_idx as usize].elem_idx;
                        let block_name = e.html_ast.nodes[block_html_idx as usize].name_span.text(&e.src);
                        let super_html_idx = x.template_ast.nodes[*super_tpl_idx as usize].elem_idx;
                        let super_name = x.html_ast.nodes[super_html_idx as usize].name_span.text(&x.src);
                        if !block_name.eq_ignore_ascii_case(super_name) {
                            return Err(FatalError::InterfaceMismatch {
                                message: format!(
                                    "MISMATCHED BLOCK TAG: '{id}' is <{}> in '{}' but <{}> in '{}'",
                                    String::from_utf8_lossy(block_name),
                                    e.path,
                                    String::from_utf8_lossy(super_name),
                                    x.path
                                )
                                .into(),
                            });
                        }
                    }
                }
            }
            for (id, _) in &e.template_ast.blocks {
                if x.template_ast.find_interface(id).is_none() {
                    return Err(FatalError::InterfaceMismatch {
                        message: format!(
                            "UNBOUND TOP-LEVEL BLOCK: '{id}' defined in '{}' is not used by '{}'",
                            e.path, x.path
                        )
                        .into(),
                    });
                }
            }
        }
        Ok(())
    }

    fn begin_execution(&mut self) {
        let top = self.templates.len() - 1;
        self.exec_stack.push(ExecFrame {
            template_index: top,
            pos: (NULL, Direction::Enter),
            print_cursor: 0,
            print_end: self.templates[top].src.len() as u32,
        });
    }

    fn run_to_completion(&mut self, vm: &mut dyn ExprVm) -> Result<(), FatalError> {
        loop {
            self.ticks += 1;
            if self.ticks > self.config.evaluation_quota {
                return Err(FatalError::QuotaExhausted);
            }

            let frame_idx = self.exec_stack.len() - 1;
            let (idx, dir) = self.exec_stack[frame_idx].pos;
            let ti = self.exec_stack[frame_idx].template_index;

            match dir {
                Direction::Enter if idx == NULL => {
                    let next = step_into(&self.templates[ti].template_ast, NULL);
                    self.exec_stack[frame_idx].pos = next;
                }
                Direction::Exit if idx == NULL => {
                    let end = self.exec_stack[frame_idx].print_end;
                    self.flush(frame_idx, end);
                    debug_assert_eq!(frame_idx, 0, "only the outermost frame's own root is ever visited");
                    return Ok(());
                }
                Direction::Enter => match self.enter_node(frame_idx, ti, idx, vm)? {
                    EnterOutcome::Advance(next) => self.exec_stack[frame_idx].pos = next,
                    EnterOutcome::SuperSwitch { super_block_tpl_idx, resume_pos } => {
                        self.pending_resume.push(PendingResume { frame_idx, next_pos: resume_pos });
                        self.switch_into_block(ti, super_block_tpl_idx)?;
                    }
                },
                Direction::Exit => match self.exit_node(frame_idx, ti, idx)? {
                    ExitOutcome::Advance(next) => self.exec_stack[frame_idx].pos = next,
                    ExitOutcome::BlockDone => {
                        self.exec_stack.pop();
                        let resume = self.pending_resume.pop().expect("set when the block was activated");
                        self.exec_stack[resume.frame_idx].pos = resume.next_pos;
                    }
                },
            }
        }
    }

    fn switch_into_block(&mut self, from_ti: usize, super_block_tpl_idx: u32) -> Result<(), FatalError> {
        let target_ti = from_ti
            .checked_sub(1)
            .ok_or_else(|| FatalError::Structural { message: "`super` with no extended template".into() })?;
        let id_span = self.templates[from_ti].template_ast.nodes[super_block_tpl_idx as usize]
            .id_template_parentid
            .expect("super_block always carries the id super validated against");
        let id = String::from_utf8_lossy(id_span.text(&self.templates[from_ti].src)).into_owned();
        let block_tpl_idx = self.templates[target_ti]
            .template_ast
            .find_block(&id)
            .expect("adjacent interfaces are validated before execution begins");
        let block_elem_idx = self.templates[target_ti].template_ast.nodes[block_tpl_idx as usize].elem_idx;
        let block_html = &self.templates[target_ti].html_ast.nodes[block_elem_idx as usize];
        let open_end = block_html.open.end;
        let close_start = if block_html.close.is_empty() { block_html.open.end } else { block_html.close.start };
        self.exec_stack.push(ExecFrame {
            template_index: target_ti,
            pos: (block_tpl_idx, Direction::Enter),
            print_cursor: open_end,
            print_end: close_start,
        });
        Ok(())
    }

    fn enter_node(&mut self, frame_idx: usize, ti: usize, idx: u32, vm: &mut dyn ExprVm) -> Result<EnterOutcome, FatalError> {
        let node = self.templates[ti].template_ast.nodes[idx as usize].clone();
        match node.kind {
            NodeKind::Ctx => {
                let open = self.templates[ti].html_ast.nodes[node.elem_idx as usize].open;
                self.flush(frame_idx, open.start);

                let attrs: Vec<Attribute> = self.templates[ti].html_ast.attributes_of(node.elem_idx).to_vec();
                let mut added = 0u32;
                for attr in attrs {
                    let name = attr.name_span.text(&self.templates[ti].src).to_vec();
                    if name.first() == Some(&b':') {
                        continue;
                    }
                    let Some(value) = attr.value else { continue };
                    let code = value.span.text(&self.templates[ti].src).to_vec();
                    let outcome = self.eval_expr(vm, &code).map_err(FatalError::Expression)?;
                    let name_str: Box<str> = String::from_utf8_lossy(&name).into_owned().into_boxed_str();
                    self.ctx_stack.push((name_str, outcome.value));
                    added += 1;
                }
                self.ctx_pop_counts.push((idx, added));
                self.exec_stack[frame_idx].print_cursor = open.end;
                Ok(EnterOutcome::Advance(step_into(&self.templates[ti].template_ast, idx)))
            }
            NodeKind::Super => {
                let html_node = &self.templates[ti].html_ast.nodes[node.elem_idx as usize];
                let open_start = html_node.open.start;
                let elem_end = html_node.full_span().end;
                self.flush(frame_idx, open_start);
                self.exec_stack[frame_idx].print_cursor = elem_end;
                let resume_pos = step_after_exit(&self.templates[ti].template_ast, idx).unwrap_or((NULL, Direction::Exit));
                Ok(EnterOutcome::SuperSwitch { super_block_tpl_idx: node.parent_idx, resume_pos })
            }
            NodeKind::Block => Ok(EnterOutcome::Advance(step_into(&self.templates[ti].template_ast, idx))),
            NodeKind::Element | NodeKind::SuperBlock => self.enter_element(frame_idx, ti, idx, &node, vm),
            NodeKind::Root | NodeKind::Extend => {
                unreachable!("root is handled by the driver; extend is consumed during discovery")
            }
        }
    }

    fn enter_element(
        &mut self,
        frame_idx: usize,
        ti: usize,
        idx: u32,
        node: &crate::template_ast::Node,
        vm: &mut dyn ExprVm,
    ) -> Result<EnterOutcome, FatalError> {
        let elem_idx = node.elem_idx;

        let mut body_visible = true;
        if node.is_else {
            match self.last_if_by_parent.remove(&node.parent_idx) {
                Some((_, prev_rendered)) => body_visible = !prev_rendered,
                None => {
                    return Err(FatalError::Structural {
                        message: "`:else` has no adjacent preceding `:if`".into(),
                    })
                }
            }
        } else if node.if_loop.is_none() {
            self.last_if_by_parent.remove(&node.parent_idx);
        }

        if let Some(special) = node.if_loop {
            let code = special.value.text(&self.templates[ti].src).to_vec();
            match special.kind {
                SpecialKind::If => {
                    let outcome = self.eval_expr(vm, &code).map_err(FatalError::Expression)?;
                    let (visible, unwrapped) = interpret_if_value(outcome.value, special.value)?;
                    body_visible = visible;
                    if let Some(v) = unwrapped {
                        self.if_stack.push(IfEntry { node_idx: idx, unwrapped: v });
                    }
                    self.last_if_by_parent.insert(node.parent_idx, (idx, body_visible));
                }
                SpecialKind::Loop => {
                    let outcome = self.eval_expr(vm, &code).map_err(FatalError::Expression)?;
                    let mut iterator = match outcome.value {
                        Value::Iterator(it) => it,
                        Value::Error(msg) => {
                            return Err(FatalError::Expression(ExprError { message: msg, loc: Some(special.value) }))
                        }
                        _ => {
                            return Err(FatalError::ExpressionTypeMismatch {
                                message: "`:loop` requires an iterator value".into(),
                                span: special.value,
                            })
                        }
                    };
                    match iterator.next() {
                        Some(first) => {
                            self.loop_stack.push(LoopEntry { node_idx: idx, iterator, current: Some(first) });
                            body_visible = true;
                        }
                        None => body_visible = false,
                    }
                }
                SpecialKind::Text | SpecialKind::Html => {
                    unreachable!("text/html never populate if_loop")
                }
            }
        }

        let html_node = &self.templates[ti].html_ast.nodes[elem_idx as usize];
        let full_end = html_node.full_span().end;
        let open_start = html_node.open.start;
        let open_end = html_node.open.end;
        let close_target = if html_node.close.is_empty() { open_end } else { html_node.close.start };

        if !body_visible {
            // `:if`/`:loop` suppressed the whole element: skip both its
            // open and close tags, not just the body.
            self.exec_stack[frame_idx].print_cursor = full_end;
            return Ok(EnterOutcome::Advance((idx, Direction::Exit)));
        }

        self.flush(frame_idx, open_start);
        self.emit_open_tag(ti, elem_idx, vm)?;
        self.exec_stack[frame_idx].print_cursor = open_end;

        if let Some(special) = node.html_text {
            let code = special.value.text(&self.templates[ti].src).to_vec();
            let outcome = self.eval_expr(vm, &code).map_err(FatalError::Expression)?;
            let rendered = match outcome.value {
                Value::Error(msg) => {
                    return Err(FatalError::Expression(ExprError { message: msg, loc: Some(special.value) }))
                }
                other => other.to_attribute_string().ok_or_else(|| FatalError::ExpressionTypeMismatch {
                    message: "`:text`/`:html` require a string or int value".into(),
                    span: special.value,
                })?,
            };
            match special.kind {
                SpecialKind::Text => self.output.extend_from_slice(html_escape(&rendered).as_bytes()),
                SpecialKind::Html => self.output.extend_from_slice(rendered.as_bytes()),
                _ => unreachable!(),
            }
            self.exec_stack[frame_idx].print_cursor = close_target;
            return Ok(EnterOutcome::Advance((idx, Direction::Exit)));
        }

        Ok(EnterOutcome::Advance(step_into(&self.templates[ti].template_ast, idx)))
    }

    fn emit_open_tag(&mut self, ti: usize, elem_idx: u32, vm: &mut dyn ExprVm) -> Result<(), FatalError> {
        let name = self.templates[ti].html_ast.nodes[elem_idx as usize]
            .name_span
            .text(&self.templates[ti].src)
            .to_vec();
        self.output.push(b'<');
        self.output.extend_from_slice(&name);

        let attrs: Vec<Attribute> = self.templates[ti].html_ast.attributes_of(elem_idx).to_vec();
        for attr in attrs {
            let name = attr.name_span.text(&self.templates[ti].src).to_vec();
            if name.first() == Some(&b':') {
                continue;
            }
            match attr.value {
                None => {
                    self.output.push(b' ');
                    self.output.extend_from_slice(&name);
                }
                Some(value) => {
                    let raw = value.span.text(&self.templates[ti].src).to_vec();
                    self.output.push(b' ');
                    self.output.extend_from_slice(&name);
                    self.output.extend_from_slice(b"=\"");
                    if raw.first() == Some(&b'$') {
                        let outcome = self.eval_expr(vm, &raw).map_err(FatalError::Expression)?;
                        let rendered = match outcome.value {
                            Value::Error(msg) => {
                                return Err(FatalError::Expression(ExprError { message: msg, loc: Some(value.span) }))
                            }
                            other => other.to_attribute_string().ok_or_else(|| FatalError::ExpressionTypeMismatch {
                                message: "attribute value must evaluate to a string or int".into(),
                                span: value.span,
                            })?,
                        };
                        self.output.extend_from_slice(html_escape(&rendered).as_bytes());
                    } else {
                        self.output.extend_from_slice(&raw);
                    }
                    self.output.extend_from_slice(b"\"");
                }
            }
        }
        self.output.push(b'>');
        Ok(())
    }

    fn exit_node(&mut self, frame_idx: usize, ti: usize, idx: u32) -> Result<ExitOutcome, FatalError> {
        let node = self.templates[ti].template_ast.nodes[idx as usize].clone();
        match node.kind {
            NodeKind::Ctx => {
                if let Some(pos) = self.ctx_pop_counts.iter().rposition(|(i, _)| *i == idx) {
                    let (_, count) = self.ctx_pop_counts.remove(pos);
                    let new_len = self.ctx_stack.len().saturating_sub(count as usize);
                    self.ctx_stack.truncate(new_len);
                }
                let html_node = &self.templates[ti].html_ast.nodes[node.elem_idx as usize];
                let close_end = html_node.full_span().end;
                let close_start = if html_node.close.is_empty() { html_node.open.end } else { html_node.close.start };
                self.flush(frame_idx, close_start);
                self.exec_stack[frame_idx].print_cursor = close_end;
                Ok(ExitOutcome::Advance(
                    step_after_exit(&self.templates[ti].template_ast, idx).unwrap_or((NULL, Direction::Exit)),
                ))
            }
            NodeKind::Block => {
                let html_node = &self.templates[ti].html_ast.nodes[node.elem_idx as usize];
                let close_start = if html_node.close.is_empty() { html_node.open.end } else { html_node.close.start };
                self.flush(frame_idx, close_start);
                Ok(ExitOutcome::BlockDone)
            }
            NodeKind::Element | NodeKind::SuperBlock => {
                if let Some(top) = self.loop_stack.last_mut() {
                    if top.node_idx == idx {
                        match top.iterator.next() {
                            Some(next_value) => {
                                top.current = Some(next_value);
                                let open_end = self.templates[ti].html_ast.nodes[node.elem_idx as usize].open.end;
                                self.exec_stack[frame_idx].print_cursor = open_end;
                                return Ok(ExitOutcome::Advance(step_into(&self.templates[ti].template_ast, idx)));
                            }
                            None => {
                                self.loop_stack.pop();
                            }
                        }
                    }
                }
                if let Some(top) = self.if_stack.last() {
                    if top.node_idx == idx {
                        self.if_stack.pop();
                    }
                }
                let html_node = &self.templates[ti].html_ast.nodes[node.elem_idx as usize];
                let close_end = html_node.full_span().end;
                self.flush(frame_idx, close_end);
                Ok(ExitOutcome::Advance(
                    step_after_exit(&self.templates[ti].template_ast, idx).unwrap_or((NULL, Direction::Exit)),
                ))
            }
            NodeKind::Super | NodeKind::Extend | NodeKind::Root => {
                unreachable!("super is consumed on enter; extend/root never descended into")
            }
        }
    }

    fn flush(&mut self, frame_idx: usize, to: u32) {
        let ti = self.exec_stack[frame_idx].template_index;
        let from = self.exec_stack[frame_idx].print_cursor;
        if to > from {
            let bytes = &self.templates[ti].src[from as usize..to as usize];
            self.output.extend_from_slice(bytes);
        }
        self.exec_stack[frame_idx].print_cursor = to;
    }

    /// Evaluates `code` under the currently active `$loop`/`$if`/`<ctx>`
    /// scope. Immutable so callers can freely interleave it with
    /// `self.output` writes without fighting the borrow checker.
    fn eval_expr(&self, vm: &mut dyn ExprVm, code: &[u8]) -> Result<crate::value::EvalOutcome, ExprError> {
        let loop_views: Vec<LoopView> = self
            .loop_stack
            .iter()
            .map(|e| LoopView { node_idx: e.node_idx, current: e.current.as_ref() })
            .collect();
        let ctx = crate::value::EvalCtx {
            loop_stack: &loop_views,
            if_value: self.if_stack.last().map(|e| &e.unwrapped),
            ctx_map: &self.ctx_stack,
        };
        let mut arena = Arena::new();
        vm.run(&mut arena, &ctx, code)
    }
}

enum DiscoverProgress {
    Continue,
    Suspend(Box<str>, Span),
    Finished,
}

enum EnterOutcome {
    Advance((u32, Direction)),
    SuperSwitch { super_block_tpl_idx: u32, resume_pos: (u32, Direction) },
}

enum ExitOutcome {
    Advance((u32, Direction)),
    BlockDone,
}

fn interpret_if_value(value: Value, span: Span) -> Result<(bool, Option<Value>), FatalError> {
    match value {
        Value::Bool(b) => Ok((b, None)),
        Value::Optional(None) => Ok((false, None)),
        Value::Optional(Some(inner)) => Ok((true, Some(*inner))),
        Value::Error(msg) => Err(FatalError::Expression(ExprError { message: msg, loc: Some(span) })),
        _ => Err(FatalError::ExpressionTypeMismatch {
            message: "`:if` requires a bool or optional value".into(),
            span,
        }),
    }
}

fn step_into(ast: &TemplateAst, idx: u32) -> (u32, Direction) {
    let node = &ast.nodes[idx as usize];
    if node.first_child_idx != NULL {
        (node.first_child_idx, Direction::Enter)
    } else {
        (idx, Direction::Exit)
    }
}

fn step_after_exit(ast: &TemplateAst, idx: u32) -> Option<(u32, Direction)> {
    if idx == NULL {
        return None;
    }
    let node = &ast.nodes[idx as usize];
    if node.next_idx != NULL {
        Some((node.next_idx, Direction::Enter))
    } else {
        Some((node.parent_idx, Direction::Exit))
    }
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ValidationMode;
    use crate::html_ast;
    use crate::lang::Lang;
    use crate::template_ast;
    use crate::value::{EvalCtx, EvalOutcome};

    fn parse(source: &[u8]) -> (HtmlAst, TemplateAst) {
        let html = html_ast::build(source, Lang::Superhtml, ValidationMode::Standard);
        let tpl = template_ast::build(&html, source);
        (html, tpl)
    }

    fn loaded(path: &str, source: &'static [u8]) -> FetchedTemplate {
        let (html, tpl) = parse(source);
        FetchedTemplate {
            path: path.into(),
            src: source.into(),
            html_ast: html,
            template_ast: tpl,
            is_xml: false,
        }
    }

    /// An expr VM stub: `$x` looks up ctx/loop/if by a fixed mini-grammar
    /// good enough to drive the interpreter's control flow in tests.
    struct StubVm;

    impl ExprVm for StubVm {
        fn run(&mut self, _arena: &mut Arena, ctx: &EvalCtx, code: &[u8]) -> Result<EvalOutcome, ExprError> {
            let code = std::str::from_utf8(code).unwrap();
            let value = match code {
                "$true" => Value::Bool(true),
                "$false" => Value::Bool(false),
                "$items" => Value::Iterator(Box::new(crate::value::VecIterator::new(vec![
                    Value::String("a".into()),
                    Value::String("b".into()),
                ]))),
                "$loop.it" => ctx
                    .current_loop()
                    .and_then(|l| l.current)
                    .map(|v| match v {
                        Value::String(s) => Value::String(s.clone()),
                        other => Value::String(format!("{other:?}").into()),
                    })
                    .unwrap_or(Value::String("".into())),
                other if other.starts_with('$') => ctx
                    .lookup_ctx(&other[1..])
                    .map(|v| match v {
                        Value::String(s) => Value::String(s.clone()),
                        Value::Int(i) => Value::Int(*i),
                        _ => Value::String("?".into()),
                    })
                    .unwrap_or(Value::String("missing".into())),
                _ => Value::Error(format!("unknown expr {code}").into()),
            };
            Ok(EvalOutcome { value, loc: Span::default() })
        }
    }

    fn run(content: &'static [u8]) -> Interpreter {
        let mut interp = Interpreter::new(loaded("content.shtml", content), Configuration::default());
        let mut vm = StubVm;
        interp.advance(&mut vm);
        interp
    }

    #[test]
    fn plain_document_renders_verbatim() {
        let interp = run(b"<div>hello</div>");
        assert!(matches!(interp.state(), InterpreterState::Done));
        assert_eq!(interp.output(), b"<div>hello</div>");
    }

    #[test]
    fn if_false_drops_the_whole_element() {
        let interp = run(b"<p :if=\"$false\">hidden</p>");
        assert!(matches!(interp.state(), InterpreterState::Done));
        assert_eq!(interp.output(), b"");
    }

    #[test]
    fn if_false_with_else_renders_only_the_else_branch() {
        let interp = run(b"<span :if=\"$false\">A</span><span :else>B</span>");
        assert!(matches!(interp.state(), InterpreterState::Done));
        assert_eq!(interp.output(), b"<span>B</span>");
    }

    #[test]
    fn if_true_keeps_the_body() {
        let interp = run(b"<p :if=\"$true\">shown</p>");
        assert_eq!(interp.output(), b"<p>shown</p>");
    }

    #[test]
    fn loop_repeats_the_body_once_per_item() {
        let interp = run(b"<li :loop=\"$items\">[$loop.it]</li>");
        assert_eq!(interp.output(), b"<li>[a][b]</li>");
    }

    #[test]
    fn text_attribute_replaces_body_and_escapes() {
        let interp = run(b"<span :text=\"$name\"></span>");
        // `$name` is not bound in ctx, StubVm resolves unknowns to "missing".
        assert_eq!(interp.output(), b"<span>missing</span>");
    }

    #[test]
    fn extend_chain_suspends_for_want_template() {
        let content = b"<extend template=\"base.shtml\"></extend><main id=\"content\">hi</main>";
        let mut interp = Interpreter::new(loaded("content.shtml", content), Configuration::default());
        let mut vm = StubVm;
        match interp.advance(&mut vm) {
            InterpreterState::WantTemplate { name, .. } => assert_eq!(name.as_ref(), "base.shtml"),
            other => panic!("expected WantTemplate, got {other:?}"),
        }
        let base = b"<html><main id=\"content\"><super></super></main></html>";
        interp.insert_template(loaded("base.shtml", base));
        interp.advance(&mut vm);
        assert!(matches!(interp.state(), InterpreterState::Done));
        assert_eq!(interp.output(), b"<html><main id=\"content\">hi</main></html>");
    }

    #[test]
    fn extension_loop_is_detected() {
        let content = b"<extend template=\"base.shtml\"></extend><main id=\"content\">x</main>";
        let mut interp = Interpreter::new(loaded("content.shtml", content), Configuration::default());
        let mut vm = StubVm;
        interp.advance(&mut vm);
        let looping_base =
            b"<extend template=\"content.shtml\"></extend><main id=\"content\">loop</main>";
        interp.insert_template(loaded("base.shtml", looping_base));
        match interp.advance(&mut vm) {
            InterpreterState::Fatal(FatalError::ExtensionLoopDetected { name, .. }) => {
                assert_eq!(name.as_ref(), "content.shtml")
            }
            other => panic!("expected an extension-loop fatal error, got {other:?}"),
        }
    }
}
