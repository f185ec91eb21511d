//! The value model and host-callback contracts the interpreter drives.
//!
//! `Value` itself is opaque to this crate in the sense that its variants
//! are produced by an embedded expression runtime the host supplies
//! through [`ExprVm`]; this module only fixes the shape the interpreter
//! needs to drive `:if`/`:loop`/`:text`/`:html` and attribute
//! substitution.

use std::fmt;

use crate::elements::ValidationMode;
use crate::html_ast::HtmlAst;
use crate::span::Span;
use crate::template_ast::TemplateAst;

/// A value produced by evaluating a scripted attribute or special
/// attribute. `Iterator` is intentionally boxed and stateful: advancing it
/// is an observable side effect, matching `:loop`'s pull-based iteration.
pub enum Value {
    String(Box<str>),
    Int(i64),
    Bool(bool),
    Optional(Option<Box<Value>>),
    Iterator(Box<dyn ValueIterator>),
    Error(Box<str>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Optional(o) => write!(f, "Optional({o:?})"),
            Value::Iterator(_) => write!(f, "Iterator(..)"),
            Value::Error(e) => write!(f, "Error({e:?})"),
        }
    }
}

/// A stateful, pull-based source of values, backing `:loop`.
pub trait ValueIterator {
    fn next(&mut self) -> Option<Value>;
}

/// A `ValueIterator` over an already-materialized list, useful for host
/// values that are plain arrays rather than lazy sequences.
pub struct VecIterator {
    items: std::vec::IntoIter<Value>,
}

impl VecIterator {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl ValueIterator for VecIterator {
    fn next(&mut self) -> Option<Value> {
        self.items.next()
    }
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Natural serialization for attribute-value substitution. Returns
    /// `None` for any variant other than `string`/`int`, which the caller
    /// reports as a script type-mismatch.
    pub fn to_attribute_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.to_string()),
            Value::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }
}

/// Owns every `Value` materialized during one evaluation. Dropping the
/// arena releases every value it holds at once, matching the
/// per-evaluation-arena lifecycle.
#[derive(Default)]
pub struct Arena {
    slots: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueId(u32);

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.slots.len() as u32);
        self.slots.push(value);
        id
    }

    pub fn get(&self, id: ValueId) -> &Value {
        &self.slots[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ValueId) -> &mut Value {
        &mut self.slots[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// One active `:loop` activation, innermost last. The expression VM reads
/// `$loop` off the last entry and `$loop.up` by walking backwards.
pub struct LoopView<'a> {
    pub node_idx: u32,
    pub current: Option<&'a Value>,
}

/// Context handed to [`ExprVm::run`] for one attribute/special-attribute
/// evaluation: the active `:loop` nesting, the innermost `:if` unwrap, and
/// the `<ctx>`-scoped bindings in scope. Flat slices rather than a linked
/// frame chain — `:if`/`:loop` never straddle a `<super>` switch, so the
/// whole dynamic nesting always lives in one contiguous stack.
pub struct EvalCtx<'a> {
    pub loop_stack: &'a [LoopView<'a>],
    pub if_value: Option<&'a Value>,
    pub ctx_map: &'a [(Box<str>, Value)],
}

impl<'a> EvalCtx<'a> {
    pub fn current_loop(&self) -> Option<&LoopView<'a>> {
        self.loop_stack.last()
    }

    pub fn lookup_ctx(&self, name: &str) -> Option<&Value> {
        self.ctx_map
            .iter()
            .rev()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone)]
pub struct ExprError {
    pub message: Box<str>,
    pub loc: Option<Span>,
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct EvalOutcome {
    pub value: Value,
    pub loc: Span,
}

/// The embedded expression runtime the interpreter calls out to for every
/// scripted attribute/special attribute. Supplied entirely by the host;
/// this crate never evaluates expression syntax itself.
pub trait ExprVm {
    fn run(&mut self, arena: &mut Arena, ctx: &EvalCtx, code: &[u8]) -> Result<EvalOutcome, ExprError>;
}

/// A template fetched by the host in response to `Interpreter::WantTemplate`.
pub struct FetchedTemplate {
    pub path: Box<str>,
    pub src: Box<[u8]>,
    pub html_ast: HtmlAst,
    pub template_ast: TemplateAst,
    pub is_xml: bool,
}

#[derive(Debug, Clone)]
pub enum FetchError {
    NotFound,
    Io(Box<str>),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound => write!(f, "template not found"),
            FetchError::Io(msg) => write!(f, "I/O error fetching template: {msg}"),
        }
    }
}

/// Host callback the interpreter suspends on to resolve `<extend>` chains.
pub trait FetchTemplate {
    fn fetch(&mut self, name: &str) -> Result<FetchedTemplate, FetchError>;
}

/// Tunables a host sets once per engine instance; see `spec.md` §6.
#[derive(Debug, Clone, Copy)]
pub struct Configuration {
    pub validation_mode: ValidationMode,
    pub strict_tags: bool,
    pub evaluation_quota: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::default(),
            strict_tags: true,
            evaluation_quota: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_round_trips_values() {
        let mut arena = Arena::new();
        let id = arena.alloc(Value::Int(42));
        assert_eq!(arena.get(id).as_int(), Some(42));
    }

    #[test]
    fn vec_iterator_yields_in_order() {
        let mut it = VecIterator::new(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(it.next().unwrap().as_int(), Some(1));
        assert_eq!(it.next().unwrap().as_int(), Some(2));
        assert!(it.next().is_none());
    }

    #[test]
    fn eval_ctx_looks_up_most_recent_binding() {
        let ctx_map: Vec<(Box<str>, Value)> = vec![
            ("name".into(), Value::String("outer".into())),
            ("name".into(), Value::String("inner".into())),
        ];
        let ctx = EvalCtx {
            loop_stack: &[],
            if_value: None,
            ctx_map: &ctx_map,
        };
        assert_eq!(ctx.lookup_ctx("name").and_then(Value::as_str), Some("inner"));
    }

    #[test]
    fn configuration_defaults_match_spec() {
        let config = Configuration::default();
        assert_eq!(config.evaluation_quota, 100);
        assert!(config.strict_tags);
    }
}
