//! Tokenizer, HTML AST, element tables, template AST, interpreter and
//! renderer for an HTML-superset templating language.
//!
//! The pipeline is layered, and each layer can be used on its own:
//!
//! - [`tokenizer`] turns raw bytes into source-preserving tokens.
//! - [`html_ast`] turns tokens into an HTML tree, validating nesting against
//!   [`elements`]'s content-model tables.
//! - [`template_ast`] overlays `extend`/`super`/`ctx`/block constructs and
//!   the `:if`/`:loop`/`:text`/`:html` attributes on top of the HTML tree.
//! - [`interpreter`] walks a template AST and drives an external expression
//!   evaluator (see [`value::ExprVm`]) to produce a rendered document.
//! - [`renderer`] turns an HTML AST back into bytes.
//! - [`diagnostics`] presents spans and errors produced by the other layers.

mod macros;

pub mod compat_mode;
pub mod diagnostics;
pub mod doctype;
pub mod elements;
pub mod html_ast;
pub mod interpreter;
pub mod lang;
pub mod renderer;
pub mod span;
mod str_fns;
pub mod template_ast;
pub mod tokenizer;
pub mod value;

pub use compat_mode::CompatMode;
pub use doctype::DoctypeInfo;
pub use lang::Lang;
pub use span::Span;
