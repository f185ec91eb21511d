/// Which tokenizer/validator rules apply to a document.
///
/// `Html` and `Xml` pick the relaxations described for XML-compatible
/// fragments (self-closing non-void elements, stricter attribute quoting);
/// `Superhtml` is `Html` plus the template constructs in [`crate::template_ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Html,
    Superhtml,
    Xml,
}

impl Lang {
    /// Whether self-closing syntax (`<div />`) is accepted on elements that
    /// HTML itself does not treat as void.
    pub fn allows_foreign_self_closing(&self) -> bool {
        matches!(self, Lang::Xml)
    }

    pub fn allows_template_constructs(&self) -> bool {
        matches!(self, Lang::Superhtml)
    }
}
