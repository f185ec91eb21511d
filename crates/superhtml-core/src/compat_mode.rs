/// Document compatibility mode, as indicated by a DOCTYPE declaration.
///
/// See <https://developer.mozilla.org/en-US/docs/Web/HTML/Quirks_Mode_and_Standards_Mode>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatMode {
    /// The behavior described by the modern HTML and CSS specifications.
    #[default]
    NoQuirks,
    /// Layout quirks preserved for documents predating the DOCTYPE switch.
    Quirks,
    /// A narrower set of quirks between `NoQuirks` and `Quirks`.
    LimitedQuirks,
}

impl From<&CompatMode> for String {
    fn from(val: &CompatMode) -> Self {
        let s: &str = val.into();
        s.to_string()
    }
}
impl From<&CompatMode> for &str {
    fn from(val: &CompatMode) -> Self {
        match val {
            CompatMode::NoQuirks => "no-quirks",
            CompatMode::Quirks => "quirks",
            CompatMode::LimitedQuirks => "limited-quirks",
        }
    }
}
