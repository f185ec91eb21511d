//! Compile-time element and attribute tables.
//!
//! These are deliberately not a full HTML5 conformance table — only the
//! categories needed to validate nesting, detect void/raw-text elements,
//! and drive attribute completion are modeled. Unknown tag names are still
//! accepted into the tree; they're reported through `invalid_html_tag_name`
//! rather than rejected.

use rustc_hash::FxHashMap;

/// How strictly unknown tag/attribute names are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Skip `invalid_html_tag_name`/unknown-attribute checks entirely.
    Off,
    /// The default: flag any tag name absent from [`ELEMENTS`].
    #[default]
    Standard,
    /// Like `Standard`, but any tag name containing a hyphen is treated as
    /// a custom element and exempted.
    WebComponents,
}

impl ValidationMode {
    pub fn accepts_unknown_tag(&self, name: &[u8]) -> bool {
        match self {
            ValidationMode::Off => true,
            ValidationMode::Standard => false,
            ValidationMode::WebComponents => name.contains(&b'-'),
        }
    }
}

/// Whether, and how, an element's content is tokenized as raw character
/// data rather than nested markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTextMode {
    /// Ordinary element: children are tokenized as markup.
    Off,
    /// RCDATA: character references are recognized but tags are not
    /// (`title`, `textarea`).
    Rcdata,
    /// RAWTEXT: neither character references nor tags are recognized
    /// (`script`, `style`).
    Rawtext,
}

/// What an element allows as children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// No children permitted (void elements, and raw-text elements whose
    /// content is consumed by the tokenizer rather than parsed as nodes).
    None,
    /// Only phrasing content children (inline-level: `p`, `span`, `label`).
    Phrasing,
    /// Flow content children — the broad default (`div`, `body`, `li`).
    Flow,
    /// Only metadata content children (`head`).
    Metadata,
    /// Only a fixed, named set of child tag names (`ul` → `li`, `table` →
    /// `caption`/`colgroup`/`thead`/`tbody`/`tfoot`/`tr`).
    Only(&'static [&'static str]),
}

/// A recognized HTML (or SuperHTML template) element.
#[derive(Debug, Clone, Copy)]
pub struct ElementInfo {
    pub name: &'static str,
    /// What this element allows as children.
    pub content_model: ContentModel,
    /// Whether this element counts as phrasing content when it appears as
    /// someone else's child — i.e. whether a `Phrasing`-content-model
    /// parent may contain it.
    pub is_phrasing: bool,
    /// Whether this element counts as flow content — almost everything
    /// does; metadata-only elements (`head`, `title`, `meta`...) do not.
    pub is_flow: bool,
    pub void: bool,
    pub raw_text_mode: RawTextMode,
    /// Attribute names this element additionally permits, beyond
    /// [`GLOBAL_ATTRIBUTES`].
    pub attributes: &'static [&'static str],
}

const fn elem(name: &'static str) -> ElementInfo {
    ElementInfo {
        name,
        content_model: ContentModel::Flow,
        is_phrasing: false,
        is_flow: true,
        void: false,
        raw_text_mode: RawTextMode::Off,
        attributes: &[],
    }
}

const fn phrasing(name: &'static str) -> ElementInfo {
    ElementInfo {
        content_model: ContentModel::Phrasing,
        is_phrasing: true,
        ..elem(name)
    }
}

pub const ELEMENTS: &[ElementInfo] = &[
    elem("html"),
    ElementInfo {
        content_model: ContentModel::Metadata,
        is_flow: false,
        ..elem("head")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_phrasing: false,
        is_flow: false,
        ..elem("title")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_flow: false,
        void: true,
        attributes: &["href"],
        ..elem("base")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_flow: false,
        void: true,
        attributes: &["rel", "href", "type", "media", "crossorigin", "integrity"],
        ..elem("link")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_flow: false,
        void: true,
        attributes: &["name", "content", "charset", "http-equiv"],
        ..elem("meta")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_flow: false,
        raw_text_mode: RawTextMode::Rawtext,
        attributes: &["media"],
        ..elem("style")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_phrasing: true,
        raw_text_mode: RawTextMode::Rawtext,
        attributes: &["src", "type", "async", "defer", "crossorigin", "integrity", "nomodule"],
        ..elem("script")
    },
    elem("body"),
    phrasing("p"),
    elem("div"),
    elem("section"),
    elem("article"),
    elem("header"),
    elem("footer"),
    elem("nav"),
    elem("aside"),
    ElementInfo {
        content_model: ContentModel::Phrasing,
        is_phrasing: false,
        ..elem("h1")
    },
    ElementInfo {
        content_model: ContentModel::Phrasing,
        is_phrasing: false,
        ..elem("h2")
    },
    ElementInfo {
        content_model: ContentModel::Phrasing,
        is_phrasing: false,
        ..elem("h3")
    },
    ElementInfo {
        content_model: ContentModel::Phrasing,
        is_phrasing: false,
        ..elem("h4")
    },
    ElementInfo {
        content_model: ContentModel::Phrasing,
        is_phrasing: false,
        ..elem("h5")
    },
    ElementInfo {
        content_model: ContentModel::Phrasing,
        is_phrasing: false,
        ..elem("h6")
    },
    phrasing("span"),
    ElementInfo {
        attributes: &["href", "target", "rel", "download"],
        ..phrasing("a")
    },
    phrasing("em"),
    phrasing("strong"),
    phrasing("small"),
    phrasing("b"),
    phrasing("i"),
    phrasing("u"),
    phrasing("mark"),
    phrasing("code"),
    phrasing("sub"),
    phrasing("sup"),
    phrasing("time"),
    ElementInfo {
        content_model: ContentModel::None,
        void: true,
        attributes: &["src", "alt", "width", "height", "srcset", "loading"],
        ..phrasing("img")
    },
    ElementInfo {
        content_model: ContentModel::None,
        void: true,
        ..phrasing("br")
    },
    ElementInfo {
        content_model: ContentModel::None,
        void: true,
        ..phrasing("wbr")
    },
    ElementInfo {
        content_model: ContentModel::None,
        void: true,
        attributes: &["src", "type", "srcset", "sizes", "media"],
        ..elem("source")
    },
    ElementInfo {
        content_model: ContentModel::None,
        void: true,
        attributes: &["kind", "src", "srclang", "label", "default"],
        ..elem("track")
    },
    ElementInfo {
        attributes: &["src", "controls", "autoplay", "loop", "muted", "preload"],
        ..elem("audio")
    },
    ElementInfo {
        attributes: &[
            "src", "controls", "autoplay", "loop", "muted", "preload", "width", "height", "poster",
        ],
        ..elem("video")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["li"]),
        ..elem("ul")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["li"]),
        attributes: &["start", "reversed", "type"],
        ..elem("ol")
    },
    elem("li"),
    ElementInfo {
        content_model: ContentModel::Only(&["dt", "dd"]),
        ..elem("dl")
    },
    elem("dt"),
    elem("dd"),
    ElementInfo {
        content_model: ContentModel::Only(&[
            "caption", "colgroup", "thead", "tbody", "tfoot", "tr",
        ]),
        ..elem("table")
    },
    elem("caption"),
    ElementInfo {
        content_model: ContentModel::Only(&["col"]),
        ..elem("colgroup")
    },
    ElementInfo {
        content_model: ContentModel::None,
        void: true,
        attributes: &["span"],
        ..elem("col")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["tr"]),
        ..elem("thead")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["tr"]),
        ..elem("tbody")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["tr"]),
        ..elem("tfoot")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["td", "th"]),
        ..elem("tr")
    },
    ElementInfo {
        attributes: &["colspan", "rowspan", "headers"],
        ..elem("td")
    },
    ElementInfo {
        attributes: &["colspan", "rowspan", "headers", "scope"],
        ..elem("th")
    },
    ElementInfo {
        attributes: &["action", "method", "enctype", "novalidate", "target"],
        ..elem("form")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_phrasing: true,
        void: true,
        attributes: &[
            "type", "name", "value", "placeholder", "checked", "disabled", "required", "readonly",
            "min", "max", "step", "pattern", "autocomplete", "autofocus", "multiple",
        ],
        ..elem("input")
    },
    ElementInfo {
        is_phrasing: true,
        attributes: &["type", "disabled", "name", "value", "form"],
        ..elem("button")
    },
    ElementInfo {
        content_model: ContentModel::None,
        is_phrasing: true,
        raw_text_mode: RawTextMode::Rcdata,
        attributes: &["name", "rows", "cols", "placeholder", "disabled", "readonly", "required"],
        ..elem("textarea")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["option", "optgroup"]),
        is_phrasing: true,
        attributes: &["name", "disabled", "multiple", "required", "size"],
        ..elem("select")
    },
    ElementInfo {
        content_model: ContentModel::Only(&["option"]),
        attributes: &["label", "disabled"],
        ..elem("optgroup")
    },
    ElementInfo {
        attributes: &["value", "selected", "disabled", "label"],
        ..elem("option")
    },
    ElementInfo {
        attributes: &["for"],
        ..phrasing("label")
    },
    ElementInfo {
        attributes: &["for"],
        ..elem("fieldset")
    },
    elem("legend"),
    elem("template"),
    elem("noscript"),
    elem("main"),
    elem("figure"),
    elem("figcaption"),
    elem("blockquote"),
    elem("pre"),
    ElementInfo {
        content_model: ContentModel::None,
        void: true,
        ..elem("hr")
    },
    // SuperHTML template-construct tags: not standard HTML, but are
    // always recognized so `invalid_html_tag_name` never fires on them.
    ElementInfo {
        attributes: &["template"],
        ..elem("extend")
    },
    elem("super"),
    elem("ctx"),
];

/// Attribute names permitted on every element regardless of tag.
pub const GLOBAL_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "lang",
    "title",
    "style",
    "dir",
    "hidden",
    "tabindex",
    "accesskey",
    "draggable",
    "spellcheck",
    "contenteditable",
    "role",
    "slot",
];

/// Whether `name` (already ASCII-lowercased) is a global attribute,
/// including the `data-*` and `on*` families.
pub fn is_global_attribute(name: &[u8]) -> bool {
    if name.starts_with(b"data-") || name.starts_with(b"on") || name.starts_with(b"aria-") {
        return true;
    }
    GLOBAL_ATTRIBUTES.iter().any(|g| g.as_bytes() == name)
}

lazy_static::lazy_static! {
    static ref ELEMENT_INDEX: FxHashMap<&'static str, &'static ElementInfo> = {
        let mut map = FxHashMap::default();
        for info in ELEMENTS {
            map.insert(info.name, info);
        }
        map
    };
}

/// Looks up an element by its ASCII-lowercase tag name.
pub fn lookup(name: &[u8]) -> Option<&'static ElementInfo> {
    let name = std::str::from_utf8(name).ok()?;
    ELEMENT_INDEX.get(name).copied()
}

/// Whether `attr_name` is permitted on an element with the given info
/// (global attributes ∪ element-specific attributes).
pub fn attribute_allowed(info: &ElementInfo, attr_name: &[u8]) -> bool {
    if is_global_attribute(attr_name) {
        return true;
    }
    info.attributes.iter().any(|a| a.as_bytes() == attr_name)
}
