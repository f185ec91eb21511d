use crate::compat_mode::CompatMode;
use crate::{strcspn, strspn};

/// A parsed `<!DOCTYPE ...>` declaration.
///
/// DOCTYPE declarations comprise a name, an optional public identifier, an
/// optional system identifier, and the document compatibility mode they
/// imply when found as the first thing in a document. Quirks mode mostly
/// affects whether CSS class selectors match `class` attribute values
/// case-sensitively (no-quirks) or not (quirks).
///
/// See <https://html.spec.whatwg.org/#the-doctype>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeInfo {
    /// Name of the DOCTYPE, lower-cased. Should be `html` for HTML documents.
    pub name: Option<Box<[u8]>>,
    /// Public identifier, if one was present.
    pub public_identifier: Option<Box<[u8]>>,
    /// System identifier, if one was present.
    pub system_identifier: Option<Box<[u8]>>,
    /// The compatibility mode this DOCTYPE indicates.
    pub indicated_compatability_mode: CompatMode,
}

impl DoctypeInfo {
    /// Applies the HTML quirks-mode detection algorithm to a parsed DOCTYPE
    /// token. See <https://html.spec.whatwg.org/#the-initial-insertion-mode>
    /// for the "anything else" branch that drives this.
    fn new(
        name: Option<Box<[u8]>>,
        public_identifier: Option<Box<[u8]>>,
        system_identifier: Option<Box<[u8]>>,
        force_quirks_flag: bool,
    ) -> Self {
        if force_quirks_flag {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::Quirks,
            };
        }

        // Normative documents contain the literal `<!DOCTYPE html>` with no
        // identifiers; short-circuit to avoid the rest of the matching below.
        if name
            .as_ref()
            .map(|n| n.as_ref() == b"html")
            .unwrap_or(false)
            && public_identifier.is_none()
            && system_identifier.is_none()
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::NoQuirks,
            };
        }

        // The tokenizer reports the name lower-cased already, so no
        // conversion is needed to compare it against "html".
        if !name
            .as_ref()
            .map(|n| n.as_ref() == b"html")
            .unwrap_or(false)
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::Quirks,
            };
        }

        // Public/system identifiers are compared ASCII-case-insensitively,
        // and a missing identifier is treated as empty for comparison but
        // distinct from empty for the "is missing" checks below.
        let system_identifier_is_missing = system_identifier.is_none();
        let public_identifier_cleaned = match public_identifier {
            Some(ref s) => s.to_ascii_lowercase(),
            None => vec![],
        };
        let system_identifier_cleaned = match system_identifier {
            Some(ref s) => s.to_ascii_lowercase(),
            None => vec![],
        };

        if *b"-//w3o//dtd w3 html strict 3.0//en//" == *public_identifier_cleaned
            || *b"-/w3c/dtd html 4.0 transitional/en" == *public_identifier_cleaned
            || *b"html" == *public_identifier_cleaned
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::Quirks,
            };
        }

        if *b"http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"
            == *system_identifier_cleaned
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::Quirks,
            };
        }

        // Everything below depends on a non-empty public identifier.
        if public_identifier_cleaned.is_empty() {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::Quirks,
            };
        }

        // Legacy DTD public identifiers that force quirks mode: a fixed
        // list of SGML-era DTDs from the HTML5 quirks-mode algorithm.
        if public_identifier_cleaned.starts_with(b"+//silmaril//dtd html pro v0r11 19970101//")
            || public_identifier_cleaned.starts_with(b"-//as//dtd html 3.0 aswedit + extensions//")
            || public_identifier_cleaned
                .starts_with(b"-//advasoft ltd//dtd html 3.0 aswedit + extensions//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 2.0 level 1//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 2.0 level 2//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 2.0 strict level 1//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 2.0 strict level 2//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 2.0 strict//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 2.0//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 2.1e//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 3.0//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 3.2 final//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 3.2//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html 3//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html level 0//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html level 1//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html level 2//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html level 3//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html strict level 0//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html strict level 1//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html strict level 2//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html strict level 3//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html strict//")
            || public_identifier_cleaned.starts_with(b"-//ietf//dtd html//")
            || public_identifier_cleaned.starts_with(b"-//metrius//dtd metrius presentational//")
            || public_identifier_cleaned
                .starts_with(b"-//microsoft//dtd internet explorer 2.0 html strict//")
            || public_identifier_cleaned
                .starts_with(b"-//microsoft//dtd internet explorer 2.0 html//")
            || public_identifier_cleaned
                .starts_with(b"-//microsoft//dtd internet explorer 2.0 tables//")
            || public_identifier_cleaned
                .starts_with(b"-//microsoft//dtd internet explorer 3.0 html strict//")
            || public_identifier_cleaned
                .starts_with(b"-//microsoft//dtd internet explorer 3.0 html//")
            || public_identifier_cleaned
                .starts_with(b"-//microsoft//dtd internet explorer 3.0 tables//")
            || public_identifier_cleaned.starts_with(b"-//netscape comm. corp.//dtd html//")
            || public_identifier_cleaned.starts_with(b"-//netscape comm. corp.//dtd strict html//")
            || public_identifier_cleaned.starts_with(b"-//o'reilly and associates//dtd html 2.0//")
            || public_identifier_cleaned
                .starts_with(b"-//o'reilly and associates//dtd html extended 1.0//")
            || public_identifier_cleaned
                .starts_with(b"-//o'reilly and associates//dtd html extended relaxed 1.0//")
            || public_identifier_cleaned.starts_with(b"-//sq//dtd html 2.0 hotmetal + extensions//")
            || public_identifier_cleaned.starts_with(
                b"-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
            )
            || public_identifier_cleaned.starts_with(
                b"-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
            )
            || public_identifier_cleaned.starts_with(b"-//spyglass//dtd html 2.0 extended//")
            || public_identifier_cleaned
                .starts_with(b"-//sun microsystems corp.//dtd hotjava html//")
            || public_identifier_cleaned
                .starts_with(b"-//sun microsystems corp.//dtd hotjava strict html//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 3 1995-03-24//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 3.2 draft//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 3.2 final//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 3.2//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 3.2s draft//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 4.0 frameset//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 4.0 transitional//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html experimental 19960712//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd html experimental 970421//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd w3 html//")
            || public_identifier_cleaned.starts_with(b"-//w3o//dtd w3 html 3.0//")
            || public_identifier_cleaned.starts_with(b"-//webtechs//dtd mozilla html 2.0//")
            || public_identifier_cleaned.starts_with(b"-//webtechs//dtd mozilla html//")
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::Quirks,
            };
        }

        if system_identifier_is_missing
            && (public_identifier_cleaned.starts_with(b"-//w3c//dtd html 4.01 frameset//")
                || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 4.01 transitional//"))
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::Quirks,
            };
        }

        // Limited-quirks: same shape as above but a less severe mode.
        if public_identifier_cleaned.starts_with(b"-//w3c//dtd xhtml 1.0 frameset//")
            || public_identifier_cleaned.starts_with(b"-//w3c//dtd xhtml 1.0 transitional//")
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::LimitedQuirks,
            };
        }

        if !system_identifier_is_missing
            && (public_identifier_cleaned.starts_with(b"-//w3c//dtd html 4.01 frameset//")
                || public_identifier_cleaned.starts_with(b"-//w3c//dtd html 4.01 transitional//"))
        {
            return Self {
                name,
                public_identifier,
                system_identifier,
                indicated_compatability_mode: CompatMode::LimitedQuirks,
            };
        }

        Self {
            name,
            public_identifier,
            system_identifier,
            indicated_compatability_mode: CompatMode::NoQuirks,
        }
    }

    /// Parses a complete raw DOCTYPE declaration, e.g. `<!DOCTYPE html>`, and
    /// infers its compatibility mode.
    ///
    /// The input must be a complete DOCTYPE token: it must start with an
    /// ASCII case-insensitive `<!DOCTYPE` and contain exactly one `>`, in the
    /// final position. Anything else returns `None` — this function does not
    /// tokenize a larger document, it only interprets an already-isolated
    /// DOCTYPE token such as the one the tokenizer hands to its caller.
    ///
    /// ```
    /// use superhtml_core::compat_mode::CompatMode;
    /// use superhtml_core::doctype::DoctypeInfo;
    ///
    /// let doctype = DoctypeInfo::from_doctype_token(b"<!DOCTYPE html>").unwrap();
    /// assert_eq!(doctype.indicated_compatability_mode, CompatMode::NoQuirks);
    ///
    /// let doctype = DoctypeInfo::from_doctype_token(b"<!doctype JSON SILLY>").unwrap();
    /// assert_eq!(doctype.indicated_compatability_mode, CompatMode::Quirks);
    ///
    /// assert!(DoctypeInfo::from_doctype_token(b"<!DOCTYPE ><p>").is_none());
    /// ```
    pub fn from_doctype_token(doctype_html: &[u8]) -> Option<Self> {
        let mut doctype_name = None;
        let mut doctype_public_id = None;
        let mut doctype_system_id = None;

        // This combines the rules for parsing DOCTYPE tokens found in the
        // DOCTYPE-related tokenizer states. See
        // <https://html.spec.whatwg.org/#doctype-state>.
        if doctype_html.len() < 10 || !doctype_html[0..9].eq_ignore_ascii_case(b"<!DOCTYPE") {
            return None;
        }

        let mut at: usize = 9;
        if b'>' != doctype_html[doctype_html.len() - 1]
            || (strcspn!(doctype_html, b'>', at) + at) < doctype_html.len() - 1
        {
            return None;
        }

        // Newline normalization and NUL replacement, as for any HTML input
        // stream. See <https://infra.spec.whatwg.org/#normalize-newlines>.
        let mut doctype_html_normalized: Vec<u8> = Vec::new();
        let mut chars = doctype_html.iter().peekable();
        while let Some(&c) = chars.next() {
            match c {
                b'\r' => {
                    if chars.peek() == Some(&&b'\n') {
                        chars.next();
                    }
                    doctype_html_normalized.push(b'\n');
                }
                b'\0' => {
                    "\u{FFFD}"
                        .as_bytes()
                        .iter()
                        .for_each(|c| doctype_html_normalized.push(*c));
                }
                _ => doctype_html_normalized.push(c),
            }
        }
        let doctype_html = doctype_html_normalized.as_slice();

        let end = doctype_html.len() - 1;

        // "Before DOCTYPE name state": skip whitespace.
        at += strspn!(doctype_html, b' ' | b'\t' | b'\n' | 0x0c | b'\r', at);

        if at >= end {
            return Some(Self::new(
                doctype_name,
                doctype_public_id,
                doctype_system_id,
                true,
            ));
        }

        let name_length = strcspn!(
            doctype_html,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r',
            at,
            end - at
        );
        doctype_name = Some(
            doctype_html[at..at + name_length]
                .to_ascii_lowercase()
                .into(),
        );

        at += name_length;
        at += strspn!(
            doctype_html,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r',
            at,
            end - at
        );
        if at >= end {
            return Some(Self::new(
                doctype_name,
                doctype_public_id,
                doctype_system_id,
                false,
            ));
        }

        // "After DOCTYPE name state": look for PUBLIC or SYSTEM, else bogus.
        if at + 6 >= end {
            return Some(Self::new(
                doctype_name,
                doctype_public_id,
                doctype_system_id,
                true,
            ));
        }

        let mut next_parse = if doctype_html[at..at + 6].eq_ignore_ascii_case(b"PUBLIC") {
            at += 6;
            at += strspn!(
                doctype_html,
                b' ' | b'\t' | b'\n' | 0x0c | b'\r',
                at,
                end - at
            );
            if at >= end {
                return Some(Self::new(
                    doctype_name,
                    doctype_public_id,
                    doctype_system_id,
                    true,
                ));
            }
            Proceed::ParseDoctypePublicIdentifier
        } else if doctype_html[at..at + 6].eq_ignore_ascii_case(b"SYSTEM") {
            at += 6;
            at += strspn!(
                doctype_html,
                b' ' | b'\t' | b'\n' | 0x0c | b'\r',
                at,
                end - at
            );
            if at >= end {
                return Some(Self::new(
                    doctype_name,
                    doctype_public_id,
                    doctype_system_id,
                    true,
                ));
            }
            Proceed::ParseDoctypeSystemIdentifier
        } else {
            return Some(Self::new(
                doctype_name,
                doctype_public_id,
                doctype_system_id,
                true,
            ));
        };

        loop {
            next_parse = match next_parse {
                Proceed::ParseDoctypePublicIdentifier => {
                    let closer_quote = doctype_html[at];
                    if b'"' != closer_quote && b'\'' != closer_quote {
                        return Some(Self::new(
                            doctype_name,
                            doctype_public_id,
                            doctype_system_id,
                            true,
                        ));
                    }

                    at += 1;

                    let identifier_length =
                        strcspn!(doctype_html, x if x == closer_quote, at, end - at);

                    doctype_public_id = Some(doctype_html[at..at + identifier_length].into());

                    at += identifier_length;
                    if at >= end || closer_quote != doctype_html[at] {
                        return Some(Self::new(
                            doctype_name,
                            doctype_public_id,
                            doctype_system_id,
                            true,
                        ));
                    }

                    at += 1;

                    // "Between DOCTYPE public and system identifiers state".
                    at += strspn!(
                        doctype_html,
                        b' ' | b'\t' | b'\n' | 0x0c | b'\r',
                        at,
                        end - at
                    );
                    if at >= end {
                        return Some(Self::new(
                            doctype_name,
                            doctype_public_id,
                            doctype_system_id,
                            false,
                        ));
                    }
                    Proceed::ParseDoctypeSystemIdentifier
                }
                Proceed::ParseDoctypeSystemIdentifier => {
                    let closer_quote = doctype_html[at];
                    if b'"' != closer_quote && b'\'' != closer_quote {
                        return Some(Self::new(
                            doctype_name,
                            doctype_public_id,
                            doctype_system_id,
                            true,
                        ));
                    }

                    at += 1;

                    let identifier_length =
                        strcspn!(doctype_html, x if x == closer_quote, at, end - at);
                    doctype_system_id = Some(doctype_html[at..at + identifier_length].into());

                    at += identifier_length;
                    if at >= end || closer_quote != doctype_html[at] {
                        return Some(Self::new(
                            doctype_name,
                            doctype_public_id,
                            doctype_system_id,
                            true,
                        ));
                    }
                    Proceed::Exit
                }
                Proceed::Exit => break,
            }
        }

        Some(Self::new(
            doctype_name,
            doctype_public_id,
            doctype_system_id,
            false,
        ))
    }
}

enum Proceed {
    ParseDoctypePublicIdentifier,
    ParseDoctypeSystemIdentifier,
    Exit,
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! test_doctype_info {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (a,b,c,d,e): (&str, CompatMode,Option<&str>,Option<&str>,Option<&str>) = $value;
                let doctype = DoctypeInfo::from_doctype_token(a.as_bytes());
                assert!(
                    doctype.is_some(),
                    "Should have parsed the following doctype declaration: {:?}",
                    String::from_utf8_lossy(a.as_bytes())
                );
                let doctype = doctype.unwrap();

                assert_eq!(
                    b,
                    doctype.indicated_compatability_mode,
                    "Failed to infer the expected document compatability mode for {:?}",
                    String::from_utf8_lossy(a.as_bytes())
                );

                assert_eq!(
                    c.map(|val| val.as_bytes().into()),
                    doctype.name,
                    "Failed to parse the expected DOCTYPE name for {:?}",
                    String::from_utf8_lossy(a.as_bytes())
                );

                assert_eq!(
                    d.map(|val| val.as_bytes().into()),
                    doctype.public_identifier,
                    "Failed to parse the expected DOCTYPE public identifier for {:?}",
                    String::from_utf8_lossy(a.as_bytes())
                );

                assert_eq!(
                    e.map(|val| val.as_bytes().into()),
                    doctype.system_identifier,
                    "Failed to parse the expected DOCTYPE system identifier for {:?}",
                    String::from_utf8_lossy(a.as_bytes())
                );
            }
        )*
        }
    }

    test_doctype_info! {
        missing_doctype_name:                                  ( "<!DOCTYPE>",                                                                                              CompatMode::NoQuirks,      None,                                                                    None,                                     None ),
        html5_doctype:                                         ( "<!DOCTYPE html>",                                                                                         CompatMode::NoQuirks,      Some("html"),                                                            None,                                     None ),
        html5_doctype_no_whitespace_before_name:               ( "<!DOCTYPEhtml>",                                                                                          CompatMode::NoQuirks,      Some("html"),                                                            None,                                     None ),
        xhtml_doctype:                                         ( r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,           CompatMode::NoQuirks,      Some("html"),                                                            Some("-//W3C//DTD HTML 4.01//EN"),        Some("http://www.w3.org/TR/html4/strict.dtd") ),
        svg_doctype:                                           ( r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#,   CompatMode::Quirks,        Some("svg"),                                                             Some("-//W3C//DTD SVG 1.1//EN"),          Some("http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd") ),
        mathml_doctype:                                        ( r#"<!DOCTYPE math PUBLIC "-//W3C//DTD MathML 2.0//EN" "http://www.w3.org/Math/DTD/mathml2/mathml2.dtd">"#, CompatMode::Quirks,        Some("math"),                                                            Some("-//W3C//DTD MathML 2.0//EN"),       Some("http://www.w3.org/Math/DTD/mathml2/mathml2.dtd") ),
        doctype_with_null_byte_replacement:                    ( "<!DOCTYPE null-\0 PUBLIC '\0' '\0\0'>",                                                                   CompatMode::Quirks,        Some("null-\u{FFFD}"),                                                   Some("\u{FFFD}"),                         Some("\u{FFFD}\u{FFFD}") ),
        uppercase_doctype:                                     ( "<!DOCTYPE UPPERCASE>",                                                                                    CompatMode::Quirks,        Some("uppercase"),                                                       None,                                     None ),
        lowercase_doctype:                                     ( "<!doctype lowercase>",                                                                                    CompatMode::Quirks,        Some("lowercase"),                                                       None,                                     None ),
        doctype_with_whitespace:                               ( "<!DOCTYPE\n\thtml\x0c\rPUBLIC\r\n''\t''>",                                                                CompatMode::NoQuirks,      Some("html"),                                                            Some(""),                                 Some("") ),
        doctype_trailing_characters:                           ( "<!DOCTYPE html PUBLIC '' '' Anything (except closing angle bracket) is just fine here !!!>",              CompatMode::NoQuirks,      Some("html"),                                                            Some(""),                                 Some("") ),
        an_ugly_no_quirks_doctype:                             ( "<!dOcTyPehtml\tPublIC\"pub-id\"'sysid'>",                                                                 CompatMode::NoQuirks,      Some("html"),                                                            Some("pub-id"),                           Some("sysid") ),
        missing_public_id:                                     ( "<!DOCTYPE html PUBLIC>",                                                                                  CompatMode::Quirks,        Some("html"),                                                            None,                                     None ),
        missing_system_id:                                     ( "<!DOCTYPE html SYSTEM>",                                                                                  CompatMode::Quirks,        Some("html"),                                                            None,                                     None ),
        missing_close_quote_public_id:                         ( "<!DOCTYPE html PUBLIC 'xyz>",                                                                             CompatMode::Quirks,        Some("html"),                                                            Some("xyz"),                              None ),
        missing_close_quote_system_id:                         ( r#"<!DOCTYPE html SYSTEM "xyz>"#,                                                                          CompatMode::Quirks,        Some("html"),                                                            None,                                     Some("xyz") ),
        missing_close_quote_system_id_with_public:             ( "<!DOCTYPE html PUBLIC 'abc' 'xyz>",                                                                       CompatMode::Quirks,        Some("html"),                                                            Some("abc"),                              Some("xyz") ),
        bogus_characters_instead_of_system_or_public:          ( "<!DOCTYPE html FOOBAR>",                                                                                  CompatMode::Quirks,        Some("html"),                                                            None,                                     None ),
        bogus_characters_instead_of_public_quote:              ( "<!DOCTYPE html PUBLIC x ''''>",                                                                           CompatMode::Quirks,        Some("html"),                                                            None,                                     None ),
        bogus_characters_instead_of_system_quote_:             ( "<!DOCTYPE html SYSTEM x ''>",                                                                             CompatMode::Quirks,        Some("html"),                                                            None,                                     None ),
        emoji:                                                 ( r#"<!DOCTYPE 🏴󠁧󠁢󠁥󠁮󠁧󠁿 PUBLIC "🔥" "😈">"#,                                                                 CompatMode::Quirks,        Some("\u{1F3F4}\u{E0067}\u{E0062}\u{E0065}\u{E006E}\u{E0067}\u{E007F}"), Some("🔥"),                               Some("😈") ),
        bogus_characters_instead_of_system_quote_after_public: ( "<!DOCTYPE html PUBLIC ''x''>",                                                                            CompatMode::Quirks,        Some("html"),                                                            Some(""),                                 None ),
        special_quirks_mode_if_system_unset:                   ( r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Frameset//">"#,                                            CompatMode::Quirks,        Some("html"),                                                            Some("-//W3C//DTD HTML 4.01 Frameset//"), None ),
        special_limited_quirks_mode_if_system_set:             ( r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Frameset//" "">"#,                                         CompatMode::LimitedQuirks, Some("html"),                                                            Some("-//W3C//DTD HTML 4.01 Frameset//"), Some("") ),
    }

    #[test]
    fn test_invalid_inputs() {
        let test_cases = vec![
            b"".as_slice(),
            b"<div>".as_slice(),
            b"x<!DOCTYPE>".as_slice(),
            b"<!DOCTYPE>x".as_slice(),
            b"<!DOCTYPE".as_slice(),
            b"<!DOCTYPE html PUBLIC \">\">".as_slice(),
        ];

        for html in test_cases {
            assert!(
                DoctypeInfo::from_doctype_token(html).is_none(),
                "Should return None for invalid input: {:?}",
                String::from_utf8_lossy(html)
            );
        }
    }
}
