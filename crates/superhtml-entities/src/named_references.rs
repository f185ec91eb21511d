use std::collections::HashMap;

/// Flat list of `(name-without-leading-ampersand, decoded UTF-8 text)` pairs
/// for the commonly used HTML5 named character references. This is a subset
/// of the full WHATWG named character reference table (which runs to
/// thousands of historical aliases); it covers the references that appear
/// in ordinary authored HTML and all of Latin-1 Supplement.
///
/// Grouped into [`ENTITIES`] by the first two bytes of the name, matching
/// the shape the teacher's code generator produced from its JSON source.
const RAW_ENTITIES: &[(&str, &str)] = &[
    ("amp;", "&"),
    ("AMP;", "&"),
    ("amp", "&"),
    ("AMP", "&"),
    ("lt;", "<"),
    ("LT;", "<"),
    ("lt", "<"),
    ("LT", "<"),
    ("gt;", ">"),
    ("GT;", ">"),
    ("gt", ">"),
    ("GT", ">"),
    ("quot;", "\""),
    ("QUOT;", "\""),
    ("quot", "\""),
    ("QUOT", "\""),
    ("apos;", "'"),
    ("nbsp;", "\u{00A0}"),
    ("nbsp", "\u{00A0}"),
    ("copy;", "\u{00A9}"),
    ("copy", "\u{00A9}"),
    ("COPY;", "\u{00A9}"),
    ("reg;", "\u{00AE}"),
    ("reg", "\u{00AE}"),
    ("REG;", "\u{00AE}"),
    ("trade;", "\u{2122}"),
    ("hellip;", "\u{2026}"),
    ("mdash;", "\u{2014}"),
    ("ndash;", "\u{2013}"),
    ("lsquo;", "\u{2018}"),
    ("rsquo;", "\u{2019}"),
    ("sbquo;", "\u{201A}"),
    ("ldquo;", "\u{201C}"),
    ("rdquo;", "\u{201D}"),
    ("bdquo;", "\u{201E}"),
    ("bull;", "\u{2022}"),
    ("dagger;", "\u{2020}"),
    ("Dagger;", "\u{2021}"),
    ("permil;", "\u{2030}"),
    ("lsaquo;", "\u{2039}"),
    ("rsaquo;", "\u{203A}"),
    ("euro;", "\u{20AC}"),
    ("sect;", "\u{00A7}"),
    ("sect", "\u{00A7}"),
    ("para;", "\u{00B6}"),
    ("para", "\u{00B6}"),
    ("middot;", "\u{00B7}"),
    ("middot", "\u{00B7}"),
    ("laquo;", "\u{00AB}"),
    ("laquo", "\u{00AB}"),
    ("raquo;", "\u{00BB}"),
    ("raquo", "\u{00BB}"),
    ("iexcl;", "\u{00A1}"),
    ("iexcl", "\u{00A1}"),
    ("iquest;", "\u{00BF}"),
    ("iquest", "\u{00BF}"),
    ("cent;", "\u{00A2}"),
    ("cent", "\u{00A2}"),
    ("pound;", "\u{00A3}"),
    ("pound", "\u{00A3}"),
    ("yen;", "\u{00A5}"),
    ("yen", "\u{00A5}"),
    ("curren;", "\u{00A4}"),
    ("curren", "\u{00A4}"),
    ("deg;", "\u{00B0}"),
    ("deg", "\u{00B0}"),
    ("plusmn;", "\u{00B1}"),
    ("plusmn", "\u{00B1}"),
    ("sup1;", "\u{00B9}"),
    ("sup1", "\u{00B9}"),
    ("sup2;", "\u{00B2}"),
    ("sup2", "\u{00B2}"),
    ("sup3;", "\u{00B3}"),
    ("sup3", "\u{00B3}"),
    ("frac14;", "\u{00BC}"),
    ("frac14", "\u{00BC}"),
    ("frac12;", "\u{00BD}"),
    ("frac12", "\u{00BD}"),
    ("frac34;", "\u{00BE}"),
    ("frac34", "\u{00BE}"),
    ("times;", "\u{00D7}"),
    ("times", "\u{00D7}"),
    ("divide;", "\u{00F7}"),
    ("divide", "\u{00F7}"),
    ("micro;", "\u{00B5}"),
    ("micro", "\u{00B5}"),
    ("not;", "\u{00AC}"),
    ("not", "\u{00AC}"),
    ("shy;", "\u{00AD}"),
    ("shy", "\u{00AD}"),
    ("macr;", "\u{00AF}"),
    ("macr", "\u{00AF}"),
    ("acute;", "\u{00B4}"),
    ("acute", "\u{00B4}"),
    ("ordf;", "\u{00AA}"),
    ("ordf", "\u{00AA}"),
    ("ordm;", "\u{00BA}"),
    ("ordm", "\u{00BA}"),
    ("uml;", "\u{00A8}"),
    ("uml", "\u{00A8}"),
    ("cedil;", "\u{00B8}"),
    ("cedil", "\u{00B8}"),
    // Latin-1 Supplement letters.
    ("Agrave;", "\u{00C0}"),
    ("Agrave", "\u{00C0}"),
    ("Aacute;", "\u{00C1}"),
    ("Aacute", "\u{00C1}"),
    ("Acirc;", "\u{00C2}"),
    ("Acirc", "\u{00C2}"),
    ("Atilde;", "\u{00C3}"),
    ("Atilde", "\u{00C3}"),
    ("Auml;", "\u{00C4}"),
    ("Auml", "\u{00C4}"),
    ("Aring;", "\u{00C5}"),
    ("Aring", "\u{00C5}"),
    ("AElig;", "\u{00C6}"),
    ("AElig", "\u{00C6}"),
    ("Ccedil;", "\u{00C7}"),
    ("Ccedil", "\u{00C7}"),
    ("Egrave;", "\u{00C8}"),
    ("Egrave", "\u{00C8}"),
    ("Eacute;", "\u{00C9}"),
    ("Eacute", "\u{00C9}"),
    ("Ecirc;", "\u{00CA}"),
    ("Ecirc", "\u{00CA}"),
    ("Euml;", "\u{00CB}"),
    ("Euml", "\u{00CB}"),
    ("Igrave;", "\u{00CC}"),
    ("Igrave", "\u{00CC}"),
    ("Iacute;", "\u{00CD}"),
    ("Iacute", "\u{00CD}"),
    ("Icirc;", "\u{00CE}"),
    ("Icirc", "\u{00CE}"),
    ("Iuml;", "\u{00CF}"),
    ("Iuml", "\u{00CF}"),
    ("ETH;", "\u{00D0}"),
    ("ETH", "\u{00D0}"),
    ("Ntilde;", "\u{00D1}"),
    ("Ntilde", "\u{00D1}"),
    ("Ograve;", "\u{00D2}"),
    ("Ograve", "\u{00D2}"),
    ("Oacute;", "\u{00D3}"),
    ("Oacute", "\u{00D3}"),
    ("Ocirc;", "\u{00D4}"),
    ("Ocirc", "\u{00D4}"),
    ("Otilde;", "\u{00D5}"),
    ("Otilde", "\u{00D5}"),
    ("Ouml;", "\u{00D6}"),
    ("Ouml", "\u{00D6}"),
    ("Oslash;", "\u{00D8}"),
    ("Oslash", "\u{00D8}"),
    ("Ugrave;", "\u{00D9}"),
    ("Ugrave", "\u{00D9}"),
    ("Uacute;", "\u{00DA}"),
    ("Uacute", "\u{00DA}"),
    ("Ucirc;", "\u{00DB}"),
    ("Ucirc", "\u{00DB}"),
    ("Uuml;", "\u{00DC}"),
    ("Uuml", "\u{00DC}"),
    ("Yacute;", "\u{00DD}"),
    ("Yacute", "\u{00DD}"),
    ("THORN;", "\u{00DE}"),
    ("THORN", "\u{00DE}"),
    ("szlig;", "\u{00DF}"),
    ("szlig", "\u{00DF}"),
    ("agrave;", "\u{00E0}"),
    ("agrave", "\u{00E0}"),
    ("aacute;", "\u{00E1}"),
    ("aacute", "\u{00E1}"),
    ("acirc;", "\u{00E2}"),
    ("acirc", "\u{00E2}"),
    ("atilde;", "\u{00E3}"),
    ("atilde", "\u{00E3}"),
    ("auml;", "\u{00E4}"),
    ("auml", "\u{00E4}"),
    ("aring;", "\u{00E5}"),
    ("aring", "\u{00E5}"),
    ("aelig;", "\u{00E6}"),
    ("aelig", "\u{00E6}"),
    ("ccedil;", "\u{00E7}"),
    ("ccedil", "\u{00E7}"),
    ("egrave;", "\u{00E8}"),
    ("egrave", "\u{00E8}"),
    ("eacute;", "\u{00E9}"),
    ("eacute", "\u{00E9}"),
    ("ecirc;", "\u{00EA}"),
    ("ecirc", "\u{00EA}"),
    ("euml;", "\u{00EB}"),
    ("euml", "\u{00EB}"),
    ("igrave;", "\u{00EC}"),
    ("igrave", "\u{00EC}"),
    ("iacute;", "\u{00ED}"),
    ("iacute", "\u{00ED}"),
    ("icirc;", "\u{00EE}"),
    ("icirc", "\u{00EE}"),
    ("iuml;", "\u{00EF}"),
    ("iuml", "\u{00EF}"),
    ("eth;", "\u{00F0}"),
    ("eth", "\u{00F0}"),
    ("ntilde;", "\u{00F1}"),
    ("ntilde", "\u{00F1}"),
    ("ograve;", "\u{00F2}"),
    ("ograve", "\u{00F2}"),
    ("oacute;", "\u{00F3}"),
    ("oacute", "\u{00F3}"),
    ("ocirc;", "\u{00F4}"),
    ("ocirc", "\u{00F4}"),
    ("otilde;", "\u{00F5}"),
    ("otilde", "\u{00F5}"),
    ("ouml;", "\u{00F6}"),
    ("ouml", "\u{00F6}"),
    ("oslash;", "\u{00F8}"),
    ("oslash", "\u{00F8}"),
    ("ugrave;", "\u{00F9}"),
    ("ugrave", "\u{00F9}"),
    ("uacute;", "\u{00FA}"),
    ("uacute", "\u{00FA}"),
    ("ucirc;", "\u{00FB}"),
    ("ucirc", "\u{00FB}"),
    ("uuml;", "\u{00FC}"),
    ("uuml", "\u{00FC}"),
    ("yacute;", "\u{00FD}"),
    ("yacute", "\u{00FD}"),
    ("thorn;", "\u{00FE}"),
    ("thorn", "\u{00FE}"),
    ("yuml;", "\u{00FF}"),
    ("yuml", "\u{00FF}"),
    // Greek letters (used in math-flavored prose).
    ("Alpha;", "\u{0391}"),
    ("Beta;", "\u{0392}"),
    ("Gamma;", "\u{0393}"),
    ("Delta;", "\u{0394}"),
    ("Epsilon;", "\u{0395}"),
    ("Zeta;", "\u{0396}"),
    ("Eta;", "\u{0397}"),
    ("Theta;", "\u{0398}"),
    ("Iota;", "\u{0399}"),
    ("Kappa;", "\u{039A}"),
    ("Lambda;", "\u{039B}"),
    ("Mu;", "\u{039C}"),
    ("Nu;", "\u{039D}"),
    ("Xi;", "\u{039E}"),
    ("Omicron;", "\u{039F}"),
    ("Pi;", "\u{03A0}"),
    ("Rho;", "\u{03A1}"),
    ("Sigma;", "\u{03A3}"),
    ("Tau;", "\u{03A4}"),
    ("Upsilon;", "\u{03A5}"),
    ("Phi;", "\u{03A6}"),
    ("Chi;", "\u{03A7}"),
    ("Psi;", "\u{03A8}"),
    ("Omega;", "\u{03A9}"),
    ("alpha;", "\u{03B1}"),
    ("beta;", "\u{03B2}"),
    ("gamma;", "\u{03B3}"),
    ("delta;", "\u{03B4}"),
    ("epsilon;", "\u{03B5}"),
    ("zeta;", "\u{03B6}"),
    ("eta;", "\u{03B7}"),
    ("theta;", "\u{03B8}"),
    ("iota;", "\u{03B9}"),
    ("kappa;", "\u{03BA}"),
    ("lambda;", "\u{03BB}"),
    ("mu;", "\u{03BC}"),
    ("nu;", "\u{03BD}"),
    ("xi;", "\u{03BE}"),
    ("omicron;", "\u{03BF}"),
    ("pi;", "\u{03C0}"),
    ("rho;", "\u{03C1}"),
    ("sigmaf;", "\u{03C2}"),
    ("sigma;", "\u{03C3}"),
    ("tau;", "\u{03C4}"),
    ("upsilon;", "\u{03C5}"),
    ("phi;", "\u{03C6}"),
    ("chi;", "\u{03C7}"),
    ("psi;", "\u{03C8}"),
    ("omega;", "\u{03C9}"),
    // Arrows and math symbols.
    ("larr;", "\u{2190}"),
    ("uarr;", "\u{2191}"),
    ("rarr;", "\u{2192}"),
    ("darr;", "\u{2193}"),
    ("harr;", "\u{2194}"),
    ("spades;", "\u{2660}"),
    ("clubs;", "\u{2663}"),
    ("hearts;", "\u{2665}"),
    ("diams;", "\u{2666}"),
    ("infin;", "\u{221E}"),
    ("ne;", "\u{2260}"),
    ("le;", "\u{2264}"),
    ("ge;", "\u{2265}"),
    ("sum;", "\u{2211}"),
    ("prod;", "\u{220F}"),
    ("radic;", "\u{221A}"),
    ("int;", "\u{222B}"),
    ("there4;", "\u{2234}"),
    ("sim;", "\u{223C}"),
    ("cong;", "\u{2245}"),
    ("asymp;", "\u{2248}"),
    ("equiv;", "\u{2261}"),
    ("forall;", "\u{2200}"),
    ("part;", "\u{2202}"),
    ("exist;", "\u{2203}"),
    ("empty;", "\u{2205}"),
    ("nabla;", "\u{2207}"),
    ("isin;", "\u{2208}"),
    ("notin;", "\u{2209}"),
    ("ni;", "\u{220B}"),
    ("and;", "\u{2227}"),
    ("or;", "\u{2228}"),
    ("cap;", "\u{2229}"),
    ("cup;", "\u{222A}"),
    ("sdot;", "\u{22C5}"),
    ("oplus;", "\u{2295}"),
    ("otimes;", "\u{2297}"),
    ("perp;", "\u{22A5}"),
];

lazy_static::lazy_static! {
    /// Named character references grouped by the first two bytes of the
    /// name, mirroring the shape the teacher's `gen-entities` proc macro
    /// produced from its JSON source (`BTreeMap<[u8; 2], Vec<(suffix,
    /// decoded)>>`).
    pub static ref ENTITIES: HashMap<[u8; 2], Vec<(&'static [u8], &'static [u8])>> = {
        let mut map: HashMap<[u8; 2], Vec<(&'static [u8], &'static [u8])>> = HashMap::new();
        for (name, decoded) in RAW_ENTITIES {
            let bytes = name.as_bytes();
            if bytes.len() < 2 {
                continue;
            }
            let prefix = [bytes[0], bytes[1]];
            map.entry(prefix)
                .or_default()
                .push((&bytes[2..], decoded.as_bytes()));
        }
        // Longest suffix first, so e.g. "p;" is preferred over "p" when both
        // match — mirrors the teacher's semicolon-terminated entities being
        // looked up before their legacy un-terminated aliases.
        for candidates in map.values_mut() {
            candidates.sort_by_key(|(suffix, _)| std::cmp::Reverse(suffix.len()));
        }
        map
    };
}
