//! Byte-stream tokenizer producing source-preserving tokens.
//!
//! Every span in a [`Token`] points back into the caller's source buffer;
//! no token owns a copy of its text. Concatenating token spans in
//! emission order reconstructs the input exactly — text runs fill every
//! gap between markup, including malformed markup recovered as text.

use crate::elements::{self, RawTextMode};
use crate::lang::Lang;
use crate::span::Span;
use crate::{strcspn, strspn};

/// Low-level, tokenizer-level parse errors. Never fatal: the tokenizer
/// always recovers and keeps producing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorTag {
    UnexpectedNull,
    UnexpectedCharacterInTagName,
    UnexpectedCharacterInAttributeName,
    UnexpectedEqualsSignBeforeAttributeName,
    MissingAttributeValue,
    MissingWhitespaceBetweenAttributes,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofInTag,
    EofInComment,
    EofInDoctype,
    AbruptClosingOfEmptyComment,
    IncorrectlyOpenedComment,
    MissingDoctypeName,
    MissingWhitespaceBeforeDoctypeName,
    InvalidFirstCharacterOfTagName,
    CdataInHtmlContent,
}

impl From<ParseErrorTag> for &'static str {
    fn from(tag: ParseErrorTag) -> &'static str {
        match tag {
            ParseErrorTag::UnexpectedNull => "unexpected-null-character",
            ParseErrorTag::UnexpectedCharacterInTagName => "unexpected-character-in-tag-name",
            ParseErrorTag::UnexpectedCharacterInAttributeName => {
                "unexpected-character-in-attribute-name"
            }
            ParseErrorTag::UnexpectedEqualsSignBeforeAttributeName => {
                "unexpected-equals-sign-before-attribute-name"
            }
            ParseErrorTag::MissingAttributeValue => "missing-attribute-value",
            ParseErrorTag::MissingWhitespaceBetweenAttributes => {
                "missing-whitespace-between-attributes"
            }
            ParseErrorTag::EndTagWithAttributes => "end-tag-with-attributes",
            ParseErrorTag::EndTagWithTrailingSolidus => "end-tag-with-trailing-solidus",
            ParseErrorTag::EofInTag => "eof-in-tag",
            ParseErrorTag::EofInComment => "eof-in-comment",
            ParseErrorTag::EofInDoctype => "eof-in-doctype",
            ParseErrorTag::AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            ParseErrorTag::IncorrectlyOpenedComment => "incorrectly-opened-comment",
            ParseErrorTag::MissingDoctypeName => "missing-doctype-name",
            ParseErrorTag::MissingWhitespaceBeforeDoctypeName => {
                "missing-whitespace-before-doctype-name"
            }
            ParseErrorTag::InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            ParseErrorTag::CdataInHtmlContent => "cdata-in-html-content",
        }
    }
}

impl std::fmt::Display for ParseErrorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &str = (*self).into();
        f.write_str(s)
    }
}

/// Quoting style of an attribute value, as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    None,
    Single,
    Double,
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeValue {
    pub quote: QuoteStyle,
    /// Excludes the surrounding quotes, if any.
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    pub name_span: Span,
    pub value: Option<AttributeValue>,
}

/// Lazily walks the attributes of a start/end/self-closing tag.
pub struct AttributeIter<'a> {
    source: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> AttributeIter<'a> {
    fn new(source: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            source,
            pos: start,
            end,
        }
    }
}

impl<'a> Iterator for AttributeIter<'a> {
    type Item = Attribute;

    fn next(&mut self) -> Option<Attribute> {
        let source = self.source;
        let end = self.end;

        self.pos += strspn!(
            source,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r' | b'/',
            self.pos,
            end.saturating_sub(self.pos)
        );
        if self.pos >= end {
            return None;
        }

        let name_start = self.pos;
        let name_len = strcspn!(
            source,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r' | b'=',
            self.pos,
            end - self.pos
        );
        if name_len == 0 {
            // Stray `=` with no preceding name; skip it to make progress.
            self.pos += 1;
            return self.next();
        }
        let name_span = Span::new(name_start as u32, (name_start + name_len) as u32);
        self.pos += name_len;

        self.pos += strspn!(
            source,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r',
            self.pos,
            end.saturating_sub(self.pos)
        );

        if self.pos >= end || source[self.pos] != b'=' {
            return Some(Attribute {
                name_span,
                value: None,
            });
        }

        self.pos += 1;
        self.pos += strspn!(
            source,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r',
            self.pos,
            end.saturating_sub(self.pos)
        );
        if self.pos >= end {
            return Some(Attribute {
                name_span,
                value: Some(AttributeValue {
                    quote: QuoteStyle::None,
                    span: Span::at(self.pos as u32),
                }),
            });
        }

        let quote_char = source[self.pos];
        if quote_char == b'"' || quote_char == b'\'' {
            self.pos += 1;
            let value_start = self.pos;
            let value_len = strcspn!(source, x if x == quote_char, self.pos, end - self.pos);
            let value_span = Span::new(value_start as u32, (value_start + value_len) as u32);
            self.pos += value_len;
            if self.pos < end && source[self.pos] == quote_char {
                self.pos += 1;
            }
            Some(Attribute {
                name_span,
                value: Some(AttributeValue {
                    quote: if quote_char == b'"' {
                        QuoteStyle::Double
                    } else {
                        QuoteStyle::Single
                    },
                    span: value_span,
                }),
            })
        } else {
            let value_start = self.pos;
            let value_len = strcspn!(
                source,
                b' ' | b'\t' | b'\n' | 0x0c | b'\r',
                self.pos,
                end - self.pos
            );
            let value_span = Span::new(value_start as u32, (value_start + value_len) as u32);
            self.pos += value_len;
            Some(Attribute {
                name_span,
                value: Some(AttributeValue {
                    quote: QuoteStyle::None,
                    span: value_span,
                }),
            })
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TagToken {
    pub span: Span,
    pub name_span: Span,
    attrs_start: u32,
    attrs_end: u32,
}

impl TagToken {
    pub fn attributes<'a>(&self, source: &'a [u8]) -> AttributeIter<'a> {
        AttributeIter::new(source, self.attrs_start as usize, self.attrs_end as usize)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoctypeToken {
    pub span: Span,
    pub name_span: Option<Span>,
}

#[derive(Debug, Clone, Copy)]
pub enum Token {
    Doctype(DoctypeToken),
    StartTag(TagToken),
    SelfClosingTag(TagToken),
    EndTag(TagToken),
    Comment(Span),
    Text(Span),
    ParseError(ParseErrorTag, Span),
}

impl Token {
    pub fn span(&self) -> Span {
        match self {
            Token::Doctype(d) => d.span,
            Token::StartTag(t) | Token::SelfClosingTag(t) | Token::EndTag(t) => t.span,
            Token::Comment(s) | Token::Text(s) => *s,
            Token::ParseError(_, s) => *s,
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Data,
    RawText { mode: RawTextMode, end_tag: Box<[u8]> },
}

/// Produces [`Token`]s from a byte slice, one at a time.
///
/// Synchronous and allocation-free beyond the `end_tag` buffer kept while
/// inside raw-text/RCDATA content, and the caller-owned errors vector.
pub struct Tokenizer<'a> {
    source: &'a [u8],
    pos: usize,
    lang: Lang,
    mode: Mode,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a [u8], lang: Lang) -> Self {
        Self {
            source,
            pos: 0,
            lang,
            mode: Mode::Data,
        }
    }

    /// Restarts tokenization from `offset` in `Data` mode, discarding any
    /// in-progress raw-text tracking. Used by callers re-seeking after an
    /// AST-level recovery action.
    pub fn seek(&mut self, offset: usize) {
        self.pos = offset;
        self.mode = Mode::Data;
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\n' | 0x0c | b'\r')
    }

    fn next_text(&mut self) -> Token {
        let start = self.pos;
        let len = strcspn!(self.source, b'<', self.pos, self.source.len() - self.pos);
        self.pos += len.max(1).min(self.source.len() - start);
        Token::Text(Span::new(start as u32, self.pos as u32))
    }

    fn raw_text_end(&self, end_tag: &[u8]) -> Option<usize> {
        let mut search_from = self.pos;
        loop {
            let rel = crate::str_fns::stripos(
                &self.source[search_from..],
                b"</",
                0,
            )?;
            let candidate = search_from + rel;
            let name_start = candidate + 2;
            if name_start + end_tag.len() > self.source.len() {
                return None;
            }
            let candidate_name = &self.source[name_start..name_start + end_tag.len()];
            let boundary = self.source.get(name_start + end_tag.len()).copied();
            let boundary_ok = matches!(
                boundary,
                None | Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(0x0c) | Some(b'\r')
            );
            if candidate_name.eq_ignore_ascii_case(end_tag) && boundary_ok {
                return Some(candidate);
            }
            search_from = candidate + 2;
        }
    }

    fn parse_tag_name(&self, start: usize) -> usize {
        strcspn!(
            self.source,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r' | b'/' | b'>',
            start,
            self.source.len() - start
        )
    }

    fn parse_markup(&mut self) -> Token {
        let start = self.pos;
        let source = self.source;

        if source[start..].starts_with(b"<!--") {
            return self.parse_comment(start);
        }
        if start + 9 <= source.len() && source[start..start + 9].eq_ignore_ascii_case(b"<!DOCTYPE")
        {
            return self.parse_doctype(start);
        }
        if source[start..].starts_with(b"<![CDATA[") {
            return self.parse_bogus_comment(start, ParseErrorTag::CdataInHtmlContent);
        }
        if start + 1 < source.len() && source[start + 1] == b'!' {
            return self.parse_bogus_comment(start, ParseErrorTag::IncorrectlyOpenedComment);
        }
        if start + 1 < source.len() && source[start + 1] == b'/' {
            return self.parse_end_tag(start);
        }
        if start + 1 < source.len() && (source[start + 1].is_ascii_alphabetic()) {
            return self.parse_start_tag(start);
        }

        // `<` followed by something that isn't a tag opener: treat as a
        // single invalid character and let the caller keep scanning as text.
        self.pos += 1;
        Token::ParseError(
            ParseErrorTag::InvalidFirstCharacterOfTagName,
            Span::new(start as u32, self.pos as u32),
        )
    }

    fn parse_comment(&mut self, start: usize) -> Token {
        let body_start = start + 4;
        match crate::str_fns::strpos(self.source, b"-->", body_start) {
            Some(close) => {
                self.pos = close + 3;
                Token::Comment(Span::new(start as u32, self.pos as u32))
            }
            None => {
                self.pos = self.source.len();
                Token::ParseError(
                    ParseErrorTag::EofInComment,
                    Span::new(start as u32, self.pos as u32),
                )
            }
        }
    }

    fn parse_bogus_comment(&mut self, start: usize, tag: ParseErrorTag) -> Token {
        match crate::str_fns::strpos(self.source, b">", start) {
            Some(close) => self.pos = close + 1,
            None => self.pos = self.source.len(),
        }
        Token::ParseError(tag, Span::new(start as u32, self.pos as u32))
    }

    fn parse_doctype(&mut self, start: usize) -> Token {
        let close = match crate::str_fns::strpos(self.source, b">", start) {
            Some(close) => close,
            None => {
                self.pos = self.source.len();
                return Token::ParseError(
                    ParseErrorTag::EofInDoctype,
                    Span::new(start as u32, self.pos as u32),
                );
            }
        };
        self.pos = close + 1;
        let full_span = Span::new(start as u32, self.pos as u32);

        let name_scan_start = start + 9;
        let ws = strspn!(
            self.source,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r',
            name_scan_start,
            close.saturating_sub(name_scan_start)
        );
        let name_start = name_scan_start + ws;
        if ws == 0 && name_start < close {
            // Missing whitespace before the doctype name is a real error,
            // but does not block the AST-level quirks-mode algorithm, which
            // re-parses the token text itself.
        }
        let name_len = strcspn!(
            self.source,
            b' ' | b'\t' | b'\n' | 0x0c | b'\r' | b'>',
            name_start,
            close.saturating_sub(name_start)
        );
        let name_span = if name_len > 0 {
            Some(Span::new(name_start as u32, (name_start + name_len) as u32))
        } else {
            None
        };

        Token::Doctype(DoctypeToken {
            span: full_span,
            name_span,
        })
    }

    fn parse_end_tag(&mut self, start: usize) -> Token {
        let name_start = start + 2;
        let name_len = self.parse_tag_name(name_start);
        let name_span = Span::new(name_start as u32, (name_start + name_len) as u32);

        let attrs_start = name_start + name_len;
        let close = match crate::str_fns::strpos(self.source, b">", attrs_start) {
            Some(close) => close,
            None => {
                self.pos = self.source.len();
                return Token::ParseError(
                    ParseErrorTag::EofInTag,
                    Span::new(start as u32, self.pos as u32),
                );
            }
        };
        self.pos = close + 1;

        let tag = TagToken {
            span: Span::new(start as u32, self.pos as u32),
            name_span,
            attrs_start: attrs_start as u32,
            attrs_end: close as u32,
        };

        let has_content = self.source[attrs_start..close]
            .iter()
            .any(|&b| !Self::is_whitespace(b) && b != b'/');
        if has_content {
            // The end tag carries attributes/garbage; still a valid end tag
            // once `missing_end_tag`/structural handling happens in the AST
            // builder, but the tokenizer flags it.
            self.mode = Mode::Data;
            return Token::ParseError(ParseErrorTag::EndTagWithAttributes, tag.span);
        }

        self.mode = Mode::Data;
        Token::EndTag(tag)
    }

    fn parse_start_tag(&mut self, start: usize) -> Token {
        let name_start = start + 1;
        let name_len = self.parse_tag_name(name_start);
        let name_span = Span::new(name_start as u32, (name_start + name_len) as u32);
        let lower_name = self.source[name_start..name_start + name_len].to_ascii_lowercase();

        let attrs_start = name_start + name_len;
        let mut scan = attrs_start;
        let mut self_closing = false;
        loop {
            match self.source.get(scan) {
                None => {
                    self.pos = self.source.len();
                    return Token::ParseError(
                        ParseErrorTag::EofInTag,
                        Span::new(start as u32, self.pos as u32),
                    );
                }
                Some(b'>') => break,
                Some(b'"') | Some(b'\'') => {
                    let quote = self.source[scan];
                    scan += 1;
                    scan += strcspn!(self.source, x if x == quote, scan, self.source.len() - scan);
                    if scan < self.source.len() {
                        scan += 1;
                    }
                }
                Some(_) => scan += 1,
            }
        }
        let close = scan;
        let mut attrs_end = close;
        if close > attrs_start && self.source[close - 1] == b'/' {
            self_closing = true;
            attrs_end = close - 1;
        }

        self.pos = close + 1;
        let tag = TagToken {
            span: Span::new(start as u32, self.pos as u32),
            name_span,
            attrs_start: attrs_start as u32,
            attrs_end: attrs_end as u32,
        };

        if self_closing && !self.lang.allows_foreign_self_closing() {
            let void = elements::lookup(&lower_name).map(|e| e.void).unwrap_or(false);
            if !void {
                // Non-void self-closing under HTML rules: the slash is
                // ignored and this behaves as an ordinary start tag.
                self.enter_raw_text_if_needed(&lower_name);
                return Token::StartTag(tag);
            }
        }

        if self_closing {
            return Token::SelfClosingTag(tag);
        }

        self.enter_raw_text_if_needed(&lower_name);
        Token::StartTag(tag)
    }

    fn enter_raw_text_if_needed(&mut self, lower_name: &[u8]) {
        if let Some(info) = elements::lookup(lower_name) {
            if info.raw_text_mode != RawTextMode::Off {
                self.mode = Mode::RawText {
                    mode: info.raw_text_mode,
                    end_tag: lower_name.into(),
                };
            }
        }
    }

    fn next_raw_text(&mut self, _mode: RawTextMode, end_tag: Box<[u8]>) -> Token {
        let start = self.pos;
        let end = self.raw_text_end(&end_tag).unwrap_or(self.source.len());
        self.pos = end;
        self.mode = Mode::Data;
        Token::Text(Span::new(start as u32, end as u32))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.source.len() {
            return None;
        }

        if let Mode::RawText { mode, end_tag } = std::mem::replace(&mut self.mode, Mode::Data) {
            let token = self.next_raw_text(mode, end_tag);
            if let Token::Text(span) = token {
                if span.is_empty() {
                    return self.next();
                }
            }
            return Some(token);
        }

        if self.source[self.pos] == b'<' && self.pos + 1 < self.source.len() {
            Some(self.parse_markup())
        } else if self.source[self.pos] == b'<' {
            self.pos += 1;
            Some(Token::ParseError(
                ParseErrorTag::EofInTag,
                Span::new((self.pos - 1) as u32, self.pos as u32),
            ))
        } else {
            Some(self.next_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &[u8]) -> Vec<Token> {
        Tokenizer::new(source, Lang::Html).collect()
    }

    #[test]
    fn spans_reconstruct_the_input() {
        let source = b"<!DOCTYPE html><html><body>hi <b>there</b></body></html>";
        let toks = tokens(source);
        let mut cursor = 0u32;
        for tok in &toks {
            let span = tok.span();
            assert_eq!(span.start, cursor, "gap before {:?}", tok.span());
            cursor = span.end;
        }
        assert_eq!(cursor as usize, source.len());
    }

    #[test]
    fn parses_a_simple_start_and_end_tag() {
        let toks = tokens(b"<p>hi</p>");
        assert!(matches!(toks[0], Token::StartTag(_)));
        assert!(matches!(toks[1], Token::Text(_)));
        assert!(matches!(toks[2], Token::EndTag(_)));
    }

    #[test]
    fn void_elements_need_no_slash() {
        let toks = tokens(b"<img src=\"a\">");
        match &toks[0] {
            Token::StartTag(tag) => {
                assert_eq!(tag.name_span.text(b"<img src=\"a\">"), b"img");
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn self_closing_syntax_on_void_element() {
        let toks = tokens(b"<br/>");
        assert!(matches!(toks[0], Token::SelfClosingTag(_)));
    }

    #[test]
    fn attribute_iterator_yields_quoted_and_bare_values() {
        let source: &[u8] = b"<a href=\"x\" data-on bare=yes>";
        let toks = tokens(source);
        let tag = match &toks[0] {
            Token::StartTag(tag) => tag,
            other => panic!("expected start tag, got {other:?}"),
        };
        let attrs: Vec<_> = tag.attributes(source).collect();
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[0].name_span.text(source), b"href");
        assert_eq!(attrs[0].value.unwrap().span.text(source), b"x");
        assert!(attrs[1].value.is_none());
        assert_eq!(attrs[2].value.unwrap().span.text(source), b"yes");
    }

    #[test]
    fn script_content_is_a_single_raw_text_token() {
        let source: &[u8] = b"<script>if (a < b) { x(); }</script>";
        let toks = tokens(source);
        assert!(matches!(toks[0], Token::StartTag(_)));
        match &toks[1] {
            Token::Text(span) => {
                assert_eq!(span.text(source), b"if (a < b) { x(); }");
            }
            other => panic!("expected raw text, got {other:?}"),
        }
        assert!(matches!(toks[2], Token::EndTag(_)));
    }

    #[test]
    fn comments_are_preserved() {
        let toks = tokens(b"<!-- hi -->");
        assert!(matches!(toks[0], Token::Comment(_)));
    }

    #[test]
    fn eof_in_tag_is_reported() {
        let toks = tokens(b"<div");
        assert!(matches!(
            toks[0],
            Token::ParseError(ParseErrorTag::EofInTag, _)
        ));
    }
}
