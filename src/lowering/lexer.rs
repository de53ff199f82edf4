//! Lexer for intermediate markup using logos
//!
//! Tags are lexed whole (quote-aware) and their attribute lists go through a
//! second, smaller lexer. `mj-raw` bodies are captured verbatim, so custom
//! HTML inside them is never tokenized.

use logos::{Lexer, Logos};

use crate::error::{LoweringError, Span};
use crate::renderer::{escape_xml, unescape_xml, Attrs};

/// Lexing failures, reported with the span of the offending input
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LexErrorKind {
    #[default]
    UnexpectedInput,
    MalformedAttribute,
    UnterminatedComment,
    UnterminatedCdata,
    UnterminatedRaw,
}

impl LexErrorKind {
    fn message(&self) -> &'static str {
        match self {
            LexErrorKind::UnexpectedInput => "malformed or unterminated tag",
            LexErrorKind::MalformedAttribute => "malformed attribute list",
            LexErrorKind::UnterminatedComment => "comment is never closed with -->",
            LexErrorKind::UnterminatedCdata => "CDATA section is never closed with ]]>",
            LexErrorKind::UnterminatedRaw => "<mj-raw> is never closed",
        }
    }
}

/// An opening or self-closing tag
#[derive(Debug, Clone, PartialEq)]
pub struct StartTag {
    pub name: String,
    pub attrs: Attrs,
    pub self_closing: bool,
    /// Verbatim body of an `mj-raw` element
    pub raw: Option<String>,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
pub enum MarkupToken {
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9_:.\-]*([^<>"']|"[^"]*"|'[^']*')*>"#, start_tag)]
    StartTag(StartTag),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9_:.\-]*[ \t\r\n]*>", end_tag)]
    EndTag(String),

    /// Character data, kept exactly as written (entities included)
    #[regex(r"[^<]+", |lex| lex.slice().to_string())]
    #[token("<![CDATA[", cdata)]
    Text(String),

    #[token("<!--", comment)]
    Comment,

    // <!DOCTYPE ...> and <?xml ...?>
    #[regex(r"<![a-zA-Z]+[ \t\r\n][^>]*>")]
    #[regex(r"<\?[^>]*>")]
    Declaration,
}

const RAW_CLOSE: &str = "</mj-raw>";

fn start_tag(lex: &mut Lexer<MarkupToken>) -> Result<StartTag, LexErrorKind> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (inner, false),
    };
    let name_end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')))
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_string();
    let attrs = lex_attrs(&inner[name_end..])?;

    let mut tag = StartTag {
        name,
        attrs,
        self_closing,
        raw: None,
    };
    if tag.name == "mj-raw" && !self_closing {
        let remainder = lex.remainder();
        let close = remainder
            .find(RAW_CLOSE)
            .ok_or(LexErrorKind::UnterminatedRaw)?;
        tag.raw = Some(remainder[..close].to_string());
        tag.self_closing = true;
        lex.bump(close + RAW_CLOSE.len());
    }
    Ok(tag)
}

fn end_tag(lex: &mut Lexer<MarkupToken>) -> String {
    let slice = lex.slice();
    slice[2..slice.len() - 1].trim_end().to_string()
}

fn comment(lex: &mut Lexer<MarkupToken>) -> Result<(), LexErrorKind> {
    let close = lex
        .remainder()
        .find("-->")
        .ok_or(LexErrorKind::UnterminatedComment)?;
    lex.bump(close + 3);
    Ok(())
}

fn cdata(lex: &mut Lexer<MarkupToken>) -> Result<String, LexErrorKind> {
    let remainder = lex.remainder();
    let close = remainder
        .find("]]>")
        .ok_or(LexErrorKind::UnterminatedCdata)?;
    let text = escape_xml(&remainder[..close]);
    lex.bump(close + 3);
    Ok(text)
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n]+")]
enum AttrToken<'s> {
    #[regex(r"[a-zA-Z_:][a-zA-Z0-9_:.\-]*", |lex| lex.slice(), priority = 3)]
    Name(&'s str),

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    #[regex(r"'[^']*'", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Quoted(&'s str),

    #[regex(r#"[^ \t\r\n"'=<>`]+"#, |lex| lex.slice(), priority = 1)]
    Bare(&'s str),
}

/// Parse `name="value"` pairs; a name without a value gets an empty one
fn lex_attrs(source: &str) -> Result<Attrs, LexErrorKind> {
    let mut tokens = AttrToken::lexer(source).peekable();
    let mut attrs = Attrs::new();
    while let Some(token) = tokens.next() {
        let AttrToken::Name(name) = token? else {
            return Err(LexErrorKind::MalformedAttribute);
        };
        let value = if matches!(tokens.peek(), Some(Ok(AttrToken::Eq))) {
            tokens.next();
            match tokens.next() {
                Some(Ok(AttrToken::Quoted(v) | AttrToken::Bare(v) | AttrToken::Name(v))) => {
                    unescape_xml(v)
                }
                _ => return Err(LexErrorKind::MalformedAttribute),
            }
        } else {
            String::new()
        };
        attrs.push(name, value);
    }
    Ok(attrs)
}

/// Lex the whole input, dropping comments and declarations
pub fn lex(source: &str) -> Result<Vec<(MarkupToken, Span)>, LoweringError> {
    let mut tokens = Vec::new();
    for (token, span) in MarkupToken::lexer(source).spanned() {
        match token {
            Ok(MarkupToken::Comment | MarkupToken::Declaration) => {}
            Ok(token) => tokens.push((token, span)),
            Err(kind) => return Err(LoweringError::lex(span, kind.message())),
        }
    }
    Ok(tokens)
}
