//! Base tokenization for the wikitext lexer
//!
//! This module provides the raw tokenization using the logos lexer library.
//! This is the entry point where source strings become token streams.
//!
//! Raw tokens are deliberately dumb: they recognize delimiter shapes
//! (`{{{` before `{{`, apostrophe runs by length, marker runs) but carry no
//! line-start or nesting context. The scanner pass in
//! `super::scanner` owns all line- and context-sensitive classification.
//!
//! The only raw tokens that consume beyond their trigger sequence are HTML
//! comments and `<nowiki>` blocks: both swallow their body up to the
//! closing sequence (or end of input) in a callback, so their contents are
//! never re-scanned for markup.

use logos::{Lexer, Logos};
use std::ops::Range as ByteRange;

/// Raw tokens produced by the logos base pass.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum RawToken {
    // Brace delimiters, longest match first
    #[token("{{{")]
    ParameterOpen,
    #[token("}}}")]
    ParameterClose,
    #[token("{{")]
    TemplateOpen,
    #[token("}}")]
    TemplateClose,

    #[token("[[")]
    LinkOpen,
    #[token("]]")]
    LinkClose,

    /// `[` immediately followed by a URL scheme
    #[regex(r"\[[a-zA-Z][a-zA-Z0-9+.-]*://")]
    #[token("[mailto:")]
    ExternalLinkOpen,

    // Apostrophe runs: 5 is a simultaneous bold+italic delimiter pair
    #[token("'''''")]
    BoldItalic,
    #[token("'''")]
    Bold,
    #[token("''")]
    Italic,

    #[regex(r"=+")]
    Equals,

    /// Run of `*`/`#`; only meaningful at line start
    #[regex(r"[*#]+")]
    ListMarkers,

    #[regex(r"-{4,}")]
    Dashes,

    #[regex(r"__[a-zA-Z]+__")]
    MagicWord,

    #[token("|")]
    Pipe,
    #[token("!")]
    Bang,
    #[token("\n")]
    Newline,

    /// `<!-- … -->`; the callback consumes through the terminator and
    /// yields the inner text
    #[token("<!--", lex_comment)]
    Comment(String),

    /// `<nowiki>…</nowiki>`; contents are never re-tokenized
    #[regex(r"<[nN][oO][wW][iI][kK][iI][ \t]*/>", |_| String::new(), priority = 30)]
    #[regex(r"<[nN][oO][wW][iI][kK][iI]>", lex_nowiki, priority = 30)]
    NoWiki(String),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*[ \t]*>")]
    HtmlTagClose,
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9]*([^>\n"']|"[^"\n]*"|'[^'\n]*')*>"#)]
    HtmlTagOpen,

    #[regex(r"[ \t\r]+")]
    Whitespace,

    // Single-character fallbacks so lexing is total; the scanner merges
    // the ones that carry no markup meaning back into text runs.
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("'")]
    Apostrophe,
    #[token("-")]
    Dash,
    #[token("_")]
    Underscore,

    #[regex(r"[^ \t\r\n'\[\]{}<>|!=*#_-]+")]
    Text,
}

impl RawToken {
    /// Raw tokens with no markup meaning of their own; the scanner folds
    /// them into the surrounding text run.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            RawToken::Text
                | RawToken::Whitespace
                | RawToken::OpenBrace
                | RawToken::CloseBrace
                | RawToken::OpenBracket
                | RawToken::CloseBracket
                | RawToken::LessThan
                | RawToken::GreaterThan
                | RawToken::Apostrophe
                | RawToken::Dash
                | RawToken::Underscore
        )
    }
}

fn lex_comment(lex: &mut Lexer<RawToken>) -> String {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => {
            let body = rest[..end].to_string();
            lex.bump(end + 3);
            body
        }
        // Unterminated comments run to end of input
        None => {
            let body = rest.to_string();
            lex.bump(rest.len());
            body
        }
    }
}

fn lex_nowiki(lex: &mut Lexer<RawToken>) -> String {
    let rest = lex.remainder();
    match find_ascii_ci(rest, "</nowiki>") {
        Some(end) => {
            let body = rest[..end].to_string();
            lex.bump(end + "</nowiki>".len());
            body
        }
        None => {
            let body = rest.to_string();
            lex.bump(rest.len());
            body
        }
    }
}

/// ASCII-case-insensitive substring search (tag names are ASCII; the
/// haystack may not be, so lowercasing it would shift byte offsets).
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Tokenize source text into raw tokens with byte spans.
///
/// Lexing is total: the single-character fallbacks and the text catch-all
/// cover every input, so error slices only arise from pathological inputs
/// and are preserved as text rather than dropped.
pub fn tokenize_raw(source: &str) -> Vec<(RawToken, ByteRange<usize>)> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => tokens.push((RawToken::Text, lexer.span())),
        }
    }

    tokens
}
