//! Wikitext parsing
//!
//! [`parse`] (or a configured [`Parser`]) turns one page of markup into
//! a [`ParseResult`]: a best-effort document tree plus the diagnostics
//! recorded while building it. Malformed markup never fails the call
//! (see the recovery rules in [`engine`]), so `success()` is false only
//! for empty input and invalid encoding.

pub mod diagnostics;
mod engine;

pub use diagnostics::{Diagnostic, DiagnosticKind, ParseResult};

use crate::wikitext::ast::nodes::Document;
use crate::wikitext::ast::span::Span;
use engine::Engine;

/// Default bound on construct nesting. Deep enough for any page written
/// by a human, shallow enough that adversarial `{{{{…` input degrades
/// long before the call stack is at risk.
pub const DEFAULT_MAX_DEPTH: usize = 40;

/// Parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Keep `<!-- … -->` spans as Comment nodes instead of dropping them.
    pub preserve_comments: bool,
    /// Nesting bound for templates, parameters and tables.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            preserve_comments: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A reusable, configured parser. Instances hold no per-parse state, so
/// one parser may serve many documents (and many threads) in turn.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parse one page of wikitext. Always terminates and always returns
    /// a document; recovery is reported through `ParseResult::errors`.
    pub fn parse(&self, text: &str) -> ParseResult {
        let (document, errors) = Engine::new(text, &self.options).run();
        ParseResult::new(document, errors)
    }

    /// Parse raw bytes. Input that is not valid UTF-8 yields an empty
    /// document with a fatal InvalidEncoding diagnostic instead of
    /// touching the tokenizer.
    pub fn parse_bytes(&self, bytes: &[u8]) -> ParseResult {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.parse(text),
            Err(error) => {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::InvalidEncoding,
                    format!("input is not valid UTF-8: {error}"),
                    Span::default(),
                );
                ParseResult::new(Document::default(), vec![diagnostic])
            }
        }
    }
}

/// Parse with default options.
pub fn parse(text: &str) -> ParseResult {
    Parser::new().parse(text)
}
