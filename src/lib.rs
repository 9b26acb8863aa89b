//! # wikitext
//!
//! A parser for MediaWiki-dialect wikitext markup.
//!
//! Raw page text goes in, a structured document tree comes out:
//! tokenizing, recursive-descent parsing with error recovery, and a
//! visitor-based traversal layer that link/template/section/category
//! extraction and plain-text flattening are built on.
//!
//! ## Testing
//!
//! Parser behavior is verified structurally: tests parse a fragment and
//! assert on the resulting node tree, never on intermediate parser state.

pub mod wikitext;

pub use crate::wikitext::ast::{visit, Document, Node, Visitor};
pub use crate::wikitext::lexer::{looks_like_wikitext, Token, TokenKind, Tokenizer, TokenizerOptions};
pub use crate::wikitext::parser::{
    parse, Diagnostic, DiagnosticKind, ParseResult, Parser, ParserOptions,
};
