//! Token definitions for the wikitext lexer
//!
//! These are the tokens the parser consumes, produced by the scanner from
//! the raw logos stream. Unlike raw tokens they are line-classified: a `|`
//! at the start of a line is a table cell separator, mid-line it is a
//! plain pipe, and a whole `== … ==` line collapses into one Heading
//! token.

use crate::wikitext::ast::span::Span;
use serde::{Deserialize, Serialize};

/// All token kinds the scanner can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Text,
    Bold,
    Italic,
    LinkOpen,
    LinkSeparator,
    LinkClose,
    ExternalLinkOpen,
    ExternalLinkClose,
    TemplateOpen,
    TemplateClose,
    ParameterOpen,
    ParameterClose,
    Pipe,
    Equals,
    Heading,
    BulletList,
    NumberedList,
    TableStart,
    TableRow,
    TableCellSeparator,
    TableHeaderSeparator,
    TableEnd,
    HtmlComment,
    NoWiki,
    HtmlTagOpen,
    HtmlTagClose,
    MagicWord,
    HorizontalRule,
    Newline,
    BlankLine,
    EndOfInput,
}

/// A single token: kind, literal (or decoded) text, structural level and
/// source span.
///
/// `level` is the heading depth for Heading tokens, the marker run length
/// for list tokens, the blank-line count for BlankLine tokens, and 0
/// otherwise. Tokens are immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub level: u8,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            level: 0,
            span,
        }
    }

    pub fn with_level(kind: TokenKind, text: impl Into<String>, level: u8, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            level,
            span,
        }
    }

    pub fn end_of_input(span: Span) -> Self {
        Self::new(TokenKind::EndOfInput, "", span)
    }

    /// True for tokens that can only begin a block construct.
    pub fn is_block_marker(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Heading
                | TokenKind::BulletList
                | TokenKind::NumberedList
                | TokenKind::TableStart
                | TokenKind::HorizontalRule
        )
    }

    /// True for the table-structure tokens that are only valid inside an
    /// open table.
    pub fn is_table_marker(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::TableRow
                | TokenKind::TableCellSeparator
                | TokenKind::TableHeaderSeparator
                | TokenKind::TableEnd
        )
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}
