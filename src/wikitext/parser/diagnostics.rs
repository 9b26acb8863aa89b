//! Parse diagnostics
//!
//! The parser never fails on malformed markup; every recovery path
//! records a [`Diagnostic`] and parsing continues. Only two kinds are
//! fatal (empty input and invalid encoding), and those are the only
//! cases in which [`ParseResult::success`] returns false and the
//! document must not be trusted.

use crate::wikitext::ast::nodes::Document;
use crate::wikitext::ast::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a recovery or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An opening delimiter with no matching close before end of input.
    UnterminatedConstruct,
    /// Nesting beyond the configured depth bound.
    DepthExceeded,
    /// A table-structure token with no enclosing table, or an
    /// inconsistent table shape.
    MalformedTable,
    /// A heading line the parser could not normalize.
    MalformedHeading,
    /// The input string was empty.
    EmptyInput,
    /// The input bytes were not valid UTF-8.
    InvalidEncoding,
}

impl DiagnosticKind {
    /// Fatal kinds invalidate the whole document.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            DiagnosticKind::EmptyInput | DiagnosticKind::InvalidEncoding
        )
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::UnterminatedConstruct => "unterminated construct",
            DiagnosticKind::DepthExceeded => "nesting depth exceeded",
            DiagnosticKind::MalformedTable => "malformed table",
            DiagnosticKind::MalformedHeading => "malformed heading",
            DiagnosticKind::EmptyInput => "empty input",
            DiagnosticKind::InvalidEncoding => "invalid encoding",
        };
        f.write_str(name)
    }
}

/// One recovery record: what went wrong, where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.span.start, self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// The outcome of one parse call: a best-effort document plus the
/// diagnostics recorded while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub document: Document,
    pub errors: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn new(document: Document, errors: Vec<Diagnostic>) -> Self {
        Self { document, errors }
    }

    /// True iff the document is usable for extraction. Non-fatal
    /// diagnostics (the common case on messy pages) do not clear this.
    pub fn success(&self) -> bool {
        !self.errors.iter().any(|d| d.kind.is_fatal())
    }
}
