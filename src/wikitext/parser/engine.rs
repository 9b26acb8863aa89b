//! Recursive-descent parsing engine
//!
//! The engine walks the scanner's token stream with one stack frame per
//! open construct. Its one hard contract: always terminate, always hand
//! back a usable tree. Malformed input never surfaces as an error.
//! An open construct whose close never arrives degrades back to the
//! literal source text it was built from, with a diagnostic recorded at
//! the opening position, and nesting past the depth bound stops
//! recursing the same way. Degraded text is sliced straight from the
//! source so no characters are invented or lost.

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::ParserOptions;
use crate::wikitext::ast::nodes::{
    Attribute, Category, Comment, Document, ExternalLink, FormatStyle, Formatting, Heading,
    HorizontalRule, HtmlTag, Link, List, ListItem, ListKind, MagicWord, Node, NoWiki, Paragraph,
    Parameter, Redirect, Table, TableCell, TableRow, Template, TemplateParam, Text,
};
use crate::wikitext::ast::span::{Position, Span};
use crate::wikitext::lexer::{Token, TokenKind, Tokenizer, TokenizerOptions};
use once_cell::sync::Lazy;
use regex::Regex;

/// Tags that never take children.
const VOID_TAGS: &[&str] = &["br", "hr", "wbr", "img"];

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z][a-zA-Z0-9_:.-]*)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+))?"#).unwrap()
});

/// Parse `name="value"` attribute text into ordered pairs.
pub(crate) fn parse_attributes(input: &str) -> Vec<Attribute> {
    ATTR_RE
        .captures_iter(input)
        .map(|captures| {
            let name = captures[1].to_string();
            let value = captures.get(2).map(|m| {
                let v = m.as_str();
                if v.len() >= 2
                    && ((v.starts_with('"') && v.ends_with('"'))
                        || (v.starts_with('\'') && v.ends_with('\'')))
                {
                    v[1..v.len() - 1].to_string()
                } else {
                    v.to_string()
                }
            });
            Attribute { name, value }
        })
        .collect()
}

/// Flatten a node sequence to its text content; links fall back to their
/// target when they carry no display children.
fn flatten_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.content),
            Node::Formatting(formatting) => collect_text(&formatting.children, out),
            Node::Link(link) => match &link.display {
                Some(display) => collect_text(display, out),
                None => out.push_str(&link.target),
            },
            Node::ExternalLink(link) => collect_text(&link.display, out),
            Node::NoWiki(no_wiki) => out.push_str(&no_wiki.content),
            _ => {}
        }
    }
}

/// Accumulates inline output, merging adjacent text into one node.
#[derive(Default)]
struct InlineSink {
    nodes: Vec<Node>,
    text: String,
    text_span: Option<Span>,
}

impl InlineSink {
    fn push_text(&mut self, text: &str, span: &Span) {
        if text.is_empty() {
            return;
        }
        self.text.push_str(text);
        self.text_span = Some(match self.text_span.take() {
            Some(existing) => existing.merge(span),
            None => span.clone(),
        });
    }

    fn push_node(&mut self, node: Node) {
        self.flush_text();
        self.nodes.push(node);
    }

    fn flush_text(&mut self) {
        if let Some(span) = self.text_span.take() {
            let content = std::mem::take(&mut self.text);
            self.nodes.push(Node::Text(Text { content, span }));
        }
    }

    /// Splice previously parsed nodes, re-merging text at the seams.
    fn append(&mut self, nodes: Vec<Node>) {
        for node in nodes {
            match node {
                Node::Text(text) => self.push_text(&text.content, &text.span),
                other => self.push_node(other),
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.text.is_empty()
    }

    /// True while the sink holds nothing but pending text.
    fn only_text(&self) -> bool {
        self.nodes.is_empty()
    }

    fn take_text(&mut self) -> String {
        self.text_span = None;
        std::mem::take(&mut self.text)
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush_text();
        self.nodes
    }

    fn span(&self) -> Option<Span> {
        let mut span: Option<Span> = None;
        for node in &self.nodes {
            span = Some(match span {
                Some(existing) => existing.merge(node.span()),
                None => node.span().clone(),
            });
        }
        if let Some(text_span) = &self.text_span {
            span = Some(match span {
                Some(existing) => existing.merge(text_span),
                None => text_span.clone(),
            });
        }
        span
    }
}

fn span_of(nodes: &[Node], fallback: &Span) -> Span {
    match (nodes.first(), nodes.last()) {
        (Some(first), Some(last)) => first.span().merge(last.span()),
        _ => fallback.clone(),
    }
}

pub(super) struct Engine<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: usize,
    max_depth: usize,
    open_formats: Vec<FormatStyle>,
}

impl<'a> Engine<'a> {
    pub(super) fn new(source: &'a str, options: &ParserOptions) -> Self {
        let tokenizer_options = TokenizerOptions {
            preserve_comments: options.preserve_comments,
        };
        let tokens = Tokenizer::new(source, tokenizer_options).tokenize_all();
        Self {
            source,
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
            max_depth: options.max_depth,
            open_formats: Vec::new(),
        }
    }

    pub(super) fn run(mut self) -> (Document, Vec<Diagnostic>) {
        if self.source.is_empty() {
            self.diag(DiagnosticKind::EmptyInput, "input is empty", Span::default());
            return (Document::default(), self.diagnostics);
        }

        let end = self
            .tokens
            .last()
            .map(|token| token.span.end)
            .unwrap_or_default();
        let doc_span = Span::new(0..self.source.len(), Position::new(1, 1), end);

        if let Some(redirect) = self.try_redirect() {
            let document = Document::new(vec![Node::Redirect(redirect)], doc_span);
            return (document, self.diagnostics);
        }

        let nodes = self.parse_blocks();
        (Document::new(nodes, doc_span), self.diagnostics)
    }

    // ------------------------------------------------------------------
    // token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.kind() == TokenKind::EndOfInput
    }

    fn diag(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(kind, message, span));
    }

    /// Literal source text from a construct's opening token up to (not
    /// including) the current position.
    fn degraded_slice(&self, open: &Token) -> (String, Span) {
        let start_byte = open.span.bytes.start;
        let end_byte = if self.pos > 0 {
            self.tokens[self.pos - 1].span.bytes.end.max(start_byte)
        } else {
            open.span.bytes.end
        };
        let end = if self.pos > 0 {
            self.tokens[self.pos - 1].span.end
        } else {
            open.span.end
        };
        let text = self.source[start_byte..end_byte].to_string();
        let span = Span::new(start_byte..end_byte, open.span.start, end);
        (text, span)
    }

    fn degrade(&mut self, sink: &mut InlineSink, open: &Token, what: &str) {
        let (text, span) = self.degraded_slice(open);
        log::trace!("degrading unterminated {what} at {}", open.span.start);
        self.diag(
            DiagnosticKind::UnterminatedConstruct,
            format!("unterminated {what}"),
            open.span.clone(),
        );
        sink.push_text(&text, &span);
    }

    // ------------------------------------------------------------------
    // redirect detection
    // ------------------------------------------------------------------

    /// A page whose first meaningful content is `#REDIRECT [[Target]]`
    /// reduces to a single Redirect node. Leading whitespace, blank
    /// lines and comments are skippable; nothing else is.
    fn try_redirect(&mut self) -> Option<Redirect> {
        let saved = self.pos;
        loop {
            match self.kind() {
                TokenKind::BlankLine | TokenKind::Newline | TokenKind::HtmlComment => {
                    self.bump();
                }
                TokenKind::Text if self.peek().text.trim().is_empty() => {
                    self.bump();
                }
                _ => break,
            }
        }

        let matched = self.match_redirect();
        if matched.is_none() {
            self.pos = saved;
        }
        matched
    }

    fn match_redirect(&mut self) -> Option<Redirect> {
        if self.kind() != TokenKind::NumberedList || self.peek().text != "#" {
            return None;
        }
        let hash = self.bump();

        if self.kind() != TokenKind::Text {
            return None;
        }
        let directive = self.peek().text.trim();
        let rest = directive
            .get(..8)
            .filter(|prefix| prefix.eq_ignore_ascii_case("redirect"))
            .map(|_| &directive[8..])?;
        if !rest.is_empty() && rest != ":" {
            return None;
        }
        self.bump();

        if self.kind() != TokenKind::LinkOpen {
            return None;
        }
        self.bump();

        let mut target = String::new();
        while matches!(self.kind(), TokenKind::Text | TokenKind::Equals) {
            target.push_str(&self.bump().text);
        }
        // an optional display part is tolerated and ignored
        while matches!(
            self.kind(),
            TokenKind::LinkSeparator | TokenKind::Pipe | TokenKind::Text | TokenKind::Equals
        ) {
            self.bump();
        }
        if self.kind() != TokenKind::LinkClose {
            return None;
        }
        let close = self.bump();

        let target = target.trim().to_string();
        if target.is_empty() {
            return None;
        }
        Some(Redirect {
            span: hash.span.merge(&close.span),
            target,
        })
    }

    // ------------------------------------------------------------------
    // block structure
    // ------------------------------------------------------------------

    fn parse_blocks(&mut self) -> Vec<Node> {
        let mut blocks = Vec::new();
        let mut para = InlineSink::default();

        loop {
            match self.kind() {
                TokenKind::EndOfInput => break,
                TokenKind::BlankLine => {
                    self.bump();
                    Self::flush_paragraph(&mut para, &mut blocks);
                }
                TokenKind::Newline => {
                    let token = self.bump();
                    if !para.is_empty() {
                        para.push_text("\n", &token.span);
                    }
                }
                TokenKind::Heading => {
                    Self::flush_paragraph(&mut para, &mut blocks);
                    let heading = self.parse_heading();
                    blocks.push(heading);
                }
                TokenKind::BulletList | TokenKind::NumberedList => {
                    Self::flush_paragraph(&mut para, &mut blocks);
                    let list = self.parse_list();
                    blocks.push(list);
                }
                TokenKind::TableStart => {
                    Self::flush_paragraph(&mut para, &mut blocks);
                    let mut sink = InlineSink::default();
                    self.parse_table(&mut sink);
                    blocks.extend(sink.finish());
                }
                TokenKind::HorizontalRule => {
                    Self::flush_paragraph(&mut para, &mut blocks);
                    let token = self.bump();
                    blocks.push(Node::HorizontalRule(HorizontalRule { span: token.span }));
                }
                TokenKind::TableRow
                | TokenKind::TableCellSeparator
                | TokenKind::TableHeaderSeparator
                | TokenKind::TableEnd => {
                    let token = self.bump();
                    self.diag(
                        DiagnosticKind::MalformedTable,
                        format!("table marker `{}` outside a table", token.text),
                        token.span.clone(),
                    );
                    para.push_text(&token.text, &token.span);
                }
                TokenKind::MagicWord => {
                    let token = self.bump();
                    let node = Node::MagicWord(MagicWord {
                        name: token.text,
                        span: token.span,
                    });
                    if para.is_empty() {
                        blocks.push(node);
                    } else {
                        para.push_node(node);
                    }
                }
                _ => self.parse_inline_element(&mut para),
            }
        }

        Self::flush_paragraph(&mut para, &mut blocks);
        blocks
    }

    fn flush_paragraph(para: &mut InlineSink, blocks: &mut Vec<Node>) {
        if para.is_empty() {
            return;
        }
        let sink = std::mem::take(para);
        let span = sink.span().unwrap_or_default();
        let children = sink.finish();
        blocks.push(Node::Paragraph(Paragraph { children, span }));
    }

    // ------------------------------------------------------------------
    // inline structure
    // ------------------------------------------------------------------

    /// Parse one inline element at the cursor into `sink`. Tokens that
    /// have no meaning in the current position fold back into text.
    /// Consumes exactly the element's tokens; never consumes EndOfInput.
    fn parse_inline_element(&mut self, sink: &mut InlineSink) {
        match self.kind() {
            TokenKind::EndOfInput => {}
            TokenKind::Bold | TokenKind::Italic => self.parse_formatting(sink),
            TokenKind::LinkOpen => self.parse_link(sink),
            TokenKind::ExternalLinkOpen => self.parse_external_link(sink),
            TokenKind::TemplateOpen => self.parse_template(sink),
            TokenKind::ParameterOpen => self.parse_parameter(sink),
            TokenKind::HtmlTagOpen => self.parse_html_tag(sink),
            TokenKind::HtmlComment => {
                let token = self.bump();
                sink.push_node(Node::Comment(Comment {
                    content: token.text,
                    span: token.span,
                }));
            }
            TokenKind::NoWiki => {
                let token = self.bump();
                sink.push_node(Node::NoWiki(NoWiki {
                    content: token.text,
                    span: token.span,
                }));
            }
            TokenKind::MagicWord => {
                let token = self.bump();
                sink.push_node(Node::MagicWord(MagicWord {
                    name: token.text,
                    span: token.span,
                }));
            }
            TokenKind::Newline => {
                let token = self.bump();
                sink.push_text("\n", &token.span);
            }
            // Everything else is literal text in inline position
            _ => {
                let token = self.bump();
                sink.push_text(&token.text, &token.span);
            }
        }
    }

    /// Token kinds an inline formatting span may contain.
    fn formatting_can_contain(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Text
                | TokenKind::Equals
                | TokenKind::Bold
                | TokenKind::Italic
                | TokenKind::LinkOpen
                | TokenKind::ExternalLinkOpen
                | TokenKind::TemplateOpen
                | TokenKind::ParameterOpen
                | TokenKind::HtmlTagOpen
                | TokenKind::HtmlComment
                | TokenKind::NoWiki
                | TokenKind::MagicWord
        )
    }

    fn parse_formatting(&mut self, sink: &mut InlineSink) {
        let open = self.bump();
        let style = match open.kind {
            TokenKind::Bold => FormatStyle::Bold,
            _ => FormatStyle::Italic,
        };
        self.open_formats.push(style);

        let mut inner = InlineSink::default();
        let mut close: Option<Token> = None;
        loop {
            let kind = self.kind();
            if kind == open.kind {
                close = Some(self.bump());
                break;
            }
            if matches!(kind, TokenKind::Bold | TokenKind::Italic) {
                let other = if kind == TokenKind::Bold {
                    FormatStyle::Bold
                } else {
                    FormatStyle::Italic
                };
                // A delimiter for an enclosing open style terminates this
                // one implicitly; leave the token for the enclosing frame
                if self.open_formats[..self.open_formats.len() - 1].contains(&other) {
                    break;
                }
                self.parse_formatting(&mut inner);
                continue;
            }
            if !Self::formatting_can_contain(kind) {
                break;
            }
            self.parse_inline_element(&mut inner);
        }
        self.open_formats.pop();

        match close {
            Some(close) => {
                let children = inner.finish();
                sink.push_node(Node::Formatting(Formatting {
                    style,
                    span: open.span.merge(&close.span),
                    children,
                }));
            }
            None => {
                // No matching delimiter on this line: the marker is text
                self.diag(
                    DiagnosticKind::UnterminatedConstruct,
                    "unmatched formatting delimiter",
                    open.span.clone(),
                );
                sink.push_text(&open.text, &open.span);
                sink.append(inner.finish());
            }
        }
    }

    fn parse_link(&mut self, sink: &mut InlineSink) {
        let open = self.bump();
        let mut target = String::new();

        loop {
            match self.kind() {
                TokenKind::Text | TokenKind::Equals => {
                    target.push_str(&self.bump().text);
                }
                TokenKind::LinkSeparator | TokenKind::LinkClose => break,
                _ => {
                    self.degrade(sink, &open, "link");
                    return;
                }
            }
        }

        let display = if self.kind() == TokenKind::LinkSeparator {
            self.bump();
            let mut display = InlineSink::default();
            loop {
                match self.kind() {
                    TokenKind::LinkClose => break,
                    TokenKind::Newline
                    | TokenKind::BlankLine
                    | TokenKind::EndOfInput
                    | TokenKind::Heading => {
                        self.degrade(sink, &open, "link");
                        return;
                    }
                    _ => self.parse_inline_element(&mut display),
                }
            }
            Some(display.finish())
        } else {
            None
        };

        let close = self.bump(); // LinkClose
        let span = open.span.merge(&close.span);
        let target = target.trim();

        if let Some(name) = category_target(target) {
            let sort_key = display
                .as_deref()
                .map(flatten_text)
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty());
            sink.push_node(Node::Category(Category {
                name: name.to_string(),
                sort_key,
                span,
            }));
            return;
        }

        // A leading colon is only an escape hatch out of namespace
        // classification; the stored target drops it
        let target = target.strip_prefix(':').unwrap_or(target).trim();
        let (page, anchor) = match target.split_once('#') {
            Some((page, anchor)) if !anchor.is_empty() => {
                (page.trim(), Some(anchor.trim().to_string()))
            }
            Some((page, _)) => (page.trim(), None),
            None => (target, None),
        };

        sink.push_node(Node::Link(Link {
            target: page.to_string(),
            anchor,
            display,
            span,
        }));
    }

    fn parse_external_link(&mut self, sink: &mut InlineSink) {
        let open = self.bump();
        let mut url = open.text[1..].to_string();
        let mut display = InlineSink::default();
        let mut in_url = true;

        loop {
            match self.kind() {
                TokenKind::ExternalLinkClose => {
                    self.bump();
                    break;
                }
                TokenKind::Newline | TokenKind::BlankLine | TokenKind::EndOfInput => {
                    self.degrade(sink, &open, "external link");
                    return;
                }
                TokenKind::Text if in_url => {
                    let token = self.bump();
                    match token.text.find(char::is_whitespace) {
                        Some(split) => {
                            url.push_str(&token.text[..split]);
                            let rest = token.text[split..].trim_start();
                            display.push_text(rest, &token.span);
                            in_url = false;
                        }
                        None => url.push_str(&token.text),
                    }
                }
                _ if in_url => {
                    // URL ends at the first non-text token
                    in_url = false;
                }
                _ => self.parse_inline_element(&mut display),
            }
        }

        let end = self.tokens[self.pos - 1].span.clone();
        sink.push_node(Node::ExternalLink(ExternalLink {
            url,
            display: display.finish(),
            span: open.span.merge(&end),
        }));
    }

    fn parse_template(&mut self, sink: &mut InlineSink) {
        let open = self.bump();
        if self.depth >= self.max_depth {
            self.diag(
                DiagnosticKind::DepthExceeded,
                format!("template nesting exceeds {} levels", self.max_depth),
                open.span.clone(),
            );
            sink.push_text(&open.text, &open.span);
            return;
        }
        self.depth += 1;

        let mut name = InlineSink::default();
        let mut params: Vec<TemplateParam> = Vec::new();
        // current parameter under construction, None while in the name
        let mut current: Option<(Option<String>, InlineSink, Span)> = None;
        let mut close: Option<Token> = None;

        loop {
            match self.kind() {
                TokenKind::TemplateClose => {
                    close = Some(self.bump());
                    break;
                }
                TokenKind::EndOfInput => break,
                TokenKind::Pipe
                | TokenKind::TableCellSeparator
                | TokenKind::TableRow
                | TokenKind::TableEnd => {
                    // Any `|`-led token separates parameters; extra pipes
                    // in a doubled separator produce empty parameters and
                    // trailing characters belong to the next value
                    let token = self.bump();
                    let pipes = token.text.matches('|').count().max(1);
                    let trailing: String =
                        token.text.chars().filter(|&c| c != '|').collect();
                    for _ in 0..pipes {
                        if let Some(param) = current.take() {
                            params.push(Self::finish_param(param));
                        }
                        current = Some((None, InlineSink::default(), token.span.clone()));
                    }
                    if !trailing.is_empty() {
                        if let Some((_, sink, _)) = current.as_mut() {
                            sink.push_text(&trailing, &token.span);
                        }
                    }
                }
                TokenKind::Equals => {
                    let token = self.bump();
                    match current.as_mut() {
                        // First `=` in a parameter splits name from value
                        Some((name @ None, value, _)) => {
                            *name = Some(value.take_text().trim().to_string());
                            value.nodes.clear();
                            if token.text.len() > 1 {
                                value.push_text(&token.text[1..], &token.span);
                            }
                        }
                        Some((Some(_), value, _)) => value.push_text(&token.text, &token.span),
                        None => name.push_text(&token.text, &token.span),
                    }
                }
                _ => {
                    let target = match current.as_mut() {
                        Some((_, value, _)) => value,
                        None => &mut name,
                    };
                    self.parse_inline_element(target);
                }
            }
        }

        self.depth -= 1;

        let close = match close {
            Some(close) => close,
            None => {
                self.degrade(sink, &open, "template");
                return;
            }
        };

        if let Some(param) = current.take() {
            params.push(Self::finish_param(param));
        }

        let name = flatten_text(&name.finish()).trim().to_string();
        sink.push_node(Node::Template(Template {
            name,
            params,
            span: open.span.merge(&close.span),
        }));
    }

    fn finish_param((name, sink, start): (Option<String>, InlineSink, Span)) -> TemplateParam {
        let span = sink.span().map(|s| start.merge(&s)).unwrap_or(start);
        TemplateParam {
            name,
            value: sink.finish(),
            span,
        }
    }

    fn parse_parameter(&mut self, sink: &mut InlineSink) {
        let open = self.bump();
        if self.depth >= self.max_depth {
            self.diag(
                DiagnosticKind::DepthExceeded,
                format!("parameter nesting exceeds {} levels", self.max_depth),
                open.span.clone(),
            );
            sink.push_text(&open.text, &open.span);
            return;
        }
        self.depth += 1;

        let mut name = String::new();
        let mut default: Option<InlineSink> = None;
        let mut close: Option<Token> = None;

        loop {
            match self.kind() {
                TokenKind::ParameterClose => {
                    close = Some(self.bump());
                    break;
                }
                TokenKind::EndOfInput => break,
                TokenKind::Pipe | TokenKind::TableCellSeparator if default.is_none() => {
                    self.bump();
                    default = Some(InlineSink::default());
                }
                TokenKind::Text | TokenKind::Equals | TokenKind::Newline if default.is_none() => {
                    let token = self.bump();
                    name.push_str(if token.kind == TokenKind::Newline {
                        "\n"
                    } else {
                        &token.text
                    });
                }
                _ if default.is_none() => {
                    // Placeholder names are plain text; anything else is
                    // out of grammar
                    break;
                }
                _ => {
                    self.parse_inline_element(default.as_mut().expect("default sink"));
                }
            }
        }

        self.depth -= 1;

        let close = match close {
            Some(close) => close,
            None => {
                self.degrade(sink, &open, "parameter placeholder");
                return;
            }
        };

        sink.push_node(Node::Parameter(Parameter {
            name: name.trim().to_string(),
            default: default.map(InlineSink::finish),
            span: open.span.merge(&close.span),
        }));
    }

    fn parse_html_tag(&mut self, sink: &mut InlineSink) {
        let open = self.bump();
        let inner = open.text.trim_start_matches('<').trim_end_matches('>');
        let self_closed_syntax = inner.ends_with('/');
        let inner = inner.trim_end_matches('/');
        let name_end = inner
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(inner.len());
        let name = inner[..name_end].to_string();
        let attributes = parse_attributes(&inner[name_end..]);
        let lower = name.to_ascii_lowercase();
        let self_closing = self_closed_syntax || VOID_TAGS.contains(&lower.as_str());

        if self_closing {
            sink.push_node(Node::HtmlTag(HtmlTag {
                name,
                attributes,
                self_closing: true,
                children: Vec::new(),
                span: open.span,
            }));
            return;
        }

        // Commit to a tag node only when the matching close exists ahead;
        // otherwise the open tag is literal text and content flows on
        let Some(close_idx) = self.find_close_tag(&lower) else {
            self.diag(
                DiagnosticKind::UnterminatedConstruct,
                format!("unclosed <{name}> tag"),
                open.span.clone(),
            );
            sink.push_text(&open.text, &open.span);
            return;
        };

        let mut children = InlineSink::default();
        while self.pos < close_idx && !self.at_end() {
            self.parse_inline_element(&mut children);
        }
        let close = if self.pos == close_idx {
            self.bump()
        } else {
            // An inner construct swallowed the close token as text
            self.tokens[self.pos - 1].clone()
        };

        sink.push_node(Node::HtmlTag(HtmlTag {
            name,
            attributes,
            self_closing: false,
            children: children.finish(),
            span: open.span.merge(&close.span),
        }));
    }

    /// Index of the next close tag matching `name`, scanning ahead
    /// without consuming.
    fn find_close_tag(&self, name: &str) -> Option<usize> {
        self.tokens[self.pos..]
            .iter()
            .position(|token| {
                token.kind == TokenKind::HtmlTagClose
                    && close_tag_name(&token.text).eq_ignore_ascii_case(name)
            })
            .map(|offset| self.pos + offset)
    }

    // ------------------------------------------------------------------
    // headings
    // ------------------------------------------------------------------

    fn parse_heading(&mut self) -> Node {
        let token = self.bump();
        let level = token.level.clamp(1, 6);
        let markers = "=".repeat(level as usize);
        let inner = token
            .text
            .strip_prefix(markers.as_str())
            .unwrap_or(&token.text);
        let inner = inner.strip_suffix(markers.as_str()).unwrap_or(inner).trim();

        // Heading content is re-tokenized on its own; child spans are
        // relative to the heading fragment
        let children = self.parse_fragment(inner);

        if self.kind() == TokenKind::Newline {
            self.bump();
        }

        Node::Heading(Heading {
            level,
            children,
            span: token.span,
        })
    }

    /// Parse an isolated inline fragment (heading interiors).
    fn parse_fragment(&mut self, fragment: &str) -> Vec<Node> {
        let options = ParserOptions {
            preserve_comments: false,
            max_depth: self.max_depth,
        };
        let mut engine = Engine::new(fragment, &options);
        let mut sink = InlineSink::default();
        while !engine.at_end() {
            engine.parse_inline_element(&mut sink);
        }
        self.diagnostics.append(&mut engine.diagnostics);
        sink.finish()
    }

    // ------------------------------------------------------------------
    // lists
    // ------------------------------------------------------------------

    fn parse_list(&mut self) -> Node {
        let mut stack: Vec<List> = Vec::new();

        while matches!(self.kind(), TokenKind::BulletList | TokenKind::NumberedList) {
            let marker = self.peek().clone();
            let level = (marker.level as usize).max(1);
            let kinds: Vec<ListKind> = marker
                .text
                .chars()
                .map(|c| {
                    if c == '#' {
                        ListKind::Numbered
                    } else {
                        ListKind::Bullet
                    }
                })
                .collect();

            // Fold the stack to this marker's level
            while stack.len() > level {
                let child = stack.pop().expect("list stack");
                Self::attach_list(&mut stack, child);
            }
            if stack.len() == level {
                let kind = kinds.get(level - 1).copied().unwrap_or(ListKind::Bullet);
                if stack[level - 1].kind != kind {
                    if level == 1 {
                        // A different marker at the top level starts a
                        // fresh sibling list
                        break;
                    }
                    let child = stack.pop().expect("list stack");
                    Self::attach_list(&mut stack, child);
                }
            }
            while stack.len() < level {
                let depth = stack.len();
                let kind = kinds.get(depth).copied().unwrap_or(ListKind::Bullet);
                stack.push(List {
                    kind,
                    level: (depth + 1) as u8,
                    items: Vec::new(),
                    span: marker.span.clone(),
                });
            }

            self.bump();

            // Item content runs to the end of the line
            let mut sink = InlineSink::default();
            loop {
                match self.kind() {
                    TokenKind::Newline => {
                        self.bump();
                        break;
                    }
                    TokenKind::BlankLine | TokenKind::EndOfInput => break,
                    _ => self.parse_inline_element(&mut sink),
                }
            }
            let span = sink.span().unwrap_or_else(|| marker.span.clone());
            let item = ListItem {
                children: sink.finish(),
                span,
            };
            let list = stack.last_mut().expect("list stack");
            list.span = list.span.merge(&item.span);
            list.items.push(item);
        }

        while stack.len() > 1 {
            let child = stack.pop().expect("list stack");
            Self::attach_list(&mut stack, child);
        }
        Node::List(stack.pop().expect("list stack"))
    }

    /// Hang a finished deeper list off its parent's last item, creating
    /// an implicit item when the deeper list came first.
    fn attach_list(stack: &mut Vec<List>, child: List) {
        let parent = stack.last_mut().expect("list parent");
        let child_span = child.span.clone();
        parent.span = parent.span.merge(&child_span);
        let node = Node::List(child);
        match parent.items.last_mut() {
            Some(item) => {
                item.span = item.span.merge(&child_span);
                item.children.push(node);
            }
            None => parent.items.push(ListItem {
                children: vec![node],
                span: child_span,
            }),
        }
    }

    // ------------------------------------------------------------------
    // tables
    // ------------------------------------------------------------------

    fn parse_table(&mut self, sink: &mut InlineSink) {
        let open = self.bump();
        if self.depth >= self.max_depth {
            self.diag(
                DiagnosticKind::DepthExceeded,
                format!("table nesting exceeds {} levels", self.max_depth),
                open.span.clone(),
            );
            sink.push_text(&open.text, &open.span);
            return;
        }
        self.depth += 1;

        let attributes = parse_attributes(&self.collect_line_text());
        let mut table = Table {
            attributes,
            rows: Vec::new(),
            span: open.span.clone(),
        };
        let mut row: Option<TableRow> = None;
        let mut cell: Option<CellBuilder> = None;
        let mut closed = false;

        loop {
            match self.kind() {
                TokenKind::TableEnd => {
                    let end = self.bump();
                    Self::close_cell(&mut row, &mut cell, &end.span);
                    Self::close_row(&mut row, &mut table);
                    table.span = table.span.merge(&end.span);
                    closed = true;
                    break;
                }
                TokenKind::EndOfInput => break,
                TokenKind::TableRow => {
                    let marker = self.bump();
                    Self::close_cell(&mut row, &mut cell, &marker.span);
                    Self::close_row(&mut row, &mut table);
                    let attributes = parse_attributes(&self.collect_line_text());
                    row = Some(TableRow {
                        attributes,
                        cells: Vec::new(),
                        span: marker.span,
                    });
                }
                TokenKind::TableCellSeparator | TokenKind::TableHeaderSeparator => {
                    let marker = self.bump();
                    let header = marker.kind == TokenKind::TableHeaderSeparator;
                    Self::close_cell(&mut row, &mut cell, &marker.span);
                    if row.is_none() {
                        // Cells before any row marker open an implicit row
                        row = Some(TableRow {
                            attributes: Vec::new(),
                            cells: Vec::new(),
                            span: marker.span.clone(),
                        });
                    }
                    cell = Some(CellBuilder::new(header, marker.span));
                }
                TokenKind::TableStart => {
                    if cell.is_none() {
                        if row.is_none() {
                            row = Some(TableRow {
                                attributes: Vec::new(),
                                cells: Vec::new(),
                                span: self.peek().span.clone(),
                            });
                        }
                        cell = Some(CellBuilder::new(false, self.peek().span.clone()));
                    }
                    let builder = cell.as_mut().expect("open cell");
                    self.parse_table(&mut builder.sink);
                }
                TokenKind::Newline | TokenKind::BlankLine => {
                    let token = self.bump();
                    if let Some(builder) = cell.as_mut() {
                        builder.first_line = false;
                        builder.sink.push_text(
                            if token.kind == TokenKind::Newline {
                                "\n"
                            } else {
                                &token.text
                            },
                            &token.span,
                        );
                    }
                }
                TokenKind::Pipe => {
                    let token = self.bump();
                    match cell.as_mut() {
                        // Text before a mid-line `|` on the cell's first
                        // line is the cell's attribute list
                        Some(builder)
                            if builder.first_line
                                && !builder.attrs_done
                                && builder.sink.only_text() =>
                        {
                            let raw = builder.sink.take_text();
                            builder.attributes = parse_attributes(&raw);
                            builder.attrs_done = true;
                        }
                        Some(builder) => builder.sink.push_text("|", &token.span),
                        None => {}
                    }
                }
                _ => {
                    if cell.is_none() {
                        if row.is_none() {
                            row = Some(TableRow {
                                attributes: Vec::new(),
                                cells: Vec::new(),
                                span: self.peek().span.clone(),
                            });
                        }
                        cell = Some(CellBuilder::new(false, self.peek().span.clone()));
                    }
                    let builder = cell.as_mut().expect("open cell");
                    self.parse_inline_element(&mut builder.sink);
                }
            }
        }

        self.depth -= 1;

        if !closed {
            self.degrade(sink, &open, "table");
            return;
        }
        sink.push_node(Node::Table(table));
    }

    fn close_cell(row: &mut Option<TableRow>, cell: &mut Option<CellBuilder>, end: &Span) {
        if let Some(builder) = cell.take() {
            if row.is_none() {
                *row = Some(TableRow {
                    attributes: Vec::new(),
                    cells: Vec::new(),
                    span: builder.span.clone(),
                });
            }
            let row = row.as_mut().expect("open row");
            let finished = builder.finish(end);
            row.span = row.span.merge(&finished.span);
            row.cells.push(finished);
        }
    }

    fn close_row(row: &mut Option<TableRow>, table: &mut Table) {
        if let Some(row) = row.take() {
            // Rows with no cells arise from `|-` lines at the end of a
            // table; they carry nothing and are kept for fidelity
            table.span = table.span.merge(&row.span);
            table.rows.push(row);
        }
    }

    /// Remaining literal text on the current line, consuming the newline.
    fn collect_line_text(&mut self) -> String {
        let mut out = String::new();
        loop {
            match self.kind() {
                TokenKind::Newline => {
                    self.bump();
                    break;
                }
                TokenKind::EndOfInput | TokenKind::BlankLine => break,
                _ => out.push_str(&self.bump().text),
            }
        }
        out
    }
}

/// In-progress table cell.
struct CellBuilder {
    header: bool,
    attributes: Vec<Attribute>,
    sink: InlineSink,
    first_line: bool,
    attrs_done: bool,
    span: Span,
}

impl CellBuilder {
    fn new(header: bool, span: Span) -> Self {
        Self {
            header,
            attributes: Vec::new(),
            sink: InlineSink::default(),
            first_line: true,
            attrs_done: false,
            span,
        }
    }

    fn finish(self, end: &Span) -> TableCell {
        let children = {
            let mut sink = self.sink;
            // Cells end at the next marker; trailing line breaks in the
            // source are not cell content
            sink.flush_text();
            if let Some(Node::Text(text)) = sink.nodes.last_mut() {
                let trimmed = text.content.trim_end_matches('\n').len();
                text.content.truncate(trimmed);
                if text.content.is_empty() {
                    sink.nodes.pop();
                }
            }
            sink.nodes
        };
        let span = self.span.merge(&span_of(&children, end));
        TableCell {
            header: self.header,
            attributes: self.attributes,
            children,
            span,
        }
    }
}

/// `Category:` (or localized alias) prefix check; a leading colon
/// escapes classification.
fn category_target(target: &str) -> Option<&str> {
    let trimmed = target.trim_start();
    if trimmed.starts_with(':') {
        return None;
    }
    let prefix = trimmed.get(..9)?;
    if prefix.eq_ignore_ascii_case("category:") {
        let name = trimmed[9..].trim();
        if !name.is_empty() {
            return Some(name);
        }
    }
    None
}

/// Tag name inside a `</name>` token.
fn close_tag_name(text: &str) -> &str {
    let inner = text
        .trim_start_matches("</")
        .trim_end_matches('>')
        .trim();
    inner
}
