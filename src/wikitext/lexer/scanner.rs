//! Line-aware token assembly
//!
//! The scanner sits between the raw logos pass and the parser. It walks
//! the raw stream one line at a time and resolves everything the base
//! tokenization cannot: line-initial markers (lists, table structure,
//! horizontal rules), whole-line heading folding, blank-line grouping,
//! link separators, the bold/italic pairing of 5-apostrophe runs, and
//! merging of inert single characters back into text runs.
//!
//! Lines are assembled on demand, so callers that stop early (for example
//! after the redirect check) do not pay for scanning the whole page.

use super::raw::{tokenize_raw, RawToken};
use super::tokens::{Token, TokenKind};
use crate::wikitext::ast::span::LineIndex;
use std::collections::VecDeque;
use std::ops::Range as ByteRange;

/// Tokenizer configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizerOptions {
    /// Emit HtmlComment tokens instead of dropping `<!-- … -->` spans.
    pub preserve_comments: bool,
}

/// Streaming tokenizer over one page of wikitext.
pub struct Tokenizer<'a> {
    source: &'a str,
    raw: Vec<(RawToken, ByteRange<usize>)>,
    raw_pos: usize,
    index: LineIndex,
    queue: VecDeque<Token>,
    options: TokenizerOptions,
    /// Widths (2 or 3) of the open `{{`/`{{{` constructs, innermost
    /// last. Close-brace runs are split against this stack so
    /// `{{a|{{b}}}}` closes two templates instead of lexing a stray
    /// `}}}`.
    braces: Vec<u8>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, options: TokenizerOptions) -> Self {
        Self {
            source,
            raw: tokenize_raw(source),
            raw_pos: 0,
            index: LineIndex::new(source),
            queue: VecDeque::new(),
            options,
            braces: Vec::new(),
        }
    }

    /// Advance one token. Returns EndOfInput at exhaustion and on every
    /// call thereafter.
    pub fn next(&mut self) -> Token {
        while self.queue.is_empty() && self.raw_pos < self.raw.len() {
            self.assemble_line();
        }
        match self.queue.pop_front() {
            Some(token) => token,
            None => {
                let len = self.source.len();
                Token::end_of_input(self.index.span(self.source, len..len))
            }
        }
    }

    /// Drain the whole stream, EndOfInput inclusive.
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next();
            let done = token.is_end();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn emit(&mut self, kind: TokenKind, text: impl Into<String>, level: u8, bytes: ByteRange<usize>) {
        let span = self.index.span(self.source, bytes);
        self.queue.push_back(Token::with_level(kind, text, level, span));
    }

    fn slice(&self, bytes: &ByteRange<usize>) -> &'a str {
        &self.source[bytes.clone()]
    }

    /// Assemble the next line (or run of blank lines) into tokens.
    fn assemble_line(&mut self) {
        if let Some(consumed) = self.blank_line_len(self.raw_pos) {
            // Fold the whole run of blank lines into one token
            let start_byte = self.raw[self.raw_pos].1.start;
            let mut end_byte = self.raw[self.raw_pos + consumed - 1].1.end;
            let mut count = 1usize;
            self.raw_pos += consumed;
            while let Some(consumed) = self.blank_line_len(self.raw_pos) {
                end_byte = self.raw[self.raw_pos + consumed - 1].1.end;
                self.raw_pos += consumed;
                count += 1;
            }
            let text = self.source[start_byte..end_byte].to_string();
            self.emit(
                TokenKind::BlankLine,
                text,
                count.min(u8::MAX as usize) as u8,
                start_byte..end_byte,
            );
            return;
        }

        let start = self.raw_pos;
        let mut end = start;
        let mut has_newline = false;
        while end < self.raw.len() {
            let is_newline = matches!(self.raw[end].0, RawToken::Newline);
            end += 1;
            if is_newline {
                has_newline = true;
                break;
            }
        }
        self.raw_pos = end;
        let content_end = if has_newline { end - 1 } else { end };

        if self.try_heading(start, content_end) {
            if has_newline {
                let range = self.raw[end - 1].1.clone();
                self.emit(TokenKind::Newline, "\n", 0, range);
            }
            return;
        }

        self.scan_line(start, content_end, has_newline);
    }

    /// Number of raw tokens forming a blank line at `pos`, if any.
    fn blank_line_len(&self, pos: usize) -> Option<usize> {
        let mut i = pos;
        while i < self.raw.len() {
            match self.raw[i].0 {
                RawToken::Whitespace => i += 1,
                RawToken::Newline => return Some(i + 1 - pos),
                _ => return None,
            }
        }
        None
    }

    /// Fold a `== Title ==` line into a single Heading token.
    ///
    /// The trimmed line must start and end with distinct `=` runs; the
    /// level is the smaller run length, clamped to [1,6]. The token text
    /// keeps the markers, the parser strips one matched pair.
    fn try_heading(&mut self, start: usize, content_end: usize) -> bool {
        let mut first = start;
        while first < content_end && matches!(self.raw[first].0, RawToken::Whitespace) {
            first += 1;
        }
        let mut last = content_end;
        while last > first && matches!(self.raw[last - 1].0, RawToken::Whitespace) {
            last -= 1;
        }
        if first >= last {
            return false;
        }
        let last = last - 1;
        if first == last
            || !matches!(self.raw[first].0, RawToken::Equals)
            || !matches!(self.raw[last].0, RawToken::Equals)
        {
            return false;
        }
        let lead = self.raw[first].1.len();
        let trail = self.raw[last].1.len();
        let level = lead.min(trail).min(6).max(1) as u8;
        let bytes = self.raw[first].1.start..self.raw[last].1.end;
        let text = self.slice(&bytes).to_string();
        self.emit(TokenKind::Heading, text, level, bytes);
        true
    }

    /// Scan one content line: line-initial classification, then inline.
    fn scan_line(&mut self, start: usize, content_end: usize, has_newline: bool) {
        let mut pos = start;

        // Line-initial markers must sit at column one
        if pos < content_end {
            let (token, range) = (self.raw[pos].0.clone(), self.raw[pos].1.clone());
            match token {
                RawToken::ListMarkers => {
                    let run = self.slice(&range);
                    let kind = if run.ends_with('#') {
                        TokenKind::NumberedList
                    } else {
                        TokenKind::BulletList
                    };
                    let level = run.len().min(u8::MAX as usize) as u8;
                    let text = run.to_string();
                    self.emit(kind, text, level, range);
                    pos += 1;
                }
                RawToken::Dashes => {
                    let text = self.slice(&range).to_string();
                    self.emit(TokenKind::HorizontalRule, text, 0, range);
                    pos += 1;
                }
                RawToken::OpenBrace
                    if pos + 1 < content_end
                        && matches!(self.raw[pos + 1].0, RawToken::Pipe) =>
                {
                    let bytes = range.start..self.raw[pos + 1].1.end;
                    self.emit(TokenKind::TableStart, "{|", 0, bytes);
                    pos += 2;
                }
                RawToken::Pipe => {
                    // `|-` row, `|}` end, otherwise a leading cell separator
                    let next = self.raw.get(pos + 1).filter(|_| pos + 1 < content_end);
                    match next.map(|(t, _)| t) {
                        Some(RawToken::Dash) | Some(RawToken::Dashes) => {
                            let mut stop = pos + 1;
                            while stop < content_end
                                && matches!(
                                    self.raw[stop].0,
                                    RawToken::Dash | RawToken::Dashes
                                )
                            {
                                stop += 1;
                            }
                            let bytes = range.start..self.raw[stop - 1].1.end;
                            let text = self.slice(&bytes).to_string();
                            self.emit(TokenKind::TableRow, text, 0, bytes);
                            pos = stop;
                        }
                        Some(RawToken::CloseBrace) => {
                            let bytes = range.start..self.raw[pos + 1].1.end;
                            self.emit(TokenKind::TableEnd, "|}", 0, bytes);
                            pos += 2;
                        }
                        _ => {
                            self.emit(TokenKind::TableCellSeparator, "|", 0, range);
                            pos += 1;
                        }
                    }
                }
                RawToken::Bang => {
                    self.emit(TokenKind::TableHeaderSeparator, "!", 0, range);
                    pos += 1;
                }
                _ => {}
            }
        }

        self.scan_inline(pos, content_end);

        if has_newline {
            let range = self.raw[content_end].1.clone();
            self.emit(TokenKind::Newline, "\n", 0, range);
        }
    }

    /// Scan the inline remainder of a line.
    fn scan_inline(&mut self, start: usize, end: usize) {
        let mut run = TextRun::default();
        let mut in_link = false;
        let mut link_separated = false;
        let mut in_extlink = false;
        let mut bold_open = false;
        let mut italic_open = false;

        let mut pos = start;
        while pos < end {
            let (token, range) = (self.raw[pos].0.clone(), self.raw[pos].1.clone());
            pos += 1;
            match token {
                RawToken::CloseBracket if in_extlink => {
                    run.flush(self);
                    in_extlink = false;
                    self.emit(TokenKind::ExternalLinkClose, "]", 0, range);
                }
                RawToken::TemplateClose | RawToken::ParameterClose | RawToken::CloseBrace => {
                    // Coalesce the whole run of `}` so it can be split
                    // against the open-brace stack
                    let mut bytes = range.clone();
                    while pos < end
                        && matches!(
                            self.raw[pos].0,
                            RawToken::TemplateClose
                                | RawToken::ParameterClose
                                | RawToken::CloseBrace
                        )
                    {
                        bytes.end = self.raw[pos].1.end;
                        pos += 1;
                    }
                    self.emit_brace_closes(&mut run, bytes);
                }
                token if token.is_textual() => run.push(self.slice(&range), &range),
                RawToken::ListMarkers | RawToken::Dashes => {
                    run.push(self.slice(&range), &range)
                }
                RawToken::Equals => {
                    run.flush(self);
                    let text = self.slice(&range).to_string();
                    self.emit(TokenKind::Equals, text, 0, range);
                }
                RawToken::Pipe => {
                    run.flush(self);
                    if in_link && !link_separated {
                        link_separated = true;
                        self.emit(TokenKind::LinkSeparator, "|", 0, range);
                    } else if pos < end && matches!(self.raw[pos].0, RawToken::Pipe) {
                        let bytes = range.start..self.raw[pos].1.end;
                        pos += 1;
                        self.emit(TokenKind::TableCellSeparator, "||", 0, bytes);
                    } else {
                        self.emit(TokenKind::Pipe, "|", 0, range);
                    }
                }
                RawToken::Bang => {
                    if pos < end && matches!(self.raw[pos].0, RawToken::Bang) {
                        run.flush(self);
                        let bytes = range.start..self.raw[pos].1.end;
                        pos += 1;
                        self.emit(TokenKind::TableHeaderSeparator, "!!", 0, bytes);
                    } else {
                        run.push("!", &range);
                    }
                }
                RawToken::Bold => {
                    run.flush(self);
                    bold_open = !bold_open;
                    self.emit(TokenKind::Bold, "'''", 0, range);
                }
                RawToken::Italic => {
                    run.flush(self);
                    italic_open = !italic_open;
                    self.emit(TokenKind::Italic, "''", 0, range);
                }
                RawToken::BoldItalic => {
                    // Bold opens first so italic nests inside; on close the
                    // innermost italic terminates first
                    run.flush(self);
                    if italic_open {
                        self.emit(TokenKind::Italic, "''", 0, range.start..range.start + 2);
                        self.emit(TokenKind::Bold, "'''", 0, range.start + 2..range.end);
                    } else {
                        self.emit(TokenKind::Bold, "'''", 0, range.start..range.start + 3);
                        self.emit(TokenKind::Italic, "''", 0, range.start + 3..range.end);
                    }
                    bold_open = !bold_open;
                    italic_open = !italic_open;
                }
                RawToken::LinkOpen => {
                    run.flush(self);
                    in_link = true;
                    link_separated = false;
                    self.emit(TokenKind::LinkOpen, "[[", 0, range);
                }
                RawToken::LinkClose => {
                    run.flush(self);
                    in_link = false;
                    self.emit(TokenKind::LinkClose, "]]", 0, range);
                }
                RawToken::ExternalLinkOpen => {
                    run.flush(self);
                    in_extlink = true;
                    let text = self.slice(&range).to_string();
                    self.emit(TokenKind::ExternalLinkOpen, text, 0, range);
                }
                RawToken::TemplateOpen => {
                    run.flush(self);
                    self.braces.push(2);
                    self.emit(TokenKind::TemplateOpen, "{{", 0, range);
                }
                RawToken::ParameterOpen => {
                    run.flush(self);
                    self.braces.push(3);
                    self.emit(TokenKind::ParameterOpen, "{{{", 0, range);
                }
                RawToken::Comment(body) => {
                    if self.options.preserve_comments {
                        run.flush(self);
                        self.emit(TokenKind::HtmlComment, body, 0, range);
                    }
                    // Dropped comments leave the surrounding text joined
                }
                RawToken::NoWiki(body) => {
                    run.flush(self);
                    self.emit(TokenKind::NoWiki, body, 0, range);
                }
                RawToken::HtmlTagOpen => {
                    run.flush(self);
                    let text = self.slice(&range).to_string();
                    self.emit(TokenKind::HtmlTagOpen, text, 0, range);
                }
                RawToken::HtmlTagClose => {
                    run.flush(self);
                    let text = self.slice(&range).to_string();
                    self.emit(TokenKind::HtmlTagClose, text, 0, range);
                }
                RawToken::MagicWord => {
                    run.flush(self);
                    let name = self.slice(&range);
                    let name = name[2..name.len() - 2].to_string();
                    self.emit(TokenKind::MagicWord, name, 0, range);
                }
                RawToken::Newline => unreachable!("newline inside line slice"),
                _ => run.push(self.slice(&range), &range),
            }
        }
        run.flush(self);
    }

    /// Split a coalesced run of `}` characters against the open-brace
    /// stack, innermost construct first. `{{a|{{b}}}}` closes two
    /// templates, `{{T|{{{p}}}}}` closes a parameter then a template.
    /// With nothing open, runs split longest-match-first; a leftover
    /// single `}` stays text.
    fn emit_brace_closes(&mut self, run: &mut TextRun, bytes: ByteRange<usize>) {
        let mut start = bytes.start;
        let mut remaining = bytes.end - bytes.start;
        while remaining >= 2 {
            let width: usize = match self.braces.pop() {
                Some(3) if remaining >= 3 => 3,
                Some(_) => 2,
                None if remaining >= 3 => 3,
                None => 2,
            };
            run.flush(self);
            let (kind, text) = if width == 3 {
                (TokenKind::ParameterClose, "}}}")
            } else {
                (TokenKind::TemplateClose, "}}")
            };
            self.emit(kind, text, 0, start..start + width);
            start += width;
            remaining -= width;
        }
        if remaining > 0 {
            let range = start..bytes.end;
            let text = self.slice(&range);
            run.push(text, &range);
        }
    }
}

/// Accumulator that merges adjacent inert raw tokens into one Text token.
#[derive(Default)]
struct TextRun {
    text: String,
    bytes: Option<ByteRange<usize>>,
}

impl TextRun {
    fn push(&mut self, text: &str, range: &ByteRange<usize>) {
        self.text.push_str(text);
        self.bytes = Some(match self.bytes.take() {
            Some(existing) => existing.start..range.end,
            None => range.clone(),
        });
    }

    fn flush(&mut self, tokenizer: &mut Tokenizer<'_>) {
        if let Some(bytes) = self.bytes.take() {
            let text = std::mem::take(&mut self.text);
            tokenizer.emit(TokenKind::Text, text, 0, bytes);
        }
    }
}

/// Cheap check for the presence of any markup-introducing sequence.
///
/// Used by batch callers to skip full tokenization of plain-text pages;
/// a `true` result only means a page is worth parsing, not that it is
/// well-formed.
pub fn looks_like_wikitext(text: &str) -> bool {
    if text.contains("[[") || text.contains("{{") || text.contains("'''") || text.contains("==") {
        return true;
    }
    text.lines().any(|line| {
        line.starts_with('*') || line.starts_with('#') || line.starts_with("{|")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Tokenizer::new(source, TokenizerOptions::default())
            .tokenize_all()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_bold_text_bold() {
        let tokens = Tokenizer::new("'''bold'''", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Bold);
        assert_eq!(tokens[1].kind, TokenKind::Text);
        assert_eq!(tokens[1].text, "bold");
        assert_eq!(tokens[2].kind, TokenKind::Bold);
        assert_eq!(tokens[3].kind, TokenKind::EndOfInput);
    }

    #[test]
    fn test_link_with_display() {
        let tokens =
            Tokenizer::new("[[Page|Display text]]", TokenizerOptions::default()).tokenize_all();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LinkOpen,
                TokenKind::Text,
                TokenKind::LinkSeparator,
                TokenKind::Text,
                TokenKind::LinkClose,
                TokenKind::EndOfInput,
            ]
        );
        assert_eq!(tokens[1].text, "Page");
        assert_eq!(tokens[3].text, "Display text");
    }

    #[test]
    fn test_second_pipe_in_link_is_plain() {
        let tokens = Tokenizer::new("[[a|b|c]]", TokenizerOptions::default()).tokenize_all();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LinkOpen,
                TokenKind::Text,
                TokenKind::LinkSeparator,
                TokenKind::Text,
                TokenKind::Pipe,
                TokenKind::Text,
                TokenKind::LinkClose,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_parameter_tokens() {
        assert_eq!(
            kinds("{{{param}}}"),
            vec![
                TokenKind::ParameterOpen,
                TokenKind::Text,
                TokenKind::ParameterClose,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_heading_level_and_text() {
        let tokens = Tokenizer::new("== Title ==\n", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Heading);
        assert_eq!(tokens[0].level, 2);
        assert_eq!(tokens[0].text, "== Title ==");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
    }

    #[test]
    fn test_heading_level_is_smaller_run() {
        let tokens = Tokenizer::new("=== T =", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Heading);
        assert_eq!(tokens[0].level, 1);
    }

    #[test]
    fn test_heading_level_clamps_to_six() {
        let tokens =
            Tokenizer::new("======== T ========", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].level, 6);
    }

    #[test]
    fn test_equals_only_line_is_not_heading() {
        let tokens = Tokenizer::new("====\n", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Equals);
    }

    #[test]
    fn test_list_marker_levels() {
        let tokens = Tokenizer::new("*** Deep item", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::BulletList);
        assert_eq!(tokens[0].level, 3);
        assert_eq!(tokens[1].text, " Deep item");
    }

    #[test]
    fn test_mixed_marker_kind_follows_last_char() {
        let tokens = Tokenizer::new("*# x", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::NumberedList);
        assert_eq!(tokens[0].level, 2);
        assert_eq!(tokens[0].text, "*#");
    }

    #[test]
    fn test_mid_line_asterisks_are_text() {
        let tokens = Tokenizer::new("a * b", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].text, "a * b");
    }

    #[test]
    fn test_table_markers() {
        assert_eq!(
            kinds("{|\n|-\n| a || b\n|}"),
            vec![
                TokenKind::TableStart,
                TokenKind::Newline,
                TokenKind::TableRow,
                TokenKind::Newline,
                TokenKind::TableCellSeparator,
                TokenKind::Text,
                TokenKind::TableCellSeparator,
                TokenKind::Text,
                TokenKind::Newline,
                TokenKind::TableEnd,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_header_cells() {
        assert_eq!(
            kinds("{|\n! a !! b\n|}"),
            vec![
                TokenKind::TableStart,
                TokenKind::Newline,
                TokenKind::TableHeaderSeparator,
                TokenKind::Text,
                TokenKind::TableHeaderSeparator,
                TokenKind::Text,
                TokenKind::Newline,
                TokenKind::TableEnd,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_blank_lines_fold() {
        let tokens = Tokenizer::new("a\n\n\nb", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].kind, TokenKind::BlankLine);
        assert_eq!(tokens[2].level, 2);
        assert_eq!(tokens[3].kind, TokenKind::Text);
    }

    #[test]
    fn test_five_apostrophes_open_bold_then_italic() {
        let tokens = Tokenizer::new("'''''x'''''", TokenizerOptions::default()).tokenize_all();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Bold,
                TokenKind::Italic,
                TokenKind::Text,
                TokenKind::Italic,
                TokenKind::Bold,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_nested_template_closes_split_against_opens() {
        assert_eq!(
            kinds("{{a|{{b}}}}"),
            vec![
                TokenKind::TemplateOpen,
                TokenKind::Text,
                TokenKind::Pipe,
                TokenKind::TemplateOpen,
                TokenKind::Text,
                TokenKind::TemplateClose,
                TokenKind::TemplateClose,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_parameter_inside_template_closes_innermost_first() {
        assert_eq!(
            kinds("{{T|{{{p}}}}}"),
            vec![
                TokenKind::TemplateOpen,
                TokenKind::Text,
                TokenKind::Pipe,
                TokenKind::ParameterOpen,
                TokenKind::Text,
                TokenKind::ParameterClose,
                TokenKind::TemplateClose,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_stray_close_brace_stays_text() {
        let tokens = Tokenizer::new("a}b", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].text, "a}b");
    }

    #[test]
    fn test_unmatched_close_run_splits_longest_first() {
        let tokens = Tokenizer::new("x}}}}}", TokenizerOptions::default()).tokenize_all();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Text,
                TokenKind::ParameterClose,
                TokenKind::TemplateClose,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_comments_skipped_by_default() {
        let tokens = Tokenizer::new("a<!-- x -->b", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].text, "ab");
    }

    #[test]
    fn test_comments_preserved_on_request() {
        let options = TokenizerOptions {
            preserve_comments: true,
        };
        let tokens = Tokenizer::new("a<!-- x -->b", options).tokenize_all();
        assert_eq!(tokens[1].kind, TokenKind::HtmlComment);
        assert_eq!(tokens[1].text, " x ");
    }

    #[test]
    fn test_external_link() {
        let tokens =
            Tokenizer::new("[https://example.org docs]", TokenizerOptions::default())
                .tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::ExternalLinkOpen);
        assert_eq!(tokens[0].text, "[https://");
        assert_eq!(tokens[1].kind, TokenKind::Text);
        assert_eq!(tokens[2].kind, TokenKind::ExternalLinkClose);
    }

    #[test]
    fn test_magic_word_text_is_directive_name() {
        let tokens = Tokenizer::new("__NOTOC__", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].kind, TokenKind::MagicWord);
        assert_eq!(tokens[0].text, "NOTOC");
    }

    #[test]
    fn test_end_of_input_is_idempotent() {
        let mut tokenizer = Tokenizer::new("x", TokenizerOptions::default());
        while !tokenizer.next().is_end() {}
        assert!(tokenizer.next().is_end());
        assert!(tokenizer.next().is_end());
    }

    #[test]
    fn test_spans_are_one_based() {
        let tokens = Tokenizer::new("a\nb", TokenizerOptions::default()).tokenize_all();
        assert_eq!(tokens[0].span.start.line, 1);
        assert_eq!(tokens[0].span.start.column, 1);
        assert_eq!(tokens[2].span.start.line, 2);
        assert_eq!(tokens[2].span.start.column, 1);
    }

    #[test]
    fn test_looks_like_wikitext() {
        assert!(looks_like_wikitext("see [[Page]]"));
        assert!(looks_like_wikitext("{{cite}}"));
        assert!(looks_like_wikitext("* item"));
        assert!(looks_like_wikitext("plain\n# item"));
        assert!(!looks_like_wikitext("just prose, nothing else"));
    }
}
