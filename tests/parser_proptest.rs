//! Property-based tests for the tokenizer and parser
//!
//! These pin the contracts that must hold for every input: tokenization
//! terminates with a single trailing EndOfInput, parsing never fails on
//! non-empty input, and the structural properties of headings and lists
//! hold for all generated shapes.

use proptest::prelude::*;
use wikitext::wikitext::ast::visit::visit;
use wikitext::wikitext::extract::PlainTextExtractor;
use wikitext::wikitext::lexer::{Tokenizer, TokenizerOptions};
use wikitext::{parse, TokenKind};

/// Text fragments mixing prose with markup-significant characters.
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        Just("[[".to_string()),
        Just("]]".to_string()),
        Just("{{".to_string()),
        Just("}}".to_string()),
        Just("{{{".to_string()),
        Just("'''".to_string()),
        Just("''".to_string()),
        Just("|".to_string()),
        Just("=".to_string()),
        Just("\n".to_string()),
        Just("\n* ".to_string()),
        Just("\n== ".to_string()),
        Just("\n{|".to_string()),
        Just("\n|}".to_string()),
        Just("<!--".to_string()),
        Just("-->".to_string()),
        Just("<nowiki>".to_string()),
    ]
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 0..40).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn test_tokenize_all_terminates_with_end_of_input(input in document_strategy()) {
        let tokens = Tokenizer::new(&input, TokenizerOptions::default()).tokenize_all();
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
        prop_assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::EndOfInput).count(),
            1
        );
    }

    #[test]
    fn test_next_is_idempotent_after_exhaustion(input in document_strategy()) {
        let mut tokenizer = Tokenizer::new(&input, TokenizerOptions::default());
        while !tokenizer.next().is_end() {}
        prop_assert!(tokenizer.next().is_end());
        prop_assert!(tokenizer.next().is_end());
    }

    #[test]
    fn test_parse_succeeds_on_any_nonempty_input(input in document_strategy()) {
        prop_assume!(!input.is_empty());
        let result = parse(&input);
        prop_assert!(result.success());
    }

    #[test]
    fn test_parse_arbitrary_unicode_never_panics(input in "\\PC{0,60}") {
        let result = parse(&input);
        prop_assert_eq!(result.success(), !input.is_empty());
    }

    #[test]
    fn test_heading_lines_produce_level_and_title(
        level in 1usize..=6,
        title in "[a-zA-Z][a-zA-Z0-9 ]{0,12}[a-zA-Z0-9]",
    ) {
        let markers = "=".repeat(level);
        let line = format!("{markers} {title} {markers}\n");
        let tokens = Tokenizer::new(&line, TokenizerOptions::default()).tokenize_all();
        prop_assert_eq!(tokens[0].kind, TokenKind::Heading);
        prop_assert_eq!(tokens[0].level as usize, level);

        let result = parse(&line);
        let heading = result.document.nodes[0].as_heading().expect("heading node");
        prop_assert_eq!(heading.level as usize, level);
        let text = wikitext::wikitext::extract::heading_title(heading);
        prop_assert_eq!(text, title);
    }

    #[test]
    fn test_list_marker_depth_matches_nesting(depth in 1usize..=8) {
        let line = format!("{} item\n", "*".repeat(depth));
        let result = parse(&line);

        let mut list = result.document.nodes[0].as_list().expect("list node");
        let mut seen = 1usize;
        while seen < depth {
            let child = list.items[0]
                .children
                .iter()
                .find_map(|n| n.as_list())
                .expect("nested list");
            prop_assert_eq!(child.level as usize, seen + 1);
            list = child;
            seen += 1;
        }
        prop_assert!(list.items[0].children.iter().all(|n| n.as_list().is_none()));
    }

    #[test]
    fn test_pure_text_plain_extraction_is_identity(
        input in "[a-zA-Z][a-zA-Z0-9 .,()]{0,40}[a-zA-Z]",
    ) {
        let result = parse(&input);
        let mut extractor = PlainTextExtractor::new();
        visit(&result.document, &mut extractor);
        prop_assert_eq!(extractor.into_text(), input);
    }
}
