//! Component-level tokenizer tests (`spec.md` §4.A): number/string lexing,
//! comment skipping, and multi-character punctuation longest-match.

use teko::token::{TokenKind, Tokenizer};

fn kinds_and_text(src: &str) -> Vec<(TokenKind, String)> {
    Tokenizer::tokenize(src).expect("tokenizing should succeed").into_iter().map(|t| (t.kind, t.text)).collect()
}

#[test]
fn integer_and_real_literals() {
    let tokens = kinds_and_text("42 3.5 3 .");
    assert_eq!(tokens[0], (TokenKind::Integer, "42".to_owned()));
    assert_eq!(tokens[1], (TokenKind::Real, "3.5".to_owned()));
    // A digit followed by whitespace then a bare '.' is two separate tokens,
    // not a real literal — the ToReal conversion operator needs the bare
    // '.' to survive tokenization on its own.
    assert_eq!(tokens[2], (TokenKind::Integer, "3".to_owned()));
    assert_eq!(tokens[3].0, TokenKind::Punctuation);
    assert_eq!(tokens[3].1, ".");
}

#[test]
fn string_literal_with_escape() {
    let tokens = kinds_and_text(r#""he said \"hi\"""#);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].0, TokenKind::StringLiteral);
}

#[test]
fn line_and_block_comments_are_skipped() {
    let tokens = kinds_and_text("1 // trailing comment\n+ /* inline */ 2");
    let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, vec!["1", "+", "2"]);
}

#[test]
fn multi_char_punctuation_wins_over_single_char() {
    let tokens = kinds_and_text("a == b != c <= d >= e");
    let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, vec!["a", "==", "b", "!=", "c", "<=", "d", ">=", "e"]);
}

#[test]
fn empty_brace_pairs_tokenize_as_one_multi_char_token() {
    let tokens = kinds_and_text("int{} a[] b<>");
    let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, vec!["int", "{}", "a", "[]", "b", "<>"]);
}

#[test]
fn identifiers_allow_underscores_and_digits_after_the_first_char() {
    let tokens = kinds_and_text("_x1 y_2");
    assert_eq!(tokens[0], (TokenKind::Identifier, "_x1".to_owned()));
    assert_eq!(tokens[1], (TokenKind::Identifier, "y_2".to_owned()));
}

#[test]
fn unterminated_string_is_a_lexical_error() {
    assert!(Tokenizer::tokenize("\"unterminated").is_err());
}

#[test]
fn unterminated_block_comment_is_a_lexical_error() {
    assert!(Tokenizer::tokenize("1 /* never closed").is_err());
}
