//! Tokenizer (`spec.md` §4.A): source text to a linear stream of lexemes.
//!
//! Single-pass, greedy, tracking a 1-based line counter. Modeled on the
//! cursor-based lexers in the retrieval pack (e.g. `faxc-lex`'s
//! `Cursor`-driven `Lexer`): we walk the source as a `Peekable<Chars>`
//! rather than indexing bytes, since Teko source is plain UTF-8 and a
//! char cursor sidesteps multi-byte slicing entirely.

use std::iter::Peekable;
use std::str::Chars;

use crate::exception::{RunResult, TekoException};

/// The five lexical classes from `spec.md` §3.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Real,
    StringLiteral,
    Punctuation,
}

/// A single lexeme: its raw source text, byte position, and source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: usize,
    pub line: u32,
}

/// Longest-prefix-wins multi-character punctuation, checked before falling
/// back to a single punctuation byte. Order matters only in that every
/// prefix of a two-char entry must not itself be checked first; we just try
/// two-char combos, then one-char.
const MULTI_CHAR_PUNCT: &[&str] =
    &["==", "<=", ">=", "!=", "<:", "+=", "-=", "*=", "/=", "^=", "%=", "{}", "[]", "<>"];

pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
    line: u32,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { chars: source.chars().peekable(), pos: 0, line: 1 }
    }

    /// Tokenizes the entire source in one pass.
    pub fn tokenize(source: &'a str) -> RunResult<Vec<Token>> {
        let mut tokenizer = Self::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&mut self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    /// Returns the next token, or `None` at end of input.
    fn next_token(&mut self) -> RunResult<Option<Token>> {
        loop {
            match self.peek() {
                None => return Ok(None),
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek2() == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek2() == Some('*') => self.skip_block_comment()?,
                Some('"') => return Ok(Some(self.lex_string()?)),
                Some(c) if is_ident_start(c) => return Ok(Some(self.lex_identifier())),
                Some(c) if c.is_ascii_digit() => return Ok(Some(self.lex_number())),
                Some(c) => return Ok(Some(self.lex_punctuation(c)?)),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> RunResult<()> {
        let start_line = self.line;
        self.bump(); // '/'
        self.bump(); // '*'
        loop {
            match self.peek() {
                None => return Err(TekoException::lexical(start_line, "unterminated block comment")),
                Some('*') if self.peek2() == Some('/') => {
                    self.bump();
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn lex_string(&mut self) -> RunResult<Token> {
        let start_pos = self.pos;
        let start_line = self.line;
        let mut text = String::new();
        text.push(self.bump().expect("caller confirmed opening quote"));
        loop {
            match self.peek() {
                None => return Err(TekoException::lexical(start_line, "unterminated string literal")),
                Some('\n') => return Err(TekoException::lexical(start_line, "newline inside string literal")),
                Some('\\') => {
                    text.push(self.bump().expect("peeked"));
                    match self.bump() {
                        None => return Err(TekoException::lexical(start_line, "unterminated string literal")),
                        Some(escaped) => text.push(escaped),
                    }
                }
                Some('"') => {
                    text.push(self.bump().expect("peeked"));
                    break;
                }
                Some(_) => text.push(self.bump().expect("peeked")),
            }
        }
        Ok(Token { kind: TokenKind::StringLiteral, text, pos: start_pos, line: start_line })
    }

    fn lex_identifier(&mut self) -> Token {
        let start_pos = self.pos;
        let start_line = self.line;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                text.push(self.bump().expect("peeked"));
            } else {
                break;
            }
        }
        Token { kind: TokenKind::Identifier, text, pos: start_pos, line: start_line }
    }

    fn lex_number(&mut self) -> Token {
        let start_pos = self.pos;
        let start_line = self.line;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(self.bump().expect("peeked"));
            } else {
                break;
            }
        }
        let mut kind = TokenKind::Integer;
        if self.peek() == Some('.') {
            kind = TokenKind::Real;
            text.push(self.bump().expect("peeked")); // '.'
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(self.bump().expect("peeked"));
                } else {
                    break;
                }
            }
        }
        Token { kind, text, pos: start_pos, line: start_line }
    }

    fn lex_punctuation(&mut self, c: char) -> RunResult<Token> {
        let start_pos = self.pos;
        let start_line = self.line;
        let mut two = String::new();
        two.push(c);
        if let Some(next) = self.peek2_from_current() {
            two.push(next);
        }
        if MULTI_CHAR_PUNCT.contains(&two.as_str()) {
            self.bump();
            self.bump();
            return Ok(Token { kind: TokenKind::Punctuation, text: two, pos: start_pos, line: start_line });
        }
        self.bump();
        if !is_known_punct_char(c) {
            return Err(TekoException::lexical(start_line, format!("unknown byte '{c}'")));
        }
        Ok(Token { kind: TokenKind::Punctuation, text: c.to_string(), pos: start_pos, line: start_line })
    }

    fn peek2_from_current(&mut self) -> Option<char> {
        self.peek2()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_known_punct_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '^' | '%' | '=' | '<' | '>' | '!' | '.' | ',' | ';' | ':' | '?' | '(' | ')' | '{'
            | '}' | '[' | ']' | '&' | '|' | '$'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        Tokenizer::tokenize(source).unwrap().into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn lexes_integer_and_real() {
        assert_eq!(kinds("42"), vec![(TokenKind::Integer, "42".into())]);
        assert_eq!(kinds("4.5"), vec![(TokenKind::Real, "4.5".into())]);
    }

    #[test]
    fn lexes_identifier_keywords_look_like_identifiers() {
        assert_eq!(kinds("if_else"), vec![(TokenKind::Identifier, "if_else".into())]);
    }

    #[test]
    fn lexes_string_with_escapes() {
        let toks = Tokenizer::tokenize(r#""a\"b""#).unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].text, r#""a\"b""#);
    }

    #[test]
    fn skips_comments() {
        assert_eq!(kinds("// hi\n42"), vec![(TokenKind::Integer, "42".into())]);
        assert_eq!(kinds("/* hi */42"), vec![(TokenKind::Integer, "42".into())]);
    }

    #[test]
    fn longest_prefix_wins_for_multi_char_punct() {
        assert_eq!(kinds("<="), vec![(TokenKind::Punctuation, "<=".into())]);
        assert_eq!(kinds("<"), vec![(TokenKind::Punctuation, "<".into())]);
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        assert!(Tokenizer::tokenize("/* never closes").is_err());
    }

    #[test]
    fn newline_in_string_is_fatal() {
        assert!(Tokenizer::tokenize("\"a\nb\"").is_err());
    }

    #[test]
    fn unknown_byte_is_fatal() {
        assert!(Tokenizer::tokenize("@").is_err());
    }
}
