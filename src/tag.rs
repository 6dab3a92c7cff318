//! Tagger (`spec.md` §4.B): classifies each token into exactly one [`Tag`].
//!
//! `spec.md` describes a `Tag` as "a discriminated record with a tagType and
//! a payload mapping of fixed keys". The grounding repo's own `Object`/`Value`
//! enums (see `object.rs` in the pack) fold that kind of fixed-key payload
//! directly into enum variant fields rather than a runtime string-keyed map —
//! the Design Notes in `spec.md` §9 point the same way ("provide an enum").
//! We follow that: each `TagType` variant carries its payload as typed
//! fields instead of a map.

use crate::exception::{RunResult, TekoException};
use crate::token::{Token, TokenKind, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brace {
    Paren,
    Curly,
    Square,
    Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Exp,
    Mod,
    And,
    Or,
    /// The `:` operator once the parser has decided it is binary, not a
    /// struct-element or class-visibility separator. Dispatches to `_link`.
    Link,
}

impl BinOp {
    /// Precedence level per `spec.md` §4.C: `COMPARE < ADD_SUB < MULT_DIV < EXP`.
    /// Comparisons sit below all of these at [`crate::parser::PREC_COMPARE`].
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub | BinOp::And | BinOp::Or => crate::parser::PREC_ADD_SUB,
            BinOp::Mul | BinOp::Div | BinOp::Mod => crate::parser::PREC_MULT_DIV,
            BinOp::Exp | BinOp::Link => crate::parser::PREC_EXP,
        }
    }

    pub fn dispatch_name(self) -> &'static str {
        match self {
            BinOp::Add => "_add",
            BinOp::Sub => "_sub",
            BinOp::Mul => "_mul",
            BinOp::Div => "_div",
            BinOp::Exp => "_exp",
            BinOp::Mod => "_mod",
            BinOp::And => "_and",
            BinOp::Or => "_or",
            BinOp::Link => "_link",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetterOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ExpAssign,
    ModAssign,
}

impl SetterOp {
    /// The `BinOp` a compound setter (`OP=`) rewrites its RHS through, per
    /// `spec.md` §4.C: `x OP= y` becomes the assignment `x = BinOp(OP, x, y)`.
    pub fn compound_op(self) -> Option<BinOp> {
        match self {
            SetterOp::Assign => None,
            SetterOp::AddAssign => Some(BinOp::Add),
            SetterOp::SubAssign => Some(BinOp::Sub),
            SetterOp::MulAssign => Some(BinOp::Mul),
            SetterOp::DivAssign => Some(BinOp::Div),
            SetterOp::ExpAssign => Some(BinOp::Exp),
            SetterOp::ModAssign => Some(BinOp::Mod),
        }
    }
}

/// Comparison operator with its precedence fixed at `COMPARE`, the lowest
/// level (`spec.md` §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `<:`, the subtype comparator. Parsed and routed but never evaluated
    /// (`spec.md` §1 Out of scope, §9 "Ambiguities").
    SubtypeOf,
}

impl CompOp {
    /// The set of `_compare` return values (`-1`/`0`/`1`) this operator is
    /// satisfied by, per the `COMP` dispatch table in `spec.md` §4.F.
    pub fn satisfied_by(self) -> &'static [i8] {
        match self {
            CompOp::Eq => &[0],
            CompOp::Ne => &[-1, 1],
            CompOp::Lt => &[-1],
            CompOp::Le => &[-1, 0],
            CompOp::Gt => &[1],
            CompOp::Ge => &[0, 1],
            CompOp::SubtypeOf => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvOp {
    ToStr,
    ToReal,
    Curly,
    Square,
    Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    Readonly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagType {
    Label(String),
    StringLit(String),
    IntLit(i64),
    RealLit(f64),
    BoolLit(bool),
    If,
    Else,
    For,
    While,
    In,
    Let,
    Class,
    Semicolon,
    Colon,
    Comma,
    QMark,
    Bang,
    Dot,
    Open(Brace),
    Close(Brace),
    LAngle,
    RAngle,
    BinOp(BinOp),
    Setter(SetterOp),
    Comparison(CompOp),
    Conversion(ConvOp),
    Visibility(Visibility),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub kind: TagType,
    pub line: u32,
}

/// Classifies a token stream into a tag stream. `spec.md` §4.B.
pub fn tag_tokens(tokens: &[Token]) -> RunResult<Vec<Tag>> {
    tokens.iter().map(tag_one).collect()
}

/// Convenience: tokenize then tag in one call.
pub fn tag_source(source: &str) -> RunResult<Vec<Tag>> {
    tag_tokens(&Tokenizer::tokenize(source)?)
}

fn tag_one(token: &Token) -> RunResult<Tag> {
    let line = token.line;
    let kind = match token.kind {
        TokenKind::Identifier => tag_identifier(&token.text),
        TokenKind::Integer => {
            let value: i64 = token
                .text
                .parse()
                .map_err(|_| TekoException::lexical(line, format!("integer literal out of range: {}", token.text)))?;
            TagType::IntLit(value)
        }
        TokenKind::Real => {
            let value: f64 = token
                .text
                .parse()
                .map_err(|_| TekoException::lexical(line, format!("malformed real literal: {}", token.text)))?;
            TagType::RealLit(value)
        }
        TokenKind::StringLiteral => TagType::StringLit(unescape(&token.text, line)?),
        TokenKind::Punctuation => tag_punctuation(&token.text, line)?,
    };
    Ok(Tag { kind, line })
}

fn tag_identifier(text: &str) -> TagType {
    match text {
        "if" => TagType::If,
        "else" => TagType::Else,
        "for" => TagType::For,
        "while" => TagType::While,
        "in" => TagType::In,
        "let" => TagType::Let,
        "class" => TagType::Class,
        "true" => TagType::BoolLit(true),
        "false" => TagType::BoolLit(false),
        "public" => TagType::Visibility(Visibility::Public),
        "protected" => TagType::Visibility(Visibility::Protected),
        "private" => TagType::Visibility(Visibility::Private),
        "readonly" => TagType::Visibility(Visibility::Readonly),
        other => TagType::Label(other.to_owned()),
    }
}

fn tag_punctuation(text: &str, line: u32) -> RunResult<TagType> {
    Ok(match text {
        ";" => TagType::Semicolon,
        ":" => TagType::Colon,
        "," => TagType::Comma,
        "?" => TagType::QMark,
        "!" => TagType::Bang,
        "." => TagType::Dot,
        "(" => TagType::Open(Brace::Paren),
        ")" => TagType::Close(Brace::Paren),
        "{" => TagType::Open(Brace::Curly),
        "}" => TagType::Close(Brace::Curly),
        "[" => TagType::Open(Brace::Square),
        "]" => TagType::Close(Brace::Square),
        "<" => TagType::LAngle,
        ">" => TagType::RAngle,
        "+" => TagType::BinOp(BinOp::Add),
        "-" => TagType::BinOp(BinOp::Sub),
        "*" => TagType::BinOp(BinOp::Mul),
        "/" => TagType::BinOp(BinOp::Div),
        "^" => TagType::BinOp(BinOp::Exp),
        "%" => TagType::BinOp(BinOp::Mod),
        "&&" => TagType::BinOp(BinOp::And),
        "||" => TagType::BinOp(BinOp::Or),
        "=" => TagType::Setter(SetterOp::Assign),
        "+=" => TagType::Setter(SetterOp::AddAssign),
        "-=" => TagType::Setter(SetterOp::SubAssign),
        "*=" => TagType::Setter(SetterOp::MulAssign),
        "/=" => TagType::Setter(SetterOp::DivAssign),
        "^=" => TagType::Setter(SetterOp::ExpAssign),
        "%=" => TagType::Setter(SetterOp::ModAssign),
        "==" => TagType::Comparison(CompOp::Eq),
        "!=" => TagType::Comparison(CompOp::Ne),
        "<=" => TagType::Comparison(CompOp::Le),
        ">=" => TagType::Comparison(CompOp::Ge),
        "<:" => TagType::Comparison(CompOp::SubtypeOf),
        "$" => TagType::Conversion(ConvOp::ToStr),
        "{}" => TagType::Conversion(ConvOp::Curly),
        "[]" => TagType::Conversion(ConvOp::Square),
        "<>" => TagType::Conversion(ConvOp::Angle),
        other => return Err(TekoException::lexical(line, format!("unrecognized punctuation '{other}'"))),
    })
}

/// Unescapes a raw string-literal lexeme (quotes included) per `spec.md` §4.B:
/// `\"`, `\\`, `\n`, `\t`, `\'`.
fn unescape(raw: &str, line: u32) -> RunResult<String> {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\'') => out.push('\''),
            Some(other) => return Err(TekoException::lexical(line, format!("unknown escape sequence '\\{other}'"))),
            None => return Err(TekoException::lexical(line, "dangling escape at end of string literal")),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(source: &str) -> Vec<TagType> {
        tag_source(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_become_dedicated_tags() {
        assert_eq!(tags("if"), vec![TagType::If]);
        assert_eq!(tags("while"), vec![TagType::While]);
        assert_eq!(tags("public"), vec![TagType::Visibility(Visibility::Public)]);
        assert_eq!(tags("true"), vec![TagType::BoolLit(true)]);
    }

    #[test]
    fn angle_brackets_are_neutral() {
        assert_eq!(tags("<"), vec![TagType::LAngle]);
        assert_eq!(tags(">"), vec![TagType::RAngle]);
    }

    #[test]
    fn string_literal_is_unescaped() {
        assert_eq!(tags(r#""a\nb""#), vec![TagType::StringLit("a\nb".into())]);
    }

    #[test]
    fn compound_setters_round_trip_to_binop() {
        assert_eq!(SetterOp::AddAssign.compound_op(), Some(BinOp::Add));
        assert_eq!(SetterOp::Assign.compound_op(), None);
    }
}
