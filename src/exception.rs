//! The interpreter's single error type.
//!
//! Every fallible operation in the tokenizer, tagger, parser, and evaluator
//! returns [`RunResult<T>`]. There is no multi-error mode (see `spec.md` §7):
//! the first [`TekoException`] produced short-circuits the whole pipeline via
//! `?`, and the caller (the CLI, or an embedding host) is the only place that
//! ever sees more than one.

use std::fmt;

/// Result alias used throughout the crate.
pub type RunResult<T> = Result<T, TekoException>;

/// The three error categories from `spec.md` §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExcKind {
    /// Unknown byte, unterminated string/comment, unbalanced braces, illegal
    /// statement start, mismatched tag.
    Lexical,
    /// Undeclared name, shadowing, void-typed variable, type mismatches,
    /// duplicate fields/keywords, positional-after-keyword, and the other
    /// compile-time checks listed in `spec.md` §7.2.
    Static,
    /// Assertion failure, uninitialized read, missing comparator, and the
    /// other run-time-only failures listed in `spec.md` §7.3.
    Runtime,
}

/// A single Teko-level exception: a kind, a message, and the source line it
/// was raised at.
///
/// `spec.md` §6 fixes the wire format exactly: any top-level reporter must
/// print `Teko interpreter exception (line N): <message>` and exit non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TekoException {
    pub kind: ExcKind,
    pub message: String,
    pub line: u32,
}

impl TekoException {
    pub fn new(kind: ExcKind, line: u32, message: impl Into<String>) -> Self {
        Self { kind, line, message: message.into() }
    }

    pub fn lexical(line: u32, message: impl Into<String>) -> Self {
        Self::new(ExcKind::Lexical, line, message)
    }

    pub fn static_error(line: u32, message: impl Into<String>) -> Self {
        Self::new(ExcKind::Static, line, message)
    }

    pub fn runtime(line: u32, message: impl Into<String>) -> Self {
        Self::new(ExcKind::Runtime, line, message)
    }
}

impl fmt::Display for TekoException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Teko interpreter exception (line {}): {}", self.line, self.message)
    }
}

impl std::error::Error for TekoException {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_matches_spec() {
        let exc = TekoException::runtime(12, "assertion failed");
        assert_eq!(exc.to_string(), "Teko interpreter exception (line 12): assertion failed");
    }
}
