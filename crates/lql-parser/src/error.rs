//! Lexer and parser error types.

use lql_ast::Span;
use thiserror::Error;

/// What went wrong while turning characters into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated quoted identifier")]
    UnterminatedIdent,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("invalid numeric literal")]
    InvalidNumber,
}

/// A malformed character stream at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {kind} at offset {offset}")]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Byte offset where the offending token starts.
    pub offset: u32,
    pub line: u32,
    pub col: u32,
}

/// Error category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseErrorKind {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unterminated literal")]
    UnterminatedLiteral,
    #[error("unknown statement")]
    UnknownStatement,
    #[error("invalid duration")]
    InvalidDuration,
    #[error("empty list")]
    EmptyList,
    #[error("invalid number")]
    InvalidNumber,
    #[error("invalid character")]
    InvalidCharacter,
    #[error("input too long")]
    InputTooLong,
    #[error("nesting too deep")]
    NestingTooDeep,
}

/// The first syntax error found in a statement.
///
/// `span` covers the offending token (or the unmatched `(` for unbalanced
/// parentheses). `found` is the token as written and `expected` lists the
/// acceptable tokens or token categories.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{line}:{col} (offset {}): {message}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub line: u32,
    pub col: u32,
    pub found: String,
    pub expected: Vec<String>,
    pub message: String,
    #[source]
    lex: Option<LexError>,
}

impl ParseError {
    #[must_use]
    pub(crate) fn new(
        kind: ParseErrorKind,
        span: Span,
        line: u32,
        col: u32,
        found: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            span,
            line,
            col,
            found: found.into(),
            expected: Vec::new(),
            message: message.into(),
            lex: None,
        }
    }

    #[must_use]
    pub(crate) fn with_expected(mut self, expected: Vec<String>) -> Self {
        self.expected = expected;
        self
    }

    /// Append the statement kind to the message, once.
    #[must_use]
    pub(crate) fn with_context(mut self, statement: &str) -> Self {
        if !self.message.ends_with(" statement)") {
            self.message = format!("{} (in {statement} statement)", self.message);
        }
        self
    }

    /// Shift the location right by `offset` bytes; used when a statement
    /// was cut out of a larger script.
    pub(crate) fn rebase(&mut self, offset: u32, line_delta: u32, first_line_col: u32) {
        self.span = Span::new(self.span.start + offset, self.span.end + offset);
        if self.line == 1 {
            self.col += first_line_col;
        }
        self.line += line_delta;
        if let Some(lex) = self.lex.as_mut() {
            lex.offset += offset;
            if lex.line == 1 {
                lex.col += first_line_col;
            }
            lex.line += line_delta;
        }
    }

    /// The lexer failure behind this error, if the input could not be
    /// tokenized.
    #[must_use]
    pub const fn lex_error(&self) -> Option<&LexError> {
        self.lex.as_ref()
    }

    /// Byte offset of the error in the input.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.span.start
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        let kind = match err.kind {
            LexErrorKind::UnterminatedString
            | LexErrorKind::UnterminatedIdent
            | LexErrorKind::UnterminatedComment => ParseErrorKind::UnterminatedLiteral,
            LexErrorKind::InvalidNumber => ParseErrorKind::InvalidNumber,
            LexErrorKind::UnexpectedChar(_) => ParseErrorKind::InvalidCharacter,
        };
        let found = match err.kind {
            LexErrorKind::UnexpectedChar(c) => c.to_string(),
            _ => String::new(),
        };
        Self {
            kind,
            span: Span::new(err.offset, err.offset.saturating_add(1)),
            line: err.line,
            col: err.col,
            found,
            expected: Vec::new(),
            message: err.kind.to_string(),
            lex: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_converts_to_unterminated_literal() {
        let lex = LexError {
            kind: LexErrorKind::UnterminatedString,
            offset: 7,
            line: 1,
            col: 8,
        };
        let err = ParseError::from(lex.clone());
        assert_eq!(err.kind, ParseErrorKind::UnterminatedLiteral);
        assert_eq!(err.offset(), 7);
        assert_eq!(err.lex_error(), Some(&lex));
        assert_eq!(
            err.to_string(),
            "1:8 (offset 7): unterminated string literal"
        );
    }

    #[test]
    fn context_is_appended_once() {
        let err = ParseError::new(
            ParseErrorKind::UnexpectedToken,
            Span::new(5, 10),
            1,
            6,
            "WHERE",
            "expected FROM, got WHERE",
        )
        .with_context("SHOW")
        .with_context("SHOW");
        assert_eq!(
            err.to_string(),
            "1:6 (offset 5): expected FROM, got WHERE (in SHOW statement)"
        );
    }

    #[test]
    fn rebase_moves_first_line_columns_only() {
        let mut err = ParseError::new(
            ParseErrorKind::UnexpectedToken,
            Span::new(2, 3),
            1,
            3,
            "x",
            "boom",
        );
        err.rebase(10, 2, 4);
        assert_eq!(err.span, Span::new(12, 13));
        assert_eq!((err.line, err.col), (3, 7));
    }
}
