//! Bounded lookahead over the lexer.
//!
//! Tokens are pulled on demand into a small ring buffer. The grammar never
//! needs more than [`LOOKAHEAD`] tokens past the current one.

use std::collections::VecDeque;

use crate::error::LexError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Maximum number of buffered tokens.
pub const LOOKAHEAD: usize = 4;

pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    buf: VecDeque<Token<'a>>,
    /// First lexer failure. Once set, the stream yields a `TokenKind::Error`
    /// token at the failure offset forever.
    lex_error: Option<LexError>,
}

impl<'a> TokenStream<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let mut stream = Self {
            lexer: Lexer::new(source),
            buf: VecDeque::with_capacity(LOOKAHEAD),
            lex_error: None,
        };
        stream.fill();
        stream
    }

    /// Top the buffer up to [`LOOKAHEAD`] tokens.
    fn fill(&mut self) {
        while self.buf.len() < LOOKAHEAD {
            if let Some(last) = self.buf.back() {
                if matches!(last.kind, TokenKind::Eof | TokenKind::Error) {
                    let sticky = last.clone();
                    self.buf.push_back(sticky);
                    continue;
                }
            }
            let tok = match self.lexer.next_token() {
                Ok(tok) => tok,
                Err(err) => {
                    let offset = err.offset;
                    let tok = Token {
                        kind: TokenKind::Error,
                        text: "",
                        span: lql_ast::Span::new(offset, offset),
                        line: err.line,
                        col: err.col,
                    };
                    self.lex_error = Some(err);
                    tok
                }
            };
            self.buf.push_back(tok);
        }
    }

    /// The current token.
    #[must_use]
    pub fn peek(&self) -> &Token<'a> {
        self.peek_nth(0)
    }

    /// The token `n` positions past the current one. Anything at or past
    /// [`LOOKAHEAD`] reads as the last buffered token.
    #[must_use]
    pub fn peek_nth(&self, n: usize) -> &Token<'a> {
        debug_assert!(n < LOOKAHEAD, "lookahead {n} exceeds buffer");
        &self.buf[n.min(self.buf.len() - 1)]
    }

    /// Consume and return the current token. At end of input (or after a
    /// lex failure) the same terminal token is returned again.
    pub fn advance(&mut self) -> Token<'a> {
        let tok = self.buf[0].clone();
        if !matches!(tok.kind, TokenKind::Eof | TokenKind::Error) {
            self.buf.pop_front();
            self.fill();
        }
        tok
    }

    /// The lexer failure that produced the current `Error` token, if any.
    #[must_use]
    pub const fn lex_error(&self) -> Option<&LexError> {
        self.lex_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexErrorKind;

    #[test]
    fn peek_does_not_consume() {
        let mut ts = TokenStream::new("SHOW TAG KEYS FROM cpu");
        assert_eq!(ts.peek_nth(2).kind, TokenKind::KwKeys);
        assert_eq!(ts.peek().kind, TokenKind::KwShow);
        assert_eq!(ts.advance().kind, TokenKind::KwShow);
        assert_eq!(ts.peek().kind, TokenKind::KwTag);
    }

    #[test]
    fn eof_is_sticky() {
        let mut ts = TokenStream::new("x");
        assert_eq!(ts.advance().kind, TokenKind::Id("x".to_owned()));
        assert_eq!(ts.advance().kind, TokenKind::Eof);
        assert_eq!(ts.advance().kind, TokenKind::Eof);
        assert_eq!(ts.peek_nth(3).kind, TokenKind::Eof);
    }

    #[test]
    fn lex_failure_becomes_error_token() {
        let mut ts = TokenStream::new("a 'open");
        assert_eq!(ts.advance().kind, TokenKind::Id("a".to_owned()));
        let tok = ts.advance();
        assert_eq!(tok.kind, TokenKind::Error);
        assert_eq!(tok.span.start, 2);
        let Some(err) = ts.lex_error() else {
            unreachable!("expected a stored lex error");
        };
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(ts.advance().kind, TokenKind::Error);
    }

    #[test]
    fn buffer_stays_bounded() {
        let mut ts = TokenStream::new("a b c d e f g");
        for _ in 0..5 {
            let _ = ts.peek_nth(LOOKAHEAD - 1);
            ts.advance();
            assert_eq!(ts.buf.len(), LOOKAHEAD);
        }
    }
}
