//! LQL lexer.
//!
//! Converts query text into tokens on demand. Uses memchr for quote
//! scanning. Tracks line/column for error reporting.

use lql_ast::Span;
use memchr::memchr;

use crate::error::{LexError, LexErrorKind};
use crate::token::{Token, TokenKind};

fn offset(pos: usize) -> u32 {
    u32::try_from(pos).unwrap_or(u32::MAX)
}

/// Parse a float literal, rejecting values that overflow to infinity.
fn finite_f64(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Lexer that produces tokens from source text, one at a time.
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, counted in characters).
    col: u32,
    /// End offset of the previous token if it was a word or number; a `.`
    /// directly after it is a path separator, not a decimal point.
    word_end: Option<usize>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            src: source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            word_end: None,
        }
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token<'a>>, LexError> {
        let mut lexer = Self::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    /// Produce the next token, or `Eof` at end of input.
    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        self.skip_whitespace_and_comments()?;

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;

        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: "",
                span: Span::new(offset(start), offset(start)),
                line: start_line,
                col: start_col,
            });
        };

        let after_word = self.word_end == Some(start);

        let kind = match ch {
            b'\'' => self.lex_string(start_line, start_col)?,
            b'"' => TokenKind::DoubleQuotedId(self.lex_quoted(b'"', start_line, start_col)?),
            b'`' => TokenKind::BacktickId(self.lex_quoted(b'`', start_line, start_col)?),

            b'0'..=b'9' => self.lex_number(start_line, start_col)?,
            b'.' if !after_word && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(start_line, start_col)?
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(),

            b'+' => self.single(TokenKind::Plus),
            b'-' => self.single(TokenKind::Minus),
            b'*' => self.single(TokenKind::Star),
            b'/' => self.single(TokenKind::Slash),
            b'%' => self.single(TokenKind::Percent),
            b',' => self.single(TokenKind::Comma),
            b';' => self.single(TokenKind::Semicolon),
            b':' => self.single(TokenKind::Colon),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'.' => self.single(TokenKind::Dot),

            b'<' => self.lex_lt(),
            b'>' => self.lex_gt(),
            b'=' => self.lex_eq(),
            b'!' => self.lex_bang(start_line, start_col)?,

            _ => {
                let c = self.src[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(self.error(LexErrorKind::UnexpectedChar(c), start, start_line, start_col));
            }
        };

        self.word_end = match &kind {
            TokenKind::Id(_)
            | TokenKind::DigitId(_)
            | TokenKind::DoubleQuotedId(_)
            | TokenKind::BacktickId(_)
            | TokenKind::Integer(_) => Some(self.pos),
            k if k.is_keyword() => Some(self.pos),
            _ => None,
        };

        Ok(Token {
            kind,
            text: &self.src[start..self.pos],
            span: Span::new(offset(start), offset(self.pos)),
            line: start_line,
            col: start_col,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn advance(&mut self) -> u8 {
        let ch = self.bytes[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // UTF-8 continuation bytes do not start a new column.
            self.col += 1;
        }
        ch
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    #[allow(clippy::unused_self)]
    fn error(&self, kind: LexErrorKind, start: usize, line: u32, col: u32) -> LexError {
        LexError {
            kind,
            offset: offset(start),
            line,
            col,
        }
    }

    /// Skip whitespace, line comments (`--`) and nested block comments.
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while self.peek().is_some_and(|c| matches!(c, b' ' | b'\t' | b'\r' | b'\n')) {
                self.advance();
            }

            match (self.peek(), self.peek_at(1)) {
                (Some(b'-'), Some(b'-')) => {
                    let rest = &self.bytes[self.pos..];
                    let len = memchr(b'\n', rest).unwrap_or(rest.len());
                    self.advance_by(len);
                }
                (Some(b'/'), Some(b'*')) => {
                    let (start, line, col) = (self.pos, self.line, self.col);
                    self.advance_by(2);
                    let mut depth = 1u32;
                    while depth > 0 {
                        match (self.peek(), self.peek_at(1)) {
                            (None, _) => {
                                return Err(self.error(
                                    LexErrorKind::UnterminatedComment,
                                    start,
                                    line,
                                    col,
                                ));
                            }
                            (Some(b'/'), Some(b'*')) => {
                                self.advance_by(2);
                                depth += 1;
                            }
                            (Some(b'*'), Some(b'/')) => {
                                self.advance_by(2);
                                depth -= 1;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Literal tokenizers
    // -----------------------------------------------------------------------

    /// Read a body delimited by `quote`, where a doubled quote stands for
    /// itself. The opening quote is at `self.pos`.
    fn scan_quoted(&mut self, quote: u8) -> Option<String> {
        self.advance();
        let mut value = String::new();
        loop {
            let offset = memchr(quote, &self.bytes[self.pos..])?;
            value.push_str(&self.src[self.pos..self.pos + offset]);
            self.advance_by(offset + 1);
            if self.peek() == Some(quote) {
                value.push(char::from(quote));
                self.advance();
            } else {
                return Some(value);
            }
        }
    }

    /// Lex a single-quoted string literal.
    fn lex_string(&mut self, line: u32, col: u32) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.scan_quoted(b'\'').map(TokenKind::String).ok_or_else(|| {
            self.error(LexErrorKind::UnterminatedString, start, line, col)
        })
    }

    /// Lex a `"..."` or `` `...` `` identifier body.
    fn lex_quoted(&mut self, quote: u8, line: u32, col: u32) -> Result<String, LexError> {
        let start = self.pos;
        self.scan_quoted(quote)
            .ok_or_else(|| self.error(LexErrorKind::UnterminatedIdent, start, line, col))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Lex `Integer`, `Decimal`, `Double` or a digit-leading word.
    fn lex_number(&mut self, line: u32, col: u32) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let mut is_decimal = false;

        self.skip_digits();
        let int_digits = self.pos > start;

        if self.peek() == Some(b'.') {
            if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                is_decimal = true;
                self.advance();
                self.skip_digits();
            } else if int_digits && !self.peek_at(1).is_some_and(|c| is_word_byte(c) || c == b'.') {
                // `1.` is a decimal.
                is_decimal = true;
                self.advance();
            }
        }

        // Exponent: `e` counts only when digits follow, so `1e` and `1em`
        // stay words.
        let exp_digits_at = match (self.peek(), self.peek_at(1)) {
            (Some(b'e' | b'E'), Some(b'+' | b'-')) => 2,
            (Some(b'e' | b'E'), _) => 1,
            _ => 0,
        };
        if exp_digits_at > 0 && self.peek_at(exp_digits_at).is_some_and(|c| c.is_ascii_digit()) {
            self.advance_by(exp_digits_at);
            self.skip_digits();
            let text = &self.src[start..self.pos];
            return finite_f64(text)
                .map(TokenKind::Double)
                .ok_or_else(|| self.error(LexErrorKind::InvalidNumber, start, line, col));
        }

        if !is_decimal && self.peek().is_some_and(is_word_byte) {
            while self.peek().is_some_and(is_word_byte) {
                self.advance();
            }
            return Ok(TokenKind::DigitId(self.src[start..self.pos].to_owned()));
        }

        let text = &self.src[start..self.pos];
        if is_decimal {
            finite_f64(text)
                .map(TokenKind::Decimal)
                .ok_or_else(|| self.error(LexErrorKind::InvalidNumber, start, line, col))
        } else {
            text.parse::<u64>()
                .map(TokenKind::Integer)
                .map_err(|_| self.error(LexErrorKind::InvalidNumber, start, line, col))
        }
    }

    /// Lex an identifier or keyword.
    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(is_word_byte) {
            self.advance();
        }
        let text = &self.src[start..self.pos];
        TokenKind::lookup_keyword(text).unwrap_or_else(|| TokenKind::Id(text.to_owned()))
    }

    // -----------------------------------------------------------------------
    // Multi-character operator tokenizers
    // -----------------------------------------------------------------------

    /// Lex `<`, `<=` or `<>`.
    fn lex_lt(&mut self) -> TokenKind {
        self.advance();
        match self.peek() {
            Some(b'=') => self.single(TokenKind::Le),
            Some(b'>') => self.single(TokenKind::Ne),
            _ => TokenKind::Lt,
        }
    }

    /// Lex `>` or `>=`.
    fn lex_gt(&mut self) -> TokenKind {
        self.advance();
        if self.peek() == Some(b'=') {
            self.single(TokenKind::Ge)
        } else {
            TokenKind::Gt
        }
    }

    /// Lex `=` or `=~`.
    fn lex_eq(&mut self) -> TokenKind {
        self.advance();
        if self.peek() == Some(b'~') {
            self.single(TokenKind::RegexMatch)
        } else {
            TokenKind::Eq
        }
    }

    /// Lex `!=` or `!~`.
    fn lex_bang(&mut self, line: u32, col: u32) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.advance();
        match self.peek() {
            Some(b'=') => Ok(self.single(TokenKind::Ne)),
            Some(b'~') => Ok(self.single(TokenKind::RegexNotMatch)),
            _ => Err(self.error(LexErrorKind::UnexpectedChar('!'), start, line, col)),
        }
    }
}
