//! Splitting `;`-delimited scripts into statements.
//!
//! Semicolons inside string literals, quoted identifiers and comments do
//! not end a statement. Slices that hold nothing but whitespace or comments
//! are dropped.

use memchr::{memchr, memchr_iter, memrchr};

use crate::lexer::Lexer;
use crate::token::TokenKind;

/// One statement cut out of a script, with its location in the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSlice<'a> {
    /// Statement text without the terminating `;` and surrounding
    /// whitespace.
    pub text: &'a str,
    /// Byte offset of `text` in the script.
    pub offset: u32,
    /// 1-based line of the first byte of `text`.
    pub line: u32,
    /// 1-based column (in chars) of the first byte of `text`.
    pub col: u32,
}

/// Split `script` on top-level `;`.
#[must_use]
pub fn split_statements(script: &str) -> Vec<StatementSlice<'_>> {
    let bytes = script.as_bytes();
    let mut slices = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"' | b'`') => i = skip_quoted(bytes, i, q),
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = memchr(b'\n', &bytes[i..]).map_or(bytes.len(), |n| i + n);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b';' => {
                push_slice(script, start, i, &mut slices);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    push_slice(script, start, bytes.len(), &mut slices);
    slices
}

/// Index just past the closing quote, or the end of input when the quote
/// is never closed. Doubled quotes stand for themselves.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    loop {
        let Some(n) = memchr(quote, &bytes[i..]) else {
            return bytes.len();
        };
        i += n + 1;
        if bytes.get(i) == Some(&quote) {
            i += 1;
        } else {
            return i;
        }
    }
}

/// Index just past the matching `*/`. Block comments nest.
fn skip_block_comment(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0u32;
    let mut i = open;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

fn push_slice<'a>(script: &'a str, start: usize, end: usize, out: &mut Vec<StatementSlice<'a>>) {
    let raw = &script[start..end];
    let text = raw.trim();
    if text.is_empty() {
        return;
    }
    // Comment-only slices lex straight to end of input.
    if matches!(Lexer::new(text).next_token(), Ok(ref tok) if tok.kind == TokenKind::Eof) {
        return;
    }

    let begin = start + (raw.len() - raw.trim_start().len());
    let prefix = &script.as_bytes()[..begin];
    let line = memchr_iter(b'\n', prefix).count() + 1;
    let line_start = memrchr(b'\n', prefix).map_or(0, |n| n + 1);
    let col = script[line_start..begin].chars().count() + 1;

    let slice = StatementSlice {
        text,
        offset: u32::try_from(begin).unwrap_or(u32::MAX),
        line: u32::try_from(line).unwrap_or(u32::MAX),
        col: u32::try_from(col).unwrap_or(u32::MAX),
    };
    tracing::trace!(
        target: "lql.parse",
        offset = slice.offset,
        line = slice.line,
        len = text.len(),
        "split statement"
    );
    out.push(slice);
}
