//! Durations, `now()` and time-range bounds.
//!
//! ```text
//! timeExpr     := nowExpr | durationExpr | string | number
//! nowExpr      := NOW '(' ')' (('+'|'-') duration)*
//! durationExpr := '-'? duration (('+'|'-') duration)*
//! duration     := INTEGER unit | DIGIT_IDENT
//! ```
//!
//! In a time range the first offset after `now()` is folded into
//! `Expr::Now` and later ones become `Expr::Binary` add/subtract nodes.
//! Field expressions treat `now()` as a plain operand.

use lql_ast::{BinaryOp, DurationLit, DurationUnit, Expr, Literal, Span};

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::{Parser, signed_int};
use crate::token::{Token, TokenKind};

/// Split `30m` into `("30", "m")`.
fn split_digit_word(text: &str) -> (&str, &str) {
    let idx = text
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(text.len());
    text.split_at(idx)
}

/// Whether `text` has the shape of a compact duration: digits followed by
/// one of the unit suffixes.
pub(crate) fn is_duration_word(text: &str) -> bool {
    let (digits, unit) = split_digit_word(text);
    !digits.is_empty() && DurationUnit::from_suffix(unit).is_some()
}

fn is_unit_token(tok: &Token<'_>) -> bool {
    matches!(tok.kind, TokenKind::Id(_)) && DurationUnit::from_suffix(tok.text).is_some()
}

impl Parser<'_> {
    /// Whether a (possibly negated) duration literal starts here.
    pub(crate) fn at_duration(&self) -> bool {
        let skip = usize::from(self.check(&TokenKind::Minus));
        self.duration_at(skip)
    }

    fn duration_at(&self, n: usize) -> bool {
        let tok = self.tokens.peek_nth(n);
        match tok.kind {
            TokenKind::DigitId(_) => is_duration_word(tok.text),
            TokenKind::Integer(_) => is_unit_token(self.tokens.peek_nth(n + 1)),
            _ => false,
        }
    }

    /// Whether `now(` starts here.
    pub(crate) fn at_now(&self) -> bool {
        let tok = self.tokens.peek();
        matches!(tok.kind, TokenKind::Id(_))
            && tok.text.eq_ignore_ascii_case("now")
            && self.peek_nth_kind(1) == &TokenKind::LeftParen
    }

    /// Parse `duration` with the given sign folded in. `start` is the span
    /// of a leading `-`, if one was consumed.
    fn parse_duration(&mut self, negative: bool, start: Option<Span>) -> Result<DurationLit, ParseError> {
        let tok = self.tokens.peek().clone();
        let (digits, unit_text, span) = match tok.kind {
            TokenKind::DigitId(_) => {
                self.advance();
                let (digits, unit) = split_digit_word(tok.text);
                (digits, unit, tok.span)
            }
            TokenKind::Integer(_) if is_unit_token(self.tokens.peek_nth(1)) => {
                self.advance();
                let unit = self.advance();
                (tok.text, unit.text, tok.span.merge(unit.span))
            }
            _ => return Err(self.err_expected("duration")),
        };

        let Some(unit) = DurationUnit::from_suffix(unit_text) else {
            return Err(ParseError::new(
                ParseErrorKind::InvalidDuration,
                span,
                tok.line,
                tok.col,
                tok.text,
                format!(
                    "invalid duration unit `{unit_text}` in {}, expected one of s, m, h, d, w, M, y",
                    tok.text
                ),
            ));
        };
        let value = digits
            .parse::<u64>()
            .ok()
            .and_then(|v| signed_int(v, negative))
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::InvalidNumber,
                    span,
                    tok.line,
                    tok.col,
                    tok.text,
                    format!("duration value out of range: {}", tok.text),
                )
            })?;
        Ok(DurationLit {
            value,
            unit,
            span: start.map_or(span, |s| s.merge(span)),
        })
    }

    /// `'-'? duration`.
    pub(crate) fn parse_signed_duration(&mut self) -> Result<DurationLit, ParseError> {
        if self.check(&TokenKind::Minus) {
            let minus = self.advance().span;
            self.parse_duration(true, Some(minus))
        } else {
            self.parse_duration(false, None)
        }
    }

    /// Whether `+ duration` or `- duration` follows.
    fn at_duration_offset(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) && self.duration_at(1)
    }

    /// Fold trailing `± duration` terms onto `lhs`.
    fn parse_duration_tail(&mut self, mut lhs: Expr) -> Result<Expr, ParseError> {
        self.chain(|p| {
            while p.at_duration_offset() {
                p.deepen()?;
                let op = if p.advance().kind == TokenKind::Plus {
                    BinaryOp::Add
                } else {
                    BinaryOp::Subtract
                };
                let rhs = p.parse_duration(false, None)?;
                let span = lhs.span().merge(rhs.span);
                lhs = Expr::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(Expr::Duration(rhs)),
                    span,
                };
            }
            Ok(lhs)
        })
    }

    /// `now()` on its own. Returns its span.
    pub(crate) fn parse_now_call(&mut self) -> Result<Span, ParseError> {
        let start = self.advance().span;
        let open = self.advance();
        self.expect_close_paren(&open)?;
        Ok(self.span_from(start))
    }

    /// `now() (± duration)*` as the bound of a time range.
    fn parse_now(&mut self) -> Result<Expr, ParseError> {
        let start = self.parse_now_call()?;

        let offset = if self.at_duration_offset() {
            let negative = self.advance().kind == TokenKind::Minus;
            Some(self.parse_duration(negative, None)?)
        } else {
            None
        };
        let now = Expr::Now {
            offset,
            span: self.span_from(start),
        };
        self.parse_duration_tail(now)
    }

    /// `'-'? duration (± duration)*`.
    fn parse_duration_expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_signed_duration()?;
        self.parse_duration_tail(Expr::Duration(first))
    }

    /// Right-hand side of a time range.
    pub(crate) fn parse_time_expr(&mut self) -> Result<Expr, ParseError> {
        if self.at_now() {
            return self.parse_now();
        }
        if self.at_duration() {
            return self.parse_duration_expr();
        }
        match self.peek_kind().clone() {
            TokenKind::String(s) => {
                let tok = self.advance();
                Ok(Expr::Literal(Literal::String(s), tok.span))
            }
            TokenKind::Minus
            | TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::Double(_) => {
                let start = self.current_span();
                let lit = self.parse_signed_number()?;
                Ok(Expr::Literal(lit, self.span_from(start)))
            }
            _ => Err(self.err_expected("time expression")),
        }
    }

    /// Whether a time expression (the left side of `expr op time`) starts
    /// here.
    pub(crate) fn at_time_expr(&self) -> bool {
        self.at_now()
            || self.at_duration()
            || matches!(
                self.peek_kind(),
                TokenKind::String(_)
                    | TokenKind::Minus
                    | TokenKind::Integer(_)
                    | TokenKind::Decimal(_)
                    | TokenKind::Double(_)
            )
    }

    /// `time(duration)` in GROUP BY: the `time` identifier is current.
    pub(crate) fn parse_time_bucket(&mut self) -> Result<DurationLit, ParseError> {
        self.advance();
        if !self.check(&TokenKind::LeftParen) {
            return Err(self.err_expected("("));
        }
        let open = self.advance();
        let interval = self.parse_duration(false, None)?;
        if !interval.as_seconds().is_some_and(|secs| secs > 0) {
            return Err(self.error_at(
                ParseErrorKind::InvalidDuration,
                interval.span,
                format!("time bucket interval must be positive, got {interval}"),
            ));
        }
        self.expect_close_paren(&open)?;
        Ok(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_expr(text: &str) -> Expr {
        match Parser::new(text).parse_time_expr() {
            Ok(expr) => expr,
            Err(err) => unreachable!("parse error for `{text}`: {err}"),
        }
    }

    fn time_err(text: &str) -> ParseError {
        match Parser::new(text).parse_time_expr() {
            Ok(expr) => unreachable!("expected error for `{text}`, got {expr:?}"),
            Err(err) => err,
        }
    }

    #[test]
    fn now_offsets_with_and_without_spaces() {
        for text in ["now() - 1h", "now()-1h", "NOW( ) -1h"] {
            let Expr::Now {
                offset: Some(d), ..
            } = time_expr(text)
            else {
                unreachable!("expected now() with offset for `{text}`");
            };
            assert_eq!((d.value, d.unit), (-1, DurationUnit::Hour), "{text}");
        }
    }

    #[test]
    fn bare_now() {
        assert!(matches!(time_expr("now()"), Expr::Now { offset: None, .. }));
    }

    #[test]
    fn now_chain_becomes_binary() {
        let Expr::Binary {
            op: BinaryOp::Add,
            left,
            right,
            ..
        } = time_expr("now() - 1d + 30m")
        else {
            unreachable!("expected binary");
        };
        assert!(matches!(*left, Expr::Now { offset: Some(ref d), .. } if d.value == -1));
        assert!(matches!(*right, Expr::Duration(ref d) if d.value == 30 && d.unit == DurationUnit::Minute));
    }

    #[test]
    fn integer_with_separate_unit() {
        let Expr::Duration(d) = time_expr("5 m") else {
            unreachable!("expected duration");
        };
        assert_eq!((d.value, d.unit), (5, DurationUnit::Minute));
        assert_eq!(d.span, Span::new(0, 3));
    }

    #[test]
    fn negative_duration_and_literals() {
        let Expr::Duration(d) = time_expr("-2w") else {
            unreachable!("expected duration");
        };
        assert_eq!((d.value, d.unit, d.span), (-2, DurationUnit::Week, Span::new(0, 3)));
        assert!(matches!(
            time_expr("'2024-01-01 00:00:00'"),
            Expr::Literal(Literal::String(_), _)
        ));
        assert!(matches!(
            time_expr("1700000000"),
            Expr::Literal(Literal::Int(1_700_000_000), _)
        ));
    }

    #[test]
    fn zero_duration_is_legal() {
        assert!(matches!(time_expr("0s"), Expr::Duration(ref d) if d.value == 0));
    }

    #[test]
    fn month_and_minute_differ() {
        let Expr::Duration(m) = time_expr("1m") else {
            unreachable!("expected duration");
        };
        let Expr::Duration(big_m) = time_expr("1M") else {
            unreachable!("expected duration");
        };
        assert_eq!(m.unit, DurationUnit::Minute);
        assert_eq!(big_m.unit, DurationUnit::Month);
    }

    #[test]
    fn bad_duration_unit() {
        let mut p = Parser::new("time(5x)");
        let err = match p.parse_time_bucket() {
            Ok(d) => unreachable!("expected error, got {d:?}"),
            Err(err) => err,
        };
        assert_eq!(err.kind, ParseErrorKind::InvalidDuration);
        assert_eq!(err.found, "5x");
        assert_eq!(time_err("host").kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn duration_word_shapes() {
        assert!(is_duration_word("10s"));
        assert!(is_duration_word("3M"));
        assert!(!is_duration_word("10ms"));
        assert!(!is_duration_word("5xx"));
    }
}
