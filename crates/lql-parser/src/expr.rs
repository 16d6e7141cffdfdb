//! Field arithmetic and boolean conditions.
//!
//! Field expressions (SELECT fields, ORDER BY keys, HAVING operands) use a
//! Pratt loop over two precedence levels:
//!
//! ```text
//!   + -
//!   * / %
//!   - (unary prefix)
//! ```
//!
//! Conditions are plain recursive descent:
//!
//! ```text
//! orExpr    := andExpr (OR andExpr)*
//! andExpr   := notExpr (AND notExpr)*
//! notExpr   := NOT notExpr | predicate
//! ```
//!
//! A WHERE predicate is a parenthesized condition, a time range or a tag
//! filter. In HAVING the predicate is `fieldExpr (cmpOp fieldExpr)?` and a
//! parenthesized group may hold either arithmetic or a condition.
//!
//! Every operator folded into a chain takes one level of the nesting
//! budget, so the depth of the resulting tree stays bounded.

use lql_ast::{BinaryOp, BoolOp, CompareOp, Expr, Ident, Literal, TagFilterOp};

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::Parser;
use crate::time::is_duration_word;
use crate::token::TokenKind;

// Binding powers: higher = tighter binding.
// Left BP is checked against min_bp; right BP is passed to the recursive call.
mod bp {
    pub const ADD: (u8, u8) = (1, 2);
    pub const MUL: (u8, u8) = (3, 4);
    pub const UNARY: u8 = 5;
}

const TAG_FILTER_OPS: &[&str] = &["=", "!=", "=~", "!~", "LIKE", "NOT LIKE", "IN", "NOT IN"];

/// `= != < <= > >=`.
const fn compare_op(kind: &TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::Eq => Some(CompareOp::Eq),
        TokenKind::Ne => Some(CompareOp::NotEq),
        TokenKind::Lt => Some(CompareOp::Lt),
        TokenKind::Le => Some(CompareOp::LtEq),
        TokenKind::Gt => Some(CompareOp::Gt),
        TokenKind::Ge => Some(CompareOp::GtEq),
        _ => None,
    }
}

impl Parser<'_> {
    // -----------------------------------------------------------------------
    // Field expressions
    // -----------------------------------------------------------------------

    /// An arithmetic field expression. A parenthesized HAVING condition is
    /// rejected here; only [`Self::parse_having_predicate`] accepts one.
    pub(crate) fn parse_field_expr(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_field_expr_bp(0)?;
        self.require_arithmetic(&expr)?;
        Ok(expr)
    }

    fn parse_field_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.chain(|p| {
            let mut lhs = p.parse_field_prefix()?;

            loop {
                let (op, (l_bp, r_bp)) = match p.peek_kind() {
                    TokenKind::Plus => (BinaryOp::Add, bp::ADD),
                    TokenKind::Minus => (BinaryOp::Subtract, bp::ADD),
                    TokenKind::Star => (BinaryOp::Multiply, bp::MUL),
                    TokenKind::Slash => (BinaryOp::Divide, bp::MUL),
                    TokenKind::Percent => (BinaryOp::Modulo, bp::MUL),
                    _ => break,
                };
                if l_bp < min_bp {
                    break;
                }
                p.require_arithmetic(&lhs)?;
                p.deepen()?;
                p.advance();
                let rhs = p.parse_field_expr_bp(r_bp)?;
                p.require_arithmetic(&rhs)?;
                let span = lhs.span().merge(rhs.span());
                lhs = Expr::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    span,
                };
            }

            Ok(lhs)
        })
    }

    /// Conditions cannot be arithmetic operands.
    fn require_arithmetic(&self, expr: &Expr) -> Result<(), ParseError> {
        if expr.is_predicate() {
            Err(self
                .error_at(
                    ParseErrorKind::UnexpectedToken,
                    expr.span(),
                    "expected arithmetic expression, got condition",
                )
                .with_expected(vec!["arithmetic expression".to_owned()]))
        } else {
            Ok(())
        }
    }

    fn parse_field_prefix(&mut self) -> Result<Expr, ParseError> {
        if self.at_now() {
            // Offsets are ordinary `+`/`-` operands here.
            let span = self.parse_now_call()?;
            return Ok(Expr::Now { offset: None, span });
        }
        if self.at_duration() {
            return Ok(Expr::Duration(self.parse_signed_duration()?));
        }

        match self.peek_kind().clone() {
            TokenKind::Minus => {
                if matches!(
                    self.peek_nth_kind(1),
                    TokenKind::Integer(_) | TokenKind::Decimal(_) | TokenKind::Double(_)
                ) {
                    // Sign folds into the literal.
                    let start = self.current_span();
                    let lit = self.parse_signed_number()?;
                    return Ok(Expr::Literal(lit, self.span_from(start)));
                }
                let start = self.advance().span;
                let inner = self.nested(|p| p.parse_field_expr_bp(bp::UNARY))?;
                self.require_arithmetic(&inner)?;
                let span = start.merge(inner.span());
                Ok(Expr::Neg {
                    inner: Box::new(inner),
                    span,
                })
            }
            TokenKind::Integer(_) | TokenKind::Decimal(_) | TokenKind::Double(_) => {
                let start = self.current_span();
                let lit = self.parse_signed_number()?;
                Ok(Expr::Literal(lit, self.span_from(start)))
            }
            TokenKind::String(s) => {
                let tok = self.advance();
                Ok(Expr::Literal(Literal::String(s), tok.span))
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                let tok = self.advance();
                Ok(Expr::Literal(
                    Literal::Bool(tok.kind == TokenKind::KwTrue),
                    tok.span,
                ))
            }
            TokenKind::DigitId(_) => {
                // Durations were taken above; anything else is a name.
                let tok = self.advance();
                debug_assert!(!is_duration_word(tok.text));
                Ok(Expr::FieldRef(Ident::bare(tok.text, tok.span)))
            }
            TokenKind::LeftParen => {
                let open = self.advance();
                let inner = self.nested(|p| {
                    if p.having_mode {
                        p.parse_or()
                    } else {
                        p.parse_field_expr()
                    }
                })?;
                self.expect_close_paren(&open)?;
                Ok(inner)
            }
            _ if self.at_ident() => {
                let name = self.parse_ident("field name")?;
                if self.check(&TokenKind::LeftParen) {
                    self.parse_func_call(name)
                } else {
                    Ok(Expr::FieldRef(name))
                }
            }
            _ => Err(self.err_expected("expression")),
        }
    }

    /// `name '(' (fieldExpr (',' fieldExpr)*)? ')'` with the name consumed.
    fn parse_func_call(&mut self, name: Ident) -> Result<Expr, ParseError> {
        let open = self.advance();
        let args = self.nested(|p| {
            if p.check(&TokenKind::RightParen) {
                Ok(Vec::new())
            } else {
                p.parse_comma_sep(Self::parse_field_expr)
            }
        })?;
        self.expect_close_paren(&open)?;
        let span = self.span_from(name.span);
        Ok(Expr::FuncCall { name, args, span })
    }

    // -----------------------------------------------------------------------
    // Conditions
    // -----------------------------------------------------------------------

    /// A WHERE condition.
    pub(crate) fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    /// Whether the current token ends a clause, so `WHERE` has no body.
    pub(crate) fn at_clause_end(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::KwGroup
                | TokenKind::KwHaving
                | TokenKind::KwOrder
                | TokenKind::KwLimit
                | TokenKind::Semicolon
                | TokenKind::Eof
        )
    }

    /// `(WHERE conditionExpr?)?`. A bare `WHERE` yields `None`.
    pub(crate) fn parse_where_clause(&mut self) -> Result<Option<Expr>, ParseError> {
        if !self.eat_kw(&TokenKind::KwWhere) || self.at_clause_end() {
            return Ok(None);
        }
        self.parse_condition().map(Some)
    }

    /// A HAVING condition: comparisons over field expressions.
    pub(crate) fn parse_having(&mut self) -> Result<Expr, ParseError> {
        let saved = self.having_mode;
        self.having_mode = true;
        let result = self.parse_or().and_then(|expr| {
            self.require_predicate(&expr)?;
            Ok(expr)
        });
        self.having_mode = saved;
        result
    }

    /// Operands of AND / OR / NOT must be conditions. Only HAVING can
    /// produce anything else.
    fn require_predicate(&self, expr: &Expr) -> Result<(), ParseError> {
        if expr.is_predicate() {
            Ok(())
        } else {
            Err(self.err_expected("comparison operator"))
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.chain(|p| {
            let mut lhs = p.parse_and()?;
            while p.check(&TokenKind::KwOr) {
                p.require_predicate(&lhs)?;
                p.deepen()?;
                p.advance();
                let rhs = p.parse_and()?;
                p.require_predicate(&rhs)?;
                lhs = bool_binary(BoolOp::Or, lhs, rhs);
            }
            Ok(lhs)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.chain(|p| {
            let mut lhs = p.parse_not()?;
            while p.check(&TokenKind::KwAnd) {
                p.require_predicate(&lhs)?;
                p.deepen()?;
                p.advance();
                let rhs = p.parse_not()?;
                p.require_predicate(&rhs)?;
                lhs = bool_binary(BoolOp::And, lhs, rhs);
            }
            Ok(lhs)
        })
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::KwNot) {
            return self.parse_predicate();
        }
        let start = self.advance().span;
        let inner = self.nested(Self::parse_not)?;
        self.require_predicate(&inner)?;
        let span = start.merge(inner.span());
        Ok(Expr::Not {
            inner: Box::new(inner),
            span,
        })
    }

    fn parse_predicate(&mut self) -> Result<Expr, ParseError> {
        if self.having_mode {
            return self.parse_having_predicate();
        }

        if self.check(&TokenKind::LeftParen) {
            let open = self.advance();
            let inner = self.nested(Self::parse_or)?;
            self.expect_close_paren(&open)?;
            return Ok(inner);
        }
        if self.at_time_field() && compare_op(self.peek_nth_kind(1)).is_some() {
            return self.parse_time_range();
        }
        if self.at_now() || (!self.at_ident() && self.at_time_expr()) {
            return self.parse_reversed_time_range();
        }
        if self.at_ident() {
            return self.parse_tag_filter();
        }
        Err(self.err_expected("condition"))
    }

    /// `fieldExpr (cmpOp fieldExpr)?`. The left side may also be a
    /// parenthesized condition when no comparison follows.
    fn parse_having_predicate(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_field_expr_bp(0)?;
        let Some(op) = compare_op(self.peek_kind()) else {
            return Ok(left);
        };
        self.require_arithmetic(&left)?;
        self.advance();
        let right = self.parse_field_expr()?;
        let span = left.span().merge(right.span());
        Ok(Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    /// The unquoted `time` column, in any case.
    fn at_time_field(&self) -> bool {
        let tok = self.tokens.peek();
        matches!(tok.kind, TokenKind::Id(_)) && tok.text.eq_ignore_ascii_case("time")
    }

    /// `time cmpOp timeExpr`.
    fn parse_time_range(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        let field = Ident::bare(tok.text, tok.span);
        let op = compare_op(&self.advance().kind).unwrap_or(CompareOp::Eq);
        let bound = self.parse_time_expr()?;
        let span = field.span.merge(bound.span());
        Ok(Expr::TimeRange {
            field,
            op,
            bound: Box::new(bound),
            span,
        })
    }

    /// `timeExpr cmpOp time`, stored as `time flipped(cmpOp) timeExpr`.
    fn parse_reversed_time_range(&mut self) -> Result<Expr, ParseError> {
        let bound = self.parse_time_expr()?;
        let Some(op) = compare_op(self.peek_kind()) else {
            return Err(self.err_expected_one_of(
                ParseErrorKind::UnexpectedToken,
                &["=", "!=", "<", "<=", ">", ">="],
            ));
        };
        self.advance();
        if !self.at_time_field() {
            return Err(self.err_expected("time"));
        }
        let tok = self.advance();
        let field = Ident::bare(tok.text, tok.span);
        let span = bound.span().merge(field.span);
        Ok(Expr::TimeRange {
            field,
            op: op.flipped(),
            bound: Box::new(bound),
            span,
        })
    }

    /// `tagKey op value`, `tagKey [NOT] IN (values)`. An ordering operator
    /// after a plain key compares a field instead.
    fn parse_tag_filter(&mut self) -> Result<Expr, ParseError> {
        let key = self.parse_ident("tag key")?;

        let op = match self.peek_kind() {
            TokenKind::Eq => TagFilterOp::Eq,
            TokenKind::Ne => TagFilterOp::NotEq,
            TokenKind::RegexMatch => TagFilterOp::RegexMatch,
            TokenKind::RegexNotMatch => TagFilterOp::RegexNotMatch,
            TokenKind::KwLike => TagFilterOp::Like,
            TokenKind::KwIn => TagFilterOp::In,
            TokenKind::KwNot => match self.peek_nth_kind(1) {
                TokenKind::KwLike => TagFilterOp::NotLike,
                TokenKind::KwIn => TagFilterOp::NotIn,
                _ => {
                    self.advance();
                    return Err(self.err_expected_one_of(
                        ParseErrorKind::UnexpectedToken,
                        &["LIKE", "IN"],
                    ));
                }
            },
            TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => {
                return self.parse_field_comparison(key);
            }
            _ => {
                return Err(
                    self.err_expected_one_of(ParseErrorKind::UnexpectedToken, TAG_FILTER_OPS)
                );
            }
        };
        self.advance();
        if matches!(op, TagFilterOp::NotLike | TagFilterOp::NotIn) {
            self.advance();
        }

        let values = if op.is_list() {
            self.parse_paren_list("tag value", Self::parse_tag_value)?.0
        } else {
            vec![self.parse_tag_value()?]
        };
        let span = self.span_from(key.span);
        Ok(Expr::TagFilter {
            key,
            op,
            values,
            span,
        })
    }

    fn parse_field_comparison(&mut self, key: Ident) -> Result<Expr, ParseError> {
        let op = compare_op(&self.advance().kind).unwrap_or(CompareOp::Eq);
        let right = self.parse_field_expr()?;
        let span = key.span.merge(right.span());
        Ok(Expr::Comparison {
            op,
            left: Box::new(Expr::FieldRef(key)),
            right: Box::new(right),
            span,
        })
    }

    /// A tag value: string, name, number or boolean, kept as text.
    fn parse_tag_value(&mut self) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::String(s) => {
                self.advance();
                Ok(s)
            }
            TokenKind::Minus
                if matches!(
                    self.peek_nth_kind(1),
                    TokenKind::Integer(_) | TokenKind::Decimal(_) | TokenKind::Double(_)
                ) =>
            {
                self.advance();
                let tok = self.advance();
                Ok(format!("-{}", tok.text))
            }
            TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::Double(_)
            | TokenKind::DigitId(_)
            | TokenKind::KwTrue
            | TokenKind::KwFalse => Ok(self.advance().text.to_owned()),
            _ if self.at_ident() => Ok(self.parse_ident("tag value")?.value),
            _ => Err(self.err_expected("tag value")),
        }
    }
}

fn bool_binary(op: BoolOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().merge(right.span());
    Expr::BoolBinary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use lql_ast::{DurationUnit, Span};

    fn field(text: &str) -> Expr {
        match Parser::new(text).parse_field_expr() {
            Ok(expr) => expr,
            Err(err) => unreachable!("parse error for `{text}`: {err}"),
        }
    }

    fn cond(text: &str) -> Expr {
        match Parser::new(text).parse_condition() {
            Ok(expr) => expr,
            Err(err) => unreachable!("parse error for `{text}`: {err}"),
        }
    }

    fn cond_err(text: &str) -> ParseError {
        match Parser::new(text).parse_condition() {
            Ok(expr) => unreachable!("expected error for `{text}`, got {expr:?}"),
            Err(err) => err,
        }
    }

    fn having(text: &str) -> Result<Expr, ParseError> {
        Parser::new(text).parse_having()
    }

    // ── Field arithmetic ─────────────────────────────────────────────────

    #[test]
    fn mul_binds_tighter_than_add() {
        let Expr::Binary {
            op: BinaryOp::Add,
            right,
            ..
        } = field("a + b * c")
        else {
            unreachable!("expected Add at the root");
        };
        assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let Expr::Binary {
            op: BinaryOp::Subtract,
            left,
            right,
            ..
        } = field("a - b - c")
        else {
            unreachable!("expected Subtract at the root");
        };
        assert!(matches!(*left, Expr::Binary { .. }));
        assert!(matches!(*right, Expr::FieldRef(ref i) if i.value == "c"));
    }

    #[test]
    fn parens_reset_precedence() {
        let Expr::Binary {
            op: BinaryOp::Multiply,
            left,
            ..
        } = field("(a + b) * c")
        else {
            unreachable!("expected Multiply at the root");
        };
        assert!(matches!(
            *left,
            Expr::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn minus_folds_into_numeric_literal() {
        assert!(matches!(field("-5"), Expr::Literal(Literal::Int(-5), span) if span == Span::new(0, 2)));
        assert!(matches!(
            field("-1.5"),
            Expr::Literal(Literal::Decimal(v), _) if (v + 1.5).abs() < 1e-12
        ));
        assert!(matches!(field("-x"), Expr::Neg { .. }));
        assert!(matches!(field("-10s"), Expr::Duration(ref d) if d.value == -10));
    }

    #[test]
    fn unary_minus_binds_tightest() {
        let Expr::Binary {
            op: BinaryOp::Multiply,
            left,
            ..
        } = field("-a * b")
        else {
            unreachable!("expected Multiply at the root");
        };
        assert!(matches!(*left, Expr::Neg { .. }));
    }

    #[test]
    fn now_is_a_plain_operand_in_arithmetic() {
        let Expr::Binary {
            op: BinaryOp::Subtract,
            left,
            right,
            ..
        } = field("a - now() - 1h")
        else {
            unreachable!("expected Subtract at the root");
        };
        let Expr::Binary {
            op: BinaryOp::Subtract,
            left: a,
            right: now,
            ..
        } = *left
        else {
            unreachable!("expected a - now()");
        };
        assert!(matches!(*a, Expr::FieldRef(ref i) if i.value == "a"));
        assert!(matches!(*now, Expr::Now { offset: None, .. }));
        assert!(matches!(*right, Expr::Duration(ref d) if d.value == 1 && d.unit == DurationUnit::Hour));

        let Expr::Binary {
            op: BinaryOp::Subtract,
            left,
            ..
        } = field("2 * now() - 1h")
        else {
            unreachable!("expected Subtract at the root");
        };
        assert!(matches!(
            *left,
            Expr::Binary { op: BinaryOp::Multiply, ref right, .. }
                if matches!(**right, Expr::Now { offset: None, .. })
        ));

        let Expr::Binary {
            op: BinaryOp::Subtract,
            left,
            ..
        } = field("-now() - 1h")
        else {
            unreachable!("expected Subtract at the root");
        };
        assert!(matches!(
            *left,
            Expr::Neg { ref inner, .. } if matches!(**inner, Expr::Now { offset: None, .. })
        ));
    }

    #[test]
    fn function_calls() {
        let Expr::FuncCall { name, args, span } = field("sum(value)") else {
            unreachable!("expected call");
        };
        assert_eq!(name.value, "sum");
        assert_eq!(args.len(), 1);
        assert_eq!(span, Span::new(0, 10));

        let Expr::FuncCall { args, .. } = field("quantile(latency, 0.99)") else {
            unreachable!("expected call");
        };
        assert_eq!(args.len(), 2);

        let Expr::FuncCall { args, .. } = field("count()") else {
            unreachable!("expected call");
        };
        assert!(args.is_empty());

        assert!(matches!(field("sum(a) / count(a)"), Expr::Binary { op: BinaryOp::Divide, .. }));
    }

    #[test]
    fn identifier_without_paren_is_field() {
        assert!(matches!(field("value"), Expr::FieldRef(ref i) if i.value == "value"));
        assert!(matches!(field("5xx"), Expr::FieldRef(ref i) if i.value == "5xx"));
        assert!(matches!(field("1h"), Expr::Duration(ref d) if d.unit == DurationUnit::Hour));
        assert!(matches!(field("'s'"), Expr::Literal(Literal::String(_), _)));
        assert!(matches!(field("true"), Expr::Literal(Literal::Bool(true), _)));
    }

    #[test]
    fn unclosed_call_reports_open_paren() {
        let err = match Parser::new("sum(value").parse_field_expr() {
            Ok(expr) => unreachable!("expected error, got {expr:?}"),
            Err(err) => err,
        };
        assert_eq!(err.offset(), 3);
        assert!(err.message.starts_with("unbalanced parenthesis"));
    }

    #[test]
    fn nesting_limit() {
        let cfg = ParserConfig {
            max_nesting_depth: 4,
            ..ParserConfig::default()
        };
        let deep = "((((((a))))))";
        let err = match Parser::with_config(deep, &cfg).parse_field_expr() {
            Ok(expr) => unreachable!("expected error, got {expr:?}"),
            Err(err) => err,
        };
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
        assert!(Parser::with_config("((a))", &cfg).parse_field_expr().is_ok());
    }

    #[test]
    fn operator_chains_count_against_nesting_limit() {
        let cfg = ParserConfig {
            max_nesting_depth: 4,
            ..ParserConfig::default()
        };
        assert!(Parser::with_config("a + b - c * d / e", &cfg).parse_field_expr().is_ok());
        let err = match Parser::with_config("a + b + c + d + e + f", &cfg).parse_field_expr() {
            Ok(expr) => unreachable!("expected error, got {expr:?}"),
            Err(err) => err,
        };
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
        assert_eq!(err.offset(), 18);

        let four = "h = '1' AND h = '2' OR h = '3' AND h = '4' OR h = '5'";
        assert!(Parser::with_config(four, &cfg).parse_condition().is_ok());
        let err = match Parser::with_config(
            "h = '1' AND h = '2' AND h = '3' AND h = '4' AND h = '5' AND h = '6'",
            &cfg,
        )
        .parse_condition()
        {
            Ok(expr) => unreachable!("expected error, got {expr:?}"),
            Err(err) => err,
        };
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
        assert_eq!(err.found, "AND");
    }

    // ── WHERE conditions ─────────────────────────────────────────────────

    #[test]
    fn tag_filter_operators() {
        let cases = [
            ("host = 'a'", TagFilterOp::Eq),
            ("host != 'a'", TagFilterOp::NotEq),
            ("host <> 'a'", TagFilterOp::NotEq),
            ("host =~ 'a.*'", TagFilterOp::RegexMatch),
            ("host !~ 'a.*'", TagFilterOp::RegexNotMatch),
            ("host like 'a%'", TagFilterOp::Like),
            ("host NOT LIKE 'a%'", TagFilterOp::NotLike),
            ("host IN ('a', 'b')", TagFilterOp::In),
            ("host not in ('a')", TagFilterOp::NotIn),
        ];
        for (text, expected) in cases {
            let Expr::TagFilter { key, op, values, .. } = cond(text) else {
                unreachable!("expected tag filter for `{text}`");
            };
            assert_eq!(key.value, "host");
            assert_eq!(op, expected, "{text}");
            assert!(!values.is_empty());
        }
    }

    #[test]
    fn tag_values_of_every_shape() {
        let Expr::TagFilter { values, .. } = cond("k IN ('s', bare, 42, -1.5, true, 5xx)") else {
            unreachable!("expected tag filter");
        };
        assert_eq!(values, ["s", "bare", "42", "-1.5", "true", "5xx"]);
    }

    #[test]
    fn empty_in_list() {
        assert_eq!(cond_err("host IN ()").kind, ParseErrorKind::EmptyList);
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let Expr::BoolBinary {
            op: BoolOp::Or,
            right,
            ..
        } = cond("a = '1' OR b = '2' AND c = '3'")
        else {
            unreachable!("expected OR at the root");
        };
        assert!(matches!(*right, Expr::BoolBinary { op: BoolOp::And, .. }));
    }

    #[test]
    fn not_binds_a_single_predicate() {
        let Expr::BoolBinary {
            op: BoolOp::And,
            left,
            ..
        } = cond("NOT a = '1' AND b = '2'")
        else {
            unreachable!("expected AND at the root");
        };
        assert!(matches!(*left, Expr::Not { .. }));
    }

    #[test]
    fn parenthesized_condition() {
        let Expr::BoolBinary {
            op: BoolOp::And,
            left,
            ..
        } = cond("(a = '1' OR b = '2') AND c = '3'")
        else {
            unreachable!("expected AND at the root");
        };
        assert!(matches!(*left, Expr::BoolBinary { op: BoolOp::Or, .. }));
    }

    #[test]
    fn time_ranges() {
        let Expr::TimeRange { field, op, bound, .. } = cond("time > now() - 1h") else {
            unreachable!("expected time range");
        };
        assert_eq!(field.value, "time");
        assert_eq!(op, CompareOp::Gt);
        assert!(matches!(*bound, Expr::Now { offset: Some(_), .. }));

        assert!(matches!(
            cond("TIME <= '2024-01-01 00:00:00'"),
            Expr::TimeRange { op: CompareOp::LtEq, .. }
        ));
    }

    #[test]
    fn reversed_time_range_is_normalized() {
        let Expr::TimeRange { field, op, bound, span } = cond("now() - 1h < time") else {
            unreachable!("expected time range");
        };
        assert_eq!(field.value, "time");
        assert_eq!(op, CompareOp::Gt);
        assert!(matches!(*bound, Expr::Now { .. }));
        assert_eq!(span, Span::new(0, 17));

        assert!(matches!(
            cond("1700000000 >= time"),
            Expr::TimeRange { op: CompareOp::LtEq, .. }
        ));
        assert_eq!(cond_err("now() < host").found, "host");
    }

    #[test]
    fn ordering_on_plain_key_is_comparison() {
        let Expr::Comparison { op, left, .. } = cond("cpu_usage > 0.5") else {
            unreachable!("expected comparison");
        };
        assert_eq!(op, CompareOp::Gt);
        assert!(matches!(*left, Expr::FieldRef(ref i) if i.value == "cpu_usage"));
    }

    #[test]
    fn unbalanced_paren_reports_its_offset() {
        let err = cond_err("host = 'a' AND (time > now() - 1h");
        assert_eq!(err.offset(), 15);
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn missing_operator() {
        let err = cond_err("host 'a'");
        assert_eq!(err.found, "'a'");
        assert_eq!(err.expected.len(), TAG_FILTER_OPS.len());
        assert_eq!(cond_err("host NOT 'a'").found, "'a'");
    }

    #[test]
    fn where_clause_may_be_empty() {
        let mut p = Parser::new("WHERE GROUP");
        assert!(matches!(p.parse_where_clause(), Ok(None)));
        let mut p = Parser::new("WHERE");
        assert!(matches!(p.parse_where_clause(), Ok(None)));
        let mut p = Parser::new("LIMIT");
        assert!(matches!(p.parse_where_clause(), Ok(None)));
    }

    // ── HAVING ───────────────────────────────────────────────────────────

    #[test]
    fn having_comparisons() {
        let Ok(Expr::Comparison { op, left, .. }) = having("sum(value) > 100") else {
            unreachable!("expected comparison");
        };
        assert_eq!(op, CompareOp::Gt);
        assert!(left.has_func_call());

        let Ok(Expr::BoolBinary { op: BoolOp::Or, .. }) =
            having("(sum(a) + 1) * 2 >= 10 OR NOT max(b) < 3")
        else {
            unreachable!("expected OR");
        };

        let Ok(Expr::BoolBinary { op: BoolOp::And, left, .. }) =
            having("(sum(a) > 1 OR sum(b) > 1) AND count(c) != 0")
        else {
            unreachable!("expected AND");
        };
        assert!(matches!(*left, Expr::BoolBinary { op: BoolOp::Or, .. }));
    }

    #[test]
    fn having_requires_comparison() {
        let Err(err) = having("sum(value)") else {
            unreachable!("expected error");
        };
        assert_eq!(err.message, "expected comparison operator, got end of input");

        let Err(err) = having("sum(a) AND sum(b) > 1") else {
            unreachable!("expected error");
        };
        assert_eq!(err.found, "AND");
    }

    #[test]
    fn conditions_are_not_arithmetic_operands() {
        let Err(err) = having("(sum(a) > 1) + 2 > 3") else {
            unreachable!("expected error");
        };
        assert_eq!(err.message, "expected arithmetic expression, got condition");
        assert_eq!(err.span, Span::new(1, 11));
        assert_eq!(err.found, "sum(a) > 1");

        let Err(err) = having("2 + (sum(a) > 1) > 3") else {
            unreachable!("expected error");
        };
        assert_eq!(err.offset(), 5);
        assert!(having("(sum(a) > 1) > 0").is_err());
        assert!(having("-(sum(a) > 1) > 0").is_err());
        assert!(having("max((sum(a) > 1)) > 0").is_err());
        assert!(having("(sum(a) + 1) > 0").is_ok());
    }
}
