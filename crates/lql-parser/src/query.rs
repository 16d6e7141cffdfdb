//! `[EXPLAIN] SELECT` statements.

use lql_ast::{
    FillOption, GroupBy, MetricRef, QueryStatement, SelectField, SortDirection, SortField,
};

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::Parser;
use crate::token::TokenKind;

impl Parser<'_> {
    pub(crate) fn parse_query(&mut self) -> Result<QueryStatement, ParseError> {
        let start = self.current_span();
        let explain = self.eat_kw(&TokenKind::KwExplain);
        self.expect_kw(&TokenKind::KwSelect)?;

        let select = self.parse_comma_sep(Self::parse_select_field)?;
        self.expect_kw(&TokenKind::KwFrom)?;
        let from = self.parse_metric_ref()?;
        let condition = self.parse_where_clause()?;

        let group_by = if self.eat_kw(&TokenKind::KwGroup) {
            self.expect_kw(&TokenKind::KwBy)?;
            Some(self.parse_group_by()?)
        } else {
            None
        };

        let having = if self.eat_kw(&TokenKind::KwHaving) {
            Some(self.parse_having()?)
        } else {
            None
        };

        let order_by = if self.eat_kw(&TokenKind::KwOrder) {
            self.expect_kw(&TokenKind::KwBy)?;
            self.parse_comma_sep(Self::parse_sort_field)?
        } else {
            Vec::new()
        };

        let limit = if self.eat_kw(&TokenKind::KwLimit) {
            Some(self.parse_limit_value()?)
        } else {
            None
        };

        Ok(QueryStatement {
            explain,
            select,
            from,
            condition,
            group_by,
            having,
            order_by,
            limit,
            span: self.span_from(start),
        })
    }

    /// `fieldExpr (AS alias)?`.
    fn parse_select_field(&mut self) -> Result<SelectField, ParseError> {
        let expr = self.parse_field_expr()?;
        let alias = if self.eat_kw(&TokenKind::KwAs) {
            Some(self.parse_ident("alias")?)
        } else {
            None
        };
        let span = self.span_from(expr.span());
        Ok(SelectField { expr, alias, span })
    }

    /// `metricName (ON namespace)?`.
    pub(crate) fn parse_metric_ref(&mut self) -> Result<MetricRef, ParseError> {
        let name = self.parse_metric_name()?;
        let namespace = if self.eat_kw(&TokenKind::KwOn) {
            Some(self.parse_ident("namespace")?)
        } else {
            None
        };
        let span = self.span_from(name.span);
        Ok(MetricRef {
            name,
            namespace,
            span,
        })
    }

    /// `groupKey (',' groupKey)* (FILL '(' fillOption ')')?` with `GROUP BY`
    /// consumed.
    fn parse_group_by(&mut self) -> Result<GroupBy, ParseError> {
        let start = self.current_span();
        let mut interval = None;
        let mut tag_keys = Vec::new();

        loop {
            let tok = self.tokens.peek();
            let is_bucket = matches!(tok.kind, TokenKind::Id(_))
                && tok.text.eq_ignore_ascii_case("time")
                && self.peek_nth_kind(1) == &TokenKind::LeftParen;
            if is_bucket {
                if interval.is_some() {
                    return Err(self.error_here(
                        ParseErrorKind::UnexpectedToken,
                        "GROUP BY has more than one time() bucket",
                    ));
                }
                interval = Some(self.parse_time_bucket()?);
            } else {
                tag_keys.push(self.parse_ident("group by key")?);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let fill = if self.eat_kw(&TokenKind::KwFill) {
            if !self.check(&TokenKind::LeftParen) {
                return Err(self.err_expected("("));
            }
            let open = self.advance();
            let option = self.parse_fill_option()?;
            self.expect_close_paren(&open)?;
            Some(option)
        } else {
            None
        };

        Ok(GroupBy {
            interval,
            tag_keys,
            fill,
            span: self.span_from(start),
        })
    }

    /// `NULL | PREVIOUS | '-'? number`.
    fn parse_fill_option(&mut self) -> Result<FillOption, ParseError> {
        match self.peek_kind() {
            TokenKind::KwNull => {
                self.advance();
                Ok(FillOption::Null)
            }
            TokenKind::KwPrevious => {
                self.advance();
                Ok(FillOption::Previous)
            }
            TokenKind::Minus
            | TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::Double(_) => Ok(FillOption::Value(self.parse_signed_number()?)),
            _ => Err(self.err_expected_one_of(
                ParseErrorKind::UnexpectedToken,
                &["NULL", "PREVIOUS", "number"],
            )),
        }
    }

    /// `fieldExpr (ASC | DESC)?`.
    fn parse_sort_field(&mut self) -> Result<SortField, ParseError> {
        let expr = self.parse_field_expr()?;
        let direction = if self.eat_kw(&TokenKind::KwDesc) {
            SortDirection::Desc
        } else {
            self.eat_kw(&TokenKind::KwAsc);
            SortDirection::Asc
        };
        let span = self.span_from(expr.span());
        Ok(SortField {
            expr,
            direction,
            span,
        })
    }
}
