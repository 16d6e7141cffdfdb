//! Hand-written recursive descent parser for LQL.
//!
//! Statement dispatch, token navigation and the DDL / utility statements
//! live here. The SELECT grammar is in `query.rs`, expressions in
//! `expr.rs`, time expressions in `time.rs` and `SHOW` in `show.rs`.

use lql_ast::{
    CompactDatabaseStatement, CreateBrokerStatement, CreateDatabaseStatement,
    DropDatabaseStatement, FlushDatabaseStatement, Ident, Literal, Property, PropertyValue,
    QuoteStyle, RollupRule, Span, Statement, UseStatement,
};

use memchr::{memchr_iter, memrchr};

use crate::config::ParserConfig;
use crate::error::{ParseError, ParseErrorKind};
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

/// How a token is named in "got X" messages.
pub(crate) fn found_text(tok: &Token<'_>) -> String {
    match &tok.kind {
        TokenKind::Eof => "end of input".to_owned(),
        k if k.is_keyword() => k.to_string(),
        _ => tok.text.to_owned(),
    }
}

/// Convert an unsigned literal and its sign into an `i64`.
pub(crate) fn signed_int(value: u64, negative: bool) -> Option<i64> {
    if negative {
        0i64.checked_sub_unsigned(value)
    } else {
        i64::try_from(value).ok()
    }
}

pub struct Parser<'a> {
    source: &'a str,
    pub(crate) tokens: TokenStream<'a>,
    config: ParserConfig,
    /// Current paren / call / NOT / unary-minus nesting plus the length of
    /// the operator chains being folded.
    depth: u32,
    /// Span of the most recently consumed token.
    prev_span: Span,
    /// Parenthesized groups may hold boolean conditions (HAVING) rather
    /// than plain arithmetic.
    pub(crate) having_mode: bool,
}

impl<'a> Parser<'a> {
    /// A parser with the default [`ParserConfig`].
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source, &ParserConfig::default())
    }

    #[must_use]
    pub fn with_config(source: &'a str, config: &ParserConfig) -> Self {
        Self {
            source,
            tokens: TokenStream::new(source),
            config: config.clone(),
            depth: 0,
            prev_span: Span::ZERO,
            having_mode: false,
        }
    }

    /// Parse exactly one statement, optionally followed by `;`.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let span = tracing::debug_span!(
            target: "lql.parse",
            "parse_statement",
            len = self.source.len(),
            kind = tracing::field::Empty,
        );
        let _guard = span.enter();

        let result = self.parse_statement_inner();
        match &result {
            Ok(stmt) => {
                span.record("kind", stmt.kind_name());
            }
            Err(err) => {
                tracing::debug!(
                    target: "lql.parse",
                    kind = ?err.kind,
                    offset = err.offset(),
                    error = %err,
                    "parse failed"
                );
            }
        }
        result
    }

    fn parse_statement_inner(&mut self) -> Result<Statement, ParseError> {
        if self.source.len() > self.config.max_query_len {
            let start = u32::try_from(self.config.max_query_len).unwrap_or(u32::MAX);
            let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
            return Err(ParseError::new(
                ParseErrorKind::InputTooLong,
                Span::new(start, end),
                1,
                1,
                "",
                format!(
                    "query is {} bytes, limit is {}",
                    self.source.len(),
                    self.config.max_query_len
                ),
            ));
        }

        let context = match self.peek_kind() {
            TokenKind::KwSelect | TokenKind::KwExplain => "SELECT",
            TokenKind::KwShow => "SHOW",
            TokenKind::KwCreate => "CREATE",
            TokenKind::KwDrop => "DROP",
            TokenKind::KwFlush => "FLUSH",
            TokenKind::KwCompact => "COMPACT",
            TokenKind::KwUse => "USE",
            TokenKind::Error => return Err(self.error_here(ParseErrorKind::InvalidCharacter, "")),
            _ => {
                let got = found_text(self.tokens.peek());
                return Err(self
                    .error_here(
                        ParseErrorKind::UnknownStatement,
                        format!("expected a statement, got {got}"),
                    )
                    .with_expected(
                        ["SELECT", "EXPLAIN", "SHOW", "CREATE", "DROP", "FLUSH", "COMPACT", "USE"]
                            .iter()
                            .map(|s| (*s).to_owned())
                            .collect(),
                    ));
            }
        };

        self.parse_statement_body()
            .and_then(|stmt| {
                self.expect_end()?;
                Ok(stmt)
            })
            .map_err(|err| err.with_context(context))
    }

    fn parse_statement_body(&mut self) -> Result<Statement, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::KwSelect | TokenKind::KwExplain => Ok(Statement::Query(self.parse_query()?)),
            TokenKind::KwShow => Ok(Statement::Show(self.parse_show()?)),
            TokenKind::KwCreate => self.parse_create(),
            TokenKind::KwDrop => {
                let start = self.advance().span;
                self.expect_kw(&TokenKind::KwDatabase)?;
                let name = self.parse_ident("database name")?;
                Ok(Statement::DropDatabase(DropDatabaseStatement {
                    name,
                    span: self.span_from(start),
                }))
            }
            TokenKind::KwFlush => {
                let start = self.advance().span;
                self.expect_kw(&TokenKind::KwDatabase)?;
                let name = self.parse_ident("database name")?;
                Ok(Statement::FlushDatabase(FlushDatabaseStatement {
                    name,
                    span: self.span_from(start),
                }))
            }
            TokenKind::KwCompact => {
                let start = self.advance().span;
                self.expect_kw(&TokenKind::KwDatabase)?;
                let name = self.parse_ident("database name")?;
                Ok(Statement::CompactDatabase(CompactDatabaseStatement {
                    name,
                    span: self.span_from(start),
                }))
            }
            TokenKind::KwUse => {
                let start = self.advance().span;
                let database = self.parse_ident("database name")?;
                Ok(Statement::Use(UseStatement {
                    database,
                    span: self.span_from(start),
                }))
            }
            _ => Err(self.err_expected("statement")),
        }
    }

    /// Accept an optional `;` and require end of input.
    fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.config.allow_trailing_semicolon {
            self.eat(&TokenKind::Semicolon);
        }
        if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.err_expected("end of input"))
        }
    }

    // -----------------------------------------------------------------------
    // Token navigation
    // -----------------------------------------------------------------------

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.tokens.peek().kind
    }

    pub(crate) fn peek_nth_kind(&self, n: usize) -> &TokenKind {
        &self.tokens.peek_nth(n).kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens.peek().span
    }

    pub(crate) fn advance(&mut self) -> Token<'a> {
        let tok = self.tokens.advance();
        if !matches!(tok.kind, TokenKind::Eof | TokenKind::Error) {
            self.prev_span = tok.span;
        }
        tok
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_kw(&mut self, kw: &TokenKind) -> bool {
        self.eat(kw)
    }

    pub(crate) fn expect_kw(&mut self, kw: &TokenKind) -> Result<Span, ParseError> {
        self.expect_token(kw)
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.err_expected(&kind.describe()))
        }
    }

    /// Consume the `)` closing `open`. A missing `)` is reported at the
    /// unmatched `(`.
    pub(crate) fn expect_close_paren(&mut self, open: &Token<'a>) -> Result<Span, ParseError> {
        if self.check(&TokenKind::RightParen) {
            return Ok(self.advance().span);
        }
        if self.check(&TokenKind::Error) {
            return Err(self.error_here(ParseErrorKind::InvalidCharacter, ""));
        }
        let got = found_text(self.tokens.peek());
        Err(ParseError::new(
            ParseErrorKind::UnexpectedToken,
            open.span,
            open.line,
            open.col,
            got.clone(),
            format!("unbalanced parenthesis: expected ), got {got}"),
        )
        .with_expected(vec![")".to_owned()]))
    }

    /// Span from `start` through the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span)
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.chain(|p| {
            p.deepen()?;
            f(p)
        })
    }

    /// Run `f`, restoring the nesting depth afterwards. Loops that fold
    /// operators into a left-deep tree call [`Self::deepen`] once per
    /// operator inside `f`.
    pub(crate) fn chain<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let base = self.depth;
        let result = f(self);
        self.depth = base;
        result
    }

    /// Take one level of the nesting budget.
    pub(crate) fn deepen(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.config.max_nesting_depth {
            return Err(self.error_here(
                ParseErrorKind::NestingTooDeep,
                format!(
                    "nesting deeper than {} levels",
                    self.config.max_nesting_depth
                ),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    /// An error at the current token. If the lexer failed there, the lex
    /// error wins.
    pub(crate) fn error_here(
        &self,
        kind: ParseErrorKind,
        message: impl Into<String>,
    ) -> ParseError {
        let tok = self.tokens.peek();
        if tok.kind == TokenKind::Error {
            if let Some(lex) = self.tokens.lex_error() {
                return ParseError::from(lex.clone());
            }
        }
        ParseError::new(kind, tok.span, tok.line, tok.col, found_text(tok), message)
    }

    pub(crate) fn err_expected(&self, what: &str) -> ParseError {
        let got = found_text(self.tokens.peek());
        self.error_here(
            ParseErrorKind::UnexpectedToken,
            format!("expected {what}, got {got}"),
        )
        .with_expected(vec![what.to_owned()])
    }

    pub(crate) fn err_expected_one_of(&self, kind: ParseErrorKind, options: &[&str]) -> ParseError {
        let got = found_text(self.tokens.peek());
        self.error_here(
            kind,
            format!("expected one of {}, got {got}", options.join(", ")),
        )
        .with_expected(options.iter().map(|s| (*s).to_owned()).collect())
    }

    /// An error covering `span` in already consumed input.
    pub(crate) fn error_at(
        &self,
        kind: ParseErrorKind,
        span: Span,
        message: impl Into<String>,
    ) -> ParseError {
        let len = self.source.len();
        let start = usize::try_from(span.start).map_or(len, |n| n.min(len));
        let end = usize::try_from(span.end).map_or(len, |n| n.min(len));
        let prefix = &self.source.as_bytes()[..start];
        let line = memchr_iter(b'\n', prefix).count() + 1;
        let line_start = memrchr(b'\n', prefix).map_or(0, |n| n + 1);
        let col = self
            .source
            .get(line_start..start)
            .map_or(0, |s| s.chars().count())
            + 1;
        ParseError::new(
            kind,
            span,
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(col).unwrap_or(u32::MAX),
            self.source.get(start..end).unwrap_or_default(),
            message,
        )
    }

    // -----------------------------------------------------------------------
    // Identifiers, names and literals
    // -----------------------------------------------------------------------

    /// Whether the current token can be read as an identifier.
    pub(crate) fn at_ident(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Id(_) | TokenKind::DoubleQuotedId(_) | TokenKind::BacktickId(_) => true,
            k => k.is_nonreserved_keyword(),
        }
    }

    /// Parse an identifier. Non-reserved keywords keep their source
    /// spelling.
    pub(crate) fn parse_ident(&mut self, what: &str) -> Result<Ident, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Id(s) => {
                let tok = self.advance();
                Ok(Ident::bare(s, tok.span))
            }
            TokenKind::DoubleQuotedId(s) => {
                let tok = self.advance();
                Ok(Ident::quoted(s, QuoteStyle::Double, tok.span))
            }
            TokenKind::BacktickId(s) => {
                let tok = self.advance();
                Ok(Ident::quoted(s, QuoteStyle::Backtick, tok.span))
            }
            k if k.is_nonreserved_keyword() => {
                let tok = self.advance();
                Ok(Ident::bare(tok.text, tok.span))
            }
            _ => Err(self.err_expected(what)),
        }
    }

    /// Parse a metric name. Dotted paths and digit-leading segments are
    /// joined into one identifier: `lindb.runtime.mem`, `1min.cpu`.
    pub(crate) fn parse_metric_name(&mut self) -> Result<Ident, ParseError> {
        let first = match self.peek_kind() {
            TokenKind::DigitId(_) => {
                let tok = self.advance();
                Ident::bare(tok.text, tok.span)
            }
            _ => self.parse_ident("metric name")?,
        };
        if first.quote != QuoteStyle::None {
            return Ok(first);
        }

        let mut value = first.value;
        let mut span = first.span;
        while self.check(&TokenKind::Dot) {
            self.advance();
            let seg = match self.peek_kind() {
                TokenKind::Id(_) | TokenKind::DigitId(_) | TokenKind::Integer(_) => self.advance(),
                k if k.is_keyword() => self.advance(),
                _ => return Err(self.err_expected("metric name segment")),
            };
            value.push('.');
            value.push_str(seg.text);
            span = span.merge(seg.span);
        }
        Ok(Ident::bare(value, span))
    }

    /// `'-'? (INTEGER | DECIMAL | DOUBLE)`.
    pub(crate) fn parse_signed_number(&mut self) -> Result<Literal, ParseError> {
        let negative = self.check(&TokenKind::Minus);
        if negative {
            self.advance();
        }
        match self.peek_kind().clone() {
            TokenKind::Integer(v) => {
                let Some(n) = signed_int(v, negative) else {
                    return Err(self.error_here(
                        ParseErrorKind::InvalidNumber,
                        "integer literal out of range",
                    ));
                };
                self.advance();
                Ok(Literal::Int(n))
            }
            TokenKind::Decimal(v) => {
                self.advance();
                Ok(Literal::Decimal(if negative { -v } else { v }))
            }
            TokenKind::Double(v) => {
                self.advance();
                Ok(Literal::Double(if negative { -v } else { v }))
            }
            _ => Err(self.err_expected("number")),
        }
    }

    /// `LIMIT n` argument.
    pub(crate) fn parse_limit_value(&mut self) -> Result<u64, ParseError> {
        if let TokenKind::Integer(n) = *self.peek_kind() {
            self.advance();
            Ok(n)
        } else {
            Err(self.err_expected("integer"))
        }
    }

    pub(crate) fn parse_comma_sep<T>(
        &mut self,
        f: fn(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut v = vec![f(self)?];
        while self.eat(&TokenKind::Comma) {
            v.push(f(self)?);
        }
        Ok(v)
    }

    /// `'(' item (',' item)* ')'`; `()` is an `EmptyList` error.
    pub(crate) fn parse_paren_list<T>(
        &mut self,
        what: &str,
        f: fn(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(Vec<T>, Span), ParseError> {
        if !self.check(&TokenKind::LeftParen) {
            return Err(self.err_expected("("));
        }
        let open = self.advance();
        if self.check(&TokenKind::RightParen) {
            return Err(
                self.error_here(ParseErrorKind::EmptyList, format!("empty {what} list"))
            );
        }
        let items = self.parse_comma_sep(f)?;
        let close = self.expect_close_paren(&open)?;
        Ok((items, open.span.merge(close)))
    }

    // -----------------------------------------------------------------------
    // CREATE DATABASE / CREATE BROKER
    // -----------------------------------------------------------------------

    fn parse_create(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        match self.peek_kind() {
            TokenKind::KwDatabase => {
                self.advance();
                let name = self.parse_ident("database name")?;
                let properties = if self.eat_kw(&TokenKind::KwWith) {
                    self.parse_paren_list("property", Self::parse_property)?.0
                } else {
                    Vec::new()
                };
                let rollup = if self.eat_kw(&TokenKind::KwRollup) {
                    self.parse_paren_list("rollup", Self::parse_rollup_rule)?.0
                } else {
                    Vec::new()
                };
                Ok(Statement::CreateDatabase(CreateDatabaseStatement {
                    name,
                    properties,
                    rollup,
                    span: self.span_from(start),
                }))
            }
            TokenKind::KwBroker => {
                self.advance();
                let name = self.parse_ident("broker name")?;
                let properties = if self.eat_kw(&TokenKind::KwWith) {
                    self.parse_paren_list("property", Self::parse_property)?.0
                } else {
                    Vec::new()
                };
                Ok(Statement::CreateBroker(CreateBrokerStatement {
                    name,
                    properties,
                    span: self.span_from(start),
                }))
            }
            _ => Err(self.err_expected_one_of(ParseErrorKind::UnknownStatement, &["DATABASE", "BROKER"])),
        }
    }

    fn parse_rollup_rule(&mut self) -> Result<RollupRule, ParseError> {
        let (properties, span) = self.parse_paren_list("property", Self::parse_property)?;
        Ok(RollupRule { properties, span })
    }

    /// `key ('=' | ':') value`.
    fn parse_property(&mut self) -> Result<Property, ParseError> {
        let key = self.parse_ident("property name")?;
        if !self.eat(&TokenKind::Eq) && !self.eat(&TokenKind::Colon) {
            return Err(self.err_expected_one_of(ParseErrorKind::UnexpectedToken, &["=", ":"]));
        }
        let value = self.parse_property_value()?;
        let span = key.span.merge(value.span());
        Ok(Property { key, value, span })
    }

    fn parse_property_value(&mut self) -> Result<PropertyValue, ParseError> {
        if self.at_duration() {
            return Ok(PropertyValue::Duration(self.parse_signed_duration()?));
        }
        match self.peek_kind().clone() {
            TokenKind::String(s) => {
                let tok = self.advance();
                Ok(PropertyValue::Literal(Literal::String(s), tok.span))
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                let tok = self.advance();
                Ok(PropertyValue::Literal(
                    Literal::Bool(tok.kind == TokenKind::KwTrue),
                    tok.span,
                ))
            }
            TokenKind::Minus
            | TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::Double(_) => {
                let start = self.current_span();
                let lit = self.parse_signed_number()?;
                Ok(PropertyValue::Literal(lit, self.span_from(start)))
            }
            TokenKind::DigitId(_) => {
                let tok = self.advance();
                Ok(PropertyValue::Ident(Ident::bare(tok.text, tok.span)))
            }
            _ if self.at_ident() => Ok(PropertyValue::Ident(self.parse_ident("property value")?)),
            _ => Err(self.err_expected("property value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lql_ast::DurationUnit;

    fn parse_one(text: &str) -> Statement {
        match Parser::new(text).parse_statement() {
            Ok(stmt) => stmt,
            Err(err) => unreachable!("parse error for `{text}`: {err}"),
        }
    }

    fn parse_err(text: &str) -> ParseError {
        match Parser::new(text).parse_statement() {
            Ok(stmt) => unreachable!("expected error for `{text}`, got {stmt:?}"),
            Err(err) => err,
        }
    }

    #[test]
    fn use_database() {
        let Statement::Use(u) = parse_one("USE db1") else {
            unreachable!("expected USE");
        };
        assert_eq!(u.database.value, "db1");
        assert_eq!(u.span, Span::new(0, 7));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert!(matches!(parse_one("use db1"), Statement::Use(_)));
        assert!(matches!(parse_one("Drop Database db1"), Statement::DropDatabase(_)));
    }

    #[test]
    fn drop_flush_compact() {
        let Statement::DropDatabase(d) = parse_one("DROP DATABASE db1") else {
            unreachable!("expected DROP DATABASE");
        };
        assert_eq!(d.name.value, "db1");
        assert!(matches!(parse_one("FLUSH DATABASE db1"), Statement::FlushDatabase(_)));
        let Statement::CompactDatabase(c) = parse_one("compact database `my db`") else {
            unreachable!("expected COMPACT DATABASE");
        };
        assert_eq!(c.name.value, "my db");
        assert_eq!(c.name.quote, QuoteStyle::Backtick);
    }

    #[test]
    fn create_database_with_properties() {
        let Statement::CreateDatabase(c) = parse_one("CREATE DATABASE db1 WITH (numOfShard=3)")
        else {
            unreachable!("expected CREATE DATABASE");
        };
        assert_eq!(c.name.value, "db1");
        assert_eq!(c.properties.len(), 1);
        assert_eq!(c.properties[0].key.value, "numOfShard");
        assert!(matches!(
            c.properties[0].value,
            PropertyValue::Literal(Literal::Int(3), _)
        ));
        assert!(c.rollup.is_empty());
    }

    #[test]
    fn create_database_with_rollup() {
        let Statement::CreateDatabase(c) = parse_one(
            "CREATE DATABASE db1 WITH (interval: 10s, engine = tsdb, ratio = 0.5) \
             ROLLUP ((interval = 5m, retention = 3M), (interval = 1h, retention = 1y))",
        ) else {
            unreachable!("expected CREATE DATABASE");
        };
        let PropertyValue::Duration(ref d) = c.properties[0].value else {
            unreachable!("expected duration");
        };
        assert_eq!((d.value, d.unit), (10, DurationUnit::Second));
        assert!(matches!(c.properties[1].value, PropertyValue::Ident(ref i) if i.value == "tsdb"));
        assert!(matches!(
            c.properties[2].value,
            PropertyValue::Literal(Literal::Decimal(v), _) if (v - 0.5).abs() < 1e-12
        ));
        assert_eq!(c.rollup.len(), 2);
        let PropertyValue::Duration(ref r) = c.rollup[0].properties[1].value else {
            unreachable!("expected duration");
        };
        assert_eq!((r.value, r.unit), (3, DurationUnit::Month));
    }

    #[test]
    fn create_broker() {
        let Statement::CreateBroker(b) = parse_one("CREATE BROKER b1 WITH (url = 'http://b1:9000')")
        else {
            unreachable!("expected CREATE BROKER");
        };
        assert_eq!(b.name.value, "b1");
        assert!(matches!(
            b.properties[0].value,
            PropertyValue::Literal(Literal::String(ref s), _) if s == "http://b1:9000"
        ));
    }

    #[test]
    fn empty_property_list_is_error() {
        let err = parse_err("CREATE DATABASE db1 WITH ()");
        assert_eq!(err.kind, ParseErrorKind::EmptyList);
        let err = parse_err("CREATE DATABASE db1 ROLLUP (())");
        assert_eq!(err.kind, ParseErrorKind::EmptyList);
    }

    #[test]
    fn unknown_statement() {
        let err = parse_err("INSERT INTO cpu");
        assert_eq!(err.kind, ParseErrorKind::UnknownStatement);
        assert_eq!(err.found, "INSERT");
        assert_eq!(err.offset(), 0);
        let err = parse_err("");
        assert_eq!(err.kind, ParseErrorKind::UnknownStatement);
    }

    #[test]
    fn trailing_semicolon() {
        assert!(matches!(parse_one("USE db1;"), Statement::Use(_)));
        let err = parse_err("USE db1; USE db2");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert!(err.message.starts_with("expected end of input, got USE"));

        let cfg = ParserConfig {
            allow_trailing_semicolon: false,
            ..ParserConfig::default()
        };
        let err = match Parser::with_config("USE db1;", &cfg).parse_statement() {
            Ok(stmt) => unreachable!("expected error, got {stmt:?}"),
            Err(err) => err,
        };
        assert_eq!(err.found, ";");
    }

    #[test]
    fn errors_carry_statement_context() {
        let err = parse_err("DROP db1");
        assert_eq!(err.to_string(), "1:6 (offset 5): expected DATABASE, got db1 (in DROP statement)");
        assert_eq!(err.expected, vec!["DATABASE".to_owned()]);
    }

    #[test]
    fn input_too_long() {
        let cfg = ParserConfig {
            max_query_len: 8,
            ..ParserConfig::default()
        };
        let err = match Parser::with_config("USE a_long_database", &cfg).parse_statement() {
            Ok(stmt) => unreachable!("expected error, got {stmt:?}"),
            Err(err) => err,
        };
        assert_eq!(err.kind, ParseErrorKind::InputTooLong);
    }

    #[test]
    fn lex_error_surfaces_with_context() {
        let err = parse_err("USE 'db1");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedLiteral);
        assert!(err.lex_error().is_some());
        assert!(err.to_string().ends_with("(in USE statement)"));
    }

    #[test]
    fn nonreserved_keywords_as_names() {
        let Statement::Use(u) = parse_one("USE Metrics") else {
            unreachable!("expected USE");
        };
        assert_eq!(u.database.value, "Metrics");
    }

    #[test]
    fn signed_int_bounds() {
        assert_eq!(signed_int(5, true), Some(-5));
        assert_eq!(signed_int(1 << 63, true), Some(i64::MIN));
        assert_eq!(signed_int(1 << 63, false), None);
    }
}
