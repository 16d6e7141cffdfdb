//! `SHOW` statements: cluster state and metadata lookups.

use lql_ast::{ShowKind, ShowStatement};

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::Parser;
use crate::token::TokenKind;

const SHOW_TARGETS: &[&str] = &[
    "MASTER",
    "BROKERS",
    "REQUESTS",
    "METADATA",
    "METADATAS",
    "ALIVE",
    "REPLICATIONS",
    "STATE",
    "DATABASES",
    "NAMESPACES",
    "METRICS",
    "FIELDS",
    "TAG",
];

impl Parser<'_> {
    pub(crate) fn parse_show(&mut self) -> Result<ShowStatement, ParseError> {
        let start = self.advance().span;
        let kind = match self.peek_kind() {
            TokenKind::KwMaster => {
                self.advance();
                ShowKind::Master
            }
            TokenKind::KwBrokers => {
                self.advance();
                ShowKind::Brokers
            }
            TokenKind::KwAlive => {
                self.advance();
                ShowKind::Alive
            }
            TokenKind::KwDatabases => {
                self.advance();
                ShowKind::Databases
            }
            TokenKind::KwRequests => {
                self.advance();
                ShowKind::Requests {
                    limit: self.parse_optional_limit()?,
                }
            }
            TokenKind::KwMetadata => {
                self.advance();
                self.expect_kw(&TokenKind::KwTypes)?;
                ShowKind::MetadataTypes
            }
            TokenKind::KwMetadatas => {
                self.advance();
                ShowKind::Metadatas {
                    filter: self.parse_where_clause()?,
                }
            }
            TokenKind::KwReplications => {
                self.advance();
                ShowKind::Replications {
                    filter: self.parse_where_clause()?,
                }
            }
            TokenKind::KwState => {
                self.advance();
                ShowKind::State {
                    filter: self.parse_where_clause()?,
                }
            }
            TokenKind::KwNamespaces => {
                self.advance();
                let prefix = self.parse_prefix_filter(&TokenKind::KwNamespace)?;
                ShowKind::Namespaces {
                    prefix,
                    limit: self.parse_optional_limit()?,
                }
            }
            TokenKind::KwMetrics => {
                self.advance();
                let namespace = if self.eat_kw(&TokenKind::KwOn) {
                    Some(self.parse_ident("namespace")?)
                } else {
                    None
                };
                let prefix = self.parse_prefix_filter(&TokenKind::KwMetric)?;
                ShowKind::Metrics {
                    namespace,
                    prefix,
                    limit: self.parse_optional_limit()?,
                }
            }
            TokenKind::KwFields => {
                self.advance();
                self.expect_kw(&TokenKind::KwFrom)?;
                ShowKind::Fields {
                    metric: self.parse_metric_ref()?,
                }
            }
            TokenKind::KwTag => {
                self.advance();
                self.parse_show_tag()?
            }
            _ => {
                return Err(
                    self.err_expected_one_of(ParseErrorKind::UnknownStatement, SHOW_TARGETS)
                );
            }
        };
        Ok(ShowStatement {
            kind,
            span: self.span_from(start),
        })
    }

    /// `TAG KEYS FROM ...` or `TAG VALUES FROM ...` with `TAG` consumed.
    fn parse_show_tag(&mut self) -> Result<ShowKind, ParseError> {
        match self.peek_kind() {
            TokenKind::KwKeys => {
                self.advance();
                self.expect_kw(&TokenKind::KwFrom)?;
                Ok(ShowKind::TagKeys {
                    metric: self.parse_metric_ref()?,
                })
            }
            TokenKind::KwValues => {
                self.advance();
                self.expect_kw(&TokenKind::KwFrom)?;
                let metric = self.parse_metric_ref()?;
                let with_tag_key = if self.eat_kw(&TokenKind::KwWith) {
                    self.expect_kw(&TokenKind::KwKey)?;
                    self.expect_token(&TokenKind::Eq)?;
                    Some(self.parse_ident("tag key")?)
                } else {
                    None
                };
                Ok(ShowKind::TagValues {
                    metric,
                    with_tag_key,
                    condition: self.parse_where_clause()?,
                    limit: self.parse_optional_limit()?,
                })
            }
            _ => Err(self.err_expected_one_of(ParseErrorKind::UnknownStatement, &["KEYS", "VALUES"])),
        }
    }

    /// `(WHERE <field> = 'prefix')?` where `field` is `NAMESPACE` or `METRIC`.
    fn parse_prefix_filter(&mut self, field: &TokenKind) -> Result<Option<String>, ParseError> {
        if !self.eat_kw(&TokenKind::KwWhere) {
            return Ok(None);
        }
        self.expect_kw(field)?;
        self.expect_token(&TokenKind::Eq)?;
        if let TokenKind::String(s) = self.peek_kind().clone() {
            self.advance();
            return Ok(Some(s));
        }
        if self.at_ident() {
            return Ok(Some(self.parse_ident("prefix")?.value));
        }
        Err(self.err_expected("string"))
    }

    fn parse_optional_limit(&mut self) -> Result<Option<u64>, ParseError> {
        if self.eat_kw(&TokenKind::KwLimit) {
            self.parse_limit_value().map(Some)
        } else {
            Ok(None)
        }
    }
}
