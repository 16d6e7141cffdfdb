//! LQL token types.
//!
//! Every token carries a discriminant, the source slice it was lexed from
//! and a byte-offset span. Keywords are their own variants so the parser
//! can match them directly.

use std::fmt;

use lql_ast::Span;

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// The token discriminant.
    pub kind: TokenKind,
    /// Exact source text of the token (quotes included).
    pub text: &'a str,
    /// Byte-offset span into the original source.
    pub span: Span,
    /// Line number (1-based) at the start of the token.
    pub line: u32,
    /// Column number (1-based, in characters) at the start of the token.
    pub col: u32,
}

/// Token discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// `42`
    Integer(u64),
    /// `3.14`, `.5`, `1.`
    Decimal(f64),
    /// `1e10`, `2.5E-3`
    Double(f64),
    /// `'text'` with `''` unescaped.
    String(String),

    // === Identifiers ===
    /// Bare identifier.
    Id(String),
    /// `"name"` with `""` unescaped.
    DoubleQuotedId(String),
    /// `` `name` `` with doubled backticks unescaped.
    BacktickId(String),
    /// Word starting with digits: `1h`, `30m`, `5xx_errors`.
    DigitId(String),

    // === Operators ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    /// `!=` or `<>`
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `=~`
    RegexMatch,
    /// `!~`
    RegexNotMatch,

    // === Punctuation ===
    Dot,
    Comma,
    Semicolon,
    Colon,
    LeftParen,
    RightParen,

    // === Keywords ===
    KwAlive,
    KwAll,
    KwAnd,
    KwAs,
    KwAsc,
    KwBroker,
    KwBrokers,
    KwBy,
    KwCompact,
    KwCreate,
    KwDatabase,
    KwDatabases,
    KwDesc,
    KwDrop,
    KwExplain,
    KwFalse,
    KwFields,
    KwFill,
    KwFlush,
    KwFrom,
    KwGroup,
    KwHaving,
    KwIn,
    KwKey,
    KwKeys,
    KwLike,
    KwLimit,
    KwMaster,
    KwMetadata,
    KwMetadatas,
    KwMetric,
    KwMetrics,
    KwNamespace,
    KwNamespaces,
    KwNot,
    KwNull,
    KwOn,
    KwOr,
    KwOrder,
    KwPrevious,
    KwReplications,
    KwRequests,
    KwRollup,
    KwSelect,
    KwShow,
    KwState,
    KwTag,
    KwTrue,
    KwTypes,
    KwUse,
    KwValues,
    KwWhere,
    KwWith,
    KwWithin,

    // === Special ===
    /// Placeholder left in the stream after a lex failure; the parser
    /// reports the stored `LexError` when it reaches this token.
    Error,
    Eof,
}

impl TokenKind {
    /// Look up a keyword from an identifier string (case-insensitive).
    #[must_use]
    pub fn lookup_keyword(s: &str) -> Option<Self> {
        // Longest keyword is REPLICATIONS (12 bytes).
        if s.len() > 12 {
            return None;
        }
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "ALIVE" => Some(Self::KwAlive),
            "ALL" => Some(Self::KwAll),
            "AND" => Some(Self::KwAnd),
            "AS" => Some(Self::KwAs),
            "ASC" => Some(Self::KwAsc),
            "BROKER" => Some(Self::KwBroker),
            "BROKERS" => Some(Self::KwBrokers),
            "BY" => Some(Self::KwBy),
            "COMPACT" => Some(Self::KwCompact),
            "CREATE" => Some(Self::KwCreate),
            "DATABASE" => Some(Self::KwDatabase),
            "DATABASES" => Some(Self::KwDatabases),
            "DESC" => Some(Self::KwDesc),
            "DROP" => Some(Self::KwDrop),
            "EXPLAIN" => Some(Self::KwExplain),
            "FALSE" => Some(Self::KwFalse),
            "FIELDS" => Some(Self::KwFields),
            "FILL" => Some(Self::KwFill),
            "FLUSH" => Some(Self::KwFlush),
            "FROM" => Some(Self::KwFrom),
            "GROUP" => Some(Self::KwGroup),
            "HAVING" => Some(Self::KwHaving),
            "IN" => Some(Self::KwIn),
            "KEY" => Some(Self::KwKey),
            "KEYS" => Some(Self::KwKeys),
            "LIKE" => Some(Self::KwLike),
            "LIMIT" => Some(Self::KwLimit),
            "MASTER" => Some(Self::KwMaster),
            "METADATA" => Some(Self::KwMetadata),
            "METADATAS" => Some(Self::KwMetadatas),
            "METRIC" => Some(Self::KwMetric),
            "METRICS" => Some(Self::KwMetrics),
            "NAMESPACE" => Some(Self::KwNamespace),
            "NAMESPACES" => Some(Self::KwNamespaces),
            "NOT" => Some(Self::KwNot),
            "NULL" => Some(Self::KwNull),
            "ON" => Some(Self::KwOn),
            "OR" => Some(Self::KwOr),
            "ORDER" => Some(Self::KwOrder),
            "PREVIOUS" => Some(Self::KwPrevious),
            "REPLICATIONS" => Some(Self::KwReplications),
            "REQUESTS" => Some(Self::KwRequests),
            "ROLLUP" => Some(Self::KwRollup),
            "SELECT" => Some(Self::KwSelect),
            "SHOW" => Some(Self::KwShow),
            "STATE" => Some(Self::KwState),
            "TAG" => Some(Self::KwTag),
            "TRUE" => Some(Self::KwTrue),
            "TYPES" => Some(Self::KwTypes),
            "USE" => Some(Self::KwUse),
            "VALUES" => Some(Self::KwValues),
            "WHERE" => Some(Self::KwWhere),
            "WITH" => Some(Self::KwWith),
            "WITHIN" => Some(Self::KwWithin),
            _ => None,
        }
    }

    /// Whether this is any keyword variant.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        self.is_reserved() || self.is_nonreserved_keyword()
    }

    /// Reserved keywords can never be used as bare identifiers.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(
            self,
            Self::KwSelect
                | Self::KwFrom
                | Self::KwWhere
                | Self::KwGroup
                | Self::KwBy
                | Self::KwHaving
                | Self::KwOrder
                | Self::KwLimit
                | Self::KwAnd
                | Self::KwOr
                | Self::KwNot
                | Self::KwIn
                | Self::KwLike
                | Self::KwAs
                | Self::KwAsc
                | Self::KwDesc
                | Self::KwFill
                | Self::KwWith
                | Self::KwOn
                | Self::KwShow
                | Self::KwCreate
                | Self::KwDrop
                | Self::KwUse
                | Self::KwExplain
                | Self::KwTrue
                | Self::KwFalse
                | Self::KwNull
        )
    }

    /// Keywords that double as identifiers wherever a name is expected.
    #[must_use]
    pub const fn is_nonreserved_keyword(&self) -> bool {
        matches!(
            self,
            Self::KwAlive
                | Self::KwAll
                | Self::KwBroker
                | Self::KwBrokers
                | Self::KwCompact
                | Self::KwDatabase
                | Self::KwDatabases
                | Self::KwFields
                | Self::KwFlush
                | Self::KwKey
                | Self::KwKeys
                | Self::KwMaster
                | Self::KwMetadata
                | Self::KwMetadatas
                | Self::KwMetric
                | Self::KwMetrics
                | Self::KwNamespace
                | Self::KwNamespaces
                | Self::KwPrevious
                | Self::KwReplications
                | Self::KwRequests
                | Self::KwRollup
                | Self::KwState
                | Self::KwTag
                | Self::KwTypes
                | Self::KwValues
                | Self::KwWithin
        )
    }

    /// Human-readable description used in "expected X, got Y" messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Integer(_) => "integer".to_owned(),
            Self::Decimal(_) | Self::Double(_) => "number".to_owned(),
            Self::String(_) => "string".to_owned(),
            Self::Id(_) | Self::DoubleQuotedId(_) | Self::BacktickId(_) | Self::DigitId(_) => {
                "identifier".to_owned()
            }
            Self::Error => "invalid token".to_owned(),
            Self::Eof => "end of input".to_owned(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Integer(n) => return write!(f, "{n}"),
            Self::Decimal(v) | Self::Double(v) => return write!(f, "{v}"),
            Self::String(s) => return write!(f, "'{s}'"),
            Self::Id(s) | Self::DigitId(s) => return f.write_str(s),
            Self::DoubleQuotedId(s) => return write!(f, "\"{s}\""),
            Self::BacktickId(s) => return write!(f, "`{s}`"),
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::RegexMatch => "=~",
            Self::RegexNotMatch => "!~",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::KwAlive => "ALIVE",
            Self::KwAll => "ALL",
            Self::KwAnd => "AND",
            Self::KwAs => "AS",
            Self::KwAsc => "ASC",
            Self::KwBroker => "BROKER",
            Self::KwBrokers => "BROKERS",
            Self::KwBy => "BY",
            Self::KwCompact => "COMPACT",
            Self::KwCreate => "CREATE",
            Self::KwDatabase => "DATABASE",
            Self::KwDatabases => "DATABASES",
            Self::KwDesc => "DESC",
            Self::KwDrop => "DROP",
            Self::KwExplain => "EXPLAIN",
            Self::KwFalse => "FALSE",
            Self::KwFields => "FIELDS",
            Self::KwFill => "FILL",
            Self::KwFlush => "FLUSH",
            Self::KwFrom => "FROM",
            Self::KwGroup => "GROUP",
            Self::KwHaving => "HAVING",
            Self::KwIn => "IN",
            Self::KwKey => "KEY",
            Self::KwKeys => "KEYS",
            Self::KwLike => "LIKE",
            Self::KwLimit => "LIMIT",
            Self::KwMaster => "MASTER",
            Self::KwMetadata => "METADATA",
            Self::KwMetadatas => "METADATAS",
            Self::KwMetric => "METRIC",
            Self::KwMetrics => "METRICS",
            Self::KwNamespace => "NAMESPACE",
            Self::KwNamespaces => "NAMESPACES",
            Self::KwNot => "NOT",
            Self::KwNull => "NULL",
            Self::KwOn => "ON",
            Self::KwOr => "OR",
            Self::KwOrder => "ORDER",
            Self::KwPrevious => "PREVIOUS",
            Self::KwReplications => "REPLICATIONS",
            Self::KwRequests => "REQUESTS",
            Self::KwRollup => "ROLLUP",
            Self::KwSelect => "SELECT",
            Self::KwShow => "SHOW",
            Self::KwState => "STATE",
            Self::KwTag => "TAG",
            Self::KwTrue => "TRUE",
            Self::KwTypes => "TYPES",
            Self::KwUse => "USE",
            Self::KwValues => "VALUES",
            Self::KwWhere => "WHERE",
            Self::KwWith => "WITH",
            Self::KwWithin => "WITHIN",
            Self::Error => "<error>",
            Self::Eof => "<eof>",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_ignores_case() {
        assert_eq!(TokenKind::lookup_keyword("select"), Some(TokenKind::KwSelect));
        assert_eq!(TokenKind::lookup_keyword("SeLeCt"), Some(TokenKind::KwSelect));
        assert_eq!(
            TokenKind::lookup_keyword("replications"),
            Some(TokenKind::KwReplications)
        );
        assert_eq!(TokenKind::lookup_keyword("time"), None);
        assert_eq!(TokenKind::lookup_keyword("now"), None);
        assert_eq!(TokenKind::lookup_keyword("selection"), None);
    }

    #[test]
    fn reserved_and_nonreserved_are_disjoint() {
        for word in [
            "ALIVE", "ALL", "AND", "AS", "ASC", "BROKER", "BROKERS", "BY", "COMPACT", "CREATE",
            "DATABASE", "DATABASES", "DESC", "DROP", "EXPLAIN", "FALSE", "FIELDS", "FILL",
            "FLUSH", "FROM", "GROUP", "HAVING", "IN", "KEY", "KEYS", "LIKE", "LIMIT", "MASTER",
            "METADATA", "METADATAS", "METRIC", "METRICS", "NAMESPACE", "NAMESPACES", "NOT",
            "NULL", "ON", "OR", "ORDER", "PREVIOUS", "REPLICATIONS", "REQUESTS", "ROLLUP",
            "SELECT", "SHOW", "STATE", "TAG", "TRUE", "TYPES", "USE", "VALUES", "WHERE", "WITH",
            "WITHIN",
        ] {
            let Some(kw) = TokenKind::lookup_keyword(word) else {
                unreachable!("{word} is not in the keyword table");
            };
            assert!(kw.is_reserved() ^ kw.is_nonreserved_keyword(), "{word}");
            assert_eq!(kw.to_string(), word);
        }
    }

    #[test]
    fn describe_uses_categories_for_literals() {
        assert_eq!(TokenKind::Id("cpu".to_owned()).describe(), "identifier");
        assert_eq!(TokenKind::Integer(3).describe(), "integer");
        assert_eq!(TokenKind::KwFrom.describe(), "FROM");
        assert_eq!(TokenKind::Eof.describe(), "end of input");
    }
}
