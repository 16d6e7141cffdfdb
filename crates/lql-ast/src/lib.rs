//! Abstract syntax tree for LQL, the LinDB query language.
//!
//! Every statement produced by `lql-parser` is a tree of these nodes. The
//! tree is owned top-down (no sharing, no cycles) and every node that stands
//! for user-written syntax carries a [`Span`] so that planners and error
//! messages can point back at the query text.

mod display;
pub mod rebase;
pub mod visit;

use std::fmt;

// ---------------------------------------------------------------------------
// Span — source location tracking
// ---------------------------------------------------------------------------

/// A byte-offset range into the original query text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first character (inclusive).
    pub start: u32,
    /// Byte offset one past the last character (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from start (inclusive) to end (exclusive) byte offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-length span at position 0, used as a placeholder.
    pub const ZERO: Self = Self { start: 0, end: 0 };

    /// Merge two spans into one that covers both.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// How an identifier was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuoteStyle {
    /// Bare word: `cpu`.
    #[default]
    None,
    /// Double-quoted: `"cpu load"`.
    Double,
    /// Backquoted: `` `cpu load` ``.
    Backtick,
}

/// An identifier: database, metric, namespace, field, tag key or alias name.
///
/// The value is case preserving. The quote style is kept so that rendering
/// the tree reproduces the original quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub value: String,
    pub quote: QuoteStyle,
    pub span: Span,
}

impl Ident {
    /// Create an unquoted identifier.
    #[must_use]
    pub fn bare(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            quote: QuoteStyle::None,
            span,
        }
    }

    /// Create an identifier with an explicit quote style.
    #[must_use]
    pub fn quoted(value: impl Into<String>, quote: QuoteStyle, span: Span) -> Self {
        Self {
            value: value.into(),
            quote,
            span,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level statement
// ---------------------------------------------------------------------------

/// A single parsed LQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    // Utility
    Use(UseStatement),

    // DDL
    CreateDatabase(CreateDatabaseStatement),
    DropDatabase(DropDatabaseStatement),
    CreateBroker(CreateBrokerStatement),
    FlushDatabase(FlushDatabaseStatement),
    CompactDatabase(CompactDatabaseStatement),

    // Admin / metadata
    Show(ShowStatement),

    // DML
    Query(QueryStatement),
}

impl Statement {
    /// Short human-readable statement kind, used in logs and error context.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Use(_) => "USE",
            Self::CreateDatabase(_) => "CREATE DATABASE",
            Self::DropDatabase(_) => "DROP DATABASE",
            Self::CreateBroker(_) => "CREATE BROKER",
            Self::FlushDatabase(_) => "FLUSH DATABASE",
            Self::CompactDatabase(_) => "COMPACT DATABASE",
            Self::Show(_) => "SHOW",
            Self::Query(_) => "SELECT",
        }
    }

    /// Source span of the whole statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Use(s) => s.span,
            Self::CreateDatabase(s) => s.span,
            Self::DropDatabase(s) => s.span,
            Self::CreateBroker(s) => s.span,
            Self::FlushDatabase(s) => s.span,
            Self::CompactDatabase(s) => s.span,
            Self::Show(s) => s.span,
            Self::Query(s) => s.span,
        }
    }
}

/// `USE database`.
#[derive(Debug, Clone, PartialEq)]
pub struct UseStatement {
    pub database: Ident,
    pub span: Span,
}

/// `CREATE DATABASE name [WITH (k=v, ...)] [ROLLUP ((k=v, ...), ...)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabaseStatement {
    pub name: Ident,
    /// Database options from the `WITH (...)` clause, in source order.
    pub properties: Vec<Property>,
    /// Rollup (downsampling retention) rules, in source order.
    pub rollup: Vec<RollupRule>,
    pub span: Span,
}

/// `DROP DATABASE name`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropDatabaseStatement {
    pub name: Ident,
    pub span: Span,
}

/// `CREATE BROKER name [WITH (k=v, ...)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBrokerStatement {
    pub name: Ident,
    pub properties: Vec<Property>,
    pub span: Span,
}

/// `FLUSH DATABASE name`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushDatabaseStatement {
    pub name: Ident,
    pub span: Span,
}

/// `COMPACT DATABASE name`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactDatabaseStatement {
    pub name: Ident,
    pub span: Span,
}

/// A `key = value` option inside a `WITH (...)` or rollup list.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Ident,
    pub value: PropertyValue,
    pub span: Span,
}

/// The value side of a [`Property`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `numOfShard = 3`, `enabled = true`, `owner = 'ops'`.
    Literal(Literal, Span),
    /// `interval = 10s`.
    Duration(DurationLit),
    /// `engine = tsdb`.
    Ident(Ident),
}

impl PropertyValue {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal(_, s) => *s,
            Self::Duration(d) => d.span,
            Self::Ident(i) => i.span,
        }
    }
}

/// One rollup rule: `(interval = 5m, retention = 3M)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupRule {
    pub properties: Vec<Property>,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// SHOW statements
// ---------------------------------------------------------------------------

/// `SHOW ...` with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowStatement {
    pub kind: ShowKind,
    pub span: Span,
}

/// The `SHOW` sub-forms.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowKind {
    /// `SHOW MASTER`
    Master,
    /// `SHOW BROKERS`
    Brokers,
    /// `SHOW REQUESTS [LIMIT n]`
    Requests { limit: Option<u64> },
    /// `SHOW METADATA TYPES`
    MetadataTypes,
    /// `SHOW METADATAS [WHERE ...]`
    Metadatas { filter: Option<Expr> },
    /// `SHOW ALIVE`
    Alive,
    /// `SHOW REPLICATIONS [WHERE ...]`
    Replications { filter: Option<Expr> },
    /// `SHOW STATE [WHERE ...]`
    State { filter: Option<Expr> },
    /// `SHOW DATABASES`
    Databases,
    /// `SHOW NAMESPACES [WHERE NAMESPACE = 'prefix'] [LIMIT n]`
    Namespaces {
        prefix: Option<String>,
        limit: Option<u64>,
    },
    /// `SHOW METRICS [ON ns] [WHERE METRIC = 'prefix'] [LIMIT n]`
    Metrics {
        namespace: Option<Ident>,
        prefix: Option<String>,
        limit: Option<u64>,
    },
    /// `SHOW FIELDS FROM metric [ON ns]`
    Fields { metric: MetricRef },
    /// `SHOW TAG KEYS FROM metric [ON ns]`
    TagKeys { metric: MetricRef },
    /// `SHOW TAG VALUES FROM metric [ON ns] [WITH KEY = k] [WHERE ...] [LIMIT n]`
    TagValues {
        metric: MetricRef,
        with_tag_key: Option<Ident>,
        condition: Option<Expr>,
        limit: Option<u64>,
    },
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

/// A time-series query:
/// `[EXPLAIN] SELECT fields FROM metric [WHERE ...] [GROUP BY ...] [HAVING ...]
/// [ORDER BY ...] [LIMIT n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStatement {
    pub explain: bool,
    pub select: Vec<SelectField>,
    pub from: MetricRef,
    pub condition: Option<Expr>,
    pub group_by: Option<GroupBy>,
    pub having: Option<Expr>,
    pub order_by: Vec<SortField>,
    pub limit: Option<u64>,
    pub span: Span,
}

/// The single `FROM` target: a metric, optionally inside a namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRef {
    pub name: Ident,
    pub namespace: Option<Ident>,
    pub span: Span,
}

/// `expr [AS alias]` in the select list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectField {
    pub expr: Expr,
    pub alias: Option<Ident>,
    pub span: Span,
}

/// `GROUP BY [time(interval),] tagKey, ... [FILL(option)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    /// Down-sampling bucket from `time(...)`, if any.
    pub interval: Option<DurationLit>,
    pub tag_keys: Vec<Ident>,
    pub fill: Option<FillOption>,
    pub span: Span,
}

/// Value substituted for empty time buckets.
#[derive(Debug, Clone, PartialEq)]
pub enum FillOption {
    Null,
    Previous,
    /// A numeric default; always an `Int`, `Decimal` or `Double` literal.
    Value(Literal),
}

/// `expr [ASC|DESC]` in `ORDER BY`.
#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub expr: Expr,
    pub direction: SortDirection,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

// ---------------------------------------------------------------------------
// Literals and durations
// ---------------------------------------------------------------------------

/// A literal constant. Numeric literals keep the subtype they were lexed
/// with; type inference downstream depends on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `42`
    Int(i64),
    /// `3.14`, `.5`, `1.`
    Decimal(f64),
    /// `1e10`, `2.5E-3`
    Double(f64),
    /// `'text'`
    String(String),
    /// `true` / `false`
    Bool(bool),
}

/// Calendar/clock unit of a duration literal. Case sensitive: `m` is a
/// minute, `M` is a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    /// Map a unit suffix to a unit.
    #[must_use]
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "s" => Some(Self::Second),
            "m" => Some(Self::Minute),
            "h" => Some(Self::Hour),
            "d" => Some(Self::Day),
            "w" => Some(Self::Week),
            "M" => Some(Self::Month),
            "y" => Some(Self::Year),
            _ => None,
        }
    }

    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Second => "s",
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "M",
            Self::Year => "y",
        }
    }

    /// Nominal length in seconds (30-day months, 365-day years).
    #[must_use]
    pub const fn seconds(self) -> i64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
            Self::Week => 604_800,
            Self::Month => 2_592_000,
            Self::Year => 31_536_000,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// `N<unit>`, e.g. `1h`, `30s`, `3M`. A sign written before the literal is
/// folded into `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DurationLit {
    pub value: i64,
    pub unit: DurationUnit,
    pub span: Span,
}

impl DurationLit {
    /// Nominal length in seconds, `None` on overflow.
    #[must_use]
    pub const fn as_seconds(&self) -> Option<i64> {
        self.value.checked_mul(self.unit.seconds())
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

/// Arithmetic operators over field expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

/// Comparison and matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `=~`
    RegexMatch,
    /// `!~`
    RegexNotMatch,
    Like,
    In,
}

impl CompareOp {
    /// The operator that gives the same result with operands swapped, for
    /// ordering operators. `a < b` is `b > a`.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::LtEq => Self::GtEq,
            Self::Gt => Self::Lt,
            Self::GtEq => Self::LtEq,
            other => other,
        }
    }
}

/// Operators allowed between a tag key and its value(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFilterOp {
    Eq,
    NotEq,
    Like,
    NotLike,
    In,
    NotIn,
    RegexMatch,
    RegexNotMatch,
}

impl TagFilterOp {
    /// Whether the operator takes a parenthesized value list.
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node. Every variant carries a [`Span`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `left AND right`, `left OR right`.
    BoolBinary {
        op: BoolOp,
        left: Box<Self>,
        right: Box<Self>,
        span: Span,
    },

    /// `NOT inner`.
    Not { inner: Box<Self>, span: Span },

    /// A comparison between two field expressions (HAVING, or WHERE
    /// predicates that are neither tag filters nor time ranges).
    Comparison {
        op: CompareOp,
        left: Box<Self>,
        right: Box<Self>,
        span: Span,
    },

    /// `tagKey op 'value'` or `tagKey [NOT] IN ('a', 'b')`. Never empty.
    TagFilter {
        key: Ident,
        op: TagFilterOp,
        values: Vec<String>,
        span: Span,
    },

    /// `time op bound`, always normalized with `time` on the left.
    TimeRange {
        field: Ident,
        op: CompareOp,
        bound: Box<Self>,
        span: Span,
    },

    /// Arithmetic: `left op right`.
    Binary {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
        span: Span,
    },

    /// Unary minus on a non-literal operand.
    Neg { inner: Box<Self>, span: Span },

    /// `name(arg, ...)`.
    FuncCall {
        name: Ident,
        args: Vec<Self>,
        span: Span,
    },

    /// A field (or tag key) reference.
    FieldRef(Ident),

    Literal(Literal, Span),

    Duration(DurationLit),

    /// `now()` with an optional signed offset: `now() - 1h`.
    Now {
        offset: Option<DurationLit>,
        span: Span,
    },
}

impl Expr {
    /// Return the span of this expression node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::FieldRef(ident) => ident.span,
            Self::Duration(d) => d.span,
            Self::Literal(_, span)
            | Self::BoolBinary { span, .. }
            | Self::Not { span, .. }
            | Self::Comparison { span, .. }
            | Self::TagFilter { span, .. }
            | Self::TimeRange { span, .. }
            | Self::Binary { span, .. }
            | Self::Neg { span, .. }
            | Self::FuncCall { span, .. }
            | Self::Now { span, .. } => *span,
        }
    }

    /// Whether this node produces a boolean (filter) value.
    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::BoolBinary { .. }
                | Self::Not { .. }
                | Self::Comparison { .. }
                | Self::TagFilter { .. }
                | Self::TimeRange { .. }
        )
    }

    /// Whether the expression contains an aggregate-style function call.
    #[must_use]
    pub fn has_func_call(&self) -> bool {
        match self {
            Self::FuncCall { .. } => true,
            Self::Binary { left, right, .. }
            | Self::Comparison { left, right, .. }
            | Self::BoolBinary { left, right, .. } => {
                left.has_func_call() || right.has_func_call()
            }
            Self::Neg { inner, .. } | Self::Not { inner, .. } => inner.has_func_call(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_covers_both() {
        let a = Span::new(3, 7);
        let b = Span::new(10, 12);
        assert_eq!(a.merge(b), Span::new(3, 12));
        assert_eq!(b.merge(a), Span::new(3, 12));
    }

    #[test]
    fn duration_unit_suffixes_are_case_sensitive() {
        assert_eq!(DurationUnit::from_suffix("m"), Some(DurationUnit::Minute));
        assert_eq!(DurationUnit::from_suffix("M"), Some(DurationUnit::Month));
        assert_eq!(DurationUnit::from_suffix("H"), None);
        assert_eq!(DurationUnit::from_suffix("ms"), None);
    }

    #[test]
    fn duration_seconds() {
        let d = DurationLit {
            value: -2,
            unit: DurationUnit::Hour,
            span: Span::new(0, 2),
        };
        assert_eq!(d.as_seconds(), Some(-7_200));
        let huge = DurationLit {
            value: i64::MAX,
            unit: DurationUnit::Year,
            span: Span::new(0, 2),
        };
        assert_eq!(huge.as_seconds(), None);
    }

    #[test]
    fn compare_op_flip() {
        assert_eq!(CompareOp::Lt.flipped(), CompareOp::Gt);
        assert_eq!(CompareOp::GtEq.flipped(), CompareOp::LtEq);
        assert_eq!(CompareOp::Eq.flipped(), CompareOp::Eq);
    }

    #[test]
    fn has_func_call_looks_through_arithmetic() {
        let sp = Span::new(0, 1);
        let call = Expr::FuncCall {
            name: Ident::bare("sum", sp),
            args: vec![Expr::FieldRef(Ident::bare("v", sp))],
            span: sp,
        };
        let e = Expr::Binary {
            op: BinaryOp::Divide,
            left: Box::new(call),
            right: Box::new(Expr::Literal(Literal::Int(2), sp)),
            span: sp,
        };
        assert!(e.has_func_call());
        assert!(!Expr::FieldRef(Ident::bare("v", sp)).has_func_call());
    }
}
