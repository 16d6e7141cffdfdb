//! Canonical query text via `fmt::Display` for AST nodes.
//!
//! Rendering a tree and parsing the result yields the same tree (spans
//! aside). Keywords are upper case and operators are surrounded by single
//! spaces. Arithmetic gets the parentheses precedence requires; nested
//! boolean connectives are always parenthesized.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

// ---------------------------------------------------------------------------
// Helper: write a comma-separated list
// ---------------------------------------------------------------------------

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helper: identifiers and string literals
// ---------------------------------------------------------------------------

/// A word the lexer reads back as a single bare identifier.
fn is_bare_word(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        && !s.bytes().all(|b| b.is_ascii_digit())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str, quote: char) -> fmt::Result {
    let doubled = format!("{quote}{quote}");
    write!(f, "{quote}{}{quote}", value.replace(quote, &doubled))
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write_quoted(f, value, '\'')
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote {
            QuoteStyle::Double => write_quoted(f, &self.value, '"'),
            QuoteStyle::Backtick => write_quoted(f, &self.value, '`'),
            QuoteStyle::None if is_bare_word(&self.value) => f.write_str(&self.value),
            QuoteStyle::None => write_quoted(f, &self.value, '"'),
        }
    }
}

/// Metric names may be dotted paths (`lindb.runtime.mem`) that are written
/// without quotes.
fn write_metric_name(f: &mut fmt::Formatter<'_>, name: &Ident) -> fmt::Result {
    let dotted_bare = name.quote == QuoteStyle::None
        && name.value.split('.').enumerate().all(|(i, seg)| {
            if i == 0 {
                is_bare_word(seg)
            } else {
                !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
            }
        });
    if dotted_bare {
        f.write_str(&name.value)
    } else {
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Literals and durations
// ---------------------------------------------------------------------------

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Decimal(v) => {
                // Always keep a decimal point so the value lexes as decimal.
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Self::Double(v) => write!(f, "{v:e}"),
            Self::String(s) => write_string(f, s),
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
        }
    }
}

impl fmt::Display for DurationLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        })
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::RegexMatch => "=~",
            Self::RegexNotMatch => "!~",
            Self::Like => "LIKE",
            Self::In => "IN",
        })
    }
}

impl fmt::Display for TagFilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::RegexMatch => "=~",
            Self::RegexNotMatch => "!~",
        })
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

const fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Subtract => 1,
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 2,
    }
}

/// Precedence of an arithmetic node. `now()` with an offset prints as a
/// subtraction or addition.
const fn arith_precedence(expr: &Expr) -> Option<u8> {
    match expr {
        Expr::Binary { op, .. } => Some(binary_precedence(*op)),
        Expr::Now {
            offset: Some(_), ..
        } => Some(1),
        _ => None,
    }
}

fn write_paren_if(f: &mut fmt::Formatter<'_>, expr: &Expr, paren: bool) -> fmt::Result {
    if paren {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoolBinary {
                op, left, right, ..
            } => {
                write_paren_if(f, left, matches!(**left, Self::BoolBinary { .. }))?;
                write!(f, " {op} ")?;
                write_paren_if(f, right, matches!(**right, Self::BoolBinary { .. }))
            }
            Self::Not { inner, .. } => {
                f.write_str("NOT ")?;
                write_paren_if(f, inner, matches!(**inner, Self::BoolBinary { .. }))
            }
            Self::Comparison {
                op, left, right, ..
            } => {
                write_paren_if(f, left, left.is_predicate())?;
                write!(f, " {op} ")?;
                write_paren_if(f, right, right.is_predicate())
            }
            Self::TagFilter {
                key, op, values, ..
            } => {
                write!(f, "{key} {op} ")?;
                if op.is_list() {
                    f.write_str("(")?;
                    for (i, v) in values.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write_string(f, v)?;
                    }
                    f.write_str(")")
                } else {
                    write_string(f, values.first().map_or("", String::as_str))
                }
            }
            Self::TimeRange {
                field, op, bound, ..
            } => write!(f, "{field} {op} {bound}"),
            Self::Binary {
                op, left, right, ..
            } => {
                // Left associative: only a looser left child needs parens,
                // while an equally tight right child does too.
                let prec = binary_precedence(*op);
                let left_paren = left.is_predicate()
                    || arith_precedence(left).is_some_and(|l| l < prec);
                let right_paren = right.is_predicate()
                    || arith_precedence(right).is_some_and(|r| r <= prec);
                write_paren_if(f, left, left_paren)?;
                write!(f, " {op} ")?;
                write_paren_if(f, right, right_paren)
            }
            Self::Neg { inner, .. } => {
                f.write_str("-")?;
                let bare = matches!(
                    **inner,
                    Self::FieldRef(_) | Self::FuncCall { .. } | Self::Now { offset: None, .. }
                );
                write_paren_if(f, inner, !bare)
            }
            Self::FuncCall { name, args, .. } => {
                write!(f, "{name}(")?;
                comma_list(f, args)?;
                f.write_str(")")
            }
            Self::FieldRef(ident) => write!(f, "{ident}"),
            Self::Literal(lit, _) => write!(f, "{lit}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Now { offset, .. } => {
                f.write_str("now()")?;
                if let Some(d) = offset {
                    let sign = if d.value < 0 { '-' } else { '+' };
                    write!(f, " {sign} {}{}", d.value.unsigned_abs(), d.unit)?;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit, _) => write!(f, "{lit}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Ident(i) => write!(f, "{i}"),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

impl fmt::Display for RollupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        comma_list(f, &self.properties)?;
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// SELECT clauses
// ---------------------------------------------------------------------------

impl fmt::Display for MetricRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_metric_name(f, &self.name)?;
        if let Some(ref ns) = self.namespace {
            write!(f, " ON {ns}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(ref alias) = self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FillOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Previous => f.write_str("PREVIOUS"),
            Self::Value(lit) => write!(f, "{lit}"),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GROUP BY ")?;
        let mut first = true;
        if let Some(ref interval) = self.interval {
            write!(f, "time({interval})")?;
            first = false;
        }
        for key in &self.tag_keys {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
            first = false;
        }
        if let Some(ref fill) = self.fill {
            write!(f, " FILL({fill})")?;
        }
        Ok(())
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.direction == SortDirection::Desc {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explain {
            f.write_str("EXPLAIN ")?;
        }
        f.write_str("SELECT ")?;
        comma_list(f, &self.select)?;
        write!(f, " FROM {}", self.from)?;
        if let Some(ref cond) = self.condition {
            write!(f, " WHERE {cond}")?;
        }
        if let Some(ref group_by) = self.group_by {
            write!(f, " {group_by}")?;
        }
        if let Some(ref having) = self.having {
            write!(f, " HAVING {having}")?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            comma_list(f, &self.order_by)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SHOW
// ---------------------------------------------------------------------------

fn write_limit(f: &mut fmt::Formatter<'_>, limit: Option<u64>) -> fmt::Result {
    match limit {
        Some(n) => write!(f, " LIMIT {n}"),
        None => Ok(()),
    }
}

fn write_filter(f: &mut fmt::Formatter<'_>, filter: Option<&Expr>) -> fmt::Result {
    match filter {
        Some(e) => write!(f, " WHERE {e}"),
        None => Ok(()),
    }
}

impl fmt::Display for ShowStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SHOW ")?;
        match &self.kind {
            ShowKind::Master => f.write_str("MASTER"),
            ShowKind::Brokers => f.write_str("BROKERS"),
            ShowKind::Requests { limit } => {
                f.write_str("REQUESTS")?;
                write_limit(f, *limit)
            }
            ShowKind::MetadataTypes => f.write_str("METADATA TYPES"),
            ShowKind::Metadatas { filter } => {
                f.write_str("METADATAS")?;
                write_filter(f, filter.as_ref())
            }
            ShowKind::Alive => f.write_str("ALIVE"),
            ShowKind::Replications { filter } => {
                f.write_str("REPLICATIONS")?;
                write_filter(f, filter.as_ref())
            }
            ShowKind::State { filter } => {
                f.write_str("STATE")?;
                write_filter(f, filter.as_ref())
            }
            ShowKind::Databases => f.write_str("DATABASES"),
            ShowKind::Namespaces { prefix, limit } => {
                f.write_str("NAMESPACES")?;
                if let Some(p) = prefix {
                    f.write_str(" WHERE NAMESPACE = ")?;
                    write_string(f, p)?;
                }
                write_limit(f, *limit)
            }
            ShowKind::Metrics {
                namespace,
                prefix,
                limit,
            } => {
                f.write_str("METRICS")?;
                if let Some(ns) = namespace {
                    write!(f, " ON {ns}")?;
                }
                if let Some(p) = prefix {
                    f.write_str(" WHERE METRIC = ")?;
                    write_string(f, p)?;
                }
                write_limit(f, *limit)
            }
            ShowKind::Fields { metric } => write!(f, "FIELDS FROM {metric}"),
            ShowKind::TagKeys { metric } => write!(f, "TAG KEYS FROM {metric}"),
            ShowKind::TagValues {
                metric,
                with_tag_key,
                condition,
                limit,
            } => {
                write!(f, "TAG VALUES FROM {metric}")?;
                if let Some(key) = with_tag_key {
                    write!(f, " WITH KEY = {key}")?;
                }
                write_filter(f, condition.as_ref())?;
                write_limit(f, *limit)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DDL / utility
// ---------------------------------------------------------------------------

impl fmt::Display for CreateDatabaseStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE DATABASE {}", self.name)?;
        if !self.properties.is_empty() {
            f.write_str(" WITH (")?;
            comma_list(f, &self.properties)?;
            f.write_str(")")?;
        }
        if !self.rollup.is_empty() {
            f.write_str(" ROLLUP (")?;
            comma_list(f, &self.rollup)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for CreateBrokerStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE BROKER {}", self.name)?;
        if !self.properties.is_empty() {
            f.write_str(" WITH (")?;
            comma_list(f, &self.properties)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level Statement
// ---------------------------------------------------------------------------

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Use(s) => write!(f, "USE {}", s.database),
            Self::CreateDatabase(s) => write!(f, "{s}"),
            Self::DropDatabase(s) => write!(f, "DROP DATABASE {}", s.name),
            Self::CreateBroker(s) => write!(f, "{s}"),
            Self::FlushDatabase(s) => write!(f, "FLUSH DATABASE {}", s.name),
            Self::CompactDatabase(s) => write!(f, "COMPACT DATABASE {}", s.name),
            Self::Show(s) => write!(f, "{s}"),
            Self::Query(s) => write!(f, "{s}"),
        }
    }
}
