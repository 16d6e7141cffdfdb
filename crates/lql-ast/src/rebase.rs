//! Bulk span rewriting.
//!
//! `parse_script` parses each statement of a script on its own and then
//! shifts the spans so they point into the whole script. Tests use
//! [`MapSpans::without_spans`] to compare trees built from differently
//! formatted text.

#[allow(clippy::wildcard_imports)]
use crate::*;

/// Rewrite every [`Span`] held by a node, children included.
pub trait MapSpans {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span);

    /// Shift every span right by `offset` bytes.
    fn rebase(&mut self, offset: u32) {
        self.map_spans(&mut |s| Span::new(s.start + offset, s.end + offset));
    }

    /// Replace every span with [`Span::ZERO`].
    #[must_use]
    fn without_spans(mut self) -> Self
    where
        Self: Sized,
    {
        self.map_spans(&mut |_| Span::ZERO);
        self
    }
}

impl<T: MapSpans> MapSpans for Option<T> {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        if let Some(inner) = self {
            inner.map_spans(f);
        }
    }
}

impl<T: MapSpans> MapSpans for Vec<T> {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        for item in self {
            item.map_spans(f);
        }
    }
}

impl<T: MapSpans> MapSpans for Box<T> {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        (**self).map_spans(f);
    }
}

impl MapSpans for Span {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        *self = f(*self);
    }
}

impl MapSpans for Ident {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.span.map_spans(f);
    }
}

impl MapSpans for DurationLit {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.span.map_spans(f);
    }
}

impl MapSpans for Expr {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        match self {
            Self::BoolBinary {
                left, right, span, ..
            }
            | Self::Comparison {
                left, right, span, ..
            }
            | Self::Binary {
                left, right, span, ..
            } => {
                left.map_spans(f);
                right.map_spans(f);
                span.map_spans(f);
            }
            Self::Not { inner, span } | Self::Neg { inner, span } => {
                inner.map_spans(f);
                span.map_spans(f);
            }
            Self::TagFilter { key, span, .. } => {
                key.map_spans(f);
                span.map_spans(f);
            }
            Self::TimeRange {
                field, bound, span, ..
            } => {
                field.map_spans(f);
                bound.map_spans(f);
                span.map_spans(f);
            }
            Self::FuncCall { name, args, span } => {
                name.map_spans(f);
                args.map_spans(f);
                span.map_spans(f);
            }
            Self::FieldRef(ident) => ident.map_spans(f),
            Self::Literal(_, span) => span.map_spans(f),
            Self::Duration(d) => d.map_spans(f),
            Self::Now { offset, span } => {
                offset.map_spans(f);
                span.map_spans(f);
            }
        }
    }
}

impl MapSpans for PropertyValue {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        match self {
            Self::Literal(_, span) => span.map_spans(f),
            Self::Duration(d) => d.map_spans(f),
            Self::Ident(i) => i.map_spans(f),
        }
    }
}

impl MapSpans for Property {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.key.map_spans(f);
        self.value.map_spans(f);
        self.span.map_spans(f);
    }
}

impl MapSpans for RollupRule {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.properties.map_spans(f);
        self.span.map_spans(f);
    }
}

impl MapSpans for MetricRef {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.name.map_spans(f);
        self.namespace.map_spans(f);
        self.span.map_spans(f);
    }
}

impl MapSpans for SelectField {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.expr.map_spans(f);
        self.alias.map_spans(f);
        self.span.map_spans(f);
    }
}

impl MapSpans for GroupBy {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.interval.map_spans(f);
        self.tag_keys.map_spans(f);
        self.span.map_spans(f);
    }
}

impl MapSpans for SortField {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.expr.map_spans(f);
        self.span.map_spans(f);
    }
}

impl MapSpans for QueryStatement {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        self.select.map_spans(f);
        self.from.map_spans(f);
        self.condition.map_spans(f);
        self.group_by.map_spans(f);
        self.having.map_spans(f);
        self.order_by.map_spans(f);
        self.span.map_spans(f);
    }
}

impl MapSpans for ShowStatement {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        match &mut self.kind {
            ShowKind::Master
            | ShowKind::Brokers
            | ShowKind::Requests { .. }
            | ShowKind::MetadataTypes
            | ShowKind::Alive
            | ShowKind::Databases
            | ShowKind::Namespaces { .. } => {}
            ShowKind::Metadatas { filter }
            | ShowKind::Replications { filter }
            | ShowKind::State { filter } => filter.map_spans(f),
            ShowKind::Metrics { namespace, .. } => namespace.map_spans(f),
            ShowKind::Fields { metric } | ShowKind::TagKeys { metric } => metric.map_spans(f),
            ShowKind::TagValues {
                metric,
                with_tag_key,
                condition,
                ..
            } => {
                metric.map_spans(f);
                with_tag_key.map_spans(f);
                condition.map_spans(f);
            }
        }
        self.span.map_spans(f);
    }
}

impl MapSpans for Statement {
    fn map_spans(&mut self, f: &mut dyn FnMut(Span) -> Span) {
        match self {
            Self::Use(s) => {
                s.database.map_spans(f);
                s.span.map_spans(f);
            }
            Self::CreateDatabase(s) => {
                s.name.map_spans(f);
                s.properties.map_spans(f);
                s.rollup.map_spans(f);
                s.span.map_spans(f);
            }
            Self::DropDatabase(s) => {
                s.name.map_spans(f);
                s.span.map_spans(f);
            }
            Self::CreateBroker(s) => {
                s.name.map_spans(f);
                s.properties.map_spans(f);
                s.span.map_spans(f);
            }
            Self::FlushDatabase(s) => {
                s.name.map_spans(f);
                s.span.map_spans(f);
            }
            Self::CompactDatabase(s) => {
                s.name.map_spans(f);
                s.span.map_spans(f);
            }
            Self::Show(s) => s.map_spans(f),
            Self::Query(s) => s.map_spans(f),
        }
    }
}
