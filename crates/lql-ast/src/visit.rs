//! Read-only traversal of statements and expressions.
//!
//! Implement [`Visitor`] and override the hooks you care about, then drive
//! it with [`walk_statement`] or [`walk_expr`]. Children are visited in
//! source order. Any hook can stop the walk early by returning
//! `ControlFlow::Break`.

use std::ops::ControlFlow;

#[allow(clippy::wildcard_imports)]
use crate::*;

pub trait Visitor {
    /// Value carried out of the walk when a hook breaks.
    type Break;

    fn enter_statement(&mut self, _stmt: &Statement) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn exit_statement(&mut self, _stmt: &Statement) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    /// Called before the children of `expr` are walked.
    fn enter_expr(&mut self, _expr: &Expr) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    /// Called after the children of `expr` are walked.
    fn exit_expr(&mut self, _expr: &Expr) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_select_field(&mut self, _field: &SelectField) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_metric(&mut self, _metric: &MetricRef) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_group_by(&mut self, _group_by: &GroupBy) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_sort_field(&mut self, _field: &SortField) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_property(&mut self, _prop: &Property) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }
}

/// Walk a statement and everything below it.
pub fn walk_statement<V: Visitor + ?Sized>(
    visitor: &mut V,
    stmt: &Statement,
) -> ControlFlow<V::Break> {
    visitor.enter_statement(stmt)?;
    match stmt {
        Statement::Use(_)
        | Statement::DropDatabase(_)
        | Statement::FlushDatabase(_)
        | Statement::CompactDatabase(_) => {}
        Statement::CreateDatabase(s) => {
            for prop in &s.properties {
                visitor.visit_property(prop)?;
            }
            for rule in &s.rollup {
                for prop in &rule.properties {
                    visitor.visit_property(prop)?;
                }
            }
        }
        Statement::CreateBroker(s) => {
            for prop in &s.properties {
                visitor.visit_property(prop)?;
            }
        }
        Statement::Show(s) => walk_show(visitor, &s.kind)?,
        Statement::Query(q) => walk_query(visitor, q)?,
    }
    visitor.exit_statement(stmt)
}

fn walk_query<V: Visitor + ?Sized>(visitor: &mut V, q: &QueryStatement) -> ControlFlow<V::Break> {
    for field in &q.select {
        visitor.visit_select_field(field)?;
        walk_expr(visitor, &field.expr)?;
    }
    visitor.visit_metric(&q.from)?;
    if let Some(ref cond) = q.condition {
        walk_expr(visitor, cond)?;
    }
    if let Some(ref group_by) = q.group_by {
        visitor.visit_group_by(group_by)?;
    }
    if let Some(ref having) = q.having {
        walk_expr(visitor, having)?;
    }
    for sort in &q.order_by {
        visitor.visit_sort_field(sort)?;
        walk_expr(visitor, &sort.expr)?;
    }
    ControlFlow::Continue(())
}

fn walk_show<V: Visitor + ?Sized>(visitor: &mut V, kind: &ShowKind) -> ControlFlow<V::Break> {
    match kind {
        ShowKind::Metadatas { filter }
        | ShowKind::Replications { filter }
        | ShowKind::State { filter } => {
            if let Some(e) = filter {
                walk_expr(visitor, e)?;
            }
        }
        ShowKind::Fields { metric } | ShowKind::TagKeys { metric } => {
            visitor.visit_metric(metric)?;
        }
        ShowKind::TagValues {
            metric, condition, ..
        } => {
            visitor.visit_metric(metric)?;
            if let Some(e) = condition {
                walk_expr(visitor, e)?;
            }
        }
        _ => {}
    }
    ControlFlow::Continue(())
}

/// Walk an expression tree depth first.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) -> ControlFlow<V::Break> {
    visitor.enter_expr(expr)?;
    match expr {
        Expr::BoolBinary { left, right, .. }
        | Expr::Comparison { left, right, .. }
        | Expr::Binary { left, right, .. } => {
            walk_expr(visitor, left)?;
            walk_expr(visitor, right)?;
        }
        Expr::Not { inner, .. } | Expr::Neg { inner, .. } => walk_expr(visitor, inner)?,
        Expr::TimeRange { bound, .. } => walk_expr(visitor, bound)?,
        Expr::FuncCall { args, .. } => {
            for arg in args {
                walk_expr(visitor, arg)?;
            }
        }
        Expr::TagFilter { .. }
        | Expr::FieldRef(_)
        | Expr::Literal(..)
        | Expr::Duration(_)
        | Expr::Now { .. } => {}
    }
    visitor.exit_expr(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::new(0, 1)
    }

    fn tag(key: &str, value: &str) -> Expr {
        Expr::TagFilter {
            key: Ident::bare(key, sp()),
            op: TagFilterOp::Eq,
            values: vec![value.to_owned()],
            span: sp(),
        }
    }

    fn query(condition: Expr) -> Statement {
        Statement::Query(QueryStatement {
            explain: false,
            select: vec![SelectField {
                expr: Expr::FuncCall {
                    name: Ident::bare("max", sp()),
                    args: vec![Expr::FieldRef(Ident::bare("load", sp()))],
                    span: sp(),
                },
                alias: None,
                span: sp(),
            }],
            from: MetricRef {
                name: Ident::bare("cpu", sp()),
                namespace: None,
                span: sp(),
            },
            condition: Some(condition),
            group_by: None,
            having: None,
            order_by: Vec::new(),
            limit: None,
            span: sp(),
        })
    }

    #[derive(Default)]
    struct TagKeys(Vec<String>);

    impl Visitor for TagKeys {
        type Break = ();

        fn enter_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
            if let Expr::TagFilter { key, .. } = expr {
                self.0.push(key.value.clone());
            }
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn collects_tag_keys_in_source_order() {
        let cond = Expr::BoolBinary {
            op: BoolOp::And,
            left: Box::new(tag("host", "a")),
            right: Box::new(Expr::Not {
                inner: Box::new(tag("region", "eu")),
                span: sp(),
            }),
            span: sp(),
        };
        let mut v = TagKeys::default();
        assert!(walk_statement(&mut v, &query(cond)).is_continue());
        assert_eq!(v.0, vec!["host", "region"]);
    }

    struct FirstCall;

    impl Visitor for FirstCall {
        type Break = String;

        fn enter_expr(&mut self, expr: &Expr) -> ControlFlow<String> {
            match expr {
                Expr::FuncCall { name, .. } => ControlFlow::Break(name.value.clone()),
                _ => ControlFlow::Continue(()),
            }
        }
    }

    #[test]
    fn break_stops_the_walk() {
        let flow = walk_statement(&mut FirstCall, &query(tag("host", "a")));
        assert_eq!(flow, ControlFlow::Break("max".to_owned()));
    }
}
