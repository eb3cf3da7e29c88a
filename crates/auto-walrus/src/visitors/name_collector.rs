//! Name occurrence collection visitor
//!
//! Records every `Expr::Name` reachable from the visited subtree, in any
//! expression context, together with its span. Traversal order is the
//! visitor's evaluation order, not source order; consumers that need source
//! order sort afterwards.

use ruff_python_ast::{
    Expr, ExprContext, Stmt,
    visitor::{Visitor, walk_expr},
};
use ruff_text_size::Ranged;

use crate::{
    locator::Locator,
    syntax_index::{NameContext, Occurrence},
};

/// Visitor that collects name occurrences from a subtree
#[derive(Debug)]
pub struct NameCollector<'a, 'l> {
    locator: &'l Locator<'a>,
    occurrences: Vec<Occurrence<'a>>,
}

impl<'a, 'l> NameCollector<'a, 'l> {
    pub fn new(locator: &'l Locator<'a>) -> Self {
        Self {
            locator,
            occurrences: Vec::new(),
        }
    }

    /// Collect occurrences from a single expression
    pub fn collect_expr(locator: &'l Locator<'a>, expr: &'a Expr) -> Vec<Occurrence<'a>> {
        let mut collector = Self::new(locator);
        collector.visit_expr(expr);
        collector.occurrences
    }

    /// Collect occurrences from a single statement, including nested blocks
    pub fn collect_stmt(locator: &'l Locator<'a>, stmt: &'a Stmt) -> Vec<Occurrence<'a>> {
        let mut collector = Self::new(locator);
        collector.visit_stmt(stmt);
        collector.occurrences
    }

    /// Collect occurrences from a block of statements
    pub fn collect_body(locator: &'l Locator<'a>, body: &'a [Stmt]) -> Vec<Occurrence<'a>> {
        let mut collector = Self::new(locator);
        collector.visit_body(body);
        collector.occurrences
    }
}

impl<'a> Visitor<'a> for NameCollector<'a, '_> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        if let Expr::Name(name) = expr {
            let context = match name.ctx {
                ExprContext::Store => NameContext::Store,
                ExprContext::Del => NameContext::Del,
                _ => NameContext::Load,
            };
            self.occurrences.push(Occurrence::new(
                name.id.as_str(),
                self.locator.span(name.range()),
                context,
            ));
        }
        walk_expr(self, expr);
    }
}
