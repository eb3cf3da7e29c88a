//! Visitor for detecting side effects in Python expressions
//!
//! An assignment's right-hand side that may run arbitrary code cannot be
//! moved past other statements, nor into a branch that might not execute.
//! This visitor answers the conservative question "might evaluating this
//! expression have an observable effect?".

use ruff_python_ast::Expr;
use ruff_python_ast::visitor::{Visitor, walk_expr};

/// Expression visitor that stops at the first possibly effectful node
#[derive(Debug, Default)]
pub struct ExpressionSideEffectDetector {
    has_side_effects: bool,
}

impl ExpressionSideEffectDetector {
    /// Whether evaluating `expr` might have an observable effect
    pub fn check(expr: &Expr) -> bool {
        let mut detector = Self::default();
        detector.visit_expr(expr);
        detector.has_side_effects
    }
}

impl<'a> Visitor<'a> for ExpressionSideEffectDetector {
    fn visit_expr(&mut self, expr: &'a Expr) {
        // Skip if we already found side effects
        if self.has_side_effects {
            return;
        }

        match expr {
            // Attribute and subscript access may run descriptors or __getitem__
            Expr::Call(_)
            | Expr::Attribute(_)
            | Expr::Subscript(_)
            | Expr::Await(_)
            | Expr::Yield(_)
            | Expr::YieldFrom(_)
            | Expr::Lambda(_)
            | Expr::Named(_) => {
                self.has_side_effects = true;
                return;
            }

            // For other expressions, continue walking to check nested expressions
            _ => {}
        }

        walk_expr(self, expr);
    }
}
