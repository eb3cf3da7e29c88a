//! Collects the byte ranges of string-like literals.
//!
//! A `#` inside one of these ranges is text, not a comment. Implicitly
//! concatenated literals contribute one range per part so a comment between
//! two parts is still found.

use std::ops::Range;

use ruff_python_ast::{
    Expr, ModModule,
    visitor::{Visitor, walk_expr},
};
use ruff_text_size::Ranged;

/// Visitor collecting string, bytes, f-string and t-string literal ranges
#[derive(Debug, Default)]
pub struct StringLiteralCollector {
    ranges: Vec<Range<usize>>,
}

impl StringLiteralCollector {
    /// Literal ranges of a module, sorted by start
    pub fn collect(module: &ModModule) -> Vec<Range<usize>> {
        let mut collector = Self::default();
        collector.visit_body(&module.body);
        let mut ranges = collector.ranges;
        ranges.sort_by_key(|range| range.start);
        ranges
    }

    fn push(&mut self, node: &impl Ranged) {
        let range = node.range();
        self.ranges
            .push(range.start().to_usize()..range.end().to_usize());
    }
}

impl<'a> Visitor<'a> for StringLiteralCollector {
    fn visit_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::StringLiteral(string) => {
                for part in string.value.iter() {
                    self.push(part);
                }
            }
            Expr::BytesLiteral(bytes) => {
                for part in bytes.value.iter() {
                    self.push(part);
                }
            }
            Expr::FString(fstring) => {
                for part in fstring.value.iter() {
                    self.push(part);
                }
            }
            // Everything nested in a t-string lies inside its range
            Expr::TString(tstring) => self.push(tstring),
            _ => walk_expr(self, expr),
        }
    }
}
