//! AST visitor implementations for auto-walrus
//!
//! This module contains the visitors that walk a parsed Python module to
//! discover scopes, name occurrences, string literal extents and
//! side-effecting expressions.

mod name_collector;
mod scope_collector;
mod side_effect_detector;
mod string_literal_collector;

pub use name_collector::NameCollector;
pub use scope_collector::{Scope, ScopeCollector, ScopeRoot};
pub use side_effect_detector::ExpressionSideEffectDetector;
pub use string_literal_collector::StringLiteralCollector;
