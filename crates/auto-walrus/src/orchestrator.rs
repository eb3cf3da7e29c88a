//! Per-unit pipeline: parse, detect, verify, rewrite.

use log::debug;
use ruff_python_parser::parse_module;

use crate::{
    candidates::CandidateDetector,
    locator::Locator,
    rewriter::RewriteEngine,
    suppression::CommentDetector,
    syntax_index::SyntaxIndex,
    verifier::SafetyVerifier,
    visitors::ScopeCollector,
};

/// Result of rewriting one source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing could be folded; the input stands as is
    Unchanged,
    /// The full new text of the unit
    Changed(String),
    /// The unit is not valid Python; carries the parser's message
    ParseFailed(String),
}

impl Outcome {
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// Fold every safe `name = value` / `if name:` pair of `source` into an
/// assignment expression, keeping rewritten lines within `max_line_length`
/// characters.
///
/// Never fails: invalid input yields [`Outcome::ParseFailed`], and pairs
/// that cannot be folded safely are left untouched.
pub fn rewrite(source: &str, max_line_length: usize) -> Outcome {
    let parsed = match parse_module(source) {
        Ok(parsed) => parsed,
        Err(err) => return Outcome::ParseFailed(err.to_string()),
    };
    let module = parsed.syntax();
    let locator = Locator::new(source);
    let syntax_index = SyntaxIndex::new(&locator);
    let detector = CandidateDetector::new(syntax_index);

    let mut folds = Vec::new();
    for scope in ScopeCollector::collect(module) {
        let candidates = detector.detect(scope.body());
        if candidates.assignment_count() == 0 || candidates.conditional_count() == 0 {
            continue;
        }

        let index = syntax_index.scope_index(&scope);
        let accepted = SafetyVerifier::new(&index, &candidates).accepted();
        debug!(
            "Scope `{}`: {} assignments, {} conditional names, {} accepted",
            scope.name(),
            candidates.assignment_count(),
            candidates.conditional_count(),
            accepted.len()
        );
        folds.extend(accepted);
    }

    if folds.is_empty() {
        return Outcome::Unchanged;
    }

    let comments = CommentDetector::new(module, &locator);
    let rewritten = RewriteEngine::new(&locator, &comments, max_line_length).rewrite(folds);
    if rewritten == source {
        Outcome::Unchanged
    } else {
        Outcome::Changed(rewritten)
    }
}
