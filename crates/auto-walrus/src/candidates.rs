//! Candidate detection for assignment folding
//!
//! Scans the direct statements of one scope for single-name assignments and
//! for names tested by `if` / `elif` / `while` statements whose test has a
//! simple shape. Assignments and conditional tests sharing a name form the
//! candidate pairs handed to the safety verifier.

use ruff_python_ast::{Expr, ExprName, Stmt, StmtAssign, StmtIf, StmtWhile};
use ruff_text_size::Ranged;

use crate::{
    rewriter::Fold,
    syntax_index::{NameContext, Occurrence, SyntaxIndex},
    types::{FxIndexMap, Span},
    visitors::ExpressionSideEffectDetector,
};

/// Operand shape inside a conditional test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Name,
    Literal,
    Other,
}

impl Operand {
    fn classify(expr: &Expr) -> Self {
        match expr {
            Expr::Name(_) => Self::Name,
            Expr::NumberLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BytesLiteral(_)
            | Expr::BooleanLiteral(_)
            | Expr::NoneLiteral(_)
            | Expr::EllipsisLiteral(_) => Self::Literal,
            _ => Self::Other,
        }
    }

    const fn is_simple(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Whether a test is a bare name or literal, or a comparison of those
pub fn is_simple_test(test: &Expr) -> bool {
    match test {
        Expr::Compare(compare) => {
            Operand::classify(&compare.left).is_simple()
                && compare
                    .comparators
                    .iter()
                    .all(|comparator| Operand::classify(comparator).is_simple())
        }
        _ => Operand::classify(test).is_simple(),
    }
}

/// Whether `value` can stand as the right-hand side of `name := value`.
///
/// A bare tuple would lose its elements after the first to the enclosing
/// test, and `yield` or a starred item is not allowed there at all.
fn is_walrus_value(value: &Expr) -> bool {
    match value {
        Expr::Tuple(tuple) => tuple.parenthesized,
        Expr::Yield(_) | Expr::YieldFrom(_) | Expr::Starred(_) => false,
        _ => true,
    }
}

/// The statement kinds detection cares about; everything else is `Other`
enum ScopeStatement<'a> {
    Assign {
        statement: &'a StmtAssign,
        target: &'a ExprName,
    },
    If(&'a StmtIf),
    While(&'a StmtWhile),
    Other,
}

impl<'a> ScopeStatement<'a> {
    fn classify(stmt: &'a Stmt) -> Self {
        match stmt {
            Stmt::Assign(assign) => match assign.targets.as_slice() {
                [Expr::Name(target)] => Self::Assign {
                    statement: assign,
                    target,
                },
                _ => Self::Other,
            },
            Stmt::If(if_stmt) => Self::If(if_stmt),
            Stmt::While(while_stmt) => Self::While(while_stmt),
            _ => Self::Other,
        }
    }
}

/// Which clause a conditional test belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    /// The primary test of an `if` statement
    If,
    Elif,
    While,
}

/// Target of a single-name assignment, widened to the whole statement
#[derive(Debug, Clone)]
pub struct AssignmentCandidate<'a> {
    /// Target occurrence whose span ends where the statement ends
    pub target: Occurrence<'a>,
    /// Every occurrence in the right-hand side
    pub related: Vec<Occurrence<'a>>,
    /// Evaluating the right-hand side may run arbitrary code
    pub has_side_effects: bool,
    /// The right-hand side is a single literal
    pub is_literal: bool,
    /// Position of the statement in the scope body
    pub statement_index: usize,
}

/// A name inside a simple conditional test
#[derive(Debug, Clone)]
pub struct ConditionalCandidate<'a> {
    pub occurrence: Occurrence<'a>,
    pub kind: ConditionalKind,
    /// Extent of the block guarded by this test
    pub body: Option<Span>,
    /// Position of the owning statement in the scope body
    pub statement_index: usize,
}

/// An assignment and a conditional test naming the same variable
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'c, 'a> {
    pub assignment: &'c AssignmentCandidate<'a>,
    pub conditional: &'c ConditionalCandidate<'a>,
}

impl<'a> CandidatePair<'_, 'a> {
    pub fn fold(&self) -> Fold<'a> {
        Fold {
            name: self.assignment.target.name,
            assignment: self.assignment.target.span,
            conditional: self.conditional.occurrence.span,
        }
    }
}

/// Candidates of one scope, grouped by name in source order
#[derive(Debug, Default)]
pub struct ScopeCandidates<'a> {
    assignments: FxIndexMap<&'a str, Vec<AssignmentCandidate<'a>>>,
    conditionals: FxIndexMap<&'a str, Vec<ConditionalCandidate<'a>>>,
}

impl<'a> ScopeCandidates<'a> {
    pub fn assignments_named(&self, name: &str) -> &[AssignmentCandidate<'a>] {
        self.assignments
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn conditionals_named(&self, name: &str) -> &[ConditionalCandidate<'a>] {
        self.conditionals
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }

    pub fn conditional_count(&self) -> usize {
        self.conditionals.values().map(Vec::len).sum()
    }

    /// Every assignment/conditional combination sharing a name
    pub fn pairs(&self) -> impl Iterator<Item = CandidatePair<'_, 'a>> + '_ {
        self.assignments.iter().flat_map(move |(name, assignments)| {
            let conditionals = self.conditionals_named(name);
            assignments.iter().flat_map(move |assignment| {
                conditionals
                    .iter()
                    .map(move |conditional| CandidatePair {
                        assignment,
                        conditional,
                    })
            })
        })
    }
}

/// Finds assignment and conditional candidates among a scope's direct statements
#[derive(Debug, Clone, Copy)]
pub struct CandidateDetector<'a, 'l> {
    index: SyntaxIndex<'a, 'l>,
}

impl<'a, 'l> CandidateDetector<'a, 'l> {
    pub fn new(index: SyntaxIndex<'a, 'l>) -> Self {
        Self { index }
    }

    /// Detect candidates in a scope body; nested blocks are not scanned
    pub fn detect(&self, body: &'a [Stmt]) -> ScopeCandidates<'a> {
        let mut candidates = ScopeCandidates::default();

        for (statement_index, stmt) in body.iter().enumerate() {
            match ScopeStatement::classify(stmt) {
                ScopeStatement::Assign { statement, target } => {
                    if let Some(assignment) =
                        self.assignment(statement, target, statement_index)
                    {
                        candidates
                            .assignments
                            .entry(assignment.target.name)
                            .or_default()
                            .push(assignment);
                    }
                }
                ScopeStatement::If(if_stmt) => {
                    if is_simple_test(&if_stmt.test) {
                        self.add_conditionals(
                            &mut candidates,
                            &if_stmt.test,
                            &if_stmt.body,
                            ConditionalKind::If,
                            statement_index,
                        );
                    }
                    // Elif tests are scanned even when the primary test is not simple
                    for clause in &if_stmt.elif_else_clauses {
                        let Some(test) = &clause.test else {
                            continue;
                        };
                        if is_simple_test(test) {
                            self.add_conditionals(
                                &mut candidates,
                                test,
                                &clause.body,
                                ConditionalKind::Elif,
                                statement_index,
                            );
                        }
                    }
                }
                ScopeStatement::While(while_stmt) => {
                    if is_simple_test(&while_stmt.test) {
                        self.add_conditionals(
                            &mut candidates,
                            &while_stmt.test,
                            &while_stmt.body,
                            ConditionalKind::While,
                            statement_index,
                        );
                    }
                }
                ScopeStatement::Other => {}
            }
        }

        candidates
    }

    fn assignment(
        &self,
        statement: &'a StmtAssign,
        target: &'a ExprName,
        statement_index: usize,
    ) -> Option<AssignmentCandidate<'a>> {
        let locator = self.index.locator();
        let statement_span = locator.span(statement.range());
        let target_span = locator.span(target.range());

        // A parenthesized target does not start the statement text
        if target_span.start != statement_span.start || !is_walrus_value(&statement.value) {
            return None;
        }

        let target = Occurrence::new(target.id.as_str(), target_span, NameContext::Store)
            .with_end(statement_span.end);

        Some(AssignmentCandidate {
            target,
            related: self.index.expr_occurrences(&statement.value),
            has_side_effects: ExpressionSideEffectDetector::check(&statement.value),
            is_literal: Operand::classify(&statement.value) == Operand::Literal,
            statement_index,
        })
    }

    fn add_conditionals(
        &self,
        candidates: &mut ScopeCandidates<'a>,
        test: &'a Expr,
        body: &'a [Stmt],
        kind: ConditionalKind,
        statement_index: usize,
    ) {
        let body = self.body_span(body);
        let mut occurrences = self.index.expr_occurrences(test);
        occurrences.sort_by_key(|occurrence| occurrence.span.start);

        for occurrence in occurrences {
            candidates
                .conditionals
                .entry(occurrence.name)
                .or_default()
                .push(ConditionalCandidate {
                    occurrence,
                    kind,
                    body,
                    statement_index,
                });
        }
    }

    fn body_span(&self, body: &[Stmt]) -> Option<Span> {
        let (first, last) = (body.first()?, body.last()?);
        let locator = self.index.locator();
        Some(Span::new(
            locator.position(first.start()),
            locator.position(last.end()),
        ))
    }
}
