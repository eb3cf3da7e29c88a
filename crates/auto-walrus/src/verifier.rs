//! Safety verification of candidate pairs
//!
//! A pair is folded only when moving the assignment into the conditional test
//! cannot change what any read of the name, or of the names the assignment
//! depends on, observes. Every check works on source-order ranks from the
//! scope's `ScopeIndex`. A failed check is an expected outcome, not an
//! error: the pair is dropped and the reason is logged at trace level.

use std::fmt;

use log::trace;

use crate::{
    candidates::{
        AssignmentCandidate, CandidatePair, ConditionalCandidate, ConditionalKind,
        ScopeCandidates,
    },
    rewriter::Fold,
    syntax_index::{NameContext, ScopeIndex},
};

/// Why a candidate pair was not folded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The name is tested by more than one conditional in the scope
    AmbiguousConditional,
    /// The name occurs between the assignment and the test
    InterveningUse,
    /// The name is assigned by more than one candidate statement
    MultipleAssignments,
    /// The name occurs before the assignment
    AlreadyBound,
    /// Nothing reads the name after the test
    DeadAfterTest,
    /// A name the value depends on occurs between the assignment and the test
    DependencyReused,
    /// The name occurs outside the block guarded by the test
    UsedOutsideBody,
    /// The value may have effects and the test is not the next statement's `if`.
    /// An effectful value is never moved past another statement, even one
    /// that does not touch the name.
    DeferredSideEffects,
    /// A `while` test would re-evaluate a value that is not a constant
    LoopReevaluation,
    /// One of the pair's occurrences is missing from the scope index
    Unindexed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::AmbiguousConditional => "name is tested by more than one conditional",
            Self::InterveningUse => "name is used between assignment and test",
            Self::MultipleAssignments => "name is assigned more than once",
            Self::AlreadyBound => "name is used before the assignment",
            Self::DeadAfterTest => "name is not used after the test",
            Self::DependencyReused => {
                "a name the value depends on is used between assignment and test"
            }
            Self::UsedOutsideBody => "name is used outside the guarded block",
            Self::DeferredSideEffects => "value may have side effects and would be evaluated later",
            Self::LoopReevaluation => "loop test would re-evaluate a non-constant value",
            Self::Unindexed => "occurrence missing from scope index",
        };
        f.write_str(reason)
    }
}

/// Applies the ordering and aliasing checks to the candidate pairs of one scope
#[derive(Debug)]
pub struct SafetyVerifier<'s, 'a> {
    index: &'s ScopeIndex<'a>,
    candidates: &'s ScopeCandidates<'a>,
}

impl<'s, 'a> SafetyVerifier<'s, 'a> {
    pub fn new(index: &'s ScopeIndex<'a>, candidates: &'s ScopeCandidates<'a>) -> Self {
        Self { index, candidates }
    }

    /// Folds for every pair that passes verification
    pub fn accepted(&self) -> Vec<Fold<'a>> {
        self.candidates
            .pairs()
            .filter_map(|pair| match self.verify(&pair) {
                Ok(()) => Some(pair.fold()),
                Err(rejection) => {
                    trace!(
                        "Not folding {} into test at {}: {rejection}",
                        pair.assignment.target, pair.conditional.occurrence.span.start
                    );
                    None
                }
            })
            .collect()
    }

    /// Check a single pair
    pub fn verify(&self, pair: &CandidatePair<'_, 'a>) -> Result<(), Rejection> {
        let CandidatePair {
            assignment,
            conditional,
        } = *pair;
        let name = assignment.target.name;

        if self.candidates.conditionals_named(name).len() != 1 {
            return Err(Rejection::AmbiguousConditional);
        }

        let (Some(assignment_rank), Some(conditional_rank)) = (
            self.index.rank_of(assignment.target.span.start),
            self.index.rank_of(conditional.occurrence.span.start),
        ) else {
            return Err(Rejection::Unindexed);
        };
        let ranks = self.index.ranks_of(name);

        if ranks
            .iter()
            .any(|&rank| assignment_rank < rank && rank < conditional_rank)
        {
            return Err(Rejection::InterveningUse);
        }

        if self.candidates.assignments_named(name).len() != 1 {
            return Err(Rejection::MultipleAssignments);
        }

        if ranks.first() != Some(&assignment_rank) {
            return Err(Rejection::AlreadyBound);
        }

        if ranks.len() <= 2 {
            return Err(Rejection::DeadAfterTest);
        }

        self.check_dependencies(assignment, assignment_rank, conditional_rank)?;
        self.check_confined(ranks, conditional, assignment_rank, conditional_rank)?;
        Self::check_deferred(assignment, conditional)?;
        self.check_loop(ranks, assignment, conditional, assignment_rank, conditional_rank)
    }

    /// Names read by the value must not be touched before the test
    fn check_dependencies(
        &self,
        assignment: &AssignmentCandidate<'a>,
        assignment_rank: usize,
        conditional_rank: usize,
    ) -> Result<(), Rejection> {
        for related in &assignment.related {
            for &rank in self.index.ranks_of(related.name) {
                if rank <= assignment_rank || rank >= conditional_rank {
                    continue;
                }
                // The value's own occurrences move together with it
                if assignment
                    .target
                    .span
                    .contains(self.index.at_rank(rank).span.start)
                {
                    continue;
                }
                return Err(Rejection::DependencyReused);
            }
        }
        Ok(())
    }

    /// Every other occurrence must lie in the guarded block
    fn check_confined(
        &self,
        ranks: &[usize],
        conditional: &ConditionalCandidate<'a>,
        assignment_rank: usize,
        conditional_rank: usize,
    ) -> Result<(), Rejection> {
        let Some(body) = conditional.body else {
            return Err(Rejection::UsedOutsideBody);
        };
        let outside = ranks
            .iter()
            .filter(|&&rank| rank != assignment_rank && rank != conditional_rank)
            .any(|&rank| !body.contains(self.index.at_rank(rank).span.start));
        if outside {
            return Err(Rejection::UsedOutsideBody);
        }
        Ok(())
    }

    fn check_deferred(
        assignment: &AssignmentCandidate<'a>,
        conditional: &ConditionalCandidate<'a>,
    ) -> Result<(), Rejection> {
        let next_if = conditional.kind == ConditionalKind::If
            && conditional.statement_index == assignment.statement_index + 1;
        if assignment.has_side_effects && !next_if {
            return Err(Rejection::DeferredSideEffects);
        }
        Ok(())
    }

    fn check_loop(
        &self,
        ranks: &[usize],
        assignment: &AssignmentCandidate<'a>,
        conditional: &ConditionalCandidate<'a>,
        assignment_rank: usize,
        conditional_rank: usize,
    ) -> Result<(), Rejection> {
        if conditional.kind != ConditionalKind::While {
            return Ok(());
        }
        let rebound = ranks
            .iter()
            .filter(|&&rank| rank != assignment_rank && rank != conditional_rank)
            .any(|&rank| self.index.at_rank(rank).context != NameContext::Load);
        if !assignment.is_literal || rebound {
            return Err(Rejection::LoopReevaluation);
        }
        Ok(())
    }
}
