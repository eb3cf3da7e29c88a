//! Name occurrence indexing for a single scope.
//!
//! This module turns the name expressions of a parsed subtree into
//! `Occurrence`s and orders them once, up front, per scope. The resulting
//! `ScopeIndex` enables:
//! - Stable occurrence ids assigned at insertion
//! - Source-order ranks looked up by binary search on `(line, column)`
//! - Per-name rank lists shared by every verification rule

use std::fmt;

use ruff_python_ast::Expr;
use rustc_hash::FxHashMap;

use crate::{
    locator::Locator,
    types::{Position, Span},
    visitors::{NameCollector, Scope, ScopeRoot},
};

/// Expression context a name occurs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameContext {
    Load,
    Store,
    Del,
}

/// One name expression and where it sits in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence<'a> {
    pub name: &'a str,
    pub span: Span,
    pub context: NameContext,
}

impl<'a> Occurrence<'a> {
    pub const fn new(name: &'a str, span: Span, context: NameContext) -> Self {
        Self {
            name,
            span,
            context,
        }
    }

    /// The same occurrence with its end moved, e.g. to the end of the enclosing statement
    #[must_use]
    pub const fn with_end(self, end: Position) -> Self {
        Self {
            span: Span::new(self.span.start, end),
            ..self
        }
    }
}

impl fmt::Display for Occurrence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` at {}", self.name, self.span.start)
    }
}

/// Stable id of an occurrence within its `ScopeIndex` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceId(u32);

impl OccurrenceId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Produces occurrence sets for arbitrary subtrees of one parsed unit
#[derive(Debug, Clone, Copy)]
pub struct SyntaxIndex<'a, 'l> {
    locator: &'l Locator<'a>,
}

impl<'a, 'l> SyntaxIndex<'a, 'l> {
    pub fn new(locator: &'l Locator<'a>) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &'l Locator<'a> {
        self.locator
    }

    /// All occurrences inside an expression
    pub fn expr_occurrences(&self, expr: &'a Expr) -> Vec<Occurrence<'a>> {
        NameCollector::collect_expr(self.locator, expr)
    }

    /// Build the ordered index of every occurrence in a scope's full subtree
    pub fn scope_index(&self, scope: &Scope<'a>) -> ScopeIndex<'a> {
        let occurrences = match scope.root {
            ScopeRoot::Module(module) => NameCollector::collect_body(self.locator, &module.body),
            ScopeRoot::Function(stmt, _) => NameCollector::collect_stmt(self.locator, stmt),
        };
        ScopeIndex::new(occurrences)
    }
}

/// Occurrences of one scope, sorted once into source order
#[derive(Debug, Default)]
pub struct ScopeIndex<'a> {
    /// Occurrences in insertion order; `OccurrenceId` indexes this arena
    arena: Vec<Occurrence<'a>>,
    /// Arena ids sorted by start position; the position in this vector is the rank
    order: Vec<OccurrenceId>,
    /// Ranks of every occurrence of a name, ascending
    ranks_by_name: FxHashMap<&'a str, Vec<usize>>,
}

impl<'a> ScopeIndex<'a> {
    pub fn new(arena: Vec<Occurrence<'a>>) -> Self {
        let mut order: Vec<OccurrenceId> = (0..arena.len())
            .map(|index| OccurrenceId(index as u32))
            .collect();
        order.sort_by_key(|id| arena[id.index()].span.start);

        let mut ranks_by_name: FxHashMap<&'a str, Vec<usize>> = FxHashMap::default();
        for (rank, id) in order.iter().enumerate() {
            ranks_by_name
                .entry(arena[id.index()].name)
                .or_default()
                .push(rank);
        }

        Self {
            arena,
            order,
            ranks_by_name,
        }
    }

    /// Source-order rank of the occurrence starting at `start`
    pub fn rank_of(&self, start: Position) -> Option<usize> {
        self.order
            .binary_search_by_key(&start, |id| self.arena[id.index()].span.start)
            .ok()
    }

    /// Occurrence holding a given rank
    pub fn at_rank(&self, rank: usize) -> &Occurrence<'a> {
        &self.arena[self.order[rank].index()]
    }

    /// Ranks of every occurrence of `name`, ascending
    pub fn ranks_of(&self, name: &str) -> &[usize] {
        self.ranks_by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
