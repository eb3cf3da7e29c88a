//! Shared type definitions for the auto-walrus crate
//!
//! This module contains the position types used by every phase of a rewrite
//! pass (indexing, detection, verification and splicing), kept here to avoid
//! circular dependencies between those components.

use std::{fmt, hash::BuildHasherDefault};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

/// Insertion-ordered map with the Fx hasher
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// A point in a source unit.
///
/// Lines are 1-indexed, columns are 0-indexed byte offsets into the line.
/// The derived ordering is source order: by line, then by column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open stretch of source between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether the span starts and ends on the same line
    pub const fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Whether `position` falls inside the span
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
