//! Comment-based suppression of folds
//!
//! Any comment on the assignment's line or on the test's line keeps the pair
//! as written, so `# no-walrus` (or any other note the author left there) is
//! never moved or orphaned. A `#` inside a string literal is not a comment.

use std::ops::Range;

use ruff_python_ast::ModModule;
use rustc_hash::FxHashSet;

use crate::{locator::Locator, visitors::StringLiteralCollector};

/// Lines of a source unit that carry a comment
#[derive(Debug, Default)]
pub struct CommentDetector {
    commented: FxHashSet<usize>,
}

impl CommentDetector {
    pub fn new(module: &ModModule, locator: &Locator) -> Self {
        let strings = StringLiteralCollector::collect(module);
        let commented = locator
            .lines()
            .enumerate()
            .filter_map(|(index, (text, _))| {
                let line = index + 1;
                let offset = locator.line_offset(line);
                text.match_indices('#')
                    .any(|(column, _)| !in_string(&strings, offset + column))
                    .then_some(line)
            })
            .collect();
        Self { commented }
    }

    /// Whether a 1-indexed line carries a comment
    pub fn line_has_comment(&self, line: usize) -> bool {
        self.commented.contains(&line)
    }
}

/// `strings` is sorted by start and its ranges do not overlap
fn in_string(strings: &[Range<usize>], offset: usize) -> bool {
    strings
        .partition_point(|range| range.start <= offset)
        .checked_sub(1)
        .is_some_and(|index| strings[index].contains(&offset))
}
