//! Position-preserving text rewrite
//!
//! Rewriting runs in two phases. Planning walks the accepted folds from the
//! bottom of the unit upward and turns each one into splices computed
//! against the original text; nothing is mutated while planning. Applying
//! then edits a line buffer in strictly decreasing `(line, column)` order,
//! so no splice can shift a position another splice still refers to.

use std::fmt;

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{locator::Locator, suppression::CommentDetector, types::Span};

/// Characters that already delimit an expression on both sides
const SEPARATORS: [char; 4] = ['(', ')', ',', ':'];

/// An accepted pair, reduced to what the text rewrite needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold<'a> {
    pub name: &'a str,
    /// From the assignment target to the end of its statement
    pub assignment: Span,
    /// The name inside the conditional test
    pub conditional: Span,
}

/// Why an accepted fold was left out of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    MultiLineAssignment,
    AmbiguousOperator,
    LineTooLong { width: usize },
    Suppressed,
    Unaddressable,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultiLineAssignment => f.write_str("assignment spans several lines"),
            Self::AmbiguousOperator => f.write_str("statement has more than one `=`"),
            Self::LineTooLong { width } => write!(f, "rewritten line would be {width} wide"),
            Self::Suppressed => f.write_str("line carries a comment"),
            Self::Unaddressable => f.write_str("span does not match the line text"),
        }
    }
}

/// Replace `start..end` of a 1-indexed line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Splice {
    line: usize,
    start: usize,
    end: usize,
    replacement: String,
}

/// Edits computed for a whole unit before anything is applied
#[derive(Debug, Default)]
struct Plan {
    splices: Vec<Splice>,
    /// Lines that lost an assignment and are dropped if nothing but whitespace remains
    removals: FxHashSet<usize>,
    /// Character width of each line with a planned walrus
    widths: FxHashMap<usize, usize>,
}

/// Applies accepted folds to the text of one source unit
#[derive(Debug)]
pub struct RewriteEngine<'r, 'a> {
    locator: &'r Locator<'a>,
    comments: &'r CommentDetector,
    max_line_length: usize,
}

impl<'r, 'a> RewriteEngine<'r, 'a> {
    pub fn new(
        locator: &'r Locator<'a>,
        comments: &'r CommentDetector,
        max_line_length: usize,
    ) -> Self {
        Self {
            locator,
            comments,
            max_line_length,
        }
    }

    /// Rewrite the unit, returning its full new text
    pub fn rewrite(&self, mut folds: Vec<Fold<'_>>) -> String {
        folds.sort_by(|left, right| right.conditional.start.cmp(&left.conditional.start));

        let mut plan = Plan::default();
        for fold in &folds {
            if let Err(skip) = self.plan_fold(fold, &mut plan) {
                trace!(
                    "Skipping fold of `{}` into {}: {skip}",
                    fold.name, fold.conditional.start
                );
            }
        }

        self.apply(plan)
    }

    fn plan_fold(&self, fold: &Fold<'_>, plan: &mut Plan) -> Result<(), Skip> {
        let assignment = fold.assignment;
        if !assignment.is_single_line() {
            return Err(Skip::MultiLineAssignment);
        }

        let assignment_line = self.locator.line(assignment.start.line);
        let statement = assignment_line
            .get(assignment.start.column..assignment.end.column)
            .ok_or(Skip::Unaddressable)?;
        if statement.matches('=').count() > 1 {
            return Err(Skip::AmbiguousOperator);
        }

        let conditional = fold.conditional;
        let conditional_line = self.locator.line(conditional.start.line);
        let (Some(left), Some(right)) = (
            conditional_line.get(..conditional.start.column),
            conditional_line.get(conditional.end.column..),
        ) else {
            return Err(Skip::Unaddressable);
        };

        let walrus = statement.replacen('=', ":=", 1);
        let replacement = if left.ends_with(SEPARATORS) && right.starts_with(SEPARATORS) {
            walrus
        } else {
            format!("({walrus})")
        };

        let width = plan
            .widths
            .get(&conditional.start.line)
            .copied()
            .unwrap_or_else(|| conditional_line.chars().count())
            + replacement.chars().count()
            - fold.name.chars().count();
        if width > self.max_line_length {
            return Err(Skip::LineTooLong { width });
        }

        if self.comments.line_has_comment(assignment.start.line)
            || self.comments.line_has_comment(conditional.start.line)
        {
            return Err(Skip::Suppressed);
        }

        let trailing = &assignment_line[assignment.end.column..];
        plan.widths.insert(conditional.start.line, width);
        plan.removals.insert(assignment.start.line);
        plan.splices.push(Splice {
            line: assignment.start.line,
            start: assignment.start.column,
            end: assignment.end.column + separator_len(trailing),
            replacement: String::new(),
        });
        plan.splices.push(Splice {
            line: conditional.start.line,
            start: conditional.start.column,
            end: conditional.end.column,
            replacement,
        });
        Ok(())
    }

    fn apply(&self, plan: Plan) -> String {
        let Plan {
            mut splices,
            removals,
            ..
        } = plan;

        let mut lines: Vec<String> = self
            .locator
            .lines()
            .map(|(text, _)| text.to_owned())
            .collect();

        splices.sort_by(|left, right| (right.line, right.start).cmp(&(left.line, left.start)));
        for splice in splices {
            if let Some(text) = lines.get_mut(splice.line - 1) {
                text.replace_range(splice.start..splice.end, &splice.replacement);
            }
        }

        let mut output = String::with_capacity(self.locator.source().len());
        for (index, (text, (_, terminator))) in lines.iter().zip(self.locator.lines()).enumerate() {
            if removals.contains(&(index + 1)) && text.trim().is_empty() {
                continue;
            }
            output.push_str(text);
            output.push_str(terminator);
        }
        output
    }
}

/// Length of a `;` separator (with surrounding blanks) that opens `rest`
fn separator_len(rest: &str) -> usize {
    let blanks = [' ', '\t'];
    rest.trim_start_matches(blanks)
        .strip_prefix(';')
        .map_or(0, |after| rest.len() - after.trim_start_matches(blanks).len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ruff_python_parser::parse_module;

    use super::*;
    use crate::types::Position;

    fn fold(name: &str, assignment: (usize, usize, usize), conditional: (usize, usize)) -> Fold<'_> {
        let (line, start, end) = assignment;
        Fold {
            name,
            assignment: Span::new(Position::new(line, start), Position::new(line, end)),
            conditional: Span::new(
                Position::new(conditional.0, conditional.1),
                Position::new(conditional.0, conditional.1 + name.len()),
            ),
        }
    }

    fn run(source: &str, folds: Vec<Fold<'_>>, max_line_length: usize) -> String {
        let parsed = parse_module(source).expect("Failed to parse");
        let locator = Locator::new(source);
        let comments = CommentDetector::new(parsed.syntax(), &locator);
        RewriteEngine::new(&locator, &comments, max_line_length).rewrite(folds)
    }

    #[test]
    fn test_wraps_bare_name_in_parentheses() {
        let source = "a = 0\nif a > 3:\n    print(a)\n";
        let output = run(source, vec![fold("a", (1, 0, 5), (2, 3))], 88);
        assert_eq!(output, "if (a := 0) > 3:\n    print(a)\n");
    }

    #[test]
    fn test_reuses_existing_parentheses() {
        let source = "a = 0\nif (a):\n    print(a)\n";
        let output = run(source, vec![fold("a", (1, 0, 5), (2, 4))], 88);
        assert_eq!(output, "if (a := 0):\n    print(a)\n");
    }

    #[test]
    fn test_line_length_boundary() {
        let source = "def f():\n    a = 0\n    if a:\n        print(a)\n";
        let folds = || vec![fold("a", (2, 4, 9), (3, 7))];
        assert_eq!(
            run(source, folds(), 16),
            "def f():\n    if (a := 0):\n        print(a)\n"
        );
        assert_eq!(run(source, folds(), 15), source);
    }

    #[test]
    fn test_comment_on_either_line_suppresses() {
        let source = "a = 0  # no-walrus\nif a:\n    print(a)\n";
        assert_eq!(run(source, vec![fold("a", (1, 0, 5), (2, 3))], 88), source);

        let source = "a = 0\nif a:  # keep\n    print(a)\n";
        assert_eq!(run(source, vec![fold("a", (1, 0, 5), (2, 3))], 88), source);
    }

    #[test]
    fn test_statement_with_second_equals_is_skipped() {
        let source = "a = (b==True)\nif a:\n    print(a)\n";
        assert_eq!(run(source, vec![fold("a", (1, 0, 13), (2, 3))], 88), source);
    }

    #[test]
    fn test_semicolon_separated_statements() {
        let source = "a = 0; b = 1\nif a:\n    print(a, b)\n";
        assert_eq!(
            run(source, vec![fold("a", (1, 0, 5), (2, 3))], 88),
            "b = 1\nif (a := 0):\n    print(a, b)\n"
        );

        let source = "b = 0; a = 0\nif a:\n    print(a)\n";
        assert_eq!(
            run(source, vec![fold("a", (1, 7, 12), (2, 3))], 88),
            "b = 0; \nif (a := 0):\n    print(a)\n"
        );
    }

    #[test]
    fn test_two_folds_on_one_line() {
        let source = "a = 0\nb = 1\nif a > b:\n    print(a, b)\n";
        let folds = vec![fold("a", (1, 0, 5), (3, 3)), fold("b", (2, 0, 5), (3, 7))];
        assert_eq!(
            run(source, folds.clone(), 88),
            "if (a := 0) > (b := 1):\n    print(a, b)\n"
        );
        // The second fold no longer fits once the first has grown the line
        assert_eq!(
            run(source, folds, 18),
            "a = 0\nif a > (b := 1):\n    print(a, b)\n"
        );
    }

    #[test]
    fn test_line_endings_are_preserved() {
        let source = "a = 0\r\nif a:\r\n    print(a)";
        assert_eq!(
            run(source, vec![fold("a", (1, 0, 5), (2, 3))], 88),
            "if (a := 0):\r\n    print(a)"
        );
    }

    #[test]
    fn test_separator_len() {
        assert_eq!(separator_len(""), 0);
        assert_eq!(separator_len("  # note"), 0);
        assert_eq!(separator_len("; b = 1"), 2);
        assert_eq!(separator_len(" ;\tb"), 3);
        assert_eq!(separator_len(";"), 1);
    }
}
