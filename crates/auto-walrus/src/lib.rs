//! Rewrites `name = value` followed by `if name:` into `if (name := value):`.
//!
//! A unit is parsed once; every function scope and the module scope are
//! scanned for candidate pairs, each pair is checked against ordering and
//! aliasing rules, and the survivors are spliced into the original text
//! without touching anything else.

pub mod candidates;
pub mod cli;
pub mod config;
pub mod files;
pub mod locator;
pub mod orchestrator;
pub mod rewriter;
pub mod suppression;
pub mod syntax_index;
pub mod types;
pub mod verifier;
pub mod visitors;

pub use orchestrator::{Outcome, rewrite};
