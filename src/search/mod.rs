//! Search over puzzle boards
//!
//! This module provides the two pure building blocks the cluster distributes:
//! - Backtracking: exhaustive, cancellable chronological search over one board
//! - Fragments: breadth-first expansion of a seed into independent sub-boards

pub mod backtrack;
pub mod cancel;
pub mod config;
pub mod fragment;

pub use backtrack::{Backtracker, SolveOutcome, count_solutions, solve};
pub use cancel::{CancelCheck, NeverCancel};
pub use config::FragmentConfig;
pub use fragment::{Expansion, FragmentGenerator};
