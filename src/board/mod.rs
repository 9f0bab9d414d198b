//! Puzzle board representation and validity predicates

pub mod error;
pub mod grid;

pub use error::BoardError;
pub use grid::{Board, EMPTY, MAX_SIZE};
