//! Distributed backtracking search for grid constraint puzzles.
//!
//! A master thread expands a seed board into independent fragments and
//! streams them to a pool of workers on demand. The first worker to complete
//! the board wins; every other worker is then cancelled through a
//! token/acknowledgment handshake before the next run begins.

pub mod board;
pub mod cluster;
pub mod puzzle;
pub mod search;
