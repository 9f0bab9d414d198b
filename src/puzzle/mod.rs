//! Seed puzzle supply for the cluster

pub mod generator;

pub use generator::{PuzzleGenerator, minimum_clues};
