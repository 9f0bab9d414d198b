//! Random puzzle generation with a unique-solution guarantee
//!
//! 1. Fill the boxes on the main diagonal with shuffled values (they never
//!    constrain each other)
//! 2. Complete the grid with the backtracking solver
//! 3. Remove cells in random order, keeping a removal only while the puzzle
//!    still has exactly one solution

use crate::board::{Board, BoardError};
use crate::search::{NeverCancel, SolveOutcome, count_solutions, solve};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Fewest clues a uniquely solvable puzzle of the given size can have
pub fn minimum_clues(size: usize) -> usize {
    match size {
        4 => 4,
        9 => 17,
        _ => 0,
    }
}

/// Seeded generator of uniquely solvable puzzles
pub struct PuzzleGenerator {
    size: usize,
    rng: ChaCha8Rng,
}

impl PuzzleGenerator {
    /// Create a generator for boards of `size`; `None` seeds from the OS
    pub fn new(size: usize, seed: Option<u64>) -> Result<Self, BoardError> {
        Board::new(size)?;
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Ok(Self { size, rng })
    }

    /// A random, completely filled valid board
    pub fn full_grid(&mut self) -> Result<Board, BoardError> {
        loop {
            let mut board = Board::new(self.size)?;
            let box_size = board.box_size();
            for diagonal in 0..box_size {
                let target_box = diagonal * (box_size + 1);
                let mut values: Vec<u8> = (1..=self.size as u8).collect();
                values.shuffle(&mut self.rng);
                for index in 0..board.len() {
                    if board.box_of(index) == target_box {
                        if let Some(value) = values.pop() {
                            board.set(index, value);
                        }
                    }
                }
            }

            match solve(board, &mut NeverCancel) {
                SolveOutcome::Solved(full) => return Ok(full),
                _ => debug!("diagonal seed had no completion, reshuffling"),
            }
        }
    }

    /// A puzzle with at least `clues` filled cells and exactly one solution.
    ///
    /// Requests below [`minimum_clues`] are raised to it. The result may keep
    /// more clues than asked when no further cell can be removed.
    pub fn generate(&mut self, clues: usize) -> Result<Board, BoardError> {
        let clues = clues.max(minimum_clues(self.size));
        let mut board = self.full_grid()?;

        let mut order: Vec<usize> = (0..board.len()).collect();
        order.shuffle(&mut self.rng);

        let mut filled = board.len();
        for index in order {
            if filled <= clues {
                break;
            }
            let value = board.get(index);
            board.clear(index);
            if count_solutions(&board, 2) == 1 {
                filled -= 1;
            } else {
                board.set(index, value);
            }
        }

        info!(size = self.size, clues = filled, "generated puzzle");
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_size_rejected() {
        assert!(PuzzleGenerator::new(7, Some(1)).is_err());
    }

    #[test]
    fn test_full_grid_is_complete_and_valid() {
        let mut generator = PuzzleGenerator::new(9, Some(7)).unwrap();
        let board = generator.full_grid().unwrap();
        assert!(board.is_complete());
        assert!(board.is_valid());
    }

    #[test]
    fn test_generated_puzzle_is_unique() {
        let mut generator = PuzzleGenerator::new(9, Some(42)).unwrap();
        let puzzle = generator.generate(30).unwrap();
        assert!(puzzle.clue_count() >= 30);
        assert!(puzzle.is_valid());
        assert_eq!(count_solutions(&puzzle, 2), 1);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = PuzzleGenerator::new(9, Some(3)).unwrap().generate(40).unwrap();
        let b = PuzzleGenerator::new(9, Some(3)).unwrap().generate(40).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_minimum_clues_enforced() {
        let mut generator = PuzzleGenerator::new(4, Some(11)).unwrap();
        let puzzle = generator.generate(0).unwrap();
        assert!(puzzle.clue_count() >= 4);
        assert_eq!(count_solutions(&puzzle, 2), 1);
    }
}
