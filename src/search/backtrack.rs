//! Chronological backtracking over the empty cells of a board
//!
//! The search keeps a stack of empty-cell indices in ascending order. The
//! cell on top of the stack tries values `1..=size` in increasing order and
//! keeps the first one that passes [`Board::is_index_valid`]; the next empty
//! cell is then pushed. When no value fits, the cell is cleared, the stack is
//! popped, and the new top resumes from its previous value plus one. There is
//! no propagation beyond the local validity test.
//!
//! The stepper is resumable: after a solution is returned, calling
//! [`Backtracker::next_solution`] again continues the same search, which is
//! how [`count_solutions`] enumerates.

use crate::board::Board;
use crate::search::cancel::{CancelCheck, NeverCancel};

/// How a search over one board ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A completely and validly filled board
    Solved(Board),
    /// Every possibility was tried without success
    Exhausted,
    /// The cancellation check fired before the search finished
    Aborted,
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    pub fn into_board(self) -> Option<Board> {
        match self {
            SolveOutcome::Solved(board) => Some(board),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Running,
    Done,
}

/// Resumable backtracking search over a single board
#[derive(Debug, Clone)]
pub struct Backtracker {
    board: Board,
    stack: Vec<usize>,
    next_value: u8,
    phase: Phase,
    nodes: u64,
    backtracks: u64,
}

impl Backtracker {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            stack: Vec::new(),
            next_value: 1,
            phase: Phase::Fresh,
            nodes: 0,
            backtracks: 0,
        }
    }

    /// Number of candidate values placed so far
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Number of cells reset while unwinding the stack
    pub fn backtracks(&self) -> u64 {
        self.backtracks
    }

    /// Run until the next solution, exhaustion, or cancellation.
    ///
    /// `cancel` is polled after every rejected candidate and after every pop.
    pub fn next_solution<C: CancelCheck>(&mut self, cancel: &mut C) -> SolveOutcome {
        match self.phase {
            Phase::Done => return SolveOutcome::Exhausted,
            Phase::Fresh => {
                // Fixed cells are never revisited, so a conflict among them
                // would otherwise slip through.
                if !self.board.is_valid() {
                    self.phase = Phase::Done;
                    return SolveOutcome::Exhausted;
                }
                match self.board.first_empty_from(0) {
                    None => {
                        self.phase = Phase::Done;
                        return SolveOutcome::Solved(self.board.clone());
                    }
                    Some(first) => {
                        self.stack.push(first);
                        self.next_value = 1;
                        self.phase = Phase::Running;
                    }
                }
            }
            Phase::Running => {}
        }

        let size = self.board.size();
        loop {
            let top = match self.stack.last() {
                Some(&top) => top,
                None => {
                    self.phase = Phase::Done;
                    return SolveOutcome::Exhausted;
                }
            };

            let mut placed = false;
            while (self.next_value as usize) <= size {
                self.board.set(top, self.next_value);
                self.nodes += 1;
                if self.board.is_index_valid(top) {
                    placed = true;
                    break;
                }
                self.next_value += 1;
                if cancel.is_cancelled() {
                    return SolveOutcome::Aborted;
                }
            }

            if placed {
                match self.board.first_empty_from(top + 1) {
                    None => {
                        self.next_value = self.board.get(top) + 1;
                        return SolveOutcome::Solved(self.board.clone());
                    }
                    Some(next) => {
                        self.stack.push(next);
                        self.next_value = 1;
                    }
                }
            } else {
                self.board.clear(top);
                self.stack.pop();
                self.backtracks += 1;
                if let Some(&previous) = self.stack.last() {
                    self.next_value = self.board.get(previous) + 1;
                }
                if cancel.is_cancelled() {
                    return SolveOutcome::Aborted;
                }
            }
        }
    }
}

/// Search one board for its first solution
pub fn solve<C: CancelCheck>(board: Board, cancel: &mut C) -> SolveOutcome {
    Backtracker::new(board).next_solution(cancel)
}

/// Count solutions of `board`, stopping once `limit` have been seen
pub fn count_solutions(board: &Board, limit: usize) -> usize {
    let mut search = Backtracker::new(board.clone());
    let mut found = 0;
    while found < limit {
        match search.next_solution(&mut NeverCancel) {
            SolveOutcome::Solved(_) => found += 1,
            _ => break,
        }
    }
    found
}
