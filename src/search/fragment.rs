//! Breadth-first expansion of a seed board into independent fragments
//!
//! Each level fixes one more cell (the frontier) in every queued board,
//! trying every value and keeping only children that stay valid. Since all
//! fragments agree on which cells are empty beyond the frontier, the next
//! frontier is simply the seed's next empty cell. The fragments of a level
//! are mutually exclusive and together cover every branch explored so far.

use crate::board::Board;
use crate::search::config::FragmentConfig;
use tracing::debug;

/// Result of expanding a seed board
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Fragments in generation order
    pub fragments: Vec<Board>,
    /// Number of levels expanded
    pub levels: usize,
    /// Cells fixed by the expansion, in order
    pub frontier_cells: Vec<usize>,
}

/// Expands a seed board into a queue of fragments
#[derive(Debug, Clone, Default)]
pub struct FragmentGenerator {
    config: FragmentConfig,
}

impl FragmentGenerator {
    pub fn new(config: FragmentConfig) -> Self {
        Self { config }
    }

    /// Expand `seed` until the level limit or the target queue size is
    /// reached, or no empty cell is left. An invalid seed has no fragments.
    pub fn expand(&self, seed: &Board) -> Expansion {
        let mut expansion = Expansion {
            fragments: Vec::new(),
            levels: 0,
            frontier_cells: Vec::new(),
        };
        if !seed.is_valid() {
            return expansion;
        }

        let size = seed.size();
        let mut queue = vec![seed.clone()];
        let mut frontier = seed.first_empty_from(0);

        while let Some(index) = frontier {
            if expansion.levels >= self.config.levels
                || queue.len() >= self.config.target_fragments
                || queue.is_empty()
            {
                break;
            }

            let mut next = Vec::with_capacity(queue.len() * size);
            for board in &queue {
                for value in 1..=size as u8 {
                    let mut child = board.clone();
                    child.set(index, value);
                    if child.is_valid() {
                        next.push(child);
                    }
                }
            }

            debug!(
                level = expansion.levels + 1,
                frontier = index,
                fragments = next.len(),
                "expanded fragment level"
            );
            queue = next;
            expansion.levels += 1;
            expansion.frontier_cells.push(index);
            frontier = seed.first_empty_from(index + 1);
        }

        expansion.fragments = queue;
        expansion
    }
}
