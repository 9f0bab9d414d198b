//! Flat grid board with row, column and box validity checks
//!
//! A board of size `n` stores `n * n` cells in row-major order. Every cell
//! holds a value in `1..=n` or [`EMPTY`]. The box size is the integer square
//! root of `n`, so a 9x9 board has nine 3x3 boxes.

use crate::board::error::BoardError;
use std::fmt;
use std::str::FromStr;

/// Sentinel stored in cells that have no value yet
pub const EMPTY: u8 = 0;

/// Largest supported side length (values must fit one text character)
pub const MAX_SIZE: usize = 25;

/// A puzzle grid. Boards are plain values: they are cloned when handed to
/// another component, never shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    box_size: usize,
    cells: Vec<u8>,
}

impl Board {
    /// Create an empty board of the given side length
    pub fn new(size: usize) -> Result<Self, BoardError> {
        let box_size = box_size_for(size)?;
        Ok(Self {
            size,
            box_size,
            cells: vec![EMPTY; size * size],
        })
    }

    /// Create a board from row-major cell values (`EMPTY` for blanks)
    pub fn from_cells(size: usize, cells: Vec<u8>) -> Result<Self, BoardError> {
        let box_size = box_size_for(size)?;
        if cells.len() != size * size {
            return Err(BoardError::WrongLength {
                expected: size * size,
                found: cells.len(),
            });
        }
        if let Some((index, &value)) = cells
            .iter()
            .enumerate()
            .find(|(_, &v)| v as usize > size)
        {
            return Err(BoardError::ValueOutOfRange { index, value, size });
        }
        Ok(Self {
            size,
            box_size,
            cells,
        })
    }

    /// The fixed 9x9 reference puzzle (38 clues, unique solution)
    pub fn sample() -> Self {
        #[rustfmt::skip]
        const CLUES: [(usize, u8); 38] = [
            (0, 3), (5, 9), (6, 1), (7, 7), (8, 8),
            (11, 6), (12, 1), (13, 5), (15, 9), (16, 4),
            (19, 9), (20, 1), (21, 3), (24, 6), (25, 5),
            (27, 9), (32, 5), (34, 2),
            (36, 6), (39, 2), (40, 4), (42, 5),
            (47, 4), (51, 3),
            (55, 7), (58, 8), (59, 6), (60, 2),
            (63, 1), (64, 6), (66, 4), (68, 7), (69, 8), (70, 9),
            (72, 5), (77, 2), (78, 4), (80, 7),
        ];
        let mut cells = vec![EMPTY; 81];
        for (index, value) in CLUES {
            cells[index] = value;
        }
        Self {
            size: 9,
            box_size: 3,
            cells,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn box_size(&self) -> usize {
        self.box_size
    }

    /// Number of cells (`size * size`)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> u8 {
        self.cells[index]
    }

    pub fn set(&mut self, index: usize, value: u8) {
        debug_assert!(value as usize <= self.size);
        self.cells[index] = value;
    }

    pub fn clear(&mut self, index: usize) {
        self.cells[index] = EMPTY;
    }

    pub fn is_cell_empty(&self, index: usize) -> bool {
        self.cells[index] == EMPTY
    }

    pub fn row(&self, index: usize) -> usize {
        index / self.size
    }

    pub fn column(&self, index: usize) -> usize {
        index % self.size
    }

    pub fn box_of(&self, index: usize) -> usize {
        (index % self.size) / self.box_size + self.box_size * (index / (self.size * self.box_size))
    }

    /// Number of filled cells
    pub fn clue_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != EMPTY).count()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|&v| v != EMPTY)
    }

    /// First empty cell at or after `start`
    pub fn first_empty_from(&self, start: usize) -> Option<usize> {
        (start..self.cells.len()).find(|&i| self.cells[i] == EMPTY)
    }

    /// Check the value at `index` against its row, column and box.
    ///
    /// Empty cells are always valid. Only the O(size) neighbourhood of the
    /// cell is inspected.
    pub fn is_index_valid(&self, index: usize) -> bool {
        let value = self.cells[index];
        if value == EMPTY {
            return true;
        }
        let n = self.size;
        let total = self.cells.len();

        // Row: step through the other cells of the row, wrapping inside it
        let row_base = n * self.row(index);
        let mut j = (index + 1) % n + row_base;
        while j != index {
            if self.cells[j] == value {
                return false;
            }
            j = (j + 1) % n + row_base;
        }

        // Column: step by n, wrapping over the whole board
        let mut j = (index + n) % total;
        while j != index {
            if self.cells[j] == value {
                return false;
            }
            j = (j + n) % total;
        }

        // Box: every box mate lies within this window
        let reach = n * self.box_size + self.box_size;
        let start = index.saturating_sub(reach);
        let end = (index + reach).min(total - 1);
        let current_box = self.box_of(index);
        for j in start..=end {
            if j != index && self.cells[j] == value && self.box_of(j) == current_box {
                return false;
            }
        }

        true
    }

    /// Board-wide validity: every filled cell passes [`Board::is_index_valid`]
    pub fn is_valid(&self) -> bool {
        (0..self.cells.len()).all(|i| self.is_index_valid(i))
    }
}

fn box_size_for(size: usize) -> Result<usize, BoardError> {
    if size == 0 || size > MAX_SIZE {
        return Err(BoardError::InvalidSize(size));
    }
    let root = (1..=size).find(|r| r * r >= size).unwrap_or(size);
    if root * root != size {
        return Err(BoardError::InvalidSize(size));
    }
    Ok(root)
}

/// Cell count of the smallest supported board that holds `found` cells
fn nearest_length(found: usize) -> usize {
    (1..=MAX_SIZE)
        .filter(|&size| box_size_for(size).is_ok())
        .map(|size| size * size)
        .find(|&length| length >= found)
        .unwrap_or(MAX_SIZE * MAX_SIZE)
}

fn value_char(value: u8) -> char {
    match value {
        EMPTY => '.',
        1..=9 => (b'0' + value) as char,
        _ => (b'A' + value - 10) as char,
    }
}

fn char_value(c: char) -> Result<u8, BoardError> {
    match c {
        '.' | '0' | '*' => Ok(EMPTY),
        '1'..='9' => Ok(c as u8 - b'0'),
        'A'..='P' => Ok(c as u8 - b'A' + 10),
        'a'..='p' => Ok(c as u8 - b'a' + 10),
        _ => Err(BoardError::InvalidCharacter(c)),
    }
}

/// Boxed grid rendering; `{:#}` gives the single-line text form instead.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            for &value in &self.cells {
                write!(f, "{}", value_char(value))?;
            }
            return Ok(());
        }

        let rule = "=".repeat(self.size * 2 + self.box_size);
        writeln!(f, " {}", rule)?;
        for row in 0..self.size {
            for column in 0..self.size {
                if column % self.box_size == 0 {
                    write!(f, "|")?;
                }
                match self.cells[row * self.size + column] {
                    EMPTY => write!(f, "|*")?,
                    value => write!(f, "|{}", value_char(value))?,
                }
            }
            writeln!(f, "||")?;
            if (row + 1) % self.box_size == 0 {
                writeln!(f, " {}", rule)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells = s
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(*c, '|' | '-' | '+' | '='))
            .map(char_value)
            .collect::<Result<Vec<_>, _>>()?;

        let found = cells.len();
        let size = (1..=MAX_SIZE)
            .find(|s| s * s == found)
            .ok_or(BoardError::WrongLength {
                expected: nearest_length(found),
                found,
            })?;

        Board::from_cells(size, cells)
    }
}
