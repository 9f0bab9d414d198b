//! Errors raised while constructing or parsing boards

use std::fmt;

/// Reasons a board cannot be built from the given size or cell data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Size is zero, larger than 25, or not a perfect square
    InvalidSize(usize),
    /// Cell data does not hold exactly `size * size` entries
    WrongLength { expected: usize, found: usize },
    /// Text input contained a character that is neither a value nor a separator
    InvalidCharacter(char),
    /// A cell value exceeds the board size
    ValueOutOfRange { index: usize, value: u8, size: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidSize(size) => write!(
                f,
                "Invalid board size {}: must be a perfect square between 1 and 25",
                size
            ),
            BoardError::WrongLength { expected, found } => {
                write!(f, "Expected {} cells, found {}", expected, found)
            }
            BoardError::InvalidCharacter(c) => write!(f, "Invalid cell character: '{}'", c),
            BoardError::ValueOutOfRange { index, value, size } => write!(
                f,
                "Value {} at cell {} is out of range for a {}x{} board",
                value, index, size, size
            ),
        }
    }
}

impl std::error::Error for BoardError {}
