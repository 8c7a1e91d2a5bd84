//! Errors for sf_structure.
//!
//! NOTE: We communicate errors based on usize indexing, because errors
//! typically occur at the parsing boundary where positions are usize anyway.

use std::fmt;

#[derive(Debug)]
pub enum StructureError {
    InvalidToken(char, usize),
    UnmatchedOpen(usize),
    UnmatchedClose(usize),
    LengthMismatch { sequence: usize, structure: usize },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::InvalidToken(c, i) => {
                write!(f, "Invalid character '{}' in structure at position {}", c, i)
            }
            StructureError::UnmatchedOpen(i) => {
                write!(f, "Unmatched opening bracket at position {}", i)
            }
            StructureError::UnmatchedClose(i) => {
                write!(f, "Unmatched closing bracket at position {}", i)
            }
            StructureError::LengthMismatch { sequence, structure } => {
                write!(f, "Sequence length ({}) and structure length ({}) do not match", sequence, structure)
            }
        }
    }
}

impl std::error::Error for StructureError {}
