//! Error types for the revisioned table

use std::fmt;

/// Errors that can occur while touching the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Internal lock poisoned by a panicking writer
    LockPoisoned,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::LockPoisoned => write!(f, "Internal table lock poisoned"),
        }
    }
}

impl std::error::Error for TableError {}
