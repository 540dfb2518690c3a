use std::fmt;

use thiserror::Error;

/// Mutating operation that reported an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => f.write_str("insert"),
            Operation::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bounded mutator spent its retry budget without passing validation.
    /// The list is unchanged.
    #[error("{operation} of {value} gave up after {retries} failed validation rounds")]
    RetriesExhausted {
        operation: Operation,
        value: i64,
        retries: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
