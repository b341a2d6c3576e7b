//! Input error types.
//!
//! Only malformed input is reported through these types. Defects inside the
//! search (an infeasible flip, a corrupted tour structure) panic instead,
//! because continuing on a broken tour is never meaningful.

use std::fmt;

/// An error raised while loading or validating a problem instance.
///
/// Returned before any solving begins; the solver never runs on input that
/// produced one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    /// The instance has no cities.
    Empty,
    /// A matrix row has a different length than the matrix dimension.
    RaggedRow {
        /// Row index.
        row: usize,
        /// Observed row length.
        len: usize,
        /// Expected row length (the dimension).
        expected: usize,
    },
    /// Flat matrix data does not hold `size * size` entries.
    DataLength {
        /// Observed number of entries.
        len: usize,
        /// Expected number of entries.
        expected: usize,
    },
    /// `cost(i, j)` differs from `cost(j, i)`.
    Asymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Value at `(i, j)`.
        forward: f64,
        /// Value at `(j, i)`.
        backward: f64,
    },
    /// A cost is negative, NaN, or infinite.
    InvalidCost {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Offending value.
        value: f64,
    },
    /// A TSPLIB file lacks a `DIMENSION` entry.
    MissingDimension,
    /// A TSPLIB file lacks the data section for its edge weight type.
    MissingSection(&'static str),
    /// A TSPLIB edge weight type or format that the reader cannot handle.
    Unsupported(String),
    /// A token that should be a number could not be parsed.
    BadNumber {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A starting tour is not a permutation of the instance's cities.
    NotPermutation {
        /// Length of the supplied sequence.
        len: usize,
        /// Number of cities in the instance.
        expected: usize,
    },
    /// The data section holds fewer or more entries than declared.
    CountMismatch {
        /// Entries declared by `DIMENSION`.
        expected: usize,
        /// Entries actually read.
        found: usize,
    },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "instance has no cities"),
            Self::RaggedRow { row, len, expected } => write!(
                f,
                "matrix row {row} has {len} entries, expected {expected}"
            ),
            Self::DataLength { len, expected } => write!(
                f,
                "matrix data has {len} entries, expected {expected}"
            ),
            Self::Asymmetric {
                i,
                j,
                forward,
                backward,
            } => write!(
                f,
                "matrix is not symmetric: cost({i}, {j}) = {forward} but cost({j}, {i}) = {backward}"
            ),
            Self::InvalidCost { i, j, value } => {
                write!(f, "invalid cost {value} at ({i}, {j})")
            }
            Self::MissingDimension => write!(f, "DIMENSION entry is missing"),
            Self::MissingSection(name) => write!(f, "{name} is missing"),
            Self::Unsupported(what) => write!(f, "unsupported instance format: {what}"),
            Self::BadNumber { line, token } => {
                write!(f, "line {line}: cannot parse number from '{token}'")
            }
            Self::NotPermutation { len, expected } => write!(
                f,
                "starting tour of length {len} is not a permutation of 0..{expected}"
            ),
            Self::CountMismatch { expected, found } => write!(
                f,
                "data section holds {found} entries, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for InstanceError {}
