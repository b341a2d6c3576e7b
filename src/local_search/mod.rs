//! Local search over the two-level tour.
//!
//! - [`LinKernighan`]: sequential 2..k-opt chains, 3-opt "star" segment
//!   swaps, and a non-sequential 4-opt pass
//! - [`candidate_two_opt_gain`]: probe for an improving candidate 2-opt
//!   exchange

mod lin_kernighan;
mod two_opt;

pub use lin_kernighan::{LinKernighan, MoveKind, SearchStats};
pub use two_opt::{candidate_two_opt_gain, TwoOptMove};
