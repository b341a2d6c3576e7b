//! Tour representations used during search.
//!
//! - [`TourStructure`]: two-level doubly-linked list with O(1) `next`,
//!   `prev`, `between` and O(√n) 2-opt reversal
//! - [`TreeViolation`]: invariant failures reported by
//!   [`TourStructure::check_tree`]

mod arena;
mod check;
mod two_level;

pub use check::TreeViolation;
pub use two_level::TourStructure;
