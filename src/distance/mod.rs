//! Cost model.
//!
//! Provides the immutable symmetric cost matrix every other stage reads.

mod matrix;

pub use matrix::CostMatrix;
