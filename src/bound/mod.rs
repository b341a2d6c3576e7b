//! Held-Karp lower bounds.
//!
//! - [`OneTree`]: minimum 1-tree under node penalties
//! - [`LowerBoundEstimator`]: subgradient ascent over the penalties,
//!   producing a [`LowerBound`]

mod one_tree;
mod subgradient;

pub use one_tree::OneTree;
pub use subgradient::{LowerBound, LowerBoundEstimator};
