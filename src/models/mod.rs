//! Domain model types for the symmetric TSP.
//!
//! Provides the plain tour snapshot, the solver configuration, the final
//! solve report, and input error types.

mod config;
mod error;
mod solution;
mod tour;

pub use config::{InitialTour, PenaltyRefresh, SolverConfig};
pub use error::InstanceError;
pub use solution::SolveReport;
pub(crate) use solution::gap_percent;
pub use tour::Tour;
