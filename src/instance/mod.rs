//! Instance input and synthetic generation.
//!
//! - [`parse_tsplib`] / [`write_full_matrix`]: TSPLIB `EUC_2D` and
//!   `EXPLICIT FULL_MATRIX` text
//! - [`random_matrix`]: uniform integer costs
//! - [`planted_matrix`]: random costs with a known optimal cycle

mod generate;
mod tsplib;

pub use generate::{planted_matrix, random_matrix};
pub use tsplib::{parse_tsplib, write_full_matrix};
