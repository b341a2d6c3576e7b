//! # u-tsp
//!
//! Symmetric traveling salesman heuristic: Lin-Kernighan style local search
//! over a two-level doubly-linked tour, guided by Held-Karp 1-tree bounds.
//!
//! ## Modules
//!
//! - [`distance`] — Symmetric cost matrix
//! - [`models`] — Tour snapshot, solver configuration, solve report, errors
//! - [`tour`] — Two-level doubly-linked list tour with O(√n) flips
//! - [`bound`] — Minimum 1-tree and subgradient lower bound
//! - [`candidates`] — Per-city candidate lists from penalized costs
//! - [`constructive`] — Initial tours (candidate greedy, nearest neighbor)
//! - [`local_search`] — Lin-Kernighan engine and candidate 2-opt probe
//! - [`solver`] — Restart driver producing a [`models::SolveReport`]
//! - [`instance`] — TSPLIB reader/writer and synthetic generators
//!
//! ## Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use u_tsp::instance::planted_matrix;
//! use u_tsp::models::SolverConfig;
//! use u_tsp::solver::Solver;
//!
//! let (costs, _) = planted_matrix(60, 2, 100, &mut StdRng::seed_from_u64(0));
//! let config = SolverConfig::default().with_seed(1).with_max_run_times(2);
//! let report = Solver::new(costs, config).expect("non-empty").solve();
//!
//! assert_eq!(report.tour().len(), 60);
//! assert!(report.lower_bound() <= report.objective() + 1e-6);
//! ```

pub mod bound;
pub mod candidates;
pub mod constructive;
pub mod distance;
pub mod instance;
pub mod local_search;
pub mod models;
pub mod solver;
pub mod tour;
