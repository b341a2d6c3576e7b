//! Constructive heuristics for initial tours.
//!
//! - [`nearest_neighbor`]: greedy nearest-neighbor walk from city 0, O(n²)
//! - [`candidate_greedy_tour`]: randomized walk over candidate lists biased
//!   toward 1-tree and incumbent edges, O(n·k)

mod candidate_greedy;
mod nearest_neighbor;

pub use candidate_greedy::candidate_greedy_tour;
pub use nearest_neighbor::nearest_neighbor;
