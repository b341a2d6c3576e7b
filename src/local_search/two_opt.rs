//! Candidate 2-opt neighborhood probe.
//!
//! # Algorithm
//!
//! For each city `t1` and each tour direction (`succ = next` or
//! `succ = prev`), let `t2 = pred(t1)`. For each candidate `t3` of `t2`
//! whose edge is no longer than `(t1, t2)`, with `t4 = succ(t3)`, the
//! exchange replacing `(t1, t2), (t3, t4)` by `(t2, t3), (t1, t4)` has
//!
//! ```text
//! delta = c(t1, t4) + c(t2, t3) - c(t1, t2) - c(t3, t4)
//! ```
//!
//! This is exactly the set of first-level exchanges the Lin-Kernighan search
//! evaluates, so a tour it leaves behind has no improving move here.
//!
//! # Complexity
//!
//! O(n·k) for `k` candidates per city.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use crate::candidates::CandidateTable;
use crate::distance::CostMatrix;
use crate::tour::TourStructure;

/// An improving 2-opt exchange `(t1, t2), (t3, t4) -> (t2, t3), (t1, t4)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoOptMove {
    /// Endpoints `[t1, t2, t3, t4]`.
    pub cities: [usize; 4],
    /// Cost change if applied.
    pub delta: f64,
}

impl TwoOptMove {
    /// Applies the exchange.
    pub fn apply(&self, tour: &mut TourStructure) {
        let [t1, t2, t3, t4] = self.cities;
        tour.two_opt_move(t1, t2, t3, t4);
    }
}

/// Returns the most improving candidate 2-opt exchange with
/// `delta < -eps`, or `None` if the tour is locally optimal for this
/// neighborhood.
///
/// # Examples
///
/// ```
/// use u_tsp::candidates::CandidateTable;
/// use u_tsp::distance::CostMatrix;
/// use u_tsp::local_search::candidate_two_opt_gain;
/// use u_tsp::tour::TourStructure;
///
/// let costs = CostMatrix::from_coordinates(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
/// let table = CandidateTable::build(&costs, &[0.0; 4], 3);
///
/// let mut crossing = TourStructure::new(&[0, 2, 1, 3]);
/// let mv = candidate_two_opt_gain(&crossing, &costs, &table, 1e-10).expect("improving move");
/// assert!((mv.delta + 8.0).abs() < 1e-10);
/// mv.apply(&mut crossing);
/// assert!((crossing.tour_cost(&costs) - 40.0).abs() < 1e-10);
/// assert!(candidate_two_opt_gain(&crossing, &costs, &table, 1e-10).is_none());
/// ```
pub fn candidate_two_opt_gain(
    tour: &TourStructure,
    costs: &CostMatrix,
    candidates: &CandidateTable,
    eps: f64,
) -> Option<TwoOptMove> {
    let n = tour.len();
    if n < 4 {
        return None;
    }
    let mut best: Option<TwoOptMove> = None;

    for mirrored in [false, true] {
        let succ = |c: usize| if mirrored { tour.prev(c) } else { tour.next(c) };
        let pred = |c: usize| if mirrored { tour.next(c) } else { tour.prev(c) };
        let between = |a: usize, b: usize, c: usize| {
            if mirrored {
                tour.between(c, b, a)
            } else {
                tour.between(a, b, c)
            }
        };

        for t1 in 0..n {
            let t2 = pred(t1);
            let x1 = costs.cost(t1, t2);
            for &t3 in candidates.candidates(t2) {
                if t3 == t1 || costs.cost(t2, t3) > x1 {
                    continue;
                }
                let t4 = succ(t3);
                if t4 == t2 || t4 == t1 || !between(t4, t2, t1) || !between(t1, t3, t4) {
                    continue;
                }
                let delta = two_opt_delta(costs, t1, t2, t3, t4);
                if delta < -eps && best.map_or(true, |b| delta < b.delta) {
                    best = Some(TwoOptMove {
                        cities: [t1, t2, t3, t4],
                        delta,
                    });
                }
            }
        }
    }
    best
}

/// Cost change of replacing `(t1, t2), (t3, t4)` by `(t2, t3), (t1, t4)`.
#[inline]
pub(crate) fn two_opt_delta(costs: &CostMatrix, t1: usize, t2: usize, t3: usize, t4: usize) -> f64 {
    costs.cost(t1, t4) + costs.cost(t2, t3) - costs.cost(t1, t2) - costs.cost(t3, t4)
}
