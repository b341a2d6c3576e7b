//! Lin-Kernighan local search over a [`TourStructure`].
//!
//! # Algorithm
//!
//! A move starts by removing the edge `(t2, t1)` where `t1 = succ(t2)`.
//! For each candidate `t3` of `t2` with `c(t2, t3) <= c(t1, t2)`:
//!
//! - **Sequential step**: `t4 = succ(t3)`. The 2-opt exchange replacing
//!   `(t1, t2), (t3, t4)` by `(t2, t3), (t1, t4)` is applied if the chain
//!   gain so far makes it improving. Otherwise it is applied tentatively and
//!   the search continues by removing the closing edge `(t1, t4)`, up to
//!   `max_move_level` exchanges; a failed branch is undone exactly.
//! - **3-opt "star"** (first level only): `t4 = pred(t3)`, a candidate `t5`
//!   of `t4` between `t3` and `t2`, and `t6 = pred(t5)` describe a segment
//!   swap performed as three 2-opt exchanges. A non-improving swap is
//!   continued sequentially from the fourth level before being undone.
//!
//! Every city is tried as `t1` with each of its two tour neighbours as
//! `t2`, so the set of explored first-level exchanges does not depend on the
//! orientation the structure happens to have. The frame (`succ = next` or
//! `succ = prev`) is re-derived from the live tour before every step, since
//! undoing an exchange restores the cycle but may leave it reversed.
//!
//! When no sequential move improves the tour, a non-sequential 4-opt pass
//! looks for two independent exchanges whose combined delta is improving.
//!
//! A move is accepted when its total delta is below `-preciseness`.
//!
//! # Complexity
//!
//! Each exchange costs O(√n) on the two-level list; the branching factor is
//! bounded by the candidate list length and the depth by `max_move_level`.
//!
//! # Reference
//!
//! Lin, S. & Kernighan, B.W. (1973). "An effective heuristic algorithm for
//! the traveling-salesman problem", *Operations Research* 21(2), 498-516.
//!
//! Helsgaun, K. (2000). "An effective implementation of the Lin-Kernighan
//! traveling salesman heuristic", *EJOR* 126(1), 106-130.

use std::fmt;

use log::{debug, trace, warn};

use crate::candidates::CandidateTable;
use crate::distance::CostMatrix;
use crate::models::SolverConfig;
use crate::tour::TourStructure;

use super::two_opt::two_opt_delta;

/// Kind of an applied improving move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// A chain of 2-opt exchanges closed at the given level (2 = plain
    /// 2-opt).
    Sequential(usize),
    /// Three-exchange segment swap, possibly continued sequentially.
    ThreeOptStar,
    /// Non-sequential 4-opt double bridge.
    NonSequential,
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential(level) => write!(f, "{level}-opt"),
            Self::ThreeOptStar => write!(f, "3-opt*"),
            Self::NonSequential => write!(f, "non-sequential 4-opt"),
        }
    }
}

/// Counters of one [`LinKernighan::optimize`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Improving sequential chains.
    pub sequential: usize,
    /// Improving 3-opt star moves.
    pub star: usize,
    /// Improving non-sequential moves.
    pub non_sequential: usize,
    /// Outer iterations (sequential pass plus optional non-sequential pass).
    pub passes: usize,
}

impl SearchStats {
    /// Total number of improving moves.
    pub fn moves(&self) -> usize {
        self.sequential + self.star + self.non_sequential
    }
}

/// Lin-Kernighan move search engine.
///
/// # Examples
///
/// ```
/// use u_tsp::candidates::CandidateTable;
/// use u_tsp::distance::CostMatrix;
/// use u_tsp::local_search::LinKernighan;
/// use u_tsp::models::SolverConfig;
/// use u_tsp::tour::TourStructure;
///
/// let points = [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (2.0, 5.0)];
/// let costs = CostMatrix::from_coordinates(&points);
/// let table = CandidateTable::build(&costs, &[0.0; 5], 4);
/// let config = SolverConfig::default();
///
/// // Crossing start: 0 -> 2 -> 1 -> 3 -> 4.
/// let mut tour = TourStructure::new(&[0, 2, 1, 3, 4]);
/// let mut lk = LinKernighan::new(&costs, &table, &config);
/// let objective = lk.optimize(&mut tour);
///
/// assert!(objective < costs.tour_cost(&[0, 2, 1, 3, 4]));
/// assert!((objective - tour.tour_cost(&costs)).abs() < 1e-10);
/// ```
#[derive(Debug)]
pub struct LinKernighan<'a> {
    costs: &'a CostMatrix,
    candidates: &'a CandidateTable,
    max_level: usize,
    eps: f64,
    non_sequential: bool,
    verify: bool,
    drift_tolerance: f64,
    objective: f64,
    mirrored: bool,
    cursor: usize,
    removed: Vec<(usize, usize)>,
    added: Vec<(usize, usize)>,
    stats: SearchStats,
}

impl<'a> LinKernighan<'a> {
    /// Creates an engine reading depth, tolerance, and pass switches from
    /// `config`.
    pub fn new(costs: &'a CostMatrix, candidates: &'a CandidateTable, config: &SolverConfig) -> Self {
        Self {
            costs,
            candidates,
            max_level: config.max_move_level,
            eps: config.preciseness,
            non_sequential: config.non_sequential,
            verify: config.verify_tree,
            drift_tolerance: config.drift_tolerance,
            objective: 0.0,
            mirrored: false,
            cursor: 0,
            removed: Vec::with_capacity(config.max_move_level + 2),
            added: Vec::with_capacity(config.max_move_level + 2),
            stats: SearchStats::default(),
        }
    }

    /// Objective maintained incrementally by the last search.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Counters of the last search.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Improves `tour` until neither the sequential nor the non-sequential
    /// pass finds an improving move, then returns the recomputed objective.
    ///
    /// # Panics
    ///
    /// Panics if the tour and the candidate table disagree on the number of
    /// cities, or if tree verification is enabled and fails.
    pub fn optimize(&mut self, tour: &mut TourStructure) -> f64 {
        assert_eq!(
            tour.len(),
            self.candidates.len(),
            "tour and candidate table sizes differ"
        );
        self.objective = tour.tour_cost(self.costs);
        self.stats = SearchStats::default();
        self.cursor = 0;
        if tour.len() < 4 {
            return self.objective;
        }

        loop {
            self.stats.passes += 1;
            let improved =
                self.sequential_pass(tour) || (self.non_sequential && self.non_sequential_pass(tour));
            if !improved {
                break;
            }
        }
        debug!(
            "local optimum {:.4} after {} passes ({} sequential, {} star, {} non-sequential)",
            self.objective,
            self.stats.passes,
            self.stats.sequential,
            self.stats.star,
            self.stats.non_sequential
        );
        self.recompute(tour)
    }

    /// Replaces the incremental objective by a full recomputation, warning
    /// on drift.
    fn recompute(&mut self, tour: &TourStructure) -> f64 {
        let exact = tour.tour_cost(self.costs);
        let drift = (exact - self.objective).abs();
        if drift > self.drift_tolerance * exact.abs().max(1.0) {
            warn!(
                "objective drift {drift:.3e}: incremental {:.6}, recomputed {exact:.6}",
                self.objective
            );
        } else {
            debug!("objective recomputed: {exact:.6}");
        }
        self.objective = exact;
        exact
    }

    #[inline]
    fn cost(&self, a: usize, b: usize) -> f64 {
        self.costs.cost(a, b)
    }

    #[inline]
    fn succ(&self, tour: &TourStructure, city: usize) -> usize {
        if self.mirrored {
            tour.prev(city)
        } else {
            tour.next(city)
        }
    }

    #[inline]
    fn pred(&self, tour: &TourStructure, city: usize) -> usize {
        if self.mirrored {
            tour.next(city)
        } else {
            tour.prev(city)
        }
    }

    #[inline]
    fn between(&self, tour: &TourStructure, a: usize, b: usize, c: usize) -> bool {
        if self.mirrored {
            tour.between(c, b, a)
        } else {
            tour.between(a, b, c)
        }
    }

    /// Picks the frame in which `t1 = succ(t2)` on the live tour.
    #[inline]
    fn orient(&mut self, tour: &TourStructure, t1: usize, t2: usize) {
        self.mirrored = tour.next(t2) != t1;
    }

    fn commit(&mut self, tour: &TourStructure, delta: f64, kind: MoveKind) {
        self.objective += delta;
        match kind {
            MoveKind::Sequential(_) => self.stats.sequential += 1,
            MoveKind::ThreeOptStar => self.stats.star += 1,
            MoveKind::NonSequential => self.stats.non_sequential += 1,
        }
        trace!("{kind} move: delta {delta:.6}, objective {:.6}", self.objective);
        if self.verify {
            if let Err(violation) = tour.check_tree() {
                panic!("tour structure corrupted after {kind} move: {violation}");
            }
        }
    }

    /// Tries every city as `t1`, starting at the cursor and staying on a
    /// city while it keeps producing improvements. Returns `true` if any
    /// move was applied.
    fn sequential_pass(&mut self, tour: &mut TourStructure) -> bool {
        let n = tour.len();
        let mut improved = false;
        let mut idle = 0;
        while idle < n {
            let t1 = self.cursor;
            if self.move_from_city(tour, t1) {
                improved = true;
                idle = 0;
            } else {
                idle += 1;
                self.cursor = (t1 + 1) % n;
            }
        }
        improved
    }

    fn move_from_city(&mut self, tour: &mut TourStructure, t1: usize) -> bool {
        // Both neighbours are fixed up front; failed attempts restore the
        // cycle but not necessarily its orientation.
        let neighbours = [tour.prev(t1), tour.next(t1)];
        for t2 in neighbours {
            self.removed.clear();
            self.added.clear();
            self.orient(tour, t1, t2);
            if self.find_next_move(tour, t1, t2, 2, 0.0) {
                return true;
            }
        }
        false
    }

    /// Extends a chain whose open edge is `(t2, t1)`, `t1 = succ(t2)`.
    fn find_next_move(
        &mut self,
        tour: &mut TourStructure,
        t1: usize,
        t2: usize,
        level: usize,
        sum: f64,
    ) -> bool {
        let table = self.candidates;
        let x1 = self.cost(t1, t2);
        for &t3 in table.candidates(t2) {
            if t3 == t1 || holds(&self.removed, t2, t3) {
                continue;
            }
            if self.cost(t2, t3) > x1 {
                continue;
            }
            if self.try_sequential(tour, t1, t2, t3, level, sum) {
                return true;
            }
            if level == 2 && self.try_star(tour, t1, t2, t3) {
                return true;
            }
        }
        false
    }

    fn try_sequential(
        &mut self,
        tour: &mut TourStructure,
        t1: usize,
        t2: usize,
        t3: usize,
        level: usize,
        sum: f64,
    ) -> bool {
        self.orient(tour, t1, t2);
        let t4 = self.succ(tour, t3);
        if holds(&self.added, t3, t4)
            || t2 == t4
            || t3 == t1
            || t1 == t4
            || !self.between(tour, t4, t2, t1)
            || !self.between(tour, t1, t3, t4)
        {
            return false;
        }

        let delta = two_opt_delta(self.costs, t1, t2, t3, t4);
        let total = sum + delta;
        if total < -self.eps {
            tour.two_opt_move(t1, t2, t3, t4);
            self.commit(tour, total, MoveKind::Sequential(level));
            return true;
        }
        if level >= self.max_level {
            return false;
        }

        tour.two_opt_move(t1, t2, t3, t4);
        self.removed.push((t3, t4));
        self.added.push((t2, t3));
        let found = if tour.next(t4) == t1 {
            self.find_next_move(tour, t1, t4, level + 1, total)
        } else {
            self.find_next_move(tour, t4, t1, level + 1, total)
        };
        if found {
            return true;
        }
        self.removed.pop();
        self.added.pop();
        tour.two_opt_move(t1, t4, t3, t2);
        false
    }

    /// Segment swap `t1..t4 | t3..t6 | t5..t2` to `t1..t4 | t5..t2 | t3..t6`.
    fn try_star(&mut self, tour: &mut TourStructure, t1: usize, t2: usize, t3: usize) -> bool {
        self.orient(tour, t1, t2);
        let t4 = self.pred(tour, t3);
        if t4 == t1 || t4 == t2 {
            return false;
        }
        let table = self.candidates;
        let x1 = self.cost(t1, t2);
        let y1 = self.cost(t2, t3);
        let x2 = self.cost(t3, t4);

        for &t5 in table.candidates(t4) {
            // An undone attempt may leave the structure reversed.
            self.orient(tour, t1, t2);
            if !self.between(tour, t3, t5, t2) {
                continue;
            }
            let y2 = self.cost(t4, t5);
            if y2 > x2 {
                continue;
            }
            let t6 = self.pred(tour, t5);
            if t6 == t3 {
                continue;
            }
            let x3 = self.cost(t5, t6);
            let y3 = self.cost(t6, t1);
            let gain = y1 + y2 + y3 - x1 - x2 - x3;

            tour.two_opt_move(t1, t2, t4, t3);
            tour.two_opt_move(t4, t2, t6, t5);
            tour.two_opt_move(t6, t2, t3, t1);
            if gain < -self.eps {
                self.commit(tour, gain, MoveKind::ThreeOptStar);
                return true;
            }

            if self.max_level >= 4 {
                let mark = self.removed.len();
                self.removed.extend([(t1, t2), (t3, t4), (t5, t6)]);
                self.added.extend([(t1, t6), (t2, t3), (t4, t5)]);
                let found = if tour.next(t6) == t1 {
                    self.find_next_move(tour, t1, t6, 4, gain)
                } else {
                    self.find_next_move(tour, t6, t1, 4, gain)
                };
                if found {
                    return true;
                }
                self.removed.truncate(mark);
                self.added.truncate(mark);
            }

            tour.two_opt_move(t6, t1, t3, t2);
            tour.two_opt_move(t4, t5, t6, t2);
            tour.two_opt_move(t1, t3, t4, t2);
        }
        false
    }

    /// Scans for a double bridge: a first exchange `(t1,t2),(t3,t4)` ->
    /// `(t2,t3),(t4,t1)` that splits the tour, repaired by a second
    /// exchange on `(t5,t6)` in `t4..t1` and `(t7,t8)` in `t2..t3`.
    fn non_sequential_pass(&mut self, tour: &mut TourStructure) -> bool {
        let n = tour.len();
        let table = self.candidates;
        for t1 in 0..n {
            let t2 = tour.next(t1);
            for &t3 in table.candidates(t2) {
                if t3 == t1 {
                    continue;
                }
                let t4 = tour.next(t3);
                if t4 == t1 || t4 == t2 {
                    continue;
                }
                let delta1 =
                    self.cost(t2, t3) + self.cost(t4, t1) - self.cost(t1, t2) - self.cost(t3, t4);
                if delta1 > 0.0 {
                    continue;
                }

                let mut t5 = t4;
                while t5 != t1 {
                    let t6 = tour.next(t5);
                    for &t7 in table.candidates(t6) {
                        if !tour.between(t1, t7, t3) {
                            continue;
                        }
                        let t8 = tour.next(t7);
                        let removed = self.cost(t5, t6) + self.cost(t7, t8);
                        let straight = self.cost(t6, t7) + self.cost(t8, t5) - removed;
                        let crossed = self.cost(t6, t8) + self.cost(t7, t5) - removed;
                        let t = [t1, t2, t3, t4, t5, t6, t7, t8];
                        if straight <= crossed {
                            if delta1 + straight < -self.eps {
                                tour.non_sequential_exchange(t);
                                self.commit(tour, delta1 + straight, MoveKind::NonSequential);
                                return true;
                            }
                        } else if delta1 + crossed < -self.eps {
                            tour.non_sequential_exchange_reversed(t);
                            self.commit(tour, delta1 + crossed, MoveKind::NonSequential);
                            return true;
                        }
                    }
                    t5 = t6;
                }
            }
        }
        false
    }
}

/// Returns `true` if the undirected edge `{a, b}` is in `edges`.
#[inline]
fn holds(edges: &[(usize, usize)], a: usize, b: usize) -> bool {
    edges
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_search::candidate_two_opt_gain;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
            .collect()
    }

    fn shuffled(n: usize, seed: u64) -> Vec<usize> {
        let mut cities: Vec<usize> = (0..n).collect();
        cities.shuffle(&mut StdRng::seed_from_u64(seed));
        cities
    }

    #[test]
    fn test_fixes_crossing() {
        // Unit square; 0 -> 2 -> 1 -> 3 crosses itself.
        let costs = CostMatrix::from_coordinates(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let table = CandidateTable::build(&costs, &[0.0; 4], 3);
        let config = SolverConfig::default();
        let mut tour = TourStructure::new(&[0, 2, 1, 3]);
        let mut lk = LinKernighan::new(&costs, &table, &config);
        let obj = lk.optimize(&mut tour);
        assert!((obj - 40.0).abs() < 1e-10);
        assert!(lk.stats().moves() >= 1);
    }

    #[test]
    fn test_objective_matches_recomputation() {
        let costs = CostMatrix::from_coordinates(&random_points(120, 1));
        let table = CandidateTable::build(&costs, &vec![0.0; 120], 6);
        let config = SolverConfig::default().with_verify_tree(true);
        let mut tour = TourStructure::new(&shuffled(120, 2));
        let start = tour.tour_cost(&costs);

        let mut lk = LinKernighan::new(&costs, &table, &config);
        lk.optimize(&mut tour);
        let exact = tour.tour_cost(&costs);
        assert!((lk.objective() - exact).abs() < 1e-6);
        assert!((costs.tour_cost(&tour.current_tour()) - exact).abs() < 1e-6);
        assert!(exact < start);
        assert_eq!(tour.check_tree(), Ok(()));
    }

    #[test]
    fn test_local_optimum_has_no_candidate_two_opt() {
        let costs = CostMatrix::from_coordinates(&random_points(200, 3));
        let table = CandidateTable::build(&costs, &vec![0.0; 200], 5);
        let config = SolverConfig::default();
        let mut tour = TourStructure::new(&shuffled(200, 4));
        LinKernighan::new(&costs, &table, &config).optimize(&mut tour);
        assert!(candidate_two_opt_gain(&tour, &costs, &table, config.preciseness).is_none());
    }

    #[test]
    fn test_sequential_only() {
        let costs = CostMatrix::from_coordinates(&random_points(80, 5));
        let table = CandidateTable::build(&costs, &vec![0.0; 80], 5);
        let config = SolverConfig::default()
            .with_non_sequential(false)
            .with_max_move_level(3);
        let mut tour = TourStructure::new(&shuffled(80, 6));
        let start = tour.tour_cost(&costs);
        let mut lk = LinKernighan::new(&costs, &table, &config);
        let obj = lk.optimize(&mut tour);
        assert!(obj < start);
        assert_eq!(lk.stats().non_sequential, 0);
    }

    #[test]
    fn test_non_sequential_pass_repairs_double_bridge() {
        // Cheap cycle 0..12 in order. Segments A = 1..3, B = 4..6, C = 7..9,
        // D = 10,11,0 arranged as A D C B: every junction edge is expensive
        // and no 2-opt exchange can add a cheap edge.
        let n = 12;
        let costs = CostMatrix::from_fn(n, |i, j| {
            if i - j == 1 || (i == n - 1 && j == 0) {
                1.0
            } else {
                100.0
            }
        });
        let table = CandidateTable::build(&costs, &vec![0.0; n], 2);
        let config = SolverConfig::default();
        let mut tour = TourStructure::new(&[1, 2, 3, 10, 11, 0, 7, 8, 9, 4, 5, 6]);
        assert!(candidate_two_opt_gain(&tour, &costs, &table, 1e-10).is_none());

        let mut lk = LinKernighan::new(&costs, &table, &config);
        lk.objective = tour.tour_cost(&costs);
        assert!((lk.objective() - 408.0).abs() < 1e-10);
        assert!(lk.non_sequential_pass(&mut tour));
        assert_eq!(lk.stats().non_sequential, 1);
        assert!(lk.objective() < 408.0);
        assert!((lk.objective() - tour.tour_cost(&costs)).abs() < 1e-10);
        assert_eq!(tour.check_tree(), Ok(()));
    }

    #[test]
    fn test_tiny_tours_untouched() {
        let costs = CostMatrix::from_fn(3, |i, j| (i + j) as f64);
        let table = CandidateTable::build(&costs, &[0.0; 3], 2);
        let config = SolverConfig::default();
        let mut tour = TourStructure::new(&[0, 1, 2]);
        let obj = LinKernighan::new(&costs, &table, &config).optimize(&mut tour);
        assert!((obj - costs.tour_cost(&[0, 1, 2])).abs() < 1e-10);
    }

    #[test]
    fn test_holds_is_undirected() {
        let edges = [(1, 2), (5, 3)];
        assert!(holds(&edges, 2, 1));
        assert!(holds(&edges, 3, 5));
        assert!(!holds(&edges, 1, 3));
    }

    #[test]
    fn test_move_kind_display() {
        assert_eq!(MoveKind::Sequential(3).to_string(), "3-opt");
        assert_eq!(MoveKind::ThreeOptStar.to_string(), "3-opt*");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn prop_search_reaches_candidate_local_optimum(
                n in 5usize..40,
                seed in any::<u64>(),
                k in 2usize..6,
            ) {
                let costs = CostMatrix::from_coordinates(&random_points(n, seed));
                let table = CandidateTable::build(&costs, &vec![0.0; n], k);
                let config = SolverConfig::default().with_max_move_level(5);
                let mut tour = TourStructure::new(&shuffled(n, seed ^ 0x5eed));
                let start = tour.tour_cost(&costs);

                let obj = LinKernighan::new(&costs, &table, &config).optimize(&mut tour);
                prop_assert!(obj <= start + 1e-9);
                prop_assert_eq!(tour.check_tree(), Ok(()));
                prop_assert!(candidate_two_opt_gain(&tour, &costs, &table, config.preciseness).is_none());
            }
        }
    }
}
