//! Restart driver tying the bound, candidates, and local search together.
//!
//! # Algorithm
//!
//! 1. Subgradient ascent on the 1-tree bound yields `pi` and the lower bound.
//! 2. A candidate table is built from the `pi`-adjusted costs.
//! 3. Each restart builds an initial tour, wraps it in a fresh
//!    [`TourStructure`], and runs [`LinKernighan`] to a local optimum.
//! 4. The best tour over all restarts is reported against the bound.
//!
//! With [`PenaltyRefresh::EveryRun`] the ascent is resumed from the current
//! `pi` before every restart after the first, and the candidate table is
//! rebuilt from the refreshed penalties.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bound::{LowerBound, LowerBoundEstimator};
use crate::candidates::CandidateTable;
use crate::constructive::{candidate_greedy_tour, nearest_neighbor};
use crate::distance::CostMatrix;
use crate::local_search::LinKernighan;
use crate::models::{
    gap_percent, InitialTour, InstanceError, PenaltyRefresh, SolveReport, SolverConfig, Tour,
};
use crate::tour::TourStructure;

/// Lin-Kernighan solver for one symmetric instance.
///
/// # Examples
///
/// ```
/// use u_tsp::distance::CostMatrix;
/// use u_tsp::models::SolverConfig;
/// use u_tsp::solver::Solver;
///
/// let points = [(0.0, 0.0), (3.0, 0.0), (6.0, 0.0), (6.0, 4.0), (3.0, 4.0), (0.0, 4.0)];
/// let costs = CostMatrix::from_coordinates(&points);
/// let solver = Solver::new(costs, SolverConfig::default().with_seed(7)).expect("valid");
///
/// let report = solver.solve();
/// assert!((report.objective() - 20.0).abs() < 1e-10);
/// assert!(report.lower_bound() <= report.objective() + 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Solver {
    costs: CostMatrix,
    config: SolverConfig,
}

/// Best tour seen so far with its exact cost.
struct Incumbent {
    tour: Tour,
    objective: f64,
}

impl Solver {
    /// Creates a solver.
    ///
    /// Returns [`InstanceError::Empty`] for a matrix without cities.
    pub fn new(costs: CostMatrix, config: SolverConfig) -> Result<Self, InstanceError> {
        if costs.size() == 0 {
            return Err(InstanceError::Empty);
        }
        Ok(Self { costs, config })
    }

    /// Cost matrix being solved.
    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    /// Active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs `max_run_times` restarts (at least one) and reports the best
    /// tour.
    pub fn solve(&self) -> SolveReport {
        self.run(None, self.config.max_run_times.max(1))
    }

    /// Runs a single descent from `initial` instead of a constructed tour.
    ///
    /// Returns [`InstanceError::NotPermutation`] if `initial` is not a
    /// permutation of the instance's cities.
    pub fn improve(&self, initial: &[usize]) -> Result<SolveReport, InstanceError> {
        let n = self.costs.size();
        if initial.len() != n || Tour::from_permutation(initial.to_vec()).is_none() {
            return Err(InstanceError::NotPermutation {
                len: initial.len(),
                expected: n,
            });
        }
        Ok(self.run(Some(initial), 1))
    }

    fn run(&self, initial: Option<&[usize]>, runs: usize) -> SolveReport {
        let n = self.costs.size();
        if n <= 3 {
            return self.trivial(initial);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let estimator = LowerBoundEstimator::new(&self.costs, &self.config);
        let mut bound = estimator.estimate();
        let mut lower_bound = bound.value();
        let mut ascent_iterations = bound.iterations();
        debug!("{n} cities: initial bound {lower_bound:.4}");
        let mut candidates = self.candidate_table(&bound);

        let mut best: Option<Incumbent> = None;
        let mut run_objectives = Vec::with_capacity(runs);

        for run in 0..runs {
            if run > 0 && self.config.penalty_refresh == PenaltyRefresh::EveryRun {
                bound = estimator.estimate_from(bound.into_pi());
                ascent_iterations += bound.iterations();
                if bound.value() > lower_bound {
                    lower_bound = bound.value();
                }
                debug!("run {run}: penalties refreshed, bound {:.4}", bound.value());
                candidates = self.candidate_table(&bound);
            }

            let start = match initial {
                Some(cities) if run == 0 => cities.to_vec(),
                _ => match self.config.initial_tour {
                    InitialTour::CandidateGreedy => candidate_greedy_tour(
                        &candidates,
                        bound.tree(),
                        best.as_ref().map(|b| &b.tour),
                        &mut rng,
                    ),
                    InitialTour::NearestNeighbor => nearest_neighbor(&self.costs),
                },
            };

            let (tour, objective) = self.descend(&start, &candidates);
            info!(
                "run {}/{runs}: objective {objective:.4} (gap {:.3}%)",
                run + 1,
                gap_percent(objective, lower_bound)
            );
            run_objectives.push(objective);
            if best.as_ref().map_or(true, |b| objective < b.objective) {
                best = Some(Incumbent { tour, objective });
            }
        }

        let Some(best) = best else {
            return self.trivial(initial);
        };
        info!(
            "best objective {:.4}, lower bound {lower_bound:.4}, gap {:.3}%",
            best.objective,
            gap_percent(best.objective, lower_bound)
        );
        SolveReport::new(
            best.tour,
            best.objective,
            lower_bound,
            run_objectives,
            ascent_iterations,
        )
    }

    fn candidate_table(&self, bound: &LowerBound) -> CandidateTable {
        CandidateTable::build(&self.costs, bound.pi(), self.config.max_candidates)
    }

    /// Optimizes one start tour and returns it with its exact cost.
    fn descend(&self, start: &[usize], candidates: &CandidateTable) -> (Tour, f64) {
        let mut tour = TourStructure::new(start);
        let mut search = LinKernighan::new(&self.costs, candidates, &self.config);
        let objective = search.optimize(&mut tour);
        debug!("{} improving moves", search.stats().moves());

        let cities = tour.current_tour();
        let exact = self.costs.tour_cost(&cities);
        if (exact - objective).abs() > self.config.drift_tolerance * exact.abs().max(1.0) {
            warn!("search objective {objective:.6} differs from permutation cost {exact:.6}");
        }
        (tour.snapshot(), exact)
    }

    /// Every tour over at most 3 cities is optimal.
    fn trivial(&self, initial: Option<&[usize]>) -> SolveReport {
        let cities: Vec<usize> = match initial {
            Some(cities) => cities.to_vec(),
            None => (0..self.costs.size()).collect(),
        };
        let tour = TourStructure::new(&cities).snapshot();
        let objective = self.costs.tour_cost(&cities);
        info!("{} cities: tour is optimal by construction, objective {objective:.4}", cities.len());
        SolveReport::new(tour, objective, objective, vec![objective], 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> CostMatrix {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                (100.0 * a.cos(), 100.0 * a.sin())
            })
            .collect();
        CostMatrix::from_coordinates(&points)
    }

    fn scattered(n: usize) -> CostMatrix {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| (((i * 7919) % 211) as f64, ((i * 104729) % 199) as f64))
            .collect();
        CostMatrix::from_coordinates(&points)
    }

    fn is_permutation(cities: &[usize], n: usize) -> bool {
        let mut sorted = cities.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn test_empty_instance_rejected() {
        let err = Solver::new(CostMatrix::from_fn(0, |_, _| 0.0), SolverConfig::default())
            .expect_err("empty");
        assert_eq!(err, InstanceError::Empty);
    }

    #[test]
    fn test_trivial_sizes() {
        for n in 1..=3 {
            let costs = CostMatrix::from_fn(n, |i, j| (i + j) as f64);
            let solver = Solver::new(costs.clone(), SolverConfig::default()).expect("valid");
            let report = solver.solve();
            assert_eq!(report.tour().len(), n);
            assert!((report.objective() - costs.tour_cost(report.tour().cities())).abs() < 1e-10);
            assert!((report.lower_bound() - report.objective()).abs() < 1e-10);
            assert_eq!(report.ascent_iterations(), 0);
        }
    }

    #[test]
    fn test_ring_is_solved_optimally() {
        let n = 24;
        let costs = ring(n);
        let optimal = costs.tour_cost(&(0..n).collect::<Vec<_>>());
        let solver = Solver::new(costs, SolverConfig::default().with_seed(3).with_max_run_times(3))
            .expect("valid");
        let report = solver.solve();
        assert!(report.objective() <= optimal + 1e-6);
        assert!(report.lower_bound() <= report.objective() + 1e-6);
        assert!(report.gap_percent() >= -1e-9);
    }

    #[test]
    fn test_report_is_consistent() {
        let n = 60;
        let costs = scattered(n);
        let config = SolverConfig::default().with_seed(11).with_max_run_times(4);
        let report = Solver::new(costs.clone(), config).expect("valid").solve();

        assert!(is_permutation(report.tour().cities(), n));
        assert!((costs.tour_cost(report.tour().cities()) - report.objective()).abs() < 1e-6);
        assert_eq!(report.run_objectives().len(), 4);
        let min_run = report
            .run_objectives()
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        assert!((min_run - report.objective()).abs() < 1e-10);
        assert!(report.lower_bound() <= report.objective() + 1e-6);
        assert!(report.ascent_iterations() > 0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let costs = scattered(40);
        let config = SolverConfig::default().with_seed(99).with_max_run_times(3);
        let a = Solver::new(costs.clone(), config.clone()).expect("valid").solve();
        let b = Solver::new(costs, config).expect("valid").solve();
        assert_eq!(a.tour(), b.tour());
        assert_eq!(a.run_objectives(), b.run_objectives());
    }

    #[test]
    fn test_every_run_refresh() {
        let costs = scattered(50);
        let config = SolverConfig::default()
            .with_seed(5)
            .with_max_run_times(3)
            .with_penalty_refresh(PenaltyRefresh::EveryRun);
        let once = Solver::new(costs.clone(), config.clone().with_penalty_refresh(PenaltyRefresh::OncePerSolve))
            .expect("valid")
            .solve();
        let every = Solver::new(costs, config).expect("valid").solve();
        assert!(every.ascent_iterations() >= once.ascent_iterations());
        assert!(every.lower_bound() >= once.lower_bound() - 1e-9);
        assert!(every.lower_bound() <= every.objective() + 1e-6);
    }

    #[test]
    fn test_nearest_neighbor_start() {
        let costs = scattered(30);
        let config = SolverConfig::default()
            .with_seed(1)
            .with_max_run_times(2)
            .with_initial_tour(InitialTour::NearestNeighbor);
        let report = Solver::new(costs.clone(), config).expect("valid").solve();
        assert!(report.objective() <= costs.tour_cost(&nearest_neighbor(&costs)) + 1e-9);
    }

    #[test]
    fn test_improve_from_given_tour() {
        let costs = ring(12);
        let solver = Solver::new(costs.clone(), SolverConfig::default().with_seed(2)).expect("valid");
        let start = [0, 6, 1, 7, 2, 8, 3, 9, 4, 10, 5, 11];
        let report = solver.improve(&start).expect("permutation");
        assert_eq!(report.run_objectives().len(), 1);
        assert!(report.objective() < costs.tour_cost(&start));
    }

    #[test]
    fn test_improve_rejects_non_permutation() {
        let solver = Solver::new(ring(5), SolverConfig::default()).expect("valid");
        assert_eq!(
            solver.improve(&[0, 1, 2]).expect_err("short"),
            InstanceError::NotPermutation { len: 3, expected: 5 }
        );
        assert_eq!(
            solver.improve(&[0, 1, 1, 3, 4]).expect_err("duplicate"),
            InstanceError::NotPermutation { len: 5, expected: 5 }
        );
    }

    #[test]
    fn test_verified_search() {
        let costs = scattered(45);
        let config = SolverConfig::default()
            .with_seed(8)
            .with_max_run_times(2)
            .with_verify_tree(true);
        let report = Solver::new(costs, config).expect("valid").solve();
        assert!(report.objective() > 0.0);
    }

    #[test]
    fn test_default_config_on_random_euclidean() {
        use rand::Rng;

        let n = 200;
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let points: Vec<(f64, f64)> = (0..n)
                .map(|_| (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
                .collect();
            let costs = CostMatrix::from_coordinates(&points);
            let config = SolverConfig::default()
                .with_seed(seed)
                .with_max_run_times(2)
                .with_verify_tree(true);
            let report = Solver::new(costs.clone(), config).expect("valid").solve();

            assert!(is_permutation(report.tour().cities(), n));
            assert!((costs.tour_cost(report.tour().cities()) - report.objective()).abs() < 1e-6);
            assert!(report.lower_bound() <= report.objective() + 1e-6);
            assert!(report.gap_percent() < 25.0, "seed {seed}: gap {}", report.gap_percent());
        }
    }
}
