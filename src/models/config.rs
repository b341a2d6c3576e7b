//! Solver configuration.

use serde::{Deserialize, Serialize};

/// When the penalty vector `pi` (and the candidate table built from it) is
/// recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyRefresh {
    /// Run the subgradient ascent once, before the first restart.
    OncePerSolve,
    /// Continue the ascent from the current `pi` before every restart and
    /// rebuild the candidate table from the refreshed penalties.
    EveryRun,
}

/// How the initial tour of each restart is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialTour {
    /// Greedy walk over candidate lists, preferring 1-tree edges that also
    /// appear in the best tour so far.
    CandidateGreedy,
    /// Plain nearest-neighbor walk from city 0 over raw costs.
    NearestNeighbor,
}

/// Tunable parameters of the Lin-Kernighan solver.
///
/// # Examples
///
/// ```
/// use u_tsp::models::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_max_candidates(7)
///     .with_max_run_times(3)
///     .with_seed(42);
/// assert_eq!(config.max_candidates, 7);
/// assert_eq!(config.max_run_times, 3);
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Neighbors kept per city in the candidate table.
    pub max_candidates: usize,
    /// Depth bound of the sequential move search (the first exchange is level 2).
    pub max_move_level: usize,
    /// Number of restarts.
    pub max_run_times: usize,
    /// Tolerance below which a gain is not considered an improvement.
    pub preciseness: f64,
    /// Initial subgradient step size.
    pub initial_step: f64,
    /// Initial ascent period; `None` means `n / 2`.
    pub initial_period: Option<usize>,
    /// The ascent stops once the step size drops below this value.
    pub min_step: f64,
    /// Weight of the previous subgradient in the blended `pi` update.
    pub momentum: f64,
    /// Penalty refresh policy.
    pub penalty_refresh: PenaltyRefresh,
    /// Initial tour construction.
    pub initial_tour: InitialTour,
    /// Enables the non-sequential 4-opt pass.
    pub non_sequential: bool,
    /// Verifies the tour structure after every improving move.
    pub verify_tree: bool,
    /// Relative tolerance of the objective drift self-check.
    pub drift_tolerance: f64,
    /// RNG seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            max_move_level: 10,
            max_run_times: 10,
            preciseness: 1e-10,
            initial_step: 2.0,
            initial_period: None,
            min_step: 1e-6,
            momentum: 0.3,
            penalty_refresh: PenaltyRefresh::OncePerSolve,
            initial_tour: InitialTour::CandidateGreedy,
            non_sequential: true,
            verify_tree: false,
            drift_tolerance: 1e-6,
            seed: None,
        }
    }
}

impl SolverConfig {
    /// Sets the candidate list length.
    pub fn with_max_candidates(mut self, k: usize) -> Self {
        self.max_candidates = k;
        self
    }

    /// Sets the sequential search depth bound.
    pub fn with_max_move_level(mut self, level: usize) -> Self {
        self.max_move_level = level;
        self
    }

    /// Sets the number of restarts.
    pub fn with_max_run_times(mut self, runs: usize) -> Self {
        self.max_run_times = runs;
        self
    }

    /// Sets the gain tolerance.
    pub fn with_preciseness(mut self, eps: f64) -> Self {
        self.preciseness = eps;
        self
    }

    /// Sets the initial subgradient step.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Sets the initial ascent period.
    pub fn with_initial_period(mut self, period: usize) -> Self {
        self.initial_period = Some(period);
        self
    }

    /// Sets the minimum step size of the ascent.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    /// Sets the momentum of the blended `pi` update.
    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    /// Sets the penalty refresh policy.
    pub fn with_penalty_refresh(mut self, refresh: PenaltyRefresh) -> Self {
        self.penalty_refresh = refresh;
        self
    }

    /// Sets the initial tour construction.
    pub fn with_initial_tour(mut self, initial: InitialTour) -> Self {
        self.initial_tour = initial;
        self
    }

    /// Enables or disables the non-sequential 4-opt pass.
    pub fn with_non_sequential(mut self, enabled: bool) -> Self {
        self.non_sequential = enabled;
        self
    }

    /// Enables or disables tour structure verification after every move.
    pub fn with_verify_tree(mut self, enabled: bool) -> Self {
        self.verify_tree = enabled;
        self
    }

    /// Sets the drift tolerance.
    pub fn with_drift_tolerance(mut self, tol: f64) -> Self {
        self.drift_tolerance = tol;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initial ascent period for an instance of `n` cities.
    pub fn period_for(&self, n: usize) -> usize {
        self.initial_period.unwrap_or(n / 2).max(1)
    }
}
