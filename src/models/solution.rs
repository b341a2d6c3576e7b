//! Solve report.

use serde::{Deserialize, Serialize};

use super::Tour;

/// Outcome of a full solve: the best tour over all restarts together with
/// the lower bound it is measured against.
///
/// # Examples
///
/// ```
/// use u_tsp::models::{SolveReport, Tour};
///
/// let tour = Tour::from_permutation(vec![0, 1, 2]).expect("permutation");
/// let report = SolveReport::new(tour, 110.0, 100.0, vec![120.0, 110.0], 40);
/// assert!((report.gap_percent() - 10.0).abs() < 1e-10);
/// assert_eq!(report.best_run(), Some(1));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    tour: Tour,
    objective: f64,
    lower_bound: f64,
    run_objectives: Vec<f64>,
    ascent_iterations: usize,
}

impl SolveReport {
    /// Creates a report.
    pub fn new(
        tour: Tour,
        objective: f64,
        lower_bound: f64,
        run_objectives: Vec<f64>,
        ascent_iterations: usize,
    ) -> Self {
        Self {
            tour,
            objective,
            lower_bound,
            run_objectives,
            ascent_iterations,
        }
    }

    /// Best tour found.
    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Cost of the best tour.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// 1-tree lower bound on the optimal tour cost.
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// `(objective - lower_bound) / lower_bound * 100`.
    ///
    /// Zero when the bound is not positive.
    pub fn gap_percent(&self) -> f64 {
        gap_percent(self.objective, self.lower_bound)
    }

    /// Locally optimal objective reached by each restart, in run order.
    pub fn run_objectives(&self) -> &[f64] {
        &self.run_objectives
    }

    /// Index of the run that produced the best tour.
    pub fn best_run(&self) -> Option<usize> {
        self.run_objectives
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    /// Subgradient iterations spent on the lower bound.
    pub fn ascent_iterations(&self) -> usize {
        self.ascent_iterations
    }
}

/// Percentage gap of `objective` over `lower_bound`.
pub(crate) fn gap_percent(objective: f64, lower_bound: f64) -> f64 {
    if lower_bound > 0.0 {
        (objective - lower_bound) / lower_bound * 100.0
    } else {
        0.0
    }
}
