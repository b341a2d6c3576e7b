//! Held-Karp lower bound by subgradient ascent.
//!
//! # Algorithm
//!
//! Repeatedly builds the minimum 1-tree under penalties `pi` and moves `pi`
//! along the degree subgradient `v[i] = degree(i) - 2`, blended with the
//! previous direction:
//!
//! ```text
//! pi[i] += step * ((1 - m) * v[i] + m * v_prev[i])
//! ```
//!
//! Step schedule: the step halves on the first iteration of a period that
//! fails to improve the best bound; when a period elapses both the step and
//! the period halve. The ascent stops when the period reaches zero, the
//! step drops below `min_step`, or the subgradient vanishes (the 1-tree is
//! a tour and the bound is tight).
//!
//! # Complexity
//!
//! O(n²) per iteration, at most about `2 * initial_period` iterations.

use log::{debug, info};

use crate::distance::CostMatrix;
use crate::models::SolverConfig;

use super::OneTree;

/// Outcome of a subgradient ascent.
#[derive(Debug, Clone)]
pub struct LowerBound {
    value: f64,
    pi: Vec<f64>,
    tree: OneTree,
    history: Vec<f64>,
    iterations: usize,
}

impl LowerBound {
    /// Best 1-tree length found.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Penalty vector that produced the best bound.
    pub fn pi(&self) -> &[f64] {
        &self.pi
    }

    /// Consumes the bound and returns its penalty vector, e.g. to warm-start
    /// a later ascent.
    pub fn into_pi(self) -> Vec<f64> {
        self.pi
    }

    /// The 1-tree achieving the best bound.
    pub fn tree(&self) -> &OneTree {
        &self.tree
    }

    /// Best bound after each iteration; non-decreasing.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of 1-trees built.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Subgradient ascent driver.
///
/// # Examples
///
/// ```
/// use u_tsp::bound::LowerBoundEstimator;
/// use u_tsp::distance::CostMatrix;
/// use u_tsp::models::SolverConfig;
///
/// let costs = CostMatrix::from_fn(6, |i, j| ((i * 7 + j * 3) % 11 + 1) as f64);
/// let bound = LowerBoundEstimator::new(&costs, &SolverConfig::default()).estimate();
///
/// let identity: Vec<usize> = (0..6).collect();
/// assert!(bound.value() <= costs.tour_cost(&identity) + 1e-9);
/// assert!(bound.history().windows(2).all(|w| w[0] <= w[1]));
/// ```
#[derive(Debug, Clone)]
pub struct LowerBoundEstimator<'a> {
    costs: &'a CostMatrix,
    initial_step: f64,
    initial_period: usize,
    min_step: f64,
    momentum: f64,
}

impl<'a> LowerBoundEstimator<'a> {
    /// Creates an estimator using the ascent parameters of `config`.
    pub fn new(costs: &'a CostMatrix, config: &SolverConfig) -> Self {
        Self {
            costs,
            initial_step: config.initial_step,
            initial_period: config.period_for(costs.size()),
            min_step: config.min_step,
            momentum: config.momentum,
        }
    }

    /// Runs the ascent from `pi = 0`.
    pub fn estimate(&self) -> LowerBound {
        self.estimate_from(vec![0.0; self.costs.size()])
    }

    /// Runs the ascent starting from the given penalties.
    ///
    /// # Panics
    ///
    /// Panics if `pi` does not have one entry per city, or the instance has
    /// fewer than 3 cities.
    pub fn estimate_from(&self, mut pi: Vec<f64>) -> LowerBound {
        let n = self.costs.size();
        assert_eq!(pi.len(), n, "penalty vector length");

        let mut step = self.initial_step;
        let mut period = self.initial_period;
        let mut best_value = f64::NEG_INFINITY;
        let mut best: Option<(Vec<f64>, OneTree)> = None;
        let mut history = Vec::new();
        let mut iterations = 0;
        let mut v = vec![0.0; n];
        let mut v_prev: Option<Vec<f64>> = None;

        'ascent: loop {
            let mut halved_in_period = false;
            for _ in 0..period {
                let tree = OneTree::build(self.costs, &pi);
                iterations += 1;

                let improved = best_value < tree.length();
                if improved {
                    best_value = tree.length();
                } else if !halved_in_period {
                    step /= 2.0;
                    halved_in_period = true;
                }
                history.push(best_value);

                for (vi, &d) in v.iter_mut().zip(tree.degrees()) {
                    *vi = d as f64 - 2.0;
                }
                let tour_found = tree.is_tour();
                if improved {
                    best = Some((pi.clone(), tree));
                }
                if tour_found {
                    debug!("ascent: 1-tree is a tour after {iterations} iterations");
                    break 'ascent;
                }

                let prev = v_prev.get_or_insert_with(|| v.clone());
                for ((p, &vi), &vp) in pi.iter_mut().zip(&v).zip(prev.iter()) {
                    *p += step * ((1.0 - self.momentum) * vi + self.momentum * vp);
                }
                prev.copy_from_slice(&v);

                if step < self.min_step {
                    break 'ascent;
                }
            }

            debug!(
                "ascent: period {period} done, step {step:.3e}, bound {best_value:.4}, {iterations} iterations"
            );
            period /= 2;
            step /= 2.0;
            if period == 0 || step < self.min_step {
                break;
            }
        }

        let (pi, tree) = match best {
            Some(found) => found,
            // Zero-length period; still report the bound at `pi`.
            None => {
                let tree = OneTree::build(self.costs, &pi);
                best_value = tree.length();
                history.push(best_value);
                iterations += 1;
                (pi, tree)
            }
        };
        info!("lower bound {best_value:.4} after {iterations} ascent iterations");

        LowerBound {
            value: best_value,
            pi,
            tree,
            history,
            iterations,
        }
    }
}
