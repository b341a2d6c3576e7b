//! Nearest-neighbor tour construction.
//!
//! Starting from city 0, always move to the cheapest unvisited city.
//!
//! # Complexity
//!
//! O(n²).
//!
//! # Reference
//!
//! The simplest constructive heuristic for the TSP. Tours are typically
//! around 25% above optimal, which is enough to seed local search.

use crate::distance::CostMatrix;

/// Builds a tour greedily from city 0, breaking ties by lowest city index.
///
/// Returns an empty vector for an empty matrix.
///
/// # Examples
///
/// ```
/// use u_tsp::constructive::nearest_neighbor;
/// use u_tsp::distance::CostMatrix;
///
/// let costs = CostMatrix::from_coordinates(&[(0.0, 0.0), (10.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
/// assert_eq!(nearest_neighbor(&costs), vec![0, 2, 3, 1]);
/// ```
pub fn nearest_neighbor(costs: &CostMatrix) -> Vec<usize> {
    let n = costs.size();
    if n == 0 {
        return Vec::new();
    }

    let mut unvisited: Vec<usize> = (1..n).collect();
    let mut tour = Vec::with_capacity(n);
    let mut current = 0;
    tour.push(current);

    while let Some(next) = costs.nearest_neighbor(current, &unvisited) {
        // `unvisited` stays sorted so ties resolve to the lowest index.
        if let Ok(pos) = unvisited.binary_search(&next) {
            unvisited.remove(pos);
        }
        tour.push(next);
        current = next;
    }

    tour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nn_line() {
        let costs = CostMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        assert_eq!(nearest_neighbor(&costs), vec![0, 1, 2, 3]);
        assert!((costs.tour_cost(&nearest_neighbor(&costs)) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_nn_chooses_nearest() {
        let costs = CostMatrix::from_coordinates(&[(0.0, 0.0), (10.0, 0.0), (1.0, 0.0)]);
        assert_eq!(nearest_neighbor(&costs), vec![0, 2, 1]);
    }

    #[test]
    fn test_nn_tie_lowest_index() {
        let costs = CostMatrix::from_fn(4, |_, _| 1.0);
        assert_eq!(nearest_neighbor(&costs), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nn_degenerate() {
        assert!(nearest_neighbor(&CostMatrix::from_fn(0, |_, _| 0.0)).is_empty());
        assert_eq!(nearest_neighbor(&CostMatrix::from_fn(1, |_, _| 0.0)), vec![0]);
    }

    #[test]
    fn test_nn_is_permutation() {
        let costs = CostMatrix::from_fn(50, |i, j| ((i * 31 + j * 17) % 23) as f64);
        let mut tour = nearest_neighbor(&costs);
        tour.sort_unstable();
        assert_eq!(tour, (0..50).collect::<Vec<_>>());
    }
}
