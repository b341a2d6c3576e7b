//! Candidate-guided greedy tour construction.
//!
//! # Algorithm
//!
//! Start at a random city. From the current city pick, in order of
//! preference:
//!
//! 1. the first unvisited candidate joined to it by a 1-tree edge that is
//!    also an edge of the best tour so far (any 1-tree edge before a best
//!    tour exists);
//! 2. the first unvisited candidate;
//! 3. a uniformly random unvisited city.
//!
//! Biasing restarts toward 1-tree and incumbent edges keeps them close to
//! good tours while the random start and fallback diversify them.
//!
//! # Complexity
//!
//! O(n·k) with `k` candidates per city.

use rand::Rng;

use crate::bound::OneTree;
use crate::candidates::CandidateTable;
use crate::models::Tour;

const NOT_REMAINING: usize = usize::MAX;

/// Unvisited cities with O(1) membership test and removal.
struct Remaining {
    cities: Vec<usize>,
    position: Vec<usize>,
}

impl Remaining {
    fn all(n: usize) -> Self {
        Self {
            cities: (0..n).collect(),
            position: (0..n).collect(),
        }
    }

    fn contains(&self, city: usize) -> bool {
        self.position[city] != NOT_REMAINING
    }

    fn remove(&mut self, city: usize) {
        let pos = self.position[city];
        self.cities.swap_remove(pos);
        if let Some(&moved) = self.cities.get(pos) {
            self.position[moved] = pos;
        }
        self.position[city] = NOT_REMAINING;
    }

    fn len(&self) -> usize {
        self.cities.len()
    }

    fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Builds a starting tour over the candidate graph.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_tsp::bound::OneTree;
/// use u_tsp::candidates::CandidateTable;
/// use u_tsp::constructive::candidate_greedy_tour;
/// use u_tsp::distance::CostMatrix;
///
/// let costs = CostMatrix::from_fn(6, |i, j| (i as f64 - j as f64).abs());
/// let pi = vec![0.0; 6];
/// let tree = OneTree::build(&costs, &pi);
/// let table = CandidateTable::build(&costs, &pi, 3);
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let mut tour = candidate_greedy_tour(&table, &tree, None, &mut rng);
/// tour.sort_unstable();
/// assert_eq!(tour, vec![0, 1, 2, 3, 4, 5]);
/// ```
pub fn candidate_greedy_tour<R: Rng + ?Sized>(
    candidates: &CandidateTable,
    tree: &OneTree,
    best: Option<&Tour>,
    rng: &mut R,
) -> Vec<usize> {
    let n = candidates.len();
    if n == 0 {
        return Vec::new();
    }

    let mut remaining = Remaining::all(n);
    let mut tour = Vec::with_capacity(n);
    let mut current = rng.random_range(0..n);
    remaining.remove(current);
    tour.push(current);

    while !remaining.is_empty() {
        let list = candidates.candidates(current);
        let preferred = list.iter().copied().find(|&c| {
            remaining.contains(c)
                && tree.has_edge(current, c)
                && best.map_or(true, |b| b.has_edge(current, c))
        });
        let next = preferred
            .or_else(|| list.iter().copied().find(|&c| remaining.contains(c)))
            .unwrap_or_else(|| remaining.cities[rng.random_range(0..remaining.len())]);

        remaining.remove(next);
        tour.push(next);
        current = next;
    }

    tour
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::CostMatrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup(n: usize, k: usize) -> (CostMatrix, OneTree, CandidateTable) {
        let costs = CostMatrix::from_fn(n, |i, j| ((i * 13 + j * 7) % 17 + 1) as f64);
        let pi = vec![0.0; n];
        let tree = OneTree::build(&costs, &pi);
        let table = CandidateTable::build(&costs, &pi, k);
        (costs, tree, table)
    }

    fn is_permutation(tour: &[usize], n: usize) -> bool {
        let mut sorted = tour.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn test_builds_permutation() {
        let (_, tree, table) = setup(40, 4);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            let tour = candidate_greedy_tour(&table, &tree, None, &mut rng);
            assert!(is_permutation(&tour, 40));
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (_, tree, table) = setup(30, 5);
        let a = candidate_greedy_tour(&table, &tree, None, &mut StdRng::seed_from_u64(9));
        let b = candidate_greedy_tour(&table, &tree, None, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_follows_best_tour_edges() {
        // Cycle instance: 1-tree, candidates and best tour all agree.
        let n = 10;
        let costs = CostMatrix::from_fn(n, |i, j| {
            if i - j == 1 || (i == n - 1 && j == 0) {
                1.0
            } else {
                50.0
            }
        });
        let pi = vec![0.0; n];
        let tree = OneTree::build(&costs, &pi);
        let table = CandidateTable::build(&costs, &pi, 3);
        let best = Tour::from_permutation((0..n).collect()).expect("valid");
        let mut rng = StdRng::seed_from_u64(2);
        let tour = candidate_greedy_tour(&table, &tree, Some(&best), &mut rng);
        assert!((costs.tour_cost(&tour) - n as f64).abs() < 1e-10);
    }

    #[test]
    fn test_random_fallback_with_tiny_lists() {
        let (_, tree, table) = setup(25, 1);
        let mut rng = StdRng::seed_from_u64(3);
        let tour = candidate_greedy_tour(&table, &tree, None, &mut rng);
        assert!(is_permutation(&tour, 25));
    }

    #[test]
    fn test_remaining_swap_remove() {
        let mut r = Remaining::all(5);
        r.remove(1);
        r.remove(4);
        assert!(!r.contains(1));
        assert!(!r.contains(4));
        assert!(r.contains(0) && r.contains(2) && r.contains(3));
        assert_eq!(r.len(), 3);
    }
}
