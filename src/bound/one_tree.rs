//! Minimum 1-tree under node penalties.
//!
//! # Algorithm
//!
//! With reduced costs `c'(i, j) = c(i, j) + pi[i] + pi[j]`:
//!
//! 1. Prim's algorithm builds a minimum spanning tree over cities `1..n`,
//!    rooted at city 1.
//! 2. City 0 is attached through its two cheapest reduced edges.
//!
//! The resulting graph has `n` edges and every tour is a 1-tree, so
//! `length = mst + two special edges - 2 Σ pi` is a lower bound on the
//! optimal tour cost for any `pi`.
//!
//! # Complexity
//!
//! O(n²) reduced-cost evaluations; the frontier is a binary heap that only
//! receives an entry when a key strictly improves.
//!
//! # Reference
//!
//! Held, M. & Karp, R.M. (1970). "The traveling-salesman problem and minimum
//! spanning trees", *Operations Research* 18(6), 1138-1162.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::distance::CostMatrix;

const NO_PARENT: usize = usize::MAX;

/// Frontier entry, ordered so that the max-heap pops the cheapest key
/// (lowest city index on ties).
#[derive(Debug, Clone, Copy)]
struct Frontier {
    key: f64,
    city: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.city.cmp(&self.city))
    }
}

/// A minimum 1-tree for a fixed penalty vector.
///
/// # Examples
///
/// ```
/// use u_tsp::bound::OneTree;
/// use u_tsp::distance::CostMatrix;
///
/// // Square with unit sides and diagonals of length 2.
/// let costs = CostMatrix::from_fn(4, |i, j| if (i + j) % 2 == 1 { 1.0 } else { 2.0 });
/// let tree = OneTree::build(&costs, &[0.0; 4]);
///
/// assert!((tree.length() - 4.0).abs() < 1e-10);
/// assert_eq!(tree.degree(0), 2);
/// assert!(tree.has_edge(0, 1) && tree.has_edge(0, 3));
/// ```
#[derive(Debug, Clone)]
pub struct OneTree {
    parent: Vec<usize>,
    specials: [usize; 2],
    degree: Vec<usize>,
    length: f64,
}

impl OneTree {
    /// Builds the minimum 1-tree under penalties `pi`.
    ///
    /// # Panics
    ///
    /// Panics if the matrix has fewer than 3 cities or `pi` has the wrong
    /// length.
    pub fn build(costs: &CostMatrix, pi: &[f64]) -> Self {
        let n = costs.size();
        assert!(n >= 3, "a 1-tree needs at least 3 cities, got {n}");
        assert_eq!(pi.len(), n, "penalty vector length");
        let reduced = |i: usize, j: usize| costs.cost(i, j) + pi[i] + pi[j];

        let mut parent = vec![NO_PARENT; n];
        let mut key = vec![f64::INFINITY; n];
        let mut in_tree = vec![false; n];
        let mut degree = vec![0usize; n];
        let mut mst = 0.0;

        key[1] = 0.0;
        let mut heap = BinaryHeap::with_capacity(n);
        heap.push(Frontier { key: 0.0, city: 1 });

        while let Some(Frontier { key: k, city: u }) = heap.pop() {
            if in_tree[u] || k > key[u] {
                continue;
            }
            in_tree[u] = true;
            if parent[u] != NO_PARENT {
                mst += k;
                degree[u] += 1;
                degree[parent[u]] += 1;
            }
            for v in 1..n {
                if in_tree[v] {
                    continue;
                }
                let rc = reduced(u, v);
                if rc < key[v] {
                    key[v] = rc;
                    parent[v] = u;
                    heap.push(Frontier { key: rc, city: v });
                }
            }
        }

        let mut specials = [NO_PARENT; 2];
        let mut best = [f64::INFINITY; 2];
        for i in 1..n {
            let rc = reduced(0, i);
            if rc < best[0] {
                best[1] = best[0];
                specials[1] = specials[0];
                best[0] = rc;
                specials[0] = i;
            } else if rc < best[1] {
                best[1] = rc;
                specials[1] = i;
            }
        }
        degree[0] = 2;
        degree[specials[0]] += 1;
        degree[specials[1]] += 1;

        let length = mst + best[0] + best[1] - 2.0 * pi.iter().sum::<f64>();

        Self {
            parent,
            specials,
            degree,
            length,
        }
    }

    /// Penalized length: `mst + special edges - 2 Σ pi`.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Degree of `city` in the 1-tree.
    pub fn degree(&self, city: usize) -> usize {
        self.degree[city]
    }

    /// Degrees of all cities.
    pub fn degrees(&self) -> &[usize] {
        &self.degree
    }

    /// The two cities attached to city 0.
    pub fn specials(&self) -> [usize; 2] {
        self.specials
    }

    /// Returns `true` if `{a, b}` is an edge of the 1-tree.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        if a == 0 || b == 0 {
            let other = a.max(b);
            return other != 0 && self.specials.contains(&other);
        }
        self.parent[a] == b || self.parent[b] == a
    }

    /// Returns `true` if every city has degree 2, i.e. the 1-tree is a tour.
    pub fn is_tour(&self) -> bool {
        self.degree.iter().all(|&d| d == 2)
    }

    /// All `n` edges: spanning tree edges first, then the two special edges.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parent
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p != NO_PARENT)
            .map(|(v, &p)| (p, v))
            .chain(self.specials.iter().map(|&s| (0, s)))
    }

    /// Raw (unpenalized) length of the stored 1-tree, recomputed from its
    /// edges.
    pub fn check_tree_length(&self, costs: &CostMatrix) -> f64 {
        self.edges().map(|(a, b)| costs.cost(a, b)).sum()
    }
}
