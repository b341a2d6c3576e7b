//! Candidate neighbor lists.
//!
//! For each city `i`, every other city `j` is ranked by `c(i, j) + pi[j]`
//! and the cheapest `k` are kept. The sort is stable, so equal keys stay in
//! ascending index order.

use crate::distance::CostMatrix;

/// Read-only per-city shortlist of promising neighbors.
///
/// # Examples
///
/// ```
/// use u_tsp::candidates::CandidateTable;
/// use u_tsp::distance::CostMatrix;
///
/// let costs = CostMatrix::from_fn(5, |i, j| (i as f64 - j as f64).abs());
/// let table = CandidateTable::build(&costs, &[0.0; 5], 2);
/// assert_eq!(table.candidates(2), &[1, 3]);
/// assert_eq!(table.candidates(0), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct CandidateTable {
    lists: Vec<Vec<usize>>,
}

impl CandidateTable {
    /// Builds the table keeping `k` neighbors per city (fewer when the
    /// instance has at most `k` other cities).
    ///
    /// # Panics
    ///
    /// Panics if `pi` does not have one entry per city.
    pub fn build(costs: &CostMatrix, pi: &[f64], k: usize) -> Self {
        let n = costs.size();
        assert_eq!(pi.len(), n, "penalty vector length");
        let keep = k.min(n.saturating_sub(1));

        let lists = (0..n)
            .map(|i| {
                let mut others: Vec<(f64, usize)> = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| (costs.cost(i, j) + pi[j], j))
                    .collect();
                others.sort_by(|a, b| a.0.total_cmp(&b.0));
                others.truncate(keep);
                others.into_iter().map(|(_, j)| j).collect()
            })
            .collect();

        Self { lists }
    }

    /// Candidates of `city`, cheapest first.
    #[inline]
    pub fn candidates(&self, city: usize) -> &[usize] {
        &self.lists[city]
    }

    /// Returns `true` if `b` is a candidate of `a`.
    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.lists[a].contains(&b)
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Returns `true` if the table covers no cities.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
