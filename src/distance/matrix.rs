//! Symmetric cost matrix.

use crate::models::InstanceError;

/// A symmetric n×n cost matrix stored as its strict lower triangle.
///
/// `cost(i, j) == cost(j, i)` by construction; the diagonal is not stored
/// and reads as zero. Immutable once built.
///
/// # Examples
///
/// ```
/// use u_tsp::distance::CostMatrix;
///
/// let rows = vec![
///     vec![0.0, 3.0, 4.0],
///     vec![3.0, 0.0, 5.0],
///     vec![4.0, 5.0, 0.0],
/// ];
/// let costs = CostMatrix::from_rows(&rows).expect("valid matrix");
/// assert_eq!(costs.size(), 3);
/// assert!((costs.cost(2, 1) - 5.0).abs() < 1e-10);
/// assert!((costs.tour_cost(&[0, 1, 2]) - 12.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct CostMatrix {
    data: Vec<f64>,
    size: usize,
}

impl CostMatrix {
    /// Builds a matrix from `f(i, j)` evaluated for every `i > j`.
    ///
    /// No validation is performed; use [`from_rows`](Self::from_rows) for
    /// untrusted input.
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(size * size.saturating_sub(1) / 2);
        for i in 1..size {
            for j in 0..i {
                data.push(f(i, j));
            }
        }
        Self { data, size }
    }

    /// Builds a matrix from explicit rows, checking shape, symmetry, and
    /// that every off-diagonal cost is finite and non-negative.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, InstanceError> {
        let n = rows.len();
        if n == 0 {
            return Err(InstanceError::Empty);
        }
        for (row, r) in rows.iter().enumerate() {
            if r.len() != n {
                return Err(InstanceError::RaggedRow {
                    row,
                    len: r.len(),
                    expected: n,
                });
            }
        }
        Self::validated(n, |i, j| rows[i][j])
    }

    /// Builds a matrix from an explicit row-major n×n grid.
    pub fn from_full(size: usize, data: &[f64]) -> Result<Self, InstanceError> {
        if size == 0 {
            return Err(InstanceError::Empty);
        }
        if data.len() != size * size {
            return Err(InstanceError::DataLength {
                len: data.len(),
                expected: size * size,
            });
        }
        Self::validated(size, |i, j| data[i * size + j])
    }

    /// Rounded Euclidean distances between 2D points (TSPLIB `EUC_2D`).
    pub fn from_coordinates(points: &[(f64, f64)]) -> Self {
        Self::from_fn(points.len(), |i, j| {
            let dx = points[i].0 - points[j].0;
            let dy = points[i].1 - points[j].1;
            (dx * dx + dy * dy).sqrt().round()
        })
    }

    fn validated<F>(n: usize, at: F) -> Result<Self, InstanceError>
    where
        F: Fn(usize, usize) -> f64,
    {
        for i in 1..n {
            for j in 0..i {
                let forward = at(i, j);
                let backward = at(j, i);
                if !forward.is_finite() || forward < 0.0 {
                    return Err(InstanceError::InvalidCost { i, j, value: forward });
                }
                if !backward.is_finite() || backward < 0.0 {
                    return Err(InstanceError::InvalidCost {
                        i: j,
                        j: i,
                        value: backward,
                    });
                }
                if (forward - backward).abs() > 1e-9 * forward.abs().max(1.0) {
                    return Err(InstanceError::Asymmetric {
                        i,
                        j,
                        forward,
                        backward,
                    });
                }
            }
        }
        Ok(Self::from_fn(n, at))
    }

    /// Cost of the edge `{i, j}`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn cost(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "city out of bounds: ({i}, {j})");
        match i.cmp(&j) {
            std::cmp::Ordering::Greater => self.data[i * (i - 1) / 2 + j],
            std::cmp::Ordering::Less => self.data[j * (j - 1) / 2 + i],
            std::cmp::Ordering::Equal => 0.0,
        }
    }

    /// Number of cities.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of the closed tour visiting `tour` in order.
    pub fn tour_cost(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }
        let closing = self.cost(tour[tour.len() - 1], tour[0]);
        tour.windows(2)
            .map(|w| self.cost(w[0], w[1]))
            .sum::<f64>()
            + closing
    }

    /// Returns the cheapest neighbor of `from` among `candidates`, lowest
    /// index first on ties.
    ///
    /// Returns `None` if `candidates` is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates.iter().copied().min_by(|&a, &b| {
            self.cost(from, a)
                .total_cmp(&self.cost(from, b))
                .then(a.cmp(&b))
        })
    }

    /// Dumps the full row-major matrix, diagonal included.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.size)
            .map(|i| (0..self.size).map(|j| self.cost(i, j)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CostMatrix {
        CostMatrix::from_rows(&[
            vec![0.0, 5.0, 8.0],
            vec![5.0, 0.0, 2.0],
            vec![8.0, 2.0, 0.0],
        ])
        .expect("valid")
    }

    #[test]
    fn test_symmetric_lookup() {
        let m = sample();
        assert_eq!(m.size(), 3);
        assert!((m.cost(0, 1) - 5.0).abs() < 1e-10);
        assert!((m.cost(1, 0) - 5.0).abs() < 1e-10);
        assert!((m.cost(2, 1) - 2.0).abs() < 1e-10);
        assert_eq!(m.cost(1, 1), 0.0);
    }

    #[test]
    fn test_from_full() {
        let m = CostMatrix::from_full(2, &[0.0, 5.0, 5.0, 0.0]).expect("valid");
        assert_eq!(m.cost(0, 1), 5.0);
    }

    #[test]
    fn test_from_full_invalid_size() {
        assert_eq!(
            CostMatrix::from_full(2, &[0.0, 1.0, 2.0]).unwrap_err(),
            InstanceError::DataLength { len: 3, expected: 4 }
        );
    }

    #[test]
    fn test_rejects_asymmetric() {
        let err = CostMatrix::from_rows(&[vec![0.0, 10.0], vec![15.0, 0.0]]).unwrap_err();
        assert!(matches!(err, InstanceError::Asymmetric { i: 1, j: 0, .. }));
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let err = CostMatrix::from_rows(&[vec![0.0, -1.0], vec![-1.0, 0.0]]).unwrap_err();
        assert!(matches!(err, InstanceError::InvalidCost { .. }));
        let err = CostMatrix::from_rows(&[vec![0.0, f64::NAN], vec![f64::NAN, 0.0]]).unwrap_err();
        assert!(matches!(err, InstanceError::InvalidCost { .. }));
    }

    #[test]
    fn test_rejects_ragged_and_empty() {
        assert_eq!(CostMatrix::from_rows(&[]).unwrap_err(), InstanceError::Empty);
        let err = CostMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, InstanceError::RaggedRow { row: 1, .. }));
    }

    #[test]
    fn test_diagonal_ignored() {
        let m = CostMatrix::from_rows(&[vec![7.0, 1.0], vec![1.0, 9.0]]).expect("valid");
        assert_eq!(m.cost(0, 0), 0.0);
    }

    #[test]
    fn test_from_coordinates_rounds() {
        let m = CostMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0), (1.0, 1.0)]);
        assert_eq!(m.cost(0, 1), 5.0);
        // sqrt(2) rounds to 1
        assert_eq!(m.cost(0, 2), 1.0);
    }

    #[test]
    fn test_tour_cost() {
        let m = sample();
        assert!((m.tour_cost(&[0, 1, 2]) - 15.0).abs() < 1e-10);
        assert_eq!(m.tour_cost(&[1]), 0.0);
    }

    #[test]
    fn test_nearest_neighbor() {
        let m = sample();
        assert_eq!(m.nearest_neighbor(1, &[0, 2]), Some(2));
        assert_eq!(m.nearest_neighbor(0, &[2]), Some(2));
        assert_eq!(m.nearest_neighbor(0, &[]), None);
    }

    #[test]
    fn test_to_rows_roundtrip() {
        let m = sample();
        let again = CostMatrix::from_rows(&m.to_rows()).expect("valid");
        assert_eq!(again.cost(0, 2), 8.0);
    }
}
