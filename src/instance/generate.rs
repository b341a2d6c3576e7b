//! Deterministic synthetic instances.
//!
//! Both generators draw every value from the caller's RNG, so a seeded
//! [`StdRng`](rand::rngs::StdRng) reproduces the same instance.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::distance::CostMatrix;

/// Symmetric matrix of integer costs drawn uniformly from `[min, max)`.
///
/// # Panics
///
/// Panics if `min >= max`.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_tsp::instance::random_matrix;
///
/// let costs = random_matrix(20, 2, 100, &mut StdRng::seed_from_u64(0));
/// assert_eq!(costs.size(), 20);
/// assert!((2.0..100.0).contains(&costs.cost(3, 17)));
/// ```
pub fn random_matrix<R: Rng + ?Sized>(n: usize, min: u32, max: u32, rng: &mut R) -> CostMatrix {
    assert!(min < max, "empty cost range [{min}, {max})");
    CostMatrix::from_fn(n, |_, _| f64::from(rng.random_range(min..max)))
}

/// Random matrix with a planted Hamiltonian cycle of cost-1 edges.
///
/// Off-cycle costs are drawn from `[min + 1, max)`. The cycle visits a
/// random permutation of the cities. While walking the cycle, each step
/// also sets a random chord to cost 1 with probability 1/2, so the planted
/// cycle is optimal (length `n`) without being the only cheap structure.
///
/// Returns the matrix and the planted cycle.
///
/// # Panics
///
/// Panics if `min + 1 >= max`.
pub fn planted_matrix<R: Rng + ?Sized>(
    n: usize,
    min: u32,
    max: u32,
    rng: &mut R,
) -> (CostMatrix, Vec<usize>) {
    let base = random_matrix(n, min + 1, max, rng);
    let mut grid: Vec<f64> = (0..n * n).map(|k| base.cost(k / n, k % n)).collect();
    let mut set_unit = |a: usize, b: usize| {
        grid[a * n + b] = 1.0;
        grid[b * n + a] = 1.0;
    };

    let mut cycle: Vec<usize> = (0..n).collect();
    cycle.shuffle(rng);
    for w in cycle.windows(2) {
        let (a, b) = (w[0], w[1]);
        set_unit(a, b);
        if rng.random_bool(0.5) {
            let c = rng.random_range(0..n);
            if c != a && c != b {
                set_unit(a, c);
            }
        }
    }
    if let (Some(&first), Some(&last)) = (cycle.first(), cycle.last()) {
        if first != last {
            set_unit(last, first);
        }
    }

    let costs = CostMatrix::from_fn(n, |i, j| grid[i * n + j]);
    (costs, cycle)
}
