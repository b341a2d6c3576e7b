//! Plain tour snapshot.

use serde::{Deserialize, Serialize};

use crate::distance::CostMatrix;

/// A closed tour stored as a plain permutation of city indices.
///
/// This is the immutable snapshot handed out by the solver; the mutable
/// search-time representation is [`TourStructure`](crate::tour::TourStructure).
///
/// # Examples
///
/// ```
/// use u_tsp::models::Tour;
///
/// let tour = Tour::from_permutation(vec![2, 0, 3, 1]).expect("permutation");
/// assert_eq!(tour.successor(1), 2);
/// assert_eq!(tour.predecessor(2), 1);
/// assert!(tour.has_edge(0, 3));
/// assert!(!tour.has_edge(0, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    cities: Vec<usize>,
    #[serde(skip)]
    position: Vec<usize>,
}

impl Tour {
    /// Wraps a permutation of `0..n`.
    ///
    /// Returns `None` if `cities` is not a permutation.
    pub fn from_permutation(cities: Vec<usize>) -> Option<Self> {
        let n = cities.len();
        let mut position = vec![usize::MAX; n];
        for (i, &c) in cities.iter().enumerate() {
            if c >= n || position[c] != usize::MAX {
                return None;
            }
            position[c] = i;
        }
        Some(Self { cities, position })
    }

    /// Cities in tour order, starting at the head.
    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Returns `true` if the tour has no cities.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// City following `city`.
    pub fn successor(&self, city: usize) -> usize {
        let p = self.position_of(city);
        self.cities[(p + 1) % self.cities.len()]
    }

    /// City preceding `city`.
    pub fn predecessor(&self, city: usize) -> usize {
        let p = self.position_of(city);
        let n = self.cities.len();
        self.cities[(p + n - 1) % n]
    }

    /// Returns `true` if `a` and `b` are adjacent in either direction.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        a != b && (self.successor(a) == b || self.predecessor(a) == b)
    }

    /// Total cost of the closed tour.
    pub fn cost(&self, costs: &CostMatrix) -> f64 {
        costs.tour_cost(&self.cities)
    }

    /// Consumes the tour, returning the permutation.
    pub fn into_cities(self) -> Vec<usize> {
        self.cities
    }

    fn position_of(&self, city: usize) -> usize {
        // Deserialized tours carry no position index.
        if self.position.len() == self.cities.len() {
            self.position[city]
        } else {
            self.cities
                .iter()
                .position(|&c| c == city)
                .unwrap_or_else(|| panic!("city {city} is not part of the tour"))
        }
    }
}
