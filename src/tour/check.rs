//! Structural validation of [`TourStructure`].

use std::fmt;

use super::arena::NIL;
use super::TourStructure;

/// A broken invariant found by [`TourStructure::check_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViolation {
    /// The segment ring does not close or disagrees with `segment_count`.
    SegmentRing { expected: usize, found: usize },
    /// A segment's `prev` link does not point back to its ring predecessor.
    SegmentLink { segment: usize },
    /// Segment ids are not `0..m` in ring order from the head.
    SegmentId { segment: usize, expected: usize, found: usize },
    /// An element's owner differs from the segment that lists it.
    Ownership { city: usize, listed_in: usize, owner: usize },
    /// Ranks are not consecutive along a segment.
    Rank { city: usize },
    /// Physical links inside a segment are inconsistent.
    ElementLink { city: usize },
    /// A segment's stored size differs from its element count.
    SegmentSize { segment: usize, stored: usize, counted: usize },
    /// A segment's size lies outside the balance bounds.
    Balance { segment: usize, size: usize, lower: usize, upper: usize },
    /// Walking `next` from the head does not visit every city exactly once.
    Cycle { visited: usize, expected: usize },
    /// `prev` is not the inverse of `next` at some city.
    Inverse { city: usize },
}

impl fmt::Display for TreeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SegmentRing { expected, found } => {
                write!(f, "segment ring holds {found} segments, expected {expected}")
            }
            Self::SegmentLink { segment } => {
                write!(f, "segment {segment} has an inconsistent ring link")
            }
            Self::SegmentId {
                segment,
                expected,
                found,
            } => write!(f, "segment {segment} has id {found}, expected {expected}"),
            Self::Ownership {
                city,
                listed_in,
                owner,
            } => write!(
                f,
                "city {city} is listed in segment {listed_in} but owned by {owner}"
            ),
            Self::Rank { city } => write!(f, "city {city} breaks rank order"),
            Self::ElementLink { city } => write!(f, "city {city} has inconsistent links"),
            Self::SegmentSize {
                segment,
                stored,
                counted,
            } => write!(
                f,
                "segment {segment} stores size {stored} but holds {counted} cities"
            ),
            Self::Balance {
                segment,
                size,
                lower,
                upper,
            } => write!(
                f,
                "segment {segment} has size {size} outside [{lower}, {upper}]"
            ),
            Self::Cycle { visited, expected } => {
                write!(f, "tour walk visits {visited} cities, expected {expected}")
            }
            Self::Inverse { city } => write!(f, "prev(next({city})) != {city}"),
        }
    }
}

impl std::error::Error for TreeViolation {}

impl TourStructure {
    /// Verifies every structural invariant: segment ring and ids, element
    /// ownership, ranks, sizes, balance, and that `next`/`prev` form a single
    /// Hamiltonian cycle.
    ///
    /// Intended for tests and debug verification; runs in O(n).
    pub fn check_tree(&self) -> Result<(), TreeViolation> {
        let n = self.len();
        let mut counted_cities = 0;

        let mut s = self.head;
        let mut ring = 0;
        loop {
            if ring >= self.segments.len() || !self.segments[s].live {
                return Err(TreeViolation::SegmentRing {
                    expected: self.segment_count,
                    found: ring,
                });
            }
            let seg = &self.segments[s];
            if seg.id != ring {
                return Err(TreeViolation::SegmentId {
                    segment: s,
                    expected: ring,
                    found: seg.id,
                });
            }
            if self.segments[seg.next].prev != s {
                return Err(TreeViolation::SegmentLink { segment: s });
            }

            let mut e = seg.first;
            let mut prev = NIL;
            let mut counted = 0;
            while e != NIL {
                let el = &self.elements[e];
                if el.segment != s {
                    return Err(TreeViolation::Ownership {
                        city: e,
                        listed_in: s,
                        owner: el.segment,
                    });
                }
                if el.prev != prev {
                    return Err(TreeViolation::ElementLink { city: e });
                }
                if prev != NIL && el.rank != self.elements[prev].rank + 1 {
                    return Err(TreeViolation::Rank { city: e });
                }
                counted += 1;
                if counted > n {
                    return Err(TreeViolation::ElementLink { city: e });
                }
                prev = e;
                e = el.next;
            }
            if prev != seg.last {
                return Err(TreeViolation::ElementLink { city: seg.last });
            }
            if counted != seg.size {
                return Err(TreeViolation::SegmentSize {
                    segment: s,
                    stored: seg.size,
                    counted,
                });
            }
            if self.segment_count > 1 && (seg.size < self.lower || seg.size > self.upper) {
                return Err(TreeViolation::Balance {
                    segment: s,
                    size: seg.size,
                    lower: self.lower,
                    upper: self.upper,
                });
            }
            counted_cities += counted;

            ring += 1;
            s = seg.next;
            if s == self.head {
                break;
            }
        }
        if ring != self.segment_count {
            return Err(TreeViolation::SegmentRing {
                expected: self.segment_count,
                found: ring,
            });
        }
        if counted_cities != n {
            return Err(TreeViolation::Cycle {
                visited: counted_cities,
                expected: n,
            });
        }

        let mut seen = vec![false; n];
        let mut city = self.head_city();
        for visited in 0..n {
            if seen[city] {
                return Err(TreeViolation::Cycle { visited, expected: n });
            }
            seen[city] = true;
            let next = self.next(city);
            if self.prev(next) != city {
                return Err(TreeViolation::Inverse { city });
            }
            city = next;
        }
        if city != self.head_city() {
            return Err(TreeViolation::Cycle {
                visited: n,
                expected: n,
            });
        }
        Ok(())
    }
}
