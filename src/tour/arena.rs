//! Arena records of the two-level list.
//!
//! Elements and segments reference each other by index into the arenas
//! owned by [`TourStructure`](super::TourStructure); [`NIL`] marks the open
//! ends of a segment's physical element list.

/// Null link.
pub(crate) const NIL: usize = usize::MAX;

/// Per-city record. The city id is the element's index in the arena.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    /// Rank within the owning segment, increasing along `next`.
    pub(crate) rank: i64,
    /// Physical successor inside the segment, or [`NIL`] at the physical end.
    pub(crate) next: usize,
    /// Physical predecessor inside the segment, or [`NIL`] at the physical start.
    pub(crate) prev: usize,
    /// Owning segment.
    pub(crate) segment: usize,
}

/// A contiguous run of elements ("parent" node of the two-level list).
///
/// When `reversed` is set, the tour traverses the run from `last` to
/// `first`, following `prev` links.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    /// Rank around the segment ring, `0` at the head segment.
    pub(crate) id: usize,
    pub(crate) size: usize,
    pub(crate) reversed: bool,
    /// Physical start (lowest rank).
    pub(crate) first: usize,
    /// Physical end (highest rank).
    pub(crate) last: usize,
    /// Successor segment in tour order.
    pub(crate) next: usize,
    /// Predecessor segment in tour order.
    pub(crate) prev: usize,
    /// `false` once merged away and waiting on the free list.
    pub(crate) live: bool,
}

impl Segment {
    pub(crate) fn empty() -> Self {
        Self {
            id: 0,
            size: 0,
            reversed: false,
            first: NIL,
            last: NIL,
            next: NIL,
            prev: NIL,
            live: true,
        }
    }

    /// First element in tour order.
    #[inline]
    pub(crate) fn head(&self) -> usize {
        if self.reversed {
            self.last
        } else {
            self.first
        }
    }

    /// Last element in tour order.
    #[inline]
    pub(crate) fn tail(&self) -> usize {
        if self.reversed {
            self.first
        } else {
            self.last
        }
    }
}
