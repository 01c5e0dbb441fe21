//! N-dimensional slice notation and its hyperslab translation.
//!
//! A [`Slice`] describes one axis of a selection as a half-open, optionally
//! strided index range. A slice per axis translates into the store's
//! hyperslab tuple (start, stride, count, block); the translation itself
//! never rejects anything — rank and bounds are checked when the selection
//! is applied to a data space.

use strata_store::Selection;

/// One axis of a selection: indices `start..stop`, every `step`-th.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: u64,
    pub stop: u64,
    pub step: u64,
}

impl Slice {
    /// The contiguous range `start..stop`.
    pub fn new(start: u64, stop: u64) -> Slice {
        Slice {
            start,
            stop,
            step: 1,
        }
    }

    /// Take every `step`-th index of the range.
    pub fn with_step(mut self, step: u64) -> Slice {
        self.step = step;
        self
    }

    /// Number of indices this slice selects.
    pub fn count(&self) -> u64 {
        if self.step == 0 || self.stop <= self.start {
            return 0;
        }
        let span = self.stop - self.start;
        (span + self.step - 1) / self.step
    }
}

/// Translate one slice per axis into the hyperslab parameter tuple.
///
/// Each axis becomes (start, stride = step, count, block = 1). A zero step
/// is carried through as a zero stride and rejected by selection validation.
pub fn to_hyperslab(slices: &[Slice]) -> Selection {
    let rank = slices.len();
    let mut start = Vec::with_capacity(rank);
    let mut stride = Vec::with_capacity(rank);
    let mut count = Vec::with_capacity(rank);
    for s in slices {
        start.push(s.start);
        stride.push(s.step);
        count.push(s.count());
    }
    Selection::Hyperslab {
        start,
        stride,
        count,
        block: vec![1; rank],
    }
}
