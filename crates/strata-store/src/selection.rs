//! Hyperslab selection for partial dataset I/O.
//!
//! A [`Selection`] describes which elements of a stored array to read or
//! write. The interesting form is a hyperslab — a regular, strided
//! rectangular sub-region described per axis by (start, stride, count,
//! block). Selections are validated against an extent before any I/O;
//! nothing is silently clamped.

use std::ops::Range;

use crate::error::StoreError;

/// A selection describing which elements of a stored array to access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Select every element of the extent.
    All,

    /// Select no elements.
    None,

    /// A regular hyperslab selection.
    ///
    /// For each axis:
    /// - `start[d]` — first element index
    /// - `stride[d]` — step between consecutive blocks
    /// - `count[d]` — number of blocks
    /// - `block[d]` — consecutive elements per block
    Hyperslab {
        start: Vec<u64>,
        stride: Vec<u64>,
        count: Vec<u64>,
        block: Vec<u64>,
    },
}

impl Selection {
    /// Create a contiguous hyperslab from ranges (one per axis), i.e. a
    /// hyperslab with stride 1 and block 1.
    pub fn slice(ranges: &[Range<u64>]) -> Self {
        let rank = ranges.len();
        let mut start = Vec::with_capacity(rank);
        let mut count = Vec::with_capacity(rank);
        for r in ranges {
            start.push(r.start);
            count.push(r.end.saturating_sub(r.start));
        }
        Selection::Hyperslab {
            start,
            stride: vec![1; rank],
            count,
            block: vec![1; rank],
        }
    }

    /// The rank of this selection, when it has one of its own.
    pub fn rank(&self) -> Option<usize> {
        match self {
            Selection::All | Selection::None => Option::None,
            Selection::Hyperslab { start, .. } => Some(start.len()),
        }
    }

    /// Number of selected elements for an extent with the given axis sizes.
    pub fn num_elements(&self, dims: &[u64]) -> u64 {
        match self {
            Selection::All => dims.iter().product(),
            Selection::None => 0,
            Selection::Hyperslab { count, block, .. } => {
                count.iter().zip(block.iter()).map(|(&c, &b)| c * b).product()
            }
        }
    }

    /// Check this selection against an extent's axis sizes.
    ///
    /// A hyperslab must have the extent's rank on all four axes vectors,
    /// non-degenerate stride/block, and must lie entirely inside the extent.
    /// `All` and `None` fit any extent.
    pub fn validate(&self, dims: &[u64]) -> Result<(), StoreError> {
        let (start, stride, count, block) = match self {
            Selection::All | Selection::None => return Ok(()),
            Selection::Hyperslab {
                start,
                stride,
                count,
                block,
            } => (start, stride, count, block),
        };

        let rank = dims.len();
        for axis_len in [start.len(), stride.len(), count.len(), block.len()] {
            if axis_len != rank {
                return Err(StoreError::RankMismatch {
                    expected: rank,
                    got: axis_len,
                });
            }
        }

        for axis in 0..rank {
            if stride[axis] == 0 {
                return Err(StoreError::BadHyperslab {
                    axis,
                    reason: "stride of zero",
                });
            }
            if block[axis] == 0 {
                return Err(StoreError::BadHyperslab {
                    axis,
                    reason: "block of zero",
                });
            }
            if count[axis] > 1 && block[axis] > stride[axis] {
                return Err(StoreError::BadHyperslab {
                    axis,
                    reason: "blocks overlap (block exceeds stride)",
                });
            }
            if count[axis] > 0 {
                let end = start[axis] + (count[axis] - 1) * stride[axis] + block[axis];
                if end > dims[axis] {
                    return Err(StoreError::OutOfBounds {
                        axis,
                        end,
                        extent: dims[axis],
                    });
                }
            }
        }
        Ok(())
    }

    /// Per-axis inclusive (lower, upper) bounds of the selection, or `None`
    /// when nothing is selected.
    pub fn bounds(&self, dims: &[u64]) -> Option<Vec<(u64, u64)>> {
        match self {
            Selection::All => {
                if dims.iter().any(|&d| d == 0) {
                    return Option::None;
                }
                Some(dims.iter().map(|&d| (0, d - 1)).collect())
            }
            Selection::None => Option::None,
            Selection::Hyperslab {
                start,
                stride,
                count,
                block,
            } => {
                if count.iter().any(|&c| c == 0) || block.iter().any(|&b| b == 0) {
                    return Option::None;
                }
                Some(
                    (0..start.len())
                        .map(|d| {
                            let upper = start[d] + (count[d] - 1) * stride[d] + block[d] - 1;
                            (start[d], upper)
                        })
                        .collect(),
                )
            }
        }
    }

    /// Row-major linear offsets of the selected elements within an extent of
    /// the given axis sizes, in odometer order (last axis fastest).
    ///
    /// The selection must already have been validated against `dims`.
    pub fn linear_offsets(&self, dims: &[u64]) -> Vec<u64> {
        match self {
            Selection::All => (0..dims.iter().product()).collect(),
            Selection::None => Vec::new(),
            Selection::Hyperslab {
                start,
                stride,
                count,
                block,
            } => {
                let rank = dims.len();
                // Selected indices per axis: block runs at strided starts.
                let mut axes: Vec<Vec<u64>> = Vec::with_capacity(rank);
                for d in 0..rank {
                    let mut idx = Vec::with_capacity((count[d] * block[d]) as usize);
                    for c in 0..count[d] {
                        let base = start[d] + c * stride[d];
                        for b in 0..block[d] {
                            idx.push(base + b);
                        }
                    }
                    axes.push(idx);
                }
                if axes.iter().any(|a| a.is_empty()) {
                    return Vec::new();
                }

                // Row-major strides of the extent.
                let mut row_stride = vec![1u64; rank];
                for d in (0..rank.saturating_sub(1)).rev() {
                    row_stride[d] = row_stride[d + 1] * dims[d + 1];
                }

                let total: usize = axes.iter().map(|a| a.len()).product();
                let mut out = Vec::with_capacity(total);
                let mut odo = vec![0usize; rank];
                loop {
                    let lin = (0..rank).map(|d| axes[d][odo[d]] * row_stride[d]).sum();
                    out.push(lin);

                    // Advance the odometer, last axis fastest.
                    let mut d = rank;
                    loop {
                        if d == 0 {
                            return out;
                        }
                        d -= 1;
                        odo[d] += 1;
                        if odo[d] < axes[d].len() {
                            break;
                        }
                        odo[d] = 0;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_num_elements() {
        assert_eq!(Selection::All.num_elements(&[100, 200]), 20000);
        // A rank-0 extent holds one element.
        assert_eq!(Selection::All.num_elements(&[]), 1);
    }

    #[test]
    fn none_num_elements() {
        assert_eq!(Selection::None.num_elements(&[100, 200]), 0);
    }

    #[test]
    fn slice_basic() {
        let sel = Selection::slice(&[20..30, 40..60]);
        assert_eq!(sel.num_elements(&[100, 100]), 200);
        assert_eq!(sel.rank(), Some(2));
        assert!(sel.validate(&[100, 100]).is_ok());
    }

    #[test]
    fn validate_rank_mismatch() {
        let sel = Selection::slice(&[0..2]);
        let err = sel.validate(&[5, 5]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::RankMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn validate_out_of_bounds() {
        // start=2, count=8, stride=2 reaches index 16 in a 5-element axis.
        let sel = Selection::Hyperslab {
            start: vec![2],
            stride: vec![2],
            count: vec![8],
            block: vec![1],
        };
        let err = sel.validate(&[5]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::OutOfBounds {
                axis: 0,
                end: 17,
                extent: 5
            }
        ));
    }

    #[test]
    fn validate_degenerate() {
        let sel = Selection::Hyperslab {
            start: vec![0],
            stride: vec![0],
            count: vec![2],
            block: vec![1],
        };
        assert!(matches!(
            sel.validate(&[5]),
            Err(StoreError::BadHyperslab { axis: 0, .. })
        ));

        let sel = Selection::Hyperslab {
            start: vec![0],
            stride: vec![1],
            count: vec![2],
            block: vec![2],
        };
        assert!(matches!(
            sel.validate(&[8]),
            Err(StoreError::BadHyperslab { axis: 0, .. })
        ));
    }

    #[test]
    fn bounds_inclusive() {
        let sel = Selection::Hyperslab {
            start: vec![0],
            stride: vec![2],
            count: vec![2],
            block: vec![1],
        };
        assert_eq!(sel.bounds(&[5]), Some(vec![(0, 2)]));

        assert_eq!(Selection::All.bounds(&[5]), Some(vec![(0, 4)]));
        assert_eq!(Selection::None.bounds(&[5]), None);

        let empty = Selection::Hyperslab {
            start: vec![1],
            stride: vec![1],
            count: vec![0],
            block: vec![1],
        };
        assert_eq!(empty.bounds(&[5]), None);
    }

    #[test]
    fn offsets_1d_contiguous() {
        let sel = Selection::slice(&[1..4]);
        assert_eq!(sel.linear_offsets(&[5]), vec![1, 2, 3]);
    }

    #[test]
    fn offsets_1d_strided() {
        let sel = Selection::Hyperslab {
            start: vec![0],
            stride: vec![2],
            count: vec![3],
            block: vec![1],
        };
        assert_eq!(sel.linear_offsets(&[6]), vec![0, 2, 4]);
    }

    #[test]
    fn offsets_2d_row_major() {
        // Rows 1..3, columns 0..2 of a 4x4 extent.
        let sel = Selection::slice(&[1..3, 0..2]);
        assert_eq!(sel.linear_offsets(&[4, 4]), vec![4, 5, 8, 9]);
    }

    #[test]
    fn offsets_2d_blocked() {
        // Two 1x2 blocks along the second axis at stride 3.
        let sel = Selection::Hyperslab {
            start: vec![0, 0],
            stride: vec![1, 3],
            count: vec![1, 2],
            block: vec![1, 2],
        };
        assert_eq!(sel.linear_offsets(&[2, 6]), vec![0, 1, 3, 4]);
    }

    #[test]
    fn offsets_all_scalar() {
        assert_eq!(Selection::All.linear_offsets(&[]), vec![0]);
    }

    #[test]
    fn offsets_empty_count() {
        let sel = Selection::Hyperslab {
            start: vec![0],
            stride: vec![1],
            count: vec![0],
            block: vec![1],
        };
        assert!(sel.linear_offsets(&[5]).is_empty());
    }
}
