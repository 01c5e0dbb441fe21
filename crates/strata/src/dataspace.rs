//! Copyable shape-and-selection descriptors.
//!
//! A [`Dataspace`] pairs an extent (the full shape) with an active selection
//! (the subset of elements an operation touches). Fresh spaces select
//! everything. Hyperslab selections are validated against the extent when
//! applied — a selection is always a sub-region of the extent.

use strata_store::{Extent, Selection};

use crate::error::{Error, Result};
use crate::slice::{self, Slice};

/// Shape plus active selection of an array-like region.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataspace {
    extent: Extent,
    selection: Selection,
}

impl Dataspace {
    /// The empty/default space: rank 0, size 0, refuses selections.
    pub fn null() -> Dataspace {
        Dataspace {
            extent: Extent::Null,
            selection: Selection::All,
        }
    }

    /// A rank-0 space holding exactly one element.
    pub fn scalar() -> Dataspace {
        Dataspace {
            extent: Extent::Scalar,
            selection: Selection::All,
        }
    }

    /// An N-dimensional space; rank is `dims.len()`, size their product.
    pub fn simple(dims: &[u64]) -> Dataspace {
        Dataspace {
            extent: Extent::Simple(dims.to_vec()),
            selection: Selection::All,
        }
    }

    pub(crate) fn from_extent(extent: Extent) -> Dataspace {
        Dataspace {
            extent,
            selection: Selection::All,
        }
    }

    pub(crate) fn extent(&self) -> &Extent {
        &self.extent
    }

    pub(crate) fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.extent.rank()
    }

    /// Total number of elements in the extent.
    pub fn size(&self) -> u64 {
        self.extent.num_elements()
    }

    /// The per-axis sizes; empty for rank-0 spaces.
    pub fn dims(&self) -> &[u64] {
        self.extent.dims()
    }

    /// Number of elements in the active selection.
    pub fn selection_size(&self) -> u64 {
        match self.extent {
            Extent::Null => 0,
            _ => self.selection.num_elements(self.extent.dims()),
        }
    }

    /// Per-axis inclusive (lower, upper) bounds of the active selection, or
    /// `None` when nothing is selected.
    pub fn selection_bounds(&self) -> Option<Vec<(u64, u64)>> {
        match self.extent {
            Extent::Null => None,
            _ => self.selection.bounds(self.extent.dims()),
        }
    }

    /// Select every element.
    pub fn select_all(self) -> Result<Dataspace> {
        self.with_selection(Selection::All)
    }

    /// Select no elements.
    pub fn select_none(self) -> Result<Dataspace> {
        self.with_selection(Selection::None)
    }

    /// Narrow the active selection to a hyperslab given the native parameter
    /// tuple, one entry per axis.
    pub fn select_hyperslab(
        self,
        start: &[u64],
        stride: &[u64],
        count: &[u64],
        block: &[u64],
    ) -> Result<Dataspace> {
        self.with_selection(Selection::Hyperslab {
            start: start.to_vec(),
            stride: stride.to_vec(),
            count: count.to_vec(),
            block: block.to_vec(),
        })
    }

    /// Narrow the active selection to the region described by one [`Slice`]
    /// per axis.
    pub fn select(self, slices: &[Slice]) -> Result<Dataspace> {
        self.with_selection(slice::to_hyperslab(slices))
    }

    fn with_selection(mut self, selection: Selection) -> Result<Dataspace> {
        if self.extent == Extent::Null {
            return Err(Error::SelectionOnNull);
        }
        selection.validate(self.extent.dims())?;
        self.selection = selection;
        Ok(self)
    }
}

impl Default for Dataspace {
    fn default() -> Dataspace {
        Dataspace::null()
    }
}
