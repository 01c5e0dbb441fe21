//! Exclusive-ownership wrapper around one store object identifier.
//!
//! A [`Handle`] owns exactly one live id: it is move-only, closes the id
//! through the kind-appropriate release operation exactly once, and carries
//! the invalid sentinel after `close` so that every later operation fails
//! with [`Error::Closed`] instead of touching the store.

use log::debug;
use strata_store::{registry, ObjectKind, RawId, StoreError, INVALID_ID};

use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::{Error, Result};

/// The kind of object a [`Handle`] owns, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    File,
    Group,
    Dataset,
}

impl Kind {
    /// Release an id through this kind's close operation.
    fn release(self, id: RawId) -> std::result::Result<(), StoreError> {
        match self {
            Kind::File => registry::close_file(id),
            Kind::Group => registry::close_group(id),
            Kind::Dataset => registry::close_dataset(id),
        }
    }

    /// Does a stored link of kind `found` satisfy a request for `self`?
    ///
    /// Files are never children of a location, so `Kind::File` matches
    /// nothing.
    fn matches(self, found: ObjectKind) -> bool {
        matches!(
            (self, found),
            (Kind::Group, ObjectKind::Group) | (Kind::Dataset, ObjectKind::Dataset)
        )
    }
}

/// Move-only owner of one store object id.
#[derive(Debug)]
pub struct Handle {
    id: RawId,
    kind: Kind,
}

impl Handle {
    pub(crate) fn new(id: RawId, kind: Kind) -> Handle {
        Handle { id, kind }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Whether this handle still owns a live id.
    pub fn is_open(&self) -> bool {
        self.id != INVALID_ID
    }

    /// The owned id, or [`Error::Closed`].
    pub(crate) fn id(&self) -> Result<RawId> {
        if self.id == INVALID_ID {
            Err(Error::Closed)
        } else {
            Ok(self.id)
        }
    }

    /// Release the owned id. Closing an already-closed handle is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.id == INVALID_ID {
            return Ok(());
        }
        let id = std::mem::replace(&mut self.id, INVALID_ID);
        self.kind.release(id)?;
        Ok(())
    }

    /// Number of links at this location.
    pub fn size(&self) -> Result<usize> {
        Ok(registry::num_children(self.id()?)?)
    }

    /// Lazy iterator over link names at this location, in the store's
    /// reported order. Calling `names` again restarts from the first link.
    pub fn names(&self) -> Result<Names> {
        Ok(Names {
            id: self.id()?,
            index: 0,
            done: false,
        })
    }

    /// Whether a link named `name` exists here and is of kind `kind`.
    pub fn contains(&self, name: &str, kind: Kind) -> Result<bool> {
        let found = registry::child_kind(self.id()?, name)?;
        Ok(match found {
            Some(found) => kind.matches(found),
            None => false,
        })
    }

    pub fn open_group(&self, name: &str) -> Result<Handle> {
        Ok(Handle::new(
            registry::open_group(self.id()?, name)?,
            Kind::Group,
        ))
    }

    pub fn create_group(&self, name: &str) -> Result<Handle> {
        Ok(Handle::new(
            registry::create_group(self.id()?, name)?,
            Kind::Group,
        ))
    }

    pub fn open_dataset(&self, name: &str) -> Result<Handle> {
        Ok(Handle::new(
            registry::open_dataset(self.id()?, name)?,
            Kind::Dataset,
        ))
    }

    pub fn create_dataset(
        &self,
        name: &str,
        datatype: &Datatype,
        space: &Dataspace,
    ) -> Result<Handle> {
        Ok(Handle::new(
            registry::create_dataset(
                self.id()?,
                name,
                datatype.raw().clone(),
                space.extent().clone(),
            )?,
            Kind::Dataset,
        ))
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.id != INVALID_ID {
            if let Err(e) = self.kind.release(self.id) {
                debug!("closing {:?} handle {} on drop failed: {e}", self.kind, self.id);
            }
            self.id = INVALID_ID;
        }
    }
}

/// Lazy, finite iterator over the link names of a location.
#[derive(Debug)]
pub struct Names {
    id: RawId,
    index: usize,
    done: bool,
}

impl Iterator for Names {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match registry::child_name(self.id, self.index) {
            Ok(Some(name)) => {
                self.index += 1;
                Some(Ok(name))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}
