//! The shared container capability of files and groups.

use crate::dataset::Dataset;
use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::{Error, Result};
use crate::group::Group;
use crate::handle::{Handle, Kind, Names};

/// A location holds named child groups and datasets. [`crate::File`] and
/// [`Group`] both implement it over their owned [`Handle`].
pub trait Location {
    /// The handle this location operates through.
    #[doc(hidden)]
    fn handle(&self) -> &Handle;

    /// Whether the underlying handle is still open.
    fn is_open(&self) -> bool {
        self.handle().is_open()
    }

    /// Number of links at this location.
    fn size(&self) -> Result<usize> {
        self.handle().size()
    }

    /// Lazy iterator over link names, in the store's reported order.
    fn names(&self) -> Result<Names> {
        self.handle().names()
    }

    /// Whether a child group named `name` exists.
    fn contains_group(&self, name: &str) -> Result<bool> {
        self.handle().contains(name, Kind::Group)
    }

    /// Whether a child dataset named `name` exists.
    fn contains_dataset(&self, name: &str) -> Result<bool> {
        self.handle().contains(name, Kind::Dataset)
    }

    /// Open an existing child group; fails if absent or not a group.
    fn open_group(&self, name: &str) -> Result<Group> {
        Ok(Group::from_handle(self.handle().open_group(name)?))
    }

    /// Create a fresh child group; fails if the name is taken.
    fn create_group(&self, name: &str) -> Result<Group> {
        Ok(Group::from_handle(self.handle().create_group(name)?))
    }

    /// Open an existing child dataset; fails if absent or not a dataset.
    fn open_dataset(&self, name: &str) -> Result<Dataset> {
        Ok(Dataset::from_handle(self.handle().open_dataset(name)?))
    }

    /// Create a fresh child dataset with the given type and space; fails if
    /// the name is taken.
    fn create_dataset(
        &self,
        name: &str,
        datatype: &Datatype,
        space: &Dataspace,
    ) -> Result<Dataset> {
        Ok(Dataset::from_handle(self.handle().create_dataset(
            name,
            datatype,
            space,
        )?))
    }

    /// Open the child group `name`, creating it first if absent. Calling
    /// this repeatedly with the same name is idempotent.
    fn require_group(&self, name: &str) -> Result<Group> {
        if self.contains_group(name)? {
            self.open_group(name)
        } else {
            self.create_group(name)
        }
    }

    /// Open the child dataset `name` if it exists with exactly the requested
    /// type and space, or create it fresh. An existing dataset with a
    /// different type or extent is an error.
    fn require_dataset(
        &self,
        name: &str,
        datatype: &Datatype,
        space: &Dataspace,
    ) -> Result<Dataset> {
        if self.contains_dataset(name)? {
            let dataset = self.open_dataset(name)?;
            if dataset.datatype()? != *datatype
                || dataset.dataspace()?.extent() != space.extent()
            {
                return Err(Error::DatasetExists(name.to_string()));
            }
            Ok(dataset)
        } else {
            self.create_dataset(name, datatype, space)
        }
    }
}
