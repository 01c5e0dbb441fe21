//! Groups: named interior locations of a container.

use crate::error::Result;
use crate::handle::Handle;
use crate::location::Location;

/// An open group.
#[derive(Debug)]
pub struct Group {
    handle: Handle,
}

impl Group {
    pub(crate) fn from_handle(handle: Handle) -> Group {
        Group { handle }
    }

    /// Release the group handle; a second close is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

impl Location for Group {
    fn handle(&self) -> &Handle {
        &self.handle
    }
}
