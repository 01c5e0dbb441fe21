//! Container files: open modes, intent, and the root location.

use std::path::Path;

use log::debug;
use strata_store::{registry, AccessMode};

use crate::error::{Error, Result};
use crate::handle::{Handle, Kind};
use crate::location::Location;

pub use strata_store::Intent;

/// An open container file. The file itself is the root location.
#[derive(Debug)]
pub struct File {
    handle: Handle,
}

impl File {
    /// Cheap probe: does `path` name a container file? Never opens the
    /// container tree; matches whether an open for reading would succeed in
    /// finding one.
    pub fn exists<P: AsRef<Path>>(path: P) -> bool {
        registry::exists(path)
    }

    /// Open `path` under one of the supported modes:
    ///
    /// - `"r"` — read-only; fails if the file is absent,
    /// - `"r+"` — read-write; fails if the file is absent,
    /// - `"w"` — create a fresh empty file, destroying prior contents.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<File> {
        let access = match mode {
            "r" => AccessMode::ReadOnly,
            "r+" => AccessMode::ReadWrite,
            "w" => AccessMode::Truncate,
            other => return Err(Error::InvalidMode(other.to_string())),
        };
        debug!("opening {} with mode {mode:?}", path.as_ref().display());
        let id = registry::open_file(path.as_ref(), access)?;
        Ok(File {
            handle: Handle::new(id, Kind::File),
        })
    }

    /// The access intent this file was opened under.
    pub fn intent(&self) -> Result<Intent> {
        Ok(registry::file_intent(self.handle.id()?)?)
    }

    /// Write unsaved changes back to disk without closing.
    pub fn flush(&self) -> Result<()> {
        Ok(registry::flush_file(self.handle.id()?)?)
    }

    /// Flush and release the file handle; a second close is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }
}

impl Location for File {
    fn handle(&self) -> &Handle {
        &self.handle
    }
}
