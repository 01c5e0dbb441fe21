//! Open container files: access modes, intent, load and flush.

use std::path::{Path, PathBuf};

use log::debug;

use crate::codec;
use crate::error::StoreError;
use crate::tree::GroupNode;

/// How a container file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Open an existing file for reading; fails if absent.
    ReadOnly,
    /// Open an existing file for reading and writing; fails if absent.
    ReadWrite,
    /// Create a fresh empty file, destroying any prior contents.
    Truncate,
}

/// The access intent a file handle was opened under.
///
/// The concurrent variants are part of the reported vocabulary; none of the
/// access modes above produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ReadWrite,
    ReadOnly,
    ConcurrentWrite,
    ConcurrentRead,
}

/// One open container: its path, intent, and decoded tree.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    intent: Intent,
    root: GroupNode,
    dirty: bool,
}

impl FileStore {
    /// Open a container at `path` under the given mode.
    ///
    /// `Truncate` writes the empty container immediately, so the file exists
    /// on disk (and probes as a container) as soon as this returns.
    pub fn open(path: &Path, mode: AccessMode) -> Result<FileStore, StoreError> {
        match mode {
            AccessMode::ReadOnly | AccessMode::ReadWrite => {
                let bytes = std::fs::read(path)?;
                let root = codec::decode(&bytes)?;
                debug!("loaded container {} ({} bytes)", path.display(), bytes.len());
                Ok(FileStore {
                    path: path.to_path_buf(),
                    intent: if mode == AccessMode::ReadOnly {
                        Intent::ReadOnly
                    } else {
                        Intent::ReadWrite
                    },
                    root,
                    dirty: false,
                })
            }
            AccessMode::Truncate => {
                let root = GroupNode::default();
                std::fs::write(path, codec::encode(&root))?;
                debug!("created container {}", path.display());
                Ok(FileStore {
                    path: path.to_path_buf(),
                    intent: Intent::ReadWrite,
                    root,
                    dirty: false,
                })
            }
        }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn is_writable(&self) -> bool {
        self.intent == Intent::ReadWrite || self.intent == Intent::ConcurrentWrite
    }

    pub fn root(&self) -> &GroupNode {
        &self.root
    }

    /// Mutable access to the tree; fails on a read-only store.
    ///
    /// The store is considered dirty from this point on.
    pub fn root_mut(&mut self) -> Result<&mut GroupNode, StoreError> {
        if !self.is_writable() {
            return Err(StoreError::NotWritable);
        }
        self.dirty = true;
        Ok(&mut self.root)
    }

    /// Write the tree back to disk if it has unsaved changes.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        let bytes = codec::encode(&self.root);
        std::fs::write(&self.path, &bytes)?;
        self.dirty = false;
        debug!("flushed container {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }

    /// Flush and consume the store.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Datatype;
    use crate::extent::Extent;
    use crate::tree::{DatasetNode, Node};

    #[test]
    fn open_missing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.strata");
        assert!(matches!(
            FileStore::open(&path, AccessMode::ReadOnly),
            Err(StoreError::Io(_))
        ));
        assert!(matches!(
            FileStore::open(&path, AccessMode::ReadWrite),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn truncate_creates_empty_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.strata");

        let store = FileStore::open(&path, AccessMode::Truncate).unwrap();
        assert_eq!(store.intent(), Intent::ReadWrite);
        assert!(store.root().children.is_empty());

        // On disk already, before any flush.
        assert!(crate::signature::probe(&path));
    }

    #[test]
    fn truncate_destroys_prior_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clobbered.strata");

        let mut store = FileStore::open(&path, AccessMode::Truncate).unwrap();
        store
            .root_mut()
            .unwrap()
            .insert("g", Node::Group(Default::default()))
            .unwrap();
        store.close().unwrap();

        let store = FileStore::open(&path, AccessMode::Truncate).unwrap();
        assert!(store.root().children.is_empty());
    }

    #[test]
    fn read_only_rejects_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.strata");
        FileStore::open(&path, AccessMode::Truncate)
            .unwrap()
            .close()
            .unwrap();

        let mut store = FileStore::open(&path, AccessMode::ReadOnly).unwrap();
        assert_eq!(store.intent(), Intent::ReadOnly);
        assert!(matches!(store.root_mut(), Err(StoreError::NotWritable)));
    }

    #[test]
    fn flush_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.strata");

        let mut store = FileStore::open(&path, AccessMode::Truncate).unwrap();
        let mut ds = DatasetNode::new(
            Datatype::FloatingPoint { size: 8 },
            Extent::Simple(vec![2]),
        );
        ds.data = 1.5f64
            .to_le_bytes()
            .iter()
            .chain(2.5f64.to_le_bytes().iter())
            .copied()
            .collect();
        store
            .root_mut()
            .unwrap()
            .insert("d", Node::Dataset(ds.clone()))
            .unwrap();
        store.close().unwrap();

        let store = FileStore::open(&path, AccessMode::ReadWrite).unwrap();
        assert_eq!(store.root().child("d"), Some(&Node::Dataset(ds)));
    }

    #[test]
    fn rejects_non_container_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.strata");
        std::fs::write(&path, b"plainly not a container").unwrap();
        assert!(matches!(
            FileStore::open(&path, AccessMode::ReadOnly),
            Err(StoreError::BadSignature)
        ));
    }
}
