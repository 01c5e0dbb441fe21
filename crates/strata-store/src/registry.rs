//! The open-object registry.
//!
//! Every open file, group, and dataset is entered into a process-global
//! table and addressed by an opaque [`RawId`]. Callers own the ids they are
//! handed: each open/create call allocates a fresh id, and the matching
//! close call releases it. An id that was never issued, or whose file has
//! been closed, fails every operation with `InvalidHandle`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use log::debug;

use crate::datatype::Datatype;
use crate::error::StoreError;
use crate::extent::Extent;
use crate::file::{AccessMode, FileStore, Intent};
use crate::selection::Selection;
use crate::signature;
use crate::tree::{self, DatasetNode, GroupNode, Node, ObjectKind};

/// Opaque object identifier.
pub type RawId = u64;

/// The sentinel id that never refers to an open object.
pub const INVALID_ID: RawId = 0;

#[derive(Debug, Clone)]
struct Entry {
    /// Id of the file this object lives in (the file's own id for files).
    file: RawId,
    /// Path of the object within the file's tree; empty for the root.
    path: Vec<String>,
    kind: ObjectKind,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: RawId,
    entries: HashMap<RawId, Entry>,
    files: HashMap<RawId, FileStore>,
}

impl Registry {
    fn issue(&mut self, entry: Entry) -> RawId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.insert(id, entry);
        id
    }

    fn entry(&self, id: RawId) -> Result<&Entry, StoreError> {
        self.entries.get(&id).ok_or(StoreError::InvalidHandle)
    }

    /// Resolve a file or group id to its (file id, path) location.
    fn location_of(&self, id: RawId) -> Result<(RawId, Vec<String>), StoreError> {
        let entry = self.entry(id)?;
        match entry.kind {
            ObjectKind::File | ObjectKind::Group => Ok((entry.file, entry.path.clone())),
            ObjectKind::Dataset => Err(StoreError::WrongKind {
                name: entry.path.last().cloned().unwrap_or_default(),
                expected: ObjectKind::Group,
                found: ObjectKind::Dataset,
            }),
        }
    }

    /// Resolve a dataset id to its (file id, path) location.
    fn dataset_of(&self, id: RawId) -> Result<(RawId, Vec<String>), StoreError> {
        let entry = self.entry(id)?;
        match entry.kind {
            ObjectKind::Dataset => Ok((entry.file, entry.path.clone())),
            found => Err(StoreError::WrongKind {
                name: entry.path.last().cloned().unwrap_or_else(|| "/".to_string()),
                expected: ObjectKind::Dataset,
                found,
            }),
        }
    }

    fn store(&self, file: RawId) -> Result<&FileStore, StoreError> {
        self.files.get(&file).ok_or(StoreError::InvalidHandle)
    }

    fn store_mut(&mut self, file: RawId) -> Result<&mut FileStore, StoreError> {
        self.files.get_mut(&file).ok_or(StoreError::InvalidHandle)
    }
}

fn lock() -> MutexGuard<'static, Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| Mutex::new(Registry::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Cheap probe: does `path` name a container file?
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    signature::probe(path)
}

/// Open a container file; the returned id is owned by the caller.
pub fn open_file(path: &Path, mode: AccessMode) -> Result<RawId, StoreError> {
    let store = FileStore::open(path, mode)?;
    let mut reg = lock();
    let id = reg.next_id + 1;
    reg.next_id = id;
    reg.entries.insert(
        id,
        Entry {
            file: id,
            path: Vec::new(),
            kind: ObjectKind::File,
        },
    );
    reg.files.insert(id, store);
    Ok(id)
}

/// Flush and close a file, invalidating ids of objects inside it.
pub fn close_file(id: RawId) -> Result<(), StoreError> {
    let mut reg = lock();
    match reg.entry(id)?.kind {
        ObjectKind::File => {}
        found => {
            return Err(StoreError::WrongKind {
                name: "/".to_string(),
                expected: ObjectKind::File,
                found,
            })
        }
    }
    reg.entries.remove(&id);
    let store = reg.files.remove(&id).ok_or(StoreError::InvalidHandle)?;
    store.close()
}

/// Write a file's unsaved changes back to disk.
pub fn flush_file(id: RawId) -> Result<(), StoreError> {
    let mut reg = lock();
    let (file, _) = reg.location_of(id)?;
    reg.store_mut(file)?.flush()
}

/// The intent a file was opened under.
pub fn file_intent(id: RawId) -> Result<Intent, StoreError> {
    let reg = lock();
    let entry = reg.entry(id)?;
    match entry.kind {
        ObjectKind::File => Ok(reg.store(entry.file)?.intent()),
        found => Err(StoreError::WrongKind {
            name: "/".to_string(),
            expected: ObjectKind::File,
            found,
        }),
    }
}

/// Number of links at this location.
pub fn num_children(id: RawId) -> Result<usize, StoreError> {
    let reg = lock();
    let (file, path) = reg.location_of(id)?;
    let group = tree::group_at(reg.store(file)?.root(), &path)?;
    Ok(group.children.len())
}

/// Name of the `index`-th link at this location, in reported order.
pub fn child_name(id: RawId, index: usize) -> Result<Option<String>, StoreError> {
    let reg = lock();
    let (file, path) = reg.location_of(id)?;
    let group = tree::group_at(reg.store(file)?.root(), &path)?;
    Ok(group.child_name(index).map(str::to_string))
}

/// Kind of the named link, or `None` if absent.
pub fn child_kind(id: RawId, name: &str) -> Result<Option<ObjectKind>, StoreError> {
    let reg = lock();
    let (file, path) = reg.location_of(id)?;
    let group = tree::group_at(reg.store(file)?.root(), &path)?;
    Ok(group.child(name).map(Node::kind))
}

/// Open an existing child group; fails if absent or not a group.
pub fn open_group(parent: RawId, name: &str) -> Result<RawId, StoreError> {
    let mut reg = lock();
    let (file, mut path) = reg.location_of(parent)?;
    {
        let group = tree::group_at(reg.store(file)?.root(), &path)?;
        match group.child(name) {
            Some(Node::Group(_)) => {}
            Some(Node::Dataset(_)) => {
                return Err(StoreError::WrongKind {
                    name: name.to_string(),
                    expected: ObjectKind::Group,
                    found: ObjectKind::Dataset,
                })
            }
            None => return Err(StoreError::NotFound(name.to_string())),
        }
    }
    path.push(name.to_string());
    Ok(reg.issue(Entry {
        file,
        path,
        kind: ObjectKind::Group,
    }))
}

/// Create a fresh child group; fails if the name is taken.
pub fn create_group(parent: RawId, name: &str) -> Result<RawId, StoreError> {
    let mut reg = lock();
    let (file, mut path) = reg.location_of(parent)?;
    {
        let root = reg.store_mut(file)?.root_mut()?;
        let group = tree::group_at_mut(root, &path)?;
        group.insert(name, Node::Group(GroupNode::default()))?;
    }
    debug!("created group {}/{name}", path.join("/"));
    path.push(name.to_string());
    Ok(reg.issue(Entry {
        file,
        path,
        kind: ObjectKind::Group,
    }))
}

/// Release a group id. The file itself is untouched.
pub fn close_group(id: RawId) -> Result<(), StoreError> {
    close_kind(id, ObjectKind::Group)
}

/// Open an existing child dataset; fails if absent or not a dataset.
pub fn open_dataset(parent: RawId, name: &str) -> Result<RawId, StoreError> {
    let mut reg = lock();
    let (file, mut path) = reg.location_of(parent)?;
    {
        let group = tree::group_at(reg.store(file)?.root(), &path)?;
        match group.child(name) {
            Some(Node::Dataset(_)) => {}
            Some(Node::Group(_)) => {
                return Err(StoreError::WrongKind {
                    name: name.to_string(),
                    expected: ObjectKind::Dataset,
                    found: ObjectKind::Group,
                })
            }
            None => return Err(StoreError::NotFound(name.to_string())),
        }
    }
    path.push(name.to_string());
    Ok(reg.issue(Entry {
        file,
        path,
        kind: ObjectKind::Dataset,
    }))
}

/// Create a fresh child dataset with the given element type and extent,
/// zero-filled; fails if the name is taken.
pub fn create_dataset(
    parent: RawId,
    name: &str,
    datatype: Datatype,
    extent: Extent,
) -> Result<RawId, StoreError> {
    let mut reg = lock();
    let (file, mut path) = reg.location_of(parent)?;
    {
        let root = reg.store_mut(file)?.root_mut()?;
        let group = tree::group_at_mut(root, &path)?;
        group.insert(name, Node::Dataset(DatasetNode::new(datatype, extent)))?;
    }
    debug!("created dataset {}/{name}", path.join("/"));
    path.push(name.to_string());
    Ok(reg.issue(Entry {
        file,
        path,
        kind: ObjectKind::Dataset,
    }))
}

/// Release a dataset id. The file itself is untouched.
pub fn close_dataset(id: RawId) -> Result<(), StoreError> {
    close_kind(id, ObjectKind::Dataset)
}

/// The stored element type of a dataset.
pub fn dataset_datatype(id: RawId) -> Result<Datatype, StoreError> {
    let reg = lock();
    let (file, path) = reg.dataset_of(id)?;
    let ds = tree::dataset_at(reg.store(file)?.root(), &path)?;
    Ok(ds.datatype.clone())
}

/// The stored extent of a dataset.
pub fn dataset_extent(id: RawId) -> Result<Extent, StoreError> {
    let reg = lock();
    let (file, path) = reg.dataset_of(id)?;
    let ds = tree::dataset_at(reg.store(file)?.root(), &path)?;
    Ok(ds.extent.clone())
}

/// Read the selected elements of a dataset as raw bytes.
///
/// The selection is validated against the stored extent before any bytes
/// move; `All` returns the whole buffer.
pub fn read_dataset(id: RawId, selection: &Selection) -> Result<Vec<u8>, StoreError> {
    let reg = lock();
    let (file, path) = reg.dataset_of(id)?;
    let ds = tree::dataset_at(reg.store(file)?.root(), &path)?;

    match selection {
        Selection::All => Ok(ds.data.clone()),
        Selection::None => Ok(Vec::new()),
        slab => {
            let dims = ds.extent.dims();
            slab.validate(dims)?;
            let esz = ds.datatype.size();
            let offsets = slab.linear_offsets(dims);
            let mut out = Vec::with_capacity(offsets.len() * esz);
            for off in offsets {
                let at = off as usize * esz;
                out.extend_from_slice(&ds.data[at..at + esz]);
            }
            Ok(out)
        }
    }
}

/// Write raw bytes into the selected elements of a dataset.
///
/// The buffer length must match the selected byte count exactly.
pub fn write_dataset(id: RawId, selection: &Selection, buf: &[u8]) -> Result<(), StoreError> {
    let mut reg = lock();
    let (file, path) = reg.dataset_of(id)?;
    let root = reg.store_mut(file)?.root_mut()?;
    let ds = tree::dataset_at_mut(root, &path)?;

    match selection {
        Selection::All => {
            if buf.len() != ds.data.len() {
                return Err(StoreError::SizeMismatch {
                    expected: ds.data.len(),
                    got: buf.len(),
                });
            }
            ds.data.copy_from_slice(buf);
            Ok(())
        }
        Selection::None => {
            if !buf.is_empty() {
                return Err(StoreError::SizeMismatch {
                    expected: 0,
                    got: buf.len(),
                });
            }
            Ok(())
        }
        slab => {
            let dims = ds.extent.dims().to_vec();
            slab.validate(&dims)?;
            let esz = ds.datatype.size();
            let offsets = slab.linear_offsets(&dims);
            let expected = offsets.len() * esz;
            if buf.len() != expected {
                return Err(StoreError::SizeMismatch {
                    expected,
                    got: buf.len(),
                });
            }
            for (i, off) in offsets.into_iter().enumerate() {
                let at = off as usize * esz;
                ds.data[at..at + esz].copy_from_slice(&buf[i * esz..(i + 1) * esz]);
            }
            Ok(())
        }
    }
}

fn close_kind(id: RawId, expected: ObjectKind) -> Result<(), StoreError> {
    let mut reg = lock();
    let found = reg.entry(id)?.kind;
    if found != expected {
        let name = reg
            .entry(id)?
            .path
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string());
        return Err(StoreError::WrongKind {
            name,
            expected,
            found,
        });
    }
    reg.entries.remove(&id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int32() -> Datatype {
        Datatype::FixedPoint {
            size: 4,
            signed: true,
        }
    }

    fn le_bytes(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn temp_file(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        (dir, path)
    }

    #[test]
    fn file_lifecycle() {
        let (_dir, path) = temp_file("lifecycle.strata");

        assert!(!exists(&path));
        let fid = open_file(&path, AccessMode::Truncate).unwrap();
        assert!(exists(&path));
        assert_eq!(file_intent(fid).unwrap(), Intent::ReadWrite);
        assert_eq!(num_children(fid).unwrap(), 0);

        close_file(fid).unwrap();
        assert!(matches!(num_children(fid), Err(StoreError::InvalidHandle)));
        assert!(matches!(close_file(fid), Err(StoreError::InvalidHandle)));
    }

    #[test]
    fn ids_are_never_reused_across_reopens() {
        let (_dir, path) = temp_file("fresh-ids.strata");
        let a = open_file(&path, AccessMode::Truncate).unwrap();
        close_file(a).unwrap();
        let b = open_file(&path, AccessMode::Truncate).unwrap();
        assert_ne!(a, b);
        close_file(b).unwrap();
    }

    #[test]
    fn group_tree_and_iteration() {
        let (_dir, path) = temp_file("groups.strata");
        let fid = open_file(&path, AccessMode::Truncate).unwrap();

        let g1 = create_group(fid, "group1").unwrap();
        create_group(fid, "group2").unwrap();
        create_group(g1, "nested").unwrap();

        assert_eq!(num_children(fid).unwrap(), 2);
        assert_eq!(child_name(fid, 0).unwrap().as_deref(), Some("group1"));
        assert_eq!(child_name(fid, 1).unwrap().as_deref(), Some("group2"));
        assert_eq!(child_name(fid, 2).unwrap(), None);
        assert_eq!(child_kind(fid, "group1").unwrap(), Some(ObjectKind::Group));
        assert_eq!(child_kind(fid, "absent").unwrap(), None);
        assert_eq!(num_children(g1).unwrap(), 1);

        assert!(matches!(
            create_group(fid, "group1"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            open_group(fid, "absent"),
            Err(StoreError::NotFound(_))
        ));

        close_file(fid).unwrap();
    }

    #[test]
    fn child_ids_die_with_the_file() {
        let (_dir, path) = temp_file("orphans.strata");
        let fid = open_file(&path, AccessMode::Truncate).unwrap();
        let gid = create_group(fid, "g").unwrap();
        close_file(fid).unwrap();

        assert!(matches!(num_children(gid), Err(StoreError::InvalidHandle)));
        // The id itself can still be released.
        close_group(gid).unwrap();
    }

    #[test]
    fn dataset_roundtrip_and_persistence() {
        let (_dir, path) = temp_file("data.strata");
        let fid = open_file(&path, AccessMode::Truncate).unwrap();
        let did = create_dataset(fid, "values", int32(), Extent::Simple(vec![5])).unwrap();

        // Fresh datasets read back as zeroes.
        assert_eq!(
            read_dataset(did, &Selection::All).unwrap(),
            le_bytes(&[0; 5])
        );

        write_dataset(did, &Selection::All, &le_bytes(&[0, 1, 2, 3, 4])).unwrap();
        close_dataset(did).unwrap();
        close_file(fid).unwrap();

        let fid = open_file(&path, AccessMode::ReadOnly).unwrap();
        let did = open_dataset(fid, "values").unwrap();
        assert_eq!(dataset_datatype(did).unwrap(), int32());
        assert_eq!(dataset_extent(did).unwrap(), Extent::Simple(vec![5]));
        assert_eq!(
            read_dataset(did, &Selection::All).unwrap(),
            le_bytes(&[0, 1, 2, 3, 4])
        );
        close_dataset(did).unwrap();
        close_file(fid).unwrap();
    }

    #[test]
    fn selected_read_and_write() {
        let (_dir, path) = temp_file("slabs.strata");
        let fid = open_file(&path, AccessMode::Truncate).unwrap();
        let did = create_dataset(fid, "v", int32(), Extent::Simple(vec![5])).unwrap();
        write_dataset(did, &Selection::All, &le_bytes(&[0, 1, 2, 3, 4])).unwrap();

        let every_other = Selection::Hyperslab {
            start: vec![0],
            stride: vec![2],
            count: vec![2],
            block: vec![1],
        };
        assert_eq!(
            read_dataset(did, &every_other).unwrap(),
            le_bytes(&[0, 2])
        );

        write_dataset(did, &every_other, &le_bytes(&[10, 12])).unwrap();
        assert_eq!(
            read_dataset(did, &Selection::All).unwrap(),
            le_bytes(&[10, 1, 12, 3, 4])
        );

        let past_the_end = Selection::Hyperslab {
            start: vec![2],
            stride: vec![2],
            count: vec![8],
            block: vec![1],
        };
        assert!(matches!(
            read_dataset(did, &past_the_end),
            Err(StoreError::OutOfBounds { .. })
        ));

        close_dataset(did).unwrap();
        close_file(fid).unwrap();
    }

    #[test]
    fn whole_write_length_is_checked() {
        let (_dir, path) = temp_file("sizes.strata");
        let fid = open_file(&path, AccessMode::Truncate).unwrap();
        let did = create_dataset(fid, "v", int32(), Extent::Simple(vec![4])).unwrap();
        assert!(matches!(
            write_dataset(did, &Selection::All, &le_bytes(&[1, 2, 3])),
            Err(StoreError::SizeMismatch {
                expected: 16,
                got: 12
            })
        ));
        close_dataset(did).unwrap();
        close_file(fid).unwrap();
    }

    #[test]
    fn read_only_file_rejects_creation() {
        let (_dir, path) = temp_file("ro.strata");
        let fid = open_file(&path, AccessMode::Truncate).unwrap();
        close_file(fid).unwrap();

        let fid = open_file(&path, AccessMode::ReadOnly).unwrap();
        assert!(matches!(
            create_group(fid, "g"),
            Err(StoreError::NotWritable)
        ));
        close_file(fid).unwrap();
    }

    #[test]
    fn kind_confusion_is_rejected() {
        let (_dir, path) = temp_file("kinds.strata");
        let fid = open_file(&path, AccessMode::Truncate).unwrap();
        let gid = create_group(fid, "g").unwrap();
        let did = create_dataset(fid, "d", int32(), Extent::Scalar).unwrap();

        assert!(matches!(
            open_group(fid, "d"),
            Err(StoreError::WrongKind { .. })
        ));
        assert!(matches!(
            open_dataset(fid, "g"),
            Err(StoreError::WrongKind { .. })
        ));
        assert!(matches!(
            num_children(did),
            Err(StoreError::WrongKind { .. })
        ));
        assert!(matches!(
            dataset_datatype(gid),
            Err(StoreError::WrongKind { .. })
        ));
        assert!(matches!(
            close_group(did),
            Err(StoreError::WrongKind { .. })
        ));

        close_dataset(did).unwrap();
        close_group(gid).unwrap();
        close_file(fid).unwrap();
    }
}
