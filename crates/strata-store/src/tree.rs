//! The in-memory container tree.
//!
//! A container is a tree of named links: interior nodes are groups, leaves
//! are datasets holding a datatype, an extent, and the raw element bytes.
//! Children are kept in a `BTreeMap`, so the store reports names in
//! lexicographic order.

use std::collections::BTreeMap;
use std::fmt;

use crate::datatype::Datatype;
use crate::error::StoreError;
use crate::extent::Extent;

/// Upper bound on link name length, in bytes.
pub const MAX_NAME: usize = 1024;

/// The kind of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    File,
    Group,
    Dataset,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::File => write!(f, "file"),
            ObjectKind::Group => write!(f, "group"),
            ObjectKind::Dataset => write!(f, "dataset"),
        }
    }
}

/// One node of the container tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(GroupNode),
    Dataset(DatasetNode),
}

impl Node {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Node::Group(_) => ObjectKind::Group,
            Node::Dataset(_) => ObjectKind::Dataset,
        }
    }
}

/// An interior node: named children in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupNode {
    pub children: BTreeMap<String, Node>,
}

/// A leaf node: element type, shape, and raw element bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetNode {
    pub datatype: Datatype,
    pub extent: Extent,
    pub data: Vec<u8>,
}

impl DatasetNode {
    /// A fresh dataset, zero-filled to `datatype.size() * extent elements`.
    pub fn new(datatype: Datatype, extent: Extent) -> Self {
        let len = datatype.size() * extent.num_elements() as usize;
        DatasetNode {
            datatype,
            extent,
            data: vec![0; len],
        }
    }
}

impl GroupNode {
    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Name of the `index`-th child in reported (lexicographic) order.
    pub fn child_name(&self, index: usize) -> Option<&str> {
        self.children.keys().nth(index).map(String::as_str)
    }

    /// Insert a fresh child, enforcing the name bound and uniqueness.
    pub fn insert(&mut self, name: &str, node: Node) -> Result<(), StoreError> {
        if name.len() > MAX_NAME {
            return Err(StoreError::NameTooLong {
                len: name.len(),
                limit: MAX_NAME,
            });
        }
        if self.children.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        self.children.insert(name.to_string(), node);
        Ok(())
    }
}

/// Walk `path` down from `root`, expecting groups at every interior step.
pub fn node_at<'a>(root: &'a GroupNode, path: &[String]) -> Result<&'a Node, StoreError> {
    let (last, interior) = match path.split_last() {
        Some(split) => split,
        // The empty path is the root group itself; callers that need a
        // `Node` for it should not get here.
        None => return Err(StoreError::NotFound(String::new())),
    };
    let mut group = root;
    for name in interior {
        group = group_at_step(group, name)?;
    }
    group
        .child(last)
        .ok_or_else(|| StoreError::NotFound(last.clone()))
}

/// Walk `path` down from `root` to a group; the empty path is `root`.
pub fn group_at<'a>(root: &'a GroupNode, path: &[String]) -> Result<&'a GroupNode, StoreError> {
    let mut group = root;
    for name in path {
        group = group_at_step(group, name)?;
    }
    Ok(group)
}

/// Mutable variant of [`group_at`].
pub fn group_at_mut<'a>(
    root: &'a mut GroupNode,
    path: &[String],
) -> Result<&'a mut GroupNode, StoreError> {
    let mut group = root;
    for name in path {
        let node = group
            .children
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.clone()))?;
        group = match node {
            Node::Group(g) => g,
            Node::Dataset(_) => {
                return Err(StoreError::WrongKind {
                    name: name.clone(),
                    expected: ObjectKind::Group,
                    found: ObjectKind::Dataset,
                })
            }
        };
    }
    Ok(group)
}

/// Walk `path` down from `root` to a dataset.
pub fn dataset_at<'a>(
    root: &'a GroupNode,
    path: &[String],
) -> Result<&'a DatasetNode, StoreError> {
    match node_at(root, path)? {
        Node::Dataset(ds) => Ok(ds),
        Node::Group(_) => Err(StoreError::WrongKind {
            name: path.last().cloned().unwrap_or_default(),
            expected: ObjectKind::Dataset,
            found: ObjectKind::Group,
        }),
    }
}

/// Mutable variant of [`dataset_at`].
pub fn dataset_at_mut<'a>(
    root: &'a mut GroupNode,
    path: &[String],
) -> Result<&'a mut DatasetNode, StoreError> {
    let (last, interior) = match path.split_last() {
        Some(split) => split,
        None => return Err(StoreError::NotFound(String::new())),
    };
    let group = group_at_mut(root, interior)?;
    match group.children.get_mut(last) {
        Some(Node::Dataset(ds)) => Ok(ds),
        Some(Node::Group(_)) => Err(StoreError::WrongKind {
            name: last.clone(),
            expected: ObjectKind::Dataset,
            found: ObjectKind::Group,
        }),
        None => Err(StoreError::NotFound(last.clone())),
    }
}

fn group_at_step<'a>(group: &'a GroupNode, name: &str) -> Result<&'a GroupNode, StoreError> {
    match group.child(name) {
        Some(Node::Group(g)) => Ok(g),
        Some(Node::Dataset(_)) => Err(StoreError::WrongKind {
            name: name.to_string(),
            expected: ObjectKind::Group,
            found: ObjectKind::Dataset,
        }),
        None => Err(StoreError::NotFound(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> GroupNode {
        let mut root = GroupNode::default();
        let mut inner = GroupNode::default();
        inner
            .insert(
                "values",
                Node::Dataset(DatasetNode::new(
                    Datatype::FixedPoint {
                        size: 4,
                        signed: true,
                    },
                    Extent::Simple(vec![3]),
                )),
            )
            .unwrap();
        root.insert("run", Node::Group(inner)).unwrap();
        root.insert("meta", Node::Group(GroupNode::default())).unwrap();
        root
    }

    #[test]
    fn fresh_dataset_is_zero_filled() {
        let ds = DatasetNode::new(
            Datatype::FloatingPoint { size: 8 },
            Extent::Simple(vec![4]),
        );
        assert_eq!(ds.data.len(), 32);
        assert!(ds.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn child_names_in_lexicographic_order() {
        let root = sample_tree();
        assert_eq!(root.child_name(0), Some("meta"));
        assert_eq!(root.child_name(1), Some("run"));
        assert_eq!(root.child_name(2), None);
    }

    #[test]
    fn insert_duplicate_fails() {
        let mut root = sample_tree();
        let err = root
            .insert("run", Node::Group(GroupNode::default()))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(n) if n == "run"));
    }

    #[test]
    fn insert_name_too_long() {
        let mut root = GroupNode::default();
        let name = "x".repeat(MAX_NAME + 1);
        let err = root
            .insert(&name, Node::Group(GroupNode::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NameTooLong {
                len,
                limit: MAX_NAME
            } if len == MAX_NAME + 1
        ));
    }

    #[test]
    fn navigate_to_dataset() {
        let root = sample_tree();
        let path = vec!["run".to_string(), "values".to_string()];
        let ds = dataset_at(&root, &path).unwrap();
        assert_eq!(ds.extent, Extent::Simple(vec![3]));
    }

    #[test]
    fn navigate_wrong_kind() {
        let root = sample_tree();
        let path = vec!["run".to_string()];
        let err = dataset_at(&root, &path).unwrap_err();
        assert!(matches!(
            err,
            StoreError::WrongKind {
                expected: ObjectKind::Dataset,
                found: ObjectKind::Group,
                ..
            }
        ));
    }

    #[test]
    fn navigate_missing() {
        let root = sample_tree();
        let path = vec!["nope".to_string()];
        assert!(matches!(
            node_at(&root, &path),
            Err(StoreError::NotFound(n)) if n == "nope"
        ));
    }

    #[test]
    fn group_at_empty_path_is_root() {
        let root = sample_tree();
        let g = group_at(&root, &[]).unwrap();
        assert_eq!(g.children.len(), 2);
    }
}
