//! On-disk encoding of a container tree.
//!
//! Layout: the 8-byte signature, a format version byte, then the root group.
//! A group is a LE `u32` child count followed by its children in name order,
//! each as a length-prefixed name, a node tag, and the node payload. A
//! dataset payload is its datatype, extent, and length-prefixed raw bytes.
//! All integers are little-endian.

use byteorder::{ByteOrder, LittleEndian};

use crate::datatype::Datatype;
use crate::error::StoreError;
use crate::extent::Extent;
use crate::signature::{check_signature, SIGNATURE};
use crate::tree::{DatasetNode, GroupNode, Node};

/// Current container format version.
pub const FORMAT_VERSION: u8 = 1;

const TAG_GROUP: u8 = 1;
const TAG_DATASET: u8 = 2;

/// Encode a full container to bytes.
pub fn encode(root: &GroupNode) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&SIGNATURE);
    buf.push(FORMAT_VERSION);
    encode_group(root, &mut buf);
    buf
}

/// Decode a full container from bytes.
pub fn decode(data: &[u8]) -> Result<GroupNode, StoreError> {
    check_signature(data)?;
    ensure_len(data, 9)?;
    let version = data[8];
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }
    let (root, _) = decode_group(data, 9)?;
    Ok(root)
}

fn encode_group(group: &GroupNode, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(group.children.len() as u32).to_le_bytes());
    for (name, node) in &group.children {
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(name.as_bytes());
        match node {
            Node::Group(g) => {
                buf.push(TAG_GROUP);
                encode_group(g, buf);
            }
            Node::Dataset(ds) => {
                buf.push(TAG_DATASET);
                ds.datatype.serialize(buf);
                ds.extent.serialize(buf);
                buf.extend_from_slice(&(ds.data.len() as u64).to_le_bytes());
                buf.extend_from_slice(&ds.data);
            }
        }
    }
}

fn decode_group(data: &[u8], mut pos: usize) -> Result<(GroupNode, usize), StoreError> {
    ensure_len(data, pos + 4)?;
    let child_count = LittleEndian::read_u32(&data[pos..pos + 4]);
    pos += 4;

    let mut group = GroupNode::default();
    for _ in 0..child_count {
        ensure_len(data, pos + 2)?;
        let name_len = LittleEndian::read_u16(&data[pos..pos + 2]) as usize;
        pos += 2;
        ensure_len(data, pos + name_len + 1)?;
        let name = String::from_utf8_lossy(&data[pos..pos + name_len]).into_owned();
        pos += name_len;

        let tag = data[pos];
        pos += 1;
        let node = match tag {
            TAG_GROUP => {
                let (g, next) = decode_group(data, pos)?;
                pos = next;
                Node::Group(g)
            }
            TAG_DATASET => {
                let (ds, next) = decode_dataset(data, pos)?;
                pos = next;
                Node::Dataset(ds)
            }
            v => {
                return Err(StoreError::InvalidTag {
                    what: "node",
                    value: v,
                })
            }
        };
        group.insert(&name, node)?;
    }
    Ok((group, pos))
}

fn decode_dataset(data: &[u8], mut pos: usize) -> Result<(DatasetNode, usize), StoreError> {
    let (datatype, consumed) = Datatype::parse(&data[pos..])?;
    pos += consumed;
    let (extent, consumed) = Extent::parse(&data[pos..])?;
    pos += consumed;

    ensure_len(data, pos + 8)?;
    let data_len = LittleEndian::read_u64(&data[pos..pos + 8]) as usize;
    pos += 8;
    ensure_len(data, pos + data_len)?;
    let raw = data[pos..pos + data_len].to_vec();
    pos += data_len;

    Ok((
        DatasetNode {
            datatype,
            extent,
            data: raw,
        },
        pos,
    ))
}

fn ensure_len(data: &[u8], needed: usize) -> Result<(), StoreError> {
    if data.len() < needed {
        Err(StoreError::UnexpectedEof {
            expected: needed,
            available: data.len(),
        })
    } else {
        Ok(())
    }
}
