//! Error types for the container store.

use std::fmt;

use crate::tree::ObjectKind;

/// Errors that can occur in the container store and object registry.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error from the filesystem.
    Io(std::io::Error),
    /// The container signature was not found at the start of the file.
    BadSignature,
    /// The container format version is not supported.
    UnsupportedVersion(u8),
    /// Unexpected end of data while decoding.
    UnexpectedEof {
        /// Number of bytes expected.
        expected: usize,
        /// Number of bytes actually available.
        available: usize,
    },
    /// An encoded tag byte has no known meaning.
    InvalidTag {
        /// What kind of field carried the tag.
        what: &'static str,
        /// The offending byte.
        value: u8,
    },
    /// The identifier does not refer to an open object.
    InvalidHandle,
    /// Mutation attempted on a store opened read-only.
    NotWritable,
    /// No link with the given name exists at this location.
    NotFound(String),
    /// A link exists but is not of the requested kind.
    WrongKind {
        /// Link name.
        name: String,
        /// The kind the caller asked for.
        expected: ObjectKind,
        /// The kind actually stored.
        found: ObjectKind,
    },
    /// A link with the given name already exists.
    AlreadyExists(String),
    /// A link name exceeds the fixed name bound.
    NameTooLong {
        /// Length of the offending name.
        len: usize,
        /// The bound.
        limit: usize,
    },
    /// A selection's rank does not match the extent's rank.
    RankMismatch {
        /// Extent rank.
        expected: usize,
        /// Selection rank.
        got: usize,
    },
    /// A hyperslab's per-axis description is degenerate.
    BadHyperslab {
        /// The offending axis.
        axis: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A selection reaches past the extent on some axis.
    OutOfBounds {
        /// The offending axis.
        axis: usize,
        /// One past the last selected index on that axis.
        end: u64,
        /// The extent on that axis.
        extent: u64,
    },
    /// A raw buffer's length does not match the selected byte count.
    SizeMismatch {
        /// Byte count implied by the selection.
        expected: usize,
        /// Byte count supplied.
        got: usize,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::BadSignature => write!(f, "container signature not found"),
            StoreError::UnsupportedVersion(v) => {
                write!(f, "unsupported container version: {v}")
            }
            StoreError::UnexpectedEof {
                expected,
                available,
            } => {
                write!(f, "unexpected EOF: need {expected} bytes, have {available}")
            }
            StoreError::InvalidTag { what, value } => {
                write!(f, "invalid {what} tag: {value:#04x}")
            }
            StoreError::InvalidHandle => {
                write!(f, "identifier does not refer to an open object")
            }
            StoreError::NotWritable => write!(f, "store was opened read-only"),
            StoreError::NotFound(name) => write!(f, "no such link: {name}"),
            StoreError::WrongKind {
                name,
                expected,
                found,
            } => {
                write!(f, "link {name} is a {found}, not a {expected}")
            }
            StoreError::AlreadyExists(name) => {
                write!(f, "link already exists: {name}")
            }
            StoreError::NameTooLong { len, limit } => {
                write!(f, "link names longer than {limit} are not supported (got {len})")
            }
            StoreError::RankMismatch { expected, got } => {
                write!(f, "selection rank {got} does not match extent rank {expected}")
            }
            StoreError::BadHyperslab { axis, reason } => {
                write!(f, "bad hyperslab on axis {axis}: {reason}")
            }
            StoreError::OutOfBounds { axis, end, extent } => {
                write!(
                    f,
                    "selection reaches {end} on axis {axis}, past the extent of {extent}"
                )
            }
            StoreError::SizeMismatch { expected, got } => {
                write!(f, "buffer of {got} bytes does not match selection of {expected} bytes")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}
