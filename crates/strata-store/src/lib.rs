//! Container internals for `strata`.
//!
//! This crate holds the storage side of the workspace: the container tree
//! and its on-disk codec, the element-type / extent / selection value types,
//! and the process-global registry that hands out opaque object ids. The
//! ergonomic object model lives in the `strata` crate on top of this one.

pub mod codec;
pub mod datatype;
pub mod error;
pub mod extent;
pub mod file;
pub mod registry;
pub mod selection;
pub mod signature;
pub mod tree;

pub use datatype::Datatype;
pub use error::StoreError;
pub use extent::Extent;
pub use file::{AccessMode, Intent};
pub use registry::{RawId, INVALID_ID};
pub use selection::Selection;
pub use tree::{ObjectKind, MAX_NAME};
