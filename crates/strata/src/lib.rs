//! Ergonomic object model for strata container files.
//!
//! A container is a tree of named groups and datasets. Files, groups, and
//! datasets are RAII objects over exclusive-ownership [`Handle`]s: each owns
//! one store id, releases it exactly once, and turns inert once closed.
//! Datatypes and dataspaces are plain copyable values.
//!
//! # Writing
//!
//! ```no_run
//! use strata::{Dataspace, Datatype, File, Location};
//!
//! let file = File::open("run.strata", "w").unwrap();
//! let group = file.require_group("results").unwrap();
//! let ds = group
//!     .require_dataset("values", &Datatype::float64(), &Dataspace::simple(&[3]))
//!     .unwrap();
//! ds.write_f64(&[1.0, 2.0, 3.0]).unwrap();
//! ```
//!
//! # Reading back a selection
//!
//! ```no_run
//! use strata::{File, Location, Slice};
//!
//! let file = File::open("run.strata", "r").unwrap();
//! let ds = file.open_group("results").unwrap().open_dataset("values").unwrap();
//! let head = ds.read_slab_f64(&[Slice::new(0, 2)]).unwrap();
//! assert_eq!(head.len(), 2);
//! ```
//!
//! Reads and writes never coerce: the in-memory type and shape must match
//! what is stored, and mismatches fail before any bytes move.

pub mod dataset;
pub mod dataspace;
pub mod datatype;
pub mod error;
pub mod file;
pub mod group;
pub mod handle;
pub mod location;
pub mod slice;

pub use dataset::Dataset;
pub use dataspace::Dataspace;
pub use datatype::Datatype;
pub use error::{Error, Result, StoreError};
pub use file::{File, Intent};
pub use group::Group;
pub use handle::{Handle, Kind, Names};
pub use location::Location;
pub use slice::Slice;
