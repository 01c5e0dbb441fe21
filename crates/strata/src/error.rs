//! Error types for the high-level API.

pub use strata_store::StoreError;

/// Errors that can occur when using the high-level API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failure reported by the container store.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Operation on a handle that has already been closed.
    #[error("object handle is already closed")]
    Closed,

    /// In-memory and stored element types differ. No coercion is performed,
    /// not even between integer and float types of equal width.
    #[error("source and target have different data types: {memory} vs {stored}")]
    TypeMismatch {
        /// The in-memory (or requested) type.
        memory: String,
        /// The stored type.
        stored: String,
    },

    /// In-memory and stored shapes hold different element counts.
    #[error("source and target have different data spaces: {memory} vs {stored} elements")]
    SpaceMismatch {
        /// Element count of the in-memory value.
        memory: u64,
        /// Element count of the stored extent or selection.
        stored: u64,
    },

    /// `require_dataset` found an existing dataset that does not match the
    /// requested type and space.
    #[error("data set with different type or space already exists: {0}")]
    DatasetExists(String),

    /// The file open-mode string is not one of the supported modes.
    #[error("file mode must be \"r\", \"r+\" or \"w\", got {0:?}")]
    InvalidMode(String),

    /// The null data space has no extent to select within.
    #[error("the null data space cannot accept a selection")]
    SelectionOnNull,
}

pub type Result<T> = std::result::Result<T, Error>;
