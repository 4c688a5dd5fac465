//! Error types for DeltaSpec

use thiserror::Error;

/// Main error type for DeltaSpec operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Band '{0}' not found in image")]
    BandNotFound(String),

    #[error("Duplicate band name '{0}'")]
    DuplicateBand(String),

    #[error("Band count mismatch: image has {actual} bands, expected {expected}")]
    BandCountMismatch { expected: usize, actual: usize },

    #[error("Band schema mismatch: expected {expected:?}, got {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Unsupported spectral index '{0}'")]
    UnsupportedIndex(String),

    #[error("Image collection is empty")]
    EmptyCollection,

    #[error("Image has no bands")]
    EmptyImage,

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for DeltaSpec operations
pub type Result<T> = std::result::Result<T, Error>;
