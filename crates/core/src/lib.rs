//! # DeltaSpec Core
//!
//! Core types and I/O for the DeltaSpec change-detection library.
//!
//! This crate provides:
//! - `Raster<T>`: generic single-band raster grid
//! - `Image`: named multi-band image over one shared grid
//! - `ImageCollection`: ordered image sequence with a band-name schema
//! - `GeoTransform` / `CRS`: georeferencing metadata
//! - Native GeoTIFF I/O

pub mod collection;
pub mod crs;
pub mod error;
pub mod image;
pub mod io;
pub mod raster;

pub use collection::ImageCollection;
pub use crs::CRS;
pub use error::{Error, Result};
pub use image::Image;
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::collection::ImageCollection;
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::image::Image;
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
