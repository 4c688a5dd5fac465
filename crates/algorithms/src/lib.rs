//! # DeltaSpec Algorithms
//!
//! Spectral indices and change detection for multi-spectral imagery.
//!
//! - **indices**: the spectral-index catalogue (NDVI, kNDVI, NDWI, MNDWI,
//!   RBR, GBR, EGI, GRVI, NDBRBI, SAVI, TSAVI, MSI, LSWI, EVI, HSV, HSV_1)
//! - **mosaic**: quality-mosaic reduction of image collections
//! - **change**: pre/post relative-difference change detection
//! - **masking**: QA60 bit-flag cloud masking
//! - **band math**: the raster-algebra primitives underneath

pub mod bands;

mod band_math;
mod change;
mod hsv;
mod indices;
mod masking;
pub(crate) mod maybe_rayon;
mod mosaic;

pub use band_math::{band_math, band_math_binary, normalized_difference, BandMathOp};
pub use change::{change, ChangeResult, DiffStrategy};
pub use hsv::{hsv, hsv_1};
pub use indices::{
    egi, evi, gbr, grvi, kndvi, lswi, mndwi, msi, ndbrbi, ndvi, ndwi, rbr, savi, tsavi, EviParams,
    SaviParams, SpectralIndex, TsaviParams,
};
pub use masking::mask_clouds;
pub use mosaic::quality_mosaic;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::change::{change, ChangeResult, DiffStrategy};
    pub use crate::indices::SpectralIndex;
    pub use crate::masking::mask_clouds;
    pub use crate::mosaic::quality_mosaic;
    pub use deltaspec_core::prelude::*;
}
