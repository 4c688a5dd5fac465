//! Sentinel-2 L2A band names
//!
//! The index catalogue resolves its inputs by these names. Images built
//! from other sensors work as long as they expose the same names for the
//! equivalent wavelengths.

/// Blue (490 nm)
pub const BLUE: &str = "B2";
/// Green (560 nm)
pub const GREEN: &str = "B3";
/// Red (665 nm)
pub const RED: &str = "B4";
/// Red edge (740 nm)
pub const RED_EDGE: &str = "B6";
/// Near infrared (842 nm)
pub const NIR: &str = "B8";
/// Shortwave infrared 1 (1610 nm)
pub const SWIR1: &str = "B11";
/// Shortwave infrared 2 (2190 nm)
pub const SWIR2: &str = "B12";
/// Quality assurance bitmask band
pub const QA: &str = "QA60";
