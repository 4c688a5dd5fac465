//! Spectral index catalogue
//!
//! Per-pixel band-algebra indices over multi-band [`Image`]s: vegetation
//! (NDVI, kNDVI, SAVI, TSAVI, EVI, GRVI), water (NDWI, MNDWI, LSWI),
//! moisture (MSI), bareness (NDBRBI) and visible-band ratios (RBR, GBR,
//! EGI), plus the color-space indices in [`crate::hsv`].
//!
//! Every index takes one image, resolves its input bands by name, and
//! returns a new image holding exactly the band(s) it defines, renamed
//! by the index name.

use std::fmt;
use std::str::FromStr;

use crate::band_math::{band_math, band_math_binary, build_output, is_nodata_f64, BandMathOp};
use crate::band_math::normalized_difference;
use crate::bands;
use crate::hsv;
use crate::maybe_rayon::*;
use deltaspec_core::image::Image;
use deltaspec_core::raster::Raster;
use deltaspec_core::{Error, Result};

/// Closed enumeration of the supported spectral indices.
///
/// Parsed from the canonical index name at the boundary; an unknown name
/// fails with [`Error::UnsupportedIndex`] before any raster work starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralIndex {
    /// Normalized Difference Vegetation Index
    Ndvi,
    /// Kernel NDVI
    Kndvi,
    /// Normalized Difference Water Index (McFeeters)
    Ndwi,
    /// Modified NDWI (Xu, uses SWIR)
    Mndwi,
    /// Red Band Ratio
    Rbr,
    /// Green Band Ratio
    Gbr,
    /// Excess Green Index
    Egi,
    /// Green-Red Vegetation Index
    Grvi,
    /// Normalized Difference Blue-Red Bareness Index
    Ndbrbi,
    /// Soil Adjusted Vegetation Index
    Savi,
    /// Transformed Soil Adjusted Vegetation Index
    Tsavi,
    /// Moisture Stress Index
    Msi,
    /// Land Surface Water Index
    Lswi,
    /// Enhanced Vegetation Index
    Evi,
    /// Hue of the (SWIR2, NIR, Red) triple in HSV space
    Hsv,
    /// Custom hue/value/saturation decomposition of (SWIR1, NIR, Red)
    Hsv1,
}

impl SpectralIndex {
    /// Every supported index, in catalogue order
    pub const ALL: [SpectralIndex; 16] = [
        SpectralIndex::Ndvi,
        SpectralIndex::Kndvi,
        SpectralIndex::Ndwi,
        SpectralIndex::Mndwi,
        SpectralIndex::Rbr,
        SpectralIndex::Gbr,
        SpectralIndex::Egi,
        SpectralIndex::Grvi,
        SpectralIndex::Ndbrbi,
        SpectralIndex::Savi,
        SpectralIndex::Tsavi,
        SpectralIndex::Msi,
        SpectralIndex::Lswi,
        SpectralIndex::Evi,
        SpectralIndex::Hsv,
        SpectralIndex::Hsv1,
    ];

    /// Canonical index name; also the primary output band name
    pub fn name(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "NDVI",
            SpectralIndex::Kndvi => "kNDVI",
            SpectralIndex::Ndwi => "NDWI",
            SpectralIndex::Mndwi => "MNDWI",
            SpectralIndex::Rbr => "RBR",
            SpectralIndex::Gbr => "GBR",
            SpectralIndex::Egi => "EGI",
            SpectralIndex::Grvi => "GRVI",
            SpectralIndex::Ndbrbi => "NDBRBI",
            SpectralIndex::Savi => "SAVI",
            SpectralIndex::Tsavi => "TSAVI",
            SpectralIndex::Msi => "MSI",
            SpectralIndex::Lswi => "LSWI",
            SpectralIndex::Evi => "EVI",
            SpectralIndex::Hsv => "HSV",
            SpectralIndex::Hsv1 => "HSV_1",
        }
    }

    /// Input bands this index resolves by name
    pub fn required_bands(&self) -> &'static [&'static str] {
        match self {
            SpectralIndex::Ndvi | SpectralIndex::Kndvi => &[bands::NIR, bands::RED],
            SpectralIndex::Ndwi => &[bands::GREEN, bands::NIR],
            SpectralIndex::Mndwi => &[bands::GREEN, bands::SWIR1],
            SpectralIndex::Rbr | SpectralIndex::Gbr | SpectralIndex::Egi => {
                &[bands::RED, bands::GREEN, bands::BLUE]
            }
            SpectralIndex::Grvi => &[bands::GREEN, bands::RED],
            SpectralIndex::Ndbrbi => &[bands::BLUE, bands::RED],
            SpectralIndex::Savi | SpectralIndex::Tsavi => &[bands::NIR, bands::RED],
            SpectralIndex::Msi | SpectralIndex::Lswi => &[bands::NIR, bands::SWIR1],
            SpectralIndex::Evi => &[bands::NIR, bands::RED, bands::BLUE, bands::RED_EDGE],
            SpectralIndex::Hsv => &[bands::SWIR2, bands::NIR, bands::RED],
            SpectralIndex::Hsv1 => &[bands::SWIR1, bands::NIR, bands::RED],
        }
    }

    /// Compute this index for one image.
    ///
    /// Validates the required bands exist before touching any pixel.
    pub fn apply(&self, image: &Image) -> Result<Image> {
        for band in self.required_bands() {
            if !image.has_band(band) {
                return Err(Error::BandNotFound(band.to_string()));
            }
        }

        match self {
            SpectralIndex::Ndvi => ndvi(image),
            SpectralIndex::Kndvi => kndvi(image),
            SpectralIndex::Ndwi => ndwi(image),
            SpectralIndex::Mndwi => mndwi(image),
            SpectralIndex::Rbr => rbr(image),
            SpectralIndex::Gbr => gbr(image),
            SpectralIndex::Egi => egi(image),
            SpectralIndex::Grvi => grvi(image),
            SpectralIndex::Ndbrbi => ndbrbi(image),
            SpectralIndex::Savi => savi(image, SaviParams::default()),
            SpectralIndex::Tsavi => tsavi(image, TsaviParams::default()),
            SpectralIndex::Msi => msi(image),
            SpectralIndex::Lswi => lswi(image),
            SpectralIndex::Evi => evi(image, EviParams::default()),
            SpectralIndex::Hsv => hsv::hsv(image),
            SpectralIndex::Hsv1 => hsv::hsv_1(image),
        }
    }
}

impl FromStr for SpectralIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SpectralIndex::ALL
            .iter()
            .copied()
            .find(|idx| idx.name() == s)
            .ok_or_else(|| Error::UnsupportedIndex(s.to_string()))
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// NDVI family
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
pub fn ndvi(image: &Image) -> Result<Image> {
    let nir = image.band(bands::NIR)?;
    let red = image.band(bands::RED)?;
    Ok(Image::from_band("NDVI", normalized_difference(nir, red)?))
}

/// Kernel NDVI
///
/// `kNDVI = tanh(NDVI^2)`
pub fn kndvi(image: &Image) -> Result<Image> {
    let base = ndvi(image)?;
    let out = band_math(base.band("NDVI")?, |v| (v * v).tanh())?;
    Ok(Image::from_band("kNDVI", out))
}

/// Normalized Difference Water Index (McFeeters, 1996)
///
/// `NDWI = (Green - NIR) / (Green + NIR)`
pub fn ndwi(image: &Image) -> Result<Image> {
    let green = image.band(bands::GREEN)?;
    let nir = image.band(bands::NIR)?;
    Ok(Image::from_band("NDWI", normalized_difference(green, nir)?))
}

/// Modified Normalized Difference Water Index (Xu, 2006)
///
/// `MNDWI = (Green - SWIR1) / (Green + SWIR1)`
pub fn mndwi(image: &Image) -> Result<Image> {
    let green = image.band(bands::GREEN)?;
    let swir = image.band(bands::SWIR1)?;
    Ok(Image::from_band("MNDWI", normalized_difference(green, swir)?))
}

/// Green-Red Vegetation Index (Tucker, 1979)
///
/// `GRVI = (Green - Red) / (Green + Red)`
pub fn grvi(image: &Image) -> Result<Image> {
    let green = image.band(bands::GREEN)?;
    let red = image.band(bands::RED)?;
    Ok(Image::from_band("GRVI", normalized_difference(green, red)?))
}

/// Normalized Difference Blue-Red Bareness Index
///
/// `NDBRBI = (Blue - Red) / (Blue + Red)`
pub fn ndbrbi(image: &Image) -> Result<Image> {
    let blue = image.band(bands::BLUE)?;
    let red = image.band(bands::RED)?;
    Ok(Image::from_band("NDBRBI", normalized_difference(blue, red)?))
}

/// Land Surface Water Index
///
/// `LSWI = (NIR - SWIR1) / (NIR + SWIR1)`
pub fn lswi(image: &Image) -> Result<Image> {
    let nir = image.band(bands::NIR)?;
    let swir = image.band(bands::SWIR1)?;
    Ok(Image::from_band("LSWI", normalized_difference(nir, swir)?))
}

/// Moisture Stress Index
///
/// `MSI = SWIR1 / NIR`
pub fn msi(image: &Image) -> Result<Image> {
    let swir = image.band(bands::SWIR1)?;
    let nir = image.band(bands::NIR)?;
    let out = band_math_binary(swir, nir, BandMathOp::Divide)?;
    Ok(Image::from_band("MSI", out))
}

// ---------------------------------------------------------------------------
// Visible-band ratios
// ---------------------------------------------------------------------------

/// Share of one visible band in the R+G+B sum
fn visible_share(
    part: &Raster<f64>,
    red: &Raster<f64>,
    green: &Raster<f64>,
    blue: &Raster<f64>,
) -> Result<Raster<f64>> {
    let (rows, cols) = part.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let p = unsafe { part.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };
                let g = unsafe { green.get_unchecked(row, col) };
                let b = unsafe { blue.get_unchecked(row, col) };

                if p.is_nan() || r.is_nan() || g.is_nan() || b.is_nan() {
                    continue;
                }

                let sum = r + g + b;
                if sum.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = p / sum;
            }
            row_data
        })
        .collect();

    build_output(part, rows, cols, data)
}

/// Red Band Ratio
///
/// `RBR = Red / (Red + Green + Blue)`
pub fn rbr(image: &Image) -> Result<Image> {
    let red = image.band(bands::RED)?;
    let green = image.band(bands::GREEN)?;
    let blue = image.band(bands::BLUE)?;
    Ok(Image::from_band("RBR", visible_share(red, red, green, blue)?))
}

/// Green Band Ratio
///
/// `GBR = Green / (Red + Green + Blue)`
pub fn gbr(image: &Image) -> Result<Image> {
    let red = image.band(bands::RED)?;
    let green = image.band(bands::GREEN)?;
    let blue = image.band(bands::BLUE)?;
    Ok(Image::from_band("GBR", visible_share(green, red, green, blue)?))
}

/// Excess Green Index
///
/// `EGI = 2 * Green - Red - Blue`
pub fn egi(image: &Image) -> Result<Image> {
    let red = image.band(bands::RED)?;
    let green = image.band(bands::GREEN)?;
    let blue = image.band(bands::BLUE)?;

    let (rows, cols) = green.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let r = unsafe { red.get_unchecked(row, col) };
                let g = unsafe { green.get_unchecked(row, col) };
                let b = unsafe { blue.get_unchecked(row, col) };

                if r.is_nan() || g.is_nan() || b.is_nan() {
                    continue;
                }

                row_data[col] = 2.0 * g - r - b;
            }
            row_data
        })
        .collect();

    Ok(Image::from_band("EGI", build_output(green, rows, cols, data)?))
}

// ---------------------------------------------------------------------------
// SAVI
// ---------------------------------------------------------------------------

/// Parameters for SAVI
#[derive(Debug, Clone)]
pub struct SaviParams {
    /// Soil brightness correction factor
    pub l_factor: f64,
}

impl Default for SaviParams {
    fn default() -> Self {
        Self { l_factor: 0.5 }
    }
}

/// Soil Adjusted Vegetation Index (Huete, 1988)
///
/// `SAVI = ((NIR - Red) / (Red + NIR + L)) * (1 + L)`
pub fn savi(image: &Image, params: SaviParams) -> Result<Image> {
    let nir = image.band(bands::NIR)?;
    let red = image.band(bands::RED)?;
    let l = params.l_factor;

    let (rows, cols) = nir.shape();
    let nodata_nir = nir.nodata();
    let nodata_red = red.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let n = unsafe { nir.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };

                if is_nodata_f64(n, nodata_nir) || is_nodata_f64(r, nodata_red) {
                    continue;
                }

                let denom = r + n + l;
                if denom.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = ((n - r) / denom) * (1.0 + l);
            }
            row_data
        })
        .collect();

    Ok(Image::from_band("SAVI", build_output(nir, rows, cols, data)?))
}

// ---------------------------------------------------------------------------
// TSAVI
// ---------------------------------------------------------------------------

/// Parameters for TSAVI
#[derive(Debug, Clone)]
pub struct TsaviParams {
    /// Slope of the soil line
    pub slope: f64,
    /// Intercept of the soil line
    pub intercept: f64,
}

impl Default for TsaviParams {
    fn default() -> Self {
        Self {
            slope: 0.33,
            intercept: 0.1,
        }
    }
}

/// Transformed Soil Adjusted Vegetation Index (Baret et al., 1989)
///
/// `TSAVI = a * (NIR - a * Red - c) / (Red + a * NIR - a * c)`
///
/// with soil-line slope `a` and intercept `c`.
pub fn tsavi(image: &Image, params: TsaviParams) -> Result<Image> {
    let nir = image.band(bands::NIR)?;
    let red = image.band(bands::RED)?;
    let a = params.slope;
    let c = params.intercept;

    let (rows, cols) = nir.shape();
    let nodata_nir = nir.nodata();
    let nodata_red = red.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let n = unsafe { nir.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };

                if is_nodata_f64(n, nodata_nir) || is_nodata_f64(r, nodata_red) {
                    continue;
                }

                let denom = r + a * n - a * c;
                if denom.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = a * (n - a * r - c) / denom;
            }
            row_data
        })
        .collect();

    Ok(Image::from_band("TSAVI", build_output(nir, rows, cols, data)?))
}

// ---------------------------------------------------------------------------
// EVI
// ---------------------------------------------------------------------------

/// Parameters for EVI
#[derive(Debug, Clone)]
pub struct EviParams {
    /// Gain factor
    pub gain: f64,
    /// Coefficient for the red-edge term
    pub c1: f64,
    /// Aerosol coefficient for the blue band
    pub c2: f64,
    /// Canopy background adjustment
    pub l: f64,
}

impl Default for EviParams {
    fn default() -> Self {
        Self {
            gain: 2.5,
            c1: 6.0,
            c2: 7.5,
            l: 1.0,
        }
    }
}

/// Enhanced Vegetation Index
///
/// `EVI = G * (NIR - Red) / (NIR + C1 * RedEdge - C2 * Blue + L)`
///
/// Sentinel-2 variant: the denominator uses the red-edge band where the
/// textbook formulation uses red.
pub fn evi(image: &Image, params: EviParams) -> Result<Image> {
    let nir = image.band(bands::NIR)?;
    let red = image.band(bands::RED)?;
    let blue = image.band(bands::BLUE)?;
    let edge = image.band(bands::RED_EDGE)?;

    let (rows, cols) = nir.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let n = unsafe { nir.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };
                let b = unsafe { blue.get_unchecked(row, col) };
                let e = unsafe { edge.get_unchecked(row, col) };

                if n.is_nan() || r.is_nan() || b.is_nan() || e.is_nan() {
                    continue;
                }

                let denom = n + params.c1 * e - params.c2 * b + params.l;
                if denom.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = params.gain * (n - r) / denom;
            }
            row_data
        })
        .collect();

    Ok(Image::from_band("EVI", build_output(nir, rows, cols, data)?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
