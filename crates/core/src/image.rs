//! Multi-band image type
//!
//! An [`Image`] is an ordered set of named bands over one shared grid.
//! Bands are looked up by name (`"B4"`, `"B8"`, ...), never by position,
//! and all bands of an image have identical dimensions. Images are
//! value-like: operations return new images instead of mutating inputs.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster};

/// A named, ordered set of equally-gridded raster bands.
#[derive(Debug, Clone)]
pub struct Image {
    bands: Vec<(String, Raster<f64>)>,
}

impl Image {
    /// Create an image from a list of (name, band) pairs.
    ///
    /// All bands must share the same dimensions and names must be unique.
    /// At least one band is required.
    pub fn from_bands(bands: Vec<(String, Raster<f64>)>) -> Result<Self> {
        let Some((_, first)) = bands.first() else {
            return Err(Error::EmptyImage);
        };
        let (rows, cols) = first.shape();

        for (i, (name, band)) in bands.iter().enumerate() {
            if band.shape() != (rows, cols) {
                return Err(Error::SizeMismatch {
                    er: rows,
                    ec: cols,
                    ar: band.rows(),
                    ac: band.cols(),
                });
            }
            if bands[..i].iter().any(|(n, _)| n == name) {
                return Err(Error::DuplicateBand(name.clone()));
            }
        }

        Ok(Self { bands })
    }

    /// Create a single-band image.
    pub fn from_band(name: impl Into<String>, band: Raster<f64>) -> Self {
        Self {
            bands: vec![(name.into(), band)],
        }
    }

    /// Append a band, consuming the image.
    ///
    /// Fails if the name already exists or the dimensions differ.
    pub fn with_band(mut self, name: impl Into<String>, band: Raster<f64>) -> Result<Self> {
        let name = name.into();
        if self.has_band(&name) {
            return Err(Error::DuplicateBand(name));
        }
        let (rows, cols) = self.shape();
        if band.shape() != (rows, cols) {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: band.rows(),
                ac: band.cols(),
            });
        }
        self.bands.push((name, band));
        Ok(self)
    }

    /// Look up a band by name
    pub fn band(&self, name: &str) -> Result<&Raster<f64>> {
        self.bands
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
            .ok_or_else(|| Error::BandNotFound(name.to_string()))
    }

    /// Whether a band with this name exists
    pub fn has_band(&self, name: &str) -> bool {
        self.bands.iter().any(|(n, _)| n == name)
    }

    /// Band names in order
    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate over (name, band) pairs in order
    pub fn bands(&self) -> impl Iterator<Item = (&str, &Raster<f64>)> {
        self.bands.iter().map(|(n, b)| (n.as_str(), b))
    }

    /// Number of bands
    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    /// Grid dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].1.shape()
    }

    /// Geotransform of the shared grid
    pub fn transform(&self) -> &GeoTransform {
        self.bands[0].1.transform()
    }

    /// Select a subset of bands by name, in the requested order.
    pub fn select(&self, names: &[&str]) -> Result<Image> {
        let mut bands = Vec::with_capacity(names.len());
        for name in names {
            bands.push((name.to_string(), self.band(name)?.clone()));
        }
        Image::from_bands(bands)
    }

    /// Rename all bands, in order.
    ///
    /// `names` must contain exactly one entry per band.
    pub fn rename(&self, names: &[&str]) -> Result<Image> {
        if names.len() != self.bands.len() {
            return Err(Error::BandCountMismatch {
                expected: names.len(),
                actual: self.bands.len(),
            });
        }
        let bands = names
            .iter()
            .zip(self.bands.iter())
            .map(|(new, (_, band))| (new.to_string(), band.clone()))
            .collect();
        Image::from_bands(bands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        Raster::filled(rows, cols, value)
    }

    #[test]
    fn test_band_lookup_by_name() {
        let image = Image::from_bands(vec![
            ("B4".to_string(), band(3, 3, 0.1)),
            ("B8".to_string(), band(3, 3, 0.5)),
        ])
        .unwrap();

        assert_eq!(image.band("B8").unwrap().get(1, 1).unwrap(), 0.5);
        assert!(matches!(
            image.band("B11"),
            Err(Error::BandNotFound(name)) if name == "B11"
        ));
    }

    #[test]
    fn test_duplicate_band_rejected() {
        let result = Image::from_bands(vec![
            ("B4".to_string(), band(3, 3, 0.1)),
            ("B4".to_string(), band(3, 3, 0.2)),
        ]);
        assert!(matches!(result, Err(Error::DuplicateBand(_))));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = Image::from_bands(vec![
            ("B4".to_string(), band(3, 3, 0.1)),
            ("B8".to_string(), band(3, 4, 0.5)),
        ]);
        assert!(matches!(result, Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn test_select_preserves_requested_order() {
        let image = Image::from_bands(vec![
            ("B2".to_string(), band(2, 2, 0.05)),
            ("B4".to_string(), band(2, 2, 0.1)),
            ("B8".to_string(), band(2, 2, 0.5)),
        ])
        .unwrap();

        let selected = image.select(&["B8", "B2"]).unwrap();
        assert_eq!(selected.band_names(), vec!["B8", "B2"]);
    }

    #[test]
    fn test_rename() {
        let image = Image::from_band("NDVI", band(2, 2, 0.6));
        let renamed = image.rename(&["NDVI_pre"]).unwrap();
        assert_eq!(renamed.band_names(), vec!["NDVI_pre"]);

        assert!(renamed.rename(&["a", "b"]).is_err());
    }

    #[test]
    fn test_with_band() {
        let image = Image::from_band("B4", band(2, 2, 0.1))
            .with_band("B8", band(2, 2, 0.5))
            .unwrap();
        assert_eq!(image.num_bands(), 2);

        assert!(image.clone().with_band("B8", band(2, 2, 0.9)).is_err());
        assert!(image.with_band("B3", band(3, 3, 0.2)).is_err());
    }
}
