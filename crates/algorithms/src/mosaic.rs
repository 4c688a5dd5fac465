//! Quality mosaic
//!
//! Reduce an image collection to a single composite by selecting, at each
//! pixel independently, the source image with the maximal value of a key
//! band, and carrying through all bands of that image at that pixel.

use crate::band_math::build_output;
use crate::maybe_rayon::*;
use deltaspec_core::collection::ImageCollection;
use deltaspec_core::image::Image;
use deltaspec_core::raster::Raster;
use deltaspec_core::{Error, Result};

/// Build a composite by per-pixel max-selection on `key_band`.
///
/// Ties break toward the earliest image in the collection. Pixels where
/// every source is nodata in `key_band` come out nodata in every band.
/// An empty collection is an error.
pub fn quality_mosaic(collection: &ImageCollection, key_band: &str) -> Result<Image> {
    if collection.is_empty() {
        return Err(Error::EmptyCollection);
    }

    let images = collection.images();
    let first = &images[0];
    let (rows, cols) = first.shape();

    for image in images {
        if image.shape() != (rows, cols) {
            let (ar, ac) = image.shape();
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar,
                ac,
            });
        }
    }

    let keys: Vec<&Raster<f64>> = images
        .iter()
        .map(|image| image.band(key_band))
        .collect::<Result<_>>()?;

    // Winning source per pixel; -1 where no source has a valid key value.
    // Strict > keeps the earliest image on ties.
    let winners: Vec<i32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![-1i32; cols];
            for col in 0..cols {
                let mut best = f64::NEG_INFINITY;
                for (i, key) in keys.iter().enumerate() {
                    let v = unsafe { key.get_unchecked(row, col) };
                    if v.is_nan() {
                        continue;
                    }
                    if v > best {
                        best = v;
                        row_data[col] = i as i32;
                    }
                }
            }
            row_data
        })
        .collect();

    let mut out_bands = Vec::with_capacity(first.num_bands());
    for name in first.band_names() {
        let sources: Vec<&Raster<f64>> = images
            .iter()
            .map(|image| image.band(name))
            .collect::<Result<_>>()?;

        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![f64::NAN; cols];
                for col in 0..cols {
                    let winner = winners[row * cols + col];
                    if winner >= 0 {
                        row_data[col] =
                            unsafe { sources[winner as usize].get_unchecked(row, col) };
                    }
                }
                row_data
            })
            .collect();

        out_bands.push((
            name.to_string(),
            build_output(sources[0], rows, cols, data)?,
        ));
    }

    Image::from_bands(out_bands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(key: Vec<f64>, payload: Vec<f64>) -> Image {
        Image::from_bands(vec![
            ("NDVI".to_string(), Raster::from_vec(key, 2, 2).unwrap()),
            ("aux".to_string(), Raster::from_vec(payload, 2, 2).unwrap()),
        ])
        .unwrap()
    }

    #[test]
    fn test_per_pixel_max_selection() {
        let a = image(vec![0.9, 0.1, 0.5, 0.3], vec![1.0; 4]);
        let b = image(vec![0.2, 0.8, 0.5, 0.7], vec![2.0; 4]);
        let collection = ImageCollection::from_images(vec![a, b]).unwrap();

        let composite = quality_mosaic(&collection, "NDVI").unwrap();
        let key = composite.band("NDVI").unwrap();
        let aux = composite.band("aux").unwrap();

        // Pixel (0,0): a wins; (0,1): b wins; (1,1): b wins
        assert_eq!(key.get(0, 0).unwrap(), 0.9);
        assert_eq!(aux.get(0, 0).unwrap(), 1.0);
        assert_eq!(key.get(0, 1).unwrap(), 0.8);
        assert_eq!(aux.get(0, 1).unwrap(), 2.0);
        assert_eq!(aux.get(1, 1).unwrap(), 2.0);
    }

    #[test]
    fn test_tie_breaks_to_earliest() {
        let a = image(vec![0.5; 4], vec![1.0; 4]);
        let b = image(vec![0.5; 4], vec![2.0; 4]);
        let collection = ImageCollection::from_images(vec![a, b]).unwrap();

        let composite = quality_mosaic(&collection, "NDVI").unwrap();
        assert_eq!(composite.band("aux").unwrap().get(1, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_winner_carries_all_bands_from_one_source() {
        let a = image(vec![0.9, 0.1, 0.9, 0.1], vec![10.0, 11.0, 12.0, 13.0]);
        let b = image(vec![0.1, 0.9, 0.1, 0.9], vec![20.0, 21.0, 22.0, 23.0]);
        let collection = ImageCollection::from_images(vec![a, b]).unwrap();

        let composite = quality_mosaic(&collection, "NDVI").unwrap();
        let aux = composite.band("aux").unwrap();

        assert_eq!(aux.get(0, 0).unwrap(), 10.0);
        assert_eq!(aux.get(0, 1).unwrap(), 21.0);
        assert_eq!(aux.get(1, 0).unwrap(), 12.0);
        assert_eq!(aux.get(1, 1).unwrap(), 23.0);
    }

    #[test]
    fn test_all_nodata_pixel_stays_nodata() {
        let a = image(vec![f64::NAN, 0.1, 0.5, 0.3], vec![1.0; 4]);
        let b = image(vec![f64::NAN, 0.8, 0.5, 0.7], vec![2.0; 4]);
        let collection = ImageCollection::from_images(vec![a, b]).unwrap();

        let composite = quality_mosaic(&collection, "NDVI").unwrap();
        assert!(composite.band("NDVI").unwrap().get(0, 0).unwrap().is_nan());
        assert!(composite.band("aux").unwrap().get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_nodata_source_skipped() {
        let a = image(vec![f64::NAN; 4], vec![1.0; 4]);
        let b = image(vec![0.2; 4], vec![2.0; 4]);
        let collection = ImageCollection::from_images(vec![a, b]).unwrap();

        let composite = quality_mosaic(&collection, "NDVI").unwrap();
        assert_eq!(composite.band("aux").unwrap().get(0, 0).unwrap(), 2.0);
    }

    #[test]
    fn test_empty_collection() {
        let result = quality_mosaic(&ImageCollection::empty(), "NDVI");
        assert!(matches!(result, Err(Error::EmptyCollection)));
    }

    #[test]
    fn test_missing_key_band() {
        let a = image(vec![0.5; 4], vec![1.0; 4]);
        let collection = ImageCollection::from_images(vec![a]).unwrap();

        let result = quality_mosaic(&collection, "EVI");
        assert!(matches!(result, Err(Error::BandNotFound(_))));
    }
}
