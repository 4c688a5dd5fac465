//! Change detection dispatcher
//!
//! Computes a spectral index over pre- and post-event image collections,
//! reduces each to a quality-mosaic composite, and derives a normalized
//! relative-difference raster between the two composites.

use crate::band_math::{build_output, check_dimensions};
use crate::indices::SpectralIndex;
use crate::maybe_rayon::*;
use crate::mosaic::quality_mosaic;
use deltaspec_core::collection::ImageCollection;
use deltaspec_core::image::Image;
use deltaspec_core::raster::Raster;
use deltaspec_core::Result;

/// How pre/post composites are differenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStrategy {
    /// `((post - pre) / sqrt(post + pre)) * 100`, output band `rd<index>`,
    /// composites renamed `<index>_pre` / `<index>_post`.
    ///
    /// The square-root denominator dampens the scale sensitivity of the
    /// plain ratio form; pixels with `post + pre <= 0` are nodata.
    SqrtNormalized,
    /// `((post - pre) / (post + pre)) * 100`, applied band-wise with the
    /// band names kept. Used by the color-space indices.
    Ratio,
}

impl SpectralIndex {
    /// The differencing rule the change dispatcher uses for this index
    pub fn diff_strategy(&self) -> DiffStrategy {
        match self {
            SpectralIndex::Hsv | SpectralIndex::Hsv1 => DiffStrategy::Ratio,
            _ => DiffStrategy::SqrtNormalized,
        }
    }
}

/// Result of a change-detection run: the two composites and the
/// relative-difference raster between them.
#[derive(Debug, Clone)]
pub struct ChangeResult {
    pub pre: Image,
    pub post: Image,
    pub diff: Image,
}

/// Compute a change-detection triple for the given index.
///
/// Applies the index to every image of both collections, builds a
/// quality-mosaic composite per collection keyed on the index band, and
/// differences the composites according to the index's [`DiffStrategy`].
/// Degenerate pixels (nodata inputs, non-positive radicands, zero sums)
/// come out nodata; the only hard failure modes are missing bands and
/// empty collections. Unsupported index names are rejected when parsing
/// into [`SpectralIndex`], before any raster work.
pub fn change(
    pre: &ImageCollection,
    post: &ImageCollection,
    index: SpectralIndex,
) -> Result<ChangeResult> {
    let index_pre = pre.map(|image| index.apply(image))?;
    let index_post = post.map(|image| index.apply(image))?;

    let key = index.name();
    let pre_composite = quality_mosaic(&index_pre, key)?;
    let post_composite = quality_mosaic(&index_post, key)?;

    match index.diff_strategy() {
        DiffStrategy::Ratio => {
            let diff = ratio_diff(&pre_composite, &post_composite)?;
            Ok(ChangeResult {
                pre: pre_composite,
                post: post_composite,
                diff,
            })
        }
        DiffStrategy::SqrtNormalized => {
            let pre_name = format!("{}_pre", key);
            let post_name = format!("{}_post", key);

            let pre_composite = pre_composite.rename(&[pre_name.as_str()])?;
            let post_composite = post_composite.rename(&[post_name.as_str()])?;

            let diff_band = sqrt_normalized_diff(
                pre_composite.band(&pre_name)?,
                post_composite.band(&post_name)?,
            )?;
            let diff = Image::from_band(format!("rd{}", key), diff_band);

            Ok(ChangeResult {
                pre: pre_composite,
                post: post_composite,
                diff,
            })
        }
    }
}

/// `((post - pre) / sqrt(post + pre)) * 100`; nodata where `post + pre <= 0`
fn sqrt_normalized_diff(pre: &Raster<f64>, post: &Raster<f64>) -> Result<Raster<f64>> {
    check_dimensions(pre, post)?;

    let (rows, cols) = pre.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let p = unsafe { pre.get_unchecked(row, col) };
                let q = unsafe { post.get_unchecked(row, col) };

                if p.is_nan() || q.is_nan() {
                    continue;
                }

                let sum = q + p;
                if sum <= 0.0 {
                    continue;
                }

                row_data[col] = ((q - p) / sum.sqrt()) * 100.0;
            }
            row_data
        })
        .collect();

    build_output(pre, rows, cols, data)
}

/// Band-wise `((post - pre) / (post + pre)) * 100` with band names kept
fn ratio_diff(pre: &Image, post: &Image) -> Result<Image> {
    let mut out_bands = Vec::with_capacity(pre.num_bands());

    for name in pre.band_names() {
        let pre_band = pre.band(name)?;
        let post_band = post.band(name)?;
        check_dimensions(pre_band, post_band)?;

        let (rows, cols) = pre_band.shape();

        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![f64::NAN; cols];
                for col in 0..cols {
                    let p = unsafe { pre_band.get_unchecked(row, col) };
                    let q = unsafe { post_band.get_unchecked(row, col) };

                    if p.is_nan() || q.is_nan() {
                        continue;
                    }

                    let sum = q + p;
                    if sum.abs() < 1e-10 {
                        continue;
                    }

                    row_data[col] = ((q - p) / sum) * 100.0;
                }
                row_data
            })
            .collect();

        out_bands.push((name.to_string(), build_output(pre_band, rows, cols, data)?));
    }

    Image::from_bands(out_bands)
}
