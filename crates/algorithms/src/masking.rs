//! Cloud masking
//!
//! Bit-flag cloud/cirrus masking on the Sentinel-2 QA60 quality band.
//! Bits 10 (opaque clouds) and 11 (cirrus) must both be zero for a pixel
//! to remain valid; masked pixels become nodata in every band.

use crate::band_math::build_output;
use crate::bands;
use crate::maybe_rayon::*;
use deltaspec_core::image::Image;
use deltaspec_core::Result;

const CLOUD_BIT: u64 = 1 << 10;
const CIRRUS_BIT: u64 = 1 << 11;

/// Mask cloudy pixels using the QA60 bitmask band.
///
/// A pixel survives only if both the cloud and cirrus flags are clear.
/// Pixels whose QA60 value is already nodata are masked too. The QA60
/// band itself is masked along with the rest.
pub fn mask_clouds(image: &Image) -> Result<Image> {
    let qa = image.band(bands::QA)?;
    let (rows, cols) = image.shape();

    let clear: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![false; cols];
            for col in 0..cols {
                let v = unsafe { qa.get_unchecked(row, col) };
                if v.is_nan() {
                    continue;
                }
                let flags = v as u64;
                row_data[col] = flags & CLOUD_BIT == 0 && flags & CIRRUS_BIT == 0;
            }
            row_data
        })
        .collect();

    let mut out_bands = Vec::with_capacity(image.num_bands());
    for (name, band) in image.bands() {
        let nodata = band.nodata();

        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![f64::NAN; cols];
                for col in 0..cols {
                    if !clear[row * cols + col] {
                        continue;
                    }
                    let v = unsafe { band.get_unchecked(row, col) };
                    if crate::band_math::is_nodata_f64(v, nodata) {
                        continue;
                    }
                    row_data[col] = v;
                }
                row_data
            })
            .collect();

        out_bands.push((name.to_string(), build_output(band, rows, cols, data)?));
    }

    Image::from_bands(out_bands)
}
