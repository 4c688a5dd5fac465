//! Color-space indices
//!
//! Two indices derived by treating shortwave/near-infrared band triples as
//! RGB analogs: `HSV` takes the hue channel of a standard RGB→HSV
//! conversion over (SWIR2, NIR, Red); `HSV_1` is a custom hue/value/
//! saturation decomposition over (SWIR1, NIR, Red) with degree-scaled hue
//! sectors, quantized to the unsigned 16-bit range.

use crate::band_math::build_output;
use crate::bands;
use crate::maybe_rayon::*;
use deltaspec_core::image::Image;
use deltaspec_core::Result;

/// Hue channel of the RGB→HSV conversion applied to (SWIR2, NIR, Red).
///
/// The triple is treated as an (R, G, B) analog; the hue comes out in
/// [0, 1), with 0 for achromatic pixels.
pub fn hsv(image: &Image) -> Result<Image> {
    let swir = image.band(bands::SWIR2)?;
    let nir = image.band(bands::NIR)?;
    let red = image.band(bands::RED)?;

    let (rows, cols) = swir.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let s = unsafe { swir.get_unchecked(row, col) };
                let n = unsafe { nir.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };

                if s.is_nan() || n.is_nan() || r.is_nan() {
                    continue;
                }

                row_data[col] = rgb_to_hue(s, n, r);
            }
            row_data
        })
        .collect();

    Ok(Image::from_band("HSV", build_output(swir, rows, cols, data)?))
}

/// Hue of an (r, g, b) triple, in [0, 1); 0 when min == max
fn rgb_to_hue(r: f64, g: f64, b: f64) -> f64 {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let span = maxc - minc;

    if span == 0.0 {
        return 0.0;
    }

    let rc = (maxc - r) / span;
    let gc = (maxc - g) / span;
    let bc = (maxc - b) / span;

    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    (h / 6.0).rem_euclid(1.0)
}

/// Custom HSV decomposition over (SWIR1, NIR, Red).
///
/// Per pixel: value = max of the triple, saturation = value − min of the
/// triple, hue assigned piecewise by which band attains the max using
/// 60°/120°/240° sector formulas; hue is 0 where saturation is 0. When
/// several bands tie for the max, the red rule wins over NIR, and NIR
/// over SWIR1.
///
/// Returns three bands — `HSV_1` (hue), `V`, `S` — quantized to the
/// unsigned 16-bit range.
pub fn hsv_1(image: &Image) -> Result<Image> {
    let swir = image.band(bands::SWIR1)?;
    let nir = image.band(bands::NIR)?;
    let red = image.band(bands::RED)?;

    let (rows, cols) = swir.shape();

    let pixels: Vec<(f64, f64, f64)> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![(f64::NAN, f64::NAN, f64::NAN); cols];
            for col in 0..cols {
                let sw = unsafe { swir.get_unchecked(row, col) };
                let n = unsafe { nir.get_unchecked(row, col) };
                let r = unsafe { red.get_unchecked(row, col) };

                if sw.is_nan() || n.is_nan() || r.is_nan() {
                    continue;
                }

                let v = sw.max(n).max(r);
                let s = v - sw.min(n).min(r);

                let h = if s == 0.0 {
                    0.0
                } else if v == r {
                    ((sw - n) / s) * 60.0 + 240.0
                } else if v == n {
                    ((r - sw) / s) * 60.0 + 120.0
                } else {
                    ((n - r) / s) * 60.0 + 60.0
                };

                row_data[col] = (to_u16_range(h), to_u16_range(v), to_u16_range(s));
            }
            row_data
        })
        .collect();

    let hue: Vec<f64> = pixels.iter().map(|p| p.0).collect();
    let value: Vec<f64> = pixels.iter().map(|p| p.1).collect();
    let saturation: Vec<f64> = pixels.iter().map(|p| p.2).collect();

    let out = Image::from_band("HSV_1", build_output(swir, rows, cols, hue)?);
    let out = out.with_band("V", build_output(swir, rows, cols, value)?)?;
    out.with_band("S", build_output(swir, rows, cols, saturation)?)
}

fn to_u16_range(v: f64) -> f64 {
    if v.is_nan() {
        v
    } else {
        v.round().clamp(0.0, 65535.0)
    }
}
