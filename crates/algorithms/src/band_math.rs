//! Band math operations
//!
//! Raster algebra primitives the index catalogue is built on: unary and
//! binary element-wise maps plus the generic normalized difference.
//! Nodata (NaN) in any input produces NaN in the output.

use crate::maybe_rayon::*;
use deltaspec_core::raster::Raster;
use deltaspec_core::{Error, Result};
use ndarray::Array2;

/// Binary operations for band math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Min,
    Max,
}

/// Apply a unary function to every cell in a raster.
///
/// Nodata cells (NaN) are preserved.
///
/// # Example
/// ```ignore
/// let knd = band_math(&ndvi, |v| (v * v).tanh())?;
/// ```
pub fn band_math<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let (rows, cols) = raster.shape();
    let nodata = raster.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let val = unsafe { raster.get_unchecked(row, col) };

                if is_nodata_f64(val, nodata) {
                    continue;
                }

                row_data[col] = f(val);
            }
            row_data
        })
        .collect();

    build_output(raster, rows, cols, data)
}

/// Apply a binary operation between two rasters element-wise.
///
/// Both rasters must have the same dimensions. Division by (near) zero
/// produces NaN.
pub fn band_math_binary(a: &Raster<f64>, b: &Raster<f64>, op: BandMathOp) -> Result<Raster<f64>> {
    check_dimensions(a, b)?;

    let (rows, cols) = a.shape();
    let nodata_a = a.nodata();
    let nodata_b = b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let va = unsafe { a.get_unchecked(row, col) };
                let vb = unsafe { b.get_unchecked(row, col) };

                if is_nodata_f64(va, nodata_a) || is_nodata_f64(vb, nodata_b) {
                    continue;
                }

                row_data[col] = match op {
                    BandMathOp::Add => va + vb,
                    BandMathOp::Subtract => va - vb,
                    BandMathOp::Multiply => va * vb,
                    BandMathOp::Divide => {
                        if vb.abs() < 1e-10 {
                            f64::NAN
                        } else {
                            va / vb
                        }
                    }
                    BandMathOp::Power => va.powf(vb),
                    BandMathOp::Min => va.min(vb),
                    BandMathOp::Max => va.max(vb),
                };
            }
            row_data
        })
        .collect();

    build_output(a, rows, cols, data)
}

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Result is in [-1, 1]. Pixels where the sum is (near) zero or either
/// input is nodata come out NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if is_nodata_f64(a, nodata_a) || is_nodata_f64(b, nodata_b) {
                    continue;
                }

                let sum = a + b;
                if sum.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = (a - b) / sum;
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn is_nodata_f64(value: f64, nodata: Option<f64>) -> bool {
    if value.is_nan() {
        return true;
    }
    match nodata {
        Some(nd) => (value - nd).abs() < f64::EPSILON,
        None => false,
    }
}

pub(crate) fn check_dimensions(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

pub(crate) fn build_output(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_band(value: f64) -> Raster<f64> {
        Raster::filled(5, 5, value)
    }

    #[test]
    fn test_band_math_unary() {
        let input = make_band(0.5);
        let result = band_math(&input, |v| (v * v).tanh()).unwrap();
        let val = result.get(2, 2).unwrap();
        assert!((val - 0.25_f64.tanh()).abs() < 1e-10);
    }

    #[test]
    fn test_band_math_preserves_nan() {
        let mut input = make_band(2.0);
        input.set(2, 2, f64::NAN).unwrap();

        let result = band_math(&input, |v| v * 2.0).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
        assert!((result.get(0, 0).unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_band_math_binary_divide() {
        let a = make_band(0.4);
        let b = make_band(0.8);

        let result = band_math_binary(&a, &b, BandMathOp::Divide).unwrap();
        assert!((result.get(2, 2).unwrap() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_band_math_binary_divide_by_zero() {
        let a = make_band(1.0);
        let b = make_band(0.0);

        let result = band_math_binary(&a, &b, BandMathOp::Divide).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
    }

    #[test]
    fn test_band_math_dimension_mismatch() {
        let a = make_band(1.0);
        let b = Raster::filled(5, 6, 1.0);

        assert!(band_math_binary(&a, &b, BandMathOp::Add).is_err());
    }

    #[test]
    fn test_normalized_difference_basic() {
        let a = make_band(0.8);
        let b = make_band(0.2);

        let result = normalized_difference(&a, &b).unwrap();
        let val = result.get(2, 2).unwrap();

        // (0.8 - 0.2) / (0.8 + 0.2) = 0.6
        assert!((val - 0.6).abs() < 1e-10, "Expected 0.6, got {}", val);
    }

    #[test]
    fn test_normalized_difference_zero_sum() {
        let a = make_band(0.3);
        let b = make_band(-0.3);

        let result = normalized_difference(&a, &b).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
    }

    #[test]
    fn test_normalized_difference_respects_explicit_nodata() {
        let mut a = make_band(0.5);
        a.set_nodata(Some(-9999.0));
        a.set(1, 1, -9999.0).unwrap();
        let b = make_band(0.1);

        let result = normalized_difference(&a, &b).unwrap();
        assert!(result.get(1, 1).unwrap().is_nan());
    }
}
