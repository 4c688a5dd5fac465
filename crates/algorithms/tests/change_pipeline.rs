//! End-to-end change-detection pipeline tests
//!
//! Exercises the full flow the CLI drives: cloud masking, index mapping,
//! quality mosaicking and relative-difference computation over small
//! synthetic Sentinel-2-like collections.

use deltaspec_algorithms::{bands, change, mask_clouds, SpectralIndex};
use deltaspec_core::{Image, ImageCollection, Raster};

const CLOUD_BIT: u64 = 1 << 10;

fn s2_image(red: f64, nir: f64, qa: Vec<f64>) -> Image {
    Image::from_bands(vec![
        (bands::RED.to_string(), Raster::filled(2, 2, red)),
        (bands::NIR.to_string(), Raster::filled(2, 2, nir)),
        (bands::QA.to_string(), Raster::from_vec(qa, 2, 2).unwrap()),
    ])
    .unwrap()
}

#[test]
fn ndvi_change_over_masked_collections() {
    // One pre image with a cloudy pixel at (0,0); one clean post image.
    let pre_img = s2_image(0.1, 0.5, vec![CLOUD_BIT as f64, 0.0, 0.0, 0.0]);
    let post_img = s2_image(0.1, 0.8, vec![0.0; 4]);

    let pre = ImageCollection::from_images(vec![mask_clouds(&pre_img).unwrap()]).unwrap();
    let post = ImageCollection::from_images(vec![mask_clouds(&post_img).unwrap()]).unwrap();

    let result = change(&pre, &post, SpectralIndex::Ndvi).unwrap();

    // The cloudy pre pixel propagates as nodata through composite and diff
    assert!(result.pre.band("NDVI_pre").unwrap().get(0, 0).unwrap().is_nan());
    assert!(result.diff.band("rdNDVI").unwrap().get(0, 0).unwrap().is_nan());

    // Clean pixels carry the hand-computed values
    let ndvi_pre = result.pre.band("NDVI_pre").unwrap().get(1, 1).unwrap();
    let ndvi_post = result.post.band("NDVI_post").unwrap().get(1, 1).unwrap();
    let rd = result.diff.band("rdNDVI").unwrap().get(1, 1).unwrap();

    assert!((ndvi_pre - (0.5 - 0.1) / (0.5 + 0.1)).abs() < 1e-10);
    assert!((ndvi_post - (0.8 - 0.1) / (0.8 + 0.1)).abs() < 1e-10);

    let expected = ((ndvi_post - ndvi_pre) / (ndvi_post + ndvi_pre).sqrt()) * 100.0;
    assert!((rd - expected).abs() < 1e-10);
}

#[test]
fn multi_observation_collections_use_best_pixel() {
    // Two pre observations; the second has the higher NDVI everywhere
    let pre = ImageCollection::from_images(vec![
        s2_image(0.1, 0.2, vec![0.0; 4]),
        s2_image(0.1, 0.5, vec![0.0; 4]),
    ])
    .unwrap();
    let post = ImageCollection::from_images(vec![s2_image(0.1, 0.8, vec![0.0; 4])]).unwrap();

    let result = change(&pre, &post, SpectralIndex::Ndvi).unwrap();
    let ndvi_pre = result.pre.band("NDVI_pre").unwrap().get(0, 1).unwrap();
    assert!((ndvi_pre - (0.5 - 0.1) / (0.5 + 0.1)).abs() < 1e-10);
}

#[test]
fn kndvi_tracks_ndvi() {
    let pre = ImageCollection::from_images(vec![s2_image(0.1, 0.5, vec![0.0; 4])]).unwrap();
    let post = ImageCollection::from_images(vec![s2_image(0.1, 0.8, vec![0.0; 4])]).unwrap();

    let nd = change(&pre, &post, SpectralIndex::Ndvi).unwrap();
    let knd = change(&pre, &post, SpectralIndex::Kndvi).unwrap();

    let ndvi_pre = nd.pre.band("NDVI_pre").unwrap().get(0, 0).unwrap();
    let kndvi_pre = knd.pre.band("kNDVI_pre").unwrap().get(0, 0).unwrap();
    assert!((kndvi_pre - (ndvi_pre * ndvi_pre).tanh()).abs() < 1e-10);
}

#[test]
fn unsupported_index_rejected_at_the_boundary() {
    let result = "NDSI".parse::<SpectralIndex>();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unsupported spectral index"));
}
