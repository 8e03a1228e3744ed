//! Test utilities for blur-hdri
//!
//! Raster fixtures shared by the unit tests. Only compiled for tests.

use crate::Raster;
use itertools::iproduct;

/// Creates a 2x2 RGB raster with known sample values:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
pub fn create_test_rgb_raster() -> Raster {
    let data = vec![
        200, 150, 100, 100, 200, 150, //
        150, 100, 200, 50, 75, 25,
    ];
    Raster::from_u8(2, 2, ["R", "G", "B"], data).expect("fixture is well-formed")
}

/// Creates an RGB checkerboard of single-pixel black and white cells.
pub fn create_checkerboard_raster(width: u32, height: u32) -> Raster {
    let data = iproduct!(0..height, 0..width, 0..3)
        .map(|(y, x, _)| if (x + y) % 2 == 0 { 255 } else { 0 })
        .collect();
    Raster::from_u8(width, height, ["R", "G", "B"], data).expect("fixture is well-formed")
}

/// Creates an RGB panorama whose left half is pure red and right half pure
/// blue, so column 0 and column `width - 1` differ across the wrap seam.
pub fn create_half_split_panorama(width: u32, height: u32) -> Raster {
    let data = iproduct!(0..height, 0..width)
        .flat_map(|(_, x)| {
            if x < width / 2 {
                [255, 0, 0]
            } else {
                [0, 0, 255]
            }
        })
        .collect();
    Raster::from_u8(width, height, ["R", "G", "B"], data).expect("fixture is well-formed")
}

/// Compares two rasters sample by sample with a tolerance.
pub fn rasters_approx_equal(expected: &Raster, actual: &Raster, tolerance: f32) -> bool {
    if expected.dimensions() != actual.dimensions()
        || expected.channel_count() != actual.channel_count()
    {
        return false;
    }

    let (width, height) = expected.dimensions();
    iproduct!(0..height, 0..width, 0..expected.channel_count()).all(|(y, x, c)| {
        match (expected.sample(x, y, c), actual.sample(x, y, c)) {
            (Some(e), Some(a)) => (e - a).abs() <= tolerance,
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasters_approx_equal() {
        let raster = create_test_rgb_raster();
        assert!(rasters_approx_equal(&raster, &raster, 0.0));

        let other = create_checkerboard_raster(2, 2);
        assert!(!rasters_approx_equal(&raster, &other, 1.0));
        assert!(rasters_approx_equal(&raster, &other, 255.0));
    }

    #[test]
    fn test_half_split_edges() {
        let raster = create_half_split_panorama(8, 2);
        assert_eq!(raster.sample(0, 0, 0), Some(255.0));
        assert_eq!(raster.sample(7, 1, 2), Some(255.0));
        assert_eq!(raster.sample(7, 1, 0), Some(0.0));
    }
}
