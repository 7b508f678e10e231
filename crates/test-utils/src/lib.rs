//! Shared test utilities for the rasterx workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Temporary directory helpers
//! - Grid data generators
//! - Fixture writers for GeoTIFF, SRTM `.hgt`, zip and tar files
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{temp_test_dir, GeoTiffFixture};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of a bounding box against `(x1, x2, y1, y2)`.
///
/// Works with any value exposing `x1`, `x2`, `y1`, `y2` fields.
///
/// ```ignore
/// use test_utils::assert_bbox_approx_eq;
///
/// assert_bbox_approx_eq!(extent, (6.0, 7.0, 45.0, 46.0), 1e-12);
/// ```
#[macro_export]
macro_rules! assert_bbox_approx_eq {
    ($bbox:expr, ($x1:expr, $x2:expr, $y1:expr, $y2:expr), $epsilon:expr) => {{
        let bbox = $bbox;
        $crate::assert_approx_eq!(bbox.x1, $x1, $epsilon);
        $crate::assert_approx_eq!(bbox.x2, $x2, $epsilon);
        $crate::assert_approx_eq!(bbox.y1, $y1, $epsilon);
        $crate::assert_approx_eq!(bbox.y2, $y2, $epsilon);
    }};
}

/// Macro for element-wise approximate equality of two float slices.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_slice_approx_eq;
///
/// assert_slice_approx_eq!(&[0.5, 1.5], &[0.5000001, 1.5], 1e-6);
/// ```
#[macro_export]
macro_rules! assert_slice_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = $left;
        let right = $right;
        assert_eq!(
            left.len(),
            right.len(),
            "slice lengths differ: {:?} vs {:?}",
            left,
            right
        );
        for (l, r) in left.iter().zip(right.iter()) {
            $crate::assert_approx_eq!(*l, *r, $epsilon);
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    struct Extent {
        x1: f64,
        x2: f64,
        y1: f64,
        y2: f64,
    }

    #[test]
    fn test_assert_bbox_approx_eq_passes() {
        let extent = Extent {
            x1: -0.5,
            x2: 0.5000001,
            y1: 1.0,
            y2: 2.0,
        };
        assert_bbox_approx_eq!(extent, (-0.5, 0.5, 1.0, 2.0), 1e-6);
    }

    #[test]
    fn test_assert_slice_approx_eq_passes() {
        assert_slice_approx_eq!(&[0.5, 1.5], &[0.5000001, 1.5], 1e-6);
    }

    #[test]
    #[should_panic(expected = "slice lengths differ")]
    fn test_assert_slice_approx_eq_len_mismatch() {
        assert_slice_approx_eq!(&[0.5, 1.5], &[0.5], 1e-6);
    }
}
