//! Tests for spatial dimension handling, extent and trim/pad.

use ndarray::Array2;
use rasterx_common::BoundingBox;
use rasterx_grid::{
    AttrValue, Coordinate, Dataset, GridError, SpatialDataset, TrimOptions, Variable,
};
use test_utils::{assert_approx_eq, assert_slice_approx_eq};

/// `ny x nx` grid of unit cells with centres at `x0 + i`, `y0 + j`.
/// Values are `col * 1000 + row`.
fn grid(x_dim: &str, y_dim: &str, x0: f64, y0: f64, nx: usize, ny: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.insert_coord(y_dim, Coordinate::new((0..ny).map(|j| y0 + j as f64).collect()))
        .unwrap();
    ds.insert_coord(x_dim, Coordinate::new((0..nx).map(|i| x0 + i as f64).collect()))
        .unwrap();
    let data = Array2::from_shape_fn((ny, nx), |(row, col)| (col * 1000 + row) as f64);
    ds.insert_var("band0_1", Variable::from_2d(y_dim, x_dim, data))
        .unwrap();
    ds
}

// ============================================================================
// Identification
// ============================================================================

#[test]
fn test_identify_xy() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 3, 2));
    let dims = sd.spatial_dims().unwrap();
    assert_eq!((dims.x.as_str(), dims.y.as_str()), ("x", "y"));
}

#[test]
fn test_identify_lonlat() {
    let sd = SpatialDataset::new(grid("lon", "lat", 0.5, 0.5, 3, 2));
    let dims = sd.spatial_dims().unwrap();
    assert_eq!((dims.x.as_str(), dims.y.as_str()), ("lon", "lat"));
}

#[test]
fn test_unidentified_dims_fail_until_set() {
    let mut sd = SpatialDataset::new(grid("easting", "northing", 0.5, 0.5, 3, 2));
    assert!(sd.spatial_dims().is_none());
    assert_eq!(sd.extent().unwrap_err(), GridError::SpatialDimsUnset);
    assert_eq!(
        sd.trim(&BoundingBox::new(0.0, 1.0, 0.0, 1.0), &TrimOptions::default())
            .unwrap_err(),
        GridError::SpatialDimsUnset
    );

    sd.set_spatial_dims("easting", "northing").unwrap();
    assert_eq!(sd.extent().unwrap(), BoundingBox::new(0.0, 3.0, 0.0, 2.0));
}

#[test]
fn test_set_spatial_dims_requires_coords() {
    let mut sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 3, 2));
    assert!(matches!(
        sd.set_spatial_dims("lon", "y"),
        Err(GridError::MissingCoordinate(_))
    ));
}

// ============================================================================
// Cell size and extent
// ============================================================================

#[test]
fn test_extent_half_cell_widening() {
    let sd = SpatialDataset::new(grid("x", "y", 10.5, -2.5, 4, 3));
    assert_eq!(sd.extent().unwrap(), BoundingBox::new(10.0, 14.0, -3.0, 0.0));
}

#[test]
fn test_extent_descending_y_is_normalised() {
    let mut sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 2, 3));
    sd.set_y(vec![2.5, 1.5, 0.5]).unwrap();
    assert_approx_eq!(sd.dy().unwrap(), -1.0, 1e-12);
    assert_eq!(sd.extent().unwrap(), BoundingBox::new(0.0, 2.0, 0.0, 3.0));
}

#[test]
fn test_dx_follows_coordinate_reassignment() {
    let mut sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 3, 2));
    assert_approx_eq!(sd.dx().unwrap(), 1.0, 1e-12);

    sd.set_xy(vec![0.0, 0.25, 0.5], vec![5.0, 7.0]).unwrap();
    assert_approx_eq!(sd.dx().unwrap(), 0.25, 1e-12);
    assert_approx_eq!(sd.dy().unwrap(), 2.0, 1e-12);
}

#[test]
fn test_set_x_length_checked() {
    let mut sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 3, 2));
    assert!(matches!(sd.set_x(vec![1.0]), Err(GridError::ShapeMismatch(_))));
}

#[test]
fn test_single_column_is_degenerate() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 1, 2));
    assert!(matches!(sd.dx(), Err(GridError::DegenerateAxis { .. })));
    assert!(sd.extent().is_err());
}

// ============================================================================
// Trim
// ============================================================================

#[test]
fn test_trim_rejects_bad_box_first() {
    // Even without spatial dims, ordering is checked first
    let sd = SpatialDataset::new(grid("easting", "northing", 0.5, 0.5, 3, 2));
    let err = sd
        .trim(&BoundingBox::new(2.0, 1.0, 0.0, 1.0), &TrimOptions::default())
        .unwrap_err();
    assert!(matches!(err, GridError::InvalidBoundingBox(_)));
}

#[test]
fn test_trim_pad_rejects_unbounded_box() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 6, 4));
    let err = sd
        .trim(
            &BoundingBox::new(f64::NEG_INFINITY, 2.0, 0.0, 1.0),
            &TrimOptions::padded(Some(-9999.0)),
        )
        .unwrap_err();
    assert!(matches!(err, GridError::InvalidBoundingBox(_)));
}

#[test]
fn test_trim_crop_only() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 6, 4));
    let trimmed = sd
        .trim(&BoundingBox::new(1.0, 3.6, 0.0, 2.0), &TrimOptions::default())
        .unwrap();

    assert_eq!(trimmed.x().unwrap(), &[1.5, 2.5, 3.5]);
    assert_eq!(trimmed.y().unwrap(), &[0.5, 1.5]);
    let data = &trimmed.dataset().var("band0_1").unwrap().data;
    assert_eq!(data.shape(), &[2, 3]);
    assert_eq!(data[[1, 0]], 1001.0);
}

#[test]
fn test_trim_without_pad_does_not_grow() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 2, 2));
    let trimmed = sd
        .trim(&BoundingBox::new(-5.0, 5.0, -5.0, 5.0), &TrimOptions::default())
        .unwrap();
    assert_eq!(trimmed, sd);
}

#[test]
fn test_trim_pad_grows_with_fill() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 2, 2));
    let trimmed = sd
        .trim(
            &BoundingBox::new(-1.2, 2.0, 0.0, 3.9),
            &TrimOptions::padded(Some(-1.0)),
        )
        .unwrap();

    assert_slice_approx_eq!(trimmed.x().unwrap(), &[-0.5, 0.5, 1.5], 1e-12);
    assert_slice_approx_eq!(trimmed.y().unwrap(), &[0.5, 1.5, 2.5, 3.5], 1e-12);

    let var = trimmed.dataset().var("band0_1").unwrap();
    assert_eq!(var.data.shape(), &[4, 3]);
    assert_eq!(var.data[[0, 0]], -1.0);
    assert_eq!(var.data[[3, 2]], -1.0);
    // Original cells keep their values
    assert_eq!(var.data[[0, 1]], 0.0);
    assert_eq!(var.data[[1, 2]], 1001.0);

    assert_eq!(var.attrs.get("_FillValue"), Some(&AttrValue::Float(-1.0)));
    let x_coord = trimmed.dataset().coord("x").unwrap();
    assert_eq!(x_coord.attrs.get("_FillValue"), Some(&AttrValue::Float(-1.0)));
}

#[test]
fn test_trim_pad_uses_fill_value_attribute() {
    let mut ds = grid("x", "y", 0.5, 0.5, 2, 2);
    ds.var_mut("band0_1")
        .unwrap()
        .attrs
        .insert("_FillValue".to_string(), AttrValue::Float(-9999.0));
    let sd = SpatialDataset::new(ds);

    let trimmed = sd
        .trim(&BoundingBox::new(0.0, 3.0, 0.0, 2.0), &TrimOptions::padded(None))
        .unwrap();
    let var = trimmed.dataset().var("band0_1").unwrap();
    assert_eq!(var.data.shape(), &[2, 3]);
    assert_eq!(var.data[[0, 2]], -9999.0);
}

#[test]
fn test_trim_pad_defaults_to_nan() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 2, 2));
    let trimmed = sd
        .trim(&BoundingBox::new(0.0, 3.0, 0.0, 2.0), &TrimOptions::padded(None))
        .unwrap();
    let var = trimmed.dataset().var("band0_1").unwrap();
    assert!(var.data[[0, 2]].is_nan());
    assert!(var.attrs.get("_FillValue").is_none());
}

#[test]
fn test_trim_pad_is_idempotent() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 3, 3));
    let bbox = BoundingBox::new(-2.3, 4.1, 1.0, 5.2);
    let options = TrimOptions::padded(Some(0.0));

    let once = sd.trim(&bbox, &options).unwrap();
    let twice = once.trim(&bbox, &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_trim_pad_outside_data_uses_lattice() {
    let sd = SpatialDataset::new(grid("x", "y", 0.5, 0.5, 2, 2));
    let trimmed = sd
        .trim(&BoundingBox::new(5.0, 7.0, 0.0, 2.0), &TrimOptions::padded(Some(3.0)))
        .unwrap();
    assert_slice_approx_eq!(trimmed.x().unwrap(), &[5.5, 6.5], 1e-12);
    let var = trimmed.dataset().var("band0_1").unwrap();
    assert!(var.data.iter().all(|&v| v == 3.0));
}
