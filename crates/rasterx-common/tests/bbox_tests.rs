//! Tests for BoundingBox construction, parsing and geometry helpers.

use rasterx_common::{BoundingBox, CommonError};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new_keeps_field_order() {
    let bbox = BoundingBox::new(-180.0, 180.0, -90.0, 90.0);
    assert_eq!(bbox.x1, -180.0);
    assert_eq!(bbox.x2, 180.0);
    assert_eq!(bbox.y1, -90.0);
    assert_eq!(bbox.y2, 90.0);
}

#[test]
fn test_bbox_new_is_unchecked() {
    // Derived boxes may be built without validation
    let bbox = BoundingBox::new(5.0, 1.0, 0.0, 1.0);
    assert!(bbox.validate().is_err());
}

#[test]
fn test_try_new_equal_x_rejected() {
    let err = BoundingBox::try_new(2.0, 2.0, 0.0, 1.0).unwrap_err();
    match err {
        CommonError::InvalidBoundingBox(msg) => assert!(msg.contains("x1")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_try_new_reversed_y_rejected() {
    let err = BoundingBox::try_new(0.0, 1.0, 3.0, -3.0).unwrap_err();
    match err {
        CommonError::InvalidBoundingBox(msg) => assert!(msg.contains("y1")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_non_finite_coordinates_rejected() {
    for bbox in [
        BoundingBox::new(f64::NEG_INFINITY, 0.0, 0.0, 1.0),
        BoundingBox::new(0.0, f64::INFINITY, 0.0, 1.0),
        BoundingBox::new(0.0, 1.0, f64::NEG_INFINITY, f64::INFINITY),
        BoundingBox::new(0.0, 1.0, f64::NAN, 1.0),
    ] {
        match bbox.validate().unwrap_err() {
            CommonError::InvalidBoundingBox(msg) => assert!(msg.contains("finite"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn test_from_tuple() {
    let bbox: BoundingBox = (-2.5, 1.5, -1.5, 0.5).into();
    assert_eq!(bbox.as_tuple(), (-2.5, 1.5, -1.5, 0.5));
}

// ============================================================================
// Extent string parsing
// ============================================================================

#[test]
fn test_parse_extent_with_spaces() {
    let bbox = BoundingBox::from_extent_str(" 6.0, 8.5 , 45.25,47 ").unwrap();
    assert_eq!(bbox, BoundingBox::new(6.0, 8.5, 45.25, 47.0));
}

#[test]
fn test_parse_extent_wrong_count() {
    assert!(matches!(
        BoundingBox::from_extent_str("1,2,3"),
        Err(CommonError::InvalidExtent(_))
    ));
    assert!(matches!(
        BoundingBox::from_extent_str("1,2,3,4,5"),
        Err(CommonError::InvalidExtent(_))
    ));
}

#[test]
fn test_parse_extent_not_a_number() {
    assert!(matches!(
        BoundingBox::from_extent_str("a,2,3,4"),
        Err(CommonError::InvalidExtent(_))
    ));
}

#[test]
fn test_parse_extent_does_not_validate_order() {
    let bbox = BoundingBox::from_extent_str("2,1,0,1").unwrap();
    assert!(bbox.validate().is_err());
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_width_height() {
    let bbox = BoundingBox::new(-2.5, 1.5, -1.5, 0.5);
    assert_eq!(bbox.width(), 4.0);
    assert_eq!(bbox.height(), 2.0);
}

#[test]
fn test_contains_point_includes_edges() {
    let bbox = BoundingBox::new(0.0, 10.0, 0.0, 5.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(10.0, 5.0));
    assert!(bbox.contains_point(3.0, 2.0));
    assert!(!bbox.contains_point(10.1, 2.0));
    assert!(!bbox.contains_point(3.0, -0.1));
}

#[test]
fn test_intersects() {
    let a = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
    let b = BoundingBox::new(5.0, 15.0, 5.0, 15.0);
    let c = BoundingBox::new(10.0, 20.0, 0.0, 10.0);
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
    // Touching edges do not count
    assert!(!a.intersects(&c));
}

#[test]
fn test_covers() {
    let outer = BoundingBox::new(-1.0, 1.0, -1.0, 1.0);
    let inner = BoundingBox::new(-0.5, 0.5, -0.5, 0.5);
    assert!(outer.covers(&inner));
    assert!(outer.covers(&outer));
    assert!(!inner.covers(&outer));
}

#[test]
fn test_display() {
    let bbox = BoundingBox::new(1.0, 2.5, -3.0, 4.0);
    assert_eq!(bbox.to_string(), "(1, 2.5, -3, 4)");
}
