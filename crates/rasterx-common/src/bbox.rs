//! Bounding box types and operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// A bounding box given as `(x1, x2, y1, y2)`: left, right, bottom, top.
///
/// `x` is usually longitude and `y` latitude, but nothing here assumes a
/// geographic CRS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a bounding box without validating the ordering.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self { x1, x2, y1, y2 }
    }

    /// Create a bounding box, rejecting `x1 >= x2` or `y1 >= y2`.
    pub fn try_new(x1: f64, x2: f64, y1: f64, y2: f64) -> CommonResult<Self> {
        let bbox = Self::new(x1, x2, y1, y2);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check the `x1 < x2` and `y1 < y2` invariant.
    ///
    /// Every coordinate must be finite, so NaN and infinities are rejected too.
    pub fn validate(&self) -> CommonResult<()> {
        let (x1, x2, y1, y2) = self.as_tuple();
        if ![x1, x2, y1, y2].iter().all(|v| v.is_finite()) {
            return Err(CommonError::InvalidBoundingBox(format!(
                "coordinates must be finite (got {})",
                self
            )));
        }
        if !(self.x1 < self.x2) {
            return Err(CommonError::InvalidBoundingBox(format!(
                "`x1` must be < `x2` (got x1={}, x2={})",
                self.x1, self.x2
            )));
        }
        if !(self.y1 < self.y2) {
            return Err(CommonError::InvalidBoundingBox(format!(
                "`y1` must be < `y2` (got y1={}, y2={})",
                self.y1, self.y2
            )));
        }
        Ok(())
    }

    /// Parse an extent string: "x1,x2,y1,y2".
    ///
    /// Only the format is checked here; call [`validate`](Self::validate)
    /// for the ordering.
    pub fn from_extent_str(s: &str) -> CommonResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(CommonError::InvalidExtent(s.to_string()));
        }

        let mut values = [0.0_f64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| CommonError::InvalidExtent(s.to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x1 < other.x2 && self.x2 > other.x1 && self.y1 < other.y2 && self.y2 > other.y1
    }

    /// Check if a point is contained within this bbox (edges included).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Check if `other` lies entirely within this bbox.
    pub fn covers(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x1 && self.x2 >= other.x2 && self.y1 <= other.y1 && self.y2 >= other.y2
    }

    /// The coordinates as an `(x1, x2, y1, y2)` tuple.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.x2, self.y1, self.y2)
    }
}

impl From<(f64, f64, f64, f64)> for BoundingBox {
    fn from((x1, x2, y1, y2): (f64, f64, f64, f64)) -> Self {
        Self::new(x1, x2, y1, y2)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.x2, self.y1, self.y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extent() {
        let bbox = BoundingBox::from_extent_str("-125.0,-66.0,24.0,50.0").unwrap();
        assert_eq!(bbox.x1, -125.0);
        assert_eq!(bbox.x2, -66.0);
        assert_eq!(bbox.y1, 24.0);
        assert_eq!(bbox.y2, 50.0);
    }

    #[test]
    fn test_try_new_rejects_bad_ordering() {
        assert!(BoundingBox::try_new(0.0, 1.0, 0.0, 1.0).is_ok());
        assert!(matches!(
            BoundingBox::try_new(1.0, 1.0, 0.0, 1.0),
            Err(CommonError::InvalidBoundingBox(_))
        ));
        assert!(matches!(
            BoundingBox::try_new(0.0, 1.0, 2.0, 1.0),
            Err(CommonError::InvalidBoundingBox(_))
        ));
        assert!(BoundingBox::try_new(f64::NAN, 1.0, 0.0, 1.0).is_err());
    }
}
