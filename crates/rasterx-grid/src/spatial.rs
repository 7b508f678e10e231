//! Spatial Extent Engine: extent, crop and pad on the two spatial dimensions.
//!
//! A [`SpatialDataset`] wraps a [`Dataset`] together with the names of its
//! horizontal (`x`) and vertical (`y`) dimensions. Cell sizes are always
//! derived from the current coordinates, so they follow any coordinate
//! reassignment.

use std::fmt;

use rasterx_common::BoundingBox;
use tracing::{debug, warn};

use crate::attrs::{AttrValue, FILL_VALUE};
use crate::dataset::Dataset;
use crate::error::{GridError, GridResult};

/// Dimension-name pairs recognised as spatial, in priority order.
const SPATIAL_CANDIDATES: [(&str, &str); 2] = [("x", "y"), ("lon", "lat")];

/// Names of the spatial dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialDims {
    pub x: String,
    pub y: String,
}

/// Options for [`SpatialDataset::trim`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrimOptions {
    /// Grow the grid to cover the box where the data does not reach
    pub pad: bool,
    /// Value of padded cells; defaults to `_FillValue`, then NaN
    pub fill_value: Option<f64>,
}

impl TrimOptions {
    pub fn padded(fill_value: Option<f64>) -> Self {
        Self {
            pad: true,
            fill_value,
        }
    }
}

/// Find the spatial dimensions: the first variable having both `x` and `y`,
/// else both `lon` and `lat`.
pub fn identify_spatial_dims(dataset: &Dataset) -> Option<SpatialDims> {
    dataset.vars().find_map(|(_, var)| {
        SPATIAL_CANDIDATES.iter().find_map(|(x, y)| {
            (var.axis_of(x).is_some() && var.axis_of(y).is_some()).then(|| SpatialDims {
                x: x.to_string(),
                y: y.to_string(),
            })
        })
    })
}

/// A dataset with designated spatial dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialDataset {
    dataset: Dataset,
    dims: Option<SpatialDims>,
}

impl SpatialDataset {
    /// Wrap `dataset`, identifying its spatial dimensions.
    ///
    /// If none are found a warning is logged and extent/trim fail with
    /// [`GridError::SpatialDimsUnset`] until [`set_spatial_dims`] is called.
    ///
    /// [`set_spatial_dims`]: SpatialDataset::set_spatial_dims
    pub fn new(dataset: Dataset) -> Self {
        let dims = identify_spatial_dims(&dataset);
        match &dims {
            Some(d) => debug!(x = %d.x, y = %d.y, "Identified spatial dimensions"),
            None => warn!(
                variables = ?dataset.var_names(),
                "Not sure which coordinates are spatial. Try setting them with set_spatial_dims"
            ),
        }
        Self { dataset, dims }
    }

    /// Wrap `dataset` with explicit spatial dimensions.
    pub fn with_dims(dataset: Dataset, x: &str, y: &str) -> GridResult<Self> {
        let mut spatial = Self {
            dataset,
            dims: None,
        };
        spatial.set_spatial_dims(x, y)?;
        Ok(spatial)
    }

    pub fn set_spatial_dims(&mut self, x: &str, y: &str) -> GridResult<()> {
        for dim in [x, y] {
            if self.dataset.coord(dim).is_none() {
                return Err(GridError::MissingCoordinate(dim.to_string()));
            }
        }
        self.dims = Some(SpatialDims {
            x: x.to_string(),
            y: y.to_string(),
        });
        Ok(())
    }

    pub fn spatial_dims(&self) -> Option<&SpatialDims> {
        self.dims.as_ref()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn dataset_mut(&mut self) -> &mut Dataset {
        &mut self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    fn dims(&self) -> GridResult<&SpatialDims> {
        self.dims.as_ref().ok_or(GridError::SpatialDimsUnset)
    }

    fn values(&self, dim: &str) -> GridResult<&[f64]> {
        self.dataset
            .coord(dim)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| GridError::MissingCoordinate(dim.to_string()))
    }

    /// Current x coordinate values.
    pub fn x(&self) -> GridResult<&[f64]> {
        self.values(&self.dims()?.x)
    }

    /// Current y coordinate values.
    pub fn y(&self) -> GridResult<&[f64]> {
        self.values(&self.dims()?.y)
    }

    /// Cell size along x: `x[1] - x[0]`.
    pub fn dx(&self) -> GridResult<f64> {
        step(&self.dims()?.x, self.x()?)
    }

    /// Cell size along y: `y[1] - y[0]`.
    pub fn dy(&self) -> GridResult<f64> {
        step(&self.dims()?.y, self.y()?)
    }

    pub fn set_x(&mut self, values: Vec<f64>) -> GridResult<()> {
        let dim = self.dims()?.x.clone();
        self.dataset.set_coord_values(&dim, values)
    }

    pub fn set_y(&mut self, values: Vec<f64>) -> GridResult<()> {
        let dim = self.dims()?.y.clone();
        self.dataset.set_coord_values(&dim, values)
    }

    pub fn set_xy(&mut self, x: Vec<f64>, y: Vec<f64>) -> GridResult<()> {
        self.set_x(x)?;
        self.set_y(y)
    }

    /// Outer edges of the grid: centres widened by half a cell.
    pub fn extent(&self) -> GridResult<BoundingBox> {
        let (x, y) = (self.x()?, self.y()?);
        let (dx, dy) = (self.dx()?, self.dy()?);
        let (x0, xn) = (x[0], x[x.len() - 1]);
        let (y0, yn) = (y[0], y[y.len() - 1]);

        let (xa, xb) = (x0 - 0.5 * dx, xn + 0.5 * dx);
        let (ya, yb) = (y0 - 0.5 * dy, yn + 0.5 * dy);
        Ok(BoundingBox::new(xa.min(xb), xa.max(xb), ya.min(yb), ya.max(yb)))
    }

    /// Crop to `bbox` and optionally pad out to it.
    ///
    /// The crop keeps every label inside the box (edges included). With
    /// `pad`, each axis is extended from its outermost label in steps of the
    /// original cell size for as long as the new label stays strictly inside
    /// the box. Existing cells keep their values; new cells hold the fill
    /// value.
    pub fn trim(&self, bbox: &BoundingBox, options: &TrimOptions) -> GridResult<SpatialDataset> {
        bbox.validate()?;
        let dims = self.dims()?.clone();

        let cropped = self.dataset.sel_range(&[
            (dims.x.as_str(), bbox.x1, bbox.x2),
            (dims.y.as_str(), bbox.y1, bbox.y2),
        ])?;
        let mut trimmed = SpatialDataset {
            dataset: cropped,
            dims: Some(dims.clone()),
        };

        if !options.pad {
            return Ok(trimmed);
        }

        let new_x = padded_axis(self.x()?, trimmed.x()?, self.dx()?, bbox.x1, bbox.x2);
        let new_y = padded_axis(self.y()?, trimmed.y()?, self.dy()?, bbox.y1, bbox.y2);

        if new_x.is_none() && new_y.is_none() {
            return Ok(trimmed);
        }

        for (dim, values) in [(&dims.x, new_x), (&dims.y, new_y)] {
            if let Some(values) = values {
                debug!(dim = %dim, from = trimmed.values(dim)?.len(), to = values.len(), "Padding axis");
                trimmed.dataset = trimmed.dataset.reindex(dim, &values, options.fill_value)?;
            }
        }

        if let Some(fill) = options.fill_value {
            trimmed.record_fill_value(fill, &dims);
        }
        Ok(trimmed)
    }

    /// Store an explicit fill as `_FillValue` on spatial variables and coords.
    fn record_fill_value(&mut self, fill: f64, dims: &SpatialDims) {
        let names: Vec<String> = self
            .dataset
            .vars()
            .filter(|(_, v)| v.axis_of(&dims.x).is_some() || v.axis_of(&dims.y).is_some())
            .map(|(name, _)| name.clone())
            .collect();
        for name in names {
            if let Some(var) = self.dataset.var_mut(&name) {
                var.attrs.insert(FILL_VALUE.to_string(), AttrValue::Float(fill));
            }
        }
        for dim in [&dims.x, &dims.y] {
            if let Some(coord) = self.dataset.coord_mut(dim) {
                coord.attrs.insert(FILL_VALUE.to_string(), AttrValue::Float(fill));
            }
        }
    }
}

impl fmt::Display for SpatialDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dataset)
    }
}

fn step(dim: &str, values: &[f64]) -> GridResult<f64> {
    match values {
        [a, b, ..] => Ok(b - a),
        _ => Err(GridError::DegenerateAxis {
            dim: dim.to_string(),
            len: values.len(),
        }),
    }
}

/// New labels for one axis after padding, or `None` if it does not grow.
///
/// `original` is the un-cropped axis, `cropped` its crop and `step` the
/// original cell size (negative for descending axes).
fn padded_axis(original: &[f64], cropped: &[f64], step: f64, a: f64, b: f64) -> Option<Vec<f64>> {
    let (lo, hi) = (a.min(b), a.max(b));
    let size = step.abs();
    if size == 0.0 || !size.is_finite() {
        return None;
    }
    // Labels move away from the crop towards `lo` on the low side, `hi` on the other
    let towards_lo = |start: f64| -> Vec<f64> {
        (1..)
            .map(|k| start - k as f64 * size)
            .take_while(|&v| v > lo)
            .collect()
    };
    let towards_hi = |start: f64| -> Vec<f64> {
        (1..)
            .map(|k| start + k as f64 * size)
            .take_while(|&v| v < hi)
            .collect()
    };

    let values = match (cropped.first(), cropped.last()) {
        (Some(&first), Some(&last)) => {
            let ascending = step > 0.0;
            let (mut before, after) = if ascending {
                (towards_lo(first), towards_hi(last))
            } else {
                (towards_hi(first), towards_lo(last))
            };
            if before.is_empty() && after.is_empty() {
                return None;
            }
            before.reverse();
            before.extend_from_slice(cropped);
            before.extend(after);
            before
        }
        _ => {
            // Nothing survived the crop: lay the original lattice over the box
            let origin = *original.first()?;
            let eps = size * 1e-9;
            let k_lo = ((lo - origin) / size - eps).ceil() as i64;
            let k_hi = ((hi - origin) / size + eps).floor() as i64;
            if k_lo > k_hi {
                return None;
            }
            let mut lattice: Vec<f64> = (k_lo..=k_hi).map(|k| origin + k as f64 * size).collect();
            if step < 0.0 {
                lattice.reverse();
            }
            lattice
        }
    };
    Some(values)
}
