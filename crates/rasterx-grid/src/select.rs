//! Label-based selection and reindexing.

use ndarray::{ArrayD, Axis, IxDyn};

use crate::dataset::{Coordinate, Dataset};
use crate::error::{GridError, GridResult};

/// Relative tolerance for matching labels, as a fraction of the axis step.
const LABEL_TOLERANCE: f64 = 1e-6;

/// Absolute tolerance for axes with fewer than two labels.
const SINGLE_LABEL_TOLERANCE: f64 = 1e-9;

/// Tolerance for matching labels along `values`.
pub(crate) fn label_tolerance(values: &[f64]) -> f64 {
    match values {
        [a, b, ..] if (b - a).abs() > 0.0 => (b - a).abs() * LABEL_TOLERANCE,
        _ => SINGLE_LABEL_TOLERANCE,
    }
}

impl Dataset {
    /// Keep only the given positions along `dim`.
    pub fn take(&self, dim: &str, indices: &[usize]) -> GridResult<Dataset> {
        let coord = self
            .coord(dim)
            .ok_or_else(|| GridError::UnknownDimension(dim.to_string()))?;
        if let Some(&bad) = indices.iter().find(|&&i| i >= coord.len()) {
            return Err(GridError::ShapeMismatch(format!(
                "index {} out of bounds for dimension '{}' of length {}",
                bad,
                dim,
                coord.len()
            )));
        }

        let mut out = self.clone();
        let values: Vec<f64> = indices.iter().map(|&i| coord.values[i]).collect();
        for (_, var) in out.vars_mut() {
            if let Some(axis) = var.axis_of(dim) {
                var.data = var.data.select(Axis(axis), indices);
            }
        }
        replace_coord(&mut out, dim, values);
        Ok(out)
    }

    /// Inclusive label range selection on each listed dimension.
    ///
    /// Bounds may be given in either order and work on ascending or
    /// descending axes alike; the axis order is preserved.
    pub fn sel_range(&self, ranges: &[(&str, f64, f64)]) -> GridResult<Dataset> {
        let mut out = self.clone();
        for &(dim, a, b) in ranges {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let coord = out
                .coord(dim)
                .ok_or_else(|| GridError::UnknownDimension(dim.to_string()))?;
            let indices: Vec<usize> = coord
                .values
                .iter()
                .enumerate()
                .filter(|(_, &v)| v >= lo && v <= hi)
                .map(|(i, _)| i)
                .collect();
            out = out.take(dim, &indices)?;
        }
        Ok(out)
    }

    /// Conform `dim` to `new_values`.
    ///
    /// Each new label takes the data at the matching old label (within a
    /// tolerance of `1e-6` of the axis step). Cells without a match are set
    /// to `fill`, or when `fill` is `None`, to the variable's `_FillValue`
    /// attribute, or NaN.
    pub fn reindex(&self, dim: &str, new_values: &[f64], fill: Option<f64>) -> GridResult<Dataset> {
        let coord = self
            .coord(dim)
            .ok_or_else(|| GridError::UnknownDimension(dim.to_string()))?;

        let tolerance = label_tolerance(&coord.values).min(label_tolerance(new_values));
        let source = match_labels(&coord.values, new_values, tolerance);

        let mut out = self.clone();
        for (_, var) in out.vars_mut() {
            let Some(axis) = var.axis_of(dim) else {
                continue;
            };
            let fill = fill.or_else(|| var.fill_value()).unwrap_or(f64::NAN);

            let mut shape = var.data.shape().to_vec();
            shape[axis] = new_values.len();
            let mut data = ArrayD::from_elem(IxDyn(&shape), fill);
            for (new_i, old_i) in source.iter().enumerate() {
                if let Some(old_i) = old_i {
                    data.index_axis_mut(Axis(axis), new_i)
                        .assign(&var.data.index_axis(Axis(axis), *old_i));
                }
            }
            var.data = data;
        }
        replace_coord(&mut out, dim, new_values.to_vec());
        Ok(out)
    }
}

/// Set a coordinate's values after its variables were already resized.
fn replace_coord(ds: &mut Dataset, dim: &str, values: Vec<f64>) {
    if let Some(coord) = ds.coord_mut(dim) {
        coord.values = values;
    } else {
        // Callers only pass existing dims; keep the dataset consistent anyway
        let _ = ds.insert_coord(dim, Coordinate::new(values));
    }
}

/// For each target label, the index of the matching source label.
fn match_labels(source: &[f64], target: &[f64], tolerance: f64) -> Vec<Option<usize>> {
    let mut sorted: Vec<(f64, usize)> = source.iter().copied().zip(0..).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    target
        .iter()
        .map(|&t| {
            let pos = sorted.partition_point(|&(v, _)| v < t);
            [pos.checked_sub(1), Some(pos)]
                .into_iter()
                .flatten()
                .filter_map(|i| sorted.get(i))
                .filter(|(v, _)| (v - t).abs() <= tolerance)
                .min_by(|a, b| (a.0 - t).abs().total_cmp(&(b.0 - t).abs()))
                .map(|&(_, i)| i)
        })
        .collect()
}
