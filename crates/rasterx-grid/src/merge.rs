//! Outer-join merge of datasets.
//!
//! Coordinates are joined by the sorted union of their labels. Variables
//! with the same name are combined cell by cell: a NaN cell takes the
//! other input's value, two different non-NaN values are a conflict.

use indexmap::IndexMap;
use ndarray::Zip;
use tracing::debug;

use crate::attrs::extend_missing;
use crate::dataset::{Coordinate, Dataset, Variable};
use crate::error::{GridError, GridResult};
use crate::select::label_tolerance;

/// Merge `datasets` into one.
///
/// Attributes (dataset, variable and coordinate) are taken from the first
/// input that has them; later inputs only add missing keys.
pub fn merge(datasets: &[Dataset]) -> GridResult<Dataset> {
    let Some(first) = datasets.first() else {
        return Ok(Dataset::new());
    };
    if datasets.len() == 1 {
        return Ok(first.clone());
    }

    let union = union_coords(datasets);

    let mut out = Dataset::new();
    for (name, coord) in &union {
        out.insert_coord(name.clone(), coord.clone())?;
    }

    for ds in datasets {
        let aligned = align(ds, &union)?;
        for (name, var) in aligned.vars() {
            match out.var_mut(name) {
                None => {
                    out.insert_var(name.clone(), var.clone())?;
                }
                Some(existing) => combine(name, existing, var)?,
            }
        }
        extend_missing(&mut out.attrs, &ds.attrs);
    }

    debug!(
        inputs = datasets.len(),
        variables = out.var_names().len(),
        "Merged datasets"
    );
    Ok(out)
}

/// Sorted, de-duplicated union of every coordinate across inputs.
fn union_coords(datasets: &[Dataset]) -> IndexMap<String, Coordinate> {
    let mut labels: IndexMap<String, (Vec<f64>, f64, Coordinate)> = IndexMap::new();
    for ds in datasets {
        for (name, coord) in ds.coords() {
            let tolerance = label_tolerance(&coord.values);
            let entry = labels
                .entry(name.clone())
                .or_insert_with(|| (Vec::new(), f64::INFINITY, Coordinate::default()));
            entry.0.extend_from_slice(&coord.values);
            entry.1 = entry.1.min(tolerance);
            extend_missing(&mut entry.2.attrs, &coord.attrs);
        }
    }

    labels
        .into_iter()
        .map(|(name, (mut values, tolerance, mut coord))| {
            values.retain(|v| !v.is_nan());
            values.sort_by(f64::total_cmp);
            values.dedup_by(|a, b| (*a - *b).abs() <= tolerance);
            coord.values = values;
            (name, coord)
        })
        .collect()
}

/// Reindex every coordinate of `ds` onto the union labels, filling with NaN.
fn align(ds: &Dataset, union: &IndexMap<String, Coordinate>) -> GridResult<Dataset> {
    let mut aligned = ds.clone();
    for (name, coord) in union {
        if aligned.coord(name).is_some() {
            aligned = aligned.reindex(name, &coord.values, Some(f64::NAN))?;
        }
    }
    Ok(aligned)
}

fn combine(name: &str, existing: &mut Variable, other: &Variable) -> GridResult<()> {
    if existing.dims != other.dims {
        return Err(GridError::ShapeMismatch(format!(
            "variable '{}' has dims ({}) and ({}) in different inputs",
            name,
            existing.dims.join(", "),
            other.dims.join(", ")
        )));
    }

    let mut conflict = false;
    Zip::from(&mut existing.data)
        .and(&other.data)
        .for_each(|a, &b| {
            if a.is_nan() {
                *a = b;
            } else if !b.is_nan() && *a != b {
                conflict = true;
            }
        });
    if conflict {
        return Err(GridError::MergeConflict {
            variable: name.to_string(),
        });
    }

    extend_missing(&mut existing.attrs, &other.attrs);
    Ok(())
}
