//! Labeled N-d dataset: named variables over shared 1-d coordinates.

use std::fmt;

use indexmap::IndexMap;
use ndarray::{Array2, ArrayD};

use crate::attrs::{AttrValue, Attrs, FILL_VALUE};
use crate::error::{GridError, GridResult};

/// 1-d labels of one dimension.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coordinate {
    pub values: Vec<f64>,
    pub attrs: Attrs,
}

impl Coordinate {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            attrs: Attrs::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// N-d array with named dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub dims: Vec<String>,
    pub data: ArrayD<f64>,
    pub attrs: Attrs,
}

impl Variable {
    pub fn new(dims: Vec<String>, data: ArrayD<f64>) -> GridResult<Self> {
        if dims.len() != data.ndim() {
            return Err(GridError::ShapeMismatch(format!(
                "{} dimension names for a {}-d array",
                dims.len(),
                data.ndim()
            )));
        }
        Ok(Self {
            dims,
            data,
            attrs: Attrs::new(),
        })
    }

    /// A `(y, x)` variable from a 2-d array.
    pub fn from_2d(y_dim: &str, x_dim: &str, data: Array2<f64>) -> Self {
        Self {
            dims: vec![y_dim.to_string(), x_dim.to_string()],
            data: data.into_dyn(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Position of `dim` in this variable's dimensions.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// The `_FillValue` attribute, if numeric.
    pub fn fill_value(&self) -> Option<f64> {
        self.attrs.get(FILL_VALUE).and_then(AttrValue::as_f64)
    }
}

/// Ordered variables sharing a set of coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    coords: IndexMap<String, Coordinate>,
    vars: IndexMap<String, Variable>,
    pub attrs: Attrs,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a coordinate.
    ///
    /// Replacing one used by variables must keep its length.
    pub fn insert_coord(&mut self, name: impl Into<String>, coord: Coordinate) -> GridResult<()> {
        let name = name.into();
        if let Some(len) = self.dim_len_from_vars(&name) {
            if len != coord.len() {
                return Err(GridError::ShapeMismatch(format!(
                    "coordinate '{}' has {} values but variables use {}",
                    name,
                    coord.len(),
                    len
                )));
            }
        }
        self.coords.insert(name, coord);
        Ok(())
    }

    /// Replace the values of an existing coordinate, keeping its attrs.
    pub fn set_coord_values(&mut self, name: &str, values: Vec<f64>) -> GridResult<()> {
        let attrs = self
            .coords
            .get(name)
            .ok_or_else(|| GridError::MissingCoordinate(name.to_string()))?
            .attrs
            .clone();
        self.insert_coord(name, Coordinate { values, attrs })
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.get(name)
    }

    pub fn coord_mut(&mut self, name: &str) -> Option<&mut Coordinate> {
        self.coords.get_mut(name)
    }

    pub fn coords(&self) -> impl Iterator<Item = (&String, &Coordinate)> {
        self.coords.iter()
    }

    /// Insert or replace a variable. Every dimension needs a coordinate of
    /// matching length.
    pub fn insert_var(&mut self, name: impl Into<String>, var: Variable) -> GridResult<()> {
        for (axis, dim) in var.dims.iter().enumerate() {
            let coord = self
                .coords
                .get(dim)
                .ok_or_else(|| GridError::MissingCoordinate(dim.clone()))?;
            let len = var.data.shape()[axis];
            if coord.len() != len {
                return Err(GridError::ShapeMismatch(format!(
                    "dimension '{}' has {} labels but the array has {} entries",
                    dim,
                    coord.len(),
                    len
                )));
            }
        }
        self.vars.insert(name.into(), var);
        Ok(())
    }

    pub fn var(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn var_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.vars.get_mut(name)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.vars.iter()
    }

    pub(crate) fn vars_mut(&mut self) -> impl Iterator<Item = (&String, &mut Variable)> {
        self.vars.iter_mut()
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.vars.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Dimension names and sizes, in coordinate order.
    pub fn dims(&self) -> Vec<(&str, usize)> {
        self.coords
            .iter()
            .map(|(name, coord)| (name.as_str(), coord.len()))
            .collect()
    }

    fn dim_len_from_vars(&self, dim: &str) -> Option<usize> {
        self.vars
            .values()
            .find_map(|v| v.axis_of(dim).map(|axis| v.data.shape()[axis]))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<rasterx.Dataset>")?;
        let dims: Vec<String> = self
            .dims()
            .iter()
            .map(|(name, len)| format!("{}: {}", name, len))
            .collect();
        writeln!(f, "Dimensions:  ({})", dims.join(", "))?;

        writeln!(f, "Coordinates:")?;
        for (name, coord) in &self.coords {
            writeln!(f, "  * {:<8} ({}) float64 {}", name, name, preview(&coord.values))?;
        }

        writeln!(f, "Data variables:")?;
        for (name, var) in &self.vars {
            writeln!(f, "    {:<8} ({}) float64", name, var.dims.join(", "))?;
        }

        if !self.attrs.is_empty() {
            writeln!(f, "Attributes:")?;
            for (key, value) in &self.attrs {
                writeln!(f, "    {}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

/// First and last few values of a coordinate.
fn preview(values: &[f64]) -> String {
    let show = |v: &[f64]| v.iter().map(|x| format!("{}", x)).collect::<Vec<_>>().join(" ");
    if values.len() <= 6 {
        show(values)
    } else {
        format!("{} ... {}", show(&values[..3]), show(&values[values.len() - 3..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small() -> Dataset {
        let mut ds = Dataset::new();
        ds.insert_coord("y", Coordinate::new(vec![0.5, 1.5])).unwrap();
        ds.insert_coord("x", Coordinate::new(vec![0.5, 1.5, 2.5])).unwrap();
        ds.insert_var(
            "band0_1",
            Variable::from_2d("y", "x", array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]),
        )
        .unwrap();
        ds
    }

    #[test]
    fn test_insert_var_checks_coords() {
        let mut ds = small();
        let bad = Variable::from_2d("y", "x", array![[1.0, 2.0], [3.0, 4.0]]);
        assert!(matches!(ds.insert_var("bad", bad), Err(GridError::ShapeMismatch(_))));

        let unknown = Variable::from_2d("lat", "x", array![[1.0, 2.0, 3.0]]);
        assert!(matches!(
            ds.insert_var("unknown", unknown),
            Err(GridError::MissingCoordinate(_))
        ));
    }

    #[test]
    fn test_coord_length_locked_by_vars() {
        let mut ds = small();
        assert!(ds.set_coord_values("x", vec![1.0, 2.0]).is_err());
        assert!(ds.set_coord_values("x", vec![10.0, 20.0, 30.0]).is_ok());
        assert_eq!(ds.coord("x").unwrap().values, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_dims_and_names() {
        let ds = small();
        assert_eq!(ds.dims(), vec![("y", 2), ("x", 3)]);
        assert_eq!(ds.var_names(), vec!["band0_1"]);
    }

    #[test]
    fn test_display_summary() {
        let mut ds = small();
        ds.attrs.insert("driver".to_string(), "GTiff".into());
        let text = ds.to_string();
        assert!(text.contains("Dimensions:  (y: 2, x: 3)"));
        assert!(text.contains("band0_1  (y, x) float64"));
        assert!(text.contains("driver: GTiff"));
    }

    #[test]
    fn test_variable_rank_check() {
        let data = ArrayD::<f64>::zeros(ndarray::IxDyn(&[2, 2]));
        assert!(Variable::new(vec!["x".to_string()], data).is_err());
    }
}
