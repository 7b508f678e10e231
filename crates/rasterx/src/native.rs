//! Native dataset readers.
//!
//! A native reader opens a self-describing format (NetCDF) straight into a
//! [`Dataset`], keeping its own dimension names and coordinates. The loader
//! tries these before falling back to the raster drivers.

use rasterx_grid::Dataset;

use crate::error::ReadResult;

/// Reader for a self-describing dataset format.
pub trait NativeReader: Send + Sync {
    fn name(&self) -> &'static str;

    /// Read `path` fully. Any error sends the loader to the raster drivers.
    fn read(&self, path: &str) -> ReadResult<Dataset>;
}

/// Readers enabled by the crate features, in the order they are tried.
pub fn default_readers() -> Vec<Box<dyn NativeReader>> {
    #[allow(unused_mut)]
    let mut readers: Vec<Box<dyn NativeReader>> = Vec::new();
    #[cfg(feature = "netcdf")]
    readers.push(Box::new(netcdf_reader::NetCdfReader));
    readers
}

#[cfg(feature = "netcdf")]
pub use netcdf_reader::NetCdfReader;

#[cfg(feature = "netcdf")]
mod netcdf_reader {
    use ndarray::{ArrayD, IxDyn};
    use rasterx_grid::{AttrValue, Attrs, Coordinate, Dataset, Variable};
    use tracing::debug;

    use super::NativeReader;
    use crate::error::{ReadError, ReadResult};

    /// NetCDF through libnetcdf.
    ///
    /// One-dimensional variables named after their dimension become
    /// coordinates; dimensions without one get `0..n` labels.
    pub struct NetCdfReader;

    impl NativeReader for NetCdfReader {
        fn name(&self) -> &'static str {
            "netCDF"
        }

        fn read(&self, path: &str) -> ReadResult<Dataset> {
            if path.starts_with("/vsi") {
                return Err(ReadError::Native(format!(
                    "{}: container members are not opened natively",
                    path
                )));
            }

            let file = netcdf::open(path)
                .map_err(|e| ReadError::Native(format!("Failed to open NetCDF {}: {}", path, e)))?;

            let mut ds = Dataset::new();

            for var in file.variables() {
                let dims = var.dimensions();
                if dims.len() == 1 && dims[0].name() == var.name() {
                    let values: Vec<f64> = var.get_values(..).map_err(|e| {
                        ReadError::Native(format!("Failed to read {}: {}", var.name(), e))
                    })?;
                    let mut coord = Coordinate::new(values);
                    coord.attrs = convert_attrs(var.attributes());
                    ds.insert_coord(var.name(), coord)?;
                }
            }

            for var in file.variables() {
                let dims = var.dimensions();
                let is_coord = dims.len() == 1 && dims[0].name() == var.name();
                if dims.is_empty() || is_coord {
                    continue;
                }

                let dim_names: Vec<String> = dims.iter().map(|d| d.name()).collect();
                let shape: Vec<usize> = dims.iter().map(|d| d.len()).collect();
                for (name, len) in dim_names.iter().zip(&shape) {
                    if ds.coord(name).is_none() {
                        ds.insert_coord(
                            name.clone(),
                            Coordinate::new((0..*len).map(|i| i as f64).collect()),
                        )?;
                    }
                }

                let values: Vec<f64> = var.get_values(..).map_err(|e| {
                    ReadError::Native(format!("Failed to read {}: {}", var.name(), e))
                })?;
                let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
                    .map_err(|e| ReadError::Native(format!("{}: {}", var.name(), e)))?;
                let variable =
                    Variable::new(dim_names, data)?.with_attrs(convert_attrs(var.attributes()));
                ds.insert_var(var.name(), variable)?;
            }

            if ds.is_empty() {
                return Err(ReadError::Native(format!("{}: no data variables", path)));
            }
            ds.attrs = convert_attrs(file.attributes());

            debug!(path = %path, variables = ds.var_names().len(), "Read NetCDF natively");
            Ok(ds)
        }
    }

    fn convert_attrs<'a>(attrs: impl Iterator<Item = netcdf::Attribute<'a>>) -> Attrs {
        attrs
            .filter_map(|attr| {
                let value = attr.value().ok().and_then(convert_value)?;
                Some((attr.name().to_string(), value))
            })
            .collect()
    }

    fn convert_value(value: netcdf::AttributeValue) -> Option<AttrValue> {
        use netcdf::AttributeValue as V;

        Some(match value {
            V::Str(s) => AttrValue::Str(s),
            V::Double(v) => AttrValue::Float(v),
            V::Float(v) => AttrValue::Float(v as f64),
            V::Schar(v) => AttrValue::Int(v as i64),
            V::Uchar(v) => AttrValue::Int(v as i64),
            V::Short(v) => AttrValue::Int(v as i64),
            V::Ushort(v) => AttrValue::Int(v as i64),
            V::Int(v) => AttrValue::Int(v as i64),
            V::Uint(v) => AttrValue::Int(v as i64),
            V::Longlong(v) => AttrValue::Int(v),
            V::Doubles(v) => AttrValue::Floats(v),
            V::Floats(v) => AttrValue::Floats(v.into_iter().map(f64::from).collect()),
            V::Shorts(v) => AttrValue::Floats(v.into_iter().map(f64::from).collect()),
            V::Ints(v) => AttrValue::Floats(v.into_iter().map(f64::from).collect()),
            _ => return None,
        })
    }
}
