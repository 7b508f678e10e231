//! Dataset Loader/Merger.
//!
//! One path becomes one [`Dataset`]: native readers first, then every raster
//! the locator finds at the path, one variable per band. Several paths are
//! loaded independently and merged with an outer join.

use ndarray::{s, Array2};
use rasterx_grid::{merge, AttrValue, Attrs, Coordinate, Dataset, Variable};
use rasterx_io::{Raster, RasterLocator};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::ReadResult;
use crate::native::{default_readers, NativeReader};
use crate::warning::ReadWarning;

/// A loaded dataset and what was learned along the way.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub dataset: Dataset,
    pub warnings: Vec<ReadWarning>,
    /// Paths or locators the data was decoded from, in load order
    pub sources: Vec<String>,
}

/// Loads paths with a set of native readers and a raster locator.
pub struct Loader {
    readers: Vec<Box<dyn NativeReader>>,
    locator: RasterLocator,
}

impl Loader {
    pub fn new(readers: Vec<Box<dyn NativeReader>>, locator: RasterLocator) -> Self {
        Self { readers, locator }
    }

    /// Load a single file or container.
    ///
    /// `pattern` narrows the members of a container. When a container holds
    /// several rasters, all of them are loaded and a
    /// [`ReadWarning::AmbiguousContainer`] is reported.
    pub fn load(&self, path: &str, pattern: Option<&str>) -> ReadResult<Loaded> {
        for reader in &self.readers {
            match reader.read(path) {
                Ok(dataset) => {
                    debug!(path = %path, reader = reader.name(), "Loaded with native reader");
                    return Ok(Loaded {
                        dataset,
                        warnings: Vec::new(),
                        sources: vec![path.to_string()],
                    });
                }
                Err(e) => {
                    debug!(path = %path, reader = reader.name(), error = %e, "Native reader declined");
                }
            }
        }

        let infos = self.locator.probe(path, pattern)?;
        let sources: Vec<String> = infos.iter().map(|i| i.description.clone()).collect();

        let mut warnings = Vec::new();
        if sources.len() > 1 {
            warnings.push(
                ReadWarning::AmbiguousContainer {
                    path: path.to_string(),
                    members: sources.clone(),
                }
                .emit(),
            );
        }

        let mut per_file = Vec::with_capacity(sources.len());
        let mut last_attrs = Attrs::new();
        for (j, source) in sources.iter().enumerate() {
            let raster = self.locator.registry().open(source)?;
            let (dataset, attrs) = raster_dataset(j, source, raster)?;
            per_file.push(dataset);
            last_attrs = attrs;
        }

        let mut dataset = merge(&per_file)?;
        dataset.attrs = last_attrs;

        info!(
            path = %path,
            rasters = sources.len(),
            variables = dataset.var_names().len(),
            "Loaded rasters"
        );
        Ok(Loaded {
            dataset,
            warnings,
            sources,
        })
    }

    /// Load every path and merge the results.
    ///
    /// With `parallel` the paths are loaded on the rayon pool. Datasets,
    /// warnings and sources are still combined in input order.
    pub fn load_many(&self, paths: &[String], pattern: Option<&str>, parallel: bool) -> ReadResult<Loaded> {
        let results: Vec<ReadResult<Loaded>> = if parallel {
            paths.par_iter().map(|p| self.load(p, pattern)).collect()
        } else {
            paths.iter().map(|p| self.load(p, pattern)).collect()
        };

        let mut datasets = Vec::with_capacity(results.len());
        let mut warnings = Vec::new();
        let mut sources = Vec::new();
        for result in results {
            let loaded = result?;
            datasets.push(loaded.dataset);
            warnings.extend(loaded.warnings);
            sources.extend(loaded.sources);
        }

        let dataset = merge(&datasets)?;
        info!(inputs = paths.len(), parallel, "Merged loaded paths");
        Ok(Loaded {
            dataset,
            warnings,
            sources,
        })
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(default_readers(), RasterLocator::default())
    }
}

/// [`Loader::load`] with the default readers and drivers.
pub fn load(path: &str, pattern: Option<&str>) -> ReadResult<Loaded> {
    Loader::default().load(path, pattern)
}

/// [`Loader::load_many`] with the default readers and drivers.
pub fn load_many(paths: &[String], pattern: Option<&str>, parallel: bool) -> ReadResult<Loaded> {
    Loader::default().load_many(paths, pattern, parallel)
}

/// Per-band attributes of a decoded raster.
fn band_attrs(source: &str, raster: &Raster) -> Attrs {
    let info = &raster.info;
    let (res_x, res_y) = info.res();

    let mut attrs = Attrs::new();
    attrs.insert("transform".to_string(), AttrValue::from(info.geo_transform.to_vec()));
    attrs.insert("res".to_string(), AttrValue::from(vec![res_x.abs(), res_y.abs()]));
    if let Some(nodata) = info.nodata {
        attrs.insert(
            "nodatavals".to_string(),
            AttrValue::from(vec![nodata; info.band_count]),
        );
    }
    attrs.insert("driver".to_string(), AttrValue::from(info.driver_short_name.as_str()));
    attrs.insert("source".to_string(), AttrValue::from(source));
    attrs
}

/// One file's bands as `band{j}_{i}` over ascending `(y, x)` coordinates.
fn raster_dataset(j: usize, source: &str, raster: Raster) -> ReadResult<(Dataset, Attrs)> {
    let attrs = band_attrs(source, &raster);
    let flip_y = raster.info.geo_transform[5] < 0.0;
    let flip_x = raster.info.geo_transform[1] < 0.0;

    let mut y = raster.y_coords();
    let mut x = raster.x_coords();
    if flip_y {
        y.reverse();
    }
    if flip_x {
        x.reverse();
    }

    let mut ds = Dataset::new();
    ds.insert_coord("y", Coordinate::new(y))?;
    ds.insert_coord("x", Coordinate::new(x))?;

    for (i, band) in raster.bands.into_iter().enumerate() {
        let band = orient(band, flip_y, flip_x);
        let var = Variable::from_2d("y", "x", band).with_attrs(attrs.clone());
        ds.insert_var(format!("band{}_{}", j, i + 1), var)?;
    }

    Ok((ds, attrs))
}

fn orient(band: Array2<f64>, flip_y: bool, flip_x: bool) -> Array2<f64> {
    match (flip_y, flip_x) {
        (false, false) => band,
        (true, false) => band.slice(s![..;-1, ..]).to_owned(),
        (false, true) => band.slice(s![.., ..;-1]).to_owned(),
        (true, true) => band.slice(s![..;-1, ..;-1]).to_owned(),
    }
}
