//! Top-level read: a file, a container, a tile directory or a list of paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rasterx_common::{BoundingBox, TemplateRegistry, TileSpec};
use rasterx_grid::{SpatialDataset, TrimOptions};
use tracing::info;

use crate::error::{ReadError, ReadResult};
use crate::loader::{Loaded, Loader};
use crate::tiles::TileResolver;
use crate::warning::ReadWarning;

/// What to read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadSource {
    /// A raster file, a container, or a directory of tiles
    Path(PathBuf),
    /// Files to load and merge
    Paths(Vec<PathBuf>),
}

impl From<&str> for ReadSource {
    fn from(path: &str) -> Self {
        ReadSource::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for ReadSource {
    fn from(path: PathBuf) -> Self {
        ReadSource::Path(path)
    }
}

impl From<Vec<PathBuf>> for ReadSource {
    fn from(paths: Vec<PathBuf>) -> Self {
        ReadSource::Paths(paths)
    }
}

/// Options for [`read`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    /// Selects container members (glob, or substring)
    pub pattern: Option<String>,
    /// Tiles to select in a directory; the result is trimmed to it
    pub extent: Option<BoundingBox>,
    pub tile_spec: TileSpec,
    /// Named templates added to the built-ins
    pub templates: HashMap<String, String>,
    /// Grow the result to cover the whole extent
    pub pad: bool,
    pub fill_value: Option<f64>,
    /// Load tiles on the rayon pool
    pub parallel: bool,
}

impl ReadOptions {
    pub fn with_extent(mut self, extent: BoundingBox) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_tile_spec(mut self, tile_spec: TileSpec) -> Self {
        self.tile_spec = tile_spec;
        self
    }

    pub fn padded(mut self, fill_value: Option<f64>) -> Self {
        self.pad = true;
        self.fill_value = fill_value;
        self
    }

    fn trim_options(&self) -> TrimOptions {
        TrimOptions {
            pad: self.pad,
            fill_value: self.fill_value,
        }
    }
}

/// Result of [`read`].
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub dataset: SpatialDataset,
    pub sources: Vec<String>,
    pub warnings: Vec<ReadWarning>,
}

/// Read `source` into a spatial dataset.
///
/// A directory needs `options.extent`; the tiles covering it are resolved
/// with `options.tile_spec` and merged. When an extent is given, the result
/// is trimmed (and padded with `options.pad`) to it.
pub fn read(source: &ReadSource, options: &ReadOptions) -> ReadResult<ReadOutcome> {
    read_with(&Loader::default(), source, options)
}

/// [`read`] with a caller-provided loader.
pub fn read_with(loader: &Loader, source: &ReadSource, options: &ReadOptions) -> ReadResult<ReadOutcome> {
    if let Some(extent) = &options.extent {
        extent.validate()?;
    }

    let pattern = options.pattern.as_deref();
    let mut warnings = Vec::new();

    let loaded = match source {
        ReadSource::Path(path) if path.is_dir() => {
            let extent = options
                .extent
                .ok_or_else(|| ReadError::MissingExtent(path.display().to_string()))?;
            let resolver = TileResolver::new(TemplateRegistry::with_templates(&options.templates));
            let tiles = resolver.resolve(path, &extent, &options.tile_spec)?;
            warnings.extend(tiles.warnings);
            if tiles.paths.is_empty() {
                return Err(ReadError::NoTiles(format!(
                    "no tile in {} matches extent {}",
                    path.display(),
                    extent
                )));
            }
            load_paths(loader, &tiles.paths, pattern, options.parallel)?
        }
        ReadSource::Path(path) => loader.load(&path_str(path), pattern)?,
        ReadSource::Paths(paths) => {
            if paths.is_empty() {
                return Err(ReadError::NoTiles("empty path list".to_string()));
            }
            load_paths(loader, paths, pattern, options.parallel)?
        }
    };
    warnings.extend(loaded.warnings);

    let mut dataset = SpatialDataset::new(loaded.dataset);
    if let Some(extent) = &options.extent {
        dataset = dataset.trim(extent, &options.trim_options())?;
    }

    info!(
        sources = loaded.sources.len(),
        warnings = warnings.len(),
        trimmed = options.extent.is_some(),
        "Read complete"
    );
    Ok(ReadOutcome {
        dataset,
        sources: loaded.sources,
        warnings,
    })
}

fn load_paths(loader: &Loader, paths: &[PathBuf], pattern: Option<&str>, parallel: bool) -> ReadResult<Loaded> {
    let paths: Vec<String> = paths.iter().map(|p| path_str(p)).collect();
    loader.load_many(&paths, pattern, parallel)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
