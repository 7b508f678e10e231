//! Read geospatial rasters into labeled datasets.
//!
//! Input can be a raster file, a zip/tar container of rasters, a directory
//! of tiles plus a bounding box, or an explicit list of files. Everything
//! ends up as a [`SpatialDataset`] with variables `band{file}_{band}` over
//! ascending `y`/`x` coordinates.
//!
//! ```no_run
//! use rasterx::{read, BoundingBox, ReadOptions, ReadSource, TileSpec};
//!
//! let spec = TileSpec { template: "SRTM".into(), ext: ".tif".into(), ..Default::default() };
//! let options = ReadOptions::default()
//!     .with_extent(BoundingBox::new(-2.5, 1.5, -1.5, 0.5))
//!     .with_tile_spec(spec);
//! let outcome = read(&ReadSource::from("/data/dem"), &options)?;
//! println!("{}", outcome.dataset);
//! # Ok::<(), rasterx::ReadError>(())
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod native;
pub mod read;
pub mod tiles;
pub mod warning;

pub use config::ReadConfig;
pub use error::{ReadError, ReadResult};
pub use loader::{load, load_many, Loaded, Loader};
pub use native::{default_readers, NativeReader};
pub use read::{read, read_with, ReadOptions, ReadOutcome, ReadSource};
pub use tiles::{resolve_tiles, tile_corners, TileResolver, TileSet};
pub use warning::ReadWarning;

pub use rasterx_common::{BoundingBox, TemplateRegistry, TileCoord, TileSize, TileSpec};
pub use rasterx_grid::{Dataset, SpatialDataset, TrimOptions};
pub use rasterx_io::{get_info, probe, InfoFormat, RasterInfo};
