//! Raster drivers.
//!
//! A driver recognises a raster payload, reports its metadata and decodes
//! its bands. [`DriverRegistry`] tries drivers in order, first match wins.

mod geotiff;
mod hgt;

pub use geotiff::GeoTiffDriver;
pub use hgt::{parse_hgt_name, HgtDriver};

use ndarray::Array2;
use tracing::debug;

use crate::error::{RasterIoError, RasterIoResult};
use crate::info::RasterInfo;
use crate::vsi;

/// A decoded raster.
#[derive(Debug, Clone)]
pub struct Raster {
    pub info: RasterInfo,
    /// One `(height, width)` array per band, rows in file order
    pub bands: Vec<Array2<f64>>,
}

impl Raster {
    /// Pixel-centre x coordinates of each column.
    pub fn x_coords(&self) -> Vec<f64> {
        let gt = &self.info.geo_transform;
        (0..self.info.width())
            .map(|i| gt[0] + (i as f64 + 0.5) * gt[1])
            .collect()
    }

    /// Pixel-centre y coordinates of each row (descending for north-up).
    pub fn y_coords(&self) -> Vec<f64> {
        let gt = &self.info.geo_transform;
        (0..self.info.height())
            .map(|j| gt[3] + (j as f64 + 0.5) * gt[5])
            .collect()
    }
}

/// Format-specific raster reader.
pub trait RasterDriver: Send + Sync {
    fn short_name(&self) -> &'static str;

    fn long_name(&self) -> &'static str;

    /// Cheap check on the name and leading bytes.
    fn identify(&self, name: &str, bytes: &[u8]) -> bool;

    fn info(&self, name: &str, bytes: &[u8]) -> RasterIoResult<RasterInfo>;

    fn read(&self, name: &str, bytes: &[u8]) -> RasterIoResult<Raster>;
}

/// Result of probing a path for raster content.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// A driver opened the path
    Raster(RasterInfo),
    /// No driver recognised the payload
    NotRaster(String),
    /// Recognised but unreadable, or the path could not be read at all
    Failed(String),
}

/// Ordered list of raster drivers.
pub struct DriverRegistry {
    drivers: Vec<Box<dyn RasterDriver>>,
}

impl DriverRegistry {
    pub fn empty() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    pub fn register(&mut self, driver: Box<dyn RasterDriver>) {
        self.drivers.push(driver);
    }

    pub fn short_names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|d| d.short_name()).collect()
    }

    fn driver_for(&self, name: &str, bytes: &[u8]) -> Option<&dyn RasterDriver> {
        self.drivers
            .iter()
            .find(|d| d.identify(name, bytes))
            .map(|d| d.as_ref())
    }

    /// Probe a plain path or locator.
    pub fn probe(&self, path: &str) -> ProbeOutcome {
        let bytes = match vsi::read_source(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path, error = %e, "Probe could not read source");
                return ProbeOutcome::Failed(format!("{}: {}", path, e));
            }
        };

        match self.driver_for(path, &bytes) {
            Some(driver) => match driver.info(path, &bytes) {
                Ok(info) => {
                    debug!(path = %path, driver = driver.short_name(), "Probe succeeded");
                    ProbeOutcome::Raster(info)
                }
                Err(e) => {
                    debug!(path = %path, driver = driver.short_name(), error = %e, "Probe failed");
                    ProbeOutcome::Failed(format!("{}: {}", path, e))
                }
            },
            None => ProbeOutcome::NotRaster(format!(
                "'{}' not recognized as a supported file format",
                path
            )),
        }
    }

    /// Decode the raster at a plain path or locator.
    pub fn open(&self, path: &str) -> RasterIoResult<Raster> {
        let bytes = vsi::read_source(path)?;
        let driver = self.driver_for(path, &bytes).ok_or_else(|| {
            RasterIoError::UnsupportedFormat(format!(
                "'{}' not recognized as a supported file format",
                path
            ))
        })?;
        debug!(path = %path, driver = driver.short_name(), "Decoding raster");
        driver.read(path, &bytes)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(GeoTiffDriver));
        registry.register(Box::new(HgtDriver));
        registry
    }
}

/// Split chunky (pixel-interleaved) samples into per-band arrays.
pub(crate) fn deinterleave(
    samples: Vec<f64>,
    width: usize,
    height: usize,
    band_count: usize,
) -> RasterIoResult<Vec<Array2<f64>>> {
    let expected = width * height * band_count;
    if samples.len() != expected {
        return Err(RasterIoError::decode(format!(
            "expected {} samples ({}x{}x{}), got {}",
            expected,
            width,
            height,
            band_count,
            samples.len()
        )));
    }

    if band_count == 1 {
        return Array2::from_shape_vec((height, width), samples)
            .map(|band| vec![band])
            .map_err(|e| RasterIoError::decode(e.to_string()));
    }

    (0..band_count)
        .map(|b| {
            let band: Vec<f64> = samples.iter().skip(b).step_by(band_count).copied().collect();
            Array2::from_shape_vec((height, width), band)
                .map_err(|e| RasterIoError::decode(e.to_string()))
        })
        .collect()
}
