//! Raster Locator: find raster content at a path, directly or in a container.

use std::path::Path;

use tracing::{debug, info};

use crate::archive;
use crate::driver::{DriverRegistry, ProbeOutcome};
use crate::error::{RasterIoError, RasterIoResult};
use crate::info::{InfoFormat, RasterInfo};

/// Finds rasters with a driver registry.
pub struct RasterLocator {
    registry: DriverRegistry,
}

impl RasterLocator {
    pub fn new(registry: DriverRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Metadata of every raster found at `path`.
    ///
    /// The path itself is probed first. If it is not a raster, it is
    /// treated as a container and every member selected by `pattern` is
    /// probed. Members no driver recognises are skipped; members that a
    /// driver recognised but could not read add a diagnostic.
    pub fn probe(&self, path: &str, pattern: Option<&str>) -> RasterIoResult<Vec<RasterInfo>> {
        let mut diagnostics = Vec::new();

        match self.registry.probe(path) {
            ProbeOutcome::Raster(info) => return Ok(vec![info]),
            ProbeOutcome::NotRaster(msg) | ProbeOutcome::Failed(msg) => diagnostics.push(msg),
        }

        let members = archive::list_members(Path::new(path), pattern);
        debug!(path = %path, members = members.len(), "Probing container members");

        let mut found = Vec::new();
        for member in &members {
            match self.registry.probe(member) {
                ProbeOutcome::Raster(info) => found.push(info),
                ProbeOutcome::NotRaster(_) => {}
                ProbeOutcome::Failed(msg) => diagnostics.push(msg),
            }
        }

        if found.is_empty() {
            return Err(RasterIoError::RasterNotFound {
                path: path.to_string(),
                diagnostics,
            });
        }

        info!(path = %path, rasters = found.len(), "Found rasters in container");
        Ok(found)
    }

    /// Rendered metadata of every raster found at `path`.
    pub fn get_info(
        &self,
        path: &str,
        pattern: Option<&str>,
        format: InfoFormat,
    ) -> RasterIoResult<Vec<String>> {
        self.probe(path, pattern)?
            .iter()
            .map(|info| info.render(format))
            .collect()
    }
}

impl Default for RasterLocator {
    fn default() -> Self {
        Self::new(DriverRegistry::default())
    }
}

/// [`RasterLocator::probe`] with the default drivers.
pub fn probe(path: &str, pattern: Option<&str>) -> RasterIoResult<Vec<RasterInfo>> {
    RasterLocator::default().probe(path, pattern)
}

/// [`RasterLocator::get_info`] with the default drivers.
pub fn get_info(path: &str, pattern: Option<&str>, format: InfoFormat) -> RasterIoResult<Vec<String>> {
    RasterLocator::default().get_info(path, pattern, format)
}
