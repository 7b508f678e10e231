//! Tile Grid Resolver: from a bounding box to the tile files covering it.
//!
//! Tiles are named after their integer south-west corner. The corners
//! covering a box are enumerated per axis, rendered through a naming
//! template and globbed in the base directory.

use std::path::{Path, PathBuf};

use rasterx_common::{
    normalize_longitude, BoundingBox, CommonResult, TemplateRegistry, TileCoord, TileSize,
    TileSpec,
};
use tracing::{debug, info};

use crate::error::{ReadError, ReadResult};
use crate::warning::ReadWarning;

/// Files found for a box, in y-outer/x-inner order, plus missing tiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileSet {
    pub paths: Vec<PathBuf>,
    pub warnings: Vec<ReadWarning>,
}

/// Corners along one axis.
///
/// Unit tiles push a negative lower bound one tile further out before
/// truncation. Larger tiles sit on multiples of `size`, so both bounds are
/// floored onto that lattice. The tile holding the upper bound is included.
fn axis_corners(lo: f64, hi: f64, size: u32) -> Vec<i32> {
    if size <= 1 {
        let lo = if lo < 0.0 { lo - 1.0 } else { lo };
        let start = lo.trunc() as i32;
        let end = (hi.trunc() as i32).saturating_add(1);
        return (start..end).collect();
    }

    let step = f64::from(size);
    let start = ((lo / step).floor() * step) as i32;
    let end = (((hi / step).floor() * step) as i32).saturating_add(size as i32);
    (start..end).step_by(size as usize).collect()
}

/// South-west corners of every tile needed to cover `bbox`.
///
/// Ordered by y, then x, both ascending. With `lonlat` the x corners are
/// wrapped with [`normalize_longitude`].
pub fn tile_corners(
    bbox: &BoundingBox,
    tile_size: TileSize,
    lonlat: bool,
) -> CommonResult<Vec<TileCoord>> {
    bbox.validate()?;

    let xs: Vec<i32> = axis_corners(bbox.x1, bbox.x2, tile_size.x())
        .into_iter()
        .map(|x| if lonlat { normalize_longitude(x) } else { x })
        .collect();
    let ys = axis_corners(bbox.y1, bbox.y2, tile_size.y());

    Ok(ys
        .iter()
        .flat_map(|&y| xs.iter().map(move |&x| TileCoord::new(x, y)))
        .collect())
}

/// Resolves tile files with a template registry.
#[derive(Debug, Clone, Default)]
pub struct TileResolver {
    registry: TemplateRegistry,
}

impl TileResolver {
    pub fn new(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Find the file for every tile covering `bbox` under `base`.
    ///
    /// Tiles with no match are reported as [`ReadWarning::TileNotFound`]
    /// and skipped. With several matches the first in sorted order wins.
    pub fn resolve(&self, base: &Path, bbox: &BoundingBox, spec: &TileSpec) -> ReadResult<TileSet> {
        let corners = tile_corners(bbox, spec.tile_size, spec.lonlat)?;
        let template = self.registry.resolve(&spec.template)?;
        let escaped_base = PathBuf::from(glob::Pattern::escape(&base.to_string_lossy()));

        debug!(
            base = %base.display(),
            template = %template,
            tiles = corners.len(),
            "Resolving tiles"
        );

        let mut set = TileSet::default();
        for coord in corners {
            let name = format!("{}{}", template.format(coord), spec.ext);
            let pattern = escaped_base.join(&name);
            let pattern = pattern.to_string_lossy();

            let mut matches: Vec<PathBuf> = glob::glob(&pattern)
                .map_err(|e| ReadError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })?
                .filter_map(Result::ok)
                .collect();
            matches.sort();

            match matches.into_iter().next() {
                Some(path) => {
                    debug!(tile = %coord, path = %path.display(), "Tile resolved");
                    set.paths.push(path);
                }
                None => {
                    let missing = base.join(&name).display().to_string();
                    set.warnings.push(ReadWarning::TileNotFound { pattern: missing }.emit());
                }
            }
        }

        info!(
            base = %base.display(),
            found = set.paths.len(),
            missing = set.warnings.len(),
            "Resolved tiles"
        );
        Ok(set)
    }
}

/// [`TileResolver::resolve`] with the built-in templates.
pub fn resolve_tiles(base: &Path, bbox: &BoundingBox, spec: &TileSpec) -> ReadResult<TileSet> {
    TileResolver::default().resolve(base, bbox, spec)
}
