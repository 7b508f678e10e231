//! SRTM `.hgt` driver.
//!
//! An `.hgt` file is a headerless square grid of big-endian `i16` heights.
//! The file name carries the south-west corner (`N45E006.hgt`) and the
//! side length follows from the payload size (`2 * n * n` bytes).
//! Samples sit on grid points, so the cell spacing is `1 / (n - 1)`.

use std::collections::BTreeMap;

use rasterx_common::TileCoord;

use super::{deinterleave, Raster, RasterDriver};
use crate::error::{RasterIoError, RasterIoResult};
use crate::info::RasterInfo;
use crate::vsi;

const HGT_NODATA: f64 = -32768.0;

pub struct HgtDriver;

/// South-west corner encoded in an SRTM file name, e.g. `S07W120.hgt`.
///
/// Anything may follow the seven corner characters as long as the name
/// ends in `.hgt` (case-insensitive).
pub fn parse_hgt_name(name: &str) -> Option<TileCoord> {
    let name = vsi::file_name(name);
    if name.len() < 11 || !name.to_ascii_lowercase().ends_with(".hgt") {
        return None;
    }
    let bytes = name.as_bytes();

    let y_sign = match bytes[0].to_ascii_uppercase() {
        b'N' => 1,
        b'S' => -1,
        _ => return None,
    };
    let x_sign = match bytes[3].to_ascii_uppercase() {
        b'E' => 1,
        b'W' => -1,
        _ => return None,
    };
    let y: i32 = name.get(1..3)?.parse().ok()?;
    let x: i32 = name.get(4..7)?.parse().ok()?;
    if !bytes[1..3].iter().chain(&bytes[4..7]).all(u8::is_ascii_digit) {
        return None;
    }

    Some(TileCoord::new(x_sign * x, y_sign * y))
}

/// Side length from the payload size.
fn side_length(len: usize) -> Option<usize> {
    if len % 2 != 0 {
        return None;
    }
    let cells = len / 2;
    let n = (cells as f64).sqrt().round() as usize;
    (n >= 2 && n * n == cells).then_some(n)
}

impl HgtDriver {
    fn build_info(&self, name: &str, bytes: &[u8]) -> RasterIoResult<(RasterInfo, usize)> {
        let corner = parse_hgt_name(name)
            .ok_or_else(|| RasterIoError::decode(format!("'{}' is not an SRTM tile name", name)))?;
        let n = side_length(bytes.len()).ok_or_else(|| {
            RasterIoError::decode(format!(
                "{}: {} bytes is not a square grid of 16-bit samples",
                name,
                bytes.len()
            ))
        })?;

        let res = 1.0 / (n - 1) as f64;
        let geo_transform = [
            corner.x as f64 - 0.5 * res,
            res,
            0.0,
            corner.y as f64 + 1.0 + 0.5 * res,
            0.0,
            -res,
        ];

        let mut metadata = BTreeMap::new();
        metadata.insert("AREA_OR_POINT".to_string(), "Point".to_string());

        let info = RasterInfo {
            description: name.to_string(),
            driver_short_name: self.short_name().to_string(),
            driver_long_name: self.long_name().to_string(),
            files: vec![name.to_string()],
            size: [n, n],
            band_count: 1,
            data_type: "Int16".to_string(),
            geo_transform,
            nodata: Some(HGT_NODATA),
            metadata,
        };
        Ok((info, n))
    }
}

impl RasterDriver for HgtDriver {
    fn short_name(&self) -> &'static str {
        "SRTMHGT"
    }

    fn long_name(&self) -> &'static str {
        "SRTMHGT File Format"
    }

    /// By name only; a wrong payload size is reported by `info`.
    fn identify(&self, name: &str, _bytes: &[u8]) -> bool {
        parse_hgt_name(name).is_some()
    }

    fn info(&self, name: &str, bytes: &[u8]) -> RasterIoResult<RasterInfo> {
        self.build_info(name, bytes).map(|(info, _)| info)
    }

    fn read(&self, name: &str, bytes: &[u8]) -> RasterIoResult<Raster> {
        let (info, n) = self.build_info(name, bytes)?;
        let samples: Vec<f64> = bytes
            .chunks_exact(2)
            .map(|b| f64::from(i16::from_be_bytes([b[0], b[1]])))
            .collect();
        let bands = deinterleave(samples, n, n, 1)?;
        Ok(Raster { info, bands })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_hgt_name("N45E006.hgt"), Some(TileCoord::new(6, 45)));
        assert_eq!(parse_hgt_name("s07w120.HGT"), Some(TileCoord::new(-120, -7)));
        assert_eq!(
            parse_hgt_name("/vsizip//data/N45E006.SRTMGL1.hgt.zip/N45E006.SRTMGL1.hgt"),
            Some(TileCoord::new(6, 45))
        );
        assert_eq!(parse_hgt_name("N45E006.tif"), None);
        assert_eq!(parse_hgt_name("X45E006.hgt"), None);
        assert_eq!(parse_hgt_name("N4+E006.hgt"), None);
    }

    #[test]
    fn test_side_length() {
        assert_eq!(side_length(2 * 3601 * 3601), Some(3601));
        assert_eq!(side_length(8), Some(2));
        assert_eq!(side_length(2), None);
        assert_eq!(side_length(7), None);
        assert_eq!(side_length(2 * 10), None);
    }

    #[test]
    fn test_read_small_tile() {
        // 3x3 grid, values 0..9, big-endian
        let bytes: Vec<u8> = (0i16..9).flat_map(|v| v.to_be_bytes()).collect();
        let raster = HgtDriver.read("N01E002.hgt", &bytes).unwrap();

        assert_eq!(raster.info.size, [3, 3]);
        assert_eq!(raster.bands[0][[1, 2]], 5.0);
        let gt = raster.info.geo_transform;
        assert!((gt[1] - 0.5).abs() < 1e-12);
        assert!((gt[0] - 1.75).abs() < 1e-12);
        assert!((gt[3] - 2.25).abs() < 1e-12);
        // First pixel centre sits on the NW corner of the tile
        assert!((raster.x_coords()[0] - 2.0).abs() < 1e-12);
        assert!((raster.y_coords()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_size_fails() {
        assert!(HgtDriver.info("N01E002.hgt", &[0u8; 10]).is_err());
    }
}
