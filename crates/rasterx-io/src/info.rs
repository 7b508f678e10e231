//! Raster metadata records and their text/JSON renderings.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RasterIoError, RasterIoResult};

/// Output format of [`RasterInfo::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for InfoFormat {
    type Err = RasterIoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(InfoFormat::Text),
            "json" => Ok(InfoFormat::Json),
            other => Err(RasterIoError::UnsupportedFormat(format!(
                "info format '{}' (expected 'text' or 'json')",
                other
            ))),
        }
    }
}

/// Metadata of one raster, as reported by a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterInfo {
    /// Path or locator the raster was opened from
    pub description: String,
    pub driver_short_name: String,
    pub driver_long_name: String,
    /// Files that make up the raster
    pub files: Vec<String>,
    /// `[width, height]` in pixels
    pub size: [usize; 2],
    pub band_count: usize,
    /// GDAL-style type name, e.g. `Float32` or `Int16`
    pub data_type: String,
    /// `(origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height)`
    pub geo_transform: [f64; 6],
    pub nodata: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl RasterInfo {
    pub fn width(&self) -> usize {
        self.size[0]
    }

    pub fn height(&self) -> usize {
        self.size[1]
    }

    /// Pixel size as `(x, y)`; `y` is positive for north-up rasters.
    pub fn res(&self) -> (f64, f64) {
        (self.geo_transform[1], -self.geo_transform[5])
    }

    pub fn render(&self, format: InfoFormat) -> RasterIoResult<String> {
        match format {
            InfoFormat::Text => Ok(self.to_text()),
            InfoFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// gdalinfo-like text block.
    pub fn to_text(&self) -> String {
        let gt = &self.geo_transform;
        let mut out = String::new();
        let _ = writeln!(out, "Driver: {}/{}", self.driver_short_name, self.driver_long_name);
        let _ = writeln!(out, "Files: {}", self.files.join("\n       "));
        let _ = writeln!(out, "Size is {}, {}", self.width(), self.height());
        let _ = writeln!(out, "Origin = ({:.15},{:.15})", gt[0], gt[3]);
        let _ = writeln!(out, "Pixel Size = ({:.15},{:.15})", gt[1], gt[5]);
        if !self.metadata.is_empty() {
            let _ = writeln!(out, "Metadata:");
            for (key, value) in &self.metadata {
                let _ = writeln!(out, "  {}={}", key, value);
            }
        }
        for band in 1..=self.band_count {
            let _ = writeln!(out, "Band {} Type={}", band, self.data_type);
            if let Some(nodata) = self.nodata {
                let _ = writeln!(out, "  NoData Value={}", nodata);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RasterInfo {
        RasterInfo {
            description: "dem.tif".to_string(),
            driver_short_name: "GTiff".to_string(),
            driver_long_name: "GeoTIFF".to_string(),
            files: vec!["dem.tif".to_string()],
            size: [4, 3],
            band_count: 2,
            data_type: "Float32".to_string(),
            geo_transform: [10.0, 0.5, 0.0, 50.0, 0.0, -0.5],
            nodata: Some(-9999.0),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<InfoFormat>().unwrap(), InfoFormat::Json);
        assert_eq!("TEXT".parse::<InfoFormat>().unwrap(), InfoFormat::Text);
        assert!("xml".parse::<InfoFormat>().is_err());
    }

    #[test]
    fn test_json_has_files() {
        let json = sample().render(InfoFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"][0], "dem.tif");
        assert_eq!(value["driverShortName"], "GTiff");
        assert_eq!(value["size"][1], 3);
    }

    #[test]
    fn test_text_rendering() {
        let text = sample().to_text();
        assert!(text.starts_with("Driver: GTiff/GeoTIFF"));
        assert!(text.contains("Size is 4, 3"));
        assert!(text.contains("Band 2 Type=Float32"));
        assert!(text.contains("NoData Value=-9999"));
    }

    #[test]
    fn test_res() {
        assert_eq!(sample().res(), (0.5, 0.5));
    }
}
