//! Read configuration: defaults, YAML file and environment overrides.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rasterx_common::{BoundingBox, TemplateRegistry, TileSize, TileSpec};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ReadError, ReadResult};
use crate::read::ReadOptions;

/// Configuration for reading tiles and containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    /// Built-in template name or a literal template string.
    pub template: String,

    /// Tile file extension, appended to the rendered template.
    pub ext: String,

    /// Wrap tile x corners as longitudes.
    pub lonlat: bool,

    /// Tile size, a scalar or `[x, y]`.
    pub tilesize: TileSize,

    /// Extra named templates.
    pub templates: HashMap<String, String>,

    /// Container member pattern.
    pub pattern: Option<String>,

    /// Load tiles in parallel.
    pub parallel: bool,

    /// Pad results to the requested extent.
    pub pad: bool,

    /// Value for padded cells.
    pub fill_value: Option<f64>,
}

impl Default for ReadConfig {
    fn default() -> Self {
        let spec = TileSpec::default();
        Self {
            template: spec.template,
            ext: spec.ext,
            lonlat: spec.lonlat,
            tilesize: spec.tile_size,
            templates: HashMap::new(),
            pattern: None,
            parallel: false,
            pad: false,
            fill_value: None,
        }
    }
}

impl ReadConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ReadResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReadError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: ReadConfig = serde_yaml::from_str(&content).map_err(|e| {
            ReadError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), template = %config.template, "Loaded read config");
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `RASTERX_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("RASTERX_TEMPLATE") {
            self.template = val;
        }

        if let Some(val) = var("RASTERX_EXT") {
            self.ext = val;
        }

        if let Some(val) = var("RASTERX_LONLAT") {
            self.lonlat = val.to_lowercase() == "true" || val == "1";
        }

        if let Some(val) = var("RASTERX_TILESIZE") {
            if let Ok(size) = TileSize::parse(&val) {
                self.tilesize = size;
            }
        }

        if let Some(val) = var("RASTERX_PARALLEL") {
            self.parallel = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let registry = TemplateRegistry::with_templates(&self.templates);
        if let Err(e) = registry.resolve(&self.template) {
            return Err(e.to_string());
        }

        if let Some(fill) = self.fill_value {
            if fill.is_infinite() {
                return Err("fill_value must be finite or NaN".to_string());
            }
        }

        Ok(())
    }

    pub fn tile_spec(&self) -> TileSpec {
        TileSpec {
            template: self.template.clone(),
            ext: self.ext.clone(),
            lonlat: self.lonlat,
            tile_size: self.tilesize,
        }
    }

    /// Read options for `extent` with these settings.
    pub fn to_read_options(&self, extent: Option<BoundingBox>) -> ReadOptions {
        ReadOptions {
            pattern: self.pattern.clone(),
            extent,
            tile_spec: self.tile_spec(),
            templates: self.templates.clone(),
            pad: self.pad,
            fill_value: self.fill_value,
            parallel: self.parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReadConfig::default();
        assert_eq!(config.template, "AsterGDEM");
        assert_eq!(config.ext, ".nc");
        assert!(config.lonlat);
        assert_eq!(config.tilesize, TileSize::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RASTERX_TEMPLATE", "SRTM"),
            ("RASTERX_EXT", ".tif"),
            ("RASTERX_LONLAT", "false"),
            ("RASTERX_TILESIZE", "5,1"),
            ("RASTERX_PARALLEL", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = ReadConfig::default();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.template, "SRTM");
        assert_eq!(config.ext, ".tif");
        assert!(!config.lonlat);
        assert_eq!(config.tilesize, TileSize::new(5, 1).unwrap());
        assert!(config.parallel);
    }

    #[test]
    fn test_bad_tilesize_env_is_ignored() {
        let mut config = ReadConfig::default();
        config.apply_vars(|key| (key == "RASTERX_TILESIZE").then(|| "0".to_string()));
        assert_eq!(config.tilesize, TileSize::default());
    }

    #[test]
    fn test_yaml() {
        let yaml = r#"
template: tiles_{y}_{x}
ext: .tif
tilesize: [2, 1]
pad: true
fill_value: -9999
"#;
        let config: ReadConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.template, "tiles_{y}_{x}");
        assert_eq!(config.tilesize, TileSize::new(2, 1).unwrap());
        assert!(config.lonlat);
        assert!(config.validate().is_ok());

        let options = config.to_read_options(None);
        assert!(options.pad);
        assert_eq!(options.fill_value, Some(-9999.0));
        assert_eq!(options.tile_spec.ext, ".tif");
    }

    #[test]
    fn test_validate_rejects_bad_template() {
        let config = ReadConfig {
            template: "{lat}".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
