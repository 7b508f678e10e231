//! rasterx command-line tool.
//!
//! Inspects rasters and containers, resolves tile directories and reads
//! rasters into datasets, printing a summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rasterx::{read, ReadConfig, ReadSource, TemplateRegistry, TileResolver};
use rasterx_common::{BoundingBox, TileSize};
use rasterx_io::{get_info, InfoFormat};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "rasterx")]
#[command(about = "Read geospatial rasters from files, containers and tile directories")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (YAML)
    #[arg(short, long, global = true, env = "RASTERX_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directives; `RUST_LOG` takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print raster metadata for a file or every raster in a container
    Info {
        path: String,

        /// Container member pattern (glob, or substring)
        #[arg(short, long)]
        pattern: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the tile files covering an extent
    Tiles {
        dir: PathBuf,

        /// Extent as x1,x2,y1,y2
        #[arg(short, long, allow_hyphen_values = true)]
        extent: String,

        /// Template name (AsterGDEM, SRTM) or template string
        #[arg(long)]
        template: Option<String>,

        /// Tile file extension
        #[arg(long)]
        ext: Option<String>,

        /// Tile size, "1" or "x,y"
        #[arg(long)]
        tilesize: Option<String>,

        /// Do not wrap x corners as longitudes
        #[arg(long)]
        no_lonlat: bool,

        /// Print paths and warnings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read rasters into a dataset and print its summary
    Read {
        /// A file, container or tile directory, or several files to merge
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Extent as x1,x2,y1,y2
        #[arg(short, long, allow_hyphen_values = true)]
        extent: Option<String>,

        /// Container member pattern
        #[arg(short, long)]
        pattern: Option<String>,

        /// Template name or template string for tile directories
        #[arg(long)]
        template: Option<String>,

        /// Tile file extension
        #[arg(long)]
        ext: Option<String>,

        /// Pad the result to the full extent
        #[arg(long)]
        pad: bool,

        /// Value of padded cells
        #[arg(long, allow_hyphen_values = true)]
        fill_value: Option<f64>,

        /// Load tiles in parallel
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let mut config = match &args.config {
        Some(path) => ReadConfig::from_file(path)?,
        None => ReadConfig::default(),
    };
    config.apply_env();

    match args.command {
        Commands::Info {
            path,
            pattern,
            format,
        } => {
            let format: InfoFormat = format.parse()?;
            let reports = get_info(&path, pattern.as_deref(), format)?;
            println!("{}", reports.join("\n"));
        }

        Commands::Tiles {
            dir,
            extent,
            template,
            ext,
            tilesize,
            no_lonlat,
            json,
        } => {
            if let Some(template) = template {
                config.template = template;
            }
            if let Some(ext) = ext {
                config.ext = ext;
            }
            if let Some(tilesize) = tilesize {
                config.tilesize = TileSize::parse(&tilesize)?;
            }
            if no_lonlat {
                config.lonlat = false;
            }
            config.validate().map_err(anyhow::Error::msg)?;

            let bbox = BoundingBox::from_extent_str(&extent)?;
            let resolver = TileResolver::new(TemplateRegistry::with_templates(&config.templates));
            let tiles = resolver.resolve(&dir, &bbox, &config.tile_spec())?;

            if json {
                let report = serde_json::json!({
                    "paths": tiles.paths,
                    "warnings": tiles.warnings,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for path in &tiles.paths {
                    println!("{}", path.display());
                }
                for warning in &tiles.warnings {
                    eprintln!("warning: {}", warning);
                }
            }
        }

        Commands::Read {
            mut paths,
            extent,
            pattern,
            template,
            ext,
            pad,
            fill_value,
            parallel,
        } => {
            if let Some(template) = template {
                config.template = template;
            }
            if let Some(ext) = ext {
                config.ext = ext;
            }
            if pattern.is_some() {
                config.pattern = pattern;
            }
            if pad {
                config.pad = true;
            }
            if fill_value.is_some() {
                config.fill_value = fill_value;
            }
            if parallel {
                config.parallel = true;
            }
            config.validate().map_err(anyhow::Error::msg)?;

            let extent = extent
                .as_deref()
                .map(BoundingBox::from_extent_str)
                .transpose()?;
            let options = config.to_read_options(extent);

            let source = if paths.len() == 1 {
                ReadSource::Path(paths.remove(0))
            } else {
                ReadSource::Paths(paths)
            };

            let outcome = read(&source, &options).context("read failed")?;
            info!(sources = outcome.sources.len(), "Read finished");

            println!("{}", outcome.dataset);
            if let Ok(extent) = outcome.dataset.extent() {
                println!("Extent: {}", extent);
            }
            for warning in &outcome.warnings {
                eprintln!("warning: {}", warning);
            }
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter(log_level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// `--log-level` takes a plain level or full directives (`rasterx=debug,info`).
fn log_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_read_with_negative_extent() {
        let args = Args::try_parse_from([
            "rasterx",
            "read",
            "/data/dem",
            "--extent",
            "-2.5,1.5,-1.5,0.5",
            "--pad",
            "--fill-value",
            "-9999",
        ])
        .unwrap();

        match args.command {
            Commands::Read {
                paths,
                extent,
                pad,
                fill_value,
                ..
            } => {
                assert_eq!(paths, vec![PathBuf::from("/data/dem")]);
                assert_eq!(extent.as_deref(), Some("-2.5,1.5,-1.5,0.5"));
                assert!(pad);
                assert_eq!(fill_value, Some(-9999.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_tiles() {
        let args = Args::try_parse_from([
            "rasterx",
            "--log-level",
            "debug",
            "tiles",
            "/data/dem",
            "-e",
            "0,1,0,1",
            "--template",
            "SRTM",
            "--no-lonlat",
        ])
        .unwrap();
        assert_eq!(args.log_level, "debug");
        assert!(matches!(
            args.command,
            Commands::Tiles { no_lonlat: true, .. }
        ));
    }

    #[test]
    fn test_log_filter_accepts_directives() {
        assert_eq!(log_filter("debug").to_string(), "debug");
        let filter = log_filter("rasterx=trace,info").to_string();
        assert!(filter.contains("rasterx=trace"), "{filter}");
    }

    #[test]
    fn test_log_filter_falls_back_to_info() {
        assert_eq!(log_filter("rasterx=loud").to_string(), "info");
    }
}
