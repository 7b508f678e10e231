//! Fixture writers for raster tests.
//!
//! All writers panic on failure; they are only meant for test setup.

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tiff::encoder::colortype::{Gray32Float, RGB32Float};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

use crate::generators::{create_height_grid, create_offset_grid};

/// Common bounding boxes as `(x1, x2, y1, y2)`.
pub mod bbox {
    /// Straddles the equator and the prime meridian
    pub const STRADDLE: (f64, f64, f64, f64) = (-2.5, 1.5, -1.5, 0.5);

    /// Inside the single tile `N00E000`
    pub const INSIDE_ORIGIN_TILE: (f64, f64, f64, f64) = (0.2, 0.8, 0.2, 0.8);

    /// Reversed x (x1 > x2)
    pub const INVALID_X: (f64, f64, f64, f64) = (10.0, 5.0, 0.0, 1.0);

    /// Reversed y (y1 > y2)
    pub const INVALID_Y: (f64, f64, f64, f64) = (0.0, 1.0, 5.0, 0.0);
}

// ============================================================================
// GeoTIFF
// ============================================================================

/// In-memory description of a GeoTIFF to write.
#[derive(Debug, Clone)]
pub struct GeoTiffFixture {
    pub width: u32,
    pub height: u32,
    /// Top-left corner `(x, y)`
    pub origin: (f64, f64),
    /// Positive pixel size `(x, y)`
    pub res: (f64, f64),
    /// One or three bands, row-major, northern row first
    pub bands: Vec<Vec<f32>>,
    pub nodata: Option<f64>,
    /// Write ModelPixelScale/ModelTiepoint tags
    pub georeferenced: bool,
}

impl GeoTiffFixture {
    pub fn single_band(width: u32, height: u32, origin: (f64, f64), res: (f64, f64), data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            origin,
            res,
            bands: vec![data],
            nodata: None,
            georeferenced: true,
        }
    }

    /// A one-degree tile with south-west corner `(x, y)` and `n x n` pixels.
    ///
    /// Values are `base + col * 1000 + row`.
    pub fn tile(x: i32, y: i32, n: u32, base: f32) -> Self {
        let res = 1.0 / n as f64;
        Self::single_band(
            n,
            n,
            (x as f64, y as f64 + 1.0),
            (res, res),
            create_offset_grid(n as usize, n as usize, base),
        )
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn without_georeference(mut self) -> Self {
        self.georeferenced = false;
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut cursor).expect("Failed to create TIFF encoder");
            match self.bands.len() {
                1 => {
                    let mut image = encoder
                        .new_image::<Gray32Float>(self.width, self.height)
                        .expect("Failed to start TIFF image");
                    self.write_geo_tags(image.encoder());
                    image.write_data(&self.bands[0]).expect("Failed to write TIFF data");
                }
                3 => {
                    let interleaved: Vec<f32> = (0..self.bands[0].len())
                        .flat_map(|i| self.bands.iter().map(move |band| band[i]))
                        .collect();
                    let mut image = encoder
                        .new_image::<RGB32Float>(self.width, self.height)
                        .expect("Failed to start TIFF image");
                    self.write_geo_tags(image.encoder());
                    image.write_data(&interleaved).expect("Failed to write TIFF data");
                }
                n => panic!("GeoTiffFixture supports 1 or 3 bands, got {}", n),
            }
        }
        cursor.into_inner()
    }

    fn write_geo_tags<W: std::io::Write + std::io::Seek, K: tiff::encoder::TiffKind>(
        &self,
        dir: &mut tiff::encoder::DirectoryEncoder<W, K>,
    ) {
        if self.georeferenced {
            let pixel_scale = [self.res.0, self.res.1, 0.0];
            dir.write_tag(Tag::Unknown(33550), pixel_scale.as_slice())
                .expect("Failed to write ModelPixelScale");
            let tiepoint = [0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0];
            dir.write_tag(Tag::Unknown(33922), tiepoint.as_slice())
                .expect("Failed to write ModelTiepoint");
        }
        if let Some(nodata) = self.nodata {
            let text = nodata.to_string();
            dir.write_tag(Tag::Unknown(42113), text.as_str())
                .expect("Failed to write GDAL_NODATA");
        }
    }

    /// Write to `path`, returning it.
    pub fn write(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref().to_path_buf();
        std::fs::write(&path, self.to_bytes()).expect("Failed to write GeoTIFF fixture");
        path
    }
}

// ============================================================================
// SRTM .hgt
// ============================================================================

/// Big-endian payload of an `n x n` `.hgt` tile (see [`create_height_grid`]).
pub fn hgt_bytes(n: usize) -> Vec<u8> {
    create_height_grid(n)
        .into_iter()
        .flat_map(|v| v.to_be_bytes())
        .collect()
}

/// Write an `n x n` `.hgt` tile named `name` into `dir`.
pub fn write_hgt(dir: impl AsRef<Path>, name: &str, n: usize) -> PathBuf {
    let path = dir.as_ref().join(name);
    std::fs::write(&path, hgt_bytes(n)).expect("Failed to write HGT fixture");
    path
}

// ============================================================================
// Containers
// ============================================================================

/// Write a zip archive. Names ending in `/` become directory entries.
pub fn write_zip(path: impl AsRef<Path>, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = path.as_ref().to_path_buf();
    let file = File::create(&path).expect("Failed to create zip fixture");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).expect("Failed to add zip directory");
        } else {
            zip.start_file(*name, options).expect("Failed to start zip entry");
            zip.write_all(data).expect("Failed to write zip entry");
        }
    }
    zip.finish().expect("Failed to finish zip fixture");
    path
}

/// Write a plain tar archive. Names ending in `/` become directory entries.
pub fn write_tar(path: impl AsRef<Path>, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = path.as_ref().to_path_buf();
    let file = File::create(&path).expect("Failed to create tar fixture");
    build_tar(file, entries);
    path
}

/// Write a gzip-compressed tar archive.
pub fn write_tar_gz(path: impl AsRef<Path>, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = path.as_ref().to_path_buf();
    let file = File::create(&path).expect("Failed to create tar.gz fixture");
    let encoder = build_tar(GzEncoder::new(file, Compression::default()), entries);
    encoder.finish().expect("Failed to finish gzip stream");
    path
}

fn build_tar<W: Write>(writer: W, entries: &[(&str, &[u8])]) -> W {
    let mut builder = tar::Builder::new(writer);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        if name.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, name, std::io::empty())
                .expect("Failed to append tar directory");
        } else {
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, *data)
                .expect("Failed to append tar entry");
        }
    }
    builder.into_inner().expect("Failed to finish tar archive")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::temp_test_dir;

    #[test]
    fn test_geotiff_magic() {
        let bytes = GeoTiffFixture::tile(0, 0, 4, 0.0).to_bytes();
        assert_eq!(&bytes[..4], b"II*\0");
    }

    #[test]
    fn test_hgt_bytes_len() {
        assert_eq!(hgt_bytes(3).len(), 18);
    }

    #[test]
    fn test_write_containers() {
        let dir = temp_test_dir();
        let zip = write_zip(dir.path().join("a.zip"), &[("x.txt", &b"x"[..])]);
        let tar = write_tar(dir.path().join("a.tar"), &[("x.txt", &b"x"[..])]);
        let tgz = write_tar_gz(dir.path().join("a.tar.gz"), &[("x.txt", &b"x"[..])]);
        assert!(zip.is_file() && tar.is_file() && tgz.is_file());
    }
}
