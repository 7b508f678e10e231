//! Tests for the raster locator and drivers against generated fixtures.

use rasterx_io::{get_info, probe, DriverRegistry, InfoFormat, ProbeOutcome, RasterIoError};
use test_utils::{
    assert_approx_eq, hgt_bytes, temp_test_dir, write_hgt, write_tar, write_zip, GeoTiffFixture,
};

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

// ============================================================================
// Direct rasters
// ============================================================================

#[test]
fn test_probe_plain_geotiff() {
    let dir = temp_test_dir();
    let tif = GeoTiffFixture::tile(6, 45, 4, 0.0).write(dir.path().join("dem.tif"));

    let infos = probe(path_str(&tif), None).unwrap();
    assert_eq!(infos.len(), 1);

    let info = &infos[0];
    assert_eq!(info.driver_short_name, "GTiff");
    assert_eq!(info.size, [4, 4]);
    assert_eq!(info.band_count, 1);
    assert_eq!(info.data_type, "Float32");
    assert_eq!(info.files, vec![path_str(&tif).to_string()]);
    assert_approx_eq!(info.geo_transform[0], 6.0, 1e-12);
    assert_approx_eq!(info.geo_transform[1], 0.25, 1e-12);
    assert_approx_eq!(info.geo_transform[3], 46.0, 1e-12);
    assert_approx_eq!(info.geo_transform[5], -0.25, 1e-12);
}

#[test]
fn test_geotiff_nodata_tag() {
    let dir = temp_test_dir();
    let tif = GeoTiffFixture::tile(0, 0, 2, 0.0)
        .with_nodata(-9999.0)
        .write(dir.path().join("nodata.tif"));

    let infos = probe(path_str(&tif), None).unwrap();
    assert_eq!(infos[0].nodata, Some(-9999.0));
}

#[test]
fn test_geotiff_without_georeference_uses_pixel_space() {
    let dir = temp_test_dir();
    let tif = GeoTiffFixture::tile(0, 0, 3, 0.0)
        .without_georeference()
        .write(dir.path().join("plain.tif"));

    let infos = probe(path_str(&tif), None).unwrap();
    assert_eq!(infos[0].geo_transform, [0.0, 1.0, 0.0, 0.0, 0.0, -1.0]);
}

#[test]
fn test_open_geotiff_values() {
    let dir = temp_test_dir();
    let tif = GeoTiffFixture::tile(0, 0, 3, 0.5).write(dir.path().join("values.tif"));

    let raster = DriverRegistry::default().open(path_str(&tif)).unwrap();
    assert_eq!(raster.bands.len(), 1);
    // value = base + col * 1000 + row
    assert_approx_eq!(raster.bands[0][[2, 1]], 1002.5, 1e-6);
    assert_approx_eq!(raster.x_coords()[0], 1.0 / 6.0, 1e-9);
    assert_approx_eq!(raster.y_coords()[0], 1.0 - 1.0 / 6.0, 1e-9);
}

#[test]
fn test_open_three_band_geotiff() {
    let dir = temp_test_dir();
    let mut fixture = GeoTiffFixture::tile(0, 0, 2, 0.0);
    fixture.bands = vec![vec![1.0; 4], vec![2.0; 4], vec![3.0; 4]];
    let tif = fixture.write(dir.path().join("rgb.tif"));

    let raster = DriverRegistry::default().open(path_str(&tif)).unwrap();
    assert_eq!(raster.info.band_count, 3);
    assert_eq!(raster.bands.len(), 3);
    assert_approx_eq!(raster.bands[1][[1, 1]], 2.0, 1e-12);
    assert_approx_eq!(raster.bands[2][[0, 0]], 3.0, 1e-12);
}

#[test]
fn test_probe_plain_hgt() {
    let dir = temp_test_dir();
    let hgt = write_hgt(dir.path(), "S07E003.hgt", 5);

    let infos = probe(path_str(&hgt), None).unwrap();
    assert_eq!(infos[0].driver_short_name, "SRTMHGT");
    assert_eq!(infos[0].nodata, Some(-32768.0));
    assert_approx_eq!(infos[0].geo_transform[1], 0.25, 1e-12);
    assert_approx_eq!(infos[0].geo_transform[0], 3.0 - 0.125, 1e-12);
    assert_approx_eq!(infos[0].geo_transform[3], -6.0 + 0.125, 1e-12);
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn test_probe_zip_with_one_geotiff() {
    let dir = temp_test_dir();
    let tif = GeoTiffFixture::tile(0, 0, 2, 0.0).to_bytes();
    let zip = write_zip(
        dir.path().join("scene.zip"),
        &[("readme.txt", &b"hello"[..]), ("foo.tif", tif.as_slice())],
    );

    let infos = probe(path_str(&zip), None).unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].files, vec![format!("/vsizip/{}/foo.tif", zip.display())]);
}

#[test]
fn test_probe_tar_with_pattern() {
    let dir = temp_test_dir();
    let a = GeoTiffFixture::tile(0, 0, 2, 0.0).to_bytes();
    let b = GeoTiffFixture::tile(1, 0, 2, 0.0).to_bytes();
    let tar = write_tar(
        dir.path().join("bands.tar"),
        &[("B01.tif", a.as_slice()), ("B02.tif", b.as_slice())],
    );

    assert_eq!(probe(path_str(&tar), None).unwrap().len(), 2);

    let infos = probe(path_str(&tar), Some("B02")).unwrap();
    assert_eq!(infos.len(), 1);
    assert!(infos[0].description.ends_with("/B02.tif"));
}

#[test]
fn test_probe_hgt_inside_zip() {
    let dir = temp_test_dir();
    let bytes = hgt_bytes(3);
    let zip = write_zip(
        dir.path().join("N45E006.SRTMGL1.hgt.zip"),
        &[("N45E006.hgt", bytes.as_slice())],
    );

    let infos = probe(path_str(&zip), None).unwrap();
    assert_eq!(infos[0].driver_short_name, "SRTMHGT");
    assert_eq!(infos[0].size, [3, 3]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_non_raster_reports_not_found_with_diagnostics() {
    let dir = temp_test_dir();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "not a raster").unwrap();

    match probe(path_str(&path), None) {
        Err(RasterIoError::RasterNotFound { path: p, diagnostics }) => {
            assert_eq!(p, path_str(&path));
            assert!(!diagnostics.is_empty());
        }
        other => panic!("expected RasterNotFound, got {other:?}"),
    }
}

#[test]
fn test_corrupt_member_adds_diagnostic() {
    let dir = temp_test_dir();
    let zip = write_zip(
        dir.path().join("broken.zip"),
        &[("bad.tif", &b"II*\0\xff\xff\xff\xff"[..]), ("notes.txt", &b"text"[..])],
    );

    match probe(path_str(&zip), None) {
        Err(RasterIoError::RasterNotFound { diagnostics, .. }) => {
            // Direct probe plus the recognised-but-broken member; notes.txt is skipped
            assert_eq!(diagnostics.len(), 2);
            assert!(diagnostics[1].contains("bad.tif"));
        }
        other => panic!("expected RasterNotFound, got {other:?}"),
    }
}

#[test]
fn test_probe_outcome_not_raster() {
    let dir = temp_test_dir();
    let path = dir.path().join("data.bin");
    std::fs::write(&path, [0u8; 16]).unwrap();

    assert!(matches!(
        DriverRegistry::default().probe(path_str(&path)),
        ProbeOutcome::NotRaster(_)
    ));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_get_info_json_and_text() {
    let dir = temp_test_dir();
    let tif = GeoTiffFixture::tile(0, 0, 2, 0.0).write(dir.path().join("a.tif"));

    let json = get_info(path_str(&tif), None, InfoFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json[0]).unwrap();
    assert_eq!(value["bandCount"], 1);

    let text = get_info(path_str(&tif), None, InfoFormat::Text).unwrap();
    assert!(text[0].contains("Driver: GTiff/GeoTIFF"));
}
