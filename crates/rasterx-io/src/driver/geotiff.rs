//! GeoTIFF driver built on the pure Rust `tiff` crate.
//!
//! Geo-referencing is taken from ModelPixelScale + ModelTiepoint, or from
//! ModelTransformation. Files without either are placed in pixel space
//! `(0, 1, 0, 0, 0, -1)`.

use std::collections::BTreeMap;
use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::{deinterleave, Raster, RasterDriver};
use crate::error::{RasterIoError, RasterIoResult};
use crate::info::RasterInfo;

// GeoTIFF / GDAL private tag IDs
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GDAL_NODATA: u16 = 42113;

const PIXEL_SPACE: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, -1.0];

/// Classic TIFF and BigTIFF, both byte orders.
const MAGICS: [&[u8; 4]; 4] = [b"II*\0", b"MM\0*", b"II+\0", b"MM\0+"];

pub struct GeoTiffDriver;

/// Header fields read without decoding pixels.
struct Header {
    width: usize,
    height: usize,
    band_count: usize,
    data_type: String,
    geo_transform: [f64; 6],
    nodata: Option<f64>,
}

impl GeoTiffDriver {
    fn read_header(decoder: &mut Decoder<Cursor<&[u8]>>) -> RasterIoResult<Header> {
        let (width, height) = decoder.dimensions()?;
        let band_count = decoder
            .get_tag_u32(Tag::SamplesPerPixel)
            .map(|n| n as usize)
            .unwrap_or(1);

        let bits = decoder
            .get_tag_u32_vec(Tag::BitsPerSample)
            .ok()
            .and_then(|v| v.first().copied())
            .unwrap_or(8);
        let format = decoder
            .get_tag_u32_vec(Tag::SampleFormat)
            .ok()
            .and_then(|v| v.first().copied())
            .unwrap_or(1);

        let nodata = decoder
            .get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA))
            .ok()
            .and_then(|s| s.trim_matches(|c: char| c == '\0' || c.is_whitespace()).parse().ok());

        Ok(Header {
            width: width as usize,
            height: height as usize,
            band_count,
            data_type: data_type_name(format, bits),
            geo_transform: Self::geo_transform(decoder),
            nodata,
        })
    }

    fn geo_transform(decoder: &mut Decoder<Cursor<&[u8]>>) -> [f64; 6] {
        let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE)).ok();
        let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT)).ok();

        if let (Some(scale), Some(tie)) = (&scale, &tiepoint) {
            // ModelTiepoint: [I, J, K, X, Y, Z], ModelPixelScale: [ScaleX, ScaleY, ScaleZ]
            if tie.len() >= 6 && scale.len() >= 2 {
                return [
                    tie[3] - tie[0] * scale[0],
                    scale[0],
                    0.0,
                    tie[4] + tie[1] * scale[1],
                    0.0,
                    -scale[1],
                ];
            }
        }

        if let Ok(m) = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION)) {
            // Row-major 4x4 matrix
            if m.len() >= 8 {
                return [m[3], m[0], m[1], m[7], m[4], m[5]];
            }
        }

        PIXEL_SPACE
    }

    fn build_info(&self, name: &str, header: &Header) -> RasterInfo {
        let mut metadata = BTreeMap::new();
        metadata.insert("AREA_OR_POINT".to_string(), "Area".to_string());
        RasterInfo {
            description: name.to_string(),
            driver_short_name: self.short_name().to_string(),
            driver_long_name: self.long_name().to_string(),
            files: vec![name.to_string()],
            size: [header.width, header.height],
            band_count: header.band_count,
            data_type: header.data_type.clone(),
            geo_transform: header.geo_transform,
            nodata: header.nodata,
            metadata,
        }
    }
}

impl RasterDriver for GeoTiffDriver {
    fn short_name(&self) -> &'static str {
        "GTiff"
    }

    fn long_name(&self) -> &'static str {
        "GeoTIFF"
    }

    fn identify(&self, _name: &str, bytes: &[u8]) -> bool {
        bytes.len() >= 4 && MAGICS.iter().any(|m| &bytes[..4] == m.as_slice())
    }

    fn info(&self, name: &str, bytes: &[u8]) -> RasterIoResult<RasterInfo> {
        let mut decoder = Decoder::new(Cursor::new(bytes))?;
        let header = Self::read_header(&mut decoder)?;
        Ok(self.build_info(name, &header))
    }

    fn read(&self, name: &str, bytes: &[u8]) -> RasterIoResult<Raster> {
        let mut decoder = Decoder::new(Cursor::new(bytes))?;
        let header = Self::read_header(&mut decoder)?;

        let samples: Vec<f64> = match decoder.read_image()? {
            DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
            DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F64(data) => data,
            DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
        };

        let bands = deinterleave(samples, header.width, header.height, header.band_count)
            .map_err(|e| RasterIoError::decode(format!("{}: {}", name, e)))?;

        Ok(Raster {
            info: self.build_info(name, &header),
            bands,
        })
    }
}

/// GDAL type name from TIFF SampleFormat and BitsPerSample.
fn data_type_name(sample_format: u32, bits: u32) -> String {
    let name = match (sample_format, bits) {
        (1, 8) => "Byte",
        (1, 16) => "UInt16",
        (1, 32) => "UInt32",
        (1, 64) => "UInt64",
        (2, 8) => "Int8",
        (2, 16) => "Int16",
        (2, 32) => "Int32",
        (2, 64) => "Int64",
        (3, 32) => "Float32",
        (3, 64) => "Float64",
        _ => "Unknown",
    };
    name.to_string()
}
