// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DICOM to displayable raster conversion
//!
//! Pixel data is decoded through `dicom-pixeldata` (which decompresses any
//! transfer syntax it has a codec for), min-max rescaled into 8 bits and
//! encoded as JPEG or PNG.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dicom_object::{file::ReadPreamble, DefaultDicomObject, OpenFileOptions};
use dicom_pixeldata::PixelDecoder;
use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::Array3;
use thiserror::Error;
use tracing::debug;

use super::image_utils::{encode_image, to_data_uri, ImageEncoding};

/// Value written to every pixel when the source grid is flat (max == min)
pub const DEGENERATE_GRAY: u8 = 128;

const PREAMBLE_LEN: usize = 128;
const DICM_MAGIC: &[u8; 4] = b"DICM";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Failed to read DICOM data: {0}")]
    Decode(String),

    #[error("Failed to decode pixel data: {0}")]
    PixelData(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// An 8-bit raster ready for display or upload
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
    pub bytes: Vec<u8>,
}

impl NormalizedImage {
    /// Bare base64 payload, as the detector expects it
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:image/<fmt>;base64,...` form for browsers
    pub fn data_uri(&self) -> String {
        to_data_uri(self.encoding.mime_type(), &self.bytes)
    }
}

/// Normalize an in-memory DICOM stream.
///
/// Streams with and without the 128-byte preamble are both accepted.
pub fn normalize_dicom_bytes(
    bytes: &[u8],
    encoding: ImageEncoding,
) -> Result<NormalizedImage, NormalizeError> {
    if bytes.is_empty() {
        return Err(NormalizeError::Decode("empty input".to_string()));
    }

    let body = if bytes.len() >= PREAMBLE_LEN + DICM_MAGIC.len()
        && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + DICM_MAGIC.len()] == DICM_MAGIC
    {
        &bytes[PREAMBLE_LEN..]
    } else {
        bytes
    };

    let object = dicom_object::from_reader(body).map_err(|e| NormalizeError::Decode(e.to_string()))?;
    normalize_object(&object, encoding)
}

/// Normalize a DICOM file on disk
pub fn normalize_dicom_file(
    path: &Path,
    encoding: ImageEncoding,
) -> Result<NormalizedImage, NormalizeError> {
    let object = OpenFileOptions::new()
        .read_preamble(ReadPreamble::Auto)
        .open_file(path)
        .map_err(|e| NormalizeError::Decode(e.to_string()))?;
    normalize_object(&object, encoding)
}

fn normalize_object(
    object: &DefaultDicomObject,
    encoding: ImageEncoding,
) -> Result<NormalizedImage, NormalizeError> {
    let grid = pixel_grid(object)?;
    let pixels = rescale_to_u8(&grid);
    let image = to_dynamic_image(&pixels)?;
    let bytes = encode_image(&image, encoding).map_err(|e| NormalizeError::Encode(e.to_string()))?;

    debug!(
        "Normalized DICOM frame: {}x{}, {} bytes as {}",
        image.width(),
        image.height(),
        bytes.len(),
        encoding.mime_type()
    );

    Ok(NormalizedImage {
        width: image.width(),
        height: image.height(),
        encoding,
        bytes,
    })
}

/// Decode the first frame into a (rows, columns, samples) grid
fn pixel_grid(object: &DefaultDicomObject) -> Result<Array3<f64>, NormalizeError> {
    let decoded = object
        .decode_pixel_data()
        .map_err(|e| NormalizeError::PixelData(e.to_string()))?;

    let rows = decoded.rows() as usize;
    let columns = decoded.columns() as usize;
    let samples = decoded.samples_per_pixel() as usize;
    if decoded.number_of_frames() > 1 {
        debug!(
            "Multi-frame object ({} frames), using the first",
            decoded.number_of_frames()
        );
    }

    if samples != 1 && samples != 3 {
        return Err(NormalizeError::PixelData(format!(
            "unsupported samples per pixel: {}",
            samples
        )));
    }

    let values: Vec<f64> = decoded
        .to_vec_frame(0)
        .map_err(|e| NormalizeError::PixelData(e.to_string()))?;

    Array3::from_shape_vec((rows, columns, samples), values)
        .map_err(|e| NormalizeError::PixelData(format!("pixel grid shape mismatch: {}", e)))
}

/// Linearly rescale a grid into [0, 255].
///
/// `out = round((v - min) / (max - min) * 255)`. A flat grid (or one with no
/// finite range) maps to [`DEGENERATE_GRAY`] everywhere.
pub fn rescale_to_u8(grid: &Array3<f64>) -> Array3<u8> {
    let (min, max) = grid
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return Array3::from_elem(grid.raw_dim(), DEGENERATE_GRAY);
    }

    grid.mapv(|v| (((v - min) / range) * 255.0).round().clamp(0.0, 255.0) as u8)
}

fn to_dynamic_image(pixels: &Array3<u8>) -> Result<DynamicImage, NormalizeError> {
    let (rows, columns, samples) = pixels.dim();
    let raw: Vec<u8> = pixels.iter().copied().collect();
    let (width, height) = (columns as u32, rows as u32);

    let image = match samples {
        1 => GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
        _ => None,
    };

    image.ok_or_else(|| {
        NormalizeError::PixelData(format!(
            "cannot build {}x{} image with {} samples per pixel",
            width, height, samples
        ))
    })
}
