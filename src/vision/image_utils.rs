// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Raster helpers: format sniffing, encoding and data-URI rendering

use std::io::Cursor;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Custom error types for raster handling
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Output encoding for normalized images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    #[default]
    Jpeg,
    Png,
}

impl ImageEncoding {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "image/jpeg",
            ImageEncoding::Png => "image/png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ImageEncoding::Jpeg => ImageFormat::Jpeg,
            ImageEncoding::Png => ImageFormat::Png,
        }
    }
}

impl FromStr for ImageEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageEncoding::Jpeg),
            "png" => Ok(ImageEncoding::Png),
            other => Err(format!("unsupported image encoding '{}', expected jpeg or png", other)),
        }
    }
}

/// Sniff a raster upload, accepting only the formats the detector takes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    match image::guess_format(bytes) {
        Ok(
            format @ (ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::WebP
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::Tiff),
        ) => Ok(format),
        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// MIME type for a sniffed raster format
pub fn format_mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Encode an image in the requested output format.
///
/// The image is converted to RGB first so grayscale radiographs and colour
/// sources go through the same encoder path.
pub fn encode_image(image: &DynamicImage, encoding: ImageEncoding) -> Result<Vec<u8>, ImageError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, encoding.image_format())
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Render bytes as a `data:<mime>;base64,` URI
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Strip a `data:...;base64,` prefix if one is present
pub fn strip_data_uri_prefix(payload: &str) -> &str {
    if payload.starts_with("data:") {
        if let Some(idx) = payload.find(";base64,") {
            return &payload[idx + ";base64,".len()..];
        }
    }
    payload
}
