// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image handling for uploaded radiographs
//!
//! This module provides:
//! - DICOM decoding and 8-bit normalization
//! - Raster format sniffing, encoding and data-URI helpers
//!
//! All of it is CPU-bound and synchronous; callers on the async runtime run it
//! through `spawn_blocking`.

pub mod dicom;
pub mod image_utils;

pub use dicom::{
    normalize_dicom_bytes, normalize_dicom_file, rescale_to_u8, NormalizeError, NormalizedImage,
    DEGENERATE_GRAY,
};
pub use image_utils::{
    detect_format, encode_image, format_mime_type, strip_data_uri_prefix, to_data_uri,
    ImageEncoding, ImageError,
};
