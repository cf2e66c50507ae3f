// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DICOM conversion endpoint
//!
//! Provides POST /convert for turning a DICOM upload into a browser-ready image.

pub mod handler;
pub mod response;

pub use handler::convert_handler;
pub use response::ConvertResponse;
