// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Full analysis endpoint
//!
//! Provides POST /upload-and-analyze: normalization, detection and a
//! diagnostic report in one call.

pub mod handler;
pub mod response;

pub use handler::upload_and_analyze_handler;
pub use response::UploadAnalyzeResponse;
