// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection-only endpoint (POST /analyze)

pub mod handler;
pub mod response;

pub use handler::analyze_handler;
pub use response::AnalyzeResponse;
