// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadAnalyzeResponse {
    pub success: bool,
    /// Normalized image as a data URI
    pub image: String,
    /// Raw detector JSON
    pub predictions: Value,
    pub diagnostic_report: String,
    pub filename: String,
}
