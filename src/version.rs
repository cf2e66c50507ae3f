// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Dental X-ray Analysis API

/// Semantic version number, reported by `GET /`
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Service name used in logs and the root endpoint
pub const SERVICE_NAME: &str = "Dental X-ray Analysis API";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} {}", SERVICE_NAME, VERSION_NUMBER)
}
