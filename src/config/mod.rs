// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide configuration, built once at startup and never mutated

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::detection::DEFAULT_FALLBACK_WIDTH;
use crate::vision::ImageEncoding;

pub const DEFAULT_ROBOFLOW_URL: &str = "https://detect.roboflow.com/adr/6";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://dental-xray-app-liart.vercel.app";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Missing(&'static str),

    #[error("{field} out of range: {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },

    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub url: String,
    pub api_key: String,
    /// Minimum confidence, percent (0-100)
    pub confidence: u8,
    /// Maximum box overlap, percent (0-100)
    pub overlap: u8,
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
    pub allowed_origin: String,
    pub max_upload_bytes: usize,
    /// Include upstream error text in 5xx bodies
    pub expose_error_details: bool,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub detector: DetectorSettings,
    pub generator: GeneratorSettings,
    pub server: ServerSettings,
    pub upstream_timeout: Duration,
    pub image_encoding: ImageEncoding,
    pub fallback_width: f64,
    /// Directory for per-request temp files; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detector.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("ROBOFLOW_API_KEY"));
        }
        if self.generator.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("GEMINI_API_KEY"));
        }
        if self.detector.confidence > 100 {
            return Err(ConfigError::OutOfRange {
                field: "DETECTION_CONFIDENCE",
                message: format!("{} is not a percentage", self.detector.confidence),
            });
        }
        if self.detector.overlap > 100 {
            return Err(ConfigError::OutOfRange {
                field: "DETECTION_OVERLAP",
                message: format!("{} is not a percentage", self.detector.overlap),
            });
        }
        if !(self.fallback_width.is_finite() && self.fallback_width > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "FALLBACK_IMAGE_WIDTH",
                message: format!("{} must be a positive width", self.fallback_width),
            });
        }
        if self.upstream_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "UPSTREAM_TIMEOUT_SECS",
                message: "timeout must be at least one second".to_string(),
            });
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::OutOfRange {
                field: "MAX_UPLOAD_BYTES",
                message: "upload limit must be positive".to_string(),
            });
        }
        if axum::http::HeaderValue::from_str(&self.server.allowed_origin).is_err() {
            return Err(ConfigError::Invalid {
                field: "ALLOWED_ORIGIN",
                message: format!("'{}' is not a valid origin", self.server.allowed_origin),
            });
        }
        if let Err(e) = self.server.listen_addr.parse::<std::net::SocketAddr>() {
            return Err(ConfigError::Invalid {
                field: "LISTEN_ADDR",
                message: e.to_string(),
            });
        }
        Ok(())
    }

    /// Configuration with placeholder keys and local defaults
    pub fn new_for_test() -> Self {
        Self {
            detector: DetectorSettings {
                url: "http://127.0.0.1:9/adr/6".to_string(),
                api_key: "test-roboflow-key".to_string(),
                confidence: 30,
                overlap: 50,
            },
            generator: GeneratorSettings {
                base_url: "http://127.0.0.1:9".to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                api_key: "test-gemini-key".to_string(),
            },
            server: ServerSettings {
                listen_addr: "127.0.0.1:0".to_string(),
                allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                expose_error_details: true,
            },
            upstream_timeout: Duration::from_secs(5),
            image_encoding: ImageEncoding::Jpeg,
            fallback_width: DEFAULT_FALLBACK_WIDTH,
            scratch_dir: None,
        }
    }
}
