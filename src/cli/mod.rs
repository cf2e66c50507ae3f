// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    ConfigError, DetectorSettings, GeneratorSettings, ServerSettings, ServiceConfig,
    DEFAULT_ALLOWED_ORIGIN, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_LISTEN_ADDR,
    DEFAULT_ROBOFLOW_URL,
};
use crate::vision::ImageEncoding;

/// Dental X-ray Analysis API server
///
/// Every flag can also be set through the environment (or a `.env` file).
#[derive(Parser, Debug)]
#[command(name = "dental-xray-api")]
#[command(version)]
#[command(about = "HTTP service for DICOM normalization, detection and diagnostic reports", long_about = None)]
pub struct Cli {
    /// Roboflow API key
    #[arg(long, env = "ROBOFLOW_API_KEY", hide_env_values = true)]
    pub roboflow_api_key: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Detection model endpoint
    #[arg(long, env = "ROBOFLOW_URL", default_value = DEFAULT_ROBOFLOW_URL)]
    pub roboflow_url: String,

    /// Minimum detection confidence, percent
    #[arg(long, env = "DETECTION_CONFIDENCE", default_value_t = 30)]
    pub detection_confidence: u8,

    /// Maximum box overlap, percent
    #[arg(long, env = "DETECTION_OVERLAP", default_value_t = 50)]
    pub detection_overlap: u8,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Address to bind the HTTP server to
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// The single origin allowed by CORS
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = DEFAULT_ALLOWED_ORIGIN)]
    pub allowed_origin: String,

    /// Timeout for each call to Roboflow or Gemini, seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 60)]
    pub upstream_timeout_secs: u64,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = crate::config::DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Output encoding for normalized images (jpeg or png)
    #[arg(long, env = "IMAGE_ENCODING", default_value = "jpeg")]
    pub image_encoding: ImageEncoding,

    /// Image width assumed when the detector omits it
    #[arg(long, env = "FALLBACK_IMAGE_WIDTH", default_value_t = crate::detection::DEFAULT_FALLBACK_WIDTH)]
    pub fallback_image_width: f64,

    /// Directory for per-request temp files
    #[arg(long, env = "SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Include upstream error text in 5xx responses
    #[arg(long, env = "EXPOSE_ERROR_DETAILS", default_value_t = true, action = clap::ArgAction::Set)]
    pub expose_error_details: bool,
}

impl Cli {
    /// Build and validate the immutable service configuration
    pub fn into_config(self) -> Result<ServiceConfig, ConfigError> {
        let config = ServiceConfig {
            detector: DetectorSettings {
                url: self.roboflow_url,
                api_key: self.roboflow_api_key,
                confidence: self.detection_confidence,
                overlap: self.detection_overlap,
            },
            generator: GeneratorSettings {
                base_url: self.gemini_base_url,
                model: self.gemini_model,
                api_key: self.gemini_api_key,
            },
            server: ServerSettings {
                listen_addr: self.listen_addr,
                allowed_origin: self.allowed_origin,
                max_upload_bytes: self.max_upload_bytes,
                expose_error_details: self.expose_error_details,
            },
            upstream_timeout: Duration::from_secs(self.upstream_timeout_secs),
            image_encoding: self.image_encoding,
            fallback_width: self.fallback_image_width,
            scratch_dir: self.scratch_dir,
        };

        config.validate()?;
        Ok(config)
    }
}
