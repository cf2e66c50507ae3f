// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection over X-ray images
//!
//! The detector itself is a remote service; this module owns the client, the
//! typed view of its output and the region heuristic applied to findings.

pub mod client;
pub mod models;
pub mod region;

use async_trait::async_trait;
use thiserror::Error;

pub use client::RoboflowClient;
pub use models::{Finding, FindingSet};
pub use region::{classify, Region, DEFAULT_FALLBACK_WIDTH};

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Detection service unreachable: {0}")]
    Transport(String),

    #[error("Detection service returned {status_code}: {body}")]
    Upstream { status_code: u16, body: String },

    #[error("Unexpected detection response: {0}")]
    InvalidResponse(String),
}

/// A service that finds pathologies in a base64-encoded image
#[async_trait]
pub trait Detector: Send + Sync {
    /// `image_base64` is the bare payload; a data-URI prefix is tolerated.
    async fn detect(&self, image_base64: &str) -> Result<FindingSet, DetectionError>;

    fn name(&self) -> &str;
}
