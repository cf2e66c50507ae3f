// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Roboflow hosted-inference client

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{DetectionError, Detector, FindingSet};
use crate::config::DetectorSettings;
use crate::vision::strip_data_uri_prefix;

/// Transport failures get one more try; anything else is final
const MAX_ATTEMPTS: usize = 2;

/// Client for the Roboflow detection endpoint
pub struct RoboflowClient {
    client: Client,
    endpoint: String,
    api_key: String,
    confidence: u8,
    overlap: u8,
}

impl RoboflowClient {
    /// Create a new detection client
    pub fn new(settings: &DetectorSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = settings.url.trim_end_matches('/').to_string();
        info!(
            "Detection client configured: endpoint={}, confidence={}, overlap={}, timeout={:?}",
            endpoint, settings.confidence, settings.overlap, timeout
        );

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            confidence: settings.confidence,
            overlap: settings.overlap,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, payload: &str) -> Result<FindingSet, DetectionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.clone()),
                ("confidence", self.confidence.to_string()),
                ("overlap", self.overlap.to_string()),
            ])
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(payload.to_string())
            .send()
            .await
            // the URL carries the API key
            .map_err(|e| DetectionError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectionError::Upstream {
                status_code: status.as_u16(),
                body,
            });
        }

        let raw: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                DetectionError::InvalidResponse(e.without_url().to_string())
            } else {
                DetectionError::Transport(e.without_url().to_string())
            }
        })?;

        FindingSet::from_raw(raw).map_err(|e| DetectionError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Detector for RoboflowClient {
    async fn detect(&self, image_base64: &str) -> Result<FindingSet, DetectionError> {
        let payload = strip_data_uri_prefix(image_base64);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.send_once(payload).await {
                Err(DetectionError::Transport(reason)) if attempt < MAX_ATTEMPTS => {
                    warn!("Detection attempt {} failed, retrying: {}", attempt, reason);
                }
                Ok(findings) => {
                    debug!(
                        "Detection returned {} findings on attempt {}",
                        findings.len(),
                        attempt
                    );
                    return Ok(findings);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "roboflow"
    }
}
