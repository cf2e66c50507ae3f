// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Typed view of detector output

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::region::{classify, Region};

fn default_class() -> String {
    "Unknown".to_string()
}

// --- Roboflow wire format ---

#[derive(Debug, Clone, Deserialize)]
pub struct RoboflowResponse {
    #[serde(default)]
    pub predictions: Vec<RoboflowPrediction>,
    #[serde(default)]
    pub image: Option<RoboflowImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoboflowPrediction {
    #[serde(rename = "class", default = "default_class")]
    pub class_name: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoboflowImage {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

// --- Domain types ---

/// One detected finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub class_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub box_width: Option<f64>,
    pub box_height: Option<f64>,
}

impl Finding {
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Findings for one image, in detector order
#[derive(Debug, Clone, PartialEq)]
pub struct FindingSet {
    pub findings: Vec<Finding>,
    pub image_width: Option<f64>,
    pub image_height: Option<f64>,
    /// Detector response exactly as received
    pub raw: Value,
}

impl FindingSet {
    /// Convert a raw detector body into a typed set, keeping the original JSON
    pub fn from_raw(raw: Value) -> Result<Self, serde_json::Error> {
        let parsed: RoboflowResponse = serde_json::from_value(raw.clone())?;
        let (image_width, image_height) = parsed
            .image
            .map(|i| (i.width, i.height))
            .unwrap_or((None, None));

        let findings = parsed
            .predictions
            .into_iter()
            .map(|p| Finding {
                class_name: p.class_name,
                confidence: p.confidence,
                center_x: p.x,
                center_y: p.y,
                box_width: p.width,
                box_height: p.height,
            })
            .collect();

        Ok(Self {
            findings,
            image_width,
            image_height,
            raw,
        })
    }

    pub fn empty() -> Self {
        Self {
            findings: Vec::new(),
            image_width: None,
            image_height: None,
            raw: serde_json::json!({ "predictions": [] }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Findings paired with their horizontal region
    pub fn with_regions(&self, fallback_width: f64) -> impl Iterator<Item = (&Finding, Region)> {
        let width = self.image_width;
        self.findings
            .iter()
            .map(move |f| (f, classify(f.center_x, width, fallback_width)))
    }
}
