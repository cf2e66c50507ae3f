// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Horizontal region heuristic for findings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width assumed when the detector does not report one
pub const DEFAULT_FALLBACK_WIDTH: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Left,
    Central,
    Right,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::Left => "left side",
            Region::Central => "central region",
            Region::Right => "right side",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket a horizontal center into thirds of the image width.
///
/// Points exactly on a third boundary are central. A missing, zero or
/// non-finite width falls back to `fallback_width`.
pub fn classify(center_x: f64, image_width: Option<f64>, fallback_width: f64) -> Region {
    let width = match image_width {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => fallback_width,
    };

    if center_x < width / 3.0 {
        Region::Left
    } else if center_x > 2.0 * width / 3.0 {
        Region::Right
    } else {
        Region::Central
    }
}
