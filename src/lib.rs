// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod detection;
pub mod pipeline;
pub mod report;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState};
pub use config::{ConfigError, ServiceConfig};
pub use detection::{Detector, Finding, FindingSet, Region, RoboflowClient};
pub use pipeline::{AnalysisPipeline, InputKind};
pub use report::{DiagnosticReport, GeminiClient, ReportComposer, ReportSource, TextGenerator};
pub use vision::{ImageEncoding, NormalizedImage};
