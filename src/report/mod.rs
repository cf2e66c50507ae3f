// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnostic report composition
//!
//! Reports are written by a text-generation service when one is configured,
//! and by a fixed template otherwise or whenever that service fails.

pub mod gemini;
pub mod prompt;
pub mod template;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::detection::FindingSet;

pub use gemini::GeminiClient;
pub use prompt::{build_prompt, findings_summary};
pub use template::{basic_report, NO_PATHOLOGY_REPORT};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Text generation service unreachable: {0}")]
    Transport(String),

    #[error("Text generation service returned {status_code}: {body}")]
    Upstream { status_code: u16, body: String },

    #[error("Text generation returned no text")]
    EmptyResponse,

    #[error("Unexpected text generation response: {0}")]
    InvalidResponse(String),
}

/// A service that turns a prompt into prose
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    Ai,
    Template,
}

/// Finished report text; never modified after composition
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    text: String,
    source: ReportSource,
}

impl DiagnosticReport {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> ReportSource {
        self.source
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

pub struct ReportComposer {
    generator: Option<Arc<dyn TextGenerator>>,
    fallback_width: f64,
}

impl ReportComposer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, fallback_width: f64) -> Self {
        Self {
            generator,
            fallback_width,
        }
    }

    /// Composer that only ever uses the template
    pub fn template_only(fallback_width: f64) -> Self {
        Self::new(None, fallback_width)
    }

    pub fn ai_available(&self) -> bool {
        self.generator.is_some()
    }

    /// Compose a report. Never fails: any AI error falls back to the template.
    pub async fn compose(&self, findings: &FindingSet) -> DiagnosticReport {
        if let Some(generator) = &self.generator {
            match self.compose_with_ai(generator.as_ref(), findings).await {
                Ok(report) => {
                    info!("AI report composed ({} chars)", report.text.len());
                    return report;
                }
                Err(e) => warn!("AI report generation failed, using template: {}", e),
            }
        }

        self.compose_from_template(findings)
    }

    async fn compose_with_ai(
        &self,
        generator: &dyn TextGenerator,
        findings: &FindingSet,
    ) -> Result<DiagnosticReport, GenerationError> {
        let prompt = build_prompt(&findings_summary(findings, self.fallback_width));
        let text = generator.generate(&prompt).await?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(DiagnosticReport {
            text,
            source: ReportSource::Ai,
        })
    }

    pub fn compose_from_template(&self, findings: &FindingSet) -> DiagnosticReport {
        DiagnosticReport {
            text: basic_report(findings, self.fallback_width),
            source: ReportSource::Template,
        }
    }
}
