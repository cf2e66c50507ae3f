// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt construction for AI-written reports

use crate::detection::FindingSet;

pub const NO_FINDINGS_SUMMARY: &str = "No pathologies detected in the dental X-ray analysis.";

const PROMPT_PREAMBLE: &str = "You are an experienced dental radiologist reviewing a dental X-ray analysis. Based on the automated detection results below, generate a professional diagnostic report in clinical language.";

const PROMPT_INSTRUCTIONS: &str = "Please provide a structured diagnostic report with the following sections:

1. CLINICAL FINDINGS: Summarize what was detected
2. RADIOGRAPHIC INTERPRETATION: Clinical significance of findings
3. RECOMMENDATIONS: Suggested follow-up care or treatment considerations
4. CLINICAL NOTES: Any additional observations or disclaimers

Guidelines:
- Use professional medical terminology
- Be concise but thorough
- Include confidence levels appropriately
- Mention the automated nature of detection
- Add standard radiological disclaimers
- Keep the tone professional and clinical

Format the response clearly with section headers.";

/// One line per finding: class, region and confidence
pub fn findings_summary(findings: &FindingSet, fallback_width: f64) -> String {
    if findings.is_empty() {
        return NO_FINDINGS_SUMMARY.to_string();
    }

    findings
        .with_regions(fallback_width)
        .map(|(finding, region)| {
            format!(
                "- {} detected in {} with {:.1}% confidence",
                finding.class_name,
                region,
                finding.confidence_percent()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(summary: &str) -> String {
    format!(
        "{}\n\nDETECTION RESULTS:\n{}\n\n{}",
        PROMPT_PREAMBLE, summary, PROMPT_INSTRUCTIONS
    )
}
