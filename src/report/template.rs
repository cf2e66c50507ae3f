// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic report templates

use crate::detection::FindingSet;

pub const REPORT_TITLE: &str = "DENTAL RADIOGRAPHIC ANALYSIS REPORT";

/// Report emitted when the detector finds nothing
pub const NO_PATHOLOGY_REPORT: &str = "DENTAL RADIOGRAPHIC ANALYSIS REPORT

CLINICAL FINDINGS:
No pathologies detected in the submitted dental X-ray image. The automated analysis did not identify any cavities or periapical lesions.

RADIOGRAPHIC INTERPRETATION:
The dental structures appear within normal limits on this automated screening.

RECOMMENDATIONS:
- Continue routine dental care and regular check-ups
- Clinical correlation with physical examination recommended
- This automated analysis should be reviewed by a qualified dental professional

CLINICAL NOTES:
This report is generated through automated image analysis and should be used as a screening tool only. Professional clinical interpretation by a qualified dentist is recommended for definitive diagnosis.";

const INTERPRETATION: &str =
    "The automated analysis has identified potential pathological findings that require clinical attention.";

const RECOMMENDATIONS: &[&str] = &[
    "- Immediate clinical evaluation recommended",
    "- Further diagnostic imaging may be warranted",
    "- Professional dental consultation advised",
];

const NOTES: &str = "This automated analysis should be confirmed by clinical examination. Results are for screening purposes only.";

/// Build the template report for a finding set. Pure.
pub fn basic_report(findings: &FindingSet, fallback_width: f64) -> String {
    if findings.is_empty() {
        return NO_PATHOLOGY_REPORT.to_string();
    }

    let mut lines = vec![format!("{}\n", REPORT_TITLE), "CLINICAL FINDINGS:".to_string()];

    for (finding, region) in findings.with_regions(fallback_width) {
        lines.push(format!(
            "- {} identified in {} ({:.1}% confidence)",
            title_case(&finding.class_name),
            region,
            finding.confidence_percent()
        ));
    }

    lines.push("\nRADIOGRAPHIC INTERPRETATION:".to_string());
    lines.push(INTERPRETATION.to_string());

    lines.push("\nRECOMMENDATIONS:".to_string());
    lines.extend(RECOMMENDATIONS.iter().map(|l| l.to_string()));

    lines.push("\nCLINICAL NOTES:".to_string());
    lines.push(NOTES.to_string());

    lines.join("\n")
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
