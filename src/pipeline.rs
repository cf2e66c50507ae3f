// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analysis pipeline shared by every upload endpoint
//!
//! upload -> (normalize, DICOM only) -> detect -> (compose report)

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info};

use crate::api::errors::ApiError;
use crate::api::upload::UploadedFile;
use crate::config::ServiceConfig;
use crate::detection::{Detector, FindingSet};
use crate::report::{DiagnosticReport, ReportComposer};
use crate::vision::{
    detect_format, format_mime_type, normalize_dicom_bytes, normalize_dicom_file, to_data_uri,
    ImageEncoding, NormalizedImage,
};

/// Extensions routed through DICOM normalization
pub const DICOM_EXTENSIONS: &[&str] = &["dcm", "rvg", "dicom"];

/// Extensions accepted by `/upload-and-analyze`
pub const UPLOAD_ANALYZE_EXTENSIONS: &[&str] = &["dcm", "rvg"];

const DICOM_CONTENT_TYPE: &str = "application/dicom";

/// Case-insensitive suffix check; a bare ".dcm" name counts as a `.dcm` file
pub fn has_extension(filename: Option<&str>, allowed: &[&str]) -> bool {
    let Some(name) = filename.map(str::to_ascii_lowercase) else {
        return false;
    };
    allowed.iter().any(|ext| name.ends_with(&format!(".{}", ext)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Dicom,
    Raster,
}

impl InputKind {
    pub fn of(upload: &UploadedFile) -> Self {
        let dicom_type = upload
            .content_type
            .as_deref()
            .map(|ct| ct.eq_ignore_ascii_case(DICOM_CONTENT_TYPE))
            .unwrap_or(false);

        if dicom_type || has_extension(upload.filename.as_deref(), DICOM_EXTENSIONS) {
            InputKind::Dicom
        } else {
            InputKind::Raster
        }
    }
}

/// Image as it is sent to the detector and echoed to the client
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub kind: InputKind,
    /// Bare base64 payload
    pub base64: String,
    pub data_uri: String,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub image: PreparedImage,
    pub findings: FindingSet,
}

pub struct AnalysisPipeline {
    detector: Arc<dyn Detector>,
    composer: Arc<ReportComposer>,
    encoding: ImageEncoding,
    scratch_dir: Option<PathBuf>,
}

impl AnalysisPipeline {
    pub fn new(
        detector: Arc<dyn Detector>,
        composer: Arc<ReportComposer>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            detector,
            composer,
            encoding: config.image_encoding,
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    pub fn composer(&self) -> &ReportComposer {
        &self.composer
    }

    /// Decode a DICOM upload in memory on the blocking pool
    pub async fn convert(&self, upload: &UploadedFile) -> Result<NormalizedImage, ApiError> {
        let bytes = upload.bytes.clone();
        let encoding = self.encoding;

        tokio::task::spawn_blocking(move || {
            if bytes.is_empty() {
                return Err(ApiError::Decode("uploaded file is empty".to_string()));
            }
            Ok(normalize_dicom_bytes(&bytes, encoding)?)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("decode task failed: {}", e)))?
    }

    /// Decode a DICOM upload on the blocking pool through a scoped temp file
    pub async fn normalize(&self, upload: &UploadedFile) -> Result<NormalizedImage, ApiError> {
        let bytes = upload.bytes.clone();
        let scratch_dir = self.scratch_dir.clone();
        let encoding = self.encoding;

        tokio::task::spawn_blocking(move || {
            normalize_via_temp_file(&bytes, scratch_dir.as_deref(), encoding)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("decode task failed: {}", e)))?
    }

    /// Turn an upload into the payload the detector expects
    pub async fn prepare(&self, upload: &UploadedFile) -> Result<PreparedImage, ApiError> {
        match InputKind::of(upload) {
            InputKind::Dicom => {
                let image = self.normalize(upload).await?;
                info!(
                    "Normalized {} to {}x{} {}",
                    upload.display_name(),
                    image.width,
                    image.height,
                    image.encoding.mime_type()
                );
                Ok(PreparedImage {
                    kind: InputKind::Dicom,
                    base64: image.base64(),
                    data_uri: image.data_uri(),
                })
            }
            InputKind::Raster => {
                let format = detect_format(&upload.bytes)?;
                debug!("Raster upload sniffed as {:?}", format);
                Ok(PreparedImage {
                    kind: InputKind::Raster,
                    base64: STANDARD.encode(&upload.bytes),
                    data_uri: to_data_uri(format_mime_type(format), &upload.bytes),
                })
            }
        }
    }

    /// Prepare the upload and run detection on it
    pub async fn analyze(&self, upload: &UploadedFile) -> Result<Analysis, ApiError> {
        let image = self.prepare(upload).await?;
        let findings = self.detector.detect(&image.base64).await?;
        info!(
            "{} returned {} finding(s) for {}",
            self.detector.name(),
            findings.len(),
            upload.display_name()
        );

        Ok(Analysis { image, findings })
    }

    pub async fn report(&self, findings: &FindingSet) -> DiagnosticReport {
        let report = self.composer.compose(findings).await;
        info!("Diagnostic report composed from {:?}", report.source());
        report
    }
}

fn normalize_via_temp_file(
    bytes: &[u8],
    scratch_dir: Option<&Path>,
    encoding: ImageEncoding,
) -> Result<NormalizedImage, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::Decode("uploaded file is empty".to_string()));
    }

    let mut builder = tempfile::Builder::new();
    builder.prefix("xray-").suffix(".dcm");
    let temp = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    let mut temp = temp.map_err(|e| ApiError::Internal(format!("temp file: {}", e)))?;

    temp.write_all(bytes)
        .and_then(|_| temp.flush())
        .map_err(|e| ApiError::Internal(format!("temp file write: {}", e)))?;
    debug!("Wrote {} bytes to {}", bytes.len(), temp.path().display());

    let image = normalize_dicom_file(temp.path(), encoding)?;
    Ok(image)
}
