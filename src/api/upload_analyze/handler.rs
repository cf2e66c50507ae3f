// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Full analysis endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::response::UploadAnalyzeResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::api::upload::read_checked_file_field;
use crate::pipeline::{has_extension, UPLOAD_ANALYZE_EXTENSIONS};

pub const UNSUPPORTED_EXTENSION_MESSAGE: &str = "Only .dcm and .rvg files are supported";

/// POST /upload-and-analyze - Normalize, detect and report
///
/// # Request
/// - multipart field `file`: a `.dcm` or `.rvg` upload
///
/// # Response
/// - `success`: always true on 200
/// - `image`: normalized image as a data URI
/// - `predictions`: raw detector JSON
/// - `diagnostic_report`: AI report, or the template report when generation fails
/// - `filename`: the uploaded file name
///
/// # Errors
/// - 400 Bad Request: unsupported extension, unreadable DICOM or pixel data
/// - 500 Internal Server Error: detection or transport failure
pub async fn upload_and_analyze_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadAnalyzeResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("upload_and_analyze", request_id = %request_id);

    upload_and_analyze(&state, &mut multipart)
        .instrument(span)
        .await
        .map(Json)
        .map_err(|e| state.error_response(e, &request_id))
}

async fn upload_and_analyze(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<UploadAnalyzeResponse, ApiError> {
    // 1. Extension gate, before the file body is read
    let upload = read_checked_file_field(multipart, |filename| {
        if has_extension(filename, UPLOAD_ANALYZE_EXTENSIONS) {
            return Ok(());
        }
        warn!("Rejected upload {:?}: unsupported extension", filename);
        Err(ApiError::Validation(UNSUPPORTED_EXTENSION_MESSAGE.to_string()))
    })
    .await?;

    // 2. Normalize and detect
    let analysis = state.pipeline.analyze(&upload).await?;
    debug!("Prepared {:?} image for {}", analysis.image.kind, upload.display_name());

    // 3. Report (never fails)
    let report = state.pipeline.report(&analysis.findings).await;

    info!(
        "Analysis complete for {}: {} finding(s)",
        upload.display_name(),
        analysis.findings.len()
    );

    Ok(UploadAnalyzeResponse {
        success: true,
        image: analysis.image.data_uri,
        predictions: analysis.findings.raw,
        diagnostic_report: report.into_text(),
        filename: upload.display_name().to_string(),
    })
}
