// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::response::AnalyzeResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::api::upload::read_file_field;

/// POST /analyze - Run detection on an uploaded image
///
/// Raster images are sent as-is; DICOM uploads are normalized first. The
/// response carries the raw detector JSON.
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("analyze", request_id = %request_id);

    analyze(&state, &mut multipart)
        .instrument(span)
        .await
        .map(Json)
        .map_err(|e| state.error_response(e, &request_id))
}

async fn analyze(state: &AppState, multipart: &mut Multipart) -> Result<AnalyzeResponse, ApiError> {
    let upload = read_file_field(multipart).await?;
    let analysis = state.pipeline.analyze(&upload).await?;

    Ok(AnalyzeResponse {
        diagnostic_report: analysis.findings.raw,
    })
}
