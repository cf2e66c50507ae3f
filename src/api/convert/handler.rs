// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversion endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::response::ConvertResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::api::upload::read_file_field;

/// POST /convert - Normalize a DICOM upload into a displayable image
///
/// # Request
/// - multipart field `file`: DICOM bytes (with or without preamble)
///
/// # Response
/// - `imageBase64`: data URI in the configured output encoding
///
/// # Errors
/// - 400 Bad Request: missing file, unreadable DICOM or unusable pixel data
/// - 500 Internal Server Error: encoding failed
pub async fn convert_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("convert", request_id = %request_id);

    convert(&state, &mut multipart)
        .instrument(span)
        .await
        .map(Json)
        .map_err(|e| state.error_response(e, &request_id))
}

async fn convert(state: &AppState, multipart: &mut Multipart) -> Result<ConvertResponse, ApiError> {
    let upload = read_file_field(multipart).await?;
    let image = state.pipeline.convert(&upload).await?;

    info!(
        "Converted {} ({}x{})",
        upload.display_name(),
        image.width,
        image.height
    );

    Ok(ConvertResponse {
        image_base64: image.data_uri(),
    })
}
