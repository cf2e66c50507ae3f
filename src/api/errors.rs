// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::detection::DetectionError;
use crate::vision::{ImageError, NormalizeError};

const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed due to an upstream service error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Request rejected before any processing (bad extension, missing file)
    Validation(String),
    /// Upload is not a readable DICOM stream
    Decode(String),
    /// DICOM parsed but pixel data is absent or unusable
    PixelData(String),
    Transport(String),
    Upstream { status_code: u16, body: String },
    Internal(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>, expose_details: bool) -> ErrorResponse {
        let (error_type, message) = match self {
            ApiError::Validation(msg) => ("validation_error", msg.clone()),
            ApiError::Decode(msg) => ("decode_error", msg.clone()),
            ApiError::PixelData(msg) => ("pixel_data_error", msg.clone()),
            ApiError::Transport(msg) => ("transport_error", msg.clone()),
            ApiError::Upstream { status_code, body } => (
                "upstream_error",
                format!("Detection service returned {}: {}", status_code, body),
            ),
            ApiError::Internal(msg) => ("internal_error", msg.clone()),
        };

        let message = if self.is_server_error() && !expose_details {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::Decode(_) | ApiError::PixelData(_) => 400,
            ApiError::Transport(_) | ApiError::Upstream { .. } | ApiError::Internal(_) => 500,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Decode(msg) => write!(f, "Failed to convert DICOM file: {}", msg),
            ApiError::PixelData(msg) => write!(f, "Unusable pixel data: {}", msg),
            ApiError::Transport(msg) => write!(f, "Upstream call failed: {}", msg),
            ApiError::Upstream { status_code, body } => {
                write!(f, "Upstream returned {}: {}", status_code, body)
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<NormalizeError> for ApiError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Decode(msg) => ApiError::Decode(msg),
            NormalizeError::PixelData(msg) => ApiError::PixelData(msg),
            NormalizeError::Encode(msg) => ApiError::Internal(format!("image encoding: {}", msg)),
        }
    }
}

impl From<DetectionError> for ApiError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::Transport(msg) => ApiError::Transport(msg),
            DetectionError::Upstream { status_code, body } => {
                ApiError::Upstream { status_code, body }
            }
            DetectionError::InvalidResponse(msg) => {
                ApiError::Internal(format!("unexpected detection response: {}", msg))
            }
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::UnsupportedFormat | ImageError::EmptyData => {
                ApiError::Validation(err.to_string())
            }
            ImageError::EncodeFailed(msg) => ApiError::Internal(msg),
        }
    }
}

/// An `ApiError` bound to the request it failed, ready to render
#[derive(Debug)]
pub struct ApiErrorResponse {
    error: ApiError,
    request_id: String,
    expose_details: bool,
}

impl ApiErrorResponse {
    pub fn new(error: ApiError, request_id: impl Into<String>, expose_details: bool) -> Self {
        Self {
            error,
            request_id: request_id.into(),
            expose_details,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        if self.error.is_server_error() {
            error!("Request {} failed: {}", self.request_id, self.error);
        }

        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self
            .error
            .to_response(Some(self.request_id), self.expose_details);

        (status, Json(body)).into_response()
    }
}
