// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::http_server::AppState;
use crate::version::{SERVICE_NAME, VERSION_NUMBER};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub gemini_ai: String,
    pub roboflow_api: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let gemini_ai = if state.pipeline.composer().ai_available() {
        "available"
    } else {
        "not configured"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        gemini_ai: gemini_ai.to_string(),
        roboflow_api: "configured".to_string(),
    })
}

/// GET /
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME.to_string(),
        version: VERSION_NUMBER.to_string(),
    })
}
