// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::analyze::analyze_handler;
use super::convert::convert_handler;
use super::errors::{ApiError, ApiErrorResponse};
use super::handlers::{health_handler, root_handler};
use super::upload_analyze::upload_and_analyze_handler;
use crate::config::ServiceConfig;
use crate::detection::{Detector, RoboflowClient};
use crate::pipeline::AnalysisPipeline;
use crate::report::{GeminiClient, ReportComposer};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub pipeline: Arc<AnalysisPipeline>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        detector: Arc<dyn Detector>,
        composer: ReportComposer,
    ) -> Self {
        let pipeline = AnalysisPipeline::new(detector, Arc::new(composer), &config);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build the production collaborators from configuration
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let detector = RoboflowClient::new(&config.detector, config.upstream_timeout)
            .context("failed to build detection client")?;
        let generator = GeminiClient::new(&config.generator, config.upstream_timeout)
            .context("failed to build text generation client")?;
        let composer = ReportComposer::new(Some(Arc::new(generator)), config.fallback_width);

        Ok(Self::new(config, Arc::new(detector), composer))
    }

    pub fn error_response(&self, error: ApiError, request_id: &str) -> ApiErrorResponse {
        ApiErrorResponse::new(error, request_id, self.config.server.expose_error_details)
    }
}

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    match allowed_origin.parse::<HeaderValue>() {
        // only a matching Origin is echoed back
        Ok(origin) => layer.allow_origin(AllowOrigin::list([origin])),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}", allowed_origin, e);
            layer
        }
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);
    let cors = cors_layer(&state.config.server.allowed_origin);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/convert", post(convert_handler))
        .route("/analyze", post(analyze_handler))
        .route("/upload-and-analyze", post(upload_and_analyze_handler))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = state
        .config
        .server
        .listen_addr
        .parse()
        .context("invalid listen address")?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
