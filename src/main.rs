// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use dental_xray_api::{
    api::{start_server, AppState},
    cli::Cli,
    version,
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env only fill gaps; the real environment wins
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting {}", version::get_version_string());

    let config = Cli::parse()
        .into_config()
        .context("invalid configuration")?;

    info!(
        "Detector: {} (confidence {}%, overlap {}%)",
        config.detector.url, config.detector.confidence, config.detector.overlap
    );
    info!(
        "Generator: {} | output encoding: {} | CORS origin: {}",
        config.generator.model,
        config.image_encoding.mime_type(),
        config.server.allowed_origin
    );

    let state = AppState::from_config(config)?;
    start_server(Arc::new(state)).await
}
