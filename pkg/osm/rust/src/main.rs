// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use osm_amenities::cli::Args;
use osm_amenities::config::{self, Settings};
use osm_amenities::{SRID_WGS84, Store, server};
use tokio::net::TcpListener;
use tokio::signal::unix::{SignalKind, signal};

async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to setup signal handlers: {e}");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("Received SIGINT, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = config::config_path(args.config.as_deref());
    let file_config = config::load_config(&config_path);
    // Logging is not up yet, so resolve from whatever parsed and report later.
    let settings = Settings::resolve(file_config.as_ref().unwrap_or(&None), &args)?;

    osm_log::init(settings.log_level, settings.log_file.as_deref())
        .context("Failed to initialize logging")?;
    info!("Log level set to: {}", settings.log_level);
    let file_config = file_config?;
    if file_config.is_none() {
        warn!(
            "Config file not found at {}. Using environment variables and defaults.",
            config_path.display()
        );
    }

    let store = Store::open(&settings.database_path).with_context(|| {
        format!(
            "Failed to open amenity store at {}",
            settings.database_path.display()
        )
    })?;
    info!(
        "Serving {} amenities (SRID {}) from {}",
        store.count()?,
        SRID_WGS84,
        settings.database_path.display()
    );

    let listener = TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen_addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    server::serve(listener, Arc::new(store), shutdown_signal()).await?;
    info!("osm-amenities stopped");
    Ok(())
}
