// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tinyhouse_core::ZoneCollection;
use tinyhouse_server::{config::Config, create_router, services::GrasshopperClient, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,tinyhouse_server=debug".into()),
        )
        .pretty()
        .init();

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        zones_path = %config.zones_path,
        script_path = %config.script_path,
        analysis_url = %config.analysis_url,
        report_dir = %config.report_dir,
        "Starting Tinyhouse Server"
    );

    let zones = ZoneCollection::from_path(&config.zones_path)
        .with_context(|| format!("loading climate zones from {}", config.zones_path))?;
    tracing::info!(zones = zones.len(), "Climate zones loaded");

    let analysis = Arc::new(GrasshopperClient::new(
        &config.analysis_url,
        &config.script_path,
        Duration::from_secs(config.analysis_timeout_secs),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, zones, analysis).await;
    let app = create_router(state);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
