// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tinyhouse Server - climate-aware tiny house generator backend.
//!
//! Looks up the Köppen climate zone of a map location, runs the Grasshopper
//! generator once per distinct parameter set, and serves the material and
//! weather tables of each run.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/zones` - Climate zone labels
//! - `POST /api/v1/zone` - Climate zone at a point
//! - `POST /api/v1/model` - Generate or reuse a model
//! - `GET /api/v1/report/:report_key` - Report tables of a model run

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tinyhouse_core::{ResultCache, ZoneCollection};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

use config::Config;
use services::{Analysis, ReportStore};
use types::AnalysisOutput;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub zones: Arc<ZoneCollection>,
    pub analysis: Arc<dyn Analysis>,
    pub results: ResultCache<AnalysisOutput>,
    pub reports: Arc<ReportStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config, zones: ZoneCollection, analysis: Arc<dyn Analysis>) -> Self {
        let reports = Arc::new(ReportStore::new(&config.report_dir).await);
        Self {
            zones: Arc::new(zones),
            analysis,
            results: ResultCache::new(),
            reports,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the API router with its middleware stack.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        .route("/api/v1/health", get(routes::health::check))
        // Climate zones
        .route("/api/v1/zones", get(routes::zones::list))
        .route("/api/v1/zone", post(routes::zones::lookup))
        // Generator
        .route("/api/v1/model", post(routes::model::run_model))
        .route("/api/v1/report/:report_key", get(routes::report::get_report))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state)
}
