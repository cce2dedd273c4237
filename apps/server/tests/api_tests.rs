// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests of the HTTP API against an in-process analysis.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tinyhouse_core::{ParameterRecord, ZoneCollection};
use tinyhouse_server::{
    config::Config,
    create_router,
    services::{Analysis, AnalysisError},
    types::{AnalysisOutput, DataItem, DataTree, ROOT_BRANCH},
    AppState,
};
use tower::ServiceExt;

const ZONES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "climate": "Cfb" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[8.0, 49.0], [9.0, 49.0], [9.0, 50.0], [8.0, 50.0], [8.0, 49.0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "climate": "Dfb" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[10.0, 47.0], [11.0, 47.0], [11.0, 48.0], [10.0, 48.0], [10.0, 47.0]]]
            }
        }
    ]
}"#;

enum Behavior {
    Report(Vec<&'static str>),
    Fail,
    NoGeometry,
}

struct FakeAnalysis {
    calls: AtomicUsize,
    behavior: Behavior,
}

impl FakeAnalysis {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            behavior,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn tree(name: &str, items: Vec<DataItem>) -> DataTree {
    DataTree {
        param_name: name.to_string(),
        inner_tree: [(ROOT_BRANCH.to_string(), items)].into_iter().collect(),
    }
}

impl Analysis for FakeAnalysis {
    fn run<'a>(
        &'a self,
        _record: &'a ParameterRecord,
    ) -> BoxFuture<'a, Result<AnalysisOutput, AnalysisError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Fail => Err(AnalysisError::Request("compute server offline".into())),
                Behavior::NoGeometry => Ok(AnalysisOutput { values: vec![] }),
                Behavior::Report(lines) => {
                    let geometry = DataItem {
                        kind: "Rhino.Geometry.Brep".into(),
                        data: r#"{"version":10000}"#.into(),
                    };
                    let report = lines
                        .iter()
                        .map(|line| DataItem {
                            kind: "System.String".into(),
                            data: serde_json::to_string(line).unwrap(),
                        })
                        .collect();
                    Ok(AnalysisOutput {
                        values: vec![
                            tree("RH_OUT:Geometry", vec![geometry]),
                            tree("RH_OUT:Report", report),
                        ],
                    })
                }
            }
        })
    }
}

struct TestApp {
    router: Router,
    analysis: Arc<FakeAnalysis>,
    _reports: tempfile::TempDir,
}

async fn test_app(behavior: Behavior) -> TestApp {
    let reports = tempfile::tempdir().unwrap();
    let config = Config {
        port: 0,
        zones_path: String::new(),
        script_path: String::new(),
        analysis_url: String::new(),
        analysis_timeout_secs: 5,
        request_timeout_secs: 30,
        report_dir: reports.path().to_str().unwrap().to_string(),
        cors_origins: vec!["*".to_string()],
    };
    let zones = ZoneCollection::from_geojson_str(ZONES).unwrap();
    let analysis = FakeAnalysis::new(behavior);

    let state = AppState::new(config, zones, analysis.clone()).await;
    TestApp {
        router: create_router(state),
        analysis,
        _reports: reports,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

fn report_lines() -> Behavior {
    Behavior::Report(vec![
        "Dach = Gründach weil Regenrückhalt",
        "Wand = Lehm",
        "Schneefall Januar = 12",
        "Niederschlag Januar = 40.5",
        "Niederschlag Februar = 30",
    ])
}

#[tokio::test]
async fn health_check() {
    let app = test_app(report_lines()).await;
    let (status, body) = get(&app.router, "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "tinyhouse-server");
}

#[tokio::test]
async fn lists_zone_labels() {
    let app = test_app(report_lines()).await;
    let (status, body) = get(&app.router, "/api/v1/zones").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zones"], json!(["Cfb", "Dfb"]));
}

#[tokio::test]
async fn zone_lookup_inside_a_zone() {
    let app = test_app(report_lines()).await;
    let (status, body) = post(
        &app.router,
        "/api/v1/zone",
        json!({ "lat": 49.8728, "lon": 8.6512 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zone"], "Cfb");
    assert_eq!(body["latitude"], 49.87);
    assert_eq!(body["longitude"], 8.651);
    assert_eq!(body["message"], "Klimazone am Punkt (49.87, 8.651): Cfb");
}

#[tokio::test]
async fn zone_lookup_outside_every_zone() {
    let app = test_app(report_lines()).await;
    let (status, body) = post(&app.router, "/api/v1/zone", json!({ "lat": -33.9, "lon": 151.2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["zone"].is_null());
    assert!(body["message"].as_str().unwrap().starts_with("Keine Klimazone"));
}

#[tokio::test]
async fn model_runs_once_per_parameter_set() {
    let app = test_app(report_lines()).await;
    let request = json!({
        "location": { "lat": 49.8728, "lon": 8.6512 },
        "geometry": { "room_height": 3.0, "azimuth": 45.0 }
    });

    let (status, first) = post(&app.router, "/api/v1/model", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["from_cache"], false);
    assert_eq!(first["climate_zone"], "Cfb");
    assert_eq!(first["geometry"]["version"], 10000);

    let (status, second) = post(&app.router, "/api/v1/model", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["from_cache"], true);
    assert_eq!(second["cache_key"], first["cache_key"]);
    assert_eq!(second["report_key"], first["report_key"]);

    assert_eq!(app.analysis.calls(), 1);
}

#[tokio::test]
async fn nearby_clicks_share_a_model() {
    let app = test_app(report_lines()).await;

    let (_, first) = post(
        &app.router,
        "/api/v1/model",
        json!({ "location": { "lat": 49.8728, "lon": 8.6512 } }),
    )
    .await;
    let (_, second) = post(
        &app.router,
        "/api/v1/model",
        json!({ "location": { "lat": 49.8741, "lon": 8.6509 } }),
    )
    .await;

    assert_eq!(first["cache_key"], second["cache_key"]);
    assert_eq!(app.analysis.calls(), 1);
}

#[tokio::test]
async fn model_rejects_out_of_range_geometry() {
    let app = test_app(report_lines()).await;
    let (status, body) = post(
        &app.router,
        "/api/v1/model",
        json!({ "geometry": { "room_height": 10.0, "azimuth": 0.0 } }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(app.analysis.calls(), 0);
}

#[tokio::test]
async fn failed_analysis_is_not_cached() {
    let app = test_app(Behavior::Fail).await;

    let (status, body) = post(&app.router, "/api/v1/model", json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "ANALYSIS_ERROR");

    let (status, _) = post(&app.router, "/api/v1/model", json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(app.analysis.calls(), 2);
}

#[tokio::test]
async fn output_without_geometry_is_not_cached() {
    let app = test_app(Behavior::NoGeometry).await;

    let (status, body) = post(&app.router, "/api/v1/model", json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "ANALYSIS_ERROR");

    post(&app.router, "/api/v1/model", json!({})).await;
    assert_eq!(app.analysis.calls(), 2);
}

#[tokio::test]
async fn report_tables_after_model_run() {
    let app = test_app(report_lines()).await;
    let (_, model) = post(&app.router, "/api/v1/model", json!({})).await;
    let report_key = model["report_key"].as_str().unwrap();

    let (status, body) = get(&app.router, &format!("/api/v1/report/{}", report_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report_key"], report_key);
    assert_eq!(body["warnings"], json!([]));

    let parameters = &body["parameters"];
    assert_eq!(parameters["column_headers"], json!(["Wert", "Begründung"]));
    assert_eq!(parameters["row_headers"], json!(["Dach", "Wand"]));
    assert_eq!(
        parameters["rows"],
        json!([["Gründach", "Regenrückhalt"], ["Lehm", ""]])
    );

    let weather = &body["weather"];
    assert_eq!(weather["column_headers"], json!(["Schneefall [mm]", "Niederschlag [mm]"]));
    assert_eq!(weather["row_headers"], json!(["Januar", "Februar"]));
    assert_eq!(weather["rows"], json!([[12.0, 40.5], [0.0, 30.0]]));
}

#[tokio::test]
async fn malformed_reading_is_a_warning_not_a_lost_report() {
    let app = test_app(Behavior::Report(vec![
        "Dach = Blech weil leicht",
        "Schneefall Januar = viel",
        "Niederschlag Januar = 40",
    ]))
    .await;
    let (_, model) = post(&app.router, "/api/v1/model", json!({})).await;
    let report_key = model["report_key"].as_str().unwrap();

    let (status, body) = get(&app.router, &format!("/api/v1/report/{}", report_key)).await;
    assert_eq!(status, StatusCode::OK);

    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("viel"));

    assert_eq!(body["parameters"]["rows"], json!([["Blech", "leicht"]]));
    assert_eq!(body["weather"]["row_headers"], json!(["Januar"]));
    assert_eq!(body["weather"]["rows"], json!([[0.0, 40.0]]));
}

#[tokio::test]
async fn unknown_report_key_is_empty() {
    let app = test_app(report_lines()).await;
    let (status, body) = get(&app.router, "/api/v1/report/0000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parameters"]["row_headers"], json!([]));
    assert_eq!(body["weather"]["row_headers"], json!([]));
    assert_eq!(body["warnings"], json!([]));
}
