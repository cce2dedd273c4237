// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Climate zone GeoJSON (EPSG:4326).
    pub zones_path: String,
    /// Grasshopper definition sent to the compute server.
    pub script_path: String,
    /// Base URL of the Grasshopper compute server.
    pub analysis_url: String,
    /// Timeout for a single analysis run in seconds.
    pub analysis_timeout_secs: u64,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Directory for persisted report text.
    pub report_dir: String,
    /// Allowed CORS origins (comma-separated, or "*" for all in development).
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .unwrap_or(8080),
            zones_path: std::env::var("ZONES_PATH")
                .unwrap_or_else(|_| "files/raw-data.json".into()),
            script_path: std::env::var("SCRIPT_PATH")
                .unwrap_or_else(|_| "files/Tinyhouse Generator.gh".into()),
            analysis_url: std::env::var("ANALYSIS_URL")
                .unwrap_or_else(|_| "http://localhost:6500".into()),
            analysis_timeout_secs: std::env::var("ANALYSIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .unwrap_or(300),
            report_dir: std::env::var("REPORT_DIR").unwrap_or_else(|_| {
                // Docker images keep state under /app/cache
                if std::path::Path::new("/.dockerenv").exists() {
                    "/app/cache/reports".into()
                } else {
                    std::env::current_dir()
                        .ok()
                        .and_then(|dir| {
                            dir.join(".cache")
                                .join("reports")
                                .to_str()
                                .map(|s| s.to_string())
                        })
                        .unwrap_or_else(|| "./.cache/reports".into())
                }
            }),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| {
                    "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173".into()
                })
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Whether every origin is allowed.
    pub fn cors_permissive(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
