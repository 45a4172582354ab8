//! Liveness endpoint
//!
//! `GET /health` (alias `/healthz`) returns 200 while the process is serving,
//! with build info and the storage backend in use.

use serde::Serialize;

use super::response::{ok_json, HttpResponse};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_time: &'static str,
    /// `mongodb` or `memory`
    pub store: &'static str,
    pub mode: &'static str,
    /// Seconds since the server state was built
    pub uptime: u64,
    pub timestamp: String,
}

pub fn health_check(state: &AppState) -> HttpResponse {
    let body = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        git_commit: env!("GIT_COMMIT_SHORT"),
        build_time: env!("BUILD_TIMESTAMP"),
        store: state.store_kind.as_str(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    ok_json(&body)
}
