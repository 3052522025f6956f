//! Liveness probing.
//!
//! `GET /health` answers from the relay itself and never touches the
//! upstream, so it reports that the process is serving, nothing more.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of a liveness response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Handler for `GET /health`.
pub async fn liveness() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}
