//! Response rendering.
//!
//! # Responsibilities
//! - Relay a buffered upstream response to the caller
//! - Render forwarding failures as a 502 error envelope
//!
//! # Design Decisions
//! - Upstream status and body bytes are relayed unchanged, 5xx included
//! - `content-type` falls back to `application/json` when upstream sent none
//! - The envelope is serialized with serde so any message stays valid JSON

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::forward::{ForwardOutcome, UpstreamResponse};
use crate::security::relayable_response_headers;

/// `{"error": "<message>"}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, Json(self)).into_response()
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let content_type = self
            .headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = relayable_response_headers(&self.headers);
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
        response
    }
}

impl IntoResponse for ForwardOutcome {
    fn into_response(self) -> Response {
        match self {
            ForwardOutcome::Success(upstream) => upstream.into_response(),
            ForwardOutcome::Failure(e) => ErrorEnvelope::new(e.to_string()).into_response(),
        }
    }
}
