//! Request size limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size before a body is buffered for forwarding
//!
//! # Design Decisions
//! - Declared `Content-Length` over the limit is rejected without reading
//! - Streaming bodies are cut off once they exceed the limit
//! - Rejections are 413 Payload Too Large and never reach the upstream

use tower_http::limit::RequestBodyLimitLayer;

/// Limit applied to every inbound body.
pub fn request_body_limit(max_body_bytes: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_body_bytes)
}
