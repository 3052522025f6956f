//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight answered, plain OPTIONS routed on, CORS headers on every response)
//!     → limits.rs (check request body size)
//!     → headers.rs (drop connection-specific headers)
//!     → Forward upstream
//! ```

pub mod cors;
pub mod headers;
pub mod limits;

pub use cors::{permissive_cors, route_plain_options};
pub use headers::{forwardable_request_headers, relayable_response_headers};
pub use limits::request_body_limit;
