//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, CORS, tracing, body limit)
//!     → request.rs (request ID, /api suffix extraction)
//!     → forward (one upstream call)
//!     → response.rs (relay upstream response or 502 envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::ErrorEnvelope;
pub use server::{AppState, HttpServer};
