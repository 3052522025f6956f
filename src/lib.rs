//! API relay library.
//!
//! Forwards `/api/*` to a single upstream application server and reports
//! any forwarding failure as a 502 JSON error envelope.

pub mod config;
pub mod error;
pub mod forward;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod smoke;

pub use config::RelayConfig;
pub use error::{ForwardError, StartupError};
pub use forward::{ForwardOutcome, Forwarder};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
