//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! /api/{path}?{query} (inbound)
//!     → target.rs (upstream base + prefix + path + query)
//!     → security::headers (drop host, content-length)
//!     → forwarder.rs (one call under the deadline)
//!     → ForwardOutcome::Success | ForwardOutcome::Failure
//!     → http::response renders it
//! ```
//!
//! # Design Decisions
//! - Bodies are buffered both ways; the upstream sees a fixed-length body
//! - No retries: one inbound request is one upstream request
//! - Redirects are relayed to the caller, not followed
//! - Path and query are sent byte-for-byte; nothing is normalised or re-encoded

pub mod forwarder;
pub mod target;

pub use forwarder::{ForwardOutcome, Forwarder, InboundRequest, UpstreamResponse};
pub use target::UpstreamTarget;
