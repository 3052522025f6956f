//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce the whole-call deadline)
//!     → On failure: reported once, never retried
//! ```

pub mod timeouts;

pub use timeouts::with_deadline;
