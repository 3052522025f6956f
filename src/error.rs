//! Error types shared across the relay.

use std::error::Error as StdError;
use std::time::Duration;

use axum::http::uri::InvalidUri;
use hyper_util::client::legacy::Error as ClientError;
use thiserror::Error;

use crate::config::ConfigError;

/// Why a single forwarding attempt failed.
///
/// Every variant is reported to the caller the same way (502 plus an error
/// envelope); the variants exist for logs and metrics.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: InvalidUri,
    },

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("upstream connection failed: {0}")]
    Connect(String),

    #[error("upstream request failed: {0}")]
    Request(String),

    #[error("upstream response body could not be read: {0}")]
    Body(String),
}

impl ForwardError {
    /// Short label used in metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::InvalidUrl { .. } => "invalid_url",
            ForwardError::Timeout(_) => "timeout",
            ForwardError::Connect(_) => "connect",
            ForwardError::Request(_) => "request",
            ForwardError::Body(_) => "body",
        }
    }
}

impl From<ClientError> for ForwardError {
    fn from(err: ClientError) -> Self {
        let message = error_chain(&err);
        if err.is_connect() {
            ForwardError::Connect(message)
        } else {
            ForwardError::Request(message)
        }
    }
}

impl From<axum::Error> for ForwardError {
    fn from(err: axum::Error) -> Self {
        ForwardError::Body(error_chain(&err))
    }
}

/// Render an error and all of its sources as one line.
///
/// The pooled client keeps the interesting part (refused, dns, reset) in the
/// source chain.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Fatal errors raised while bringing the relay up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
