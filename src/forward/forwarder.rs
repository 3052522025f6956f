//! The request-forwarding operation.

use std::time::Duration;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::RelayConfig;
use crate::error::ForwardError;
use crate::forward::target::UpstreamTarget;
use crate::resilience::with_deadline;
use crate::security::forwardable_request_headers;

/// One inbound `/api/*` call, reduced to what gets forwarded.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Path after the inbound `/api/` prefix, still percent-encoded.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Result of forwarding one request.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// The upstream answered; its status may be anything, including 5xx.
    Success(UpstreamResponse),
    /// No usable upstream answer; rendered as a 502 error envelope.
    Failure(ForwardError),
}

impl ForwardOutcome {
    /// Status label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ForwardOutcome::Success(_) => "upstream",
            ForwardOutcome::Failure(e) => e.kind(),
        }
    }
}

/// Forwards requests to a single upstream over a shared connection pool.
///
/// The outbound URI is built from the raw inbound path and query and is
/// never normalised: dot segments and query bytes reach the upstream as sent.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    target: UpstreamTarget,
    deadline: Duration,
}

impl Forwarder {
    /// Build a forwarder with its own pooled client.
    pub fn from_config(config: &RelayConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self::new(
            client,
            UpstreamTarget::from_config(&config.upstream),
            Duration::from_secs(config.timeouts.upstream_secs),
        )
    }

    pub fn new(
        client: Client<HttpConnector, Body>,
        target: UpstreamTarget,
        deadline: Duration,
    ) -> Self {
        Self {
            client,
            target,
            deadline,
        }
    }

    /// Forward `request` once. Never panics and never retries.
    pub async fn forward(&self, request: InboundRequest) -> ForwardOutcome {
        match self.try_forward(request).await {
            Ok(response) => ForwardOutcome::Success(response),
            Err(e) => ForwardOutcome::Failure(e),
        }
    }

    async fn try_forward(&self, request: InboundRequest) -> Result<UpstreamResponse, ForwardError> {
        let raw = self.target.url_for(&request.path, request.query.as_deref());
        let uri = Uri::try_from(raw.as_str())
            .map_err(|source| ForwardError::InvalidUrl { url: raw, source })?;

        tracing::debug!(
            method = %request.method,
            uri = %uri,
            "Forwarding upstream"
        );

        let mut outbound = Request::new(Body::from(request.body));
        *outbound.method_mut() = request.method;
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = forwardable_request_headers(&request.headers);

        let call = async move {
            let response = self.client.request(outbound).await?;
            let (parts, body) = response.into_parts();
            let body = to_bytes(Body::new(body), usize::MAX).await?;

            Ok::<_, ForwardError>(UpstreamResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        };

        with_deadline(self.deadline, call).await
    }
}
