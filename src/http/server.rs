//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay and health handlers
//! - Wire up middleware (CORS, tracing, request ID, body limit)
//! - Bind server to listener and drain on shutdown
//! - Hand `/api/*` requests to the forwarder and render the outcome

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::forward::{ForwardOutcome, Forwarder, InboundRequest};
use crate::health;
use crate::http::request::{
    api_path_suffix, propagate_request_id_layer, request_id, set_request_id_layer,
};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::security::{permissive_cors, request_body_limit, route_plain_options};

/// Methods accepted on `/api/*`. Anything else is 405.
pub const FORWARDED_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::OPTIONS);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        let forwarder = Forwarder::from_config(&config);
        Self::with_forwarder(config, forwarder)
    }

    /// Create a server around an already built forwarder.
    pub fn with_forwarder(config: RelayConfig, forwarder: Forwarder) -> Self {
        let state = AppState {
            forwarder: Arc::new(forwarder),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config: Arc::new(config),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let plain = Router::new()
            .route("/health", get(health::liveness))
            .route("/api/", on(FORWARDED_METHODS, relay_handler))
            .route("/api/{*path}", on(FORWARDED_METHODS, relay_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(request_body_limit(config.security.max_body_bytes))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer());

        plain
            .clone()
            .layer(permissive_cors())
            .layer(middleware::from_fn_with_state(plain, route_plain_options))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `stop` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        stop: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(stop))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward one `/api/*` request and relay whatever comes back.
async fn relay_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let request_id = request_id(&headers).to_owned();

    let request = InboundRequest {
        method: method.clone(),
        path: api_path_suffix(&uri).to_owned(),
        query: uri.query().map(str::to_owned),
        headers,
        body,
    };

    let outcome = state.forwarder.forward(request).await;
    metrics::record_forward(&method, &outcome, started);

    match &outcome {
        ForwardOutcome::Success(response) => {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %uri.path(),
                status = response.status.as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                "Relayed"
            );
        }
        ForwardOutcome::Failure(e) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %uri.path(),
                kind = e.kind(),
                error = %e,
                "Upstream request failed"
            );
        }
    }

    outcome.into_response()
}
