//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use api_relay::config::RelayConfig;
use api_relay::http::HttpServer;
use api_relay::lifecycle::Shutdown;

/// Echo of what the mock upstream received.
pub async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let mut seen = serde_json::Map::new();
    for name in headers.keys() {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|v| Value::String(v.to_str().unwrap_or_default().to_string()))
            .collect();
        seen.insert(name.as_str().to_string(), Value::Array(values));
    }

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": seen,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn queries() -> Json<Value> {
    let items: Vec<Value> = (1..=23)
        .map(|i| json!({ "id": i, "customer": format!("Customer {}", i) }))
        .collect();
    Json(Value::Array(items))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "too late"
}

async fn teapot() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::HeaderName::from_static("x-upstream-marker"), "brewed"),
        ],
        "short and stout",
    )
        .into_response()
}

async fn untyped() -> Response {
    Response::new(Body::from(r#"{"raw":true}"#))
}

async fn crash() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "database unavailable" })),
    )
        .into_response()
}

/// Routes of the mock upstream. Anything unlisted is echoed.
pub fn upstream_router() -> Router {
    Router::new()
        .route("/api/queries", get(queries))
        .route("/api/slow", get(slow))
        .route("/api/teapot", get(teapot))
        .route("/api/untyped", get(untyped))
        .route("/api/crash", get(crash))
        .fallback(echo)
}

/// Start the mock upstream on an ephemeral port.
pub async fn start_mock_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream_router()).await;
    });
    addr
}

/// An address with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A running relay and the handle that stops it.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl RunningRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a relay forwarding to `upstream` with the given whole-call deadline.
pub async fn start_relay(upstream: SocketAddr, upstream_secs: u64) -> RunningRelay {
    let mut config = RelayConfig::default();
    config.upstream.base_url = format!("http://{}", upstream);
    config.timeouts.upstream_secs = upstream_secs;
    config.timeouts.connect_secs = 2;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningRelay { addr, shutdown }
}

/// Client that bypasses any system proxy and never pools.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Send one request over a bare socket, so the request target reaches the
/// relay exactly as written. Returns the status code and the JSON body.
pub async fn raw_request(addr: SocketAddr, method: &str, target: &str) -> (u16, Value) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        method, target, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw).into_owned();
    let (head, body) = text.split_once("\r\n\r\n").expect("no header terminator");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("no status code");
    (status, serde_json::from_str(body).expect("body is not JSON"))
}
