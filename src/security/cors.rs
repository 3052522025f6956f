//! Cross-origin policy for the public surface.
//!
//! Every origin, method and header is accepted and credentials are allowed.
//! A wildcard `*` cannot be combined with credentials, so the request's own
//! origin, method and headers are mirrored back instead.
//!
//! `CorsLayer` answers every `OPTIONS` request itself. Only real preflights
//! (`Origin` plus `Access-Control-Request-Method`) may stop there; any other
//! `OPTIONS` call is routed around the layer by [`route_plain_options`].

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
    Router,
};
use tower::ServiceExt;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build the permissive CORS layer.
///
/// Preflight requests are answered here and never reach the upstream.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Whether a request is a CORS preflight rather than a plain `OPTIONS` call.
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Middleware placed outside [`permissive_cors`].
///
/// Plain `OPTIONS` calls are sent to `plain`, the same router without the
/// CORS layer, and get the headers an actual CORS request would carry.
pub async fn route_plain_options(
    State(plain): State<Router>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::OPTIONS || is_preflight(request.method(), request.headers()) {
        return next.run(request).await;
    }

    let origin = request.headers().get(header::ORIGIN).cloned();
    let mut response = plain
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    let headers = response.headers_mut();
    if let Some(origin) = origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(
        header::VARY,
        HeaderValue::from_static(
            "origin, access-control-request-method, access-control-request-headers",
        ),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_needs_origin_and_requested_method() {
        let mut headers = HeaderMap::new();
        assert!(!is_preflight(&Method::OPTIONS, &headers));

        headers.insert(header::ORIGIN, HeaderValue::from_static("https://app.example"));
        assert!(!is_preflight(&Method::OPTIONS, &headers));

        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("PUT"),
        );
        assert!(is_preflight(&Method::OPTIONS, &headers));
        assert!(!is_preflight(&Method::GET, &headers));
    }
}
