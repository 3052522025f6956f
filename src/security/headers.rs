//! Header filtering between the inbound and outbound legs.
//!
//! # Responsibilities
//! - Strip headers that describe the inbound connection before forwarding
//! - Strip framing headers from upstream responses that are re-encoded locally
//!
//! # Design Decisions
//! - Matching is case-insensitive (`HeaderName` is normalized to lowercase)
//! - Multi-valued headers keep every value, in order

use axum::http::{header, HeaderMap, HeaderName};

/// Request headers recomputed by the outbound transport.
pub const HOP_BY_HOP_REQUEST_HEADERS: [HeaderName; 2] = [header::HOST, header::CONTENT_LENGTH];

/// Response headers describing upstream framing of a body we re-frame.
pub const RESPONSE_FRAMING_HEADERS: [HeaderName; 3] = [
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Whether a request header must not be copied upstream.
pub fn is_hop_by_hop_request_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_REQUEST_HEADERS.contains(name)
}

/// Inbound headers minus `host` and `content-length`.
pub fn forwardable_request_headers(inbound: &HeaderMap) -> HeaderMap {
    filter(inbound, is_hop_by_hop_request_header)
}

/// Upstream headers minus framing headers.
pub fn relayable_response_headers(upstream: &HeaderMap) -> HeaderMap {
    filter(upstream, |name| RESPONSE_FRAMING_HEADERS.contains(name))
}

fn filter(headers: &HeaderMap, drop: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if !drop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_strips_host_and_content_length() {
        let mut inbound = HeaderMap::new();
        inbound.insert("host", HeaderValue::from_static("relay.local:8001"));
        inbound.insert("content-length", HeaderValue::from_static("17"));
        inbound.insert("content-type", HeaderValue::from_static("application/json"));
        inbound.insert("authorization", HeaderValue::from_static("Bearer abc"));

        let out = forwardable_request_headers(&inbound);

        assert_eq!(out.len(), 2);
        assert!(out.get("host").is_none());
        assert!(out.get("content-length").is_none());
        assert_eq!(out["content-type"], "application/json");
        assert_eq!(out["authorization"], "Bearer abc");
    }

    #[test]
    fn test_name_matching_ignores_case() {
        let name = HeaderName::from_bytes(b"HOST").unwrap();
        assert!(is_hop_by_hop_request_header(&name));
        let name = HeaderName::from_bytes(b"Content-LENGTH").unwrap();
        assert!(is_hop_by_hop_request_header(&name));
        let name = HeaderName::from_bytes(b"x-host").unwrap();
        assert!(!is_hop_by_hop_request_header(&name));
    }

    #[test]
    fn test_keeps_every_value_of_repeated_headers() {
        let mut inbound = HeaderMap::new();
        inbound.append("cookie", HeaderValue::from_static("a=1"));
        inbound.append("cookie", HeaderValue::from_static("b=2"));

        let out = forwardable_request_headers(&inbound);
        let cookies: Vec<_> = out
            .get_all("cookie")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_response_framing_is_dropped() {
        let mut upstream = HeaderMap::new();
        upstream.insert("content-length", HeaderValue::from_static("42"));
        upstream.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        upstream.insert("connection", HeaderValue::from_static("keep-alive"));
        upstream.insert("etag", HeaderValue::from_static("\"v1\""));
        upstream.append("set-cookie", HeaderValue::from_static("sid=1"));
        upstream.append("set-cookie", HeaderValue::from_static("theme=dark"));

        let out = relayable_response_headers(&upstream);

        assert_eq!(out.len(), 3);
        assert_eq!(out["etag"], "\"v1\"");
        assert_eq!(out.get_all("set-cookie").iter().count(), 2);
    }
}
