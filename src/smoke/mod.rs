//! Smoke checks against a deployed relay.
//!
//! Each check is one request with an expected status. Checks run in order
//! and a failed check never stops the run.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// A check that could not be parsed from `METHOD:PATH:STATUS`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckParseError {
    #[error("expected METHOD:PATH:STATUS, got `{0}`")]
    Format(String),
    #[error("invalid method `{0}`")]
    Method(String),
    #[error("path `{0}` must start with `/`")]
    Path(String),
    #[error("invalid status `{0}`")]
    Status(String),
}

/// One expected request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeCheck {
    pub method: Method,
    pub path: String,
    pub expected: StatusCode,
}

impl FromStr for SmokeCheck {
    type Err = CheckParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (method, rest) = s
            .split_once(':')
            .ok_or_else(|| CheckParseError::Format(s.to_string()))?;
        let (path, status) = rest
            .rsplit_once(':')
            .ok_or_else(|| CheckParseError::Format(s.to_string()))?;

        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| CheckParseError::Method(method.to_string()))?;
        if !path.starts_with('/') {
            return Err(CheckParseError::Path(path.to_string()));
        }
        let expected = status
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| CheckParseError::Status(status.to_string()))?;

        Ok(Self {
            method,
            path: path.to_string(),
            expected,
        })
    }
}

impl fmt::Display for SmokeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// The checks run when none are given.
pub fn default_checks() -> Vec<SmokeCheck> {
    [
        "GET:/health:200",
        "GET:/api/queries:200",
        "GET:/api/dashboard/stats:200",
        "GET:/api/packages:200",
        "GET:/api/users:200",
    ]
    .iter()
    .filter_map(|c| c.parse().ok())
    .collect()
}

/// Rough shape of a response body, for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyShape {
    Array(usize),
    /// First keys of a JSON object, at most five.
    Object(Vec<String>),
    /// Any other JSON value, rendered.
    Scalar(String),
    /// Not JSON; the first 100 characters.
    Text(String),
}

impl BodyShape {
    pub fn of(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Array(items)) => BodyShape::Array(items.len()),
            Ok(Value::Object(map)) => BodyShape::Object(map.keys().take(5).cloned().collect()),
            Ok(other) => BodyShape::Scalar(other.to_string()),
            Err(_) => BodyShape::Text(prefix(&String::from_utf8_lossy(body), 100)),
        }
    }
}

impl fmt::Display for BodyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyShape::Array(n) => write!(f, "Array with {} items", n),
            BodyShape::Object(keys) => write!(f, "Object with keys: [{}]", keys.join(", ")),
            BodyShape::Scalar(v) => write!(f, "{}", v),
            BodyShape::Text(t) => write!(f, "{}...", t),
        }
    }
}

fn prefix(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// What happened for one check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub check: SmokeCheck,
    pub url: String,
    pub status: Option<StatusCode>,
    pub passed: bool,
    /// Shape on success, body excerpt or error otherwise.
    pub detail: String,
}

/// Totals across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub run: usize,
    pub passed: usize,
}

impl Summary {
    pub fn from_reports(reports: &[CheckReport]) -> Self {
        Self {
            run: reports.len(),
            passed: reports.iter().filter(|r| r.passed).count(),
        }
    }

    /// Percentage of passed checks; 0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.run == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.run as f64
        }
    }

    pub fn all_passed(&self) -> bool {
        self.run > 0 && self.passed == self.run
    }
}

/// Runs checks against one base URL.
pub struct SmokeRunner {
    client: Client,
    base_url: String,
    headers: HeaderMap,
    body: Option<Value>,
}

impl SmokeRunner {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        let client = Client::builder().timeout(timeout).no_proxy().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
            body,
        })
    }

    /// Run a single check. Network errors become failed reports.
    pub async fn run(&self, check: &SmokeCheck) -> CheckReport {
        let url = format!("{}{}", self.base_url, check.path);
        let mut request = self
            .client
            .request(check.method.clone(), &url)
            .headers(self.headers.clone());
        if let Some(body) = &self.body {
            if matches!(check.method, Method::POST | Method::PUT | Method::PATCH) {
                request = request.json(body);
            }
        }

        let (status, detail, passed) = match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.bytes().await {
                    Ok(body) if status == check.expected => {
                        (Some(status), BodyShape::of(&body).to_string(), true)
                    }
                    Ok(body) => (
                        Some(status),
                        prefix(&String::from_utf8_lossy(&body), 200),
                        false,
                    ),
                    Err(e) => (Some(status), format!("Error reading body: {}", e), false),
                }
            }
            Err(e) => (None, format!("Network error: {}", e), false),
        };

        CheckReport {
            check: check.clone(),
            url,
            status,
            passed,
            detail,
        }
    }

    /// Run every check in order.
    pub async fn run_all(&self, checks: &[SmokeCheck]) -> Vec<CheckReport> {
        let mut reports = Vec::with_capacity(checks.len());
        for check in checks {
            reports.push(self.run(check).await);
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let check: SmokeCheck = "get:/api/items?x=1:200".parse().unwrap();
        assert_eq!(check.method, Method::GET);
        assert_eq!(check.path, "/api/items?x=1");
        assert_eq!(check.expected, StatusCode::OK);
    }

    #[test]
    fn test_parse_path_with_colons() {
        let check: SmokeCheck = "POST:/api/time/12:30:201".parse().unwrap();
        assert_eq!(check.path, "/api/time/12:30");
        assert_eq!(check.expected, StatusCode::CREATED);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "GET/api".parse::<SmokeCheck>(),
            Err(CheckParseError::Format("GET/api".into()))
        );
        assert_eq!(
            "GET:api:200".parse::<SmokeCheck>(),
            Err(CheckParseError::Path("api".into()))
        );
        assert_eq!(
            "GET:/api:abc".parse::<SmokeCheck>(),
            Err(CheckParseError::Status("abc".into()))
        );
        assert_eq!(
            "GET:/api:42".parse::<SmokeCheck>(),
            Err(CheckParseError::Status("42".into()))
        );
    }

    #[test]
    fn test_default_checks_parse() {
        let checks = default_checks();
        assert_eq!(checks.len(), 5);
        assert_eq!(checks[0].path, "/health");
    }

    #[test]
    fn test_body_shapes() {
        assert_eq!(BodyShape::of(b"[1,2,3]"), BodyShape::Array(3));
        assert_eq!(BodyShape::of(b"true"), BodyShape::Scalar("true".into()));
        assert_eq!(BodyShape::of(b"<html>"), BodyShape::Text("<html>".into()));

        let shape = BodyShape::of(br#"{"a":1,"b":2,"c":3,"d":4,"e":5,"f":6}"#);
        match &shape {
            BodyShape::Object(keys) => assert_eq!(keys.len(), 5),
            other => panic!("expected object, got {:?}", other),
        }
        assert_eq!(BodyShape::Array(23).to_string(), "Array with 23 items");
    }

    #[test]
    fn test_text_shape_is_truncated() {
        let long = "x".repeat(500);
        match BodyShape::of(long.as_bytes()) {
            BodyShape::Text(t) => assert_eq!(t.len(), 100),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_summary() {
        let summary = Summary { run: 4, passed: 3 };
        assert_eq!(summary.success_rate(), 75.0);
        assert!(!summary.all_passed());
        assert!(!Summary::default().all_passed());
        assert_eq!(Summary::default().success_rate(), 0.0);
    }
}
