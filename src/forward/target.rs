//! Upstream URL construction.

use crate::config::UpstreamConfig;

/// Where forwarded requests land: base URL plus the API prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    base: String,
    api_prefix: String,
}

impl UpstreamTarget {
    /// Trailing slashes on both parts are trimmed so joins never double up.
    pub fn new(base: impl Into<String>, api_prefix: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        let api_prefix = api_prefix.into().trim_end_matches('/').to_string();
        Self { base, api_prefix }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(config.base_url.as_str(), config.api_prefix.as_str())
    }

    /// Build `base + prefix + "/" + path [+ "?" + query]`.
    ///
    /// `path` and `query` are used verbatim.
    pub fn url_for(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}{}/{}", self.base, self.api_prefix, path);
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}
