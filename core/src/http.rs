//! Inbound request described as plain data.
//!
//! # Design
//! The host runtime owns the socket and the HTTP parser; it hands the core
//! only what resolution needs: the raw request target and the header list.
//! Headers stay an ordered `Vec` of pairs, as they arrive on the wire, and
//! lookups compare names ASCII case-insensitively.

use serde::{Deserialize, Serialize};

/// One inbound request as seen by the extractor.
///
/// `url` is either the request target as received (`/path?query`) or an
/// absolute URL. `headers` must carry a `host` entry for relative targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Append a header, keeping any earlier entry with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value whose name matches `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn host(&self) -> Option<&str> {
        self.header("host")
    }
}
