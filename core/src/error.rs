//! Error types for the query extractor.
//!
//! # Design
//! `extract` can only fail one way: the URL cannot be turned into an
//! absolute URL. That is `MalformedUrl`, with a `MalformedReason` saying
//! which step gave up. The JSON variants belong to `extract_json` and never
//! come out of `extract` itself.

use thiserror::Error;

/// Errors returned by the extractor entry points.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The request URL could not be resolved to an absolute URL.
    #[error("malformed url {url:?}: {reason}")]
    MalformedUrl { url: String, reason: MalformedReason },

    /// The JSON request descriptor could not be decoded.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The envelope could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ExtractError {
    pub fn is_malformed_url(&self) -> bool {
        matches!(self, ExtractError::MalformedUrl { .. })
    }
}

/// Which resolution step rejected the URL.
#[derive(Debug, Error)]
pub enum MalformedReason {
    /// Relative URL and no usable `host` header to resolve it against.
    #[error("relative url and no host header")]
    MissingHost,

    /// `http://{host}` is not a valid base URL.
    #[error("invalid base url http://{host}: {source}")]
    InvalidBase {
        host: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Unresolvable(#[source] url::ParseError),
}
