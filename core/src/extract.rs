//! URL resolution and query decoding.
//!
//! # Design
//! An absolute `url` is used as-is. A relative one is joined onto
//! `http://{host}`, where `host` comes from the descriptor's headers. A
//! missing host is reported as `MalformedUrl` rather than guessed, since
//! there is no sensible default origin. The query string is decoded with
//! `url`'s form-urlencoded parser, so `+` becomes a space and `%XX`
//! escapes are resolved.

use tracing::{debug, trace};
use url::Url;

use crate::error::{ExtractError, MalformedReason};
use crate::http::RequestDescriptor;
use crate::types::{QueryMap, ResponseEnvelope};

/// Resolve the descriptor's URL, decode its query and wrap it in the fixed
/// envelope.
pub fn extract(request: &RequestDescriptor) -> Result<ResponseEnvelope, ExtractError> {
    let resolved = resolve(request).map_err(|reason| ExtractError::MalformedUrl {
        url: request.url.clone(),
        reason,
    })?;

    let mut query = QueryMap::new();
    for (key, value) in resolved.query_pairs() {
        query.insert(key.into_owned(), value.into_owned());
    }

    debug!(url = %resolved, params = query.len(), "extracted query");
    Ok(ResponseEnvelope::new(query))
}

/// Same as [`extract`], with the descriptor and the envelope as JSON text.
pub fn extract_json(descriptor: &str) -> Result<String, ExtractError> {
    let request: RequestDescriptor = serde_json::from_str(descriptor)
        .map_err(|e| ExtractError::Deserialization(e.to_string()))?;
    let envelope = extract(&request)?;
    serde_json::to_string(&envelope).map_err(|e| ExtractError::Serialization(e.to_string()))
}

fn resolve(request: &RequestDescriptor) -> Result<Url, MalformedReason> {
    match Url::parse(&request.url) {
        Ok(url) => {
            trace!(url = %url, "absolute url, host header not consulted");
            Ok(url)
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let host = request
                .host()
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .ok_or(MalformedReason::MissingHost)?;
            let base = Url::parse(&format!("http://{host}")).map_err(|source| {
                MalformedReason::InvalidBase {
                    host: host.to_string(),
                    source,
                }
            })?;
            base.join(&request.url).map_err(MalformedReason::Unresolvable)
        }
        Err(e) => Err(MalformedReason::Unresolvable(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MESSAGE;

    fn request(url: &str) -> RequestDescriptor {
        RequestDescriptor::new(url).with_header("host", "localhost:3000")
    }

    fn pairs(envelope: &ResponseEnvelope) -> Vec<(&str, &str)> {
        envelope
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn no_query_yields_empty_map() {
        let envelope = extract(&request("/hello")).unwrap();
        assert!(envelope.query.is_empty());
        assert_eq!(envelope.message, MESSAGE);
    }

    #[test]
    fn bare_question_mark_yields_empty_map() {
        let envelope = extract(&request("/?")).unwrap();
        assert!(envelope.query.is_empty());
    }

    #[test]
    fn params_keep_url_order() {
        let envelope = extract(&request("/?b=2&a=1")).unwrap();
        assert_eq!(pairs(&envelope), vec![("b", "2"), ("a", "1")]);
    }

    #[test]
    fn two_params() {
        let envelope = extract(&request("/?a=1&b=2")).unwrap();
        assert_eq!(pairs(&envelope), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn repeated_key_last_value_wins() {
        let envelope = extract(&request("/?a=1&b=x&a=2")).unwrap();
        assert_eq!(envelope.query["a"], "2");
        assert_eq!(pairs(&envelope), vec![("a", "2"), ("b", "x")]);
    }

    #[test]
    fn percent_escapes_decode() {
        let envelope = extract(&request("/?name=a%20b")).unwrap();
        assert_eq!(envelope.query["name"], "a b");
    }

    #[test]
    fn plus_decodes_to_space() {
        let envelope = extract(&request("/search?q=rust+lang")).unwrap();
        assert_eq!(envelope.query["q"], "rust lang");
    }

    #[test]
    fn bare_key_maps_to_empty_value() {
        let envelope = extract(&request("/?flag&x=1")).unwrap();
        assert_eq!(pairs(&envelope), vec![("flag", ""), ("x", "1")]);
    }

    #[test]
    fn fragment_is_not_part_of_query() {
        let envelope = extract(&request("/?a=1#b=2")).unwrap();
        assert_eq!(pairs(&envelope), vec![("a", "1")]);
    }

    #[test]
    fn message_is_constant() {
        for url in ["/", "/?a=1", "http://other.test/x?y=z"] {
            assert_eq!(extract(&request(url)).unwrap().message, MESSAGE);
        }
    }

    #[test]
    fn absolute_url_needs_no_host() {
        let envelope = extract(&RequestDescriptor::new("https://example.com/p?k=v")).unwrap();
        assert_eq!(pairs(&envelope), vec![("k", "v")]);
    }

    #[test]
    fn host_header_is_case_insensitive() {
        let req = RequestDescriptor::new("/?a=1").with_header("Host", "example.com");
        assert_eq!(extract(&req).unwrap().query["a"], "1");
    }

    #[test]
    fn empty_host_and_relative_url_is_malformed() {
        let req = RequestDescriptor::new("").with_header("host", "");
        let err = extract(&req).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedUrl {
                reason: MalformedReason::MissingHost,
                ..
            }
        ));
    }

    #[test]
    fn missing_host_header_is_malformed() {
        let err = extract(&RequestDescriptor::new("/?a=1")).unwrap_err();
        assert!(err.is_malformed_url());
    }

    #[test]
    fn invalid_host_is_malformed() {
        let req = RequestDescriptor::new("/").with_header("host", "bad host");
        let err = extract(&req).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedUrl {
                reason: MalformedReason::InvalidBase { .. },
                ..
            }
        ));
    }

    #[test]
    fn absolute_url_with_empty_host_is_malformed() {
        let err = extract(&request("http://")).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedUrl {
                reason: MalformedReason::Unresolvable(_),
                ..
            }
        ));
    }

    #[test]
    fn extract_json_round_trip() {
        let out = extract_json(r#"{"url":"/?a=1","headers":[["host","localhost"]]}"#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["message"], MESSAGE);
        assert_eq!(value["query"]["a"], "1");
    }

    #[test]
    fn extract_json_bad_input() {
        let err = extract_json("not json").unwrap_err();
        assert!(matches!(err, ExtractError::Deserialization(_)));
    }
}
