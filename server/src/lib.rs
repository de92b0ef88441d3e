use axum::{
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use query_core::{ExtractError, RequestDescriptor, ResponseEnvelope};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{event, Level};

pub mod config;

pub use config::ServerConfig;

/// Every method and path lands on the same handler.
pub fn app() -> Router {
    Router::new().fallback(query)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn query(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    event!(Level::INFO, "{method} {uri}");
    let request = descriptor(&uri, &headers);
    let envelope = query_core::extract(&request)?;
    Ok(Json(envelope))
}

/// Build the plain-data descriptor the core works on. Header values that are
/// not visible ASCII are dropped.
pub fn descriptor(uri: &Uri, headers: &HeaderMap) -> RequestDescriptor {
    RequestDescriptor {
        url: uri.to_string(),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
    }
}

/// JSON body of every non-200 response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Extraction failure as seen by the HTTP client.
#[derive(Debug)]
pub struct ApiError(ExtractError);

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_malformed_url() {
            event!(Level::WARN, "rejected request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            event!(Level::ERROR, "extraction failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn descriptor_keeps_target_and_headers() {
        let uri: Uri = "/path?a=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("localhost:3000"));
        let req = descriptor(&uri, &headers);
        assert_eq!(req.url, "/path?a=1");
        assert_eq!(req.host(), Some("localhost:3000"));
    }

    #[test]
    fn descriptor_keeps_absolute_form() {
        let uri: Uri = "http://example.com/p?k=v".parse().unwrap();
        let req = descriptor(&uri, &HeaderMap::new());
        assert_eq!(req.url, "http://example.com/p?k=v");
    }

    #[test]
    fn descriptor_drops_opaque_header_values() {
        let uri: Uri = "/".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-bin", HeaderValue::from_bytes(b"\xff").unwrap());
        headers.insert("host", HeaderValue::from_static("h"));
        let req = descriptor(&uri, &headers);
        assert_eq!(req.headers, vec![("host".to_string(), "h".to_string())]);
    }

    #[test]
    fn error_body_serializes() {
        let body = ErrorBody {
            error: "boom".to_string(),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"boom"}"#);
    }
}
