//! Private JSON client for backend communication
//!
//! This crate provides a minimal blocking HTTP client for talking JSON to the
//! home backend. It owns the error taxonomy every layer above builds on:
//! connection failures become [`HttpError::Network`], non-2xx statuses become
//! [`HttpError::Backend`] (with the backend's `detail` message when it sends
//! one), and malformed bodies become [`HttpError::Parse`].

mod error;

pub use error::HttpError;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body shape used by the backend (`{"detail": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// A minimal JSON client bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpClient {
    /// Create a client with default timeouts
    ///
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    /// A trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect_timeout)
                .timeout_read(read_timeout)
                .build(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for a path relative to the base
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON body
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        self.get_json_at(&self.url_for(path))
    }

    /// GET an absolute URL and decode the JSON body
    pub fn get_json_at<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        tracing::debug!("GET {}", url);
        let response = self.agent.get(url).call().map_err(Self::map_error)?;
        Self::decode(response)
    }

    /// POST `body` as JSON to `path` and decode the JSON response
    pub fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url_for(path);
        tracing::debug!("POST {}", url);
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(Self::map_error)?;
        Self::decode(response)
    }

    fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, HttpError> {
        let text = response
            .into_string()
            .map_err(|e| HttpError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| HttpError::Parse(e.to_string()))
    }

    fn map_error(error: ureq::Error) -> HttpError {
        match error {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                HttpError::Backend {
                    status,
                    detail: extract_detail(&body),
                }
            }
            ureq::Error::Transport(transport) => HttpError::Network(transport.to_string()),
        }
    }
}

/// Pull the `detail` message out of an error body, falling back to the raw text
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.detail,
        Err(_) if body.trim().is_empty() => "no detail provided".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpClient::new("http://localhost:8000/api/");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url_for("/devices"), "http://localhost:8000/api/devices");
        assert_eq!(client.url_for("moods"), "http://localhost:8000/api/moods");
    }

    #[test]
    fn test_extract_detail_from_json() {
        let detail = extract_detail(r#"{"detail": "Device fridge not found"}"#);
        assert_eq!(detail, "Device fridge not found");
    }

    #[test]
    fn test_extract_detail_plain_text() {
        assert_eq!(extract_detail("Internal Server Error\n"), "Internal Server Error");
    }

    #[test]
    fn test_extract_detail_empty() {
        assert_eq!(extract_detail("  "), "no detail provided");
    }

    #[test]
    fn test_backend_error_status() {
        let err = HttpError::Backend {
            status: 404,
            detail: "missing".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(format!("{}", err), "Backend error (HTTP 404): missing");
        assert_eq!(HttpError::Network("x".to_string()).status(), None);
    }
}
