//! HTTP client abstraction for testability
//!
//! The WildLens backend overloads HTTP status codes with protocol meaning
//! (202 and 404 both mean "keep waiting" on the artifact endpoint, 409 means
//! "training already running"), so this layer never collapses a non-2xx
//! status into an error. It hands back status and body and leaves
//! classification to the caller.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace, warn};

/// Default HTTP timeout for backend requests.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level HTTP errors.
///
/// A response that arrived with a non-success status is NOT an error at
/// this layer; only failures to produce a response at all are.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Failed to create the underlying HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The request could not be completed (connect failure, timeout).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("Failed to read response: {0}")]
    Body(String),
}

/// A raw HTTP response: status code plus body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn utf8_body(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Trait for asynchronous HTTP operations against the WildLens backend.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling scripted clients in tests. The optional `bearer` argument
/// is the session credential; when present it is attached as
/// `Authorization: Bearer <credential>` on the outgoing request. Callers
/// pass the credential explicitly per request rather than installing it
/// in any shared default-header state.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;

    /// Performs an async HTTP POST request with a JSON body.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Creates a new ReqwestClient with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn execute(&self, request: reqwest::RequestBuilder, url: &str) -> Result<HttpResponse, HttpError> {
        let response = match request.send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(HttpError::Request(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(HttpResponse {
                    status,
                    body: bytes.to_vec(),
                })
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(HttpError::Body(e.to_string()))
            }
        }
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        self.execute(request, url).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        self.execute(request, url).await
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A request observed by the scripted client.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub bearer: Option<String>,
        pub body: Option<serde_json::Value>,
    }

    /// Scripted HTTP client for testing.
    ///
    /// Responses are served front-to-back from a queue; every request is
    /// recorded so tests can assert on URLs, bodies, and bearer values.
    pub struct ScriptedClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl ScriptedClient {
        pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Convenience for a single canned response.
        pub fn respond_with(status: u16, body: &[u8]) -> Self {
            Self::new(vec![Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })])
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn next_response(&self) -> Result<HttpResponse, HttpError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::Request("no scripted response left".to_string())))
        }
    }

    impl AsyncHttpClient for ScriptedClient {
        async fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, HttpError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method: "GET",
                url: url.to_string(),
                bearer: bearer.map(String::from),
                body: None,
            });
            self.next_response()
        }

        async fn post_json(
            &self,
            url: &str,
            body: &serde_json::Value,
            bearer: Option<&str>,
        ) -> Result<HttpResponse, HttpError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method: "POST",
                url: url.to_string(),
                bearer: bearer.map(String::from),
                body: Some(body.clone()),
            });
            self.next_response()
        }
    }

    #[test]
    fn response_is_success() {
        let ok = HttpResponse {
            status: 200,
            body: vec![],
        };
        let accepted = HttpResponse {
            status: 202,
            body: vec![],
        };
        let not_found = HttpResponse {
            status: 404,
            body: vec![],
        };
        assert!(ok.is_success());
        assert!(accepted.is_success());
        assert!(!not_found.is_success());
    }

    #[test]
    fn response_utf8_body() {
        let text = HttpResponse {
            status: 200,
            body: b"hello".to_vec(),
        };
        assert_eq!(text.utf8_body(), Some("hello"));

        let binary = HttpResponse {
            status: 200,
            body: vec![0xff, 0xfe],
        };
        assert!(binary.utf8_body().is_none());
    }

    #[tokio::test]
    async fn scripted_client_serves_in_order_and_records() {
        let client = ScriptedClient::new(vec![
            Ok(HttpResponse {
                status: 202,
                body: vec![],
            }),
            Ok(HttpResponse {
                status: 200,
                body: b"done".to_vec(),
            }),
        ]);

        let first = client.get("http://api/x", Some("tok")).await.unwrap();
        let second = client.get("http://api/x", Some("tok")).await.unwrap();
        assert_eq!(first.status, 202);
        assert_eq!(second.status, 200);

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].bearer.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn scripted_client_errors_when_exhausted() {
        let client = ScriptedClient::new(vec![]);
        let result = client.get("http://api/x", None).await;
        assert!(result.is_err());
    }
}
