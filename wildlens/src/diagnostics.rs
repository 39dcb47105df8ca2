//! Read-only diagnostics fetches for the admin console.
//!
//! Single authorized GETs with no retry and no polling; these share the
//! session/credential contract with the job layer but carry no state of
//! their own.

use thiserror::Error;

use crate::http::{AsyncHttpClient, HttpError, HttpResponse};
use crate::session::Session;

/// Default number of log lines to tail.
pub const DEFAULT_LOG_LINES: u32 = 200;

/// Errors from diagnostics fetches.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// The request could not be completed.
    #[error("Diagnostics request failed: {0}")]
    Http(#[from] HttpError),

    /// The backend answered with a non-success status.
    #[error("HTTP {status} from diagnostics endpoint")]
    Backend { status: u16 },

    /// The response body was not what the endpoint promises.
    #[error("Malformed diagnostics payload: {0}")]
    Malformed(String),
}

/// Client for the read-only admin diagnostics endpoints.
#[derive(Clone)]
pub struct DiagnosticsClient<C> {
    http: C,
    base_url: String,
}

impl<C: AsyncHttpClient> DiagnosticsClient<C> {
    /// Creates a client for the given backend base URL.
    pub fn new(http: C, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Tails the backend server log: the last `lines` lines as raw text.
    pub async fn tail_server_logs(
        &self,
        session: &Session,
        lines: u32,
    ) -> Result<String, DiagnosticsError> {
        let url = format!(
            "{}/admin-dashboard/server-logs/?lines={}",
            self.base_url, lines
        );
        let response = self.checked_get(&url, session).await?;

        response
            .utf8_body()
            .map(String::from)
            .ok_or_else(|| DiagnosticsError::Malformed("log tail is not UTF-8 text".to_string()))
    }

    /// Fetches the aggregate statistics shown on the admin dashboard.
    pub async fn fetch_admin_stats(
        &self,
        session: &Session,
    ) -> Result<serde_json::Value, DiagnosticsError> {
        let url = format!("{}/admin-dashboard/data/", self.base_url);
        let response = self.checked_get(&url, session).await?;
        parse_json(&response)
    }

    /// Fetches data-quality statistics for one backing table.
    pub async fn fetch_quality_stats(
        &self,
        session: &Session,
        table_name: &str,
    ) -> Result<serde_json::Value, DiagnosticsError> {
        let url = format!(
            "{}/admin-dashboard/data-quality-data/?table_name={}",
            self.base_url, table_name
        );
        let response = self.checked_get(&url, session).await?;
        parse_json(&response)
    }

    async fn checked_get(
        &self,
        url: &str,
        session: &Session,
    ) -> Result<HttpResponse, DiagnosticsError> {
        let response = self.http.get(url, Some(&session.token)).await?;
        if !response.is_success() {
            return Err(DiagnosticsError::Backend {
                status: response.status,
            });
        }
        Ok(response)
    }
}

fn parse_json(response: &HttpResponse) -> Result<serde_json::Value, DiagnosticsError> {
    serde_json::from_slice(&response.body).map_err(|e| DiagnosticsError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::ScriptedClient;
    use crate::session::Role;

    fn admin_session() -> Session {
        Session {
            user_id: "u-admin".to_string(),
            role: Role::Admin,
            token: "tok-admin".to_string(),
        }
    }

    #[tokio::test]
    async fn tail_returns_raw_text() {
        let client = DiagnosticsClient::new(
            ScriptedClient::respond_with(200, b"line one\nline two\n"),
            "http://backend:8000",
        );

        let text = client
            .tail_server_logs(&admin_session(), 50)
            .await
            .unwrap();
        assert_eq!(text, "line one\nline two\n");

        let requests = client.http.requests();
        assert_eq!(
            requests[0].url,
            "http://backend:8000/admin-dashboard/server-logs/?lines=50"
        );
        assert_eq!(requests[0].bearer.as_deref(), Some("tok-admin"));
    }

    #[tokio::test]
    async fn tail_backend_error_is_surfaced() {
        let client = DiagnosticsClient::new(
            ScriptedClient::respond_with(503, b""),
            "http://backend:8000",
        );

        let err = client
            .tail_server_logs(&admin_session(), 50)
            .await
            .unwrap_err();
        assert!(matches!(err, DiagnosticsError::Backend { status: 503 }));
    }

    #[tokio::test]
    async fn admin_stats_parse_as_json() {
        let client = DiagnosticsClient::new(
            ScriptedClient::respond_with(200, br#"{"species_names": ["lynx"]}"#),
            "http://backend:8000",
        );

        let stats = client.fetch_admin_stats(&admin_session()).await.unwrap();
        assert_eq!(stats["species_names"][0], "lynx");
    }

    #[tokio::test]
    async fn quality_stats_pass_table_name() {
        let client = DiagnosticsClient::new(
            ScriptedClient::respond_with(200, br#"{"times": []}"#),
            "http://backend:8000",
        );

        client
            .fetch_quality_stats(&admin_session(), "footprint_images")
            .await
            .unwrap();

        let requests = client.http.requests();
        assert_eq!(
            requests[0].url,
            "http://backend:8000/admin-dashboard/data-quality-data/?table_name=footprint_images"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_reported() {
        let client = DiagnosticsClient::new(
            ScriptedClient::respond_with(200, b"not json"),
            "http://backend:8000",
        );

        let err = client.fetch_admin_stats(&admin_session()).await.unwrap_err();
        assert!(matches!(err, DiagnosticsError::Malformed(_)));
    }
}
