//! Client for the remote token endpoint.
//!
//! `LoginClient` performs the credential exchange only. It never touches
//! session state or persistent storage; that is the authenticator's job.

use std::time::Duration;

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::ApiError;
use crate::auth::Credential;

// ============================================================================
// Constants
// ============================================================================

/// Path of the token endpoint, relative to the API base URL.
const TOKEN_PATH: &str = "/token";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Successful body of the token endpoint.
///
/// The credential field is guaranteed present and non-empty. Every other
/// field the endpoint sends is kept in `extra`, including a `token_type`
/// that is not a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub access_token: Credential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionInfo {
    /// Parse a token response body, rejecting bodies without a usable token.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let mut value: Value = serde_json::from_str(body)
            .map_err(|e| ApiError::MalformedResponse(format!("body is not JSON: {}", e)))?;

        match value.get("access_token") {
            Some(Value::String(token)) if !token.is_empty() => {}
            Some(Value::String(_)) => {
                return Err(ApiError::MalformedResponse("access_token is empty".to_string()))
            }
            Some(_) => {
                return Err(ApiError::MalformedResponse(
                    "access_token is not a string".to_string(),
                ))
            }
            None => {
                return Err(ApiError::MalformedResponse(
                    "access_token field missing".to_string(),
                ))
            }
        }

        let odd_token_type = value
            .get("token_type")
            .map_or(false, |v| !v.is_string() && !v.is_null());
        let stray = if odd_token_type {
            value.as_object_mut().and_then(|o| o.remove("token_type"))
        } else {
            None
        };

        let mut info: SessionInfo = serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        if let Some(token_type) = stray {
            info.extra.insert("token_type".to_string(), token_type);
        }
        Ok(info)
    }
}

/// HTTP client for the token endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct LoginClient {
    client: Client,
    api_base: String,
}

impl LoginClient {
    /// Create a client for the given API base URL with the default timeout
    pub fn new(api_base: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(api_base, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(api_base: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        // Cookie store so session cookies set by the endpoint ride along on
        // later requests, as a browser does with credentials: 'include'.
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.api_base, TOKEN_PATH)
    }

    /// Exchange a username and password for a session credential.
    pub async fn request_token(&self, username: &str, password: &str) -> Result<SessionInfo, ApiError> {
        let url = self.token_url();
        debug!(url = %url, username = username, "Requesting access token");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        SessionInfo::from_body(&body)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_info_from_body_keeps_extra_fields() {
        let info = SessionInfo::from_body(
            r#"{"access_token":"T1","token_type":"bearer","expires_in":3600}"#,
        )
        .unwrap();
        assert_eq!(info.access_token.as_str(), "T1");
        assert_eq!(info.token_type.as_deref(), Some("bearer"));
        assert_eq!(info.extra.get("expires_in"), Some(&Value::from(3600)));
    }

    #[test]
    fn test_session_info_from_body_tolerates_odd_token_type() {
        let info = SessionInfo::from_body(r#"{"access_token":"T1","token_type":1}"#).unwrap();
        assert_eq!(info.access_token.as_str(), "T1");
        assert!(info.token_type.is_none());
        assert_eq!(info.extra.get("token_type"), Some(&Value::from(1)));

        let info = SessionInfo::from_body(r#"{"access_token":"T1","token_type":null}"#).unwrap();
        assert!(info.token_type.is_none());
    }

    #[test]
    fn test_session_info_from_body_token_only() {
        let info = SessionInfo::from_body(r#"{"access_token":"T1"}"#).unwrap();
        assert_eq!(info.access_token.as_str(), "T1");
        assert!(info.token_type.is_none());
        assert!(info.extra.is_empty());
    }

    #[test]
    fn test_session_info_from_body_rejects_missing_token() {
        let err = SessionInfo::from_body(r#"{"token_type":"bearer"}"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_session_info_from_body_rejects_bad_token_values() {
        assert!(SessionInfo::from_body(r#"{"access_token":""}"#).unwrap_err().is_malformed());
        assert!(SessionInfo::from_body(r#"{"access_token":42}"#).unwrap_err().is_malformed());
        assert!(SessionInfo::from_body(r#"{"access_token":null}"#).unwrap_err().is_malformed());
    }

    #[test]
    fn test_session_info_from_body_rejects_non_json() {
        assert!(SessionInfo::from_body("<html>ok</html>").unwrap_err().is_malformed());
        assert!(SessionInfo::from_body(r#"["T1"]"#).unwrap_err().is_malformed());
    }

    #[test]
    fn test_token_url_strips_trailing_slash() {
        let client = LoginClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.api_base(), "http://localhost:8000");
        assert_eq!(client.token_url(), "http://localhost:8000/token");
    }
}
