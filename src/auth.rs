//! OAuth token acquisition for the Podbean API.
//!
//! Two grant flows are supported: client credentials (for editing your own
//! podcast with an app's id/secret) and authorization code (after the user
//! approves access in a browser). The resulting token is treated as an
//! opaque bearer string; nothing here inspects its contents.

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Scopes requested for the browser consent dialog, space-separated.
pub const DEFAULT_SCOPES: &str = "episode_read episode_write";

const USER_AGENT: &str = concat!("podbean-editor/", env!("CARGO_PKG_VERSION"));

/// A bearer credential returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Build the browser authorization URL for the consent dialog.
///
/// # Examples
///
/// ```
/// use podbean_editor::auth::build_authorize_url;
///
/// let url = build_authorize_url(
///     "https://api.podbean.com",
///     "my_client_id",
///     "http://localhost:8888/callback.html",
/// )
/// .unwrap();
/// assert!(url.contains("response_type=code"));
/// assert!(url.contains("client_id=my_client_id"));
/// ```
pub fn build_authorize_url(base_url: &str, client_id: &str, redirect_uri: &str) -> Result<String> {
    let endpoint = format!("{}/v1/dialog/oauth", base_url.trim_end_matches('/'));
    let url = reqwest::Url::parse_with_params(
        &endpoint,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", DEFAULT_SCOPES),
        ],
    )
    .map_err(|e| AppError::InvalidInput(format!("bad authorization URL: {}", e)))?;

    Ok(url.to_string())
}

/// Fetch a token with the client-credentials grant.
///
/// Credentials travel via HTTP Basic auth; the form body carries only the
/// grant type. Failures are blocking: the caller surfaces them and must be
/// re-triggered manually, nothing is retried.
pub async fn fetch_client_token(
    base_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<AccessToken> {
    let url = format!("{}/v1/oauth/token", base_url.trim_end_matches('/'));

    let client = build_client()?;
    let resp = client
        .post(&url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| AppError::Auth(format!("token request failed: {}", e)))?;

    parse_token_response(resp).await
}

/// Exchange an authorization code for a token.
///
/// The code, client credentials, and `redirect_uri` all travel as form
/// fields. `redirect_uri` is always included and must match the one used
/// for the consent dialog.
pub async fn exchange_auth_code(
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<AccessToken> {
    let url = format!("{}/v1/oauth/token", base_url.trim_end_matches('/'));

    let client = build_client()?;
    let resp = client
        .post(&url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await
        .map_err(|e| AppError::Auth(format!("code exchange failed: {}", e)))?;

    parse_token_response(resp).await
}

fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| AppError::Auth(format!("failed to build HTTP client: {}", e)))
}

async fn parse_token_response(resp: reqwest::Response) -> Result<AccessToken> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| AppError::Auth(format!("failed to read token response: {}", e)))?;

    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorBody>(&body) {
            Ok(err) => err
                .error_description
                .or(err.error)
                .unwrap_or_else(|| format!("HTTP {}", status)),
            Err(_) => format!("HTTP {}", status),
        };
        return Err(AppError::Auth(message));
    }

    let token: AccessToken = serde_json::from_str(&body)
        .map_err(|e| AppError::Auth(format!("malformed token response: {}", e)))?;

    if token.access_token.is_empty() {
        return Err(AppError::Auth("token response carried no access_token".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_redirect_uri() {
        let url = build_authorize_url(
            "https://api.podbean.com",
            "abc123",
            "http://localhost:8888/callback.html",
        )
        .unwrap();

        assert!(url.starts_with("https://api.podbean.com/v1/dialog/oauth?"));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8888%2Fcallback.html"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_authorize_url_scope_is_space_separated() {
        let url = build_authorize_url("https://api.podbean.com", "id", "http://x/cb").unwrap();
        // Query encoding turns the space into '+'.
        assert!(url.contains("scope=episode_read+episode_write"));
    }

    #[test]
    fn test_authorize_url_tolerates_trailing_slash() {
        let url = build_authorize_url("https://api.podbean.com/", "id", "http://x/cb").unwrap();
        assert!(url.starts_with("https://api.podbean.com/v1/dialog/oauth?"));
    }

    #[test]
    fn test_token_deserialization() {
        let json = r#"{"access_token": "tok", "token_type": "Bearer", "expires_in": 604800, "scope": "episode_read episode_write"}"#;
        let token: AccessToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "tok");
        assert_eq!(token.expires_in, Some(604800));
    }

    #[test]
    fn test_token_deserialization_minimal() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token": "tok"}"#).unwrap();
        assert_eq!(token.access_token, "tok");
        assert_eq!(token.token_type, None);
    }
}
