//! Identity-service calls: password grant, refresh, sign-up, logout.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): every call returns [`BackendError::Unavailable`].
//!
//! ERROR HANDLING
//! ==============
//! Non-OK responses become [`BackendError::Auth`] carrying the service's own
//! message so the login form can show it verbatim.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "auth_api_test.rs"]
mod auth_api_test;

use super::config::BackendConfig;
use super::error::BackendError;
use super::types::Session;

/// Refresh this many seconds before the access token expires.
pub const EXPIRY_MARGIN_SECS: i64 = 60;
/// Poll interval for the auto-refresh task while signed out.
pub const AUTO_REFRESH_IDLE_SECS: u64 = 30;

#[cfg(any(test, feature = "hydrate"))]
fn token_url(config: &BackendConfig, grant_type: &str) -> String {
    let mut url = config.endpoint("/auth/v1/token");
    url.query_pairs_mut().append_pair("grant_type", grant_type);
    url.into()
}

#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn password_grant_url(config: &BackendConfig) -> String {
    token_url(config, "password")
}

#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn refresh_grant_url(config: &BackendConfig) -> String {
    token_url(config, "refresh_token")
}

#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn signup_url(config: &BackendConfig) -> String {
    config.endpoint("/auth/v1/signup").into()
}

#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn logout_url(config: &BackendConfig) -> String {
    config.endpoint("/auth/v1/logout").into()
}

/// Sign-up answers with a full session when confirmation is disabled and with
/// a bare user object otherwise.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn parse_signup_body(body: &serde_json::Value, now_secs: i64) -> Result<Option<Session>, BackendError> {
    if body.get("access_token").is_none() {
        return Ok(None);
    }
    serde_json::from_value::<Session>(body.clone())
        .map(|session| Some(session.stamped(now_secs)))
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Logout statuses meaning the session is already gone server-side.
pub(crate) fn logout_status_is_ignorable(status: u16) -> bool {
    matches!(status, 401 | 403 | 404)
}

/// Seconds to wait before refreshing a token expiring at `expires_at`.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn refresh_delay_secs(expires_at: i64, now_secs: i64) -> u64 {
    let due = expires_at - EXPIRY_MARGIN_SECS - now_secs;
    u64::try_from(due).map_or(1, |secs| secs.max(1))
}

#[cfg(feature = "hydrate")]
async fn post_json(
    url: &str,
    config: &BackendConfig,
    bearer: &str,
    payload: &serde_json::Value,
) -> Result<gloo_net::http::Response, BackendError> {
    let resp = gloo_net::http::Request::post(url)
        .header("apikey", config.anon_key())
        .header("Authorization", &super::rest::bearer_header(bearer))
        .json(payload)
        .map_err(|e| BackendError::Decode(e.to_string()))?
        .send()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::auth(status, &body))
}

#[cfg(feature = "hydrate")]
async fn read_session(resp: gloo_net::http::Response) -> Result<Session, BackendError> {
    resp.json::<Session>()
        .await
        .map(|session| session.stamped(crate::util::clock::now_secs()))
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Exchange email + password for a session.
///
/// # Errors
///
/// Returns [`BackendError::Auth`] for rejected credentials.
pub async fn password_grant(config: &BackendConfig, email: &str, password: &str) -> Result<Session, BackendError> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::json!({ "email": email, "password": password });
        let resp = post_json(&password_grant_url(config), config, config.anon_key(), &payload).await?;
        read_session(resp).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, email, password);
        Err(BackendError::Unavailable)
    }
}

/// Exchange a refresh token for a new session.
///
/// # Errors
///
/// Returns [`BackendError::Auth`] when the refresh token was revoked.
pub async fn refresh_grant(config: &BackendConfig, refresh_token: &str) -> Result<Session, BackendError> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let resp = post_json(&refresh_grant_url(config), config, config.anon_key(), &payload).await?;
        read_session(resp).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, refresh_token);
        Err(BackendError::Unavailable)
    }
}

/// Register a new account. `None` means email confirmation is pending.
///
/// # Errors
///
/// Returns [`BackendError::Auth`] for rejected sign-ups (weak password, taken email).
pub async fn signup(config: &BackendConfig, email: &str, password: &str) -> Result<Option<Session>, BackendError> {
    #[cfg(feature = "hydrate")]
    {
        let payload = serde_json::json!({ "email": email, "password": password });
        let resp = post_json(&signup_url(config), config, config.anon_key(), &payload).await?;
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        parse_signup_body(&body, crate::util::clock::now_secs())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, email, password);
        Err(BackendError::Unavailable)
    }
}

/// Revoke the session identified by `access_token`.
///
/// # Errors
///
/// Returns [`BackendError::Auth`] when the service rejects the logout.
pub async fn logout(config: &BackendConfig, access_token: &str) -> Result<(), BackendError> {
    #[cfg(feature = "hydrate")]
    {
        post_json(&logout_url(config), config, access_token, &serde_json::json!({}))
            .await
            .map(|_| ())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, access_token);
        Err(BackendError::Unavailable)
    }
}
