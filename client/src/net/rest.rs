//! Row-level table API calls (PostgREST dialect).
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): every call returns [`BackendError::Unavailable`].

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use super::config::BackendConfig;
use super::error::BackendError;
use super::types::{MenuItem, MenuItemDraft};

#[cfg(any(test, feature = "hydrate"))]
fn table_url(config: &BackendConfig, table: &str) -> url::Url {
    config.endpoint(&format!("/rest/v1/{table}"))
}

/// `select=*` ordered newest first.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn select_all_url(config: &BackendConfig, table: &str) -> String {
    let mut url = table_url(config, table);
    url.query_pairs_mut()
        .append_pair("select", "*")
        .append_pair("order", "created_at.desc");
    url.into()
}

#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn insert_url(config: &BackendConfig, table: &str) -> String {
    table_url(config, table).into()
}

/// Row filter `id=eq.<id>` for update and delete.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn row_url(config: &BackendConfig, table: &str, id: &str) -> String {
    let mut url = table_url(config, table);
    url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
    url.into()
}

#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Decode a `select` response row by row, skipping rows that do not decode.
///
/// # Errors
///
/// Returns [`BackendError::Decode`] when the body is not a JSON array.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn decode_rows(body: &str) -> Result<Vec<MenuItem>, BackendError> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<MenuItem>(row.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                leptos::logging::warn!("skipping menu row {}: {e}", row.get("id").unwrap_or(&serde_json::Value::Null));
                None
            }
        })
        .collect())
}

#[cfg(feature = "hydrate")]
fn authorized(
    builder: gloo_net::http::RequestBuilder,
    config: &BackendConfig,
    bearer: &str,
) -> gloo_net::http::RequestBuilder {
    builder
        .header("apikey", config.anon_key())
        .header("Authorization", &bearer_header(bearer))
}

#[cfg(feature = "hydrate")]
async fn expect_ok(resp: gloo_net::http::Response) -> Result<gloo_net::http::Response, BackendError> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::query(status, &body))
}

/// Read every row of `table`, newest first.
///
/// # Errors
///
/// Returns a transport, query, or decode error.
pub async fn select_all(config: &BackendConfig, bearer: &str, table: &str) -> Result<Vec<MenuItem>, BackendError> {
    #[cfg(feature = "hydrate")]
    {
        let builder = gloo_net::http::Request::get(&select_all_url(config, table));
        let resp = authorized(builder, config, bearer)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let resp = expect_ok(resp).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode_rows(&body)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, bearer, table);
        Err(BackendError::Unavailable)
    }
}

/// Insert one row.
///
/// # Errors
///
/// Returns a transport or query error.
pub async fn insert_row(
    config: &BackendConfig,
    bearer: &str,
    table: &str,
    draft: &MenuItemDraft,
) -> Result<(), BackendError> {
    #[cfg(feature = "hydrate")]
    {
        let builder = gloo_net::http::Request::post(&insert_url(config, table)).header("Prefer", "return=minimal");
        let request = authorized(builder, config, bearer)
            .json(&[draft])
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let resp = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        expect_ok(resp).await.map(|_| ())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, bearer, table, draft);
        Err(BackendError::Unavailable)
    }
}

/// Update the row whose id matches.
///
/// # Errors
///
/// Returns a transport or query error.
pub async fn update_row(
    config: &BackendConfig,
    bearer: &str,
    table: &str,
    id: &str,
    draft: &MenuItemDraft,
) -> Result<(), BackendError> {
    #[cfg(feature = "hydrate")]
    {
        let builder = gloo_net::http::Request::patch(&row_url(config, table, id)).header("Prefer", "return=minimal");
        let request = authorized(builder, config, bearer)
            .json(draft)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let resp = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        expect_ok(resp).await.map(|_| ())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, bearer, table, id, draft);
        Err(BackendError::Unavailable)
    }
}

/// Delete the row whose id matches. A filter matching nothing still succeeds.
///
/// # Errors
///
/// Returns a transport or query error.
pub async fn delete_row(config: &BackendConfig, bearer: &str, table: &str, id: &str) -> Result<(), BackendError> {
    #[cfg(feature = "hydrate")]
    {
        let builder = gloo_net::http::Request::delete(&row_url(config, table, id));
        let resp = authorized(builder, config, bearer)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        expect_ok(resp).await.map(|_| ())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (config, bearer, table, id);
        Err(BackendError::Unavailable)
    }
}
