//! Backend endpoint configuration shared by the server and the browser.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server reads the endpoint URL and public API key once at startup and
//! renders them into the SSR shell as `<meta>` tags; the hydrated client reads
//! them back from the document.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use url::Url;

/// `<meta name=...>` carrying the backend endpoint URL.
pub const META_BACKEND_URL: &str = "menuboard:backend-url";
/// `<meta name=...>` carrying the public API key.
pub const META_ANON_KEY: &str = "menuboard:anon-key";

/// Configuration problems detected before any backend call is made.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration: {var} not set")]
    MissingVar { var: String },

    #[error("invalid backend url '{url}': expected http(s)://host")]
    InvalidUrl { url: String },

    #[error("invalid PORT '{value}'")]
    InvalidPort { value: String },

    #[error("backend anon key is empty")]
    EmptyAnonKey,
}

/// Validated backend endpoint and public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    base: Url,
    anon_key: String,
}

impl BackendConfig {
    /// Validate and normalize a backend URL and public key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for an unparseable, non-http(s) or
    /// hostless URL, or one carrying a query or fragment, and
    /// [`ConfigError::EmptyAnonKey`] for a blank key.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidUrl { url: url.to_owned() };
        let base = Url::parse(url.trim()).map_err(|_| invalid())?;
        if !matches!(base.scheme(), "http" | "https")
            || base.host_str().is_none_or(str::is_empty)
            || base.query().is_some()
            || base.fragment().is_some()
        {
            return Err(invalid());
        }
        let anon_key = anon_key.trim();
        if anon_key.is_empty() {
            return Err(ConfigError::EmptyAnonKey);
        }
        Ok(Self { base, anon_key: anon_key.to_owned() })
    }

    /// Backend base URL without a trailing slash.
    #[must_use]
    pub fn url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Public (anon) API key.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Absolute URL for an API `path` (leading slash) under the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{path}", self.base.path().trim_end_matches('/'));
        url.set_path(&joined);
        url
    }

    /// Project reference: the first label of the backend host.
    #[must_use]
    pub fn project_ref(&self) -> &str {
        self.base
            .host_str()
            .and_then(|host| host.split('.').next())
            .unwrap_or_default()
    }

    /// Browser storage key for the persisted session.
    #[must_use]
    pub fn session_storage_key(&self) -> String {
        format!("sb-{}-auth-token", self.project_ref())
    }

    /// Read the configuration rendered into the document by the server.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] naming the absent meta tag, or a
    /// validation error from [`BackendConfig::new`].
    #[cfg(feature = "hydrate")]
    pub fn from_document() -> Result<Self, ConfigError> {
        let url = read_meta(META_BACKEND_URL)?;
        let anon_key = read_meta(META_ANON_KEY)?;
        Self::new(&url, &anon_key)
    }
}

#[cfg(feature = "hydrate")]
fn read_meta(name: &str) -> Result<String, ConfigError> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|doc| doc.query_selector(&format!("meta[name=\"{name}\"]")).ok().flatten())
        .and_then(|el| el.get_attribute("content"))
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar { var: name.to_owned() })
}
