//! Persisted auth session, one `localStorage` entry per backend project.
//!
//! Off-browser there is nothing to persist: loads find nothing and writes are
//! dropped.

#[cfg(test)]
#[path = "session_store_test.rs"]
mod session_store_test;

use super::config::BackendConfig;
use super::types::Session;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStore {
    key: String,
}

impl SessionStore {
    #[must_use]
    pub fn for_project(config: &BackendConfig) -> Self {
        Self { key: config.session_storage_key() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored session. An entry that no longer decodes is erased.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        #[cfg(feature = "hydrate")]
        {
            let storage = local_storage()?;
            let raw = storage.get_item(&self.key).ok().flatten()?;
            let session = decode_stored(&raw);
            if session.is_none() {
                leptos::logging::warn!("discarding unreadable session under {}", self.key);
                let _ = storage.remove_item(&self.key);
            }
            session
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &self.key;
            None
        }
    }

    /// Persist `session`, or erase the entry for `None`.
    pub fn save(&self, session: Option<&Session>) {
        #[cfg(feature = "hydrate")]
        {
            let Some(storage) = local_storage() else {
                return;
            };
            let written = match session.map(serde_json::to_string) {
                Some(Ok(raw)) => storage.set_item(&self.key, &raw),
                Some(Err(e)) => {
                    leptos::logging::warn!("session not persisted: {e}");
                    return;
                }
                None => storage.remove_item(&self.key),
            };
            if written.is_err() {
                leptos::logging::warn!("localStorage rejected write to {}", self.key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&self.key, session);
        }
    }
}

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Parse a stored entry; a session without an access token counts as absent.
#[cfg(any(test, feature = "hydrate"))]
pub(crate) fn decode_stored(raw: &str) -> Option<Session> {
    serde_json::from_str::<Session>(raw)
        .ok()
        .filter(|s| !s.access_token.is_empty())
}
