//! Hosted backend client: table API, identity API, and realtime channel.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SupabaseClient` is the production [`Backend`]. It owns the current
//! session (memory first, `localStorage` second), publishes auth transitions
//! to registered listeners, and signs every table request with the session's
//! access token or the public key when signed out.
//!
//! Cloning is cheap and every clone shares the same session and listeners, so
//! a background task can hold its own handle.

#[cfg(test)]
#[path = "supabase_test.rs"]
mod supabase_test;

use std::sync::{Arc, PoisonError, RwLock};

use super::auth_api::{self, EXPIRY_MARGIN_SECS};
use super::backend::{AuthListener, Backend, ListenerSet, SignUpOutcome, Subscription, TableListener};
use super::config::BackendConfig;
use super::error::BackendError;
use super::rest;
use super::session_store::SessionStore;
use super::types::{AuthEvent, MENU_TABLE, MenuItem, MenuItemDraft, Session};
use crate::util::clock;

#[derive(Clone)]
pub struct SupabaseClient {
    config: BackendConfig,
    store: SessionStore,
    session: Arc<RwLock<Option<Session>>>,
    auth_events: ListenerSet<AuthEvent>,
}

impl SupabaseClient {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            store: SessionStore::for_project(&config),
            config,
            session: Arc::new(RwLock::new(None)),
            auth_events: ListenerSet::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// In-memory session, without consulting storage.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Token for the `Authorization` header.
    fn bearer(&self) -> String {
        self.current_session()
            .map_or_else(|| self.config.anon_key().to_owned(), |s| s.access_token)
    }

    /// Replace the session in memory and in browser storage.
    fn store_session(&self, session: Option<Session>) {
        self.store.save(session.as_ref());
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Exchange `refresh_token` for a new session and store it.
    ///
    /// A rejected refresh token clears the stored session.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Session, BackendError> {
        match auth_api::refresh_grant(&self.config, refresh_token).await {
            Ok(session) => {
                self.store_session(Some(session.clone()));
                self.auth_events
                    .emit(&AuthEvent::TokenRefreshed(session.clone()));
                Ok(session)
            }
            Err(e @ BackendError::Auth { .. }) => {
                self.store_session(None);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Refresh the current session now.
    ///
    /// Returns `Ok(None)` when there is nothing to refresh. A rejected refresh
    /// token signs the user out.
    ///
    /// # Errors
    ///
    /// Returns the identity service or transport error.
    pub async fn refresh_session(&self) -> Result<Option<Session>, BackendError> {
        let Some(refresh_token) = self.current_session().and_then(|s| s.refresh_token) else {
            return Ok(None);
        };
        match self.exchange_refresh_token(&refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                if matches!(e, BackendError::Auth { .. }) {
                    self.auth_events.emit(&AuthEvent::SignedOut);
                }
                Err(e)
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Backend for SupabaseClient {
    async fn select_menu_items(&self) -> Result<Vec<MenuItem>, BackendError> {
        rest::select_all(&self.config, &self.bearer(), MENU_TABLE).await
    }

    async fn insert_menu_item(&self, draft: &MenuItemDraft) -> Result<(), BackendError> {
        rest::insert_row(&self.config, &self.bearer(), MENU_TABLE, draft).await
    }

    async fn update_menu_item(&self, id: &str, draft: &MenuItemDraft) -> Result<(), BackendError> {
        rest::update_row(&self.config, &self.bearer(), MENU_TABLE, id, draft).await
    }

    async fn delete_menu_item(&self, id: &str) -> Result<(), BackendError> {
        rest::delete_row(&self.config, &self.bearer(), MENU_TABLE, id).await
    }

    fn subscribe_table(&self, table: &str, listener: TableListener) -> Subscription {
        #[cfg(feature = "hydrate")]
        {
            super::realtime::subscribe(&self.config, table, Arc::clone(&self.session), &self.auth_events, listener)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (table, listener);
            Subscription::noop()
        }
    }

    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        let session = match self.current_session() {
            Some(session) => session,
            None => {
                let Some(stored) = self.store.load() else {
                    return Ok(None);
                };
                *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(stored.clone());
                stored
            }
        };

        if !session.expires_within(clock::now_secs(), EXPIRY_MARGIN_SECS) {
            return Ok(Some(session));
        }
        let Some(refresh_token) = session.refresh_token else {
            self.store_session(None);
            return Ok(None);
        };
        match self.exchange_refresh_token(&refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(BackendError::Auth { message, .. }) => {
                leptos::logging::warn!("stored session expired: {message}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription {
        self.auth_events.add(listener)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let session = auth_api::password_grant(&self.config, email, password).await?;
        self.store_session(Some(session.clone()));
        self.auth_events
            .emit(&AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, BackendError> {
        match auth_api::signup(&self.config, email, password).await? {
            Some(session) => {
                self.store_session(Some(session.clone()));
                self.auth_events.emit(&AuthEvent::SignedIn(session));
                Ok(SignUpOutcome::SignedIn)
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if let Some(session) = self.current_session() {
            match auth_api::logout(&self.config, &session.access_token).await {
                Ok(()) => {}
                Err(BackendError::Auth { status, .. }) if auth_api::logout_status_is_ignorable(status) => {}
                Err(e) => return Err(e),
            }
        }
        self.store_session(None);
        self.auth_events.emit(&AuthEvent::SignedOut);
        Ok(())
    }

    fn start_auto_refresh(&self) -> Subscription {
        #[cfg(feature = "hydrate")]
        {
            use std::sync::atomic::{AtomicBool, Ordering};

            let alive = Arc::new(AtomicBool::new(true));
            let flag = Arc::clone(&alive);
            let client = self.clone();
            leptos::task::spawn_local(async move {
                while flag.load(Ordering::Relaxed) {
                    let delay_secs = client
                        .current_session()
                        .and_then(|s| s.expires_at)
                        .map_or(auth_api::AUTO_REFRESH_IDLE_SECS, |at| {
                            auth_api::refresh_delay_secs(at, clock::now_secs())
                        });
                    gloo_timers::future::sleep(std::time::Duration::from_secs(delay_secs)).await;
                    if !flag.load(Ordering::Relaxed) {
                        break;
                    }
                    let due = client
                        .current_session()
                        .is_some_and(|s| s.expires_within(clock::now_secs(), EXPIRY_MARGIN_SECS));
                    if due {
                        if let Err(e) = client.refresh_session().await {
                            leptos::logging::warn!("token refresh failed: {e}");
                        }
                    }
                }
            });
            Subscription::new(move || alive.store(false, Ordering::Relaxed))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Subscription::noop()
        }
    }
}
