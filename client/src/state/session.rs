//! Auth session holder: the single owner of the identity subscription.
//!
//! SYSTEM CONTEXT
//! ==============
//! Constructed once by the app shell and provided through context. `init`
//! wires backend auth transitions into the UI's `AuthState`; `teardown`
//! releases everything `init` registered.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::net::backend::{Backend, SignUpOutcome, Subscription};
use crate::net::error::BackendError;
use crate::net::types::AuthEvent;

pub struct SessionHolder<B> {
    backend: Arc<B>,
    listener: Mutex<Option<Subscription>>,
    auto_refresh: Mutex<Option<Subscription>>,
    torn_down: Arc<AtomicBool>,
}

impl<B: Backend> SessionHolder<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            listener: Mutex::new(None),
            auto_refresh: Mutex::new(None),
            torn_down: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Register for auth transitions, then publish the existing session.
    ///
    /// Every later transition is forwarded to `publish`. If a transition
    /// arrives before the session query answers, the query result is dropped.
    pub async fn init(&self, publish: impl Fn(&AuthEvent) + Send + Sync + 'static) {
        let publish = Arc::new(publish);
        let seen_transition = Arc::new(AtomicBool::new(false));

        let forward = Arc::clone(&publish);
        let seen = Arc::clone(&seen_transition);
        let subscription = self.backend.on_auth_state_change(Arc::new(move |event: &AuthEvent| {
            seen.store(true, Ordering::SeqCst);
            forward(event);
        }));
        replace(&self.listener, subscription);
        replace(&self.auto_refresh, self.backend.start_auto_refresh());

        let initial = match self.backend.get_session().await {
            Ok(session) => session,
            Err(e) => {
                leptos::logging::warn!("session query failed: {e}");
                None
            }
        };
        if self.torn_down.load(Ordering::SeqCst) || seen_transition.load(Ordering::SeqCst) {
            return;
        }
        publish(&AuthEvent::InitialSession(initial));
    }

    /// # Errors
    ///
    /// Returns the identity service's rejection.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), BackendError> {
        let session = self
            .backend
            .sign_in_with_password(email, password)
            .await?;
        leptos::logging::log!("signed in as {}", session.user.display_name());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the identity service's rejection.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, BackendError> {
        self.backend.sign_up(email, password).await
    }

    /// # Errors
    ///
    /// Returns the identity service's rejection; the session stays intact.
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        self.backend.sign_out().await
    }

    /// Release the auth listener and the refresh task.
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        for slot in [&self.listener, &self.auto_refresh] {
            let taken = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(subscription) = taken {
                subscription.release();
            }
        }
    }
}

fn replace(slot: &Mutex<Option<Subscription>>, subscription: Subscription) {
    let previous = slot
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(subscription);
    if let Some(previous) = previous {
        previous.release();
    }
}
