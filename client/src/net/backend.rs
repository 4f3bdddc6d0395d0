//! Backend seam: table, identity, and realtime operations behind one trait.
//!
//! DESIGN
//! ======
//! State machines and components talk to `Backend`, never to HTTP directly,
//! so the hosted implementation and the in-memory test double are
//! interchangeable. Callback registrations return a [`Subscription`] that
//! must be released on teardown.

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::error::BackendError;
use super::types::{AuthEvent, MenuItem, MenuItemDraft, Session, TableEvent};

/// Callback invoked on every auth-state transition.
pub type AuthListener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;
/// Callback invoked on every realtime table notification.
pub type TableListener = Arc<dyn Fn(&TableEvent) + Send + Sync>;

/// Result of a sign-up request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is active and a session was issued.
    SignedIn,
    /// The account exists but must be confirmed by email first.
    ConfirmationRequired,
}

/// Operations consumed from the hosted backend.
#[async_trait::async_trait(?Send)]
pub trait Backend {
    /// `select * from menu_items order by created_at desc`.
    async fn select_menu_items(&self) -> Result<Vec<MenuItem>, BackendError>;

    /// `insert into menu_items (...)`.
    async fn insert_menu_item(&self, draft: &MenuItemDraft) -> Result<(), BackendError>;

    /// `update menu_items set ... where id = ?`.
    async fn update_menu_item(&self, id: &str, draft: &MenuItemDraft) -> Result<(), BackendError>;

    /// `delete from menu_items where id = ?`. Deleting a missing row succeeds.
    async fn delete_menu_item(&self, id: &str) -> Result<(), BackendError>;

    /// Subscribe to all change events on `table`.
    fn subscribe_table(&self, table: &str, listener: TableListener) -> Subscription;

    /// Current session, if one exists.
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;

    /// Register for auth-state transitions.
    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Keep the access token fresh until the returned handle is released.
    fn start_auto_refresh(&self) -> Subscription {
        Subscription::noop()
    }
}

/// Handle for a registered callback or background task.
///
/// `release` runs the teardown exactly once; dropping an unreleased handle
/// releases it too.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Tear down the registration.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Registry of listeners keyed by registration id.
pub struct ListenerSet<T> {
    next_id: Arc<AtomicU64>,
    listeners: Arc<Mutex<Vec<(u64, Arc<dyn Fn(&T) + Send + Sync>)>>>,
}

impl<T> Clone for ListenerSet<T> {
    fn clone(&self) -> Self {
        Self { next_id: Arc::clone(&self.next_id), listeners: Arc::clone(&self.listeners) }
    }
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self { next_id: Arc::new(AtomicU64::new(1)), listeners: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl<T: 'static> ListenerSet<T> {
    /// Register `listener`; the returned handle removes it.
    pub fn add(&self, listener: Arc<dyn Fn(&T) + Send + Sync>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        let listeners = Arc::clone(&self.listeners);
        Subscription::new(move || {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(entry_id, _)| *entry_id != id);
        })
    }

    /// Deliver `event` to every registered listener.
    ///
    /// Listeners are snapshotted first so a callback may register or release
    /// without deadlocking.
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
