//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Fed by [`crate::state::session::SessionHolder`] and read by the header and
//! the menu page to gate admin controls.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::{AuthEvent, AuthUser, Session};

/// Authentication state tracking the current session and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub session: Option<Session>,
    /// True until the initial session query has answered.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { session: None, loading: true }
    }
}

impl AuthState {
    /// Fold one auth transition into the state.
    pub fn apply(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::InitialSession(session) => {
                self.session = session;
                self.loading = false;
            }
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                self.session = Some(session);
                self.loading = false;
            }
            AuthEvent::SignedOut => {
                self.session = None;
                self.loading = false;
            }
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// Any signed-in principal is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.is_some()
    }
}
