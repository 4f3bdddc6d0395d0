use super::*;
use crate::net::fake_backend::session_for;

#[test]
fn default_is_loading_and_signed_out() {
    let state = AuthState::default();
    assert!(state.loading);
    assert!(!state.is_admin());
    assert_eq!(state.user(), None);
}

#[test]
fn initial_session_ends_loading() {
    let mut state = AuthState::default();
    state.apply(AuthEvent::InitialSession(None));
    assert!(!state.loading);
    assert!(!state.is_admin());

    let mut state = AuthState::default();
    state.apply(AuthEvent::InitialSession(Some(session_for("chef@example.com"))));
    assert!(state.is_admin());
    assert_eq!(state.user().and_then(|u| u.email.as_deref()), Some("chef@example.com"));
}

#[test]
fn sign_in_then_out_toggles_admin() {
    let mut state = AuthState::default();
    state.apply(AuthEvent::SignedIn(session_for("a@example.com")));
    assert!(state.is_admin());
    state.apply(AuthEvent::SignedOut);
    assert!(!state.is_admin());
    assert!(!state.loading);
}

#[test]
fn token_refresh_replaces_session() {
    let mut state = AuthState::default();
    state.apply(AuthEvent::SignedIn(session_for("a@example.com")));
    let mut refreshed = session_for("a@example.com");
    refreshed.access_token = "fresh".to_owned();
    state.apply(AuthEvent::TokenRefreshed(refreshed));
    assert_eq!(state.session.map(|s| s.access_token), Some("fresh".to_owned()));
}
