use std::sync::Mutex;

use futures::executor::block_on;

use super::*;
use crate::net::fake_backend::{FakeBackend, PASSWORD, session_for};
use crate::state::auth::AuthState;

fn recording() -> (Arc<Mutex<AuthState>>, impl Fn(&AuthEvent) + Send + Sync + 'static) {
    let state = Arc::new(Mutex::new(AuthState::default()));
    let sink = Arc::clone(&state);
    (state, move |event: &AuthEvent| sink.lock().unwrap().apply(event.clone()))
}

#[test]
fn init_publishes_existing_session() {
    let backend = FakeBackend::new();
    backend.set_session(Some(session_for("chef@example.com")));
    let holder = SessionHolder::new(Arc::clone(&backend));
    let (state, publish) = recording();

    block_on(holder.init(publish));

    let state = state.lock().unwrap();
    assert!(!state.loading);
    assert!(state.is_admin());
    assert_eq!(backend.auth_listener_count(), 1);
}

#[test]
fn init_failure_publishes_signed_out() {
    let backend = FakeBackend::new();
    backend.fail_get_session(Some(BackendError::Transport("offline".to_owned())));
    let holder = SessionHolder::new(Arc::clone(&backend));
    let (state, publish) = recording();

    block_on(holder.init(publish));

    let state = state.lock().unwrap();
    assert!(!state.loading);
    assert!(!state.is_admin());
}

#[test]
fn later_transitions_are_republished() {
    let backend = FakeBackend::new();
    let holder = SessionHolder::new(Arc::clone(&backend));
    let (state, publish) = recording();
    block_on(holder.init(publish));

    block_on(holder.sign_in("chef@example.com", PASSWORD)).unwrap();
    assert!(state.lock().unwrap().is_admin());

    block_on(holder.sign_out()).unwrap();
    assert!(!state.lock().unwrap().is_admin());
}

#[test]
fn sign_in_rejection_is_returned_verbatim() {
    let backend = FakeBackend::new();
    let holder = SessionHolder::new(Arc::clone(&backend));
    let (state, publish) = recording();
    block_on(holder.init(publish));

    let err = block_on(holder.sign_in("chef@example.com", "wrong")).unwrap_err();
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(!state.lock().unwrap().is_admin());
}

#[test]
fn sign_up_reports_confirmation_requirement() {
    let backend = FakeBackend::new();
    backend.require_confirmation(true);
    let holder = SessionHolder::new(Arc::clone(&backend));
    assert_eq!(
        block_on(holder.sign_up("new@example.com", "pw")),
        Ok(SignUpOutcome::ConfirmationRequired)
    );

    backend.require_confirmation(false);
    assert_eq!(block_on(holder.sign_up("new@example.com", "pw")), Ok(SignUpOutcome::SignedIn));
}

#[test]
fn teardown_releases_listener() {
    let backend = FakeBackend::new();
    let holder = SessionHolder::new(Arc::clone(&backend));
    let (state, publish) = recording();
    block_on(holder.init(publish));
    assert_eq!(backend.auth_listener_count(), 1);

    holder.teardown();
    assert_eq!(backend.auth_listener_count(), 0);

    backend.emit_auth(&AuthEvent::SignedIn(session_for("late@example.com")));
    assert!(!state.lock().unwrap().is_admin());
}

#[test]
fn teardown_before_init_is_harmless() {
    let holder = SessionHolder::new(FakeBackend::new());
    holder.teardown();
    holder.teardown();
}

#[test]
fn reinit_replaces_previous_listener() {
    let backend = FakeBackend::new();
    let holder = SessionHolder::new(Arc::clone(&backend));
    block_on(holder.init(|_: &AuthEvent| {}));
    block_on(holder.init(|_: &AuthEvent| {}));
    assert_eq!(backend.auth_listener_count(), 1);
}
