//! Email + password dialog for signing in or registering an admin account.

#[cfg(test)]
#[path = "auth_modal_test.rs"]
mod auth_modal_test;

use leptos::prelude::*;

use crate::app::AppSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Admin Login",
            Self::SignUp => "Create Admin Account",
        }
    }

    #[must_use]
    pub fn submit_label(self, busy: bool) -> &'static str {
        match (self, busy) {
            (_, true) => "Please wait...",
            (Self::SignIn, false) => "Sign In",
            (Self::SignUp, false) => "Sign Up",
        }
    }

    #[must_use]
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::SignIn => "Don't have an account? Sign up",
            Self::SignUp => "Already have an account? Sign in",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }
}

/// Trimmed email and raw password.
///
/// # Errors
///
/// Returns the inline message for blank or malformed input.
pub fn validate_credentials(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter both email and password.");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

pub const CONFIRMATION_NOTICE: &str = "Check your email to confirm your account, then sign in.";

#[component]
pub fn AuthModal(on_close: Callback<()>) -> impl IntoView {
    let session = expect_context::<AppSession>();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let mode = RwSignal::new(AuthMode::SignIn);
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let (email_value, password_value) = match validate_credentials(&email.get_untracked(), &password.get_untracked()) {
            Ok(pair) => pair,
            Err(message) => {
                error.set(Some(message.to_owned()));
                return;
            }
        };
        error.set(None);
        notice.set(None);
        busy.set(true);
        submit(
            session.clone(),
            mode.get_untracked(),
            email_value,
            password_value,
            AuthSignals { busy, error, notice, on_close },
        );
    };

    let on_toggle = move |_| {
        mode.update(|m| *m = m.toggled());
        error.set(None);
        notice.set(None);
    };

    view! {
        <div class="dialog-backdrop" on:click=move |_| on_close.run(())>
            <div class="dialog dialog--auth" on:click=move |ev| ev.stop_propagation()>
                <h2>{move || mode.get().title()}</h2>
                <form class="auth-form" on:submit=on_submit>
                    <label class="dialog__label">
                        "Email"
                        <input
                            class="dialog__input"
                            type="email"
                            required
                            placeholder="you@example.com"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                    </label>
                    <label class="dialog__label">
                        "Password"
                        <input
                            class="dialog__input"
                            type="password"
                            required
                            prop:value=move || password.get()
                            on:input=move |ev| password.set(event_target_value(&ev))
                        />
                    </label>
                    <Show when=move || error.get().is_some()>
                        <p class="dialog__error">{move || error.get().unwrap_or_default()}</p>
                    </Show>
                    <Show when=move || notice.get().is_some()>
                        <p class="dialog__notice">{move || notice.get().unwrap_or_default()}</p>
                    </Show>
                    <div class="dialog__actions">
                        <button class="btn" type="button" on:click=move |_| on_close.run(())>
                            "Cancel"
                        </button>
                        <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                            {move || mode.get().submit_label(busy.get())}
                        </button>
                    </div>
                </form>
                <button class="btn btn--link" type="button" on:click=on_toggle>
                    {move || mode.get().toggle_label()}
                </button>
            </div>
        </div>
    }
}

#[derive(Clone, Copy)]
#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
struct AuthSignals {
    busy: RwSignal<bool>,
    error: RwSignal<Option<String>>,
    notice: RwSignal<Option<String>>,
    on_close: Callback<()>,
}

fn submit(session: AppSession, mode: AuthMode, email: String, password: String, signals: AuthSignals) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        use crate::net::backend::SignUpOutcome;

        let outcome = match mode {
            AuthMode::SignIn => session.sign_in(&email, &password).await.map(|()| SignUpOutcome::SignedIn),
            AuthMode::SignUp => session.sign_up(&email, &password).await,
        };
        signals.busy.set(false);
        match outcome {
            Ok(SignUpOutcome::SignedIn) => signals.on_close.run(()),
            Ok(SignUpOutcome::ConfirmationRequired) => signals.notice.set(Some(CONFIRMATION_NOTICE.to_owned())),
            Err(e) => signals.error.set(Some(e.to_string())),
        }
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (session, mode, email, password);
        signals.busy.set(false);
    }
}
