//! Site header with brand, signed-in identity, and the admin login affordance.

use leptos::prelude::*;

use crate::app::AppSession;
use crate::components::auth_modal::AuthModal;
use crate::net::types::AuthUser;
use crate::state::auth::AuthState;

#[component]
pub fn Header() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<AppSession>();
    let show_login = RwSignal::new(false);

    let on_sign_out = Callback::new(move |()| sign_out(session.clone()));
    let on_login_close = Callback::new(move |()| show_login.set(false));

    let email = move || auth.with(|a| a.user().map(|u| u.display_name().to_owned()).unwrap_or_default());
    let initial = move || auth.with(|a| a.user().map(AuthUser::initial).unwrap_or_default());

    view! {
        <header class="site-header">
            <div class="site-header__inner">
                <div class="site-header__brand">
                    <div class="site-header__logo" aria-hidden="true"></div>
                    <div>
                        <h1 class="site-header__title">"Delicious Menu"</h1>
                        <p class="site-header__tagline">"Fresh food, delivered with love"</p>
                    </div>
                </div>
                <div class="site-header__actions">
                    <Show
                        when=move || auth.with(AuthState::is_admin)
                        fallback=move || {
                            view! {
                                <button class="btn btn--primary" on:click=move |_| show_login.set(true)>
                                    "Admin Login"
                                </button>
                            }
                        }
                    >
                        <div class="site-header__user">
                            <span class="site-header__avatar">{initial}</span>
                            <span class="site-header__email">{email}</span>
                        </div>
                        <button class="btn btn--danger" on:click=move |_| on_sign_out.run(())>
                            "Sign Out"
                        </button>
                    </Show>
                </div>
            </div>
        </header>
        <Show when=move || show_login.get() && !auth.with(AuthState::is_admin)>
            <AuthModal on_close=on_login_close/>
        </Show>
    }
}

fn sign_out(session: AppSession) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        if let Err(e) = session.sign_out().await {
            leptos::logging::warn!("sign out failed: {e}");
        }
    });
    #[cfg(not(feature = "hydrate"))]
    let _ = session;
}
