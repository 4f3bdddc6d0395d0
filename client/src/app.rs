//! Root application component, SSR shell, and context providers.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::header::Header;
use crate::net::config::{BackendConfig, ConfigError, META_ANON_KEY, META_BACKEND_URL};
use crate::net::supabase::SupabaseClient;
use crate::pages::menu::MenuPage;
use crate::state::auth::AuthState;
use crate::state::session::SessionHolder;

/// Session holder shared through context.
pub type AppSession = Arc<SessionHolder<SupabaseClient>>;

/// HTML shell rendered on the server for SSR + hydration.
///
/// The backend endpoint and public key travel to the browser as `<meta>`
/// tags; the server provides [`BackendConfig`] through context.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    let (url, anon_key) = use_context::<BackendConfig>()
        .map(|c| (c.url().to_owned(), c.anon_key().to_owned()))
        .unwrap_or_default();
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <meta name=META_BACKEND_URL content=url/>
                <meta name=META_ANON_KEY content=anon_key/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Routing is unconditional so the server can enumerate routes without a
/// backend configuration in context.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/menuboard.css"/>
        <Title text="Delicious Menu"/>

        <div class="app">
            <Router>
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=StorefrontRoute/>
                </Routes>
            </Router>
            <footer class="site-footer">
                <p>"Made with Rust, Leptos, and Supabase"</p>
            </footer>
        </div>
    }
}

/// Resolves the backend configuration, or explains why it is missing.
#[component]
fn StorefrontRoute() -> impl IntoView {
    match use_context::<BackendConfig>().map_or_else(browser_config, Ok) {
        Ok(config) => view! { <Storefront config=config/> }.into_any(),
        Err(e) => {
            leptos::logging::error!("backend configuration unavailable: {e}");
            view! {
                <div class="config-error">
                    <h1>"Menu unavailable"</h1>
                    <p>{e.to_string()}</p>
                </div>
            }
                .into_any()
        }
    }
}

fn browser_config() -> Result<BackendConfig, ConfigError> {
    #[cfg(feature = "hydrate")]
    {
        BackendConfig::from_document()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(ConfigError::MissingVar { var: "SUPABASE_URL".to_owned() })
    }
}

/// Builds the backend client and session holder, and ties the holder's
/// lifetime to this component.
#[component]
fn Storefront(config: BackendConfig) -> impl IntoView {
    let client = Arc::new(SupabaseClient::new(config));
    let session: AppSession = Arc::new(SessionHolder::new(client));
    let auth = RwSignal::new(AuthState::default());

    provide_context(auth);
    provide_context(Arc::clone(&session));

    #[cfg(feature = "hydrate")]
    {
        let holder = Arc::clone(&session);
        leptos::task::spawn_local(async move {
            holder
                .init(move |event: &crate::net::types::AuthEvent| {
                    let _ = auth.try_update(|a| a.apply(event.clone()));
                })
                .await;
        });
    }
    on_cleanup(move || session.teardown());

    view! {
        <Header/>
        <MenuPage/>
    }
}
