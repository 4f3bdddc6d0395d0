//! # storefront
//!
//! Leptos + WASM storefront for a live restaurant menu with an admin editor.
//!
//! This crate contains the app shell, pages, components, state machines, and
//! the hosted-backend client (table API, identity API, realtime channel).

#![recursion_limit = "256"]

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Hydration entry point for the WASM bundle.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
