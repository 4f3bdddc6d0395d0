//! Networking modules for the hosted backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `backend` defines the trait the UI depends on, `supabase` implements it
//! over `rest` (table API), `auth_api` (identity API), and `realtime`
//! (change channel), persisting the session through `session_store`.
//! `types` defines the shared wire schema.

pub mod auth_api;
pub mod backend;
pub mod config;
pub mod error;
pub mod realtime;
pub mod rest;
pub mod session_store;
pub mod supabase;
pub mod types;

#[cfg(test)]
pub(crate) mod fake_backend;
