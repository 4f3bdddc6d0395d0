//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by concern (`auth`, `catalog`, `item_editor`) so components
//! depend on small focused models; `session` owns the identity subscription
//! that feeds `auth`.

pub mod auth;
pub mod catalog;
pub mod item_editor;
pub mod session;
