//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the storefront chrome and dialogs while reading shared
//! auth state and the session holder from Leptos context providers.

pub mod auth_modal;
pub mod delete_item_dialog;
pub mod header;
pub mod menu_item_card;
pub mod menu_item_modal;
