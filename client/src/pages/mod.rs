//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (fetches, subscriptions) and
//! delegates rendering details to `components`.

pub mod menu;
