//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from state and
//! component logic so those stay testable off-browser.

pub mod clock;
