//! Catalog list state: fetched items, filter, and delete confirmation.
//!
//! DESIGN
//! ======
//! Every fetch is tagged with a [`FetchTicket`]. A response is applied only
//! if its ticket is still the latest issued, so a slow response can never
//! overwrite a fresher one. Writes never touch `items` directly; the list
//! converges through the re-fetch that the change subscription triggers.
//!
//! ERROR HANDLING
//! ==============
//! A failed fetch keeps the previous items (empty on first load), ends the
//! loading phase, and sets `load_error`. A failed delete sets `action_error`.
//!
//! LIVE SYNC
//! =========
//! [`CatalogSync`] ties one view to the backend: every table notification
//! (and every re-join after a reconnect) asks for a full re-fetch, and
//! answers arriving after [`CatalogSync::stop`] are dropped.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::{RwSignal, Update};

use crate::net::backend::{Backend, Subscription};
use crate::net::error::BackendError;
use crate::net::types::{DietType, MENU_TABLE, MenuItem, TableEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogPhase {
    /// No fetch has completed yet.
    Loading,
    Ready,
}

/// Which items the list shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuFilter {
    #[default]
    All,
    Only(DietType),
}

impl MenuFilter {
    /// Filter buttons in display order.
    pub const CHOICES: [Self; 3] = [Self::All, Self::Only(DietType::Veg), Self::Only(DietType::NonVeg)];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Items",
            Self::Only(diet) => diet.label(),
        }
    }

    #[must_use]
    pub fn matches(self, item: &MenuItem) -> bool {
        match self {
            Self::All => true,
            Self::Only(diet) => item.diet == diet,
        }
    }
}

/// Items passing `filter`, in their original order.
#[must_use]
pub fn filter_items(items: &[MenuItem], filter: MenuFilter) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Monotonic fetch request number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogState {
    pub phase: CatalogPhase,
    pub items: Vec<MenuItem>,
    pub filter: MenuFilter,
    pub load_error: Option<String>,
    pub action_error: Option<String>,
    /// Item id awaiting delete confirmation.
    pub pending_delete: Option<String>,
    latest_ticket: u64,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            phase: CatalogPhase::Loading,
            items: Vec::new(),
            filter: MenuFilter::All,
            load_error: None,
            action_error: None,
            pending_delete: None,
            latest_ticket: 0,
        }
    }
}

impl CatalogState {
    /// Issue the ticket for a new read-all request.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        FetchTicket(self.latest_ticket)
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<MenuItem>, BackendError>) -> bool {
        if ticket.0 < self.latest_ticket {
            return false;
        }
        match result {
            Ok(items) => {
                self.items = items;
                self.load_error = None;
            }
            Err(e) => {
                leptos::logging::warn!("menu fetch failed: {e}");
                self.load_error = Some(format!("Failed to load menu: {e}"));
            }
        }
        self.phase = CatalogPhase::Ready;
        true
    }

    #[must_use]
    pub fn visible_items(&self) -> Vec<MenuItem> {
        filter_items(&self.items, self.filter)
    }

    pub fn set_filter(&mut self, filter: MenuFilter) {
        self.filter = filter;
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: &str) {
        self.pending_delete = Some(id.to_owned());
        self.action_error = None;
    }

    /// The user dismissed the confirmation; nothing happens.
    pub fn decline_delete(&mut self) {
        self.pending_delete = None;
    }

    /// The user confirmed; returns the id to delete.
    pub fn confirm_delete(&mut self) -> Option<String> {
        self.pending_delete.take()
    }

    pub fn record_delete_failure(&mut self, error: &BackendError) {
        leptos::logging::warn!("delete failed: {error}");
        self.action_error = Some(format!("Failed to delete item: {error}"));
    }

    pub fn dismiss_action_error(&mut self) {
        self.action_error = None;
    }
}

/// Owner of a [`CatalogState`] that the sync loop can update.
pub trait CatalogStore {
    /// Run `f` on the state. `None` once the owner is gone.
    fn update_catalog<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> Option<R>;
}

impl CatalogStore for RwSignal<CatalogState> {
    fn update_catalog<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> Option<R> {
        self.try_update(f)
    }
}

pub struct CatalogSync<B: ?Sized> {
    backend: Arc<B>,
    alive: Arc<AtomicBool>,
}

impl<B: ?Sized> Clone for CatalogSync<B> {
    fn clone(&self) -> Self {
        Self { backend: Arc::clone(&self.backend), alive: Arc::clone(&self.alive) }
    }
}

impl<B: Backend + ?Sized> CatalogSync<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend, alive: Arc::new(AtomicBool::new(true)) }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Stop applying fetches and forwarding notifications.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Read the whole catalog and apply it under a fresh ticket.
    pub async fn refresh(&self, store: &impl CatalogStore) {
        if !self.is_alive() {
            return;
        }
        let Some(ticket) = store.update_catalog(CatalogState::begin_fetch) else {
            return;
        };
        let result = self.backend.select_menu_items().await;
        if !self.is_alive() {
            return;
        }
        store.update_catalog(|c| c.finish_fetch(ticket, result));
    }

    /// Call `on_change` for every catalog notification until stopped.
    pub fn watch(&self, on_change: impl Fn() + Send + Sync + 'static) -> Subscription {
        let alive = Arc::clone(&self.alive);
        self.backend.subscribe_table(
            MENU_TABLE,
            Arc::new(move |event: &TableEvent| {
                if !alive.load(Ordering::Relaxed) {
                    return;
                }
                if matches!(event, TableEvent::Resubscribed) {
                    leptos::logging::log!("menu channel resubscribed; refreshing");
                }
                on_change();
            }),
        )
    }
}
