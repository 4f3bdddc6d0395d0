//! Menu page: live catalog list with filters and admin editing.
//!
//! SYSTEM CONTEXT
//! ==============
//! On mount the page fetches the catalog and subscribes to `menu_items`
//! changes; every notification triggers a full re-fetch. Writes go straight
//! to the backend and the list converges through that re-fetch. The
//! subscription and any in-flight fetch are cut off on cleanup.

use std::sync::Arc;

use leptos::prelude::*;

use crate::app::AppSession;
use crate::components::delete_item_dialog::DeleteItemDialog;
use crate::components::menu_item_card::MenuItemCard;
use crate::components::menu_item_modal::MenuItemModal;
use crate::net::backend::Backend;
use crate::net::types::{DietType, MenuItem};
use crate::state::auth::AuthState;
use crate::state::catalog::{CatalogPhase, CatalogState, CatalogSync, MenuFilter};
use crate::state::item_editor::ItemEditorState;

#[component]
pub fn MenuPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let session = expect_context::<AppSession>();
    let catalog = RwSignal::new(CatalogState::default());
    let editor = RwSignal::new(ItemEditorState::open(None));
    let modal_open = RwSignal::new(false);

    let backend = Arc::clone(session.backend());
    let sync = CatalogSync::new(Arc::clone(&backend));
    refetch(sync.clone(), catalog);

    let watcher = sync.clone();
    let subscription = sync.watch(move || refetch(watcher.clone(), catalog));
    on_cleanup(move || {
        sync.stop();
        subscription.release();
    });

    let is_admin = Signal::derive(move || auth.with(AuthState::is_admin));

    let open_editor = move |seed: Option<&MenuItem>| {
        editor.update(|e| e.reopen(seed));
        modal_open.set(true);
    };
    let on_add = move |_| open_editor(None);
    let on_edit = Callback::new(move |item: MenuItem| open_editor(Some(&item)));
    let on_modal_close = Callback::new(move |()| modal_open.set(false));

    let on_delete_request = Callback::new(move |id: String| catalog.update(|c| c.request_delete(&id)));
    let on_delete_cancel = Callback::new(move |()| catalog.update(CatalogState::decline_delete));
    let on_delete_confirm = Callback::new(move |()| {
        let Some(id) = catalog.try_update(CatalogState::confirm_delete).flatten() else {
            return;
        };
        delete_item(Arc::clone(&backend), catalog, id);
    });

    view! {
        <main class="menu-page">
            <div class="menu-page__toolbar">
                <div class="menu-filters">
                    {MenuFilter::CHOICES
                        .into_iter()
                        .map(|choice| {
                            view! {
                                <button
                                    class=move || filter_button_class(choice, catalog.with(|c| c.filter) == choice)
                                    on:click=move |_| catalog.update(|c| c.set_filter(choice))
                                >
                                    {filter_dot(choice)}
                                    {choice.label()}
                                </button>
                            }
                        })
                        .collect::<Vec<_>>()}
                </div>
                <Show when=move || is_admin.get()>
                    <button class="btn btn--success menu-page__add" on:click=on_add>
                        "+ Add New Item"
                    </button>
                </Show>
            </div>

            <Show when=move || catalog.with(|c| c.load_error.is_some())>
                <p class="menu-page__error">{move || catalog.with(|c| c.load_error.clone().unwrap_or_default())}</p>
            </Show>
            <Show when=move || catalog.with(|c| c.action_error.is_some())>
                <p class="menu-page__error">
                    {move || catalog.with(|c| c.action_error.clone().unwrap_or_default())}
                    <button class="btn btn--link" on:click=move |_| catalog.update(CatalogState::dismiss_action_error)>
                        "Dismiss"
                    </button>
                </p>
            </Show>

            <Show
                when=move || catalog.with(|c| c.phase == CatalogPhase::Ready)
                fallback=|| view! { <div class="menu-page__spinner" aria-label="Loading"></div> }
            >
                {move || {
                    let items = catalog.with(CatalogState::visible_items);
                    if items.is_empty() {
                        view! { <p class="menu-page__empty">"No menu items found"</p> }.into_any()
                    } else {
                        view! {
                            <div class="menu-grid">
                                {items
                                    .into_iter()
                                    .map(|item| {
                                        view! {
                                            <MenuItemCard
                                                item=item
                                                is_admin=is_admin
                                                on_edit=on_edit
                                                on_delete=on_delete_request
                                            />
                                        }
                                    })
                                    .collect::<Vec<_>>()}
                            </div>
                        }
                            .into_any()
                    }
                }}
            </Show>

            <Show when=move || modal_open.get()>
                <MenuItemModal editor=editor on_close=on_modal_close/>
            </Show>
            <Show when=move || catalog.with(|c| c.pending_delete.is_some())>
                <DeleteItemDialog on_cancel=on_delete_cancel on_confirm=on_delete_confirm/>
            </Show>
        </main>
    }
}

fn filter_button_class(choice: MenuFilter, active: bool) -> &'static str {
    match (choice, active) {
        (MenuFilter::All, true) => "btn menu-filters__button menu-filters__button--active",
        (MenuFilter::Only(DietType::Veg), true) => "btn menu-filters__button menu-filters__button--veg",
        (MenuFilter::Only(DietType::NonVeg), true) => "btn menu-filters__button menu-filters__button--nonveg",
        (_, false) => "btn menu-filters__button",
    }
}

fn filter_dot(choice: MenuFilter) -> Option<impl IntoView> {
    match choice {
        MenuFilter::All => None,
        MenuFilter::Only(diet) => Some(view! { <span class=crate::components::menu_item_card::diet_dot_class(diet)></span> }),
    }
}

/// Re-read the catalog in the background.
fn refetch<B: Backend + ?Sized + 'static>(sync: CatalogSync<B>, catalog: RwSignal<CatalogState>) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        sync.refresh(&catalog).await;
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (sync, catalog);
    }
}

fn delete_item<B: Backend + 'static>(backend: Arc<B>, catalog: RwSignal<CatalogState>, id: String) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        if let Err(e) = backend.delete_menu_item(&id).await {
            let _ = catalog.try_update(|c| c.record_delete_failure(&e));
        }
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (backend, catalog, id);
    }
}
