//! Create/edit dialog for one menu item.
//!
//! SYSTEM CONTEXT
//! ==============
//! Renders [`ItemEditorState`] owned by the menu page. The page decides the
//! mode by how it opens the editor; this component only edits fields and runs
//! the single-flight submit.

use leptos::prelude::*;

use crate::app::AppSession;
use crate::net::types::DietType;
use crate::state::item_editor::{ItemEditorState, SubmitRequest};

const DIET_CHOICES: [DietType; 2] = [DietType::Veg, DietType::NonVeg];

#[component]
pub fn MenuItemModal(editor: RwSignal<ItemEditorState>, on_close: Callback<()>) -> impl IntoView {
    let session = expect_context::<AppSession>();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let started = editor
            .try_update(|e| e.begin_submit().map(|request| (e.generation(), request)))
            .flatten();
        let Some((generation, request)) = started else {
            return;
        };
        submit(session.clone(), editor, on_close, generation, request);
    };

    view! {
        <div class="dialog-backdrop" on:click=move |_| on_close.run(())>
            <div class="dialog dialog--item" on:click=move |ev| ev.stop_propagation()>
                <button class="dialog__close" type="button" title="Close" on:click=move |_| on_close.run(())>
                    "×"
                </button>
                <h2>{move || editor.with(ItemEditorState::title)}</h2>
                <form class="item-form" on:submit=on_submit>
                    <label class="dialog__label">
                        "Item Name *"
                        <input
                            class="dialog__input"
                            type="text"
                            name="name"
                            required
                            prop:value=move || editor.with(|e| e.form.name.clone())
                            on:input=move |ev| editor.update(|e| e.form.name = event_target_value(&ev))
                        />
                    </label>
                    <label class="dialog__label">
                        "Description *"
                        <textarea
                            class="dialog__input"
                            name="description"
                            rows="3"
                            required
                            prop:value=move || editor.with(|e| e.form.description.clone())
                            on:input=move |ev| editor.update(|e| e.form.description = event_target_value(&ev))
                        ></textarea>
                    </label>
                    <label class="dialog__label">
                        "Price ($) *"
                        <input
                            class="dialog__input"
                            type="number"
                            name="price"
                            step="0.01"
                            min="0"
                            required
                            prop:value=move || editor.with(|e| e.form.price.clone())
                            on:input=move |ev| editor.update(|e| e.form.price = event_target_value(&ev))
                        />
                    </label>
                    <fieldset class="dialog__label item-form__diet">
                        <legend>"Type *"</legend>
                        {DIET_CHOICES
                            .into_iter()
                            .map(|diet| {
                                view! {
                                    <label class="item-form__radio">
                                        <input
                                            type="radio"
                                            name="type"
                                            value=diet.as_str()
                                            prop:checked=move || editor.with(|e| e.form.diet == diet)
                                            on:change=move |_| editor.update(|e| e.form.diet = diet)
                                        />
                                        <span class=super::menu_item_card::diet_dot_class(diet)></span>
                                        <span>{diet.label()}</span>
                                    </label>
                                }
                            })
                            .collect::<Vec<_>>()}
                    </fieldset>
                    <label class="dialog__label">
                        "Image URL"
                        <input
                            class="dialog__input"
                            type="url"
                            name="image_url"
                            placeholder="https://example.com/image.jpg"
                            prop:value=move || editor.with(|e| e.form.image_url.clone())
                            on:input=move |ev| editor.update(|e| e.form.image_url = event_target_value(&ev))
                        />
                        <span class="dialog__hint">"Optional: Enter a URL to an image"</span>
                    </label>
                    <Show when=move || editor.with(|e| e.error.is_some())>
                        <p class="dialog__error">{move || editor.with(|e| e.error.clone().unwrap_or_default())}</p>
                    </Show>
                    <div class="dialog__actions">
                        <button class="btn" type="button" on:click=move |_| on_close.run(())>
                            "Cancel"
                        </button>
                        <button
                            class="btn btn--primary"
                            type="submit"
                            disabled=move || editor.with(|e| e.submitting)
                        >
                            {move || editor.with(ItemEditorState::submit_label)}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

fn submit(
    session: AppSession,
    editor: RwSignal<ItemEditorState>,
    on_close: Callback<()>,
    generation: u64,
    request: SubmitRequest,
) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let result = crate::state::item_editor::submit_request(session.backend().as_ref(), &request).await;
        if let Err(e) = &result {
            leptos::logging::warn!("menu item save failed: {e}");
        }
        if editor.try_update(|e| e.finish_submit(generation, result)) == Some(true) {
            on_close.run(());
        }
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (session, request, on_close, generation);
        editor.update(|e| e.submitting = false);
    }
}
