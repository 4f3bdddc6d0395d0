//! One catalog entry: image, diet badge, name, price, description, and the
//! admin-only edit/delete actions.

#[cfg(test)]
#[path = "menu_item_card_test.rs"]
mod menu_item_card_test;

use leptos::prelude::*;

use crate::net::types::{DietType, MenuItem};

/// Price with a dollar sign and two decimals.
#[must_use]
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

#[must_use]
pub fn diet_dot_class(diet: DietType) -> &'static str {
    match diet {
        DietType::Veg => "diet-dot diet-dot--veg",
        DietType::NonVeg => "diet-dot diet-dot--nonveg",
    }
}

#[component]
pub fn MenuItemCard(
    item: MenuItem,
    is_admin: Signal<bool>,
    on_edit: Callback<MenuItem>,
    on_delete: Callback<String>,
) -> impl IntoView {
    let price = format_price(item.price);
    let diet = item.diet;
    let name = item.name.clone();
    let description = item.description.clone();
    let image = item.image_url.clone().map(|url| (url, item.name.clone()));
    let stored = StoredValue::new(item);

    view! {
        <article class="menu-card">
            <div class="menu-card__image">
                {match image {
                    Some((src, alt)) => view! { <img class="menu-card__img" src=src alt=alt/> }.into_any(),
                    None => view! { <div class="menu-card__placeholder" aria-hidden="true"></div> }.into_any(),
                }}
            </div>
            <div class="menu-card__body">
                <div class="menu-card__heading">
                    <span class=diet_dot_class(diet) title=diet.label()></span>
                    <h3 class="menu-card__name">{name}</h3>
                    <span class="menu-card__price">{price}</span>
                </div>
                <p class="menu-card__description">{description}</p>
                <Show when=move || is_admin.get()>
                    <div class="menu-card__actions">
                        <button class="btn btn--primary" on:click=move |_| on_edit.run(stored.get_value())>
                            "Edit"
                        </button>
                        <button
                            class="btn btn--danger"
                            on:click=move |_| on_delete.run(stored.with_value(|i| i.id.clone()))
                        >
                            "Delete"
                        </button>
                    </div>
                </Show>
            </div>
        </article>
    }
}
