//! Create/edit form state for one menu item.
//!
//! DESIGN
//! ======
//! The editor is a plain struct driven by the modal component. Submission is
//! single-flight: `begin_submit` refuses while a request is outstanding, and
//! only `finish_submit` clears the flag. The flag survives `reopen`, so a
//! write started before the modal was closed still blocks the next one.
//!
//! Each open bumps a generation. A completion tagged with an older generation
//! releases the flag but leaves the current form, message and modal alone.

#[cfg(test)]
#[path = "item_editor_test.rs"]
mod item_editor_test;

use crate::net::backend::Backend;
use crate::net::error::BackendError;
use crate::net::types::{DietType, MenuItem, MenuItemDraft};

/// Validation failures shown inline in the modal.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Item name is required")]
    MissingName,
    #[error("Description is required")]
    MissingDescription,
    #[error("Price must be a number")]
    InvalidPrice,
    #[error("Price cannot be negative")]
    NegativePrice,
}

/// Raw field values as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub diet: DietType,
    pub image_url: String,
}

impl ItemForm {
    /// Empty fields, vegetarian.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.to_string(),
            diet: item.diet,
            image_url: item.image_url.clone().unwrap_or_default(),
        }
    }

    /// Validate and convert to the record written to the backend.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn to_draft(&self) -> Result<MenuItemDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(FormError::MissingDescription);
        }
        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidPrice)?;
        if !price.is_finite() {
            return Err(FormError::InvalidPrice);
        }
        if price < 0.0 {
            return Err(FormError::NegativePrice);
        }
        let image_url = self.image_url.trim();
        Ok(MenuItemDraft {
            name: name.to_owned(),
            description: description.to_owned(),
            price,
            diet: self.diet,
            image_url: (!image_url.is_empty()).then(|| image_url.to_owned()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { id: String },
}

/// The write a submit turns into.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitRequest {
    Insert(MenuItemDraft),
    Update { id: String, draft: MenuItemDraft },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemEditorState {
    pub mode: EditorMode,
    pub form: ItemForm,
    pub submitting: bool,
    /// Validation or backend message shown above the buttons.
    pub error: Option<String>,
    generation: u64,
}

impl ItemEditorState {
    /// Open in edit mode for `seed`, or create mode without one.
    #[must_use]
    pub fn open(seed: Option<&MenuItem>) -> Self {
        let (mode, form) = match seed {
            Some(item) => (EditorMode::Edit { id: item.id.clone() }, ItemForm::from_item(item)),
            None => (EditorMode::Create, ItemForm::blank()),
        };
        Self { mode, form, submitting: false, error: None, generation: 0 }
    }

    /// Re-open for `seed`, keeping any in-flight write.
    pub fn reopen(&mut self, seed: Option<&MenuItem>) {
        let generation = self.generation + 1;
        let submitting = self.submitting;
        *self = Self { submitting, generation, ..Self::open(seed) };
    }

    /// Tag passed back to [`Self::finish_submit`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        matches!(self.mode, EditorMode::Edit { .. })
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        if self.is_edit() { "Edit Menu Item" } else { "Add New Menu Item" }
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Saving..."
        } else if self.is_edit() {
            "Update Item"
        } else {
            "Add Item"
        }
    }

    /// Start a submit. `None` while one is in flight or when validation fails.
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        if self.submitting {
            return None;
        }
        let draft = match self.form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };
        self.error = None;
        self.submitting = true;
        Some(match &self.mode {
            EditorMode::Create => SubmitRequest::Insert(draft),
            EditorMode::Edit { id } => SubmitRequest::Update { id: id.clone(), draft },
        })
    }

    /// Record the backend's answer for the submit started in `generation`.
    ///
    /// Returns `true` when the modal should close. An answer from an earlier
    /// generation only releases the in-flight flag.
    pub fn finish_submit(&mut self, generation: u64, result: Result<(), BackendError>) -> bool {
        self.submitting = false;
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

/// Issue the write described by `request`.
///
/// # Errors
///
/// Returns the backend's rejection.
pub async fn submit_request<B: Backend + ?Sized>(backend: &B, request: &SubmitRequest) -> Result<(), BackendError> {
    match request {
        SubmitRequest::Insert(draft) => backend.insert_menu_item(draft).await,
        SubmitRequest::Update { id, draft } => backend.update_menu_item(id, draft).await,
    }
}
