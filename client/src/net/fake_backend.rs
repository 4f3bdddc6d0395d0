//! In-memory [`Backend`] for state-machine tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::backend::{AuthListener, Backend, ListenerSet, SignUpOutcome, Subscription, TableListener};
use super::error::BackendError;
use super::types::{
    AuthEvent, AuthUser, ChangeEvent, ChangeKind, MENU_TABLE, MenuItem, MenuItemDraft, Session, TableEvent,
};

pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct FakeBackend {
    rows: Mutex<Vec<MenuItem>>,
    next_id: AtomicU64,
    writes: AtomicUsize,
    selects: AtomicUsize,
    session: Mutex<Option<Session>>,
    fail_select: Mutex<Option<BackendError>>,
    fail_writes: Mutex<Option<BackendError>>,
    fail_get_session: Mutex<Option<BackendError>>,
    confirm_sign_ups: Mutex<bool>,
    during_select: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
    table_events: ListenerSet<TableEvent>,
    auth_events: ListenerSet<AuthEvent>,
}

pub fn session_for(email: &str) -> Session {
    Session {
        access_token: format!("token-{email}"),
        refresh_token: Some("refresh".to_owned()),
        expires_in: Some(3600),
        expires_at: None,
        user: AuthUser { id: format!("user-{email}"), email: Some(email.to_owned()) },
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a row as if inserted by someone else, without notifying.
    pub fn seed(&self, draft: &MenuItemDraft) -> String {
        let item = self.materialize(draft);
        let id = item.id.clone();
        self.rows.lock().unwrap().push(item);
        id
    }

    pub fn rows(&self) -> Vec<MenuItem> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn table_listener_count(&self) -> usize {
        self.table_events.len()
    }

    pub fn auth_listener_count(&self) -> usize {
        self.auth_events.len()
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap() = session;
    }

    pub fn fail_select(&self, error: Option<BackendError>) {
        *self.fail_select.lock().unwrap() = error;
    }

    pub fn fail_writes(&self, error: Option<BackendError>) {
        *self.fail_writes.lock().unwrap() = error;
    }

    pub fn fail_get_session(&self, error: Option<BackendError>) {
        *self.fail_get_session.lock().unwrap() = error;
    }

    pub fn require_confirmation(&self, required: bool) {
        *self.confirm_sign_ups.lock().unwrap() = required;
    }

    /// Run `hook` while a select is outstanding, before it answers.
    pub fn during_select(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.during_select.lock().unwrap() = Some(Box::new(hook));
    }

    /// Emit an auth event as the identity service would.
    pub fn emit_auth(&self, event: &AuthEvent) {
        self.auth_events.emit(event);
    }

    pub fn emit_table(&self, event: &TableEvent) {
        self.table_events.emit(event);
    }

    fn materialize(&self, draft: &MenuItemDraft) -> MenuItem {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        MenuItem {
            id: format!("item-{n}"),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            diet: draft.diet,
            image_url: draft.image_url.clone(),
            created_at: Some(format!("2026-01-01T00:00:00.{n:06}Z")),
        }
    }

    fn check_write(&self) -> Result<(), BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        match self.fail_writes.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn notify(&self, kind: ChangeKind, record: Option<&MenuItem>) {
        let change = ChangeEvent {
            kind,
            table: MENU_TABLE.to_owned(),
            schema: Some("public".to_owned()),
            record: record.and_then(|item| serde_json::to_value(item).ok()),
            old_record: None,
        };
        self.table_events.emit(&TableEvent::Changed(change));
    }
}

#[async_trait::async_trait(?Send)]
impl Backend for FakeBackend {
    async fn select_menu_items(&self) -> Result<Vec<MenuItem>, BackendError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.during_select.lock().unwrap().as_ref() {
            hook();
        }
        if let Some(error) = self.fail_select.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.rows())
    }

    async fn insert_menu_item(&self, draft: &MenuItemDraft) -> Result<(), BackendError> {
        self.check_write()?;
        let item = self.materialize(draft);
        self.rows.lock().unwrap().push(item.clone());
        self.notify(ChangeKind::Insert, Some(&item));
        Ok(())
    }

    async fn update_menu_item(&self, id: &str, draft: &MenuItemDraft) -> Result<(), BackendError> {
        self.check_write()?;
        let updated = {
            let mut rows = self.rows.lock().unwrap();
            rows.iter_mut().find(|row| row.id == id).map(|row| {
                row.name.clone_from(&draft.name);
                row.description.clone_from(&draft.description);
                row.price = draft.price;
                row.diet = draft.diet;
                row.image_url.clone_from(&draft.image_url);
                row.clone()
            })
        };
        if let Some(item) = updated {
            self.notify(ChangeKind::Update, Some(&item));
        }
        Ok(())
    }

    async fn delete_menu_item(&self, id: &str) -> Result<(), BackendError> {
        self.check_write()?;
        let removed = {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            rows.len() != before
        };
        if removed {
            self.notify(ChangeKind::Delete, None);
        }
        Ok(())
    }

    fn subscribe_table(&self, table: &str, listener: TableListener) -> Subscription {
        assert_eq!(table, MENU_TABLE);
        self.table_events.add(listener)
    }

    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        if let Some(error) = self.fail_get_session.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.session.lock().unwrap().clone())
    }

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription {
        self.auth_events.add(listener)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        if password != PASSWORD {
            return Err(BackendError::Auth { status: 400, message: "Invalid login credentials".to_owned() });
        }
        let session = session_for(email);
        self.set_session(Some(session.clone()));
        self.auth_events
            .emit(&AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome, BackendError> {
        if *self.confirm_sign_ups.lock().unwrap() {
            return Ok(SignUpOutcome::ConfirmationRequired);
        }
        let session = session_for(email);
        self.set_session(Some(session.clone()));
        self.auth_events.emit(&AuthEvent::SignedIn(session));
        Ok(SignUpOutcome::SignedIn)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.set_session(None);
        self.auth_events.emit(&AuthEvent::SignedOut);
        Ok(())
    }
}
