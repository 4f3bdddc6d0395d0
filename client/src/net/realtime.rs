//! Realtime table-change channel over the backend's Phoenix websocket.
//!
//! The channel joins `realtime:<name>` with a `postgres_changes` filter for
//! every event on one table, forwards each change to the listener, keeps the
//! socket alive with heartbeats, and reconnects with exponential backoff.
//! Auth transitions push the new access token to a joined channel.
//!
//! All socket logic is gated behind `#[cfg(feature = "hydrate")]`; message
//! construction and parsing are plain functions.
//!
//! ERROR HANDLING
//! ==============
//! Parse/transport failures are logged and end the current connection; the
//! reconnect loop runs until the subscription is released.

#[cfg(test)]
#[path = "realtime_test.rs"]
mod realtime_test;

use serde::{Deserialize, Serialize};

use super::config::BackendConfig;
use super::types::{AuthEvent, ChangeEvent};

/// Channel name used for the catalog subscription.
pub const CHANNEL_NAME: &str = "menu_changes";
pub const HEARTBEAT_INTERVAL_MS: u64 = 25_000;
pub const MIN_BACKOFF_MS: u32 = 1_000;
pub const MAX_BACKOFF_MS: u32 = 10_000;

const PHOENIX_TOPIC: &str = "phoenix";

/// One Phoenix channel message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    pub payload: serde_json::Value,
    #[serde(rename = "ref")]
    pub msg_ref: Option<String>,
    #[serde(default)]
    pub join_ref: Option<String>,
}

/// Inbound messages the channel reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    /// The server accepted our join.
    Joined,
    /// The server refused our join; the payload carries the reason.
    JoinRejected(String),
    Change(ChangeEvent),
    /// The server closed or errored the channel.
    Closed,
    /// Heartbeat replies, presence, system notices, other topics.
    Ignored,
}

/// `wss://<host>/realtime/v1/websocket?apikey=...&vsn=1.0.0`
pub fn socket_url(config: &BackendConfig) -> String {
    let mut url = config.endpoint("/realtime/v1/websocket");
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    if url.set_scheme(scheme).is_err() {
        leptos::logging::warn!("cannot switch {url} to {scheme}");
    }
    url.query_pairs_mut()
        .append_pair("apikey", config.anon_key())
        .append_pair("vsn", "1.0.0");
    url.into()
}

pub fn channel_topic(name: &str) -> String {
    format!("realtime:{name}")
}

/// Join request subscribing to every change event on `public.<table>`.
pub fn join_message(topic: &str, table: &str, access_token: &str, join_ref: &str) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_owned(),
        event: "phx_join".to_owned(),
        payload: serde_json::json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": table }
                ],
                "private": false
            },
            "access_token": access_token
        }),
        msg_ref: Some(join_ref.to_owned()),
        join_ref: Some(join_ref.to_owned()),
    }
}

pub fn heartbeat_message(msg_ref: &str) -> PhoenixMessage {
    PhoenixMessage {
        topic: PHOENIX_TOPIC.to_owned(),
        event: "heartbeat".to_owned(),
        payload: serde_json::json!({}),
        msg_ref: Some(msg_ref.to_owned()),
        join_ref: None,
    }
}

pub fn leave_message(topic: &str, join_ref: Option<&str>, msg_ref: &str) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_owned(),
        event: "phx_leave".to_owned(),
        payload: serde_json::json!({}),
        msg_ref: Some(msg_ref.to_owned()),
        join_ref: join_ref.map(str::to_owned),
    }
}

/// Re-authorize a joined channel with `access_token`.
pub fn access_token_message(topic: &str, access_token: &str, join_ref: &str, msg_ref: &str) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_owned(),
        event: "access_token".to_owned(),
        payload: serde_json::json!({ "access_token": access_token }),
        msg_ref: Some(msg_ref.to_owned()),
        join_ref: Some(join_ref.to_owned()),
    }
}

/// Token a joined channel should switch to after `event`.
pub fn token_after<'a>(event: &'a AuthEvent, anon_key: &'a str) -> Option<&'a str> {
    match event {
        AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => Some(&session.access_token),
        AuthEvent::SignedOut => Some(anon_key),
        AuthEvent::InitialSession(_) => None,
    }
}

/// Classify a raw text frame for the channel `topic` joined with `join_ref`.
pub fn parse_inbound(text: &str, topic: &str, join_ref: &str) -> Inbound {
    let Ok(msg) = serde_json::from_str::<PhoenixMessage>(text) else {
        return Inbound::Ignored;
    };
    if msg.topic != topic {
        return Inbound::Ignored;
    }
    match msg.event.as_str() {
        "phx_reply" if msg.msg_ref.as_deref() == Some(join_ref) => {
            let status = msg
                .payload
                .get("status")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            if status == "ok" {
                Inbound::Joined
            } else {
                Inbound::JoinRejected(msg.payload.get("response").map_or_else(String::new, ToString::to_string))
            }
        }
        "postgres_changes" => msg
            .payload
            .get("data")
            .cloned()
            .and_then(|data| serde_json::from_value::<ChangeEvent>(data).ok())
            .map_or(Inbound::Ignored, Inbound::Change),
        "phx_close" | "phx_error" => Inbound::Closed,
        _ => Inbound::Ignored,
    }
}

/// Double the delay, capped at [`MAX_BACKOFF_MS`].
pub fn next_backoff(current_ms: u32) -> u32 {
    current_ms.saturating_mul(2).min(MAX_BACKOFF_MS)
}

/// Subscribe `listener` to changes on `table` until the handle is released.
#[cfg(feature = "hydrate")]
pub(crate) fn subscribe(
    config: &BackendConfig,
    table: &str,
    session: std::sync::Arc<std::sync::RwLock<Option<super::types::Session>>>,
    auth_events: &super::backend::ListenerSet<AuthEvent>,
    listener: super::backend::TableListener,
) -> super::backend::Subscription {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    let (tx, rx) = futures::channel::mpsc::unbounded::<String>();
    let alive = Arc::new(AtomicBool::new(true));
    let refs = Arc::new(AtomicU64::new(1));
    let joined_ref = Arc::new(AtomicU64::new(0));
    let topic = channel_topic(CHANNEL_NAME);

    let channel = Channel {
        url: socket_url(config),
        anon_key: config.anon_key().to_owned(),
        topic: topic.clone(),
        table: table.to_owned(),
        session,
        listener,
        alive: Arc::clone(&alive),
        refs: Arc::clone(&refs),
        joined_ref: Arc::clone(&joined_ref),
        tx: tx.clone(),
    };
    leptos::task::spawn_local(channel.run(rx));

    let token_sub = {
        let tx = tx.clone();
        let topic = topic.clone();
        let refs = Arc::clone(&refs);
        let joined_ref = Arc::clone(&joined_ref);
        let anon_key = config.anon_key().to_owned();
        auth_events.add(Arc::new(move |event: &AuthEvent| {
            // Before the join is acknowledged the join itself carries the token.
            let join_ref = joined_ref.load(Ordering::Relaxed);
            let Some(token) = token_after(event, &anon_key).filter(|_| join_ref != 0) else {
                return;
            };
            let msg_ref = refs.fetch_add(1, Ordering::Relaxed).to_string();
            let message = access_token_message(&topic, token, &join_ref.to_string(), &msg_ref);
            if let Ok(text) = serde_json::to_string(&message) {
                let _ = tx.unbounded_send(text);
            }
        }))
    };

    super::backend::Subscription::new(move || {
        token_sub.release();
        alive.store(false, Ordering::Relaxed);
        let join_ref = joined_ref.load(Ordering::Relaxed);
        let join_ref = (join_ref != 0).then(|| join_ref.to_string());
        let msg_ref = refs.fetch_add(1, Ordering::Relaxed).to_string();
        if let Ok(text) = serde_json::to_string(&leave_message(&topic, join_ref.as_deref(), &msg_ref)) {
            let _ = tx.unbounded_send(text);
        }
        tx.close_channel();
    })
}

#[cfg(feature = "hydrate")]
struct Channel {
    url: String,
    anon_key: String,
    topic: String,
    table: String,
    session: std::sync::Arc<std::sync::RwLock<Option<super::types::Session>>>,
    listener: super::backend::TableListener,
    alive: std::sync::Arc<std::sync::atomic::AtomicBool>,
    refs: std::sync::Arc<std::sync::atomic::AtomicU64>,
    joined_ref: std::sync::Arc<std::sync::atomic::AtomicU64>,
    tx: futures::channel::mpsc::UnboundedSender<String>,
}

#[cfg(feature = "hydrate")]
impl Channel {
    fn is_alive(&self) -> bool {
        self.alive.load(std::sync::atomic::Ordering::Relaxed)
    }

    fn next_ref(&self) -> u64 {
        self.refs.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }

    fn access_token(&self) -> String {
        self.session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map_or_else(|| self.anon_key.clone(), |s| s.access_token.clone())
    }

    /// Connection loop with reconnect logic.
    async fn run(self, rx: futures::channel::mpsc::UnboundedReceiver<String>) {
        use std::cell::RefCell;
        use std::rc::Rc;

        let rx = Rc::new(RefCell::new(rx));
        let mut backoff_ms = MIN_BACKOFF_MS;
        let mut joined_before = false;

        while self.is_alive() {
            match self.connect_and_run(&rx, joined_before).await {
                Ok(joined) => {
                    if joined {
                        joined_before = true;
                        backoff_ms = MIN_BACKOFF_MS;
                    }
                    leptos::logging::log!("realtime channel {} closed", self.topic);
                }
                Err(e) => leptos::logging::warn!("realtime channel {} error: {e}", self.topic),
            }
            self.joined_ref.store(0, std::sync::atomic::Ordering::Relaxed);
            if !self.is_alive() {
                break;
            }
            gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(backoff_ms))).await;
            backoff_ms = next_backoff(backoff_ms);
        }
    }

    /// Join the channel and pump messages until either side closes.
    ///
    /// Returns whether the join was acknowledged.
    async fn connect_and_run(
        &self,
        rx: &std::rc::Rc<std::cell::RefCell<futures::channel::mpsc::UnboundedReceiver<String>>>,
        joined_before: bool,
    ) -> Result<bool, String> {
        use futures::{SinkExt, StreamExt};
        use gloo_net::websocket::Message;
        use gloo_net::websocket::futures::WebSocket;
        use std::cell::Cell;
        use std::sync::atomic::Ordering;

        let ws = WebSocket::open(&self.url).map_err(|e| e.to_string())?;
        let (mut ws_write, mut ws_read) = ws.split();

        let join_ref = self.next_ref();
        let join_ref_text = join_ref.to_string();
        let join = join_message(&self.topic, &self.table, &self.access_token(), &join_ref_text);
        let join_text = serde_json::to_string(&join).map_err(|e| e.to_string())?;
        ws_write
            .send(Message::Text(join_text))
            .await
            .map_err(|e| e.to_string())?;

        let joined = Cell::new(false);

        let mut rx_borrow = rx.borrow_mut();
        let send_task = async {
            while let Some(text) = rx_borrow.next().await {
                if ws_write.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        };

        let heartbeat_task = async {
            loop {
                gloo_timers::future::sleep(std::time::Duration::from_millis(HEARTBEAT_INTERVAL_MS)).await;
                let msg_ref = self.next_ref().to_string();
                let Ok(text) = serde_json::to_string(&heartbeat_message(&msg_ref)) else {
                    break;
                };
                if self.tx.unbounded_send(text).is_err() {
                    break;
                }
            }
        };

        let recv_task = async {
            while let Some(msg) = ws_read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match parse_inbound(&text, &self.topic, &join_ref_text) {
                        Inbound::Joined => {
                            self.joined_ref.store(join_ref, Ordering::Relaxed);
                            if joined_before && self.is_alive() {
                                (self.listener)(&super::types::TableEvent::Resubscribed);
                            }
                            joined.set(true);
                        }
                        Inbound::JoinRejected(reason) => {
                            leptos::logging::warn!("realtime join rejected: {reason}");
                            break;
                        }
                        Inbound::Change(change) => {
                            if change.table == self.table && self.is_alive() {
                                (self.listener)(&super::types::TableEvent::Changed(change));
                            }
                        }
                        Inbound::Closed => break,
                        Inbound::Ignored => {}
                    },
                    Ok(Message::Bytes(_)) => {}
                    Err(e) => {
                        leptos::logging::warn!("realtime recv error: {e}");
                        break;
                    }
                }
            }
        };

        futures::future::select(
            Box::pin(send_task),
            Box::pin(futures::future::select(Box::pin(recv_task), Box::pin(heartbeat_task))),
        )
        .await;

        Ok(joined.get())
    }
}
