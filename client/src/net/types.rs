//! Wire DTOs for the hosted backend's table, identity, and realtime APIs.
//!
//! DESIGN
//! ======
//! These types mirror the backend's JSON payloads so serde round-trips stay
//! lossless. Table rows use the `menu_items` column names verbatim.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Backend table holding the catalog.
pub const MENU_TABLE: &str = "menu_items";

/// Dietary tag for a menu item. Exactly one of two values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietType {
    /// Vegetarian; the creation form default.
    #[default]
    #[serde(rename = "veg")]
    Veg,
    /// Non-vegetarian.
    #[serde(rename = "nonveg")]
    NonVeg,
}

impl DietType {
    /// Wire value stored in the `type` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Veg => "veg",
            Self::NonVeg => "nonveg",
        }
    }

    /// Human label for badges and filter buttons.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Veg => "Vegetarian",
            Self::NonVeg => "Non-Vegetarian",
        }
    }

    /// Parse a wire value, as carried by radio inputs.
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "veg" => Some(Self::Veg),
            "nonveg" => Some(Self::NonVeg),
            _ => None,
        }
    }
}

/// One catalog entry as stored in `menu_items`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Backend-assigned identifier. Numeric keys are carried as strings.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    /// A `null` column reads as empty.
    #[serde(default, deserialize_with = "deserialize_description")]
    pub description: String,
    /// Non-negative price. `numeric` columns may arrive as strings.
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(rename = "type")]
    pub diet: DietType,
    /// Optional image reference; never an empty string.
    #[serde(default, deserialize_with = "deserialize_image_url")]
    pub image_url: Option<String>,
    /// Backend-assigned creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Plain record written by insert and update requests.
///
/// `image_url` serializes as explicit `null` when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItemDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub diet: DietType,
    pub image_url: Option<String>,
}

/// The signed-in principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    /// Display name used by the header; falls back to the user id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }

    /// Uppercased first character for the avatar badge.
    #[must_use]
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// Identity-service session, persisted in browser storage between loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds. Derived from `expires_in` when the server omits it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    /// Fill `expires_at` from `expires_in` relative to `now_secs`.
    #[must_use]
    pub fn stamped(mut self, now_secs: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|secs| now_secs + secs);
        }
        self
    }

    /// Whether the access token expires within `margin_secs` of `now_secs`.
    #[must_use]
    pub fn expires_within(&self, now_secs: i64, margin_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|at| at - margin_secs <= now_secs)
    }
}

/// Auth-state transitions published by the identity client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// Result of the startup session query.
    InitialSession(Option<Session>),
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

/// Kind of row change carried by a realtime notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-change notification for a subscribed table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub record: Option<serde_json::Value>,
    #[serde(default)]
    pub old_record: Option<serde_json::Value>,
}

/// Events delivered to a table subscription listener.
#[derive(Clone, Debug, PartialEq)]
pub enum TableEvent {
    Changed(ChangeEvent),
    /// The channel re-joined after a reconnect; notifications may have been missed.
    Resubscribed,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

fn deserialize_description<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("price out of range"))?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid price string: {s}")))?,
        other => return Err(D::Error::custom(format!("expected numeric price, got {other}"))),
    };
    if !value.is_finite() || value < 0.0 {
        return Err(D::Error::custom(format!("price must be non-negative, got {value}")));
    }
    Ok(value)
}

fn deserialize_image_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}
