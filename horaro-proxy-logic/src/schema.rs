//! Wire schema of the official Horaro export API.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct HoraroResponse {
    pub meta: HoraroMeta,
    pub schedule: HoraroSchedule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoraroMeta {
    pub exported: DateTime<FixedOffset>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default, rename = "api-link")]
    pub api_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoraroSchedule {
    pub name: String,
    pub slug: String,
    pub timezone: String,
    pub start: DateTime<FixedOffset>,
    #[serde(default)]
    pub start_t: i64,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub twitch: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub setup: Option<String>,
    #[serde(default)]
    pub setup_t: i64,
    pub updated: DateTime<FixedOffset>,
    pub url: String,
    pub event: HoraroEvent,
    /// Ordered column names; defines the meaning of each item's positional
    /// `data` values.
    pub columns: Vec<String>,
    pub items: Vec<HoraroItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoraroEvent {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoraroItem {
    #[serde(default)]
    pub length: Option<String>,
    /// Duration in seconds.
    pub length_t: i64,
    pub scheduled: DateTime<FixedOffset>,
    #[serde(default)]
    pub scheduled_t: i64,
    /// Positional values aligned to `HoraroSchedule::columns`.
    pub data: Vec<Option<String>>,
    /// Opaque; passed through to clients uninterpreted.
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}
