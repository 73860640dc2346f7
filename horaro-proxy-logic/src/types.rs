//! Canonical transformed document shapes served to clients.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// RFC 3339 with seconds precision; `Z` for zero offset. One textual form
/// for every instant the proxy emits.
pub(crate) fn serialize_instant<S>(
    instant: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&instant.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventInfo {
    pub name: String,
    pub slug: String,
}

/// Schedule-level descriptive fields, copied verbatim from upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleMeta {
    pub name: String,
    pub slug: String,
    pub timezone: String,
    #[serde(serialize_with = "serialize_instant")]
    pub start: DateTime<FixedOffset>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub twitch: Option<String>,
    pub description: Option<String>,
    pub setup: Option<String>,
    #[serde(serialize_with = "serialize_instant")]
    pub updated: DateTime<FixedOffset>,
    pub url: String,
    pub event: EventInfo,
    #[serde(serialize_with = "serialize_instant")]
    pub exported: DateTime<FixedOffset>,
}

/// One transformed event. The named attributes are present only when the
/// source schedule carries the matching column and the row's value at that
/// position is non-null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEvent {
    /// Duration in seconds.
    pub length: i64,
    #[serde(serialize_with = "serialize_instant")]
    pub scheduled: DateTime<FixedOffset>,
    pub game: Option<String>,
    pub players: Vec<String>,
    pub platform: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub layout: Option<String>,
    pub info: Option<String>,
    pub id: Option<String>,
    pub options: Option<serde_json::Value>,
}

impl ScheduleEvent {
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.scheduled + chrono::Duration::seconds(self.length)
    }

    fn into_utc(mut self) -> ScheduleEvent {
        self.scheduled = self.scheduled.with_timezone(&Utc).fixed_offset();
        self
    }
}

/// Transformed document: meta plus events in upstream row order. The order
/// is canonical; every view preserves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub meta: ScheduleMeta,
    pub data: Vec<ScheduleEvent>,
}

impl Schedule {
    /// Version adapter: rebase every instant to UTC. The v1 surface keeps
    /// the upstream's local offsets, the v2 surface is UTC throughout.
    pub fn into_utc(mut self) -> Schedule {
        self.meta.start = self.meta.start.with_timezone(&Utc).fixed_offset();
        self.meta.updated = self.meta.updated.with_timezone(&Utc).fixed_offset();
        self.meta.exported = self.meta.exported.with_timezone(&Utc).fixed_offset();
        self.data = self.data.into_iter().map(ScheduleEvent::into_utc).collect();
        self
    }
}

/// Day-grouped document: events bucketed by the local wall-clock date of
/// their scheduled instant, `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySchedule {
    pub meta: ScheduleMeta,
    pub data: BTreeMap<String, Vec<ScheduleEvent>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta() -> ScheduleMeta {
        let start: DateTime<FixedOffset> = "2024-01-01T10:00:00+02:00".parse().unwrap();
        ScheduleMeta {
            name: "Event One".to_string(),
            slug: "2024-one".to_string(),
            timezone: "Europe/Stockholm".to_string(),
            start,
            website: None,
            twitter: None,
            twitch: None,
            description: None,
            setup: None,
            updated: start,
            url: "/esa/2024-one".to_string(),
            event: EventInfo {
                name: "ESA".to_string(),
                slug: "esa".to_string(),
            },
            exported: start,
        }
    }

    #[test]
    fn instants_keep_their_offset_by_default() {
        let value = serde_json::to_value(meta()).unwrap();
        assert_eq!("2024-01-01T10:00:00+02:00", value["start"]);
    }

    #[test]
    fn utc_adapter_rebases_every_instant() {
        let schedule = Schedule {
            meta: meta(),
            data: vec![],
        };
        let value = serde_json::to_value(schedule.into_utc()).unwrap();
        assert_eq!("2024-01-01T08:00:00Z", value["meta"]["start"]);
        assert_eq!("2024-01-01T08:00:00Z", value["meta"]["updated"]);
    }
}
