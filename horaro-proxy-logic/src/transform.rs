//! Deterministic remapping of the column-oriented upstream export into the
//! canonical document shape.

use crate::{
    schema::{HoraroResponse, HoraroSchedule},
    types::{EventInfo, Schedule, ScheduleEvent, ScheduleMeta},
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Separators between player names: " vs. ", " vs ", comma with optional
/// surrounding space, " and ", " & ".
static PLAYERS_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+vs\.\s+|\s+vs\s+|\s*,\s*|\s+and\s+|\s+&\s+").expect("valid separator pattern")
});

/// Positions of the semantic columns, resolved once per document by
/// case-insensitive name lookup. An absent column stays `None` and the
/// matching attribute degrades to absent; never an error.
#[derive(Debug, Default, Clone, Copy)]
struct ColumnIndices {
    game: Option<usize>,
    players: Option<usize>,
    platform: Option<usize>,
    category: Option<usize>,
    note: Option<usize>,
    layout: Option<usize>,
    info: Option<usize>,
    id: Option<usize>,
}

impl ColumnIndices {
    fn resolve(columns: &[String]) -> ColumnIndices {
        let index_of = |name: &str| {
            columns
                .iter()
                .position(|column| column.eq_ignore_ascii_case(name))
        };
        ColumnIndices {
            game: index_of("Game"),
            players: index_of("Player(s)"),
            platform: index_of("Platform"),
            category: index_of("Category"),
            note: index_of("Note"),
            layout: index_of("Layout"),
            info: index_of("Info"),
            id: index_of("ID"),
        }
    }
}

fn split_players(value: &str) -> Vec<String> {
    PLAYERS_SEPARATOR
        .split(value)
        .map(str::to_string)
        .collect()
}

/// Looks up a row value by resolved column position. A present column may
/// still carry a null value; both cases resolve to `None`.
fn column_value(data: &[Option<String>], index: Option<usize>) -> Option<String> {
    index.and_then(|i| data.get(i).cloned().flatten())
}

fn transform_meta(
    schedule: &HoraroSchedule,
    exported: chrono::DateTime<chrono::FixedOffset>,
) -> ScheduleMeta {
    ScheduleMeta {
        name: schedule.name.clone(),
        slug: schedule.slug.clone(),
        timezone: schedule.timezone.clone(),
        start: schedule.start,
        website: schedule.website.clone(),
        twitter: schedule.twitter.clone(),
        twitch: schedule.twitch.clone(),
        description: schedule.description.clone(),
        setup: schedule.setup.clone(),
        updated: schedule.updated,
        url: schedule.url.clone(),
        event: EventInfo {
            name: schedule.event.name.clone(),
            slug: schedule.event.slug.clone(),
        },
        exported,
    }
}

/// Pure and total: any raw document maps to a transformed one, with absent
/// columns degrading to absent attributes. Event order equals row order.
pub fn transform(raw: HoraroResponse) -> Schedule {
    let meta = transform_meta(&raw.schedule, raw.meta.exported);
    let indices = ColumnIndices::resolve(&raw.schedule.columns);

    let data = raw
        .schedule
        .items
        .into_iter()
        .map(|item| {
            let players = column_value(&item.data, indices.players)
                .map(|value| split_players(&value))
                .unwrap_or_default();
            ScheduleEvent {
                length: item.length_t,
                scheduled: item.scheduled,
                game: column_value(&item.data, indices.game),
                players,
                platform: column_value(&item.data, indices.platform),
                category: column_value(&item.data, indices.category),
                note: column_value(&item.data, indices.note),
                layout: column_value(&item.data, indices.layout),
                info: column_value(&item.data, indices.info),
                id: column_value(&item.data, indices.id),
                options: item.options,
            }
        })
        .collect();

    Schedule { meta, data }
}
