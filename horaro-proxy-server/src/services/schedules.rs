use super::{etag_for, invalid_endpoint, not_modified, upstream_unavailable};
use crate::run::AppState;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use chrono::Utc;
use horaro_proxy_logic::{
    group_by_day, transform, upcoming as upcoming_view, Endpoint, FetchError, Schedule,
    DEFAULT_UPCOMING_AMOUNT,
};
use serde::Deserialize;

/// Client schema generation. V1 keeps the upstream's local offsets and
/// serves the grouped schedule; V2 serves UTC instants and a flat schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    fn parse(raw: &str) -> Option<ApiVersion> {
        match raw {
            "v1" => Some(ApiVersion::V1),
            "v2" => Some(ApiVersion::V2),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    amount: Option<String>,
}

impl UpcomingQuery {
    /// Missing or unparsable values fall back to the default instead of
    /// failing the request.
    fn amount(&self) -> usize {
        self.amount
            .as_deref()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(DEFAULT_UPCOMING_AMOUNT)
    }
}

async fn load_schedule(state: &AppState, endpoint: &Endpoint) -> Result<Schedule, FetchError> {
    let client = state.client.clone();
    let target = endpoint.clone();
    state
        .schedules
        .get_or_load(endpoint.as_str(), move || async move {
            let raw = client.fetch_schedule(&target).await?;
            Ok(transform(raw))
        })
        .await
}

fn max_age(state: &AppState, key: &str) -> u64 {
    state
        .schedules
        .remaining_ttl(key)
        .unwrap_or_else(|| state.schedules.ttl())
        .as_secs()
}

pub async fn upcoming(
    request: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<UpcomingQuery>,
) -> HttpResponse {
    let (version, parameter) = path.into_inner();
    let Some(version) = ApiVersion::parse(&version) else {
        return HttpResponse::NotFound().finish();
    };
    let endpoint = match Endpoint::parse(&parameter, state.client.base_url()) {
        Ok(endpoint) => endpoint,
        Err(err) => return invalid_endpoint(&parameter, err),
    };
    let schedule = match load_schedule(&state, &endpoint).await {
        Ok(schedule) => schedule,
        Err(err) => return upstream_unavailable(&endpoint, err),
    };

    let etag = etag_for(&schedule.meta.updated.to_rfc3339());
    if not_modified(&request, &etag) {
        return HttpResponse::NotModified().finish();
    }

    let filtered = upcoming_view(&schedule, query.amount(), Utc::now());

    let mut response = HttpResponse::Ok();
    response
        .insert_header((
            header::CACHE_CONTROL,
            format!("max-age={}", max_age(&state, endpoint.as_str())),
        ))
        .insert_header((header::ETAG, etag));
    match version {
        ApiVersion::V1 => response.json(filtered),
        ApiVersion::V2 => response.json(filtered.into_utc()),
    }
}

pub async fn schedule(
    request: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (version, parameter) = path.into_inner();
    let Some(version) = ApiVersion::parse(&version) else {
        return HttpResponse::NotFound().finish();
    };
    let endpoint = match Endpoint::parse(&parameter, state.client.base_url()) {
        Ok(endpoint) => endpoint,
        Err(err) => return invalid_endpoint(&parameter, err),
    };
    let schedule = match load_schedule(&state, &endpoint).await {
        Ok(schedule) => schedule,
        Err(err) => return upstream_unavailable(&endpoint, err),
    };

    let etag = etag_for(&schedule.meta.updated.to_rfc3339());
    if not_modified(&request, &etag) {
        return HttpResponse::NotModified().finish();
    }

    let mut response = HttpResponse::Ok();
    response
        .insert_header((
            header::CACHE_CONTROL,
            format!("max-age={}", max_age(&state, endpoint.as_str())),
        ))
        .insert_header((header::ETAG, etag));
    match version {
        ApiVersion::V1 => response.json(group_by_day(&schedule)),
        ApiVersion::V2 => response.json(schedule.into_utc()),
    }
}
