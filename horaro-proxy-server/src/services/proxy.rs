use super::{etag_for, invalid_endpoint, not_modified, upstream_unavailable};
use crate::run::AppState;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use horaro_proxy_logic::Endpoint;

/// Validated passthrough of the raw upstream body; no transformation, same
/// cache regime as the transformed views.
pub async fn api_proxy(
    request: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let parameter = path.into_inner();
    let endpoint = match Endpoint::parse(&parameter, state.client.base_url()) {
        Ok(endpoint) => endpoint,
        Err(err) => return invalid_endpoint(&parameter, err),
    };

    let client = state.client.clone();
    let target = endpoint.clone();
    let body = match state
        .api_responses
        .get_or_load(endpoint.as_str(), move || async move {
            client.fetch_raw(&target).await
        })
        .await
    {
        Ok(body) => body,
        Err(err) => return upstream_unavailable(&endpoint, err),
    };

    let etag = etag_for(&body);
    if not_modified(&request, &etag) {
        return HttpResponse::NotModified().finish();
    }

    let max_age = state
        .api_responses
        .remaining_ttl(endpoint.as_str())
        .unwrap_or_else(|| state.api_responses.ttl())
        .as_secs();

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .insert_header((header::CACHE_CONTROL, format!("public, max-age={max_age}")))
        .insert_header((header::ETAG, etag))
        .body(body)
}
