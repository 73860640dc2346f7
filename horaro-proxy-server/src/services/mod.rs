mod proxy;
mod schedules;

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use sha2::{Digest, Sha256};

pub fn configure(config: &mut web::ServiceConfig) {
    config
        .route(
            "/{version}/esa/upcoming/{endpoint:.*}",
            web::get().to(schedules::upcoming),
        )
        .route(
            "/{version}/esa/schedule/{endpoint:.*}",
            web::get().to(schedules::schedule),
        )
        .route("/api_proxy/{endpoint:.*}", web::get().to(proxy::api_proxy));
}

/// Entity tag derived from a freshness witness (the document's `updated`
/// instant, or the raw body for the passthrough).
fn etag_for(witness: &str) -> String {
    let digest = Sha256::digest(witness.as_bytes());
    format!("\"{}\"", hex::encode(&digest[..8]))
}

fn not_modified(request: &HttpRequest, etag: &str) -> bool {
    request
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains(etag))
        .unwrap_or(false)
}

fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

fn invalid_endpoint(parameter: &str, err: impl std::fmt::Display) -> HttpResponse {
    tracing::warn!("invalid horaro link '{parameter}': {err}");
    HttpResponse::BadRequest().json(error_body("Invalid Horaro link"))
}

fn upstream_unavailable(endpoint: impl std::fmt::Display, err: impl std::fmt::Display) -> HttpResponse {
    tracing::error!("could not find the horaro data from '{endpoint}': {err}");
    HttpResponse::NotFound().json(error_body("Could not find the Horaro data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn etag_is_stable_and_quoted() {
        let tag = etag_for("2024-01-01T09:00:00+01:00");
        assert_eq!(tag, etag_for("2024-01-01T09:00:00+01:00"));
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert_ne!(tag, etag_for("2024-01-01T09:00:01+01:00"));
    }
}
