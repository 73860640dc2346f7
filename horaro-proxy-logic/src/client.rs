use crate::{endpoint::Endpoint, error::FetchError, schema::HoraroResponse};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the upstream schedule host. One pooled connection set per
/// process; repeated fetches against the same host reuse connections.
#[derive(Debug, Clone)]
pub struct HoraroClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HoraroClient {
    pub fn new(base_url: Url, timeout: Duration) -> HoraroClient {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(600))
            .build()
            .expect("failed to build http client");
        HoraroClient { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Single GET against the validated endpoint, decoded as the upstream
    /// export schema. Never retried here; retry policy belongs to callers.
    pub async fn fetch_schedule(&self, endpoint: &Endpoint) -> Result<HoraroResponse, FetchError> {
        let response = self.get(endpoint).await?;
        response
            .json::<HoraroResponse>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Same GET, but the body is passed through untouched.
    pub async fn fetch_raw(&self, endpoint: &Endpoint) -> Result<String, FetchError> {
        let response = self.get(endpoint).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn get(&self, endpoint: &Endpoint) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(endpoint.url().clone())
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use pretty_assertions::assert_eq;

    fn client_for(server: &MockServer) -> (HoraroClient, Url) {
        let base: Url = server.base_url().parse().unwrap();
        (HoraroClient::new(base.clone(), DEFAULT_TIMEOUT), base)
    }

    #[tokio::test]
    async fn fetches_and_decodes_a_schedule() {
        let server = MockServer::start();
        let body = serde_json::json!({
            "meta": {"exported": "2024-01-01T09:30:00+01:00"},
            "schedule": {
                "name": "Event One",
                "slug": "2024-one",
                "timezone": "Europe/Stockholm",
                "start": "2024-01-01T10:00:00+01:00",
                "updated": "2024-01-01T09:00:00+01:00",
                "url": "/esa/2024-one",
                "event": {"name": "ESA", "slug": "esa"},
                "columns": ["Game"],
                "items": [{
                    "length": "PT1H",
                    "length_t": 3600,
                    "scheduled": "2024-01-01T10:00:00+01:00",
                    "scheduled_t": 1704096000,
                    "data": ["Chess"],
                    "options": null,
                }],
            },
        });
        let handle = server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/esa/2024-one.json");
            then.status(200)
                .header("Content-type", "application/json")
                .json_body(body);
        });

        let (client, base) = client_for(&server);
        let endpoint = Endpoint::parse("2024-one", &base).unwrap();
        let response = client.fetch_schedule(&endpoint).await.unwrap();

        handle.assert();
        assert_eq!("2024-one", response.schedule.slug);
        assert_eq!(1, response.schedule.items.len());
        assert_eq!(3600, response.schedule.items[0].length_t);
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/esa/missing.json");
            then.status(404);
        });

        let (client, base) = client_for(&server);
        let endpoint = Endpoint::parse("missing", &base).unwrap();
        let err = client.fetch_schedule(&endpoint).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(status) if status.as_u16() == 404));
    }

    #[tokio::test]
    async fn undecodable_body_is_a_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/esa/broken.json");
            then.status(200).body("not json");
        });

        let (client, base) = client_for(&server);
        let endpoint = Endpoint::parse("broken", &base).unwrap();
        let err = client.fetch_schedule(&endpoint).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
