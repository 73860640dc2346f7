use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EndpointError {
    #[error("can not parse URL: {0}")]
    Parse(String),
    #[error("can not fetch from different domain than {0}")]
    ForeignHost(String),
    #[error("can only fetch over {0}")]
    Scheme(String),
}

/// Cloneable so that concurrent loads collapsed into a single upstream
/// request all observe the same failure.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid response body: {0}")]
    Decode(String),
}
