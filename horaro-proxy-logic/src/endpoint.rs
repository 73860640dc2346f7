use crate::error::EndpointError;
use url::Url;

/// A validated, normalized upstream schedule URL. The string form doubles
/// as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Validates a caller-supplied endpoint against the configured upstream
    /// base. A bare token (no path separator) expands to the canonical
    /// `{base}esa/{token}.json` form; anything else must be an absolute URL
    /// on the upstream's own host and scheme.
    pub fn parse(raw: &str, base: &Url) -> Result<Endpoint, EndpointError> {
        let mut parameter = raw.to_string();
        if !parameter.ends_with(".json") {
            parameter.push_str(".json");
        }

        if !parameter.contains('/') {
            let url = base
                .join(&format!("esa/{parameter}"))
                .map_err(|e| EndpointError::Parse(e.to_string()))?;
            return Ok(Endpoint(url));
        }

        let url = Url::parse(&parameter).map_err(|e| EndpointError::Parse(e.to_string()))?;

        if url.host_str() != base.host_str() {
            return Err(EndpointError::ForeignHost(
                base.host_str().unwrap_or_default().to_string(),
            ));
        }

        if url.scheme() != base.scheme() {
            return Err(EndpointError::Scheme(base.scheme().to_string()));
        }

        Ok(Endpoint(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
