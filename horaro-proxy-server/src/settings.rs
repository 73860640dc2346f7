use config::{Config, File};
use serde::{de::IgnoredAny, Deserialize};
use std::{net::SocketAddr, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerSettings,
    pub horaro: HoraroSettings,

    // Is required as we deny unknown fields, but allow users provide
    // path to config through PREFIX__CONFIG env variable. If removed,
    // the setup would fail with `unknown field `config`, expected one of...`
    #[serde(rename = "config")]
    pub config_path: IgnoredAny,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from_str("0.0.0.0:8080").expect("valid addr"),
        }
    }
}

/// Upstream and cache policy settings. Durations are configured in seconds.
#[serde_with::serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoraroSettings {
    /// Base URL of the upstream schedule host; endpoint validation pins
    /// requests to this host and scheme.
    pub base_url: Url,

    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub request_timeout: Duration,

    /// How long a fetched schedule stays fresh.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub cache_ttl: Duration,

    /// Interval of the background sweep that drops expired entries.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub sweep_interval: Duration,
}

impl Default for HoraroSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://horaro.org/").expect("valid upstream url"),
            request_timeout: horaro_proxy_logic::DEFAULT_TIMEOUT,
            cache_ttl: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl Settings {
    pub fn new() -> anyhow::Result<Self> {
        let config_path = std::env::var("HORARO_PROXY__CONFIG");

        let mut builder = Config::builder();
        if let Ok(config_path) = config_path {
            builder = builder.add_source(File::with_name(&config_path));
        };
        // Use `__` so that it would be possible to address keys with underscores in names (e.g. `base_url`)
        builder = builder.add_source(config::Environment::with_prefix("HORARO_PROXY").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;

        Ok(settings)
    }
}
