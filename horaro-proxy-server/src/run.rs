use crate::{
    services,
    settings::{HoraroSettings, Settings},
};
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use horaro_proxy_logic::{FreshnessCache, HoraroClient, Schedule};
use std::{sync::Arc, time::Duration};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

/// Shared per-process state handed to request handlers: the pooled upstream
/// client plus one freshness cache per response family.
pub struct AppState {
    pub client: HoraroClient,
    pub schedules: FreshnessCache<Schedule>,
    pub api_responses: FreshnessCache<String>,
}

impl AppState {
    pub fn new(settings: &HoraroSettings) -> AppState {
        AppState {
            client: HoraroClient::new(settings.base_url.clone(), settings.request_timeout),
            schedules: FreshnessCache::new(settings.cache_ttl),
            api_responses: FreshnessCache::new(settings.cache_ttl),
        }
    }
}

pub fn init_logs() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "OPTIONS"])
}

fn spawn_sweeper(state: Arc<AppState>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = state.schedules.purge_expired() + state.api_responses.purge_expired();
            if removed > 0 {
                tracing::debug!("swept {removed} expired cache entries");
            }
        }
    })
}

pub async fn run(settings: Settings) -> Result<(), anyhow::Error> {
    let state = web::Data::new(AppState::new(&settings.horaro));
    let sweeper = spawn_sweeper(state.clone().into_inner(), settings.horaro.sweep_interval);

    tracing::info!("starting http server on addr {}", settings.server.addr);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors())
            .app_data(state.clone())
            .configure(services::configure)
    })
    .bind(settings.server.addr)?
    .run();

    let result = server.await;
    sweeper.abort();
    result?;
    Ok(())
}
