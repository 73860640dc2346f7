use anyhow::Context;
use horaro_proxy_server::{init_logs, run, Settings};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logs();
    let settings = Settings::new().context("failed to read config")?;
    run(settings).await
}
