//! Backend entry-point: configuration, adapter assembly, and the server loop.

use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use newsdesk::config::AppConfig;
use newsdesk::server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let state = server::build_state(&config)
        .await
        .map_err(std::io::Error::other)?;
    server::run(&config, state)?.await
}
