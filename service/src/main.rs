use std::{env, path::Path};

use abi::Config;
use anyhow::{bail, Result};
use booking_service::start_server;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let filename = config_path()?;
    info!("loading config from {}", filename);
    let config = Config::load(&filename)?;

    start_server(&config).await
}

/// `$BOOKING_CONFIG` wins, then the first of ./booking.yml,
/// ~/.config/booking.yml and /etc/booking.yml that exists.
fn config_path() -> Result<String> {
    if let Ok(path) = env::var("BOOKING_CONFIG") {
        return Ok(shellexpand::tilde(&path).into_owned());
    }

    let candidates = [
        "./booking.yml".to_string(),
        shellexpand::tilde("~/.config/booking.yml").into_owned(),
        "/etc/booking.yml".to_string(),
    ];
    match candidates.into_iter().find(|p| Path::new(p).exists()) {
        Some(path) => Ok(path),
        None => bail!("config file not found, set BOOKING_CONFIG"),
    }
}
