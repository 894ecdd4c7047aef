//! Conduit API server
//!
//! Reads configuration from a TOML file (`~/.config/conduit/config.toml`,
//! or the path in `CONDUIT_CONFIG`) and serves until SIGTERM or Ctrl+C.

use tracing::{error, info};

use conduit::config::{config_path, AppConfig};
use conduit::server::{init_tracing, ServerHandle, ServerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    let (config, load_error) = match AppConfig::load(&path) {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            let mut cfg = AppConfig::default();
            cfg.apply_env_overrides();
            (cfg, Some(e))
        }
    };

    init_tracing(&config.logging);
    match load_error {
        None => info!("Configuration loaded from {}", path.display()),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        ..Default::default()
    })
    .await?;
    handle.install_signal_handler();
    handle.wait().await;

    Ok(())
}
