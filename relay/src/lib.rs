pub mod backends;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod health;
pub mod http;
pub mod metrics_defs;
pub mod server;
pub mod service;

#[cfg(test)]
pub(crate) mod testutils;

use crate::backends::BackendSource;
use crate::errors::RelayError;
use crate::service::RelayService;
use std::sync::Arc;

/// Runs the relay until the listener fails.
pub async fn run(config: config::Config, source: Arc<dyn BackendSource>) -> Result<(), RelayError> {
    let service = RelayService::new(&config, source);
    server::serve(&config.listener.host, config.listener.port, service).await
}
