use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Delivery timeout cannot be 0")]
    InvalidDeliveryTimeout,
}

/// Relay configuration
///
/// The backend list itself is not part of this config; it is discovered from
/// a [`crate::backends::BackendSource`] snapshot on every inbound request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for inbound webhook traffic
    pub listener: Listener,
    /// Per-backend timeout for outbound POSTs, in seconds
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
    /// When true, an inbound webhook with no active backends is answered
    /// with a 500 instead of an empty (vacuously successful) fan-out
    #[serde(default = "default_flag_enabled")]
    pub require_active_backends: bool,
    /// Enables the read-only `GET /health` endpoint
    #[serde(default = "default_flag_enabled")]
    pub health_endpoint: bool,
}

fn default_delivery_timeout_secs() -> u64 {
    30
}

fn default_flag_enabled() -> bool {
    true
}

impl Config {
    /// Validates the relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;

        if self.delivery_timeout_secs == 0 {
            return Err(ValidationError::InvalidDeliveryTimeout);
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}
