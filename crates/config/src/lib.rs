//! Datagate configuration structures to map the datagate.toml configuration.

#![deny(missing_docs)]

mod auth;
mod backend;
mod loader;
mod rate_limit;

use std::{borrow::Cow, net::SocketAddr, path::Path};

pub use auth::AuthConfig;
pub use backend::BackendConfig;
pub use rate_limit::RateLimitConfig;
use serde::Deserialize;

/// Main configuration structure for the Datagate application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Client roster and session settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Per-client rate limiting settings.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    /// Backend query engine settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates that the configuration can actually serve clients.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}

/// HTTP server configuration settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// Health endpoint configuration.
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health endpoint configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    /// Whether the health endpoint is enabled.
    pub enabled: bool,
    /// The path for the health endpoint.
    pub path: Cow<'static, str>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            enabled: true,
            path: Cow::Borrowed("/health"),
        }
    }
}
