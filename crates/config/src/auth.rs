//! Client roster and session lifecycle configuration.

use std::{collections::BTreeMap, time::Duration};

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;

/// Registered clients and session settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// The registered client roster, client id to client secret.
    ///
    /// Immutable after startup. An empty roster fails validation: a gateway
    /// nobody can authenticate against serves no purpose.
    pub clients: BTreeMap<String, SecretString>,
    /// How long an issued session stays valid.
    #[serde(deserialize_with = "deserialize_duration")]
    pub session_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            clients: BTreeMap::new(),
            session_ttl: Duration::from_secs(3600),
        }
    }
}
