//! Backend query engine configuration.

use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Connection settings for the remote BigQuery backend.
///
/// The backend is accessed with one shared service identity; per-client
/// authentication happens at the gateway, not here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// The Google Cloud project all datasets are resolved against.
    pub project_id: String,
    /// Base URL of the BigQuery REST API.
    pub api_base_url: Url,
    /// OAuth2 access token of the shared service identity.
    pub access_token: SecretString,
    /// Upper bound for a single backend call. A call exceeding it is
    /// abandoned and reported as a timeout.
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_base_url: default_api_base_url(),
            access_token: SecretString::from(String::new()),
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn default_api_base_url() -> Url {
    Url::parse("https://bigquery.googleapis.com/bigquery/v2/").expect("the default base URL is valid")
}
