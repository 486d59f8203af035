//! Tool dispatch behind the authentication and admission gates.

use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use backend::{BackendClient, BackendError};
use clock::Clock;
use config::Config;
use jiff::Timestamp;
use rate_limit::{RateLimitError, RateLimitManager};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{credentials::CredentialStore, error::GatewayError, session::SessionManager};

/// The closed set of tools the gateway exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    /// Execute a SQL query.
    RunQuery,
    /// List the tables of a dataset.
    ListTables,
    /// Fetch the full profile of one table.
    GetTableProfile,
}

impl ToolName {
    /// The wire name of the tool.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::RunQuery => "run_query",
            ToolName::ListTables => "list_tables",
            ToolName::GetTableProfile => "get_table_profile",
        }
    }
}

impl FromStr for ToolName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run_query" => Ok(ToolName::RunQuery),
            "list_tables" => Ok(ToolName::ListTables),
            "get_table_profile" => Ok(ToolName::GetTableProfile),
            _ => Err(()),
        }
    }
}

/// A successful authentication.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The bearer token for subsequent tool calls.
    pub session_token: String,
    /// When the session stops being valid.
    pub expires_at: Timestamp,
    /// The authenticated client.
    pub client_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunQueryArguments {
    sql: String,
    #[serde(default = "default_query_rows")]
    max_results: u64,
    #[serde(default)]
    use_legacy_sql: bool,
}

fn default_query_rows() -> u64 {
    1000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListTablesArguments {
    dataset_id: String,
    #[serde(default = "default_listing_rows")]
    max_results: u64,
}

fn default_listing_rows() -> u64 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableProfileArguments {
    dataset_id: String,
    table_id: String,
}

/// The entry point for every client request.
///
/// Each tool call passes the gates in a fixed order: session validation,
/// rate-limit admission, tool lookup, argument validation, backend call.
/// A failed gate stops the request; in particular no backend cost is ever
/// incurred before both authentication and quota have passed.
pub struct Dispatcher {
    credentials: CredentialStore,
    sessions: SessionManager,
    limiter: RateLimitManager,
    backend: Arc<dyn BackendClient>,
    backend_timeout: Duration,
}

impl Dispatcher {
    /// Wires up the gateway core from its configuration and collaborators.
    pub fn new(config: &Config, clock: Arc<dyn Clock>, backend: Arc<dyn BackendClient>) -> Result<Self, RateLimitError> {
        let credentials = CredentialStore::new(&config.auth.clients);
        let sessions = SessionManager::new(config.auth.session_ttl, clock.clone());
        let limiter = RateLimitManager::new(config.rate_limits.clone(), clock)?;

        Ok(Self {
            credentials,
            sessions,
            limiter,
            backend,
            backend_timeout: config.backend.request_timeout,
        })
    }

    /// Exchanges client credentials for a fresh session.
    pub fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<AuthResponse, GatewayError> {
        self.credentials.validate(client_id, client_secret)?;

        let session = self.sessions.create_session(client_id);
        log::info!("Issued session for client '{client_id}', valid until {}", session.expires_at);

        Ok(AuthResponse {
            session_token: session.token,
            expires_at: session.expires_at,
            client_id: session.client_id,
        })
    }

    /// Drops a session before its expiry. Unknown tokens are ignored.
    pub fn revoke(&self, session_token: &str) -> bool {
        self.sessions.revoke_session(session_token)
    }

    /// Runs one tool invocation through the gate sequence.
    pub async fn handle(&self, session_token: &str, tool_name: &str, arguments: Value) -> Result<Value, GatewayError> {
        let client_id = self.sessions.validate_session(session_token)?;

        // Admission happens before tool lookup, so a botched request still
        // consumes a slot. The quota covers attempts, not successes.
        if !self.limiter.admit(&client_id) {
            log::info!("Rate limit exceeded for client '{client_id}'");
            return Err(GatewayError::RateLimitExceeded);
        }

        let tool = ToolName::from_str(tool_name).map_err(|()| GatewayError::UnknownTool(tool_name.to_string()))?;
        log::debug!("Dispatching '{}' for client '{client_id}'", tool.as_str());

        match tool {
            ToolName::RunQuery => self.run_query(&client_id, arguments).await,
            ToolName::ListTables => self.list_tables(&client_id, arguments).await,
            ToolName::GetTableProfile => self.get_table_profile(&client_id, arguments).await,
        }
    }

    async fn run_query(&self, client_id: &str, arguments: Value) -> Result<Value, GatewayError> {
        let arguments: RunQueryArguments = parse_arguments(arguments)?;

        if arguments.sql.trim().is_empty() {
            return Err(GatewayError::InvalidArguments("sql must not be empty".to_string()));
        }

        let result = self
            .bounded(
                self.backend
                    .run_query(&arguments.sql, arguments.max_results, arguments.use_legacy_sql),
            )
            .await?;

        Ok(json!({
            "client_id": client_id,
            "row_count": result.rows.len(),
            "total_rows": result.total_rows,
            "schema": shape(&result.schema)?,
            "rows": result.rows,
        }))
    }

    async fn list_tables(&self, client_id: &str, arguments: Value) -> Result<Value, GatewayError> {
        let arguments: ListTablesArguments = parse_arguments(arguments)?;

        if arguments.dataset_id.trim().is_empty() {
            return Err(GatewayError::InvalidArguments("dataset_id must not be empty".to_string()));
        }

        let tables = self
            .bounded(self.backend.list_tables(&arguments.dataset_id, arguments.max_results))
            .await?;

        Ok(json!({
            "client_id": client_id,
            "dataset_id": arguments.dataset_id,
            "table_count": tables.len(),
            "tables": shape(&tables)?,
        }))
    }

    async fn get_table_profile(&self, client_id: &str, arguments: Value) -> Result<Value, GatewayError> {
        let arguments: TableProfileArguments = parse_arguments(arguments)?;

        if arguments.dataset_id.trim().is_empty() || arguments.table_id.trim().is_empty() {
            return Err(GatewayError::InvalidArguments(
                "dataset_id and table_id must not be empty".to_string(),
            ));
        }

        let profile = self
            .bounded(self.backend.get_table_profile(&arguments.dataset_id, &arguments.table_id))
            .await?;

        Ok(json!({
            "client_id": client_id,
            "table": shape(&profile)?,
        }))
    }

    /// Bounds a backend call by the configured deadline. The admission slot
    /// stays consumed on timeout; the cost was incurred when the call was
    /// dispatched.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.backend_timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(GatewayError::BackendTimeout),
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, GatewayError> {
    serde_json::from_value(arguments).map_err(|err| GatewayError::InvalidArguments(err.to_string()))
}

/// Embeds a backend value into a response payload. A value that does not
/// serialize is an internal fault, not something the client caused.
fn shape<T: Serialize>(value: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|err| {
        log::error!("Failed to serialize a backend payload: {err}");
        GatewayError::Internal
    })
}
