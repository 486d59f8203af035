//! The backend collaborator: a client for the remote data engine.
//!
//! The gateway core treats this crate as an external service. It executes
//! queries and fetches table metadata with one shared service identity;
//! per-client authentication and quotas happen before any call lands here.

#![deny(missing_docs)]

mod error;
mod http;
mod types;

use async_trait::async_trait;

pub use error::BackendError;
pub use http::HttpBackend;
pub use types::{FieldSchema, QueryResult, TablePartitioning, TableProfile, TableSummary};

/// Operations the remote data engine supports.
#[async_trait]
pub trait BackendClient: Send + Sync + 'static {
    /// Execute a SQL query and return at most `max_results` rows. The query
    /// runs with standard SQL semantics unless `use_legacy_sql` is set.
    async fn run_query(&self, sql: &str, max_results: u64, use_legacy_sql: bool) -> Result<QueryResult, BackendError>;

    /// List tables in a dataset with their basic metadata.
    async fn list_tables(&self, dataset_id: &str, max_results: u64) -> Result<Vec<TableSummary>, BackendError>;

    /// Fetch the full profile of a single table: size, schema, layout and a
    /// handful of sample rows.
    async fn get_table_profile(&self, dataset_id: &str, table_id: &str) -> Result<TableProfile, BackendError>;
}
