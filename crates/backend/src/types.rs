//! Result types returned by the backend collaborator.

use jiff::Timestamp;
use serde::Serialize;
use serde_json::Value;

/// One column of a table or query result schema.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    /// Column name.
    pub name: String,
    /// Column type as reported by the backend, e.g. `STRING` or `INTEGER`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Column mode (`NULLABLE`, `REQUIRED`, `REPEATED`) when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Column description when one is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A completed query: rows shaped as JSON objects keyed by column name.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Result rows, one JSON object per row.
    pub rows: Vec<Value>,
    /// Schema of the result set.
    pub schema: Vec<FieldSchema>,
    /// Total number of rows the query produced, which can exceed the number
    /// returned.
    pub total_rows: u64,
}

/// Basic metadata for one table in a dataset listing.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    /// Table id within its dataset.
    pub table_id: String,
    /// Fully qualified `project.dataset.table` id.
    pub full_table_id: String,
    /// Table type, e.g. `TABLE` or `VIEW`.
    pub table_type: String,
    /// Creation time when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
}

/// Time partitioning layout of a table.
#[derive(Debug, Clone, Serialize)]
pub struct TablePartitioning {
    /// Partitioning granularity, e.g. `DAY`.
    #[serde(rename = "type")]
    pub partition_type: Option<String>,
    /// The column the table is partitioned on, if any.
    pub field: Option<String>,
}

/// The full profile of a single table.
#[derive(Debug, Clone, Serialize)]
pub struct TableProfile {
    /// Table id within its dataset.
    pub table_id: String,
    /// Fully qualified `project.dataset.table` id.
    pub full_table_id: String,
    /// Number of rows in the table.
    pub num_rows: u64,
    /// Size of the table in bytes.
    pub num_bytes: u64,
    /// Creation time when reported.
    pub created: Option<Timestamp>,
    /// Last modification time when reported.
    pub modified: Option<Timestamp>,
    /// Time partitioning layout, if the table is partitioned.
    pub partitioning: Option<TablePartitioning>,
    /// Clustering columns, empty when the table is not clustered.
    pub clustering_fields: Vec<String>,
    /// Column schema.
    pub schema: Vec<FieldSchema>,
    /// A handful of sample rows.
    pub sample_rows: Vec<Value>,
}
