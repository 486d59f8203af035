//! HTTP implementation of the backend collaborator over the BigQuery REST
//! v2 API.

use async_trait::async_trait;
use config::BackendConfig;
use jiff::Timestamp;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::{
    BackendClient, BackendError,
    types::{FieldSchema, QueryResult, TablePartitioning, TableProfile, TableSummary},
};

const SAMPLE_ROW_COUNT: u64 = 10;

/// Backend client over the BigQuery REST API, authenticated with the shared
/// service access token.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    project_id: String,
    access_token: SecretString,
}

impl HttpBackend {
    /// Create a new backend client from the backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            project_id: config.project_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| BackendError::Malformed("api_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;

        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, url: Url, body: &impl Serialize) -> Result<T, BackendError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(body)
            .send()
            .await?;

        decode(response).await
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn run_query(&self, sql: &str, max_results: u64, use_legacy_sql: bool) -> Result<QueryResult, BackendError> {
        let url = self.endpoint(&["projects", &self.project_id, "queries"])?;

        let request = QueryRequest {
            query: sql,
            use_legacy_sql,
            max_results,
        };

        let response: QueryResponse = self.post_json(url, &request).await?;

        // Synchronous query mode: an incomplete job would need polling we do
        // not do, so it surfaces as a timeout.
        if response.job_complete == Some(false) {
            return Err(BackendError::Timeout);
        }

        let schema = response.schema.map(convert_schema).unwrap_or_default();
        let total_rows = parse_count(response.total_rows.as_deref());
        let rows = rows_to_objects(&schema, response.rows);

        log::debug!("Query returned {} of {total_rows} rows", rows.len());

        Ok(QueryResult {
            rows,
            schema,
            total_rows,
        })
    }

    async fn list_tables(&self, dataset_id: &str, max_results: u64) -> Result<Vec<TableSummary>, BackendError> {
        let mut url = self.endpoint(&["projects", &self.project_id, "datasets", dataset_id, "tables"])?;
        url.query_pairs_mut().append_pair("maxResults", &max_results.to_string());

        let response: TableListResponse = self.get_json(url).await?;

        let tables = response
            .tables
            .into_iter()
            .map(|table| {
                let reference = table.table_reference;

                TableSummary {
                    full_table_id: format!(
                        "{}.{}.{}",
                        reference.project_id, reference.dataset_id, reference.table_id
                    ),
                    table_id: reference.table_id,
                    table_type: table.table_type.unwrap_or_else(|| "TABLE".to_string()),
                    created: parse_millis(table.creation_time.as_deref()),
                }
            })
            .collect();

        Ok(tables)
    }

    async fn get_table_profile(&self, dataset_id: &str, table_id: &str) -> Result<TableProfile, BackendError> {
        let url = self.endpoint(&["projects", &self.project_id, "datasets", dataset_id, "tables", table_id])?;
        let table: WireTable = self.get_json(url).await?;

        let full_table_id = format!("{}.{dataset_id}.{table_id}", self.project_id);
        let sample_sql = format!("SELECT * FROM `{full_table_id}` LIMIT {SAMPLE_ROW_COUNT}");
        let sample = self.run_query(&sample_sql, SAMPLE_ROW_COUNT, false).await?;

        Ok(TableProfile {
            table_id: table.table_reference.table_id,
            full_table_id,
            num_rows: parse_count(table.num_rows.as_deref()),
            num_bytes: parse_count(table.num_bytes.as_deref()),
            created: parse_millis(table.creation_time.as_deref()),
            modified: parse_millis(table.last_modified_time.as_deref()),
            partitioning: table.time_partitioning.map(|partitioning| TablePartitioning {
                partition_type: partitioning.partition_type,
                field: partitioning.field,
            }),
            clustering_fields: table.clustering.map(|clustering| clustering.fields).unwrap_or_default(),
            schema: table.schema.map(convert_schema).unwrap_or_default(),
            sample_rows: sample.rows,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();

    if !status.is_success() {
        let message = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .map(|error| error.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

fn convert_schema(schema: WireSchema) -> Vec<FieldSchema> {
    schema
        .fields
        .into_iter()
        .map(|field| FieldSchema {
            name: field.name,
            field_type: field.field_type,
            mode: field.mode,
            description: field.description,
        })
        .collect()
}

/// The REST API encodes rows as positional cells; re-key them by column name
/// so clients get self-describing JSON objects.
fn rows_to_objects(schema: &[FieldSchema], rows: Vec<WireRow>) -> Vec<Value> {
    rows.into_iter()
        .map(|row| {
            let object = schema
                .iter()
                .zip(row.f)
                .map(|(field, cell)| (field.name.clone(), cell.v))
                .collect::<serde_json::Map<_, _>>();

            Value::Object(object)
        })
        .collect()
}

fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|count| count.parse().ok()).unwrap_or(0)
}

fn parse_millis(value: Option<&str>) -> Option<Timestamp> {
    let millis = value?.parse::<i64>().ok()?;
    Timestamp::from_millisecond(millis).ok()
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    max_results: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    schema: Option<WireSchema>,
    #[serde(default)]
    rows: Vec<WireRow>,
    total_rows: Option<String>,
    job_complete: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WireSchema {
    #[serde(default)]
    fields: Vec<WireField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    mode: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    #[serde(default)]
    f: Vec<WireCell>,
}

#[derive(Debug, Deserialize)]
struct WireCell {
    #[serde(default)]
    v: Value,
}

#[derive(Debug, Deserialize)]
struct TableListResponse {
    #[serde(default)]
    tables: Vec<WireTableSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTableSummary {
    table_reference: WireTableReference,
    #[serde(rename = "type")]
    table_type: Option<String>,
    creation_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTableReference {
    project_id: String,
    dataset_id: String,
    table_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTable {
    table_reference: WireTableReference,
    num_rows: Option<String>,
    num_bytes: Option<String>,
    creation_time: Option<String>,
    last_modified_time: Option<String>,
    time_partitioning: Option<WirePartitioning>,
    clustering: Option<WireClustering>,
    schema: Option<WireSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePartitioning {
    #[serde(rename = "type")]
    partition_type: Option<String>,
    field: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireClustering {
    #[serde(default)]
    fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_response_rows_are_rekeyed_by_column_name() {
        let response: QueryResponse = serde_json::from_value(json!({
            "kind": "bigquery#queryResponse",
            "schema": {
                "fields": [
                    { "name": "word", "type": "STRING", "mode": "NULLABLE" },
                    { "name": "count", "type": "INTEGER" }
                ]
            },
            "rows": [
                { "f": [ { "v": "hamlet" }, { "v": "432" } ] },
                { "f": [ { "v": "ghost" }, { "v": null } ] }
            ],
            "totalRows": "2",
            "jobComplete": true
        }))
        .unwrap();

        let schema = convert_schema(response.schema.unwrap());
        let rows = rows_to_objects(&schema, response.rows);

        assert_eq!(
            json!([
                { "word": "hamlet", "count": "432" },
                { "word": "ghost", "count": null }
            ]),
            Value::Array(rows)
        );
        assert_eq!(2, parse_count(response.total_rows.as_deref()));
    }

    #[test]
    fn table_listing_parses_reference_and_creation_time() {
        let response: TableListResponse = serde_json::from_value(json!({
            "tables": [{
                "tableReference": {
                    "projectId": "acme-analytics",
                    "datasetId": "warehouse",
                    "tableId": "orders"
                },
                "type": "TABLE",
                "creationTime": "1700000000000"
            }]
        }))
        .unwrap();

        let table = &response.tables[0];
        assert_eq!("orders", table.table_reference.table_id);

        let created = parse_millis(table.creation_time.as_deref()).unwrap();
        assert_eq!(1_700_000_000, created.as_second());
    }

    #[test]
    fn table_resource_parses_layout_metadata() {
        let table: WireTable = serde_json::from_value(json!({
            "tableReference": {
                "projectId": "acme-analytics",
                "datasetId": "warehouse",
                "tableId": "orders"
            },
            "numRows": "1024",
            "numBytes": "65536",
            "creationTime": "1700000000000",
            "lastModifiedTime": "1700000100000",
            "timePartitioning": { "type": "DAY", "field": "order_date" },
            "clustering": { "fields": ["customer_id"] },
            "schema": { "fields": [ { "name": "customer_id", "type": "STRING" } ] }
        }))
        .unwrap();

        assert_eq!(1024, parse_count(table.num_rows.as_deref()));
        assert_eq!(65536, parse_count(table.num_bytes.as_deref()));
        assert_eq!(
            Some("DAY".to_string()),
            table.time_partitioning.and_then(|p| p.partition_type)
        );
        assert_eq!(vec!["customer_id".to_string()], table.clustering.unwrap().fields);
    }

    #[test]
    fn counts_missing_or_garbled_default_to_zero() {
        assert_eq!(0, parse_count(None));
        assert_eq!(0, parse_count(Some("not-a-number")));
        assert_eq!(42, parse_count(Some("42")));
    }
}
