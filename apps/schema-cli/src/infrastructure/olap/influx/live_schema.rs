//! # Live-Schema Loader
//!
//! Builds the live [`Snapshot`] by issuing `SHOW DATABASES`,
//! `SHOW RETENTION POLICIES ON <db>` and `SHOW CONTINUOUS QUERIES` through
//! the query client and reshaping the series rows into the schema model.
//!
//! The `_internal` system database is always excluded: it is managed by the
//! server itself and must never be diffed against the declarative schema.

use serde_json::Value;
use tracing::info;

use crate::framework::core::schema::{ContinuousQuery, Database, RetentionPolicy, Snapshot};
use crate::infrastructure::olap::{ClientError, QueryClient, Series};

/// Name of the InfluxDB system database, never part of the live snapshot.
const INTERNAL_DATABASE: &str = "_internal";

fn string_value(row: &[Value], index: usize, context: &str) -> Result<String, ClientError> {
    row.get(index)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .ok_or_else(|| ClientError::UnexpectedResponse(format!("expected string for {context}")))
}

/// Decodes one `SHOW RETENTION POLICIES` series into policies. Columns are
/// resolved by name, not position, since the server has grown columns over
/// versions.
fn decode_retention_policies(series: &Series) -> Result<Vec<RetentionPolicy>, ClientError> {
    let name_idx = series.column_index("name")?;
    let duration_idx = series.column_index("duration")?;
    let shard_idx = series.column_index("shardGroupDuration")?;
    let replication_idx = series.column_index("replicaN")?;
    let default_idx = series.column_index("default")?;

    let mut policies = Vec::new();
    for row in &series.values {
        policies.push(RetentionPolicy {
            name: string_value(row, name_idx, "retention policy name")?,
            duration: string_value(row, duration_idx, "retention policy duration")?,
            shard_duration: string_value(row, shard_idx, "shard group duration")?,
            replication: row.get(replication_idx).and_then(Value::as_u64).unwrap_or(1),
            is_default: row.get(default_idx).and_then(Value::as_bool).unwrap_or(false),
        });
    }
    Ok(policies)
}

/// Loads the complete live snapshot from the server.
pub async fn load_live_snapshot<C: QueryClient + ?Sized>(
    client: &C,
) -> Result<Snapshot, ClientError> {
    let mut snapshot = Snapshot::default();

    let results = client.query("SHOW DATABASES").await?;
    for series in &results.series {
        for row in &series.values {
            let name = string_value(row, 0, "database name")?;
            if name == INTERNAL_DATABASE {
                continue;
            }
            snapshot
                .databases
                .insert(name.clone(), Database::new(name));
        }
    }

    let names: Vec<String> = snapshot.databases.keys().cloned().collect();
    for name in names {
        let results = client
            .query(&format!("SHOW RETENTION POLICIES ON \"{name}\""))
            .await?;
        let database = snapshot
            .databases
            .get_mut(&name)
            .expect("database was just inserted");
        for series in &results.series {
            for policy in decode_retention_policies(series)? {
                database
                    .retention_policies
                    .insert(policy.name.clone(), policy);
            }
        }
    }

    // One series per database; the series name is the database name.
    let results = client.query("SHOW CONTINUOUS QUERIES").await?;
    for series in &results.series {
        if series.name == INTERNAL_DATABASE || series.values.is_empty() {
            continue;
        }
        let name_idx = series.column_index("name")?;
        let query_idx = series.column_index("query")?;
        let queries = snapshot
            .continuous_queries
            .entry(series.name.clone())
            .or_default();
        for row in &series.values {
            let query_name = string_value(row, name_idx, "continuous query name")?;
            queries.insert(
                query_name.clone(),
                ContinuousQuery {
                    name: query_name,
                    database: series.name.clone(),
                    statement: string_value(row, query_idx, "continuous query text")?,
                },
            );
        }
    }

    info!(
        "Loaded live snapshot: {} databases, {} databases with continuous queries",
        snapshot.databases.len(),
        snapshot.continuous_queries.len()
    );
    Ok(snapshot)
}
