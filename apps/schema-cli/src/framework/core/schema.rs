//! # Schema Model
//!
//! The typed view of everything this tool manages: databases, their retention
//! policies, and continuous queries. Two [`Snapshot`] values exist per run —
//! one loaded from the live server, one built from the schema files — and
//! neither is mutated after construction; the differ only ever reads them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named data-retention/replication rule scoped to one database.
///
/// Duration fields keep the literal spelling they were declared or reported
/// with (`"2w"`, `"168h0m0s"`, `"INF"`); equivalence is decided on the
/// normalized value, never on the literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub name: String,
    pub duration: String,
    pub shard_duration: String,
    pub replication: u64,
    pub is_default: bool,
}

/// A database and the retention policies it owns, keyed by policy name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    pub retention_policies: BTreeMap<String, RetentionPolicy>,
}

impl Database {
    pub fn new(name: String) -> Self {
        Self {
            name,
            retention_policies: BTreeMap::new(),
        }
    }
}

/// A continuous query, stored with its full `CREATE CONTINUOUS QUERY … END`
/// statement text. The text is what gets re-issued on create/update, and is
/// also the input to equivalence comparison (after normalization).
///
/// Query names may contain dots or other separator characters, so lookups are
/// always exact-name matches on the owning database's map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuousQuery {
    pub name: String,
    pub database: String,
    pub statement: String,
}

/// A complete, point-in-time view of all managed objects from one source:
/// the live instance or the desired configuration.
///
/// Continuous queries are kept apart from [`Database`] because the live server
/// reports them through a separate statement, and because the differ walks
/// them over the union of database names rather than per surviving database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Databases keyed by name.
    pub databases: BTreeMap<String, Database>,
    /// Continuous queries keyed by database name, then query name.
    pub continuous_queries: BTreeMap<String, BTreeMap<String, ContinuousQuery>>,
}

impl Snapshot {
    /// Database names, in lexicographic order.
    pub fn database_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    /// Continuous queries for one database; empty if the database has none.
    pub fn queries_for(&self, database: &str) -> BTreeMap<String, ContinuousQuery> {
        self.continuous_queries
            .get(database)
            .cloned()
            .unwrap_or_default()
    }
}
