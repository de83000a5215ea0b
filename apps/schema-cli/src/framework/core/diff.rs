//! # Schema Differ
//!
//! Compares a live [`Snapshot`] with a desired [`Snapshot`] and classifies
//! every named object as obsolete, unchanged, changed, or new, producing the
//! typed [`ChangeRecord`]s the planner orders into an executable sequence.
//!
//! The three passes are all driven by the set reconciler:
//! 1. Databases — left-only become drops, right-only become creates, the
//!    intersection recurses into the retention-policy pass.
//! 2. Retention policies — per database in the intersection and per newly
//!    created database. "Changed" is decided on normalized durations plus the
//!    default flag, never on the literal spellings.
//! 3. Continuous queries — over the union of database names from either
//!    snapshot, compared on normalized statement text.
//!
//! Each record carries the literal statement to execute, so everything
//! downstream (planner, renderer, executor) is independent of the schema
//! model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::durations::normalize_duration;
use super::reconcile::reconcile;
use super::schema::{ContinuousQuery, RetentionPolicy, Snapshot};

/// What a change record does to its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Delete,
    Update,
    Create,
}

/// The kind of object a change record targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Database,
    RetentionPolicy,
    ContinuousQuery,
}

/// One planned operation against the live instance.
///
/// `skipped` is always `false` when the differ emits a record; the planner
/// decides skips from the run policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub action: Action,
    pub kind: ObjectKind,
    /// Owning database name. For database records this equals `name`.
    pub database: String,
    pub name: String,
    /// The literal statement submitted to the server for this change.
    pub statement: String,
    pub skipped: bool,
}

impl ChangeRecord {
    fn new(
        action: Action,
        kind: ObjectKind,
        database: &str,
        name: &str,
        statement: String,
    ) -> Self {
        Self {
            action,
            kind,
            database: database.to_string(),
            name: name.to_string(),
            statement,
            skipped: false,
        }
    }
}

// =========================================================
// Statement builders
// =========================================================

pub fn create_database_statement(name: &str) -> String {
    format!("CREATE DATABASE \"{name}\"")
}

pub fn drop_database_statement(name: &str) -> String {
    format!("DROP DATABASE \"{name}\"")
}

pub fn create_retention_policy_statement(database: &str, policy: &RetentionPolicy) -> String {
    format!(
        "CREATE RETENTION POLICY \"{}\" ON \"{}\" DURATION {} REPLICATION {} SHARD DURATION {}{}",
        policy.name,
        database,
        policy.duration,
        policy.replication,
        policy.shard_duration,
        if policy.is_default { " DEFAULT" } else { "" }
    )
}

/// The alter statement always reasserts the desired state in full: duration,
/// a replication factor of 1, shard duration, and the DEFAULT keyword when
/// applicable. The live replication factor is intentionally not preserved.
pub fn alter_retention_policy_statement(database: &str, policy: &RetentionPolicy) -> String {
    format!(
        "ALTER RETENTION POLICY \"{}\" ON \"{}\" DURATION {} REPLICATION 1 SHARD DURATION {}{}",
        policy.name,
        database,
        policy.duration,
        policy.shard_duration,
        if policy.is_default { " DEFAULT" } else { "" }
    )
}

pub fn drop_retention_policy_statement(database: &str, name: &str) -> String {
    format!("DROP RETENTION POLICY \"{name}\" ON \"{database}\"")
}

pub fn drop_continuous_query_statement(database: &str, name: &str) -> String {
    format!("DROP CONTINUOUS QUERY \"{name}\" ON \"{database}\"")
}

/// A changed continuous query is replaced with one combined drop-then-create
/// statement so the operation is atomic from the caller's point of view.
pub fn replace_continuous_query_statement(query: &ContinuousQuery) -> String {
    format!(
        "{}; {}",
        drop_continuous_query_statement(&query.database, &query.name),
        query.statement
    )
}

// =========================================================
// Equivalence rules
// =========================================================

/// Canonicalizes continuous-query text for comparison.
///
/// Strips whitespace, statement terminators and quoting, lower-cases, and
/// removes the `fill(null)` modifier — a no-op the server never echoes back,
/// which would otherwise make every such query look permanently changed.
/// The original text is untouched; this form exists only for equality checks.
pub fn normalize_query_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ';' | '"' | '\''))
        .collect();
    stripped.to_lowercase().replace("fill(null)", "")
}

fn queries_equivalent(a: &ContinuousQuery, b: &ContinuousQuery) -> bool {
    normalize_query_text(&a.statement) == normalize_query_text(&b.statement)
}

fn policies_equivalent(a: &RetentionPolicy, b: &RetentionPolicy) -> bool {
    normalize_duration(&a.duration) == normalize_duration(&b.duration)
        && normalize_duration(&a.shard_duration) == normalize_duration(&b.shard_duration)
        && a.is_default == b.is_default
}

// =========================================================
// Diff passes
// =========================================================

/// Produces the full, unordered list of change records between two snapshots.
///
/// Record order within the result is not meaningful; the planner imposes the
/// dependency-safe stage ordering.
pub fn diff_snapshots(live: &Snapshot, desired: &Snapshot) -> Vec<ChangeRecord> {
    let mut records = Vec::new();

    let db_diff = reconcile(&live.database_names(), &desired.database_names());

    for name in &db_diff.left_only {
        records.push(ChangeRecord::new(
            Action::Delete,
            ObjectKind::Database,
            name,
            name,
            drop_database_statement(name),
        ));
    }

    let no_policies = BTreeMap::new();
    for name in &db_diff.right_only {
        records.push(ChangeRecord::new(
            Action::Create,
            ObjectKind::Database,
            name,
            name,
            create_database_statement(name),
        ));
        // A new database gets all of its desired policies created alongside it.
        diff_retention_policies(
            name,
            &no_policies,
            &desired.databases[name].retention_policies,
            &mut records,
        );
    }

    for name in &db_diff.in_both {
        diff_retention_policies(
            name,
            &live.databases[name].retention_policies,
            &desired.databases[name].retention_policies,
            &mut records,
        );
    }

    diff_continuous_queries(live, desired, &mut records);

    info!("Schema diff produced {} change records", records.len());
    records
}

fn diff_retention_policies(
    database: &str,
    live: &BTreeMap<String, RetentionPolicy>,
    desired: &BTreeMap<String, RetentionPolicy>,
    records: &mut Vec<ChangeRecord>,
) {
    let live_names: Vec<String> = live.keys().cloned().collect();
    let desired_names: Vec<String> = desired.keys().cloned().collect();
    let diff = reconcile(&live_names, &desired_names);

    for name in &diff.left_only {
        records.push(ChangeRecord::new(
            Action::Delete,
            ObjectKind::RetentionPolicy,
            database,
            name,
            drop_retention_policy_statement(database, name),
        ));
    }
    for name in &diff.right_only {
        records.push(ChangeRecord::new(
            Action::Create,
            ObjectKind::RetentionPolicy,
            database,
            name,
            create_retention_policy_statement(database, &desired[name]),
        ));
    }
    for name in &diff.in_both {
        if !policies_equivalent(&live[name], &desired[name]) {
            records.push(ChangeRecord::new(
                Action::Update,
                ObjectKind::RetentionPolicy,
                database,
                name,
                alter_retention_policy_statement(database, &desired[name]),
            ));
        }
    }
}

fn diff_continuous_queries(live: &Snapshot, desired: &Snapshot, records: &mut Vec<ChangeRecord>) {
    // The union of databases from either snapshot: obsolete queries live in
    // databases the desired side no longer declares, and vice versa.
    let live_dbs: Vec<String> = live.continuous_queries.keys().cloned().collect();
    let desired_dbs: Vec<String> = desired.continuous_queries.keys().cloned().collect();
    let db_diff = reconcile(&live_dbs, &desired_dbs);
    let all_dbs = db_diff
        .left_only
        .iter()
        .chain(db_diff.in_both.iter())
        .chain(db_diff.right_only.iter());

    for database in all_dbs {
        let live_queries = live.queries_for(database);
        let desired_queries = desired.queries_for(database);

        let live_names: Vec<String> = live_queries.keys().cloned().collect();
        let desired_names: Vec<String> = desired_queries.keys().cloned().collect();
        let diff = reconcile(&live_names, &desired_names);

        for name in &diff.left_only {
            records.push(ChangeRecord::new(
                Action::Delete,
                ObjectKind::ContinuousQuery,
                database,
                name,
                drop_continuous_query_statement(database, name),
            ));
        }
        for name in &diff.right_only {
            records.push(ChangeRecord::new(
                Action::Create,
                ObjectKind::ContinuousQuery,
                database,
                name,
                desired_queries[name].statement.clone(),
            ));
        }
        for name in &diff.in_both {
            if !queries_equivalent(&live_queries[name], &desired_queries[name]) {
                records.push(ChangeRecord::new(
                    Action::Update,
                    ObjectKind::ContinuousQuery,
                    database,
                    name,
                    replace_continuous_query_statement(&desired_queries[name]),
                ));
            }
        }
    }
}
