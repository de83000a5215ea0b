//! # Update Planner
//!
//! Orders the differ's change records into a single executable sequence and
//! applies the skip policy for destructive operations.
//!
//! The stage order is fixed so that no operation references an object that
//! does not exist yet and no deletion leaves a dependent operation dangling:
//! continuous-query drops come before the database/policy drops that might
//! remove their target, all teardown precedes all setup, databases are
//! created before the retention policies and continuous queries that live in
//! them. Teardown stages run in reverse lexicographic order, setup stages in
//! forward lexicographic order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::diff::{Action, ChangeRecord, ObjectKind};

/// The fully ordered, skip-annotated operation sequence for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlan {
    pub records: Vec<ChangeRecord>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped_count(&self) -> usize {
        self.records.iter().filter(|r| r.skipped).count()
    }
}

/// Run policy the planner applies per record.
///
/// `dry_run` is true for diff-mode runs and `apply --dry-run`;
/// `allow_destructive` is the explicit opt-in for drops.
#[derive(Debug, Clone, Copy)]
pub struct PlanPolicy {
    pub dry_run: bool,
    pub allow_destructive: bool,
}

impl PlanPolicy {
    /// Deletes are withheld unless this is a real apply run with destructive
    /// operations explicitly enabled. Creates and updates are withheld only
    /// on dry runs.
    fn skips(&self, record: &ChangeRecord) -> bool {
        match record.action {
            Action::Delete => self.dry_run || !self.allow_destructive,
            Action::Create | Action::Update => self.dry_run,
        }
    }
}

fn sort_key(record: &ChangeRecord) -> (String, String) {
    (record.database.clone(), record.name.clone())
}

fn stage<'a>(
    records: &[&'a ChangeRecord],
    actions: &[Action],
    kind: ObjectKind,
    reverse: bool,
) -> Vec<&'a ChangeRecord> {
    let mut selected: Vec<&ChangeRecord> = records
        .iter()
        .filter(|r| actions.contains(&r.action) && r.kind == kind)
        .copied()
        .collect();
    selected.sort_by_key(|r| sort_key(r));
    if reverse {
        selected.reverse();
    }
    selected
}

/// Builds the ordered plan from unordered change records.
///
/// Stages, in order:
/// 1. continuous-query deletions (reverse-sorted)
/// 2. retention-policy deletions (reverse-sorted)
/// 3. database deletions (reverse-sorted)
/// 4. database creations
/// 5. retention-policy creations
/// 6. retention-policy updates
/// 7. continuous-query creations and updates
pub fn build_plan(records: Vec<ChangeRecord>, policy: PlanPolicy) -> UpdatePlan {
    let refs: Vec<&ChangeRecord> = records.iter().collect();

    let stages: Vec<Vec<&ChangeRecord>> = vec![
        stage(&refs, &[Action::Delete], ObjectKind::ContinuousQuery, true),
        stage(&refs, &[Action::Delete], ObjectKind::RetentionPolicy, true),
        stage(&refs, &[Action::Delete], ObjectKind::Database, true),
        stage(&refs, &[Action::Create], ObjectKind::Database, false),
        stage(&refs, &[Action::Create], ObjectKind::RetentionPolicy, false),
        stage(&refs, &[Action::Update], ObjectKind::RetentionPolicy, false),
        stage(
            &refs,
            &[Action::Create, Action::Update],
            ObjectKind::ContinuousQuery,
            false,
        ),
    ];

    let mut ordered = Vec::with_capacity(records.len());
    for staged in stages {
        for record in staged {
            let mut record = record.clone();
            record.skipped = policy.skips(&record);
            ordered.push(record);
        }
    }

    debug!(
        "Planned {} operations ({} skipped by policy)",
        ordered.len(),
        ordered.iter().filter(|r| r.skipped).count()
    );
    UpdatePlan { records: ordered }
}
