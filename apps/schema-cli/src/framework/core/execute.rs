//! # Plan Executor / Diff Renderer
//!
//! Consumes the ordered [`UpdatePlan`] in one of two mutually exclusive
//! modes: render it as text (diff mode, never contacts the server) or submit
//! each non-skipped statement through the query client in order (apply mode,
//! fail-fast, no retries, no rollback — partial application is expected and
//! already-applied operations stand).

use tracing::{info, warn};

use crate::cli::display::{Message, MessageType};
use crate::framework::core::diff::Action;
use crate::framework::core::plan::UpdatePlan;
use crate::infrastructure::olap::{ClientError, QueryClient};
use crate::show_message;

/// Errors that can occur while applying a plan.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// A submitted statement failed; the remaining plan was aborted.
    #[error("Failed to apply '{statement}'")]
    StatementFailed {
        statement: String,
        #[source]
        source: ClientError,
    },
}

/// Outcome of an apply run. The run counts as fully successful only when
/// nothing was skipped and nothing failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Comment marker prefixing skipped records in rendered diffs.
const SKIP_MARKER: &str = "-- ";

/// Renders the plan as text, one statement per line, in plan order.
/// Skipped records are prefixed with a comment marker.
pub fn render_plan(plan: &UpdatePlan) -> String {
    let mut out = String::new();
    for record in &plan.records {
        if record.skipped {
            out.push_str(SKIP_MARKER);
        }
        out.push_str(&record.statement);
        out.push('\n');
    }
    out
}

fn action_label(action: Action) -> &'static str {
    match action {
        Action::Delete => "Dropping",
        Action::Update => "Updating",
        Action::Create => "Creating",
    }
}

/// Applies the plan in order through the query client.
///
/// Skipped records emit a skip notice and increment the skip counter; all
/// others emit an action notice and are submitted. The first failing
/// submission aborts the run.
pub async fn apply_plan<C: QueryClient + ?Sized>(
    client: &C,
    plan: &UpdatePlan,
) -> Result<ApplySummary, ExecutionError> {
    let mut summary = ApplySummary::default();

    for record in &plan.records {
        if record.skipped {
            warn!("Skipping by policy: {}", record.statement);
            show_message!(
                MessageType::Highlight,
                Message {
                    action: "Skipping".to_string(),
                    details: record.statement.clone(),
                }
            );
            summary.skipped += 1;
            continue;
        }

        info!("Applying: {}", record.statement);
        show_message!(
            MessageType::Info,
            Message {
                action: action_label(record.action).to_string(),
                details: format!("{:?} {}.{}", record.kind, record.database, record.name),
            }
        );
        client
            .query(&record.statement)
            .await
            .map_err(|source| ExecutionError::StatementFailed {
                statement: record.statement.clone(),
                source,
            })?;
        summary.applied += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::core::diff::{Action, ChangeRecord, ObjectKind};
    use crate::framework::core::plan::{build_plan, PlanPolicy};
    use crate::infrastructure::olap::QueryResults;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingClient {
        statements: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingClient {
        fn new() -> Self {
            Self {
                statements: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(statement: &str) -> Self {
            Self {
                statements: Mutex::new(Vec::new()),
                fail_on: Some(statement.to_string()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryClient for RecordingClient {
        async fn query(&self, statement: &str) -> Result<QueryResults, ClientError> {
            if self.fail_on.as_deref() == Some(statement) {
                return Err(ClientError::Server("boom".to_string()));
            }
            self.statements.lock().unwrap().push(statement.to_string());
            Ok(QueryResults::default())
        }
    }

    fn record(action: Action, statement: &str) -> ChangeRecord {
        ChangeRecord {
            action,
            kind: ObjectKind::Database,
            database: "db".to_string(),
            name: "db".to_string(),
            statement: statement.to_string(),
            skipped: false,
        }
    }

    #[test]
    fn test_render_marks_skipped_records() {
        let plan = build_plan(
            vec![
                record(Action::Create, "CREATE DATABASE \"db\""),
                record(Action::Delete, "DROP DATABASE \"db\""),
            ],
            PlanPolicy {
                dry_run: true,
                allow_destructive: false,
            },
        );
        let rendered = render_plan(&plan);
        assert_eq!(
            rendered,
            "-- DROP DATABASE \"db\"\n-- CREATE DATABASE \"db\"\n"
        );
    }

    #[test]
    fn test_render_unskipped_records_have_no_marker() {
        let plan = build_plan(
            vec![record(Action::Create, "CREATE DATABASE \"db\"")],
            PlanPolicy {
                dry_run: false,
                allow_destructive: false,
            },
        );
        assert_eq!(render_plan(&plan), "CREATE DATABASE \"db\"\n");
    }

    #[tokio::test]
    async fn test_apply_submits_in_plan_order() {
        let plan = build_plan(
            vec![
                record(Action::Create, "CREATE DATABASE \"db\""),
                record(Action::Delete, "DROP DATABASE \"old\""),
            ],
            PlanPolicy {
                dry_run: false,
                allow_destructive: true,
            },
        );
        let client = RecordingClient::new();
        let summary = apply_plan(&client, &plan).await.unwrap();
        assert_eq!(summary, ApplySummary { applied: 2, skipped: 0 });
        assert_eq!(
            client.seen(),
            vec!["DROP DATABASE \"old\"", "CREATE DATABASE \"db\""]
        );
    }

    #[tokio::test]
    async fn test_dry_run_counts_skips_and_never_calls_client() {
        let plan = build_plan(
            vec![record(Action::Create, "CREATE DATABASE \"db\"")],
            PlanPolicy {
                dry_run: true,
                allow_destructive: false,
            },
        );
        assert!(!render_plan(&plan).is_empty());

        let client = RecordingClient::new();
        let summary = apply_plan(&client, &plan).await.unwrap();
        assert_eq!(summary, ApplySummary { applied: 0, skipped: 1 });
        assert!(client.seen().is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_aborts_remaining_plan() {
        let plan = build_plan(
            vec![
                record(Action::Create, "CREATE DATABASE \"a\""),
                ChangeRecord {
                    name: "b".to_string(),
                    database: "b".to_string(),
                    ..record(Action::Create, "CREATE DATABASE \"b\"")
                },
            ],
            PlanPolicy {
                dry_run: false,
                allow_destructive: false,
            },
        );
        let client = RecordingClient::failing_on("CREATE DATABASE \"a\"");
        let err = apply_plan(&client, &plan).await.unwrap_err();
        assert!(matches!(err, ExecutionError::StatementFailed { .. }));
        // Nothing after the failing statement was submitted.
        assert!(client.seen().is_empty());
    }
}
