//! # Routines
//!
//! A routine is one CLI command run end to end, returning either a
//! [`RoutineSuccess`] or a [`RoutineFailure`] for the caller to display and
//! turn into an exit code. The two routines here share the same pipeline:
//! load the desired snapshot from disk, ping the server, load the live
//! snapshot, diff, plan — then either render the plan or apply it.

use std::path::Path;

use tracing::info;

use crate::cli::display::{Message, MessageType};
use crate::framework::core::diff::diff_snapshots;
use crate::framework::core::execute::{apply_plan, render_plan};
use crate::framework::core::plan::{build_plan, PlanPolicy, UpdatePlan};
use crate::framework::schema_files::load_desired_snapshot;
use crate::infrastructure::olap::influx::client::InfluxClient;
use crate::infrastructure::olap::influx::config::InfluxConfig;
use crate::infrastructure::olap::influx::live_schema::load_live_snapshot;
use crate::infrastructure::olap::QueryClient;

/// Exit code for a fatal error (parse failure, connectivity, failed statement).
pub const EXIT_FATAL: u8 = 1;
/// Exit code for a run in which required destructive operations were skipped.
pub const EXIT_SKIPPED: u8 = 2;

#[derive(Debug, Clone)]
#[must_use = "The message should be displayed."]
pub struct RoutineSuccess {
    pub message: Message,
    pub message_type: MessageType,
}

impl RoutineSuccess {
    pub fn success(message: Message) -> Self {
        Self {
            message,
            message_type: MessageType::Success,
        }
    }

    pub fn highlight(message: Message) -> Self {
        Self {
            message,
            message_type: MessageType::Highlight,
        }
    }
}

#[derive(Debug)]
pub struct RoutineFailure {
    pub message: Message,
    pub message_type: MessageType,
    pub error: Option<anyhow::Error>,
    pub exit_code: u8,
}

impl RoutineFailure {
    pub fn new<F: Into<anyhow::Error>>(message: Message, error: F) -> Self {
        Self {
            message,
            message_type: MessageType::Error,
            error: Some(error.into()),
            exit_code: EXIT_FATAL,
        }
    }

    /// create a RoutineFailure error without an underlying error
    pub fn error(message: Message) -> Self {
        Self {
            message,
            message_type: MessageType::Error,
            error: None,
            exit_code: EXIT_FATAL,
        }
    }

    /// A run that completed but withheld destructive operations. Not an
    /// error, but distinct from full success in the exit status.
    pub fn skipped(message: Message) -> Self {
        Self {
            message,
            message_type: MessageType::Highlight,
            error: None,
            exit_code: EXIT_SKIPPED,
        }
    }
}

impl From<RoutineFailure> for anyhow::Error {
    fn from(failure: RoutineFailure) -> Self {
        if let Some(err) = failure.error {
            err
        } else {
            anyhow::anyhow!("{}: {}", failure.message.action, failure.message.details)
        }
    }
}

/// Loads both snapshots and computes the ordered plan. Shared by the plan
/// and apply routines; only the policy differs.
async fn compute_plan(
    schema_dir: &Path,
    client: &InfluxClient,
    policy: PlanPolicy,
) -> Result<UpdatePlan, RoutineFailure> {
    let desired = load_desired_snapshot(schema_dir).map_err(|e| {
        RoutineFailure::new(
            Message::new(
                "Loading".to_string(),
                format!("schema files in {}", schema_dir.display()),
            ),
            e,
        )
    })?;

    client.ping().await.map_err(|e| {
        RoutineFailure::new(
            Message::new(
                "Connecting".to_string(),
                client.config().display_connection(),
            ),
            e,
        )
    })?;

    let live = load_live_snapshot(client).await.map_err(|e| {
        RoutineFailure::new(
            Message::new(
                "Loading".to_string(),
                format!("live schema from {}", client.config().display_connection()),
            ),
            e,
        )
    })?;

    info!(
        "Diffing {} live against {} desired databases",
        live.databases.len(),
        desired.databases.len()
    );
    Ok(build_plan(diff_snapshots(&live, &desired), policy))
}

/// `plan`: print the statements an apply run would submit, then exit
/// successfully. Destructive records are rendered with a comment marker
/// since an apply without --force would withhold them. Nothing is submitted.
pub async fn plan(
    schema_dir: &Path,
    influx_config: InfluxConfig,
) -> Result<RoutineSuccess, RoutineFailure> {
    let client = InfluxClient::new(influx_config);
    let policy = PlanPolicy {
        dry_run: false,
        allow_destructive: false,
    };
    let plan = compute_plan(schema_dir, &client, policy).await?;

    if !plan.is_empty() {
        print!("{}", render_plan(&plan));
    }
    Ok(plan_summary(&plan))
}

/// The closing summary of a plan run. Highlight messages land on stderr, so
/// stdout carries nothing but the rendered statements.
fn plan_summary(plan: &UpdatePlan) -> RoutineSuccess {
    if plan.is_empty() {
        RoutineSuccess::highlight(Message::new(
            "Plan".to_string(),
            "schema is up to date, nothing to change".to_string(),
        ))
    } else {
        RoutineSuccess::highlight(Message::new(
            "Plan".to_string(),
            format!("{} pending operations", plan.records.len()),
        ))
    }
}

/// `apply`: submit the plan in order, fail-fast, and report skips.
pub async fn apply(
    schema_dir: &Path,
    influx_config: InfluxConfig,
    dry_run: bool,
    force: bool,
) -> Result<RoutineSuccess, RoutineFailure> {
    let client = InfluxClient::new(influx_config);
    let policy = PlanPolicy {
        dry_run,
        allow_destructive: force,
    };
    let plan = compute_plan(schema_dir, &client, policy).await?;
    apply_and_report(&client, &plan).await
}

/// Applies the plan through any query client and maps the summary to the
/// routine outcome: a run with withheld operations carries the distinct
/// skip exit status, a fully applied run is a success.
async fn apply_and_report<C: QueryClient + ?Sized>(
    client: &C,
    plan: &UpdatePlan,
) -> Result<RoutineSuccess, RoutineFailure> {
    let summary = apply_plan(client, plan).await.map_err(|e| {
        RoutineFailure::new(
            Message::new("Applying".to_string(), "plan aborted".to_string()),
            e,
        )
    })?;

    if summary.skipped > 0 {
        return Err(RoutineFailure::skipped(Message::new(
            "Skipped".to_string(),
            format!(
                "{} operations withheld ({} applied); re-run without --dry-run or with --force to apply them",
                summary.skipped, summary.applied
            ),
        )));
    }

    Ok(RoutineSuccess::success(Message::new(
        "Applied".to_string(),
        format!("{} operations", summary.applied),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::core::diff::{Action, ChangeRecord, ObjectKind};
    use crate::framework::core::plan::build_plan;
    use crate::infrastructure::olap::{ClientError, QueryResults};
    use async_trait::async_trait;

    struct NoopClient;

    #[async_trait]
    impl QueryClient for NoopClient {
        async fn query(&self, _statement: &str) -> Result<QueryResults, ClientError> {
            Ok(QueryResults::default())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl QueryClient for FailingClient {
        async fn query(&self, _statement: &str) -> Result<QueryResults, ClientError> {
            Err(ClientError::Server("boom".to_string()))
        }
    }

    fn drop_record() -> ChangeRecord {
        ChangeRecord {
            action: Action::Delete,
            kind: ObjectKind::Database,
            database: "old".to_string(),
            name: "old".to_string(),
            statement: "DROP DATABASE \"old\"".to_string(),
            skipped: false,
        }
    }

    #[tokio::test]
    async fn test_withheld_destructive_operations_exit_with_skip_status() {
        let plan = build_plan(
            vec![drop_record()],
            PlanPolicy {
                dry_run: false,
                allow_destructive: false,
            },
        );
        let failure = apply_and_report(&NoopClient, &plan).await.unwrap_err();
        assert_eq!(failure.exit_code, EXIT_SKIPPED);
        assert_eq!(failure.message_type, MessageType::Highlight);
        assert!(failure.error.is_none());
    }

    #[tokio::test]
    async fn test_fully_applied_plan_is_success() {
        let plan = build_plan(
            vec![drop_record()],
            PlanPolicy {
                dry_run: false,
                allow_destructive: true,
            },
        );
        let success = apply_and_report(&NoopClient, &plan).await.unwrap();
        assert_eq!(success.message_type, MessageType::Success);
    }

    #[tokio::test]
    async fn test_failed_statement_is_fatal() {
        let plan = build_plan(
            vec![drop_record()],
            PlanPolicy {
                dry_run: false,
                allow_destructive: true,
            },
        );
        let failure = apply_and_report(&FailingClient, &plan).await.unwrap_err();
        assert_eq!(failure.exit_code, EXIT_FATAL);
    }

    #[test]
    fn test_plan_summary_keeps_stdout_for_the_diff() {
        let empty = UpdatePlan::default();
        assert_eq!(plan_summary(&empty).message_type, MessageType::Highlight);

        let plan = build_plan(
            vec![drop_record()],
            PlanPolicy {
                dry_run: false,
                allow_destructive: false,
            },
        );
        let summary = plan_summary(&plan);
        assert_eq!(summary.message_type, MessageType::Highlight);
        assert!(summary.message.details.contains("1 pending"));
    }
}
