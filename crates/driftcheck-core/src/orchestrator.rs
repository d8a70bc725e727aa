//! Verification run
//!
//! Fetch live → fetch declared → compare → (all match) `terraform plan`,
//! all bound to one [`RunContext`].

use crate::compare::{ComparisonRow, all_match, compare};
use crate::context::RunContext;
use crate::declared::{DeclaredStateSource, TERRAFORM, chdir_arg};
use crate::error::{Result, VerifyError};
use crate::executor::ContextCommandExecutor;
use crate::fetcher::LiveResourceFetcher;
use crate::options::VerificationOptions;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tracing::Instrument;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_DRIFT: i32 = 2;

/// `terraform plan -detailed-exitcode` exit code for pending changes
pub const PLAN_CHANGES_EXIT_CODE: i32 = 2;

/// Stage a run was in when it stopped
///
/// Comparison cannot fail, so it has no phase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    FetchingLive,
    FetchingDeclared,
    PlanCheck,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::FetchingLive => write!(f, "fetching live state"),
            Phase::FetchingDeclared => write!(f, "fetching declared state"),
            Phase::PlanCheck => write!(f, "plan check"),
        }
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both sides have no resources at all
    EmptyEnvironment,
    /// Counts match and the plan check was skipped
    Matched,
    /// Counts match and `terraform plan` reports no changes
    PlanClean,
    /// Counts match but `terraform plan` reports pending changes
    PlanChanges,
    /// At least one count differs
    Mismatch,
    Failed,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::EmptyEnvironment | Outcome::Matched | Outcome::PlanClean => EXIT_OK,
            Outcome::PlanChanges | Outcome::Mismatch => EXIT_DRIFT,
            Outcome::Failed => EXIT_FAILURE,
        }
    }
}

/// Result of one run, handed to the presentation layer
#[derive(Debug, Serialize)]
pub struct VerificationReport {
    pub environment: String,
    pub outcome: Outcome,
    pub exit_code: i32,
    pub rows: Vec<ComparisonRow>,
    /// Phase in which a failed run stopped
    pub failed_phase: Option<Phase>,
    #[serde(serialize_with = "error_message")]
    pub error: Option<VerifyError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

fn error_message<S: Serializer>(
    error: &Option<VerifyError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl VerificationReport {
    fn start(environment: &str) -> Self {
        let now = Utc::now();
        Self {
            environment: environment.to_string(),
            outcome: Outcome::Failed,
            exit_code: EXIT_FAILURE,
            rows: Vec::new(),
            failed_phase: None,
            error: None,
            started_at: now,
            finished_at: now,
        }
    }

    fn finish(mut self, outcome: Outcome, rows: Vec<ComparisonRow>) -> Self {
        self.outcome = outcome;
        self.exit_code = outcome.exit_code();
        self.rows = rows;
        self.finished_at = Utc::now();
        self
    }

    fn fail(mut self, phase: Phase, error: VerifyError, rows: Vec<ComparisonRow>) -> Self {
        tracing::debug!("Verification failed while {}: {}", phase, error);
        self.failed_phase = Some(phase);
        self.error = Some(error);
        self.finish(Outcome::Failed, rows)
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == EXIT_OK
    }

    pub fn error(&self) -> Option<&VerifyError> {
        self.error.as_ref()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|row| !row.is_match)
    }
}

/// A stage result, overridden by the context's error once it has stopped
fn gate<T>(ctx: &RunContext, result: Result<T>) -> Result<T> {
    match ctx.err() {
        Some(e) => Err(VerifyError::Context(e)),
        None => result,
    }
}

/// Runs verification against one environment
pub struct Verifier {
    live: LiveResourceFetcher,
    declared: DeclaredStateSource,
    executor: Arc<dyn ContextCommandExecutor>,
}

impl Verifier {
    pub fn new(executor: Arc<dyn ContextCommandExecutor>) -> Self {
        Self {
            live: LiveResourceFetcher::new(executor.clone()),
            declared: DeclaredStateSource::new(executor.clone()),
            executor,
        }
    }

    pub async fn run(&self, ctx: &RunContext, options: &VerificationOptions) -> VerificationReport {
        let span = tracing::info_span!("verify", environment = %options.environment);
        self.run_phases(ctx, options).instrument(span).await
    }

    async fn run_phases(
        &self,
        ctx: &RunContext,
        options: &VerificationOptions,
    ) -> VerificationReport {
        let report = VerificationReport::start(&options.environment);

        if let Err(e) = ctx.check() {
            return report.fail(Phase::Idle, e.into(), Vec::new());
        }

        tracing::info!("Fetching live resources");
        let live = match gate(ctx, self.live.fetch(ctx, options).await) {
            Ok(counts) => counts,
            Err(e) => return report.fail(Phase::FetchingLive, e, Vec::new()),
        };

        tracing::info!("Fetching declared resources");
        let declared = match gate(ctx, self.declared.fetch(ctx, options).await) {
            Ok(counts) => counts,
            Err(e) => return report.fail(Phase::FetchingDeclared, e, Vec::new()),
        };

        let rows = compare(&live, &declared);

        if !all_match(&rows) {
            let mismatched = rows.iter().filter(|row| !row.is_match).count();
            tracing::warn!("{} of {} counts differ", mismatched, rows.len());
            return report.finish(Outcome::Mismatch, rows);
        }

        if live.is_empty() && declared.is_empty() {
            tracing::info!("Environment is empty on both sides");
            return report.finish(Outcome::EmptyEnvironment, rows);
        }

        if options.skip_plan {
            tracing::info!("All counts match, plan check skipped");
            return report.finish(Outcome::Matched, rows);
        }

        if let Err(e) = ctx.check() {
            return report.fail(Phase::PlanCheck, e.into(), rows);
        }

        match gate(ctx, self.plan_has_changes(ctx, options).await) {
            Ok(false) => report.finish(Outcome::PlanClean, rows),
            Ok(true) => {
                tracing::warn!("terraform plan reports pending changes");
                report.finish(Outcome::PlanChanges, rows)
            }
            Err(e) => report.fail(Phase::PlanCheck, e, rows),
        }
    }

    /// Run `terraform plan -detailed-exitcode`; `true` when changes are pending
    async fn plan_has_changes(
        &self,
        ctx: &RunContext,
        options: &VerificationOptions,
    ) -> Result<bool> {
        let mut args = vec![chdir_arg(&options.terraform_dir)];
        args.extend(
            [
                "plan",
                "-lock=false",
                "-input=false",
                "-detailed-exitcode",
                "-no-color",
            ]
            .map(String::from),
        );

        tracing::info!(
            "Running terraform plan ({}s remaining)",
            ctx.remaining().as_secs()
        );

        match self.executor.execute_with_context(ctx, TERRAFORM, &args).await {
            Ok(_) => Ok(false),
            Err(e) if e.exit_code() == Some(PLAN_CHANGES_EXIT_CODE) => Ok(true),
            Err(e) => {
                if let Some(context) = ctx.err().or_else(|| e.context_error()) {
                    return Err(VerifyError::Context(context));
                }
                Err(VerifyError::Plan {
                    environment: options.environment.clone(),
                    source: e,
                })
            }
        }
    }
}
