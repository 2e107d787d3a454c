//! Coverity pipeline orchestration.

use crate::analyze::CovAnalyzeCommand;
use crate::capture_test::CovCaptureTestCommand;
use crate::command::{BuildContext, CommandInvocation, CoverityCommand, EnvVars};
use crate::digest::invocation_digest;
use crate::import_scm::CovImportScmCommand;
use crate::manage_history::CovManageHistoryCommand;
use crate::runner::{CommandOutcome, CommandRunner};
use anyhow::Context;
use chrono::{DateTime, Utc};
use cov_core::OptionSet;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of a complete pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Unique id of this execution.
    pub run_id: String,

    pub started_at: DateTime<Utc>,

    /// Whether every launched command passed.
    pub success: bool,

    /// Outcomes of launched commands, in launch order.
    pub steps: Vec<CommandOutcome>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,

    /// Digest of the planned invocations.
    pub invocation_digest: String,
}

impl PipelineResult {
    /// Number of commands that passed.
    pub fn passed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.passed()).count()
    }

    /// Number of commands that failed.
    pub fn failed_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.passed()).count()
    }
}

/// Runs the configured Coverity commands in order.
pub struct CoverityPipeline;

impl CoverityPipeline {
    /// The commands in execution order: history download, SCM import, test
    /// capture, analysis.
    pub fn commands(options: &OptionSet) -> Vec<Box<dyn CoverityCommand + '_>> {
        vec![
            Box::new(CovManageHistoryCommand::new(options.test_advisor.as_ref())),
            Box::new(CovImportScmCommand::new(options.scm.as_ref())),
            Box::new(CovCaptureTestCommand::new(options.test_advisor.as_ref())),
            Box::new(CovAnalyzeCommand::new(
                options.test_advisor.as_ref(),
                options.analysis.as_ref(),
            )),
        ]
    }

    /// Build every executable invocation without launching anything.
    ///
    /// Each invocation sees `base_env` plus its own variables only. Fails on
    /// the first preparation error, so a bad free-form field aborts the whole
    /// pipeline before any process starts.
    pub fn plan(
        ctx: &BuildContext,
        options: &OptionSet,
        base_env: &EnvVars,
    ) -> anyhow::Result<Vec<CommandInvocation>> {
        let mut invocations = Vec::new();
        for command in Self::commands(options) {
            if !command.can_execute(ctx) {
                info!(tool = command.tool(), "Skipping unconfigured command");
                continue;
            }
            let invocation = command
                .prepare(ctx)
                .with_context(|| format!("Failed to prepare {}", command.tool()))?;
            invocations.push(invocation.layered_over(base_env));
        }
        Ok(invocations)
    }

    /// Plan, then launch each invocation in order, stopping at the first
    /// failure.
    pub async fn run(
        runner: &dyn CommandRunner,
        ctx: &BuildContext,
        options: &OptionSet,
        base_env: &EnvVars,
    ) -> anyhow::Result<PipelineResult> {
        let start = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        info!(run_id = %run_id, version = %ctx.version, "Starting Coverity pipeline");

        let invocations = Self::plan(ctx, options, base_env)?;
        let digest = invocation_digest(&invocations);

        let mut steps = Vec::new();
        let mut all_passed = true;

        for invocation in &invocations {
            info!("{}", invocation.argument_line());
            let outcome = runner
                .execute(invocation)
                .await
                .with_context(|| format!("Failed to run {}", invocation.tool))?;

            let passed = outcome.passed();
            steps.push(outcome);
            if !passed {
                all_passed = false;
                warn!(run_id = %run_id, tool = %invocation.tool, "Command failed, stopping pipeline");
                break;
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        if all_passed {
            info!(run_id = %run_id, duration_ms, "Coverity pipeline completed successfully");
        } else {
            info!(run_id = %run_id, duration_ms, "Coverity pipeline failed");
        }

        Ok(PipelineResult {
            run_id,
            started_at,
            success: all_passed,
            steps,
            duration_ms,
            invocation_digest: digest,
        })
    }
}
