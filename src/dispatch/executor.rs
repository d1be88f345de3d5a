//! Sequential step execution.
//!
//! Steps run in order and execution stops at the first failure. Completed
//! steps are never reverted; the steps that did not run are returned so the
//! response can list them.
//!
//! ### `$VERSION` substitution
//!
//! When a `generate` step succeeds, the version it produced is read from its
//! output and substituted for `$VERSION` in every later step. A later step that
//! still needs the placeholder fails without running.

use crate::dispatch::output::generated_version;
use crate::dispatch::plan::{Action, Step, VERSION_PLACEHOLDER};
use crate::github::HostingApi;
use crate::subprocess::{CommandResult, CommandRunner, Invocation};

/// A step that ran, with its (substituted) form and outcome.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: Step,
    pub result: CommandResult,
}

/// Complete execution report with results and skipped steps.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Steps that were executed, in order.
    pub outcomes: Vec<StepOutcome>,
    /// Steps that were not executed due to an earlier failure.
    pub skipped: Vec<Step>,
    /// Version detected from `generate` output, if any.
    pub generated_version: Option<String>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.success)
    }

    pub fn failure(&self) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| !o.result.success)
    }

    /// Some steps completed before a later one failed.
    pub fn partially_completed(&self) -> bool {
        self.failure().is_some() && self.outcomes.iter().any(|o| o.result.success)
    }

    pub fn outcome(&self, name: &str) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step.name == name)
    }
}

pub fn execute_steps(
    steps: Vec<Step>,
    runner: &dyn CommandRunner,
    host: &dyn HostingApi,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();
    let mut pending = steps.into_iter();

    while let Some(step) = pending.next() {
        let step = match &report.generated_version {
            Some(version) => substitute(step, version),
            None => step,
        };
        let result = run_step(&step, runner, host);

        if result.success && step.is_generate() {
            let combined = format!("{}\n{}", result.stdout, result.stderr);
            report.generated_version = generated_version(&combined);
            if let Some(version) = &report.generated_version {
                tracing::info!(%version, "detected generated version");
            }
        }

        let success = result.success;
        if !success {
            tracing::warn!(step = %step.name, exit_code = result.exit_code, "step failed; halting");
        }
        report.outcomes.push(StepOutcome { step, result });

        if !success {
            report.skipped = pending.collect();
            break;
        }
    }
    report
}

fn substitute(step: Step, version: &str) -> Step {
    match step.action {
        Action::Run(invocation) => Step {
            name: step.name,
            action: Action::Run(invocation.substitute(VERSION_PLACEHOLDER, version)),
        },
        action => Step { action, ..step },
    }
}

fn run_step(step: &Step, runner: &dyn CommandRunner, host: &dyn HostingApi) -> CommandResult {
    match &step.action {
        Action::Run(invocation) => {
            if invocation.contains(VERSION_PLACEHOLDER) {
                return CommandResult::failed(
                    1,
                    "could not determine generated version from output",
                );
            }
            runner
                .run(invocation)
                .unwrap_or_else(|e| CommandResult::failed(-1, format!("{e:#}")))
        }
        Action::MergePullRequest(number) => api_result(
            host.merge_pull_request(*number)
                .map(|sha| format!("Merged pull request #{number} ({sha})")),
        ),
        Action::CloseIssue(number) => api_result(
            host.close_issue(*number)
                .map(|()| format!("Closed issue #{number}")),
        ),
        Action::CommitChanges { branch, message } => commit_changes(runner, branch, message),
    }
}

/// `git status --porcelain`, then add, commit and push only when dirty.
/// The first git command that fails decides the result.
fn commit_changes(runner: &dyn CommandRunner, branch: &str, message: &str) -> CommandResult {
    let git = |args: &[&str]| {
        runner
            .run(&Invocation::new("git").args(args.iter().copied()))
            .unwrap_or_else(|e| CommandResult::failed(-1, format!("{e:#}")))
    };

    let status = git(&["status", "--porcelain"]);
    if !status.success {
        return status;
    }
    if status.stdout.trim().is_empty() {
        tracing::info!("working tree clean, nothing to commit");
        return CommandResult::ok("No changes to commit");
    }
    for args in [
        &["add", "."][..],
        &["commit", "-m", message][..],
        &["push", "origin", branch][..],
    ] {
        let result = git(args);
        if !result.success {
            return result;
        }
    }
    tracing::info!(branch, "committed and pushed release notes");
    CommandResult::ok(format!("Changes committed and pushed to {branch}"))
}

fn api_result(outcome: anyhow::Result<String>) -> CommandResult {
    match outcome {
        Ok(message) => CommandResult::ok(message),
        Err(e) => CommandResult::failed(1, format!("{e:#}")),
    }
}
