//! Command dispatch: run an intent's steps and report back on the thread.

pub mod executor;
pub mod output;
pub mod plan;

use crate::config::Settings;
use crate::github::{HostingApi, Reaction};
use crate::intent::{Intent, Verb};
use crate::subprocess::CommandRunner;
use crate::template::{
    InitialContext, ResponseContext, StepView, UsageContext, render_initial, render_response,
    render_usage,
};

use executor::{ExecutionReport, StepOutcome, execute_steps};
use output::{PushSummary, parse_push_output, strip_ansi};
use plan::{Action, Step};

/// Everything known after dispatching one intent.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub intent: Intent,
    pub execution: ExecutionReport,
    /// Parsed from a successful `push` step.
    pub push: Option<PushSummary>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> bool {
        self.execution.succeeded()
    }

    /// The version the run acted on: resolved up front or detected from `generate`.
    pub fn version(&self) -> Option<&str> {
        self.intent
            .version()
            .or(self.execution.generated_version.as_deref())
    }
}

pub struct Dispatcher<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    host: &'a dyn HostingApi,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        host: &'a dyn HostingApi,
    ) -> Self {
        Self {
            settings,
            runner,
            host,
        }
    }

    pub fn plan(&self, intent: &Intent) -> Vec<Step> {
        plan::plan(intent, self.settings)
    }

    /// Execute the intent's steps. An unknown verb runs nothing.
    pub fn dispatch(&self, intent: &Intent) -> DispatchReport {
        if intent.verb == Verb::Unknown {
            tracing::info!(verb = ?intent.raw_verb, "unrecognized command, replying with usage");
        }
        let execution = execute_steps(self.plan(intent), self.runner, self.host);
        let push = execution
            .outcome("push")
            .filter(|o| o.result.success)
            .map(|o| parse_push_output(&format!("{}\n{}", o.result.stdout, o.result.stderr)));
        DispatchReport {
            intent: intent.clone(),
            execution,
            push,
        }
    }

    /// Render the comment describing a dispatch.
    pub fn render(&self, report: &DispatchReport, run_url: Option<&str>) -> anyhow::Result<String> {
        if report.intent.verb == Verb::Unknown {
            return render_usage(&UsageContext::new(
                &self.settings.command(),
                report.intent.raw_verb.as_deref(),
            ));
        }
        let execution = &report.execution;
        let push = report.push.clone().unwrap_or_default();
        render_response(&ResponseContext {
            verb: report.intent.verb,
            version: report.version().map(str::to_string),
            success: execution.succeeded(),
            steps: execution.outcomes.iter().map(step_view).collect(),
            skipped: execution.skipped.iter().map(ToString::to_string).collect(),
            failure: execution.failure().map(step_view),
            partial: execution.partially_completed(),
            warnings: report.intent.warnings.clone(),
            release_url: push.release_url,
            issue_url: push.issue_url,
            run_url: run_url.map(str::to_string),
        })
    }

    /// Post a comment. Failures are logged and swallowed: the release
    /// operation has already happened either way.
    pub fn post_response(&self, target: u64, body: &str) -> bool {
        match self.host.post_comment(target, body) {
            Ok(()) => {
                tracing::info!(target, "posted response");
                true
            }
            Err(e) => {
                tracing::warn!(target, "failed to post response: {e:#}");
                false
            }
        }
    }

    pub fn react(&self, comment_id: Option<u64>, reaction: Reaction) {
        let Some(comment_id) = comment_id else {
            return;
        };
        if let Err(e) = self.host.react_to_comment(comment_id, reaction) {
            tracing::warn!(
                comment_id,
                reaction = reaction.as_str(),
                "failed to add reaction: {e:#}"
            );
        }
    }

    /// After a manual `publish`/`update`, introduce the bot on the release
    /// issue the push created or reused. Returns the issue number when posted.
    pub fn post_initial_comment(
        &self,
        report: &DispatchReport,
        run_url: Option<&str>,
    ) -> Option<u64> {
        if !report.succeeded() || !matches!(report.intent.verb, Verb::Publish | Verb::Update) {
            return None;
        }
        let push = report.push.as_ref()?;
        let issue = push.issue_number?;
        let Some(version) = report.version() else {
            tracing::warn!(
                issue,
                "push reported an issue but no version is known; skipping initial comment"
            );
            return None;
        };
        let ctx = InitialContext::new(
            &self.settings.command(),
            version,
            push.release_url.clone(),
            run_url.map(str::to_string),
        );
        let body = match render_initial(&ctx) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(issue, "failed to render initial comment: {e:#}");
                return None;
            }
        };
        self.post_response(issue, &body).then_some(issue)
    }
}

fn step_view(outcome: &StepOutcome) -> StepView {
    StepView {
        name: outcome.step.name.clone(),
        command: outcome.step.to_string(),
        success: outcome.result.success,
        exit_code: outcome.result.exit_code,
        diagnostic: outcome.result.diagnostic(),
        output: step_output(outcome),
    }
}

/// What a successful command printed, shown in the response. Hosting-API
/// steps have nothing worth repeating.
fn step_output(outcome: &StepOutcome) -> String {
    let api_step = matches!(
        outcome.step.action,
        Action::MergePullRequest(_) | Action::CloseIssue(_)
    );
    if !outcome.result.success || api_step {
        return String::new();
    }
    strip_ansi(outcome.result.stdout.trim()).trim().to_string()
}
