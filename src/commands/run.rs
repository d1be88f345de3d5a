use clap::Args;

use crate::classify::records::ToolRecords;
use crate::classify::{Classification, Classifier};
use crate::commands::EventArgs;
use crate::dispatch::Dispatcher;
use crate::error::{ClassifyError, ExitError};
use crate::event::{TriggerContext, TriggerKind};
use crate::github::{GitHubClient, Reaction};
use crate::intent::{Intent, Verb};
use crate::subprocess::SystemRunner;
use crate::template::{ProblemContext, UsageContext, render_problem, render_usage};

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub event: EventArgs,
    /// Print the plan instead of running it; nothing is posted
    #[arg(long)]
    pub dry_run: bool,
    /// Server URL used to link the workflow run
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = "https://github.com")]
    pub server_url: String,
    /// Workflow run id used to link the workflow run
    #[arg(long, env = "GITHUB_RUN_ID")]
    pub run_id: Option<String>,
}

impl RunArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let Some((settings, ctx)) = self.event.prepare()? else {
            return Ok(());
        };
        tracing::info!(
            trigger = ctx.kind.as_str(),
            repository = %ctx.repository,
            author = ctx.author.as_deref().unwrap_or("-"),
            "processing event"
        );

        let host = GitHubClient::new(&settings.bot.api_url, &ctx.repository, self.event.token());
        let records = ToolRecords::new(&host, &settings.bot.drafts_dir)
            .with_database(&settings.bot.database_path);
        let classifier = Classifier::new(&settings, &records, &host);
        let runner = SystemRunner {
            debug: settings.debug,
        };
        let dispatcher = Dispatcher::new(&settings, &runner, &host);
        let run_url = self.run_url(&ctx.repository);

        let intent = match classifier.classify(&ctx) {
            Ok(Classification::Intent(intent)) => intent,
            Ok(Classification::Ignored(_)) => return Ok(()),
            Err(err) => {
                self.report_problem(&dispatcher, &ctx, &err, run_url.as_deref());
                return Err(ExitError::from(err).into());
            }
        };

        if self.dry_run {
            return self.print_plan(&dispatcher, &settings.command(), &intent);
        }

        dispatcher.react(ctx.comment_id, Reaction::Eyes);
        let report = dispatcher.dispatch(&intent);
        let reaction = if report.succeeded() {
            Reaction::Rocket
        } else {
            Reaction::Confused
        };
        dispatcher.react(ctx.comment_id, reaction);

        match dispatcher.render(&report, run_url.as_deref()) {
            Ok(body) => match ctx.response_target() {
                Some(target) => {
                    dispatcher.post_response(target, &body);
                }
                None => println!("{body}"),
            },
            Err(e) => tracing::warn!("failed to render response: {e:#}"),
        }

        if ctx.kind == TriggerKind::ManualDispatch {
            dispatcher.post_initial_comment(&report, run_url.as_deref());
        }

        if let Some(failure) = report.execution.failure() {
            return Err(ExitError::StepFailed {
                step: failure.step.name.clone(),
                code: failure.result.exit_code,
                message: failure.result.diagnostic(),
            }
            .into());
        }
        tracing::info!(verb = %intent.verb, "done");
        Ok(())
    }

    fn run_url(&self, repository: &str) -> Option<String> {
        self.run_id.as_deref().filter(|id| !id.is_empty()).map(|id| {
            format!(
                "{}/{repository}/actions/runs/{id}",
                self.server_url.trim_end_matches('/')
            )
        })
    }

    fn print_plan(
        &self,
        dispatcher: &Dispatcher<'_>,
        command: &str,
        intent: &Intent,
    ) -> anyhow::Result<()> {
        if intent.verb == Verb::Unknown {
            println!(
                "{}",
                render_usage(&UsageContext::new(command, intent.raw_verb.as_deref()))?
            );
            return Ok(());
        }
        println!("Dry run: {} would execute", intent.verb);
        for (idx, step) in dispatcher.plan(intent).iter().enumerate() {
            println!("step {}  {step}", idx + 1);
        }
        for warning in &intent.warnings {
            println!("warning: {warning}");
        }
        Ok(())
    }

    /// Tell the triggering thread why nothing ran.
    fn report_problem(
        &self,
        dispatcher: &Dispatcher<'_>,
        ctx: &TriggerContext,
        err: &ClassifyError,
        run_url: Option<&str>,
    ) {
        let title = match err {
            ClassifyError::VersionUnresolved { .. } => "Could not resolve a release version",
            ClassifyError::InvalidVersion(_) => "Invalid version argument",
            ClassifyError::PullRequestNotFound { .. } => "Pull request not found",
            ClassifyError::MalformedPayload { .. } | ClassifyError::Lookup(_) => {
                "Could not process this event"
            }
        };
        let body = match render_problem(&ProblemContext {
            title: title.to_string(),
            message: err.to_string(),
            guidance: err.guidance().map(str::to_string),
            run_url: run_url.map(str::to_string),
        }) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("failed to render problem report: {e:#}");
                return;
            }
        };

        match ctx.response_target() {
            Some(target) if !self.dry_run => {
                dispatcher.react(ctx.comment_id, Reaction::Confused);
                dispatcher.post_response(target, &body);
            }
            _ => println!("{body}"),
        }
    }
}
