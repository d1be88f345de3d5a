//! Mapping from an intent to its ordered list of steps.

use std::fmt;

use crate::config::Settings;
use crate::intent::{Intent, ReleaseMode, Verb};
use crate::subprocess::Invocation;

/// Placeholder for a version only known once `generate` has run.
pub const VERSION_PLACEHOLDER: &str = "$VERSION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run an external command.
    Run(Invocation),
    MergePullRequest(u64),
    CloseIssue(u64),
    /// Commit whatever the previous steps changed and push it to `branch`.
    /// A clean working tree is a no-op.
    CommitChanges { branch: String, message: String },
}

/// One named unit of work in a multi-step verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub action: Action,
}

impl Step {
    fn run(name: &str, invocation: Invocation) -> Self {
        Self {
            name: name.to_string(),
            action: Action::Run(invocation),
        }
    }

    /// Whether this step is the one that produces the generated version.
    pub fn is_generate(&self) -> bool {
        self.name == "generate"
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Action::Run(invocation) => write!(f, "{invocation}"),
            Action::MergePullRequest(number) => write!(f, "merge pull request #{number}"),
            Action::CloseIssue(number) => write!(f, "close issue #{number}"),
            Action::CommitChanges { branch, .. } => {
                write!(f, "commit release notes and push to {branch}")
            }
        }
    }
}

/// Build the step list for an intent. `unknown` has no steps.
pub fn plan(intent: &Intent, settings: &Settings) -> Vec<Step> {
    let tool = |subcommand: &str| base_invocation(settings).arg(subcommand);
    let mut steps = Vec::new();

    match intent.verb {
        Verb::Generate | Verb::Update => {
            if let Some(branch) = &intent.checkout_branch {
                steps.push(Step::run(
                    "fetch",
                    Invocation::new("git").args(["fetch", "origin", branch.as_str()]),
                ));
                steps.push(Step::run(
                    "checkout",
                    Invocation::new("git").args(["checkout", branch.as_str()]),
                ));
            }
            steps.push(Step::run("pull", tool("pull")));
            steps.push(Step::run("generate", generate_invocation(intent, tool("generate"))));
            if let Some(branch) = &intent.checkout_branch {
                steps.push(Step {
                    name: "commit".into(),
                    action: Action::CommitChanges {
                        branch: branch.clone(),
                        message: format!("chore: update release notes ({})", intent.verb),
                    },
                });
            }
            if intent.verb == Verb::Update {
                let version = intent.version().unwrap_or(VERSION_PLACEHOLDER);
                let push = push_invocation(intent, tool("push"), version, ReleaseMode::Draft);
                steps.push(Step::run("push", push));
            }
        }
        Verb::Publish => {
            let version = intent.version().unwrap_or(VERSION_PLACEHOLDER);
            let push = push_invocation(intent, tool("push"), version, intent.release_mode);
            steps.push(Step::run("push", push));
        }
        Verb::Merge => {
            if let Some(pr) = intent.pr_number {
                steps.push(Step {
                    name: "merge".into(),
                    action: Action::MergePullRequest(pr),
                });
            }
            let version = intent.version().unwrap_or(VERSION_PLACEHOLDER);
            let mode = ReleaseMode::MarkPublished.as_str();
            let mut push = tool("push").args([version, "--release-mode", mode]);
            if let Some(issue) = intent.issue_number {
                push = push.args(["--issue".to_string(), issue.to_string()]);
            }
            steps.push(Step::run("push", push));
            if let Some(issue) = intent.issue_number {
                steps.push(Step {
                    name: "close".into(),
                    action: Action::CloseIssue(issue),
                });
            }
        }
        Verb::List => steps.push(Step::run("list", tool("push").arg("--list"))),
        Verb::Cancel => {
            let mut cancel = tool("cancel");
            if let Some(version) = intent.version() {
                cancel = cancel.arg(version);
            }
            if let Some(issue) = intent.issue_number {
                cancel = cancel.args(["--issue".to_string(), issue.to_string()]);
            }
            if let Some(pr) = intent.pr_number {
                cancel = cancel.args(["--pr".to_string(), pr.to_string()]);
            }
            if intent.force.is_some() {
                cancel = cancel.arg("--force");
            }
            steps.push(Step::run("cancel", cancel));
        }
        Verb::Unknown => {}
    }
    steps
}

/// `<tool> --auto [--config <path>] [--debug]`
fn base_invocation(settings: &Settings) -> Invocation {
    let mut invocation = Invocation::new(&settings.bot.tool).arg("--auto");
    if let Some(path) = &settings.config_path {
        invocation = invocation.args(["--config".to_string(), path.display().to_string()]);
    }
    if settings.debug {
        invocation = invocation.arg("--debug");
    }
    invocation
}

fn generate_invocation(intent: &Intent, mut generate: Invocation) -> Invocation {
    if let Some(version) = intent.version() {
        generate = generate.arg(version);
    } else if let Some(bump) = &intent.bump {
        generate = generate.args(["--new", bump.as_str()]);
    }
    if let Some(from) = &intent.from_version {
        generate = generate.args(["--from-version", from.as_str()]);
    }
    if let Some(mode) = &intent.detect_mode {
        generate = generate.args(["--detect-mode", mode.as_str()]);
    }
    generate
}

fn push_invocation(
    intent: &Intent,
    push: Invocation,
    version: &str,
    mode: ReleaseMode,
) -> Invocation {
    let mut push = push.args([version, "--release-mode", mode.as_str()]);
    if let Some(issue) = intent.issue_number {
        push = push.args(["--issue".to_string(), issue.to_string()]);
    }
    if let Some(force) = &intent.force {
        push = push.args(["--force", force.as_str()]);
    }
    push
}
