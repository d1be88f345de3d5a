//! Rendering of every comment the bot posts.

use minijinja::Environment;
use serde::Serialize;

use crate::classify::records::version_marker;
use crate::intent::Verb;

const RESPONSE_TEMPLATE: &str = include_str!("templates/response.md.jinja");
const USAGE_TEMPLATE: &str = include_str!("templates/usage.md.jinja");
const PROBLEM_TEMPLATE: &str = include_str!("templates/problem.md.jinja");
const INITIAL_TEMPLATE: &str = include_str!("templates/initial.md.jinja");

/// One row of the command help table.
#[derive(Debug, Serialize, Clone)]
pub struct CommandHelp {
    pub usage: String,
    pub description: String,
}

/// Help rows for every verb, using the configured slash command.
pub fn command_help(command: &str) -> Vec<CommandHelp> {
    [
        (
            "update [version]",
            "Pull, regenerate the release notes and push them as a draft. \
             A bump keyword (`major`, `minor`, `patch`, `rc`) may replace the version",
        ),
        (
            "generate [version]",
            "Pull and regenerate the release notes without pushing",
        ),
        (
            "publish <version>",
            "Publish the release (`push` works too)",
        ),
        (
            "merge [version]",
            "Merge the release PR, mark the release published and close the issue",
        ),
        ("list", "List draft releases"),
        ("cancel [version]", "Cancel the release and clean up its drafts"),
    ]
    .into_iter()
    .map(|(usage, description)| CommandHelp {
        usage: format!("{command} {usage}"),
        description: description.to_string(),
    })
    .collect()
}

/// One executed step as shown in a response.
#[derive(Debug, Serialize, Clone)]
pub struct StepView {
    pub name: String,
    pub command: String,
    pub success: bool,
    pub exit_code: i32,
    pub diagnostic: String,
    /// Trimmed stdout of a successful external command; empty otherwise.
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseContext {
    pub verb: Verb,
    pub version: Option<String>,
    pub success: bool,
    pub steps: Vec<StepView>,
    /// Command lines of steps that never ran.
    pub skipped: Vec<String>,
    pub failure: Option<StepView>,
    pub partial: bool,
    pub warnings: Vec<String>,
    pub release_url: Option<String>,
    pub issue_url: Option<String>,
    pub run_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsageContext {
    pub command: String,
    pub raw_verb: Option<String>,
    pub commands: Vec<CommandHelp>,
}

impl UsageContext {
    pub fn new(command: &str, raw_verb: Option<&str>) -> Self {
        Self {
            command: command.to_string(),
            raw_verb: raw_verb.filter(|v| !v.is_empty()).map(str::to_string),
            commands: command_help(command),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProblemContext {
    pub title: String,
    pub message: String,
    pub guidance: Option<String>,
    pub run_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitialContext {
    pub version: String,
    pub release_url: Option<String>,
    pub run_url: Option<String>,
    pub marker: String,
    pub commands: Vec<CommandHelp>,
    pub posted_at: String,
}

impl InitialContext {
    pub fn new(
        command: &str,
        version: &str,
        release_url: Option<String>,
        run_url: Option<String>,
    ) -> Self {
        Self {
            version: version.to_string(),
            release_url,
            run_url,
            marker: version_marker(version),
            commands: command_help(command),
            posted_at: chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

fn render<S: Serialize>(name: &str, source: &'static str, ctx: &S) -> anyhow::Result<String> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template(name, source)?;

    let template = env.get_template(name)?;
    let rendered = template.render(ctx)?;

    Ok(rendered.trim_end().to_string() + "\n")
}

pub fn render_response(ctx: &ResponseContext) -> anyhow::Result<String> {
    render("response.md", RESPONSE_TEMPLATE, ctx)
}

pub fn render_usage(ctx: &UsageContext) -> anyhow::Result<String> {
    render("usage.md", USAGE_TEMPLATE, ctx)
}

pub fn render_problem(ctx: &ProblemContext) -> anyhow::Result<String> {
    render("problem.md", PROBLEM_TEMPLATE, ctx)
}

pub fn render_initial(ctx: &InitialContext) -> anyhow::Result<String> {
    render("initial.md", INITIAL_TEMPLATE, ctx)
}
