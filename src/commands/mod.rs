pub mod classify;
pub mod run;
pub mod schema;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clap::builder::FalseyValueParser;

use crate::config::Settings;
use crate::error::ExitError;
use crate::event::{DispatchInputs, TriggerContext, decode_event};

/// Where the triggering event comes from. Every flag falls back to the
/// variable GitHub Actions sets.
#[derive(Debug, Clone, Args)]
pub struct EventArgs {
    /// Event name (issue_comment, pull_request, issues, workflow_dispatch)
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,
    /// Path to the webhook payload JSON
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,
    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,
    /// Checkout to run in
    #[arg(long, env = "GITHUB_WORKSPACE")]
    pub workspace: Option<PathBuf>,
    /// API token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Manual-dispatch inputs.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Command to run (generate, update, publish, merge, list, cancel)
    #[arg(long, env = "INPUT_COMMAND")]
    pub command: Option<String>,
    /// Release version
    #[arg(long, env = "INPUT_VERSION")]
    pub version: Option<String>,
    /// Bump type for generate (major, minor, patch, rc)
    #[arg(long, env = "INPUT_NEW_VERSION_TYPE")]
    pub new_version_type: Option<String>,
    /// Base version for generate
    #[arg(long, env = "INPUT_FROM_VERSION")]
    pub from_version: Option<String>,
    /// Force mode passed through to the release tool
    #[arg(long, env = "INPUT_FORCE")]
    pub force: Option<String>,
    /// Verbose logging and `--debug` for the release tool
    #[arg(long, env = "INPUT_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,
    /// Detection mode passed to generate
    #[arg(long, env = "INPUT_DETECT_MODE")]
    pub detect_mode: Option<String>,
    /// Release tool config file
    #[arg(long, env = "INPUT_CONFIG_PATH")]
    pub config_path: Option<String>,
}

impl InputArgs {
    pub fn to_inputs(&self) -> DispatchInputs {
        DispatchInputs {
            command: self.command.clone(),
            version: self.version.clone(),
            new_version_type: self.new_version_type.clone(),
            from_version: self.from_version.clone(),
            force: self.force.clone(),
            debug: self.debug,
            detect_mode: self.detect_mode.clone(),
            config_path: self.config_path.clone(),
        }
        .normalized()
    }
}

impl EventArgs {
    /// Token from the flag or `INPUT_GITHUB_TOKEN`, else `GITHUB_TOKEN`.
    pub fn token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }

    /// Change into the workspace, load settings, and decode the event.
    /// `None` means the event is not one the bot handles.
    pub fn prepare(&self) -> anyhow::Result<Option<(Settings, TriggerContext)>> {
        if let Some(dir) = &self.workspace {
            std::env::set_current_dir(dir)
                .with_context(|| format!("entering workspace {}", dir.display()))?;
        }

        let inputs = self.inputs.to_inputs();
        let config_path = inputs.config_path.as_deref().map(PathBuf::from);
        let settings = Settings::load(config_path.as_deref(), inputs.debug)?;

        let payload = match &self.event_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading event payload {}", path.display()))?,
            None => String::new(),
        };
        let trigger = decode_event(
            self.event_name.as_deref(),
            &payload,
            self.repository.as_deref(),
            inputs,
        )
        .map_err(ExitError::from)?;
        Ok(trigger.map(|ctx| (settings, ctx)))
    }
}
