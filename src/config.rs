use std::path::{Path, PathBuf};

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::classify::branch::BranchTemplate;
use crate::error::ExitError;

/// The release tool's config file, shared with the bot.
pub const DEFAULT_CONFIG_PATH: &str = ".release_tool.toml";
pub const DEFAULT_BRANCH_TEMPLATE: &str = "release/{major}.{minor}";

/// Subset of the release tool's TOML file the bot cares about.
///
/// The file belongs to the release tool, so every table is optional and
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub branch_policy: BranchPolicy,
    #[serde(default)]
    pub release_bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchPolicy {
    #[serde(default = "default_branch_template")]
    pub release_branch_template: String,
}

impl Default for BranchPolicy {
    fn default() -> Self {
        Self {
            release_branch_template: default_branch_template(),
        }
    }
}

/// `[release_bot]` table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BotConfig {
    /// Word after the slash in ChatOps comments (`/release-bot publish 1.2.3`).
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// External release tool executable.
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Directory the release tool writes draft release notes to.
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: PathBuf,
    /// SQLite database where the release tool records ticket associations.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Base URL of the hosting REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            tool: default_tool(),
            drafts_dir: default_drafts_dir(),
            database_path: default_database_path(),
            api_url: default_api_url(),
        }
    }
}

fn default_branch_template() -> String {
    DEFAULT_BRANCH_TEMPLATE.into()
}

fn default_command_prefix() -> String {
    "release-bot".into()
}

fn default_tool() -> String {
    "release-tool".into()
}

fn default_drafts_dir() -> PathBuf {
    PathBuf::from(".release_tool_cache/draft-releases")
}

fn default_database_path() -> PathBuf {
    PathBuf::from(".release_tool_cache/release_tool.db")
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

impl ConfigFile {
    /// Load the config file. A missing file yields defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse_toml(&contents)
    }

    pub fn parse_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ExitError::Config(format!("invalid release tool config: {e}")).into())
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Config path as given (forwarded to the release tool when explicit).
    pub config_path: Option<PathBuf>,
    pub branch_template: BranchTemplate,
    pub bot: BotConfig,
    pub debug: bool,
}

impl Settings {
    /// Resolve settings from an optional explicit config path.
    pub fn load(config_path: Option<&Path>, debug: bool) -> anyhow::Result<Self> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let file = ConfigFile::load(path)?;
        Self::from_file(file, config_path.map(Path::to_path_buf), debug)
    }

    pub fn from_file(
        file: ConfigFile,
        config_path: Option<PathBuf>,
        debug: bool,
    ) -> anyhow::Result<Self> {
        let branch_template = BranchTemplate::parse(&file.branch_policy.release_branch_template)
            .map_err(|e| ExitError::Config(e.to_string()))?;
        let mut bot = file.release_bot;
        bot.command_prefix = bot.command_prefix.trim().trim_start_matches('/').to_string();
        if bot.command_prefix.is_empty() || bot.command_prefix.contains(char::is_whitespace) {
            return Err(ExitError::Config(format!(
                "invalid command prefix {:?}: must be a single word",
                bot.command_prefix
            ))
            .into());
        }
        Ok(Self {
            config_path,
            branch_template,
            bot,
            debug,
        })
    }

    /// The slash command as typed in comments, e.g. `/release-bot`.
    pub fn command(&self) -> String {
        format!("/{}", self.bot.command_prefix)
    }
}
