//! The normalized command derived from a trigger event.

use std::fmt;

use serde::Serialize;

/// Command verbs understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verb {
    Generate,
    Update,
    Publish,
    Merge,
    List,
    Cancel,
    Unknown,
}

/// How much a verb needs a resolved version before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionNeed {
    /// Dispatch is refused without one.
    Required,
    /// The resolver chain runs; absence is fine.
    Optional,
    /// Only an explicitly supplied version is used.
    ExplicitOnly,
    None,
}

impl Verb {
    /// Parse a command word. `push` is the release tool's name for publish.
    pub fn parse(word: &str) -> Self {
        match word.to_ascii_lowercase().as_str() {
            "generate" => Verb::Generate,
            "update" => Verb::Update,
            "publish" | "push" => Verb::Publish,
            "merge" => Verb::Merge,
            "list" => Verb::List,
            "cancel" => Verb::Cancel,
            _ => Verb::Unknown,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Generate => "generate",
            Verb::Update => "update",
            Verb::Publish => "publish",
            Verb::Merge => "merge",
            Verb::List => "list",
            Verb::Cancel => "cancel",
            Verb::Unknown => "unknown",
        }
    }

    pub const fn version_need(self) -> VersionNeed {
        match self {
            Verb::Publish | Verb::Merge => VersionNeed::Required,
            Verb::Update | Verb::Cancel => VersionNeed::Optional,
            Verb::Generate => VersionNeed::ExplicitOnly,
            Verb::List | Verb::Unknown => VersionNeed::None,
        }
    }

    /// Verbs that accept a bump keyword (`major`, `rc`, ...) in place of a version.
    pub const fn accepts_bump(self) -> bool {
        matches!(self, Verb::Generate | Verb::Update)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far the release tool mutates existing release state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseMode {
    Draft,
    Published,
    /// Flip an existing draft to published without touching tags or notes.
    MarkPublished,
}

impl ReleaseMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReleaseMode::Draft => "draft",
            ReleaseMode::Published => "published",
            ReleaseMode::MarkPublished => "mark-published",
        }
    }
}

impl fmt::Display for ReleaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    Explicit,
    Stored,
    Title,
    Branch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionReference {
    pub version: String,
    pub source: VersionSource,
}

impl VersionReference {
    pub fn new(version: impl Into<String>, source: VersionSource) -> Self {
        Self {
            version: version.into(),
            source,
        }
    }
}

/// A fully classified command, built once per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub verb: Verb,
    /// The word as typed, kept for the usage reply when the verb is unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_verb: Option<String>,
    pub version: Option<VersionReference>,
    pub issue_number: Option<u64>,
    pub pr_number: Option<u64>,
    pub release_mode: ReleaseMode,
    /// Bump type for generate (`major`, `minor`, `patch`, `rc`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bump: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_mode: Option<String>,
    /// Branch to check out before running the release tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_branch: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Intent {
    pub const fn new(verb: Verb, release_mode: ReleaseMode) -> Self {
        Self {
            verb,
            raw_verb: None,
            version: None,
            issue_number: None,
            pr_number: None,
            release_mode,
            bump: None,
            from_version: None,
            force: None,
            detect_mode: None,
            checkout_branch: None,
            warnings: Vec::new(),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_ref().map(|v| v.version.as_str())
    }
}
