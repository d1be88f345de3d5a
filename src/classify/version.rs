//! Version resolution: an ordered list of resolvers, first match wins.

use std::sync::OnceLock;

use regex::Regex;

use crate::classify::branch::BranchTemplate;
use crate::classify::records::ReleaseRecords;
use crate::intent::{VersionReference, VersionSource};

/// Bump keywords accepted where a version is expected.
pub const BUMP_KEYWORDS: &[&str] = &["major", "minor", "patch", "rc"];

fn re_version() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[vV]?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.]+)?)$").unwrap())
}

fn re_title() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\brelease\s+v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.]+)?)\b").unwrap()
    })
}

/// Normalize a version-shaped string (`v1.2.3` → `1.2.3`), or `None` if it is not one.
pub fn normalize_version(input: &str) -> Option<String> {
    re_version()
        .captures(input.trim())
        .map(|caps| caps[1].to_string())
}

pub fn is_bump_keyword(input: &str) -> bool {
    BUMP_KEYWORDS.contains(&input.to_ascii_lowercase().as_str())
}

/// Extract the version from a title such as `Prepare Release 1.2.3`.
pub fn version_from_title(title: &str) -> Option<String> {
    re_title().captures(title).map(|caps| caps[1].to_string())
}

/// Everything the resolvers may look at for one trigger.
pub struct VersionQuery<'a> {
    pub explicit: Option<&'a str>,
    pub repository: &'a str,
    /// Issue or PR numbers whose stored association may be consulted, in order.
    pub tickets: Vec<u64>,
    /// Fall back to the newest draft release when no ticket has an association.
    pub use_drafts: bool,
    pub title: Option<&'a str>,
    pub branches: Vec<&'a str>,
    pub template: &'a BranchTemplate,
    pub records: &'a dyn ReleaseRecords,
}

type Resolver = fn(&VersionQuery<'_>) -> Option<VersionReference>;

/// Resolution order: explicit input, stored association, title text, branch name.
const RESOLVERS: [Resolver; 4] = [from_explicit, from_stored, from_title, from_branch];

/// The outcome of running the resolver chain.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub version: Option<VersionReference>,
    pub warnings: Vec<String>,
}

/// Run the resolvers in priority order, short-circuiting on the first hit.
pub fn resolve(query: &VersionQuery<'_>) -> Resolution {
    let version = RESOLVERS.iter().find_map(|resolver| resolver(query));
    let mut warnings = Vec::new();

    if let Some(found) = &version
        && found.source == VersionSource::Stored
        && let Some(titled) = from_title(query)
        && titled.version != found.version
    {
        let warning = format!(
            "Title names version `{}` but the stored release record says `{}`; using `{}`.",
            titled.version, found.version, found.version
        );
        tracing::warn!("{warning}");
        warnings.push(warning);
    }

    Resolution { version, warnings }
}

pub fn from_explicit(query: &VersionQuery<'_>) -> Option<VersionReference> {
    let explicit = query.explicit?;
    normalize_version(explicit)
        .map(|version| VersionReference::new(version, VersionSource::Explicit))
}

pub fn from_stored(query: &VersionQuery<'_>) -> Option<VersionReference> {
    for &ticket in &query.tickets {
        match query.records.version_for_ticket(query.repository, ticket) {
            Ok(Some(version)) => {
                tracing::info!(ticket, %version, "resolved version from stored release record");
                return Some(VersionReference::new(version, VersionSource::Stored));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(ticket, "release record lookup failed: {e:#}"),
        }
    }
    if query.use_drafts {
        match query.records.latest_draft_version() {
            Ok(Some(version)) => {
                tracing::info!(%version, "resolved version from newest draft release");
                return Some(VersionReference::new(version, VersionSource::Stored));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("draft release lookup failed: {e:#}"),
        }
    }
    None
}

pub fn from_title(query: &VersionQuery<'_>) -> Option<VersionReference> {
    query
        .title
        .and_then(version_from_title)
        .map(|version| VersionReference::new(version, VersionSource::Title))
}

pub fn from_branch(query: &VersionQuery<'_>) -> Option<VersionReference> {
    query
        .branches
        .iter()
        .filter_map(|branch| query.template.capture(branch))
        .find_map(|found| found.full())
        .map(|version| VersionReference::new(version, VersionSource::Branch))
}
