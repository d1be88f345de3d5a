//! Lookups of versions previously associated with issues and PRs.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::github::HostingApi;

/// Hidden marker embedded in the bot's initial issue comment.
pub fn version_marker(version: &str) -> String {
    format!("<!-- release-bot:version={version} -->")
}

fn re_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<!-- release-bot:version=([0-9A-Za-z.+-]+) -->").unwrap())
}

fn re_code_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-code-\d+$").unwrap())
}

/// Stored release-version associations.
pub trait ReleaseRecords {
    /// Version previously associated with an issue or PR, if any.
    fn version_for_ticket(&self, repository: &str, number: u64) -> anyhow::Result<Option<String>>;

    /// Version of the newest draft release, if any.
    fn latest_draft_version(&self) -> anyhow::Result<Option<String>>;
}

const TICKET_QUERY: &str = "SELECT version FROM release_tickets \
     WHERE repo_full_name = ?1 AND ticket_number = ?2 \
     ORDER BY rowid DESC LIMIT 1";

/// Records kept by the release tool: its ticket database, the bot's own
/// markers on the hosting side, and draft release files on disk.
pub struct ToolRecords<'a> {
    host: &'a dyn HostingApi,
    drafts_dir: PathBuf,
    database: Option<PathBuf>,
}

impl<'a> ToolRecords<'a> {
    pub fn new(host: &'a dyn HostingApi, drafts_dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            drafts_dir: drafts_dir.into(),
            database: None,
        }
    }

    /// Consult the release tool's SQLite database before comment markers.
    #[must_use]
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// `release_tickets` row for the ticket. A missing database file is "no record".
    fn ticket_from_database(
        &self,
        repository: &str,
        number: u64,
    ) -> anyhow::Result<Option<String>> {
        let Some(path) = self.database.as_deref().filter(|p| p.is_file()) else {
            return Ok(None);
        };
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("opening {}", path.display()))?;
        let number = i64::try_from(number).context("ticket number out of range")?;
        conn.query_row(TICKET_QUERY, (repository, number), |row| row.get::<_, String>(0))
            .optional()
            .with_context(|| format!("querying release_tickets in {}", path.display()))
    }

    fn ticket_from_markers(&self, number: u64) -> anyhow::Result<Option<String>> {
        let comments = self.host.issue_comments(number)?;
        // Newest marker wins: a re-pushed release posts a fresh initial comment.
        Ok(comments
            .iter()
            .rev()
            .find_map(|comment| re_marker().captures(&comment.body))
            .map(|caps| caps[1].to_string()))
    }
}

impl ReleaseRecords for ToolRecords<'_> {
    fn version_for_ticket(&self, repository: &str, number: u64) -> anyhow::Result<Option<String>> {
        tracing::debug!(repository, number, "looking up stored release version");
        match self.ticket_from_database(repository, number) {
            Ok(Some(version)) => {
                tracing::debug!(number, %version, "found ticket in release tool database");
                return Ok(Some(version));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(number, "release tool database unreadable: {e:#}"),
        }
        self.ticket_from_markers(number)
    }

    fn latest_draft_version(&self) -> anyhow::Result<Option<String>> {
        let drafts = find_draft_releases(&self.drafts_dir)?;
        Ok(drafts
            .first()
            .and_then(|path| path.file_stem())
            .and_then(|stem| stem.to_str())
            .map(version_from_draft_stem))
    }
}

/// Draft release note files, newest first.
pub fn find_draft_releases(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut drafts = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            let modified = entry.metadata()?.modified()?;
            drafts.push((modified, path));
        }
    }
    drafts.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(drafts.into_iter().map(|(_, path)| path).collect())
}

/// Strip the document-kind suffix from a draft file stem
/// (`9.3.0-rc.30-code-1` → `9.3.0-rc.30`).
pub fn version_from_draft_stem(stem: &str) -> String {
    if let Some(found) = re_code_suffix().find(stem) {
        return stem[..found.start()].to_string();
    }
    for suffix in ["-doc", "-release"] {
        if let Some(version) = stem.strip_suffix(suffix) {
            return version.to_string();
        }
    }
    stem.to_string()
}
