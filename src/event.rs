//! Trigger events: GitHub webhook payloads and manual-dispatch inputs.

use serde::Deserialize;

use crate::error::ClassifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    ManualDispatch,
    IssueComment,
    PrClosed,
    IssueClosed,
}

impl TriggerKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TriggerKind::ManualDispatch => "manual_dispatch",
            TriggerKind::IssueComment => "issue_comment",
            TriggerKind::PrClosed => "pr_closed",
            TriggerKind::IssueClosed => "issue_closed",
        }
    }
}

/// Structured workflow inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchInputs {
    pub command: Option<String>,
    pub version: Option<String>,
    pub new_version_type: Option<String>,
    pub from_version: Option<String>,
    pub force: Option<String>,
    pub debug: bool,
    pub detect_mode: Option<String>,
    pub config_path: Option<String>,
}

impl DispatchInputs {
    /// Drop empty and `none` inputs, which workflow files use for "not set".
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            command: present(self.command),
            version: present(self.version),
            new_version_type: present(self.new_version_type),
            from_version: present(self.from_version),
            force: present(self.force),
            debug: self.debug,
            detect_mode: present(self.detect_mode),
            config_path: present(self.config_path),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
}

/// Read-only view of the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub kind: TriggerKind,
    pub repository: String,
    /// Comment body for comments, PR body for pull requests.
    pub body: String,
    pub title: Option<String>,
    pub issue_number: Option<u64>,
    pub pr_number: Option<u64>,
    /// The commented issue is a pull request.
    pub on_pull_request: bool,
    pub head_branch: Option<String>,
    pub base_branch: Option<String>,
    pub merged: bool,
    pub comment_id: Option<u64>,
    pub author: Option<String>,
    pub inputs: DispatchInputs,
}

impl TriggerContext {
    pub fn manual(repository: &str, inputs: DispatchInputs) -> Self {
        Self {
            kind: TriggerKind::ManualDispatch,
            repository: repository.to_string(),
            body: String::new(),
            title: None,
            issue_number: None,
            pr_number: None,
            on_pull_request: false,
            head_branch: None,
            base_branch: None,
            merged: false,
            comment_id: None,
            author: None,
            inputs,
        }
    }

    /// Issue or PR the response should be posted on.
    pub fn response_target(&self) -> Option<u64> {
        match self.kind {
            TriggerKind::IssueComment | TriggerKind::IssueClosed => self.issue_number,
            TriggerKind::PrClosed => self.pr_number,
            TriggerKind::ManualDispatch => None,
        }
    }
}

// --- GitHub payload shapes (only the fields the bot reads) ---

#[derive(Debug, Deserialize)]
struct EventPayload {
    action: Option<String>,
    comment: Option<CommentPayload>,
    issue: Option<IssuePayload>,
    pull_request: Option<PullRequestPayload>,
    repository: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    id: u64,
    body: Option<String>,
    user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    title: Option<String>,
    /// Present (as an object) when the issue is a pull request.
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    title: Option<String>,
    body: Option<String>,
    #[serde(default)]
    merged: bool,
    head: RefPayload,
    base: RefPayload,
}

#[derive(Debug, Deserialize)]
struct RefPayload {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    full_name: String,
}

/// Decode a trigger. `Ok(None)` means the event is not one the bot handles.
pub fn decode_event(
    event_name: Option<&str>,
    payload: &str,
    repository: Option<&str>,
    inputs: DispatchInputs,
) -> Result<Option<TriggerContext>, ClassifyError> {
    let event_name = event_name.unwrap_or_default();

    if event_name == "workflow_dispatch" {
        let repository = repository.unwrap_or_default();
        return Ok(Some(TriggerContext::manual(repository, inputs)));
    }

    let known = matches!(event_name, "issue_comment" | "pull_request" | "issues");
    if !known {
        // An explicit command turns any other event into a manual run.
        if inputs.command.is_some() {
            return Ok(Some(TriggerContext::manual(repository.unwrap_or_default(), inputs)));
        }
        tracing::info!(event = event_name, "event not handled and no command provided");
        return Ok(None);
    }

    let payload = if payload.trim().is_empty() { "{}" } else { payload };
    let payload: EventPayload = serde_json::from_str(payload)
        .map_err(|e| ClassifyError::malformed(event_name, e.to_string()))?;
    let repository = repository
        .map(str::to_string)
        .or_else(|| payload.repository.as_ref().map(|r| r.full_name.clone()))
        .ok_or_else(|| ClassifyError::malformed(event_name, "missing repository"))?;
    let action = payload.action.as_deref().unwrap_or_default();

    let mut ctx = TriggerContext::manual(&repository, inputs);
    match event_name {
        "issue_comment" => {
            if action != "created" {
                tracing::info!(action, "comment event ignored");
                return Ok(None);
            }
            let comment = payload
                .comment
                .ok_or_else(|| ClassifyError::malformed(event_name, "missing `comment`"))?;
            let issue = payload
                .issue
                .ok_or_else(|| ClassifyError::malformed(event_name, "missing `issue`"))?;
            ctx.kind = TriggerKind::IssueComment;
            ctx.body = comment.body.unwrap_or_default();
            ctx.comment_id = Some(comment.id);
            ctx.author = comment.user.map(|u| u.login);
            ctx.issue_number = Some(issue.number);
            ctx.title = issue.title;
            ctx.on_pull_request = issue.pull_request.is_some();
            if ctx.on_pull_request {
                ctx.pr_number = Some(issue.number);
            }
        }
        "pull_request" => {
            let pr = payload
                .pull_request
                .ok_or_else(|| ClassifyError::malformed(event_name, "missing `pull_request`"))?;
            if action != "closed" || !pr.merged {
                tracing::info!(
                    action,
                    merged = pr.merged,
                    number = pr.number,
                    "pull request event ignored"
                );
                return Ok(None);
            }
            tracing::info!("PR #{}: {} → {}", pr.number, pr.head.name, pr.base.name);
            ctx.kind = TriggerKind::PrClosed;
            ctx.pr_number = Some(pr.number);
            ctx.title = pr.title;
            ctx.body = pr.body.unwrap_or_default();
            ctx.merged = pr.merged;
            ctx.head_branch = Some(pr.head.name);
            ctx.base_branch = Some(pr.base.name);
        }
        _ => {
            if action != "closed" {
                tracing::info!(action, "issue event ignored");
                return Ok(None);
            }
            let issue = payload
                .issue
                .ok_or_else(|| ClassifyError::malformed(event_name, "missing `issue`"))?;
            ctx.kind = TriggerKind::IssueClosed;
            ctx.issue_number = Some(issue.number);
            ctx.title = issue.title;
        }
    }
    Ok(Some(ctx))
}
