//! In-memory fakes for the hosting API, release records, and the command runner.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use crate::classify::records::ReleaseRecords;
use crate::error::ExitError;
use crate::github::{CommentInfo, HostingApi, PullRequestInfo, Reaction};
use crate::subprocess::{CommandResult, CommandRunner, Invocation};

pub fn pull_request(number: u64, head: &str, base: &str, body: &str) -> PullRequestInfo {
    PullRequestInfo {
        number,
        title: format!("PR {number}"),
        body: body.to_string(),
        head_ref: head.to_string(),
        base_ref: base.to_string(),
        merged: false,
    }
}

/// Recording hosting API. Posted comments become readable through
/// `issue_comments`, so stored markers round-trip.
#[derive(Default)]
pub struct FakeHost {
    comments: RefCell<BTreeMap<u64, Vec<CommentInfo>>>,
    pulls: RefCell<Vec<PullRequestInfo>>,
    open: RefCell<Vec<PullRequestInfo>>,
    failing: RefCell<Vec<&'static str>>,
    next_id: Cell<u64>,
    pub posted: RefCell<Vec<(u64, String)>>,
    pub reactions: RefCell<Vec<(u64, Reaction)>>,
    pub merged: RefCell<Vec<u64>>,
    pub closed: RefCell<Vec<u64>>,
}

impl FakeHost {
    pub fn add_comment(&self, number: u64, body: &str) {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.comments
            .borrow_mut()
            .entry(number)
            .or_default()
            .push(CommentInfo {
                id,
                body: body.to_string(),
                author: Some("github-actions[bot]".into()),
            });
    }

    #[must_use]
    pub fn with_pull_request(self, pr: PullRequestInfo) -> Self {
        self.pulls.borrow_mut().push(pr);
        self
    }

    pub fn add_open_pull_request(&self, pr: PullRequestInfo) {
        self.open.borrow_mut().push(pr);
    }

    /// Make one operation (`post_comment`, `merge`, `close`, `react`, ...) fail.
    #[must_use]
    pub fn failing(self, operation: &'static str) -> Self {
        self.failing.borrow_mut().push(operation);
        self
    }

    pub fn posted_bodies(&self) -> Vec<String> {
        self.posted.borrow().iter().map(|(_, body)| body.clone()).collect()
    }

    fn check(&self, operation: &str) -> anyhow::Result<()> {
        if self.failing.borrow().iter().any(|op| *op == operation) {
            anyhow::bail!("{operation}: 403 Resource not accessible by integration");
        }
        Ok(())
    }
}

impl HostingApi for FakeHost {
    fn post_comment(&self, number: u64, body: &str) -> anyhow::Result<()> {
        self.check("post_comment")?;
        self.posted.borrow_mut().push((number, body.to_string()));
        self.add_comment(number, body);
        Ok(())
    }

    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> anyhow::Result<()> {
        self.check("react")?;
        self.reactions.borrow_mut().push((comment_id, reaction));
        Ok(())
    }

    fn merge_pull_request(&self, number: u64) -> anyhow::Result<String> {
        self.check("merge")?;
        self.merged.borrow_mut().push(number);
        Ok("0123abcd".into())
    }

    fn close_issue(&self, number: u64) -> anyhow::Result<()> {
        self.check("close")?;
        self.closed.borrow_mut().push(number);
        Ok(())
    }

    fn pull_request(&self, number: u64) -> anyhow::Result<PullRequestInfo> {
        self.check("pull_request")?;
        self.pulls
            .borrow()
            .iter()
            .chain(self.open.borrow().iter())
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("pull request #{number} not found"))
    }

    fn open_pull_requests(&self) -> anyhow::Result<Vec<PullRequestInfo>> {
        self.check("open_pull_requests")?;
        Ok(self.open.borrow().clone())
    }

    fn issue_comments(&self, number: u64) -> anyhow::Result<Vec<CommentInfo>> {
        self.check("issue_comments")?;
        Ok(self.comments.borrow().get(&number).cloned().unwrap_or_default())
    }
}

/// Release records backed by fixed maps; counts lookups.
#[derive(Default)]
pub struct FakeRecords {
    tickets: HashMap<u64, String>,
    draft: Option<String>,
    fail: bool,
    lookups: Cell<usize>,
}

impl FakeRecords {
    #[must_use]
    pub fn with_ticket(mut self, number: u64, version: &str) -> Self {
        self.tickets.insert(number, version.to_string());
        self
    }

    #[must_use]
    pub fn with_draft(mut self, version: &str) -> Self {
        self.draft = Some(version.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl ReleaseRecords for FakeRecords {
    fn version_for_ticket(&self, _repository: &str, number: u64) -> anyhow::Result<Option<String>> {
        self.lookups.set(self.lookups.get() + 1);
        if self.fail {
            anyhow::bail!("lookup unavailable");
        }
        Ok(self.tickets.get(&number).cloned())
    }

    fn latest_draft_version(&self) -> anyhow::Result<Option<String>> {
        self.lookups.set(self.lookups.get() + 1);
        if self.fail {
            anyhow::bail!("lookup unavailable");
        }
        Ok(self.draft.clone())
    }
}

/// Command runner answering from a script. The first rule whose needle occurs
/// in the rendered command line decides the result; unmatched commands succeed
/// with empty output. A `None` outcome simulates a missing executable.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, Option<CommandResult>)>,
    pub calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn on(mut self, needle: &str, result: CommandResult) -> Self {
        self.rules.push((needle.to_string(), Some(result)));
        self
    }

    #[must_use]
    pub fn missing(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), None));
        self
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<CommandResult> {
        self.calls.borrow_mut().push(invocation.clone());
        let line = invocation.to_string();
        match self.rules.iter().find(|(needle, _)| line.contains(needle.as_str())) {
            Some((_, Some(result))) => Ok(result.clone()),
            Some((_, None)) => Err(ExitError::ToolNotFound {
                tool: invocation.program.clone(),
            }
            .into()),
            None => Ok(CommandResult::ok("")),
        }
    }
}
