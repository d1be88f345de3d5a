//! Hosting API access: the `HostingApi` seam and its GitHub REST implementation.

use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use ureq::Body;
use ureq::http::Response;

/// Upper bound on pages followed for one list request.
const MAX_PAGES: usize = 50;

fn re_next_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).unwrap())
}

/// URL of the next page from a `Link` response header.
fn next_page_url(link: &str) -> Option<String> {
    re_next_link().captures(link).map(|caps| caps[1].to_string())
}

fn read_json<T: DeserializeOwned>(url: &str, response: Response<Body>) -> anyhow::Result<T> {
    let body = response
        .into_body()
        .read_to_string()
        .with_context(|| format!("reading response from {url}"))?;
    serde_json::from_str(&body).with_context(|| format!("parsing response from {url}"))
}

/// Pull request fields the bot reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub head_ref: String,
    pub base_ref: String,
    pub merged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInfo {
    pub id: u64,
    pub body: String,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Eyes,
    Rocket,
    Confused,
}

impl Reaction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Reaction::Eyes => "eyes",
            Reaction::Rocket => "rocket",
            Reaction::Confused => "confused",
        }
    }
}

/// Operations against the repository's issues and pull requests.
pub trait HostingApi {
    fn post_comment(&self, number: u64, body: &str) -> anyhow::Result<()>;
    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> anyhow::Result<()>;
    /// Merge a pull request, returning the merge commit SHA.
    fn merge_pull_request(&self, number: u64) -> anyhow::Result<String>;
    fn close_issue(&self, number: u64) -> anyhow::Result<()>;
    fn pull_request(&self, number: u64) -> anyhow::Result<PullRequestInfo>;
    fn open_pull_requests(&self) -> anyhow::Result<Vec<PullRequestInfo>>;
    fn issue_comments(&self, number: u64) -> anyhow::Result<Vec<CommentInfo>>;
}

/// GitHub REST v3 client over `ureq`.
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    repository: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    title: Option<String>,
    body: Option<String>,
    #[serde(default)]
    merged: bool,
    head: RefResponse,
    base: RefResponse,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    id: u64,
    body: Option<String>,
    user: Option<UserResponse>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct MergeResponse {
    sha: Option<String>,
    message: Option<String>,
}

impl From<PullRequestResponse> for PullRequestInfo {
    fn from(pr: PullRequestResponse) -> Self {
        Self {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            body: pr.body.unwrap_or_default(),
            head_ref: pr.head.name,
            base_ref: pr.base.name,
            merged: pr.merged,
        }
    }
}

impl GitHubClient {
    pub fn new(api_url: &str, repository: &str, token: Option<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{path}", self.api_url, self.repository)
    }

    fn token(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .context("no GitHub token configured (set INPUT_GITHUB_TOKEN or GITHUB_TOKEN)")
    }

    fn call(&self, url: &str) -> anyhow::Result<Response<Body>> {
        self.agent
            .get(url)
            .header("Authorization", &format!("Bearer {}", self.token()?))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "release-bot")
            .call()
            .with_context(|| format!("GET {url}"))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = self.url(path);
        let response = self.call(&url)?;
        read_json(&url, response)
    }

    /// Every page of a list endpoint, following `Link: <...>; rel="next"`.
    fn get_all<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(self.url(path));
        let mut pages = 0;
        while let Some(url) = next.take() {
            if pages == MAX_PAGES {
                tracing::warn!(path, pages, "stopped following pagination");
                break;
            }
            pages += 1;
            let response = self.call(&url)?;
            next = response
                .headers()
                .get("link")
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_url);
            let page: Vec<T> = read_json(&url, response)?;
            items.extend(page);
        }
        Ok(items)
    }

    fn send(
        &self,
        method: &str,
        path: &str,
        payload: &serde_json::Value,
    ) -> anyhow::Result<String> {
        let url = self.url(path);
        let auth = format!("Bearer {}", self.token()?);
        let request = match method {
            "POST" => self.agent.post(&url),
            "PUT" => self.agent.put(&url),
            "PATCH" => self.agent.patch(&url),
            other => anyhow::bail!("unsupported method {other}"),
        };
        let body = request
            .header("Authorization", &auth)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "release-bot")
            .header("Content-Type", "application/json")
            .send(payload.to_string())
            .with_context(|| format!("{method} {url}"))?
            .into_body()
            .read_to_string()
            .with_context(|| format!("reading response from {url}"))?;
        Ok(body)
    }
}

impl HostingApi for GitHubClient {
    fn post_comment(&self, number: u64, body: &str) -> anyhow::Result<()> {
        self.send(
            "POST",
            &format!("issues/{number}/comments"),
            &serde_json::json!({ "body": body }),
        )?;
        tracing::info!(number, "posted comment");
        Ok(())
    }

    fn react_to_comment(&self, comment_id: u64, reaction: Reaction) -> anyhow::Result<()> {
        self.send(
            "POST",
            &format!("issues/comments/{comment_id}/reactions"),
            &serde_json::json!({ "content": reaction.as_str() }),
        )?;
        Ok(())
    }

    fn merge_pull_request(&self, number: u64) -> anyhow::Result<String> {
        let body = self.send(
            "PUT",
            &format!("pulls/{number}/merge"),
            &serde_json::json!({ "merge_method": "merge" }),
        )?;
        let merged: MergeResponse =
            serde_json::from_str(&body).context("parsing merge response")?;
        tracing::info!(
            number,
            message = merged.message.as_deref().unwrap_or_default(),
            "merged pull request"
        );
        Ok(merged.sha.unwrap_or_default())
    }

    fn close_issue(&self, number: u64) -> anyhow::Result<()> {
        self.send(
            "PATCH",
            &format!("issues/{number}"),
            &serde_json::json!({ "state": "closed" }),
        )?;
        tracing::info!(number, "closed issue");
        Ok(())
    }

    fn pull_request(&self, number: u64) -> anyhow::Result<PullRequestInfo> {
        let pr: PullRequestResponse = self.get(&format!("pulls/{number}"))?;
        Ok(pr.into())
    }

    fn open_pull_requests(&self) -> anyhow::Result<Vec<PullRequestInfo>> {
        let prs: Vec<PullRequestResponse> = self.get_all("pulls?state=open&per_page=100")?;
        Ok(prs.into_iter().map(Into::into).collect())
    }

    fn issue_comments(&self, number: u64) -> anyhow::Result<Vec<CommentInfo>> {
        let comments: Vec<CommentResponse> =
            self.get_all(&format!("issues/{number}/comments?per_page=100"))?;
        Ok(comments
            .into_iter()
            .map(|c| CommentInfo {
                id: c.id,
                body: c.body.unwrap_or_default(),
                author: c.user.map(|u| u.login),
            })
            .collect())
    }
}
