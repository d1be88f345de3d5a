//! Parsing of the release tool's human-oriented output.

use std::sync::OnceLock;

use regex::Regex;

fn re_ansi() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap())
}

fn re_generated() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Generated release notes for .*?(\d+\.\d+\.\d+(?:-[0-9A-Za-z]+(?:\.[0-9A-Za-z]+)*)?)")
            .unwrap()
    })
}

fn re_written() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Release notes written to:.*?/(\d+\.\d+\.\d+[0-9A-Za-z.-]*?)(?:-code-\d+|-doc|-release)?\.md")
            .unwrap()
    })
}

fn re_issue_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bissue #(\d+)").unwrap())
}

fn re_issue_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+/issues/\d+").unwrap())
}

fn re_release_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+/releases/\S+").unwrap())
}

pub fn strip_ansi(text: &str) -> String {
    re_ansi().replace_all(text, "").into_owned()
}

/// The version a `generate` run produced, read from its output.
pub fn generated_version(output: &str) -> Option<String> {
    let output = strip_ansi(output);
    re_generated()
        .captures(&output)
        .or_else(|| re_written().captures(&output))
        .map(|caps| caps[1].to_string())
}

/// Links and identifiers reported by `push`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub issue_number: Option<u64>,
    pub issue_url: Option<String>,
    pub release_url: Option<String>,
}

pub fn parse_push_output(output: &str) -> PushSummary {
    let output = strip_ansi(output);
    PushSummary {
        issue_number: re_issue_number()
            .captures(&output)
            .and_then(|caps| caps[1].parse().ok()),
        issue_url: re_issue_url().find(&output).map(|m| m.as_str().to_string()),
        release_url: re_release_url().find(&output).map(|m| m.as_str().to_string()),
    }
}
