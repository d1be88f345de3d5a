//! Issue references in pull request bodies.

use std::sync::OnceLock;

use regex::Regex;

fn re_closing() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:close[sd]?|fix(?:e[sd])?|resolve[sd]?):?\s+#(\d+)\b").unwrap()
    })
}

fn re_related() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:related\s+to|see|issue):?\s+#(\d+)\b").unwrap())
}

fn re_bare() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|[^\w&/])#(\d+)\b").unwrap())
}

/// Which pattern tier produced an issue reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Closing,
    Related,
    Bare,
}

/// Find the issue a pull request body points at.
///
/// Closing keywords outrank relation keywords, which outrank a bare `#N`.
/// Within a tier the first occurrence wins; references are never aggregated.
pub fn find_issue_reference(body: &str) -> Option<(u64, ReferenceKind)> {
    [
        (re_closing(), ReferenceKind::Closing),
        (re_related(), ReferenceKind::Related),
        (re_bare(), ReferenceKind::Bare),
    ]
    .into_iter()
    .find_map(|(re, kind)| {
        re.captures(body)
            .and_then(|caps| caps.get(1)?.as_str().parse().ok())
            .map(|number| (number, kind))
    })
}

/// Convenience wrapper returning just the issue number.
pub fn associated_issue(body: &str) -> Option<u64> {
    find_issue_reference(body).map(|(number, _)| number)
}
