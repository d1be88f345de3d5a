//! Release-branch templates such as `release/{major}.{minor}`.

use std::fmt;

use regex::Regex;

/// Pre-release suffix accepted after a patch number (`-rc.1`, `-beta.2`).
const PRERELEASE: &str = r"(?:-[0-9A-Za-z.]+)?";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}} in branch template {1:?} (allowed: major, minor, patch)")]
    UnknownPlaceholder(String, String),
    #[error("branch template {0:?} must contain {{major}} and {{minor}}")]
    MissingPlaceholder(String),
    #[error("unterminated placeholder in branch template {0:?}")]
    Unterminated(String),
    #[error("branch template {0:?} does not compile: {1}")]
    Invalid(String, String),
}

/// A compiled release-branch template.
#[derive(Clone)]
pub struct BranchTemplate {
    source: String,
    regex: Regex,
    has_patch: bool,
}

/// Version parts captured from a branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchVersion {
    pub major: String,
    pub minor: String,
    /// Patch with any pre-release suffix; absent for series-only branches.
    pub patch: Option<String>,
}

impl BranchVersion {
    /// The full version, when the branch names one.
    pub fn full(&self) -> Option<String> {
        self.patch
            .as_ref()
            .map(|patch| format!("{}.{}.{patch}", self.major, self.minor))
    }

    /// The `major.minor` series the branch belongs to.
    pub fn series(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl BranchTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut pattern = String::from("^");
        let mut seen = (false, false, false);
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            pattern.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| TemplateError::Unterminated(template.to_string()))?;
            match &after[..close] {
                "major" => {
                    pattern.push_str(r"(?P<major>\d+)");
                    seen.0 = true;
                }
                "minor" => {
                    pattern.push_str(r"(?P<minor>\d+)");
                    seen.1 = true;
                }
                "patch" => {
                    pattern.push_str(&format!(r"(?P<patch>\d+{PRERELEASE})"));
                    seen.2 = true;
                }
                other => {
                    return Err(TemplateError::UnknownPlaceholder(
                        other.to_string(),
                        template.to_string(),
                    ));
                }
            }
            rest = &after[close + 1..];
        }
        pattern.push_str(&regex::escape(rest));

        if !(seen.0 && seen.1) {
            return Err(TemplateError::MissingPlaceholder(template.to_string()));
        }
        // Series templates also accept a concrete patch tacked onto the end.
        if !seen.2 {
            pattern.push_str(&format!(r"(?:\.(?P<tail>\d+{PRERELEASE}))?"));
        }
        pattern.push('$');

        let regex = Regex::new(&pattern)
            .map_err(|e| TemplateError::Invalid(template.to_string(), e.to_string()))?;
        Ok(Self {
            source: template.to_string(),
            regex,
            has_patch: seen.2,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub const fn has_patch(&self) -> bool {
        self.has_patch
    }

    pub fn is_match(&self, branch: &str) -> bool {
        self.regex.is_match(branch)
    }

    /// Match a branch name, returning the captured version parts.
    pub fn capture(&self, branch: &str) -> Option<BranchVersion> {
        let caps = self.regex.captures(branch)?;
        Some(BranchVersion {
            major: caps.name("major")?.as_str().to_string(),
            minor: caps.name("minor")?.as_str().to_string(),
            patch: caps
                .name("patch")
                .or_else(|| caps.name("tail"))
                .map(|m| m.as_str().to_string()),
        })
    }

    /// Whether `branch` is the release branch for `version` (`1.4.2` lives on `release/1.4`).
    pub fn names_version(&self, branch: &str, version: &str) -> bool {
        let Some(found) = self.capture(branch) else {
            return false;
        };
        match found.full() {
            Some(full) if self.has_patch => full == version,
            _ => version
                .strip_prefix(&found.series())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.')),
        }
    }
}

impl Default for BranchTemplate {
    fn default() -> Self {
        // The default template is a literal known to compile.
        Self::parse(crate::config::DEFAULT_BRANCH_TEMPLATE).unwrap()
    }
}

impl fmt::Debug for BranchTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BranchTemplate").field(&self.source).finish()
    }
}
