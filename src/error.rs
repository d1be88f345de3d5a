use std::process::ExitCode;

/// Errors that cause release-bot to exit with a specific code.
#[derive(Debug, thiserror::Error)]
pub enum ExitError {
    #[error("config error: {0}")]
    Config(String),

    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("step `{step}` failed (exit {code}): {message}")]
    StepFailed {
        step: String,
        code: i32,
        message: String,
    },

    #[error("{0}")]
    Classification(String),

    #[error("could not resolve a release version: {0}")]
    VersionUnresolved(String),
}

impl ExitError {
    pub const fn code(&self) -> u8 {
        match self {
            ExitError::Config(_) => 2,
            ExitError::ToolNotFound { .. } => 3,
            ExitError::StepFailed { .. } => 4,
            ExitError::Classification(_) => 5,
            ExitError::VersionUnresolved(_) => 6,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Why a trigger could not be turned into an intent.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("malformed {event} payload: {detail}")]
    MalformedPayload { event: String, detail: String },

    #[error("invalid version argument {0:?}: expected MAJOR.MINOR.PATCH (optionally prefixed with `v`)")]
    InvalidVersion(String),

    #[error("no release version could be resolved for `{verb}`")]
    VersionUnresolved { verb: String, hint: String },

    #[error("no open pull request found for {target}")]
    PullRequestNotFound { target: String },

    #[error("hosting API lookup failed: {0:#}")]
    Lookup(anyhow::Error),
}

impl ClassifyError {
    pub fn malformed(event: &str, detail: impl Into<String>) -> Self {
        ClassifyError::MalformedPayload {
            event: event.to_string(),
            detail: detail.into(),
        }
    }

    /// Guidance shown to the person who triggered the run.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            ClassifyError::VersionUnresolved { hint, .. } => Some(hint),
            ClassifyError::InvalidVersion(_) => {
                Some("Pass a version such as `1.2.3` or `v1.2.3-rc.1`.")
            }
            _ => None,
        }
    }
}

impl From<ClassifyError> for ExitError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::VersionUnresolved { .. } => {
                ExitError::VersionUnresolved(err.to_string())
            }
            other => ExitError::Classification(other.to_string()),
        }
    }
}
