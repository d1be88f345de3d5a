use std::fmt;
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::error::ExitError;

/// Outcome of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Diagnostic text for a failed step: stderr then stdout, or a fallback
    /// naming the exit code when both are blank.
    pub fn diagnostic(&self) -> String {
        let parts: Vec<&str> = [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            format!("Command failed with exit code {}", self.exit_code)
        } else {
            parts.join("\n")
        }
    }
}

/// A program plus arguments, rendered for logs and responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replace every occurrence of `placeholder` in the arguments.
    #[must_use]
    pub fn substitute(mut self, placeholder: &str, value: &str) -> Self {
        for arg in &mut self.args {
            if arg.contains(placeholder) {
                *arg = arg.replace(placeholder, value);
            }
        }
        self
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a.contains(needle))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Runs invocations. The seam tests swap for a scripted runner.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<CommandResult>;
}

/// Builder for running the release tool and git.
pub struct Tool {
    invocation: Invocation,
}

impl Tool {
    pub const fn new(invocation: Invocation) -> Self {
        Self { invocation }
    }

    /// Run the tool, capturing stdout and stderr. Blocks until it exits.
    pub fn run(&self) -> anyhow::Result<CommandResult> {
        let mut cmd = Command::new(&self.invocation.program);
        cmd.args(&self.invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| self.not_found_or_other(e))?;
        let exit_code = output.status.code().unwrap_or(-1);
        Ok(CommandResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }

    fn not_found_or_other(&self, e: std::io::Error) -> anyhow::Error {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExitError::ToolNotFound {
                tool: self.invocation.program.clone(),
            }
            .into()
        } else {
            anyhow::Error::new(e).context(format!("running {}", self.invocation.program))
        }
    }
}

/// Runs invocations as real subprocesses.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    pub debug: bool,
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<CommandResult> {
        tracing::info!("Running: {invocation}");
        let result = Tool::new(invocation.clone())
            .run()
            .with_context(|| format!("invoking {}", invocation.program))?;
        if self.debug {
            tracing::debug!("Exit code: {}", result.exit_code);
            if !result.stdout.trim().is_empty() {
                tracing::debug!("STDOUT:\n{}", result.stdout.trim_end());
            }
            if !result.stderr.trim().is_empty() {
                tracing::debug!("STDERR:\n{}", result.stderr.trim_end());
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_echo() {
        let output = Tool::new(Invocation::new("echo").arg("hello")).run().unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn run_false_fails() {
        let output = Tool::new(Invocation::new("false")).run().unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, 1);
    }

    #[test]
    fn run_not_found() {
        let err = Tool::new(Invocation::new("nonexistent-tool-xyz")).run().unwrap_err();
        let exit_err = err.downcast_ref::<ExitError>().unwrap();
        assert!(matches!(exit_err, ExitError::ToolNotFound { .. }));
    }

    #[test]
    fn system_runner_captures_failure_in_debug_mode() {
        let runner = SystemRunner { debug: true };
        let result = runner
            .run(&Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.diagnostic(), "err\nout");
    }

    #[test]
    fn system_runner_maps_missing_program() {
        let err = SystemRunner::default()
            .run(&Invocation::new("nonexistent-tool-xyz"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExitError>(),
            Some(ExitError::ToolNotFound { .. })
        ));
    }

    #[test]
    fn diagnostic_prefers_stderr_then_stdout() {
        let result = CommandResult {
            success: false,
            stdout: "Line 1\nLine 2\n".into(),
            stderr: "Error A\nError B\n".into(),
            exit_code: 1,
        };
        assert_eq!(result.diagnostic(), "Error A\nError B\nLine 1\nLine 2");
    }

    #[test]
    fn diagnostic_falls_back_to_exit_code() {
        for code in [1, 2, 127, 255] {
            let result = CommandResult {
                success: false,
                stdout: "   \n  ".into(),
                stderr: "\n\t  ".into(),
                exit_code: code,
            };
            assert_eq!(result.diagnostic(), format!("Command failed with exit code {code}"));
        }
    }

    #[test]
    fn invocation_display_quotes_whitespace() {
        let inv = Invocation::new("release-tool")
            .args(["--auto", "push", "1.2.3"])
            .arg("--note")
            .arg("two words");
        assert_eq!(inv.to_string(), r#"release-tool --auto push 1.2.3 --note "two words""#);
    }

    #[test]
    fn substitute_placeholder() {
        let inv = Invocation::new("release-tool")
            .args(["push", "$VERSION"])
            .substitute("$VERSION", "2.0.0");
        assert_eq!(inv.args, vec!["push", "2.0.0"]);
        assert!(!inv.contains("$VERSION"));
    }
}
