//! ChatOps comment grammar: `/<prefix> <verb> [version]`.

use crate::classify::version::{is_bump_keyword, normalize_version};
use crate::error::ClassifyError;
use crate::intent::Verb;

/// A recognized slash command, before version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub verb: Verb,
    /// The verb word as typed (empty when the comment had only the prefix).
    pub raw_verb: String,
    pub argument: Option<String>,
}

/// What the optional argument after the verb turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArgument {
    Version(String),
    Bump(String),
}

/// Parse a comment body. `None` means the comment is not addressed to the bot.
///
/// Only the first non-empty line is considered; the rest of the comment is
/// free text for humans.
pub fn parse_comment(body: &str, command: &str) -> Option<ParsedCommand> {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty())?;
    let rest = strip_prefix_ci(line, command)?;
    let mut words = rest.split_whitespace();
    let raw_verb = words.next().unwrap_or_default().to_string();
    let argument = words.next().map(str::to_string);
    Some(ParsedCommand {
        verb: Verb::parse(&raw_verb),
        raw_verb,
        argument,
    })
}

impl ParsedCommand {
    /// Validate the argument against the verb.
    pub fn argument(&self) -> Result<Option<CommandArgument>, ClassifyError> {
        let Some(raw) = self.argument.as_deref() else {
            return Ok(None);
        };
        if self.verb == Verb::Unknown {
            return Ok(None);
        }
        if let Some(version) = normalize_version(raw) {
            return Ok(Some(CommandArgument::Version(version)));
        }
        if self.verb.accepts_bump() && is_bump_keyword(raw) {
            return Ok(Some(CommandArgument::Bump(raw.to_ascii_lowercase())));
        }
        Err(ClassifyError::InvalidVersion(raw.to_string()))
    }
}

/// Strip a case-insensitive prefix that must end at a word boundary.
fn strip_prefix_ci<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &input[prefix.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return Some(rest.trim());
    }
    // `/release-botx` is someone else's command
    None
}
