//! Event classification: turn a trigger into an [`Intent`].

pub mod branch;
pub mod command;
pub mod records;
pub mod references;
pub mod version;

use crate::config::Settings;
use crate::error::ClassifyError;
use crate::event::{TriggerContext, TriggerKind};
use crate::github::{HostingApi, PullRequestInfo};
use crate::intent::{Intent, ReleaseMode, Verb, VersionNeed};

use command::{CommandArgument, parse_comment};
use records::ReleaseRecords;
use references::associated_issue;
use version::{VersionQuery, normalize_version, version_from_title};

/// Result of classifying one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Nothing for the bot to do; the reason is logged.
    Ignored(String),
    Intent(Intent),
}

/// Version-resolution inputs gathered while classifying, before the resolver
/// chain runs.
#[derive(Default)]
struct Lookup<'a> {
    explicit: Option<String>,
    tickets: Vec<u64>,
    use_drafts: bool,
    title: Option<&'a str>,
    branches: Vec<String>,
}

pub struct Classifier<'a> {
    settings: &'a Settings,
    records: &'a dyn ReleaseRecords,
    host: &'a dyn HostingApi,
}

impl<'a> Classifier<'a> {
    pub fn new(
        settings: &'a Settings,
        records: &'a dyn ReleaseRecords,
        host: &'a dyn HostingApi,
    ) -> Self {
        Self {
            settings,
            records,
            host,
        }
    }

    pub fn classify(&self, ctx: &TriggerContext) -> Result<Classification, ClassifyError> {
        let classification = match ctx.kind {
            TriggerKind::ManualDispatch => self.manual(ctx)?,
            TriggerKind::IssueComment => self.comment(ctx)?,
            TriggerKind::PrClosed => self.pr_closed(ctx)?,
            TriggerKind::IssueClosed => self.issue_closed(ctx)?,
        };
        match &classification {
            Classification::Ignored(reason) => {
                tracing::info!(trigger = ctx.kind.as_str(), "ignored: {reason}");
            }
            Classification::Intent(intent) => tracing::info!(
                trigger = ctx.kind.as_str(),
                verb = %intent.verb,
                version = intent.version().unwrap_or("-"),
                mode = %intent.release_mode,
                issue = ?intent.issue_number,
                pr = ?intent.pr_number,
                "classified"
            ),
        }
        Ok(classification)
    }

    fn manual(&self, ctx: &TriggerContext) -> Result<Classification, ClassifyError> {
        let inputs = &ctx.inputs;
        let (verb, raw_verb) = match inputs.command.as_deref() {
            Some(word) => (Verb::parse(word), Some(word.to_string())),
            None => (Verb::Generate, None),
        };
        let mode = match verb {
            Verb::Merge => ReleaseMode::MarkPublished,
            _ => ReleaseMode::Draft,
        };
        let mut intent = Intent::new(verb, mode);
        if verb == Verb::Unknown {
            intent.raw_verb = raw_verb;
            return Ok(Classification::Intent(intent));
        }

        let explicit = inputs
            .version
            .as_deref()
            .map(|raw| {
                normalize_version(raw).ok_or_else(|| ClassifyError::InvalidVersion(raw.to_string()))
            })
            .transpose()?;
        intent.bump = inputs.new_version_type.as_ref().map(|t| t.to_ascii_lowercase());
        intent.from_version = inputs.from_version.clone();
        intent.force = inputs.force.clone();
        intent.detect_mode = inputs.detect_mode.clone();

        let lookup = Lookup {
            explicit,
            use_drafts: true,
            ..Lookup::default()
        };
        self.resolve(&mut intent, ctx, &lookup)?;
        if verb == Verb::Merge {
            self.attach_pull_request(&mut intent)?;
        }
        Ok(Classification::Intent(intent))
    }

    fn comment(&self, ctx: &TriggerContext) -> Result<Classification, ClassifyError> {
        let command = self.settings.command();
        let Some(parsed) = parse_comment(&ctx.body, &command) else {
            return Ok(Classification::Ignored(format!(
                "comment does not start with {command}"
            )));
        };
        let verb = parsed.verb;
        let mode = match verb {
            Verb::Publish => ReleaseMode::Published,
            Verb::Merge => ReleaseMode::MarkPublished,
            _ => ReleaseMode::Draft,
        };
        let mut intent = Intent::new(verb, mode);
        if verb == Verb::Unknown {
            intent.raw_verb = Some(parsed.raw_verb);
            intent.issue_number = ctx.issue_number;
            intent.pr_number = ctx.pr_number;
            return Ok(Classification::Intent(intent));
        }

        let mut lookup = Lookup {
            title: ctx.title.as_deref(),
            ..Lookup::default()
        };
        match parsed.argument()? {
            Some(CommandArgument::Version(version)) => lookup.explicit = Some(version),
            Some(CommandArgument::Bump(bump)) => intent.bump = Some(bump),
            None => {}
        }

        if ctx.on_pull_request && verb != Verb::List {
            let number = ctx.pr_number.ok_or_else(|| {
                ClassifyError::malformed("issue_comment", "pull request without a number")
            })?;
            let pr = self.host.pull_request(number).map_err(ClassifyError::Lookup)?;
            intent.pr_number = Some(number);
            intent.issue_number = associated_issue(&pr.body);
            lookup.tickets.extend(intent.issue_number);
            lookup.tickets.push(number);
            lookup.branches = vec![pr.head_ref.clone(), pr.base_ref.clone()];
            if matches!(verb, Verb::Generate | Verb::Update) {
                intent.checkout_branch = Some(pr.head_ref);
            }
        } else {
            intent.issue_number = ctx.issue_number;
            intent.pr_number = ctx.pr_number;
            lookup.tickets.extend(ctx.issue_number);
        }

        self.resolve(&mut intent, ctx, &lookup)?;
        if verb == Verb::Merge && intent.pr_number.is_none() {
            self.attach_pull_request(&mut intent)?;
        }
        Ok(Classification::Intent(intent))
    }

    fn pr_closed(&self, ctx: &TriggerContext) -> Result<Classification, ClassifyError> {
        if !ctx.merged {
            return Ok(Classification::Ignored("pull request was closed without merging".into()));
        }
        let template = &self.settings.branch_template;
        let branches: Vec<String> = [ctx.head_branch.as_ref(), ctx.base_branch.as_ref()]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        let on_release_branch = branches.iter().any(|b| template.is_match(b));
        let titled = ctx.title.as_deref().and_then(version_from_title).is_some();
        if !on_release_branch && !titled {
            return Ok(Classification::Ignored(format!(
                "neither branch matches `{}` and the title names no version",
                template.as_str()
            )));
        }

        let mut intent = Intent::new(Verb::Publish, ReleaseMode::MarkPublished);
        intent.pr_number = ctx.pr_number;
        intent.issue_number = associated_issue(&ctx.body);
        let mut lookup = Lookup {
            title: ctx.title.as_deref(),
            branches,
            ..Lookup::default()
        };
        lookup.tickets.extend(intent.issue_number);
        lookup.tickets.extend(ctx.pr_number);
        self.resolve(&mut intent, ctx, &lookup)?;
        Ok(Classification::Intent(intent))
    }

    fn issue_closed(&self, ctx: &TriggerContext) -> Result<Classification, ClassifyError> {
        let mut intent = Intent::new(Verb::Publish, ReleaseMode::Published);
        intent.issue_number = ctx.issue_number;
        let mut lookup = Lookup {
            title: ctx.title.as_deref(),
            ..Lookup::default()
        };
        lookup.tickets.extend(ctx.issue_number);
        self.resolve(&mut intent, ctx, &lookup)?;
        Ok(Classification::Intent(intent))
    }

    /// Attach a version according to the verb's need.
    fn resolve(
        &self,
        intent: &mut Intent,
        ctx: &TriggerContext,
        lookup: &Lookup<'_>,
    ) -> Result<(), ClassifyError> {
        let need = match intent.verb.version_need() {
            // A requested bump names the next version; generate reports it.
            VersionNeed::Optional | VersionNeed::Required
                if intent.bump.is_some() && intent.verb.accepts_bump() =>
            {
                tracing::info!(bump = ?intent.bump, "bump requested, skipping version lookup");
                VersionNeed::ExplicitOnly
            }
            need => need,
        };
        let query = VersionQuery {
            explicit: lookup.explicit.as_deref(),
            repository: &ctx.repository,
            tickets: lookup.tickets.clone(),
            use_drafts: lookup.use_drafts,
            title: lookup.title,
            branches: lookup.branches.iter().map(String::as_str).collect(),
            template: &self.settings.branch_template,
            records: self.records,
        };
        match need {
            VersionNeed::None => {}
            VersionNeed::ExplicitOnly => intent.version = version::from_explicit(&query),
            VersionNeed::Optional | VersionNeed::Required => {
                let resolution = version::resolve(&query);
                intent.version = resolution.version;
                intent.warnings.extend(resolution.warnings);
            }
        }
        if need == VersionNeed::Required && intent.version.is_none() {
            return Err(ClassifyError::VersionUnresolved {
                verb: intent.verb.to_string(),
                hint: self.version_hint(intent.verb, ctx.kind),
            });
        }
        Ok(())
    }

    fn version_hint(&self, verb: Verb, kind: TriggerKind) -> String {
        match kind {
            TriggerKind::ManualDispatch => {
                "Set the `version` input of the workflow run, e.g. `1.2.3`.".to_string()
            }
            TriggerKind::IssueComment => format!(
                "Pass the version explicitly, e.g. `{} {verb} 1.2.3`, or title the issue `Release 1.2.3`.",
                self.settings.command()
            ),
            TriggerKind::PrClosed | TriggerKind::IssueClosed => format!(
                "Title the issue or pull request `Release 1.2.3`, or comment `{} {verb} 1.2.3`.",
                self.settings.command()
            ),
        }
    }

    /// Find the pull request a `merge` refers to: the first open PR whose body
    /// references the issue, else the first whose head branch is the release
    /// branch for the version.
    fn attach_pull_request(&self, intent: &mut Intent) -> Result<(), ClassifyError> {
        let prs = self.host.open_pull_requests().map_err(ClassifyError::Lookup)?;
        let template = &self.settings.branch_template;
        let by_issue = |pr: &&PullRequestInfo| {
            intent.issue_number.is_some() && associated_issue(&pr.body) == intent.issue_number
        };
        let by_branch = |pr: &&PullRequestInfo| {
            intent
                .version()
                .is_some_and(|v| template.names_version(&pr.head_ref, v))
        };
        let found = prs.iter().find(by_issue).or_else(|| prs.iter().find(by_branch));
        match found {
            Some(pr) => {
                tracing::info!(pr = pr.number, head = %pr.head_ref, "found pull request to merge");
                intent.pr_number = Some(pr.number);
                Ok(())
            }
            None => Err(ClassifyError::PullRequestNotFound {
                target: match (intent.issue_number, intent.version()) {
                    (Some(issue), _) => format!("issue #{issue}"),
                    (None, Some(version)) => format!("version {version}"),
                    (None, None) => "this trigger".to_string(),
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DispatchInputs;
    use crate::intent::VersionSource;
    use crate::testing::{FakeHost, FakeRecords, pull_request};

    fn comment(body: &str, number: u64, on_pr: bool) -> TriggerContext {
        let mut ctx = TriggerContext::manual("acme/widgets", DispatchInputs::default());
        ctx.kind = TriggerKind::IssueComment;
        ctx.body = body.to_string();
        ctx.issue_number = Some(number);
        ctx.on_pull_request = on_pr;
        if on_pr {
            ctx.pr_number = Some(number);
        }
        ctx.comment_id = Some(1);
        ctx
    }

    fn pr_closed(head: &str, base: &str, title: &str, body: &str) -> TriggerContext {
        let mut ctx = TriggerContext::manual("acme/widgets", DispatchInputs::default());
        ctx.kind = TriggerKind::PrClosed;
        ctx.pr_number = Some(50);
        ctx.merged = true;
        ctx.head_branch = Some(head.into());
        ctx.base_branch = Some(base.into());
        ctx.title = Some(title.into());
        ctx.body = body.into();
        ctx
    }

    fn intent(result: Result<Classification, ClassifyError>) -> Intent {
        match result.unwrap() {
            Classification::Intent(intent) => intent,
            Classification::Ignored(reason) => panic!("unexpectedly ignored: {reason}"),
        }
    }

    #[test]
    fn issue_comment_publish_defaults_to_published() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        for prefix in ["/release-bot", "/RELEASE-BOT"] {
            let ctx = comment(&format!("{prefix} publish 1.2.3"), 9, false);
            let intent = intent(classifier.classify(&ctx));
            assert_eq!(intent.verb, Verb::Publish);
            assert_eq!(intent.version(), Some("1.2.3"));
            assert_eq!(intent.release_mode, ReleaseMode::Published);
            assert_eq!(intent.issue_number, Some(9));
        }
    }

    #[test]
    fn custom_prefix_is_honoured() {
        let mut settings = Settings::default();
        settings.bot.command_prefix = "ship".into();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let result = classifier.classify(&comment("/release-bot publish 1.2.3", 9, false)).unwrap();
        assert!(matches!(result, Classification::Ignored(_)));
        let intent = intent(classifier.classify(&comment("/ship list", 9, false)));
        assert_eq!(intent.verb, Verb::List);
    }

    #[test]
    fn non_command_comment_is_ignored() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let result = classifier.classify(&comment("Looks good to me!", 3, false)).unwrap();
        assert!(matches!(result, Classification::Ignored(_)));
    }

    #[test]
    fn unknown_verb_skips_resolution() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let intent = intent(classifier.classify(&comment("/release-bot frobnicate", 3, false)));
        assert_eq!(intent.verb, Verb::Unknown);
        assert_eq!(intent.raw_verb.as_deref(), Some("frobnicate"));
        assert_eq!(records.lookups(), 0);
    }

    #[test]
    fn publish_without_version_is_unresolved_with_guidance() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let err = classifier
            .classify(&comment("/release-bot publish", 3, false))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::VersionUnresolved { .. }));
        assert!(err.guidance().unwrap().contains("/release-bot publish 1.2.3"));
    }

    #[test]
    fn update_tolerates_missing_version() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let intent = intent(classifier.classify(&comment("/release-bot update", 3, false)));
        assert_eq!(intent.verb, Verb::Update);
        assert_eq!(intent.version, None);
        assert_eq!(intent.release_mode, ReleaseMode::Draft);
    }

    #[test]
    fn stored_version_from_issue_is_used() {
        let settings = Settings::default();
        let records = FakeRecords::default().with_ticket(3, "4.0.0");
        let host = FakeHost::default();
        let classifier = Classifier::new(&settings, &records, &host);
        let mut ctx = comment("/release-bot publish", 3, false);
        ctx.title = Some("Release 3.9.0".into());
        let intent = intent(classifier.classify(&ctx));
        assert_eq!(intent.version(), Some("4.0.0"));
        assert_eq!(intent.warnings.len(), 1);
    }

    #[test]
    fn generate_on_pull_request_checks_out_head() {
        let settings = Settings::default();
        let records = FakeRecords::default().with_ticket(12, "1.5.0");
        let host = FakeHost::default()
            .with_pull_request(pull_request(30, "prepare/1.5.0", "release/1.5", "Closes #12"));
        let classifier = Classifier::new(&settings, &records, &host);
        let intent = intent(classifier.classify(&comment("/release-bot generate", 30, true)));
        assert_eq!(intent.pr_number, Some(30));
        assert_eq!(intent.issue_number, Some(12));
        assert_eq!(intent.checkout_branch.as_deref(), Some("prepare/1.5.0"));
        // generate only takes explicit versions
        assert_eq!(intent.version, None);
        assert_eq!(records.lookups(), 0);
    }

    #[test]
    fn generate_with_bump_keyword() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let intent = intent(classifier.classify(&comment("/release-bot generate rc", 3, false)));
        assert_eq!(intent.bump.as_deref(), Some("rc"));
        assert_eq!(intent.version, None);
    }

    #[test]
    fn update_bump_keyword_is_not_overridden_by_title() {
        let settings = Settings::default();
        let records = FakeRecords::default().with_ticket(3, "1.1.0");
        let host = FakeHost::default();
        let classifier = Classifier::new(&settings, &records, &host);
        let mut ctx = comment("/release-bot update rc", 3, false);
        ctx.title = Some("Prepare Release 1.2.0".into());
        let intent = intent(classifier.classify(&ctx));
        assert_eq!(intent.bump.as_deref(), Some("rc"));
        assert_eq!(intent.version, None);
        assert_eq!(records.lookups(), 0);

        let lines: Vec<String> = crate::dispatch::plan::plan(&intent, &settings)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(lines[1], "release-tool --auto generate --new rc");
        assert_eq!(lines[2], "release-tool --auto push $VERSION --release-mode draft --issue 3");
    }

    #[test]
    fn manual_bump_ignores_newest_draft() {
        let settings = Settings::default();
        let records = FakeRecords::default().with_draft("9.3.0-rc.30");
        let host = FakeHost::default();
        let classifier = Classifier::new(&settings, &records, &host);
        let inputs = DispatchInputs {
            command: Some("update".into()),
            new_version_type: Some("Minor".into()),
            ..DispatchInputs::default()
        };
        let intent = intent(classifier.classify(&TriggerContext::manual("acme/widgets", inputs)));
        assert_eq!(intent.bump.as_deref(), Some("minor"));
        assert_eq!(intent.version, None);
        assert_eq!(records.lookups(), 0);
    }

    #[test]
    fn manual_publish_still_requires_version_with_bump() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let inputs = DispatchInputs {
            command: Some("publish".into()),
            new_version_type: Some("patch".into()),
            ..DispatchInputs::default()
        };
        let err = classifier
            .classify(&TriggerContext::manual("acme/widgets", inputs))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::VersionUnresolved { .. }));
    }

    #[test]
    fn invalid_version_argument_is_an_error() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let err = classifier
            .classify(&comment("/release-bot publish latest", 3, false))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidVersion(_)));
    }

    #[test]
    fn merge_from_issue_finds_pull_request_by_reference() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        host.add_open_pull_request(pull_request(40, "feature/x", "main", "Fixes #99"));
        host.add_open_pull_request(pull_request(41, "docs/bump", "release/2.0", "Related to #7"));
        let classifier = Classifier::new(&settings, &records, &host);
        let intent = intent(classifier.classify(&comment("/release-bot merge 2.0.1", 7, false)));
        assert_eq!(intent.pr_number, Some(41));
        assert_eq!(intent.issue_number, Some(7));
        assert_eq!(intent.release_mode, ReleaseMode::MarkPublished);
    }

    #[test]
    fn merge_from_issue_falls_back_to_release_branch() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        host.add_open_pull_request(pull_request(40, "release/1.9", "main", ""));
        host.add_open_pull_request(pull_request(42, "release/2.0", "main", ""));
        let classifier = Classifier::new(&settings, &records, &host);
        let intent = intent(classifier.classify(&comment("/release-bot merge 2.0.1", 7, false)));
        assert_eq!(intent.pr_number, Some(42));
    }

    #[test]
    fn merge_without_matching_pull_request_fails() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let err = classifier
            .classify(&comment("/release-bot merge 2.0.1", 7, false))
            .unwrap_err();
        assert_eq!(err.to_string(), "no open pull request found for issue #7");
    }

    #[test]
    fn pr_closed_on_patch_branch_resolves_full_version() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let ctx = pr_closed("release/1.4.2", "main", "Ship it", "");
        let intent = intent(classifier.classify(&ctx));
        assert_eq!(intent.verb, Verb::Publish);
        assert_eq!(intent.release_mode, ReleaseMode::MarkPublished);
        let version = intent.version.unwrap();
        assert_eq!(version.version, "1.4.2");
        assert_eq!(version.source, VersionSource::Branch);
    }

    #[test]
    fn pr_closed_into_series_branch_uses_title() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let intent = intent(classifier.classify(&pr_closed(
            "docs/release-bot-4/release/0.0",
            "release/0.0",
            "Prepare Release 0.0.1",
            "Fixes #42 and related to #17",
        )));
        assert_eq!(intent.version(), Some("0.0.1"));
        assert_eq!(intent.issue_number, Some(42));
        assert_eq!(intent.release_mode, ReleaseMode::MarkPublished);
    }

    #[test]
    fn pr_closed_series_branch_without_title_is_unresolved() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let err = classifier
            .classify(&pr_closed("release/1.4", "main", "Tidy up", ""))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::VersionUnresolved { .. }));
    }

    #[test]
    fn pr_closed_off_template_without_title_is_ignored() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let result = classifier
            .classify(&pr_closed("feature/login", "main", "Add login", "Closes #3"))
            .unwrap();
        assert!(matches!(result, Classification::Ignored(_)));
    }

    #[test]
    fn issue_closed_publishes() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let mut ctx = TriggerContext::manual("acme/widgets", DispatchInputs::default());
        ctx.kind = TriggerKind::IssueClosed;
        ctx.issue_number = Some(8);
        ctx.title = Some("✨ Prepare Release 2.2.0".into());
        let intent = intent(classifier.classify(&ctx));
        assert_eq!(intent.verb, Verb::Publish);
        assert_eq!(intent.release_mode, ReleaseMode::Published);
        assert_eq!(intent.version(), Some("2.2.0"));
    }

    #[test]
    fn manual_dispatch_defaults_to_generate() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let inputs = DispatchInputs {
            new_version_type: Some("Minor".into()),
            detect_mode: Some("published".into()),
            ..DispatchInputs::default()
        };
        let intent = intent(classifier.classify(&TriggerContext::manual("acme/widgets", inputs)));
        assert_eq!(intent.verb, Verb::Generate);
        assert_eq!(intent.release_mode, ReleaseMode::Draft);
        assert_eq!(intent.bump.as_deref(), Some("minor"));
        assert_eq!(intent.detect_mode.as_deref(), Some("published"));
    }

    #[test]
    fn manual_publish_uses_newest_draft() {
        let settings = Settings::default();
        let records = FakeRecords::default().with_draft("3.0.0-rc.1");
        let host = FakeHost::default();
        let classifier = Classifier::new(&settings, &records, &host);
        let inputs = DispatchInputs {
            command: Some("publish".into()),
            force: Some("draft".into()),
            ..DispatchInputs::default()
        };
        let intent = intent(classifier.classify(&TriggerContext::manual("acme/widgets", inputs)));
        assert_eq!(intent.version(), Some("3.0.0-rc.1"));
        assert_eq!(intent.release_mode, ReleaseMode::Draft);
        assert_eq!(intent.force.as_deref(), Some("draft"));
    }

    #[test]
    fn manual_invalid_version_input_is_rejected() {
        let settings = Settings::default();
        let (records, host) = (FakeRecords::default(), FakeHost::default());
        let classifier = Classifier::new(&settings, &records, &host);
        let inputs = DispatchInputs {
            command: Some("publish".into()),
            version: Some("next".into()),
            ..DispatchInputs::default()
        };
        let err = classifier
            .classify(&TriggerContext::manual("acme/widgets", inputs))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidVersion(_)));
    }
}
