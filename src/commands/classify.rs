use clap::Args;

use crate::classify::records::ToolRecords;
use crate::classify::{Classification, Classifier};
use crate::commands::EventArgs;
use crate::error::ExitError;
use crate::github::GitHubClient;

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub event: EventArgs,
}

impl ClassifyArgs {
    /// Print the intent for an event as JSON without dispatching anything.
    pub fn execute(&self) -> anyhow::Result<()> {
        let Some((settings, ctx)) = self.event.prepare()? else {
            return print_ignored("event not handled");
        };
        let host = GitHubClient::new(&settings.bot.api_url, &ctx.repository, self.event.token());
        let records = ToolRecords::new(&host, &settings.bot.drafts_dir)
            .with_database(&settings.bot.database_path);
        let classifier = Classifier::new(&settings, &records, &host);

        match classifier.classify(&ctx).map_err(ExitError::from)? {
            Classification::Intent(intent) => {
                println!("{}", serde_json::to_string_pretty(&intent)?);
                Ok(())
            }
            Classification::Ignored(reason) => print_ignored(&reason),
        }
    }
}

fn print_ignored(reason: &str) -> anyhow::Result<()> {
    let json = serde_json::json!({ "ignored": reason });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
