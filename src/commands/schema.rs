use schemars::schema_for;

use crate::config::BotConfig;

/// Print the JSON Schema for the `[release_bot]` table to stdout.
pub fn run_schema() -> anyhow::Result<()> {
    let schema = schema_for!(BotConfig);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
