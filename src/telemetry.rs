//! Tracing subscriber setup. Logs go to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `RELEASE_BOT_LOG=release_bot=debug`.
pub const LOG_ENV: &str = "RELEASE_BOT_LOG";
/// `json` switches to one JSON object per event.
pub const FORMAT_ENV: &str = "RELEASE_BOT_LOG_FORMAT";

pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = std::env::var(FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("warning: logging already initialised: {e}");
    }
}
