//! Logging setup for the terminal front end.
//!
//! - `LINGO_LOG` sets the filter (e.g. `debug` or `info,services=debug`).
//! - `LINGO_LOG_FORMAT=json` switches to structured JSON lines.
//!
//! Logs go to stderr so they never interleave with prompts on stdout.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LINGO_LOG";
pub const LOG_FORMAT_ENV: &str = "LINGO_LOG_FORMAT";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
