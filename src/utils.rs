//! Miscellaneous helper utilities.

use std::io::{self, BufRead, Write};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level. Logs go to stderr so
/// that notices printed on stdout stay parseable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Blocking yes/no question on the terminal, run off the async runtime.
///
/// Anything other than `y`/`yes` counts as a refusal.
pub async fn confirm_prompt(question: String) -> io::Result<bool> {
    tokio::task::spawn_blocking(move || -> io::Result<bool> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{question} [y/N] ")?;
        stderr.flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(parse_confirmation(&answer))
    })
    .await
    .map_err(io::Error::other)?
}

fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Interpret common truthy spellings of an environment flag.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
