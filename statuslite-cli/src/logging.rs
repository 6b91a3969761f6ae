use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "STATUSLITE_LOG";
pub const LOG_FILE: &str = "statuslite.log";

/// Filter directive: `$STATUSLITE_LOG`, then `$RUST_LOG`, then `fallback`
fn directive(fallback: &str) -> String {
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_new(directive(fallback)).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Log to stderr for one-shot commands; quiet unless asked
pub fn init_stderr() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter("warn"))
        .with(fmt_layer)
        .try_init();
}

/// Log to `statuslite.log` in `data_dir`; the terminal belongs to the TUI
pub fn init_file(data_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    let _ = tracing_subscriber::registry()
        .with(filter("info"))
        .with(fmt_layer)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_creates_log() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data");
        init_file(&nested).unwrap();
        assert!(nested.join(LOG_FILE).exists());
    }
}
