//! Diagnostic logging.
//!
//! Output goes to stderr unless a log file is given, in which case it is
//! appended there without ANSI colours. `FISHERMAN_LOG` takes an
//! `EnvFilter` directive and wins over the verbosity flags.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "FISHERMAN_LOG";

/// Filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "fisherman=info,warn",
        _ => "fisherman=debug,info",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = build_filter(verbosity);
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(verbosity, log_file = ?log_file, "Logging initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn verbosity_maps_to_directives() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "fisherman=info,warn");
        assert_eq!(default_directive(5), "fisherman=debug,info");
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing_dir = temp_dir.path().join("missing").join("fisherman.log");
        assert!(init(0, Some(&missing_dir)).is_err());
    }
}
