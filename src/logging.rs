//! Tracing setup.
//!
//! Console output goes to stderr. When a log directory is given, the same
//! events are appended (without ANSI colors) to `fit_pipeline.log` there.
//! `RUST_LOG` overrides the default level.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const LOG_FILE: &str = "fit_pipeline.log";

static PANIC_HOOK: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
///
/// A log file that cannot be opened is reported on the console and skipped.
pub fn init(log_dir: Option<&Path>, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let mut file_error = None;
    let file_layer = log_dir.and_then(|dir| {
        let path = dir.join(LOG_FILE);
        let opened = std::fs::create_dir_all(dir)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
        match opened {
            Ok(file) => Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(e) => {
                file_error = Some(format!("Cannot open log file '{}': {e}", path.display()));
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();

    if let Some(message) = file_error {
        tracing::warn!("{message}");
    }

    install_panic_hook();
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let backtrace = std::backtrace::Backtrace::force_capture();
            tracing::error!("Unexpected panic: {info}\n{backtrace}");
            previous(info);
        }));
    });
}
