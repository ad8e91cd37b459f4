// src/log.rs
//! Logging front door.
//!
//! Call sites use the short `logf!` / `logd!` / `logw!` / `loge!` macros; they
//! expand to `tracing` events so any subscriber can pick them up. The CLI
//! installs one via [`init`]: stderr (filtered) plus an optional plain-text
//! debug file under the store directory.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[doc(hidden)]
pub use tracing;

/// Stderr verbosity when `RUST_LOG` is not set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    pub fn from_count(quiet: bool, verbose: u8) -> Self {
        if quiet { return Verbosity::Quiet; }
        match verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet   => "error",
            Verbosity::Normal  => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Trace   => "trace",
        }
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(verbosity: Verbosity, log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    // The file always gets debug detail, independent of the stderr filter.
    let file_layer = log_file.and_then(|p| match open_log_file(p) {
        Ok(file) => Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug")),
        ),
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", p.display());
            None
        }
    });

    let _ = tracing_subscriber::registry()
        .with(stderr_layer.with_filter(filter))
        .with(file_layer)
        .try_init();
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        $crate::log::tracing::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        $crate::log::tracing::debug!($($arg)*)
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        $crate::log::tracing::warn!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        $crate::log::tracing::error!($($arg)*)
    };
}
