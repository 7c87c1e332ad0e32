//! Tracing setup for the `ecsgen` binary.
//!
//! Post-process passes mirror their activity log to the `ecsgen::activity`
//! target: section banners at `info`, individual lines at `debug`. The `-v`
//! flag surfaces that log on stderr without any filter syntax:
//!
//! | flag    | shown                                        |
//! |---------|----------------------------------------------|
//! | (none)  | nothing                                      |
//! | `-v`    | activity banners, warnings                   |
//! | `-vv`   | the full activity log, warnings              |
//! | `-vvv`  | everything at `debug`                        |
//! | `-vvvv` | everything at `trace` (assignability checks) |
//!
//! `ECSGEN_LOG` (then `RUST_LOG`) replaces the `-v` filter with an explicit
//! directive. `--log-format` picks the output shape and wins over
//! `ECSGEN_LOG_FORMAT`.
//!
//! ```bash
//! ecsgen -vv process Game.dll -r Unity.Entities.dll
//! ECSGEN_LOG="ecsgen_model=trace" ecsgen --log-format tree inspect Game.dll
//! ```

use clap::ValueEnum;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

pub const LOG_VAR: &str = "ECSGEN_LOG";
pub const LOG_FORMAT_VAR: &str = "ECSGEN_LOG_FORMAT";
const FALLBACK_LOG_VAR: &str = "RUST_LOG";

/// Tracing output format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Flat lines; activity lines print without their target.
    #[default]
    Text,
    /// Indented by pass span via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a format name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }
}

/// Filter directive for a `-v` count; `None` when logging stays off.
pub fn verbosity_directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("warn,ecsgen::activity=info"),
        2 => Some("warn,ecsgen::activity=debug"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Resolved subscriber settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub directive: String,
    pub format: LogFormat,
    /// Print event targets. Off when only the activity log was asked for, so
    /// its lines read like the log file.
    pub show_targets: bool,
}

impl LogSettings {
    /// Combine the command-line flags with the environment looked up through
    /// `env`. Returns `None` when nothing asks for output.
    ///
    /// Filter precedence: `ECSGEN_LOG`, `RUST_LOG`, then `-v`. Format
    /// precedence: `--log-format`, `ECSGEN_LOG_FORMAT`, then text; an
    /// unrecognized `ECSGEN_LOG_FORMAT` is ignored.
    pub fn resolve(
        verbosity: u8,
        format: Option<LogFormat>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        let explicit = env(LOG_VAR).or_else(|| env(FALLBACK_LOG_VAR));
        let show_targets = explicit.is_some() || verbosity >= 3;
        let directive = explicit.or_else(|| verbosity_directive(verbosity).map(str::to_string))?;
        let format = format
            .or_else(|| env(LOG_FORMAT_VAR).as_deref().and_then(LogFormat::parse))
            .unwrap_or_default();
        Some(Self {
            directive,
            format,
            show_targets,
        })
    }

    pub fn filter(&self) -> EnvFilter {
        EnvFilter::builder().parse_lossy(&self.directive)
    }
}

/// Install the global subscriber for the given flags. Does nothing when
/// neither a flag nor an environment variable asks for output. Everything
/// goes to stderr so command output on stdout stays clean.
pub fn init_tracing(verbosity: u8, format: Option<LogFormat>) {
    let Some(settings) = LogSettings::resolve(verbosity, format, |key| std::env::var(key).ok())
    else {
        return;
    };

    let filter = settings.filter();
    match settings.format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(settings.show_targets);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(settings.show_targets)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tests;
