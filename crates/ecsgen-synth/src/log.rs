//! Activity log.
//!
//! Each pass threads one [`ActivityLog`] through every synthesis step and
//! hands it back with its result. Lines are human-readable, not a machine
//! contract; every line is mirrored as a `tracing` event so the same trace is
//! available without opening the log file.

use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Append-only text accumulator for one pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityLog {
    lines: Vec<String>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn line(&mut self, line: impl Into<String>) {
        let line = line.into();
        debug!(target: "ecsgen::activity", "{line}");
        self.lines.push(line);
    }

    /// Append a blank line followed by a `--== title ==--` banner.
    pub fn section(&mut self, title: impl fmt::Display) {
        let banner = format!("--== {title} ==--");
        info!(target: "ecsgen::activity", "{banner}");
        self.lines.push(String::new());
        self.lines.push(banner);
    }

    /// Append a `**heading**` line followed by one line per item.
    pub fn list<I, T>(&mut self, heading: &str, items: I)
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        self.line(format!("**{heading}**"));
        for item in items {
            self.line(item.to_string());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append the whole log to `path`, creating parent directories.
    pub fn append_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(self.to_string().as_bytes())
    }
}

impl fmt::Display for ActivityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
