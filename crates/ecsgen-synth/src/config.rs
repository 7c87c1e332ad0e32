//! Post-process configuration (`ecsgen.json`).
//!
//! Every field is optional; an empty object yields the defaults.
//!
//! ```json
//! {
//!   "ignoredAssemblies": ["CodeGen", "Ecs.Authoring", "Unity", "UniRx"],
//!   "logPath": "Logs/PostProcess.log",
//!   "resolveAdditional": true,
//!   "injectInspectorEditors": false,
//!   "contracts": { "genericDrawer": { "assembly": "My.Editor", "fullName": "My.Editor.Drawer`1" } }
//! }
//! ```

use crate::contracts::HostContracts;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional file name looked up next to the processed project.
pub const CONFIG_FILE_NAME: &str = "ecsgen.json";

/// Default relative path of the activity log.
pub const DEFAULT_LOG_PATH: &str = "Logs/PostProcess.log";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostProcessConfig {
    /// Assembly-name fragments that disable processing, matched
    /// case-insensitively as substrings.
    pub ignored_assemblies: Vec<String>,
    /// Where the activity log is appended; `null` disables the file.
    pub log_path: Option<PathBuf>,
    /// Resolve references not among the pass's reference paths from
    /// assemblies already loaded by earlier passes.
    pub resolve_additional: bool,
    /// Also synthesize inspector editors for authoring components.
    pub inject_inspector_editors: bool,
    pub contracts: HostContracts,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            ignored_assemblies: ["CodeGen", "Ecs.Authoring", "Unity", "UniRx"]
                .map(String::from)
                .to_vec(),
            log_path: Some(PathBuf::from(DEFAULT_LOG_PATH)),
            resolve_additional: true,
            inject_inspector_editors: false,
            contracts: HostContracts::default(),
        }
    }
}

pub fn parse_config(source: &str) -> Result<PostProcessConfig> {
    let config = serde_json::from_str(source).context("failed to parse ecsgen config JSON")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<PostProcessConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ecsgen config: {}", path.display()))?;
    parse_config(&source)
        .with_context(|| format!("failed to parse ecsgen config: {}", path.display()))
}

/// Load `ecsgen.json` from `dir` when present, defaults otherwise.
pub fn discover_config(dir: &Path) -> Result<PostProcessConfig> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        load_config(&candidate)
    } else {
        Ok(PostProcessConfig::default())
    }
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
