//! # Package Name Resolution
//!
//! Determines the name under which a component's own files are exposed in the
//! URL namespace. Precedence:
//!
//! 1. an explicit, non-empty name
//! 2. the `name` field of `bower.json` under the package root
//! 3. the base name of the current working directory
//!
//! Resolution is total: unreadable or malformed config files are logged and
//! skipped, never reported as errors.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Component config file consulted for the package name.
pub const COMPONENT_CONFIG_FILE: &str = "bower.json";

#[derive(Debug, Deserialize)]
struct ComponentConfig {
    #[serde(default)]
    name: Option<String>,
}

/// Read the `name` field from the component config under `root`.
///
/// Without a root the config is looked up relative to the working directory.
pub fn config_name(root: Option<&Path>) -> Option<String> {
    let path = match root {
        Some(root) => root.join(COMPONENT_CONFIG_FILE),
        None => Path::new(COMPONENT_CONFIG_FILE).to_path_buf(),
    };
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Component config not readable");
            return None;
        }
    };
    match serde_json::from_str::<ComponentConfig>(&source) {
        Ok(config) => config.name.filter(|name| !name.is_empty()),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Component config not parseable");
            None
        }
    }
}

/// Resolve the package name against the process working directory.
pub fn resolve_name(explicit: Option<&str>, root: Option<&Path>) -> String {
    let cwd = std::env::current_dir().ok();
    resolve_name_in(explicit, root, cwd.as_deref())
}

/// Resolve the package name with an explicit working directory.
///
/// An unknown working directory contributes an empty name.
pub fn resolve_name_in(explicit: Option<&str>, root: Option<&Path>, cwd: Option<&Path>) -> String {
    if let Some(name) = explicit.filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    if let Some(name) = config_name(root) {
        return name;
    }
    cwd.and_then(|dir| dir.file_name())
        .map(|base| base.to_string_lossy().into_owned())
        .unwrap_or_default()
}
