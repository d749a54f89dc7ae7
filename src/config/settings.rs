use std::collections::BTreeMap;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{PlugforgeError, Result};

/// How a template archive is read and which tokens it is resolved with.
///
/// Every field has a default matching the stock blank-plugin template, so an
/// empty `plugforge.toml` is valid.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScaffoldSettings {
    /// Path segment that marks the template root inside the archive.
    #[serde(default = "default_root_marker")]
    pub root_marker: String,

    /// Globs (relative to the template root) of entries that never reach the output.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Values applied only for keys the user did not supply.
    #[serde(default = "default_values")]
    pub defaults: BTreeMap<String, String>,

    /// Keys canonicalized to `ON`/`OFF`.
    #[serde(default = "default_boolean_keys")]
    pub boolean_keys: Vec<String>,

    /// Path-relation tokens used by generated build files.
    #[serde(default = "default_fixed")]
    pub fixed: BTreeMap<String, String>,

    /// Path segment replaced by the plugin name, written as `__<placeholder>__`.
    #[serde(default = "default_name_placeholder")]
    pub name_placeholder: String,

    /// Appended to the plugin name to form the output root directory.
    #[serde(default = "default_archive_suffix")]
    pub archive_suffix: String,
}

fn default_root_marker() -> String {
    "blank-plugin".to_string()
}

fn default_exclude() -> Vec<String> {
    [
        "__MACOSX/**",
        ".git/**",
        ".svn/**",
        ".idea/**",
        ".vs/**",
        ".vscode/**",
        "**/.DS_Store",
        "**/._*",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_values() -> BTreeMap<String, String> {
    [
        ("company", ""),
        ("namespace", ""),
        ("url", ""),
        ("email", ""),
        ("version", "1.0.0"),
        ("category", "Fx"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_boolean_keys() -> Vec<String> {
    vec!["enable_audio_unit".to_string(), "download_sdk".to_string()]
}

fn default_fixed() -> BTreeMap<String, String> {
    [("sdk_folder", "../sdk"), ("cmake_minimum_version", "3.19")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_name_placeholder() -> String {
    "Plugin".to_string()
}

fn default_archive_suffix() -> String {
    "-src".to_string()
}

impl Default for ScaffoldSettings {
    fn default() -> Self {
        Self {
            root_marker: default_root_marker(),
            exclude: default_exclude(),
            defaults: default_values(),
            boolean_keys: default_boolean_keys(),
            fixed: default_fixed(),
            name_placeholder: default_name_placeholder(),
            archive_suffix: default_archive_suffix(),
        }
    }
}

impl ScaffoldSettings {
    pub fn validate(&self) -> Result<()> {
        if self.root_marker.is_empty() || self.root_marker.contains('/') {
            return Err(PlugforgeError::ConfigInvalid {
                reason: format!(
                    "root_marker must be a single non-empty path segment, got '{}'",
                    self.root_marker
                ),
            });
        }

        if self.name_placeholder.is_empty() {
            return Err(PlugforgeError::ConfigInvalid {
                reason: "name_placeholder must not be empty".into(),
            });
        }

        for key in &self.boolean_keys {
            if self.fixed.contains_key(key) {
                return Err(PlugforgeError::ConfigInvalid {
                    reason: format!("'{key}' cannot be both a boolean key and a fixed token"),
                });
            }
        }

        self.exclude_set().map(|_| ())
    }

    /// Compile the exclude globs into a single matcher.
    pub fn exclude_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| PlugforgeError::GlobPattern {
                pattern: pattern.clone(),
                source: e,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| PlugforgeError::GlobPattern {
            pattern: "<combined>".into(),
            source: e,
        })
    }

    /// The path token carrying the plugin name, e.g. `__Plugin__`.
    pub fn name_placeholder_token(&self) -> String {
        format!("__{}__", self.name_placeholder)
    }
}

/// Load and validate settings from a `plugforge.toml` file.
pub fn load_settings(path: &Path) -> Result<ScaffoldSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| PlugforgeError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;

    let settings: ScaffoldSettings =
        toml::from_str(&content).map_err(|e| PlugforgeError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    settings.validate()?;

    Ok(settings)
}
