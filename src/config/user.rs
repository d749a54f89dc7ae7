use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PlugforgeError, Result};

/// User-level configuration loaded from `~/.config/plugforge/config.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Where template archives come from: a URL pattern with a `{version}`
    /// placeholder, or a local directory holding `<version>.zip` files.
    #[serde(default)]
    pub template_source: Option<String>,

    /// Settings file used when `--settings` is not given.
    #[serde(default)]
    pub settings: Option<PathBuf>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("plugforge").join("config.toml"))
}

/// Load user configuration from the XDG config directory.
///
/// Returns `Ok(None)` if the config file does not exist.
pub fn load_user_config() -> Result<Option<UserConfig>> {
    let path = match config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| PlugforgeError::Io {
        context: format!("reading user config {}", path.display()),
        source: e,
    })?;

    let config: UserConfig =
        toml::from_str(&content).map_err(|e| PlugforgeError::ConfigParse { path, source: e })?;

    Ok(Some(config))
}
