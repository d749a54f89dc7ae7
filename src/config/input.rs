use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{PlugforgeError, Result};

/// Flat string-keyed values supplied by the user for one generation.
///
/// Unknown keys are kept; templates may reference tokens this crate does
/// not know about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    values: BTreeMap<String, String>,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `other` over `self`; keys in `other` win.
    pub fn merge(&mut self, other: UserInput) {
        self.values.extend(other.values);
    }

    /// Parse `key=value` arguments. The value may itself contain `=`.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut input = UserInput::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| PlugforgeError::Validation {
                field: pair.to_string(),
                message: "expected KEY=VALUE".into(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(PlugforgeError::Validation {
                    field: pair.to_string(),
                    message: "key must not be empty".into(),
                });
            }
            input.set(key, value);
        }
        Ok(input)
    }

    /// Read a TOML file of top-level scalar values.
    ///
    /// Booleans and numbers are converted to their string form; tables and
    /// arrays are rejected.
    pub fn load_values_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PlugforgeError::Io {
            context: format!("reading values file {}", path.display()),
            source: e,
        })?;

        let table: toml::Table =
            toml::from_str(&content).map_err(|e| PlugforgeError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut input = UserInput::new();
        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Integer(n) => n.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    return Err(PlugforgeError::Validation {
                        field: key,
                        message: format!("expected a scalar value, found {}", other.type_str()),
                    })
                }
            };
            input.set(key, value);
        }
        Ok(input)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UserInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut input = UserInput::new();
        for (k, v) in iter {
            input.set(k, v);
        }
        input
    }
}
