pub mod tokens;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Local};

use crate::config::{ScaffoldSettings, UserInput};
use crate::error::{PlugforgeError, Result};
use crate::identifier::{IdentifierGenerator, OsRandomGenerator};

pub use tokens::TokenSet;

/// Value used for `template_hash` when the archive carries no revision.
pub const UNKNOWN_REVISION: &str = "unknown";

/// Turns raw user input into a complete [`TokenSet`].
pub struct ConfigurationResolver {
    defaults: BTreeMap<String, String>,
    boolean_keys: Vec<String>,
    fixed: BTreeMap<String, String>,
    generator: Arc<dyn IdentifierGenerator>,
    year: Option<i32>,
}

impl ConfigurationResolver {
    pub fn new(settings: &ScaffoldSettings, generator: Arc<dyn IdentifierGenerator>) -> Self {
        Self {
            defaults: settings.defaults.clone(),
            boolean_keys: settings.boolean_keys.clone(),
            fixed: settings.fixed.clone(),
            generator,
            year: None,
        }
    }

    /// Resolver backed by the OS random source.
    pub fn with_os_random(settings: &ScaffoldSettings) -> Self {
        Self::new(settings, Arc::new(OsRandomGenerator))
    }

    /// Pin the `year` token instead of reading the local clock.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn resolve(&self, input: &UserInput) -> Result<TokenSet> {
        self.resolve_with_revision(input, None)
    }

    /// Resolve `input`, recording `revision` as the template hash.
    ///
    /// Fails with a validation error before generating anything when `name`
    /// is missing or blank.
    pub fn resolve_with_revision(
        &self,
        input: &UserInput,
        revision: Option<&str>,
    ) -> Result<TokenSet> {
        let mut tokens: BTreeMap<String, String> = input
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let name = match tokens.get("name") {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => return Err(PlugforgeError::missing_field("name")),
        };
        check_plugin_name(&name)?;

        for (key, value) in &self.defaults {
            tokens.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let company = tokens.get("company").cloned().unwrap_or_default();
        tokens
            .entry("bundle_id".into())
            .or_insert_with(|| bundle_id(&company, &name));

        let processor = self.generator.generate();
        tokens.insert("processor_uuid".into(), processor.to_native_literal());
        tokens.insert("snapshot_uuid".into(), processor.to_compact());
        for key in ["controller_uuid", "debug_processor_uuid", "debug_controller_uuid"] {
            tokens.insert(key.into(), self.generator.generate().to_native_literal());
        }

        let (start, end) = namespace_blocks(tokens.get("namespace").map(String::as_str));
        tokens.insert("namespace_start".into(), start);
        tokens.insert("namespace_end".into(), end);

        let target = if company.is_empty() {
            name.clone()
        } else {
            format!("{company}_{name}")
        };
        tokens.insert("target".into(), target);

        for key in &self.boolean_keys {
            let flag = on_off(tokens.get(key).map(String::as_str));
            tokens.insert(key.clone(), flag.to_string());
        }

        tokens.insert(
            "template_hash".into(),
            revision.unwrap_or(UNKNOWN_REVISION).to_string(),
        );
        let year = self.year.unwrap_or_else(|| Local::now().year());
        tokens.insert("year".into(), year.to_string());
        for (key, value) in &self.fixed {
            tokens.entry(key.clone()).or_insert_with(|| value.clone());
        }

        tracing::debug!(plugin = %name, tokens = tokens.len(), "configuration resolved");

        Ok(TokenSet::from_map(tokens))
    }
}

/// The name becomes the archive root directory and output file name, so it
/// must stay a single path segment.
fn check_plugin_name(name: &str) -> Result<()> {
    let problem = if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name.contains("..") {
        Some("must not contain '..'")
    } else if name.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    };
    match problem {
        Some(problem) => Err(PlugforgeError::Validation {
            field: "name".into(),
            message: format!("'{}' {problem}", name.escape_debug()),
        }),
        None => Ok(()),
    }
}

/// Opening and closing lines for a `::`-separated namespace.
///
/// `Acme::Synths` gives `namespace Acme {\nnamespace Synths {` and `}\n}`.
pub fn namespace_blocks(namespace: Option<&str>) -> (String, String) {
    let segments: Vec<&str> = namespace
        .unwrap_or_default()
        .split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let start = segments
        .iter()
        .map(|s| format!("namespace {s} {{"))
        .collect::<Vec<_>>()
        .join("\n");
    let end = vec!["}"; segments.len()].join("\n");
    (start, end)
}

/// Canonical `ON`/`OFF` for a feature flag.
///
/// Absent, empty, and exactly `false`/`no`/`off` in any case are `OFF`.
/// Surrounding whitespace is not ignored.
pub fn on_off(value: Option<&str>) -> &'static str {
    match value {
        None | Some("") => "OFF",
        Some(v)
            if v.eq_ignore_ascii_case("false")
                || v.eq_ignore_ascii_case("no")
                || v.eq_ignore_ascii_case("off") =>
        {
            "OFF"
        }
        Some(_) => "ON",
    }
}

fn bundle_id(company: &str, name: &str) -> String {
    let vendor = if company.is_empty() { "example" } else { company };
    format!("com.{vendor}.{name}")
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
