#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PlugforgeError {
    #[error("Invalid value for '{field}': {message}")]
    #[diagnostic(help("Pass the value with -d {field}=<value>"))]
    Validation { field: String, message: String },

    #[error("Failed to fetch template version '{version}': {message}")]
    #[diagnostic(help("Check your network connection and retry"))]
    Fetch { version: String, message: String },

    #[error("No template archive found for version '{version}'")]
    #[diagnostic(help("Check the version string and the configured template source"))]
    TemplateNotFound { version: String },

    #[error("No template source configured")]
    #[diagnostic(help(
        "Pass --source <url-or-path> or set template_source in ~/.config/plugforge/config.toml"
    ))]
    NoTemplateSource,

    #[error("Unsafe URL scheme in '{url}': {reason}")]
    #[diagnostic(help("Use https:// URLs for remote templates"))]
    UnsafeUrl { url: String, reason: String },

    #[error("Template archive could not be read: {context}")]
    #[diagnostic(help("The template package must be a valid ZIP archive"))]
    Decode {
        context: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to extract archive entry '{path}': {message}")]
    DecodeEntry { path: String, message: String },

    #[error("'{source_path}' resolves to '{path}', which another template file already produced")]
    #[diagnostic(help("Rename one of the template files or change the values they depend on"))]
    PathCollision { path: String, source_path: String },

    #[error("Failed to write output archive: {context}")]
    Encode {
        context: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Output file already exists: {path}")]
    #[diagnostic(help("Use --overwrite to replace it"))]
    OutputExists { path: PathBuf },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}")]
    #[diagnostic(help("Check the TOML syntax in this file"))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid settings: {reason}")]
    ConfigInvalid { reason: String },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Background task failed: {context}")]
    TaskJoin {
        context: String,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("Prompt cancelled by user")]
    PromptCancelled,

    #[error("Cache metadata error: {context}")]
    #[diagnostic(help("Try clearing the cache with `plugforge clear-cache`"))]
    CacheMetadata { context: String },
}

impl PlugforgeError {
    pub fn missing_field(field: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: "a non-empty value is required".into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlugforgeError>;
