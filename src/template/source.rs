use std::path::PathBuf;

use crate::error::{PlugforgeError, Result};

/// Placeholder substituted with the requested template version.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Where template archives are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// URL pattern containing `{version}`.
    Http { pattern: String },
    /// A single archive used for every version, or a directory of
    /// `<version>.zip` files.
    Local(PathBuf),
}

impl TemplateSource {
    /// Whether archives come over the network and are worth caching on disk.
    pub fn is_remote(&self) -> bool {
        matches!(self, TemplateSource::Http { .. })
    }

    /// Human-readable description, also used as the cache identity.
    pub fn describe(&self) -> String {
        match self {
            TemplateSource::Http { pattern } => pattern.clone(),
            TemplateSource::Local(path) => path.display().to_string(),
        }
    }
}

/// Classify a `--source` argument.
///
/// `http(s)://` inputs are URL patterns; a pattern without `{version}` gets
/// `/{version}.zip` appended. `file://` URLs are rejected in favor of plain
/// paths. Anything else is a local path.
pub fn resolve_source(input: &str) -> Result<TemplateSource> {
    if input.starts_with("file://") {
        return Err(PlugforgeError::UnsafeUrl {
            url: input.to_string(),
            reason: "file:// URLs are not supported; pass the path directly".into(),
        });
    }

    if input.starts_with("https://") || input.starts_with("http://") {
        if input.starts_with("http://") {
            tracing::warn!(url = input, "using insecure http:// template source");
        }
        let pattern = if input.contains(VERSION_PLACEHOLDER) {
            input.to_string()
        } else {
            format!("{}/{VERSION_PLACEHOLDER}.zip", input.trim_end_matches('/'))
        };
        return Ok(TemplateSource::Http { pattern });
    }

    if input.contains("://") {
        return Err(PlugforgeError::UnsafeUrl {
            url: input.to_string(),
            reason: "only https:// and http:// URLs are supported".into(),
        });
    }

    Ok(TemplateSource::Local(PathBuf::from(input)))
}

/// Reject version strings that could escape a URL path segment or directory.
pub fn validate_version(version: &str) -> Result<()> {
    let ok = !version.is_empty()
        && version != "."
        && version != ".."
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'));
    if ok {
        Ok(())
    } else {
        Err(PlugforgeError::Validation {
            field: "version".into(),
            message: format!("'{version}' is not a valid template version"),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn https_with_placeholder_is_kept() {
        let source = resolve_source("https://cdn.example.com/t/{version}/blank.zip").unwrap();
        assert_eq!(
            source,
            TemplateSource::Http {
                pattern: "https://cdn.example.com/t/{version}/blank.zip".into()
            }
        );
    }

    #[test]
    fn https_without_placeholder_gets_version_file() {
        let source = resolve_source("https://cdn.example.com/templates/").unwrap();
        assert_eq!(
            source,
            TemplateSource::Http {
                pattern: "https://cdn.example.com/templates/{version}.zip".into()
            }
        );
    }

    #[rstest]
    #[case("file:///tmp/template.zip")]
    #[case("ftp://example.com/template.zip")]
    fn rejects_unsupported_schemes(#[case] input: &str) {
        assert!(matches!(
            resolve_source(input),
            Err(PlugforgeError::UnsafeUrl { .. })
        ));
    }

    #[test]
    fn plain_paths_are_local() {
        assert_eq!(
            resolve_source("./templates").unwrap(),
            TemplateSource::Local(PathBuf::from("./templates"))
        );
    }

    #[rstest]
    #[case("3.7.9", true)]
    #[case("v3.7.9_build-12", true)]
    #[case("1.0.0+meta", true)]
    #[case("", false)]
    #[case("..", false)]
    #[case("../etc/passwd", false)]
    #[case("1.0?x=1", false)]
    fn version_validation(#[case] version: &str, #[case] ok: bool) {
        assert_eq!(validate_version(version).is_ok(), ok);
    }
}
