use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{PlugforgeError, Result};
use crate::template::source::{validate_version, TemplateSource, VERSION_PLACEHOLDER};

/// Supplies the raw bytes of a template archive for a version string.
#[async_trait]
pub trait TemplateFetcher: Send + Sync {
    async fn fetch(&self, version: &str) -> Result<Vec<u8>>;

    /// Identity of the source, used to key cached downloads.
    fn describe(&self) -> String;
}

#[async_trait]
impl TemplateFetcher for Box<dyn TemplateFetcher> {
    async fn fetch(&self, version: &str) -> Result<Vec<u8>> {
        (**self).fetch(version).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Downloads archives from a URL pattern.
pub struct HttpFetcher {
    client: reqwest::Client,
    pattern: String,
}

impl HttpFetcher {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            pattern: pattern.into(),
        }
    }

    pub fn url_for(&self, version: &str) -> String {
        self.pattern.replace(VERSION_PLACEHOLDER, version)
    }
}

#[async_trait]
impl TemplateFetcher for HttpFetcher {
    async fn fetch(&self, version: &str) -> Result<Vec<u8>> {
        validate_version(version)?;
        let url = self.url_for(version);
        tracing::debug!(%url, "downloading template");

        let fetch_error = |message: String| PlugforgeError::Fetch {
            version: version.to_string(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PlugforgeError::TemplateNotFound {
                version: version.to_string(),
            });
        }
        if !status.is_success() {
            return Err(fetch_error(format!("{url} returned HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(format!("reading response body: {e}")))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.pattern.clone()
    }
}

/// Reads archives from disk.
///
/// A file path serves every version; a directory is searched for
/// `<version>.zip`.
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, version: &str) -> PathBuf {
        if self.root.is_file() {
            self.root.clone()
        } else {
            self.root.join(format!("{version}.zip"))
        }
    }
}

#[async_trait]
impl TemplateFetcher for LocalFetcher {
    async fn fetch(&self, version: &str) -> Result<Vec<u8>> {
        validate_version(version)?;
        let path = self.path_for(version);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PlugforgeError::TemplateNotFound {
                    version: version.to_string(),
                })
            }
            Err(e) => Err(PlugforgeError::Fetch {
                version: version.to_string(),
                message: format!("reading {}: {e}", path.display()),
            }),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Build the fetcher for a resolved source.
pub fn fetcher_for(source: &TemplateSource) -> Box<dyn TemplateFetcher> {
    match source {
        TemplateSource::Http { pattern } => Box::new(HttpFetcher::new(pattern.clone())),
        TemplateSource::Local(path) => Box::new(LocalFetcher::new(path.clone())),
    }
}
