use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{PlugforgeError, Result};
use crate::template::fetch::{fetcher_for, TemplateFetcher};
use crate::template::source::TemplateSource;

/// Metadata stored alongside a cached template archive.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// The source the archive was fetched from.
    pub source: String,
    pub version: String,
    /// When the archive was cached.
    pub cached_at: DateTime<Utc>,
}

/// A cached archive returned by `list_cached()`.
#[derive(Debug)]
pub struct CachedTemplate {
    pub key: String,
    pub path: PathBuf,
    pub metadata: CacheMetadata,
}

const CACHE_METADATA_FILE: &str = ".plugforge-cache.toml";
const CACHE_ARCHIVE_FILE: &str = "template.zip";

/// Get the cache directory for template archives.
///
/// Checks `PLUGFORGE_CACHE_DIR` first, then falls back to
/// `~/.cache/plugforge/templates/`.
pub fn get_cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PLUGFORGE_CACHE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::cache_dir()
        .map(|d| d.join("plugforge").join("templates"))
        .ok_or_else(|| PlugforgeError::Io {
            context: "unable to determine cache directory: set PLUGFORGE_CACHE_DIR or ensure a home directory exists".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no cache directory available"),
        })
}

/// Deterministic, path-safe cache key for a source and version.
pub(crate) fn cache_key(source: &str, version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.trim_end_matches('/').as_bytes());
    hasher.update(b"\0");
    hasher.update(version.as_bytes());
    let digest = hasher.finalize();
    let hash: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();

    let sanitized = version.replace(['/', '\\'], "_").replace("..", "_");
    format!("{sanitized}-{hash}")
}

/// Wraps a fetcher with an on-disk cache of downloaded archives.
///
/// Concurrent processes fetching the same version may both download it;
/// the last one to finish wins.
pub struct CachingFetcher<F> {
    inner: F,
    cache_dir: PathBuf,
}

impl<F: TemplateFetcher> CachingFetcher<F> {
    pub fn new(inner: F, cache_dir: PathBuf) -> Self {
        Self { inner, cache_dir }
    }

    fn entry_dir(&self, version: &str) -> PathBuf {
        self.cache_dir
            .join(cache_key(&self.inner.describe(), version))
    }

    async fn store(&self, dir: &Path, version: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PlugforgeError::Io {
                context: format!("creating cache entry {}", dir.display()),
                source: e,
            })?;

        let metadata = CacheMetadata {
            source: self.inner.describe(),
            version: version.to_string(),
            cached_at: Utc::now(),
        };
        let metadata_toml =
            toml::to_string_pretty(&metadata).map_err(|e| PlugforgeError::CacheMetadata {
                context: format!("serializing cache metadata: {e}"),
            })?;

        // Archive first, metadata last: an entry only counts once both exist.
        tokio::fs::write(dir.join(CACHE_ARCHIVE_FILE), bytes)
            .await
            .map_err(|e| PlugforgeError::Io {
                context: "writing cached archive".into(),
                source: e,
            })?;
        tokio::fs::write(dir.join(CACHE_METADATA_FILE), metadata_toml)
            .await
            .map_err(|e| PlugforgeError::Io {
                context: "writing cache metadata".into(),
                source: e,
            })
    }
}

#[async_trait]
impl<F: TemplateFetcher> TemplateFetcher for CachingFetcher<F> {
    async fn fetch(&self, version: &str) -> Result<Vec<u8>> {
        let dir = self.entry_dir(version);
        if dir.join(CACHE_METADATA_FILE).exists() {
            if let Ok(bytes) = tokio::fs::read(dir.join(CACHE_ARCHIVE_FILE)).await {
                tracing::debug!(version, cache = %dir.display(), "template cache hit");
                return Ok(bytes);
            }
        }

        let bytes = self.inner.fetch(version).await?;
        self.store(&dir, version, &bytes).await?;
        Ok(bytes)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

/// Build the fetcher for `source`, caching downloads under `cache_dir`.
///
/// Local sources are always read from disk so edits to a local archive are
/// picked up on the next run.
pub fn cached_fetcher_for(source: &TemplateSource, cache_dir: PathBuf) -> Box<dyn TemplateFetcher> {
    if source.is_remote() {
        Box::new(CachingFetcher::new(fetcher_for(source), cache_dir))
    } else {
        fetcher_for(source)
    }
}

/// List all cached template archives.
pub fn list_cached(cache_dir: &Path) -> Result<Vec<CachedTemplate>> {
    if !cache_dir.exists() {
        return Ok(Vec::new());
    }

    let read_dir = std::fs::read_dir(cache_dir).map_err(|e| PlugforgeError::Io {
        context: format!("reading cache directory {}", cache_dir.display()),
        source: e,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| PlugforgeError::Io {
            context: "reading cache directory entry".into(),
            source: e,
        })?;

        let path = entry.path();
        let metadata_path = path.join(CACHE_METADATA_FILE);
        if !path.is_dir() || !metadata_path.exists() {
            continue;
        }

        let metadata_str =
            std::fs::read_to_string(&metadata_path).map_err(|e| PlugforgeError::Io {
                context: format!("reading cache metadata {}", metadata_path.display()),
                source: e,
            })?;
        let metadata: CacheMetadata =
            toml::from_str(&metadata_str).map_err(|e| PlugforgeError::CacheMetadata {
                context: format!("parsing cache metadata: {e}"),
            })?;

        entries.push(CachedTemplate {
            key: entry.file_name().to_string_lossy().into_owned(),
            path,
            metadata,
        });
    }

    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(entries)
}

/// Clear cached archives.
///
/// With `version`, only entries for that version are removed; otherwise the
/// whole cache directory goes.
pub fn clear_cache(cache_dir: &Path, version: Option<&str>) -> Result<usize> {
    if !cache_dir.exists() {
        return Ok(0);
    }

    let Some(version) = version else {
        let count = list_cached(cache_dir)?.len();
        std::fs::remove_dir_all(cache_dir).map_err(|e| PlugforgeError::Io {
            context: format!("removing cache directory {}", cache_dir.display()),
            source: e,
        })?;
        return Ok(count);
    };

    let mut removed = 0;
    for entry in list_cached(cache_dir)? {
        if entry.metadata.version == version {
            std::fs::remove_dir_all(&entry.path).map_err(|e| PlugforgeError::Io {
                context: format!("removing cached template {}", entry.path.display()),
                source: e,
            })?;
            removed += 1;
        }
    }
    Ok(removed)
}
