use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::archive::ArchiveLoader;
use crate::error::Result;
use crate::template::fetch::TemplateFetcher;
use crate::tree::FileTree;

/// Loaded template trees, one per version, kept for the session.
///
/// Trees are read-only once loaded and handed out as `Arc`s, so any number
/// of generation requests can share one without coordination.
pub struct TemplateStore {
    fetcher: Box<dyn TemplateFetcher>,
    loader: ArchiveLoader,
    loaded: RwLock<HashMap<String, Arc<FileTree>>>,
}

impl TemplateStore {
    pub fn new(fetcher: Box<dyn TemplateFetcher>, loader: ArchiveLoader) -> Self {
        Self {
            fetcher,
            loader,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Return the tree for `version`, fetching and decoding it on first use.
    ///
    /// Two callers racing on the same uncached version may both load it;
    /// either result is equivalent.
    pub async fn get(&self, version: &str) -> Result<Arc<FileTree>> {
        if let Some(tree) = self.loaded.read().await.get(version) {
            return Ok(Arc::clone(tree));
        }

        let bytes = self.fetcher.fetch(version).await?;
        let tree = Arc::new(self.loader.load(bytes).await?);
        tracing::debug!(version, files = tree.len(), "template loaded");

        self.loaded
            .write()
            .await
            .insert(version.to_string(), Arc::clone(&tree));
        Ok(tree)
    }

    pub async fn is_loaded(&self, version: &str) -> bool {
        self.loaded.read().await.contains_key(version)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;
    use crate::config::ScaffoldSettings;
    use crate::error::PlugforgeError;

    struct InMemoryFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TemplateFetcher for InMemoryFetcher {
        async fn fetch(&self, version: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if version == "missing" {
                return Err(PlugforgeError::TemplateNotFound {
                    version: version.to_string(),
                });
            }
            let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
            zip.start_file("blank-plugin/VERSION", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(version.as_bytes()).unwrap();
            Ok(zip.finish().unwrap().into_inner())
        }

        fn describe(&self) -> String {
            "memory".into()
        }
    }

    fn store(calls: &Arc<AtomicUsize>) -> TemplateStore {
        TemplateStore::new(
            Box::new(InMemoryFetcher {
                calls: Arc::clone(calls),
            }),
            ArchiveLoader::new(&ScaffoldSettings::default()).unwrap(),
        )
    }

    #[tokio::test]
    async fn loads_each_version_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = store(&calls);

        let first = store.get("1.0").await.unwrap();
        let again = store.get("1.0").await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.get("VERSION").unwrap().content, b"1.0");

        let other = store.get("2.0").await.unwrap();
        assert_eq!(other.get("VERSION").unwrap().content, b"2.0");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = store(&calls);

        assert!(store.get("missing").await.is_err());
        assert!(!store.is_loaded("missing").await);
        assert!(store.get("missing").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
