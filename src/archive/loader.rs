use std::io::{Cursor, Read};
use std::sync::Arc;

use globset::GlobSet;
use zip::ZipArchive;

use crate::archive::timestamp::from_zip_datetime;
use crate::config::ScaffoldSettings;
use crate::error::{PlugforgeError, Result};
use crate::tree::{FileTree, TemplateEntry};

type SharedArchive = ZipArchive<Cursor<Arc<[u8]>>>;

/// Upper bound on the buffer reserved up front for one entry.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Decodes template archives into a [`FileTree`].
pub struct ArchiveLoader {
    root_marker: String,
    exclude: GlobSet,
}

impl ArchiveLoader {
    pub fn new(settings: &ScaffoldSettings) -> Result<Self> {
        Ok(Self {
            root_marker: settings.root_marker.clone(),
            exclude: settings.exclude_set()?,
        })
    }

    /// Decode `bytes` into a tree of template files.
    ///
    /// Every kept entry is extracted on its own blocking task; the tree is
    /// returned only once all of them have finished, in the archive's
    /// enumeration order. The first failing entry fails the whole load.
    pub async fn load(&self, bytes: impl Into<Arc<[u8]>>) -> Result<FileTree> {
        let bytes: Arc<[u8]> = bytes.into();
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| PlugforgeError::Decode {
                context: "reading central directory".into(),
                source: e,
            })?;

        let revision = parse_revision(archive.comment());
        let planned = self.plan_entries(&mut archive)?;
        tracing::debug!(
            total = archive.len(),
            kept = planned.len(),
            revision = revision.as_deref().unwrap_or("-"),
            "decoding template archive"
        );

        let tasks = planned.into_iter().map(|(index, path)| {
            let mut archive = archive.clone();
            tokio::task::spawn_blocking(move || extract_entry(&mut archive, index, path))
        });

        let extracted = futures::future::try_join_all(tasks)
            .await
            .map_err(|e| PlugforgeError::TaskJoin {
                context: "extracting archive entries".into(),
                source: e,
            })?;

        let mut tree = extracted.into_iter().collect::<Result<FileTree>>()?;
        tree.set_revision(revision);
        Ok(tree)
    }

    /// Pick the entries that belong in the tree, paired with their
    /// template-relative paths.
    fn plan_entries(&self, archive: &mut SharedArchive) -> Result<Vec<(usize, String)>> {
        let mut planned = Vec::new();
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|e| PlugforgeError::Decode {
                    context: format!("reading entry #{index}"),
                    source: e,
                })?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().replace('\\', "/");
            let Some(relative) = strip_root_marker(&name, &self.root_marker) else {
                tracing::trace!(entry = %name, "outside template root, skipped");
                continue;
            };
            if self.exclude.is_match(relative) {
                tracing::trace!(entry = %name, "excluded");
                continue;
            }
            planned.push((index, relative.to_string()));
        }
        Ok(planned)
    }
}

fn extract_entry(archive: &mut SharedArchive, index: usize, path: String) -> Result<TemplateEntry> {
    let mut file = archive
        .by_index(index)
        .map_err(|e| PlugforgeError::DecodeEntry {
            path: path.clone(),
            message: e.to_string(),
        })?;

    let mut content = Vec::with_capacity(initial_capacity(file.size()));
    file.read_to_end(&mut content)
        .map_err(|e| PlugforgeError::DecodeEntry {
            path: path.clone(),
            message: e.to_string(),
        })?;

    Ok(TemplateEntry {
        modified: file.last_modified().and_then(from_zip_datetime),
        unix_mode: file.unix_mode(),
        path,
        content,
    })
}

/// Buffer to reserve for an entry whose header declares `declared` bytes.
///
/// The header is not trusted; `read_to_end` grows the buffer past the cap.
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_PREALLOCATION, |n| n.min(MAX_PREALLOCATION))
}

/// Drop everything up to and including the `marker` segment.
///
/// Returns `None` when the marker does not occur or nothing follows it.
pub(crate) fn strip_root_marker<'a>(name: &'a str, marker: &str) -> Option<&'a str> {
    let mut offset = 0;
    for segment in name.split('/') {
        offset += segment.len() + 1;
        if segment == marker {
            let rest = name.get(offset..)?;
            return (!rest.is_empty()).then_some(rest);
        }
    }
    None
}

/// Source-hosting archives record the commit id in the ZIP comment.
fn parse_revision(comment: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(comment).ok()?.trim();
    let is_commit = (7..=64).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_hexdigit());
    is_commit.then(|| text.to_ascii_lowercase())
}
