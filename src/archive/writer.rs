use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::timestamp::{to_zip_datetime, ArchiveClock};
use crate::error::{PlugforgeError, Result};
use crate::tree::FileTree;

/// A finished output archive, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Serializes a resolved [`FileTree`] into a ZIP archive.
///
/// The underlying writer always records a Unix "made by" host, so stored
/// permission bits survive extraction on any platform.
pub struct ArchiveWriter {
    clock: ArchiveClock,
    compression: CompressionMethod,
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new(ArchiveClock::system())
    }
}

impl ArchiveWriter {
    pub fn new(clock: ArchiveClock) -> Self {
        Self {
            clock,
            compression: CompressionMethod::Deflated,
        }
    }

    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Write every entry under `{root_name}/` and return `{root_name}.zip`.
    pub fn write(&self, root_name: &str, tree: &FileTree) -> Result<Artifact> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in tree {
            let mut options = SimpleFileOptions::default()
                .compression_method(self.compression)
                .last_modified_time(to_zip_datetime(self.clock.stamp(entry.modified)));
            if let Some(mode) = entry.unix_mode {
                options = options.unix_permissions(mode);
            }

            let name = format!("{root_name}/{}", entry.path);
            zip.start_file(name.as_str(), options)
                .map_err(|e| PlugforgeError::Encode {
                    context: format!("starting entry {name}"),
                    source: e,
                })?;
            zip.write_all(&entry.content)
                .map_err(|e| PlugforgeError::Encode {
                    context: format!("writing entry {name}"),
                    source: e.into(),
                })?;
        }

        let bytes = zip
            .finish()
            .map_err(|e| PlugforgeError::Encode {
                context: "finalizing archive".into(),
                source: e,
            })?
            .into_inner();

        tracing::debug!(root = root_name, entries = tree.len(), size = bytes.len(), "archive written");

        Ok(Artifact {
            file_name: format!("{root_name}.zip"),
            bytes,
        })
    }
}
