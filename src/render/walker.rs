use crate::error::{PlugforgeError, Result};
use crate::render::file::render_content;
use crate::render::processor::ContentProcessor;
use crate::tree::{FileTree, TemplateEntry};

/// Replacement applied to every path after token substitution.
pub struct NamePlaceholder<'a> {
    /// The literal path text to replace, e.g. `__Plugin__`.
    pub token: &'a str,
    pub name: &'a str,
}

/// Map every entry of `template` through `processor` into a new tree.
///
/// Exactly one output entry is produced per input entry; two entries
/// resolving to the same path is an error. The template tree is left
/// untouched. Timestamps and permission bits carry over.
pub fn render_tree(
    template: &FileTree,
    processor: &ContentProcessor,
    placeholder: &NamePlaceholder<'_>,
) -> Result<FileTree> {
    let mut resolved = FileTree::new();
    for entry in template {
        let path = render_path(&entry.path, processor, placeholder);
        if resolved.get(&path).is_some() {
            return Err(PlugforgeError::PathCollision {
                path,
                source_path: entry.path.clone(),
            });
        }
        resolved.insert(TemplateEntry {
            path,
            content: render_content(processor, &entry.content),
            modified: entry.modified,
            unix_mode: entry.unix_mode,
        });
    }
    resolved.set_revision(template.revision().map(String::from));
    Ok(resolved)
}

fn render_path(path: &str, processor: &ContentProcessor, placeholder: &NamePlaceholder<'_>) -> String {
    processor
        .process_path(path)
        .replace(placeholder.token, placeholder.name)
}
