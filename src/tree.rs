use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// A single file in a template or resolved tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Forward-slash path relative to the template root.
    pub path: String,
    pub content: Vec<u8>,
    pub modified: Option<DateTime<Utc>>,
    /// Permission bits as stored in the archive's external attributes.
    pub unix_mode: Option<u32>,
}

impl TemplateEntry {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            modified: None,
            unix_mode: None,
        }
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_unix_mode(mut self, mode: u32) -> Self {
        self.unix_mode = Some(mode);
        self
    }
}

/// Ordered set of entries keyed by path.
///
/// Iteration follows insertion order, which for loaded templates is the
/// archive's own enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    entries: Vec<TemplateEntry>,
    index: HashMap<String, usize>,
    /// Commit id of the template source, when the archive records one.
    revision: Option<String>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A later entry with the same path replaces the
    /// earlier one in place and keeps its position.
    pub fn insert(&mut self, entry: TemplateEntry) {
        match self.index.get(&entry.path) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.path.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&TemplateEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TemplateEntry> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn set_revision(&mut self, revision: Option<String>) {
        self.revision = revision;
    }
}

impl FromIterator<TemplateEntry> for FileTree {
    fn from_iter<I: IntoIterator<Item = TemplateEntry>>(iter: I) -> Self {
        let mut tree = FileTree::new();
        for entry in iter {
            tree.insert(entry);
        }
        tree
    }
}

impl<'a> IntoIterator for &'a FileTree {
    type Item = &'a TemplateEntry;
    type IntoIter = std::slice::Iter<'a, TemplateEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let tree: FileTree = ["b.txt", "a.txt", "c/d.txt"]
            .into_iter()
            .map(|p| TemplateEntry::new(p, Vec::new()))
            .collect();
        assert_eq!(tree.paths().collect::<Vec<_>>(), ["b.txt", "a.txt", "c/d.txt"]);
    }

    #[test]
    fn duplicate_path_replaces_in_place() {
        let mut tree = FileTree::new();
        tree.insert(TemplateEntry::new("a", "one"));
        tree.insert(TemplateEntry::new("b", "two"));
        tree.insert(TemplateEntry::new("a", "three"));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("a").unwrap().content, b"three");
        assert_eq!(tree.paths().collect::<Vec<_>>(), ["a", "b"]);
    }
}
