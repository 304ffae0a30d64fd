//! Catalog entries and the flat entry list behind the path registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of filesystem entity a catalog entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn is_file(self) -> bool {
        matches!(self, EntryKind::File)
    }
}

/// One catalog record: a resolved path plus the logical names it answers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Absolute path under the registry root.
    pub path: PathBuf,

    /// File or directory.
    pub kind: EntryKind,

    /// Resolved path of the containing directory.
    pub parent: Option<PathBuf>,

    /// Optional caller-chosen label; unique by convention, not enforced.
    pub nickname: Option<String>,

    /// The slash-delimited logical path the caller originally supplied.
    /// Stable secondary key independent of where the root lives on disk.
    pub user_path: String,
}

impl CatalogEntry {
    /// Whether this entry answers to the given clue.
    ///
    /// Resolution rule shared by every registry operation: nickname match,
    /// resolved-path substring, user path, or exact resolved path. First
    /// match in catalog order wins; callers needing precision should pass a
    /// unique nickname.
    pub fn matches(&self, clue: &str) -> bool {
        self.nickname.as_deref() == Some(clue)
            || self.path.to_string_lossy().contains(clue)
            || self.user_path == clue
            || self.path.to_string_lossy() == clue
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NICK: {}\nPATH: {}\nUSPATH: {}\nDIRPATH: {}",
            self.nickname.as_deref().unwrap_or("-"),
            self.path.display(),
            self.user_path,
            self.parent
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
        )
    }
}

/// Flat, ordered entry list. Lookup scans in insertion order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry matching the clue, in catalog order.
    pub fn find(&self, clue: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.matches(clue))
    }

    pub fn find_mut(&mut self, clue: &str) -> Option<&mut CatalogEntry> {
        self.entries.iter_mut().find(|entry| entry.matches(clue))
    }

    /// Whether an entry with exactly this resolved path is cataloged.
    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    pub fn retain(&mut self, keep: impl FnMut(&CatalogEntry) -> bool) {
        self.entries.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}
