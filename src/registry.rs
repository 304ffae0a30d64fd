//! Path registry: a catalog of logical paths over a real filesystem.
//!
//! The registry decouples stable logical names (nicknames, user paths) from
//! physical layout, so callers can reference "the save-slot file" without
//! knowing where the root directory lives on a given platform. All later
//! operations address entries by a clue resolved through the catalog.

use crate::catalog::{Catalog, CatalogEntry, EntryKind};
use crate::error::RegistryError;
use crate::path;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Registry state: root directory plus the entry catalog.
///
/// Owned value instead of process-wide singleton state; "not initialized"
/// and "already initialized" are ordinary state checks, and tests can hold
/// multiple independent registries.
#[derive(Debug, Default)]
pub struct PathRegistry {
    catalog: Catalog,
    root: Option<PathBuf>,
    auto_register: bool,
    reset_on_repair: bool,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root directory and addressing mode. First call wins; every
    /// later call fails regardless of arguments.
    ///
    /// With `auto_register` on, every intermediate directory segment of an
    /// added path is cataloged too (without nickname). Directories added that
    /// way cannot carry nicknames; add them explicitly first if they should.
    pub fn initialize(
        &mut self,
        root: impl AsRef<Path>,
        auto_register: bool,
    ) -> Result<(), RegistryError> {
        if self.root.is_some() {
            return Err(RegistryError::AlreadyInitialized);
        }
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let root = path::canonicalize(root)?;
        debug!(root = %root.display(), auto_register, "registry initialized");
        self.root = Some(root);
        self.auto_register = auto_register;
        Ok(())
    }

    /// Whether the registry has been initialized.
    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    /// The configured root directory, once initialized.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn require_root(&self) -> Result<&Path, RegistryError> {
        self.root.as_deref().ok_or(RegistryError::NotInitialized)
    }

    /// Resolve a clue to a catalog entry: nickname, resolved-path substring,
    /// user path, or exact resolved path, first match in catalog order.
    pub fn lookup(&self, clue: &str) -> Option<&CatalogEntry> {
        self.catalog.find(clue)
    }

    /// Catalog (and if needed create) the directory or file at the given
    /// slash-delimited logical path.
    ///
    /// * Not on disk, not cataloged: create and catalog.
    /// * On disk, not cataloged: catalog without recreating, unless `force`
    ///   deletes and recreates.
    /// * Cataloged: `ElementAlreadyExists` unless `force`, which deletes the
    ///   existing entity (recursively for directories) and recreates it.
    ///
    /// On a filesystem failure the catalog is left unmodified for the failed
    /// entry.
    pub fn add(
        &mut self,
        logical_path: &str,
        force: bool,
        kind: EntryKind,
        nickname: Option<&str>,
    ) -> Result<(), RegistryError> {
        let root = self.require_root()?.to_path_buf();
        let segments = path::split_logical(logical_path);
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(RegistryError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty logical path",
            )));
        };

        if self.auto_register {
            self.register_intermediates(&root, parents);
        }

        let parent_dir = path::resolve_under(&root, parents);
        let target = parent_dir.join(leaf);
        debug!(path = %target.display(), ?kind, force, "adding catalog entry");

        let entry = CatalogEntry {
            path: target.clone(),
            kind,
            parent: Some(parent_dir.clone()),
            nickname: nickname.map(str::to_string),
            user_path: segments.join("/"),
        };

        match kind {
            EntryKind::Directory => self.add_directory(entry, force),
            EntryKind::File => self.add_file(entry, &parent_dir, parents, force),
        }
    }

    fn add_directory(&mut self, entry: CatalogEntry, force: bool) -> Result<(), RegistryError> {
        let cataloged = self.catalog.contains_path(&entry.path);
        let on_disk = entry.path.is_dir();

        match (cataloged, on_disk) {
            (true, true) if force => {
                self.delete_subtree(&entry.path)?;
                fs::create_dir_all(&entry.path)?;
                self.catalog.push(entry);
                Ok(())
            }
            (true, true) => Err(RegistryError::ElementAlreadyExists(entry.user_path)),
            // Cataloged but missing on disk: recreate without duplicating.
            (true, false) => {
                fs::create_dir_all(&entry.path)?;
                Ok(())
            }
            (false, true) if force => {
                fs::remove_dir_all(&entry.path)?;
                fs::create_dir_all(&entry.path)?;
                self.catalog.push(entry);
                Ok(())
            }
            // Adopt an existing directory into the catalog.
            (false, true) => {
                self.catalog.push(entry);
                Ok(())
            }
            (false, false) => {
                fs::create_dir_all(&entry.path)?;
                self.catalog.push(entry);
                Ok(())
            }
        }
    }

    fn add_file(
        &mut self,
        entry: CatalogEntry,
        parent_dir: &Path,
        parent_segments: &[String],
        force: bool,
    ) -> Result<(), RegistryError> {
        let root = self.require_root()?.to_path_buf();

        // Materialize the parent directory first, cataloging it when it was
        // neither cataloged nor on disk (mirrors the directory branch).
        if !parent_dir.is_dir() {
            fs::create_dir_all(parent_dir)?;
            if parent_dir != root && !self.catalog.contains_path(parent_dir) {
                self.catalog.push(CatalogEntry {
                    path: parent_dir.to_path_buf(),
                    kind: EntryKind::Directory,
                    parent: parent_dir.parent().map(Path::to_path_buf),
                    nickname: None,
                    user_path: parent_segments.join("/"),
                });
            }
        }

        let cataloged = self.catalog.contains_path(&entry.path);
        let on_disk = entry.path.is_file();

        match (cataloged, on_disk) {
            (true, true) if force => {
                fs::remove_file(&entry.path)?;
                fs::File::create(&entry.path)?;
                self.catalog.retain(|e| e.path != entry.path);
                self.catalog.push(entry);
                Ok(())
            }
            (true, true) => Err(RegistryError::ElementAlreadyExists(entry.user_path)),
            // Cataloged but missing on disk: recreate without duplicating.
            (true, false) => {
                fs::File::create(&entry.path)?;
                Ok(())
            }
            (false, true) if force => {
                fs::remove_file(&entry.path)?;
                fs::File::create(&entry.path)?;
                self.catalog.push(entry);
                Ok(())
            }
            // Adopt an existing file into the catalog.
            (false, true) => {
                self.catalog.push(entry);
                Ok(())
            }
            (false, false) => {
                fs::File::create(&entry.path)?;
                self.catalog.push(entry);
                Ok(())
            }
        }
    }

    /// Catalog every intermediate directory segment without touching disk.
    fn register_intermediates(&mut self, root: &Path, parents: &[String]) {
        let mut dir = root.to_path_buf();
        let mut parent = root.to_path_buf();
        for (index, segment) in parents.iter().enumerate() {
            dir.push(segment);
            if !self.catalog.contains_path(&dir) {
                self.catalog.push(CatalogEntry {
                    path: dir.clone(),
                    kind: EntryKind::Directory,
                    parent: Some(parent.clone()),
                    nickname: None,
                    user_path: parents[..=index].join("/"),
                });
            }
            parent.clone_from(&dir);
        }
    }

    /// Delete the entry resolved from the clue, recursively for directories.
    ///
    /// Directory deletion is two-phase: the physical recursive delete runs
    /// first, and the catalog subtree is purged only once it has fully
    /// succeeded, so a mid-delete failure leaves the catalog unpruned for
    /// that branch.
    pub fn delete(&mut self, clue: &str) -> Result<(), RegistryError> {
        self.require_root()?;
        let entry = self
            .lookup(clue)
            .cloned()
            .ok_or_else(|| RegistryError::MissingElement(clue.to_string()))?;
        debug!(path = %entry.path.display(), "deleting catalog entry");

        match entry.kind {
            EntryKind::Directory => self.delete_subtree(&entry.path),
            EntryKind::File => {
                // File deletion is best-effort: the entry is purged even if
                // the physical delete fails.
                if let Err(e) = fs::remove_file(&entry.path) {
                    warn!(path = %entry.path.display(), error = %e, "file delete failed");
                }
                self.catalog.retain(|e| e.path != entry.path);
                Ok(())
            }
        }
    }

    /// Physically remove a directory tree, then purge its catalog subtree.
    ///
    /// Cataloged files inside the subtree are removed individually first and
    /// their failures ignored; the directory removal is the authoritative
    /// operation and aborts the whole delete on failure.
    fn delete_subtree(&mut self, dir: &Path) -> Result<(), RegistryError> {
        for entry in self.catalog.iter() {
            if entry.kind.is_file() && entry.path.starts_with(dir) {
                if let Err(e) = fs::remove_file(&entry.path) {
                    warn!(path = %entry.path.display(), error = %e, "cascade file delete failed");
                }
            }
        }
        fs::remove_dir_all(dir)?;
        self.catalog.retain(|entry| !entry.path.starts_with(dir));
        Ok(())
    }

    /// Check that a clue resolves; with `physical`, also that the entry
    /// exists on disk. Filesystem access errors while probing are reported
    /// as `MissingElement`.
    pub fn check(&self, clue: &str, physical: bool) -> Result<(), RegistryError> {
        self.require_root()?;
        let entry = self
            .lookup(clue)
            .ok_or_else(|| RegistryError::MissingElement(clue.to_string()))?;
        if physical {
            let present = match entry.kind {
                EntryKind::File => entry.path.is_file(),
                EntryKind::Directory => entry.path.is_dir(),
            };
            if !present {
                return Err(RegistryError::MissingElement(clue.to_string()));
            }
        }
        Ok(())
    }

    /// Attach a nickname to the entry resolved from the clue.
    pub fn set_nickname(&mut self, clue: &str, nickname: &str) -> Result<(), RegistryError> {
        let entry = self
            .catalog
            .find_mut(clue)
            .ok_or_else(|| RegistryError::MissingElement(clue.to_string()))?;
        entry.nickname = Some(nickname.to_string());
        Ok(())
    }

    /// Empty cataloged files back to zero length. With no clue the whole
    /// structure is reset (directories are untouched structurally); with a
    /// clue the operation is restricted to that file or subtree.
    pub fn reset_all(&mut self, clue: Option<&str>) -> Result<(), RegistryError> {
        match clue {
            None => {
                self.reset_on_repair = true;
                let outcome = self.repair();
                self.reset_on_repair = false;
                match outcome {
                    Ok(()) | Err(RegistryError::DirectoryCorrupted) => Ok(()),
                    Err(e) => Err(e),
                }
            }
            Some(clue) => {
                let entry = self
                    .lookup(clue)
                    .cloned()
                    .ok_or_else(|| RegistryError::MissingElement(clue.to_string()))?;
                match entry.kind {
                    EntryKind::File => {
                        fs::write(&entry.path, "")?;
                        Ok(())
                    }
                    EntryKind::Directory => {
                        let files: Vec<PathBuf> = self
                            .catalog
                            .iter()
                            .filter(|e| e.kind.is_file() && e.path.starts_with(&entry.path))
                            .map(|e| e.path.clone())
                            .collect();
                        for file in files {
                            fs::write(&file, "")?;
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    /// Recreate every cataloged entry missing on disk, leaving existing ones
    /// untouched. Returns `DirectoryCorrupted` when anything needed
    /// recreation.
    pub fn repair(&self) -> Result<(), RegistryError> {
        self.require_root()?;
        let mut corrupted = false;

        for entry in self.catalog.iter() {
            match entry.kind {
                EntryKind::Directory => {
                    if entry.path.is_dir() {
                        continue;
                    }
                    fs::create_dir_all(&entry.path)?;
                    corrupted = true;
                }
                EntryKind::File => {
                    let parent = entry
                        .parent
                        .clone()
                        .or_else(|| entry.path.parent().map(Path::to_path_buf));
                    if let Some(parent) = parent.filter(|p| !p.is_dir()) {
                        fs::create_dir_all(&parent)?;
                        fs::File::create(&entry.path)?;
                        corrupted = true;
                    } else if entry.path.is_file() {
                        if self.reset_on_repair {
                            fs::write(&entry.path, "")?;
                        }
                    } else {
                        fs::File::create(&entry.path)?;
                        corrupted = true;
                    }
                }
            }
        }

        if corrupted {
            warn!("repair recreated missing catalog entries");
            Err(RegistryError::DirectoryCorrupted)
        } else {
            Ok(())
        }
    }

    /// Apply a callback to every catalog entry in catalog order.
    pub fn for_each<F: FnMut(&CatalogEntry)>(&self, mut visitor: F) -> Result<(), RegistryError> {
        self.require_root()?;
        for entry in self.catalog.iter() {
            visitor(entry);
        }
        Ok(())
    }

    /// Walk the root directory and report on-disk entries that are not in
    /// the catalog, sorted by path.
    pub fn untracked(&self) -> Result<Vec<PathBuf>, RegistryError> {
        let root = self.require_root()?;
        let mut orphans = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| {
                RegistryError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    format!("failed to walk root directory: {}", e),
                ))
            })?;
            let path = entry.path();
            if path == root {
                continue;
            }
            if !self.catalog.contains_path(path) {
                orphans.push(path.to_path_buf());
            }
        }

        orphans.sort();
        Ok(orphans)
    }

    /// Formatted listing of the whole catalog as it is stored.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for entry in self.catalog.iter() {
            out.push_str(&entry.to_string());
            out.push_str("\n\n");
        }
        out
    }
}
