//! Integration tests for registry lifecycle: add, delete, repair, reset

use std::fs;
use stowage::catalog::EntryKind;
use stowage::error::RegistryError;
use stowage::registry::PathRegistry;
use tempfile::TempDir;

fn initialized(auto: bool) -> (TempDir, PathRegistry) {
    let temp_dir = TempDir::new().unwrap();
    let mut registry = PathRegistry::new();
    registry.initialize(temp_dir.path(), auto).unwrap();
    (temp_dir, registry)
}

fn entry_count(registry: &PathRegistry) -> usize {
    let mut count = 0;
    registry.for_each(|_| count += 1).unwrap();
    count
}

/// Initialize succeeds exactly once; later calls fail regardless of args.
#[test]
fn test_initialize_accepted_exactly_once() {
    let temp_dir = TempDir::new().unwrap();
    let other_dir = TempDir::new().unwrap();
    let mut registry = PathRegistry::new();

    registry.initialize(temp_dir.path(), false).unwrap();
    for _ in 0..3 {
        assert!(matches!(
            registry.initialize(other_dir.path(), true),
            Err(RegistryError::AlreadyInitialized)
        ));
    }
    assert!(registry.is_active());
    assert!(registry.root().unwrap().is_absolute());
}

/// Forced add twice in a row leaves exactly one catalog entry and a fresh,
/// empty file on disk.
#[test]
fn test_forced_add_is_idempotent() {
    let (_guard, mut registry) = initialized(false);

    registry
        .add("slot.dat", true, EntryKind::File, Some("slot"))
        .unwrap();
    let path = registry.lookup("slot").unwrap().path.clone();
    fs::write(&path, "stale contents\n").unwrap();

    registry
        .add("slot.dat", true, EntryKind::File, Some("slot"))
        .unwrap();

    assert_eq!(entry_count(&registry), 1);
    assert!(path.is_file());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

/// Deleting a directory removes the whole cataloged subtree and the
/// physical tree in one call.
#[test]
fn test_cascading_delete_purges_subtree() {
    let (_guard, mut registry) = initialized(false);

    registry
        .add("d", false, EntryKind::Directory, Some("d"))
        .unwrap();
    registry.add("d/a.txt", false, EntryKind::File, None).unwrap();
    registry
        .add("d/sub", false, EntryKind::Directory, None)
        .unwrap();
    registry
        .add("d/sub/b.txt", false, EntryKind::File, None)
        .unwrap();
    assert_eq!(entry_count(&registry), 4);

    let dir_path = registry.lookup("d").unwrap().path.clone();
    registry.delete("d").unwrap();

    assert_eq!(entry_count(&registry), 0);
    assert!(!dir_path.exists());
}

/// Deleting one file leaves sibling entries untouched.
#[test]
fn test_delete_single_file() {
    let (_guard, mut registry) = initialized(false);
    registry
        .add("keep.dat", false, EntryKind::File, Some("keep"))
        .unwrap();
    registry
        .add("drop.dat", false, EntryKind::File, Some("drop"))
        .unwrap();

    registry.delete("drop").unwrap();

    assert_eq!(entry_count(&registry), 1);
    assert!(registry.check("keep", true).is_ok());
    assert!(matches!(
        registry.delete("drop"),
        Err(RegistryError::MissingElement(_))
    ));
}

/// Nickname, user path, and resolved-path substring all resolve to the same
/// entry.
#[test]
fn test_clue_resolution_precedence() {
    let (_guard, mut registry) = initialized(false);
    registry
        .add("Saves/save1.dat", false, EntryKind::File, Some("save1"))
        .unwrap();

    let by_nickname = registry.lookup("save1").unwrap().path.clone();
    let by_user_path = registry.lookup("Saves/save1.dat").unwrap().path.clone();
    let by_substring = registry.lookup("save1.dat").unwrap().path.clone();

    assert_eq!(by_nickname, by_user_path);
    assert_eq!(by_nickname, by_substring);
}

/// Catalog-only check passes for entries missing on disk; physical check
/// reports them missing.
#[test]
fn test_check_catalog_vs_physical() {
    let (_guard, mut registry) = initialized(false);
    registry
        .add("probe.dat", false, EntryKind::File, Some("probe"))
        .unwrap();

    let path = registry.lookup("probe").unwrap().path.clone();
    fs::remove_file(&path).unwrap();

    assert!(registry.check("probe", false).is_ok());
    assert!(matches!(
        registry.check("probe", true),
        Err(RegistryError::MissingElement(_))
    ));
}

/// Repair is non-destructive when everything exists, recreates missing
/// files empty, and reports corruption.
#[test]
fn test_repair_recreates_missing_entries() {
    let (_guard, mut registry) = initialized(false);
    registry
        .add("saves", false, EntryKind::Directory, None)
        .unwrap();
    registry
        .add("saves/slot1.dat", false, EntryKind::File, Some("save1"))
        .unwrap();

    let path = registry.lookup("save1").unwrap().path.clone();
    fs::write(&path, "precious\n").unwrap();

    // Intact structure: success, contents untouched.
    registry.repair().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "precious\n");

    // Out-of-band removal: corruption reported, file recreated empty.
    fs::remove_file(&path).unwrap();
    assert!(matches!(
        registry.repair(),
        Err(RegistryError::DirectoryCorrupted)
    ));
    assert!(path.is_file());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

/// Repair also rebuilds a missing parent directory for a cataloged file.
#[test]
fn test_repair_rebuilds_missing_directory() {
    let (_guard, mut registry) = initialized(false);
    registry
        .add("nest", false, EntryKind::Directory, Some("nest"))
        .unwrap();
    registry
        .add("nest/data.dat", false, EntryKind::File, Some("data"))
        .unwrap();

    let dir_path = registry.lookup("nest").unwrap().path.clone();
    fs::remove_dir_all(&dir_path).unwrap();

    assert!(matches!(
        registry.repair(),
        Err(RegistryError::DirectoryCorrupted)
    ));
    assert!(dir_path.is_dir());
    assert!(registry.check("data", true).is_ok());
}

/// Reset truncates every cataloged file; a clue restricts it to a subtree.
#[test]
fn test_reset_truncates_files() {
    let (_guard, mut registry) = initialized(false);
    registry
        .add("a.dat", false, EntryKind::File, Some("reset-alpha"))
        .unwrap();
    registry
        .add("sub/b.dat", false, EntryKind::File, Some("reset-beta"))
        .unwrap();

    let a = registry.lookup("reset-alpha").unwrap().path.clone();
    let b = registry.lookup("reset-beta").unwrap().path.clone();
    fs::write(&a, "alpha\n").unwrap();
    fs::write(&b, "beta\n").unwrap();

    // Restricted reset touches only the clued file.
    registry.reset_all(Some("reset-beta")).unwrap();
    assert_eq!(fs::read_to_string(&a).unwrap(), "alpha\n");
    assert_eq!(fs::read_to_string(&b).unwrap(), "");

    // Full reset empties everything.
    fs::write(&b, "beta again\n").unwrap();
    registry.reset_all(None).unwrap();
    assert_eq!(fs::read_to_string(&a).unwrap(), "");
    assert_eq!(fs::read_to_string(&b).unwrap(), "");
}

/// Auto-register mode catalogs every intermediate directory segment.
#[test]
fn test_auto_register_intermediates() {
    let (_guard, mut registry) = initialized(true);
    registry
        .add("x/y/z.dat", false, EntryKind::File, Some("deep"))
        .unwrap();

    assert_eq!(entry_count(&registry), 3);
    assert!(registry.lookup("x/y").is_some());
    // Intermediates carry no nickname.
    assert!(registry.lookup("x/y").unwrap().nickname.is_none());
}

/// The untracked scan reports on-disk entries the catalog does not know.
#[test]
fn test_untracked_reports_strays() {
    let (_guard, mut registry) = initialized(false);
    registry
        .add("known.dat", false, EntryKind::File, None)
        .unwrap();

    let root = registry.root().unwrap().to_path_buf();
    fs::write(root.join("stray.dat"), "orphan").unwrap();

    let orphans = registry.untracked().unwrap();
    assert_eq!(orphans.len(), 1);
    assert!(orphans[0].ends_with("stray.dat"));
}
