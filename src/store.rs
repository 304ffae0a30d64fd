//! Record store: typed line-oriented persistence through the registry.
//!
//! Records are serialized by the configured codec, one record per line of
//! UTF-8 text, into files resolved by clue through a [`PathRegistry`]. The
//! store also applies the line cipher to whole files in place.

use crate::catalog::CatalogEntry;
use crate::cipher::LineCipher;
use crate::codec::Codec;
use crate::error::StoreError;
use crate::registry::PathRegistry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Store configuration: cipher key, codec, and the safety lock.
///
/// Operations borrow the registry explicitly instead of reaching for shared
/// state, so tests can run several independent store/registry pairs. Every
/// operation fails when the registry has not been initialized.
pub struct RecordStore<C: Codec> {
    cipher: LineCipher,
    codec: C,
    safety: bool,
}

impl<C: Codec> RecordStore<C> {
    /// A key of 0 is normalized to 1; the cipher is degenerate at zero.
    /// Pass `safety = false` only when the encryption key must be changeable
    /// later.
    pub fn new(key: i32, codec: C, safety: bool) -> Self {
        Self {
            cipher: LineCipher::new(key),
            codec,
            safety,
        }
    }

    pub fn encryption_key(&self) -> i32 {
        self.cipher.key()
    }

    pub fn in_safe_mode(&self) -> bool {
        self.safety
    }

    /// Swap the cipher key. Rejected while the safety lock is set.
    pub fn change_encryption_key(&mut self, new_key: i32) -> Result<(), StoreError> {
        if self.safety {
            return Err(StoreError::SafetyEnabled);
        }
        self.cipher = LineCipher::new(new_key);
        Ok(())
    }

    fn resolve_file<'a>(
        &self,
        registry: &'a PathRegistry,
        clue: &str,
    ) -> Result<&'a CatalogEntry, StoreError> {
        if !registry.is_active() {
            return Err(StoreError::RegistryNotInitialized);
        }
        let entry = registry
            .lookup(clue)
            .ok_or_else(|| StoreError::MissingElement(clue.to_string()))?;
        if !entry.kind.is_file() {
            return Err(StoreError::InvalidElementType(clue.to_string()));
        }
        Ok(entry)
    }

    /// Serialize a record into the file resolved from the clue.
    ///
    /// With `extend` the record is appended as a new line; otherwise line
    /// `line` is overwritten, extending a zero-line file to one line first.
    /// An out-of-range index on a non-empty file is `FileIndexOverflow`.
    pub fn save<T: Serialize>(
        &self,
        registry: &PathRegistry,
        record: &T,
        clue: &str,
        extend: bool,
        line: usize,
    ) -> Result<(), StoreError> {
        let entry = self.resolve_file(registry, clue)?;
        let data = self.codec.encode(record)?;
        let mut lines = read_lines(&entry.path)?;

        if extend {
            lines.push(data);
        } else {
            if lines.is_empty() {
                lines.push(String::new());
            }
            let len = lines.len();
            let slot = lines
                .get_mut(line)
                .ok_or(StoreError::FileIndexOverflow { line, len })?;
            *slot = data;
        }

        debug!(path = %entry.path.display(), line, extend, "record saved");
        write_lines(&entry.path, &lines)?;
        Ok(())
    }

    /// Deserialize line `line` of the file resolved from the clue.
    ///
    /// Best-effort: any failure (resolution, bounds, codec) yields the
    /// record type's default value instead of an error.
    pub fn load<T: DeserializeOwned + Default>(
        &self,
        registry: &PathRegistry,
        clue: &str,
        line: usize,
    ) -> T {
        self.try_load(registry, clue, line).unwrap_or_default()
    }

    /// Like [`RecordStore::load`] but with an explicit `None` on failure.
    pub fn try_load<T: DeserializeOwned>(
        &self,
        registry: &PathRegistry,
        clue: &str,
        line: usize,
    ) -> Option<T> {
        let entry = self.resolve_file(registry, clue).ok()?;
        let lines = read_lines(&entry.path).ok()?;
        let text = lines.get(line)?;
        self.codec.decode(text).ok()
    }

    /// Apply the line cipher to every line of the target file in place.
    pub fn encrypt_file(
        &self,
        registry: &PathRegistry,
        clue: &str,
        encrypt: bool,
    ) -> Result<(), StoreError> {
        let entry = self.resolve_file(registry, clue)?;
        self.transform_file(&entry.path, encrypt)
    }

    /// Apply the line cipher to every cataloged file, best-effort per file.
    pub fn encrypt_files(&self, registry: &PathRegistry, encrypt: bool) -> Result<(), StoreError> {
        if !registry.is_active() {
            return Err(StoreError::RegistryNotInitialized);
        }
        let mut paths = Vec::new();
        registry
            .for_each(|entry| {
                if entry.kind.is_file() {
                    paths.push(entry.path.clone());
                }
            })
            .map_err(|_| StoreError::RegistryNotInitialized)?;

        for path in paths {
            if let Err(e) = self.transform_file(&path, encrypt) {
                warn!(path = %path.display(), error = %e, "bulk cipher pass skipped file");
            }
        }
        Ok(())
    }

    fn transform_file(&self, path: &Path, encrypt: bool) -> Result<(), StoreError> {
        let lines = read_lines(path)?;
        let transformed: Vec<String> = lines
            .iter()
            .map(|line| {
                if encrypt {
                    self.cipher.encrypt(line)
                } else {
                    self.cipher.decrypt(line)
                }
            })
            .collect();
        write_lines(path, &transformed)?;
        Ok(())
    }

    /// Probe whether line 0 deserializes with the configured codec, without
    /// persisting anything. An unreadable file may simply be encrypted.
    pub fn check_readability<T: DeserializeOwned>(
        &self,
        registry: &PathRegistry,
        clue: &str,
    ) -> Result<(), StoreError> {
        let entry = self.resolve_file(registry, clue)?;
        let lines = read_lines(&entry.path)?;
        let first = lines
            .first()
            .ok_or_else(|| StoreError::FileUnreadable("file has no lines".to_string()))?;
        self.codec
            .decode::<T>(first)
            .map_err(|e| StoreError::FileUnreadable(e.to_string()))?;
        Ok(())
    }

    /// Non-mutating read of one line, decrypting in memory when `encrypted`.
    /// `None` on any resolution or bounds failure.
    pub fn read_line(
        &self,
        registry: &PathRegistry,
        clue: &str,
        line: usize,
        encrypted: bool,
    ) -> Option<String> {
        let entry = self.resolve_file(registry, clue).ok()?;
        let lines = read_lines(&entry.path).ok()?;
        let text = lines.get(line)?;
        Some(if encrypted {
            self.cipher.decrypt(text)
        } else {
            text.clone()
        })
    }

    /// All lines of the file resolved from the clue.
    ///
    /// With `decrypt` the file is decrypted on disk, read, then re-encrypted
    /// to restore its prior state. This read-through temporarily mutates
    /// stored state and is not safe under concurrent access to the file.
    pub fn get_file(
        &self,
        registry: &PathRegistry,
        clue: &str,
        decrypt: bool,
    ) -> Option<Vec<String>> {
        let entry = self.resolve_file(registry, clue).ok()?;
        let path = entry.path.clone();

        if decrypt {
            self.transform_file(&path, false).ok()?;
        }
        let lines = read_lines(&path).ok();
        if decrypt {
            if let Err(e) = self.transform_file(&path, true) {
                warn!(path = %path.display(), error = %e, "failed to re-encrypt after read-through");
            }
        }
        lines
    }

    /// Decode a record directly from text, falling back to the type's
    /// default when the codec rejects it.
    pub fn decode_record<T: DeserializeOwned + Default>(&self, text: &str) -> T {
        self.codec.decode(text).unwrap_or_default()
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_string).collect())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<(), std::io::Error> {
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)
}
