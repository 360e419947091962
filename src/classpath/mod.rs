//! Classpath indexing and lazy class resolution.
//!
//! A [`ClasspathIndex`] scans an ordered list of archives once at construction and
//! builds an immutable name-to-archive index with first-match-wins semantics: the
//! first archive containing a given class name owns it, later occurrences are
//! shadowed. Class bytes are decoded lazily on first resolution and cached.
//!
//! Resolution failures are not errors. Classpaths routinely omit platform classes,
//! so an unknown name (or a class whose bytes fail to decode) resolves to `None`
//! and the caller treats it as a dead end. Only archives that exist on disk but
//! cannot be opened as archives are reported, at construction time.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use jarshake::{ClassResolver, ClasspathIndex};
//! use std::path::PathBuf;
//!
//! let index = ClasspathIndex::new(&[PathBuf::from("app.jar"), PathBuf::from("lib.jar")])?;
//! println!("{} classes across {} archives", index.class_count(), index.archive_count());
//!
//! if let Some(model) = index.resolve("com/example/Main") {
//!     println!("Main has {} methods", model.methods.len());
//! }
//! # Ok::<(), jarshake::Error>(())
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use memmap2::Mmap;
use zip::ZipArchive;

use crate::{classfile::ClassModel, Result};

/// Anything that can resolve an internal class name to its decoded model.
///
/// This is the seam between the reachability analyzer / rewriter and the storage
/// layer; tests substitute an in-memory map for the archive-backed index.
pub trait ClassResolver {
    /// Resolve a class by internal name; `None` is a dead end, never an error.
    fn resolve(&self, name: &str) -> Option<Arc<ClassModel>>;
}

/// A memory-mapped archive file, shared with the zip reader.
struct MappedFile(Arc<Mmap>);

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// One opened classpath archive.
struct Archive {
    /// Path the archive was opened from, for diagnostics
    path: PathBuf,
    /// The zip reader over the mapped bytes; locked because entry reads seek
    reader: Mutex<ZipArchive<Cursor<MappedFile>>>,
}

/// Where a class name was first seen.
#[derive(Clone, Copy)]
struct Location {
    archive: usize,
}

/// The immutable first-match-wins classpath index with a lazy decode cache.
pub struct ClasspathIndex {
    archives: Vec<Archive>,
    index: HashMap<String, Location>,
    cache: DashMap<String, Option<Arc<ClassModel>>>,
}

impl ClasspathIndex {
    /// Scan the given archives, in order, and build the name index.
    ///
    /// Paths that do not exist are skipped silently. Paths that exist but cannot
    /// be opened or read as archives are fatal.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] or [`crate::Error::ArchiveError`] for an
    /// existing archive that cannot be opened.
    pub fn new(paths: &[PathBuf]) -> Result<Self> {
        let mut archives = Vec::new();
        let mut index = HashMap::new();

        for path in paths {
            if !path.exists() {
                continue;
            }

            let file = File::open(path)?;
            let mmap = Arc::new(unsafe { Mmap::map(&file)? });
            let mut reader = ZipArchive::new(Cursor::new(MappedFile(mmap)))?;

            let archive_number = archives.len();
            for entry_number in 0..reader.len() {
                let entry = reader.by_index_raw(entry_number)?;
                let entry_name = entry.name();
                if let Some(class_name) = entry_name.strip_suffix(".class") {
                    index
                        .entry(class_name.to_string())
                        .or_insert(Location {
                            archive: archive_number,
                        });
                }
            }

            archives.push(Archive {
                path: path.clone(),
                reader: Mutex::new(reader),
            });
        }

        Ok(ClasspathIndex {
            archives,
            index,
            cache: DashMap::new(),
        })
    }

    /// Number of archives that were found and indexed.
    #[must_use]
    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    /// Number of distinct class names in the index.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the classpath contains a class with this internal name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All class names known to the index, in no particular order.
    pub fn known_classes(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Path of the archive a class resolves from, for diagnostics.
    #[must_use]
    pub fn archive_of(&self, name: &str) -> Option<&std::path::Path> {
        let location = self.index.get(name)?;
        Some(self.archives[location.archive].path.as_path())
    }

    fn read_and_decode(&self, name: &str) -> Option<Arc<ClassModel>> {
        let location = self.index.get(name)?;
        let archive = &self.archives[location.archive];

        let mut bytes = Vec::new();
        {
            let mut reader = archive.reader.lock().ok()?;
            let mut entry = reader.by_name(&format!("{name}.class")).ok()?;
            entry.read_to_end(&mut bytes).ok()?;
        }

        ClassModel::from_bytes(&bytes).ok().map(Arc::new)
    }
}

impl ClassResolver for ClasspathIndex {
    fn resolve(&self, name: &str) -> Option<Arc<ClassModel>> {
        if let Some(cached) = self.cache.get(name) {
            return cached.value().clone();
        }

        let decoded = self.read_and_decode(name);
        self.cache.insert(name.to_string(), decoded.clone());
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shake::write_archive;
    use crate::testutil::bare_class;

    fn jar_with(dir: &std::path::Path, file: &str, classes: &[(&str, &str)]) -> PathBuf {
        let entries: Vec<(String, Vec<u8>)> = classes
            .iter()
            .map(|(name, source_file)| {
                let mut model = bare_class(name);
                model.source_file = Some((*source_file).to_string());
                (name.to_string(), model.to_bytes().unwrap())
            })
            .collect();
        let path = dir.join(file);
        write_archive(&path, &entries).unwrap();
        path
    }

    #[test]
    fn first_archive_wins_and_missing_paths_skip() {
        let dir = tempfile::tempdir().unwrap();
        let first = jar_with(dir.path(), "first.jar", &[("p/Dup", "First.java"), ("p/A", "A.java")]);
        let second = jar_with(dir.path(), "second.jar", &[("p/Dup", "Second.java"), ("p/B", "B.java")]);
        let ghost = dir.path().join("ghost.jar");

        let index = ClasspathIndex::new(&[ghost, first, second]).unwrap();
        assert_eq!(index.archive_count(), 2);
        assert_eq!(index.class_count(), 3);
        assert!(index.contains("p/Dup"));

        let dup = index.resolve("p/Dup").unwrap();
        assert_eq!(dup.source_file.as_deref(), Some("First.java"));
        assert!(index.resolve("p/B").is_some());
        assert!(index.resolve("p/Nope").is_none());
    }

    #[test]
    fn corrupt_archive_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jar");
        std::fs::write(&path, b"this is not a zip archive at all").unwrap();

        assert!(ClasspathIndex::new(&[path]).is_err());
    }

    #[test]
    fn undecodable_class_is_a_dead_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.jar");
        write_archive(&path, &[("p/Bad".to_string(), vec![0xDE, 0xAD, 0xBE, 0xEF])]).unwrap();

        let index = ClasspathIndex::new(&[path]).unwrap();
        assert!(index.contains("p/Bad"));
        assert!(index.resolve("p/Bad").is_none());
        // Second query hits the cached dead end.
        assert!(index.resolve("p/Bad").is_none());
    }
}
