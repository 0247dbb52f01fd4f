// Artifact storage
//
// Pages are write-once per run. A second write to the same name replaces
// the first and is logged.

use crate::error::Result;
use indexmap::{IndexMap, IndexSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where rendered pages go
pub trait ArtifactStore {
    /// Whether a page with this file name already exists
    fn exists(&self, name: &str) -> bool;

    /// Store a page, returning where it was written
    fn write(&mut self, name: &str, content: &str) -> Result<PathBuf>;
}

/// Flat output directory
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    written: IndexSet<String>,
}

impl DirectoryStore {
    /// Store rooted at `root`, which must already exist
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: IndexSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names written through this store, in order
    pub fn written(&self) -> impl Iterator<Item = &str> {
        self.written.iter().map(String::as_str)
    }
}

impl ArtifactStore for DirectoryStore {
    fn exists(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    fn write(&mut self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        if !self.written.insert(name.to_string()) {
            debug!(file = %name, "page written twice, keeping the last");
        }
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: IndexMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a page already exists
    pub fn with_existing(mut self, name: &str) -> Self {
        self.pages.insert(name.to_string(), String::new());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pages.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Number of write calls, counting overwrites
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ArtifactStore for MemoryStore {
    fn exists(&self, name: &str) -> bool {
        self.pages.contains_key(name)
    }

    fn write(&mut self, name: &str, content: &str) -> Result<PathBuf> {
        self.writes += 1;
        if self.pages.insert(name.to_string(), content.to_string()).is_some() {
            debug!(file = %name, "page written twice, keeping the last");
        }
        Ok(PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = DirectoryStore::new(dir.path());
        assert!(!store.exists("a.html"));

        let path = store.write("a.html", "<p>one</p>").unwrap();
        assert_eq!(path, dir.path().join("a.html"));
        assert!(store.exists("a.html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>one</p>");
    }

    #[test]
    fn test_collision_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let mut store = DirectoryStore::new(dir.path());
        store.write("a.html", "first").unwrap();
        store.write("a.html", "second").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("a.html")).unwrap(), "second");
        assert_eq!(store.written().collect::<Vec<_>>(), vec!["a.html"]);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new().with_existing("old.html");
        assert!(store.exists("old.html"));
        store.write("new.html", "x").unwrap();
        store.write("new.html", "y").unwrap();
        assert_eq!(store.get("new.html"), Some("y"));
        assert_eq!(store.writes(), 2);
    }
}
