//! Import resolution and de-duplication.
//!
//! Relative paths resolve against the directory of the file currently being
//! read; the resolver keeps those directories on a stack. Every file read
//! during one compilation is identified by name and content hash, and a
//! file whose identity was already seen is skipped.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Source of spec and script text
pub trait FileSource: fmt::Debug {
    /// Read the whole file
    ///
    /// # Errors
    ///
    /// Returns error if the file does not exist or cannot be read
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves files from memory, e.g. bundled resources
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; the path is normalized
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<str>, content: impl Into<String>) -> Self {
        self.files.insert(normalize_path(path.as_ref()), content.into());
        self
    }
}

impl FileSource for MemorySource {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

/// Collapse repeated separators and resolve `.` and `..` lexically
#[must_use]
pub fn normalize_path(path: &str) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match normalized.components().next_back() {
                    Some(Component::Normal(_)) => normalized.pop(),
                    Some(Component::RootDir | Component::Prefix(_)) => true,
                    _ => false,
                };
                if !popped {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Identity of a loaded file: its name plus the SHA-256 of its content
#[must_use]
pub fn file_id(path: &Path, content: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{name}:{:x}", Sha256::digest(content.as_bytes()))
}

/// Context-path stack and loaded-file set of one compilation
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    stack: Vec<PathBuf>,
    loaded: HashSet<String>,
}

impl ImportResolver {
    /// Create a resolver rooted at the working directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a requested path against the current context directory
    #[must_use]
    pub fn resolve(&self, requested: &str) -> PathBuf {
        let requested = requested.trim();
        if requested.starts_with('/') {
            return normalize_path(requested);
        }
        match self.stack.last() {
            Some(dir) => normalize_path(&format!("{}/{requested}", dir.display())),
            None => normalize_path(requested),
        }
    }

    /// Enter the directory containing `file`
    pub fn push_file(&mut self, file: &Path) {
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        self.stack.push(dir);
    }

    /// Leave the innermost context directory
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Record a file identity; returns false if it was loaded before
    pub fn mark_loaded(&mut self, id: String) -> bool {
        self.loaded.insert(id)
    }

    /// Number of distinct files loaded so far
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}
