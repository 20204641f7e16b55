//! File-system abstraction used by the resource codecs.
//!
//! Codecs never touch `std::fs` directly; they go through a [`FileSystem`]
//! so that embedding applications (and tests) can substitute their own storage.

use std::{
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

/// Minimal file access needed to load and save resource files.
pub trait FileSystem: Send + Sync {
    /// Opens `path` for reading.
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Creates or truncates `path` for writing.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(File::create(path)?))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
