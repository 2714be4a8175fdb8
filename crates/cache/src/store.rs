//! Filesystem access used to decide and reset partition state.
//!
//! The partition directory tree is the cache's only persistence. Routing the
//! few operations the decision needs through [`Store`] lets tests observe or
//! forbid them.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use manifest::ManifestError;

/// Directory-tree operations the cache performs on its data directory.
pub trait Store {
    /// `Ok(true)` if `path` exists and is a directory, `Ok(false)` if it does
    /// not exist. Any other stat failure is returned.
    fn dir_exists(&self, path: &Path) -> io::Result<bool>;

    /// Entries exactly `depth` levels below `root`, sorted.
    fn list_paths(&self, root: &Path, depth: usize) -> Result<Vec<PathBuf>, ManifestError>;

    /// Recursively removes `path`.
    fn remove_tree(&self, path: &Path) -> io::Result<()>;

    /// Removes a single file. A missing file is not an error.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`Store`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl Store for LocalStore {
    fn dir_exists(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_paths(&self, root: &Path, depth: usize) -> Result<Vec<PathBuf>, ManifestError> {
        manifest::scan(root, depth)
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

impl<S: Store + ?Sized> Store for &S {
    fn dir_exists(&self, path: &Path) -> io::Result<bool> {
        (**self).dir_exists(path)
    }

    fn list_paths(&self, root: &Path, depth: usize) -> Result<Vec<PathBuf>, ManifestError> {
        (**self).list_paths(root, depth)
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        (**self).remove_tree(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        (**self).remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }
}
