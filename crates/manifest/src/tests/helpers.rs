use std::fs;
use std::path::{Path, PathBuf};

/// Creates `root/<rel>` as an empty file, making parent directories.
pub fn touch(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"").unwrap();
    path
}
