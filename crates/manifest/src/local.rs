use std::path::{Path, PathBuf};

use checksum::sort_paths;
use walkdir::{DirEntry, WalkDir};

use crate::ManifestError;

/// Depth below the partition root at which manifest entries live
/// (`<subject>/<run>/<file>`).
pub const MANIFEST_DEPTH: usize = 3;

/// Lists every entry exactly `depth` levels below `root`, sorted.
///
/// Hidden entries (names starting with `.`) are skipped at every level, the
/// same way a `*/*/*` shell glob would skip them. Symlinked directories are
/// followed.
///
/// # Errors
///
/// Returns [`ManifestError::Scan`] if `root` is missing or any directory on
/// the way down cannot be read.
pub fn scan(root: &Path, depth: usize) -> Result<Vec<PathBuf>, ManifestError> {
    let mut paths = Vec::new();
    // min_depth is not used: entries above it would bypass the hidden filter
    let walker = WalkDir::new(root)
        .max_depth(depth)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|source| ManifestError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.depth() == depth {
            paths.push(entry.into_path());
        }
    }

    sort_paths(&mut paths);
    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
