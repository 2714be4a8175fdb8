//! # Manifest - Partition File Listings
//!
//! A manifest is the sorted list of file paths that make up one extracted
//! atlas partition. The cache never inspects file contents: it compares the
//! fingerprint of the manifest found on disk with the fingerprint of the
//! manifest the bundled reference CSV says should be there.
//!
//! ## Sources
//!
//! | Module       | Produces                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`local`]    | paths exactly [`MANIFEST_DEPTH`] levels below a partition |
//! | [`expected`] | paths listed in a partition's column of the reference CSV |
//!
//! ## On-Disk Shape
//!
//! ```text
//! data/fmri/msdl/                       depth 0 (partition root)
//! └── 0051456/                          depth 1 (subject)
//!     └── run_1/                        depth 2 (run)
//!         └── 0051456_..._msdl.csv      depth 3 (manifest entry)
//! ```
pub mod expected;
pub mod local;

use checksum::{compare_paths, fingerprint, sort_paths, Sha256Digest};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use expected::ReferenceIndex;
pub use local::{scan, MANIFEST_DEPTH};

/// Errors raised while building a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The reference CSV could not be opened.
    #[error("cannot open expected manifest {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The reference CSV is not well-formed.
    #[error("malformed expected manifest: {0}")]
    Csv(#[from] csv::Error),

    /// The reference CSV has no column for the requested partition.
    #[error("expected manifest has no column for partition '{0}'")]
    MissingColumn(String),

    /// Walking the partition directory failed.
    #[error("cannot scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A sorted list of paths describing one partition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    paths: Vec<PathBuf>,
}

impl Manifest {
    /// Builds a manifest, sorting `paths` lexicographically.
    pub fn from_paths(mut paths: Vec<PathBuf>) -> Self {
        sort_paths(&mut paths);
        Self { paths }
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths
            .binary_search_by(|p| compare_paths(p, path))
            .is_ok()
    }

    /// Canonical fingerprint of the sorted path list.
    #[must_use]
    pub fn fingerprint(&self) -> Sha256Digest {
        fingerprint(&self.paths)
    }

    /// Compares `self` (what is on disk) against `expected`.
    #[must_use]
    pub fn diff(&self, expected: &Manifest) -> ManifestDiff {
        let actual: BTreeSet<&PathBuf> = self.paths.iter().collect();
        let wanted: BTreeSet<&PathBuf> = expected.paths.iter().collect();
        let mut missing: Vec<PathBuf> = wanted.difference(&actual).map(|p| (*p).clone()).collect();
        let mut unexpected: Vec<PathBuf> =
            actual.difference(&wanted).map(|p| (*p).clone()).collect();
        sort_paths(&mut missing);
        sort_paths(&mut unexpected);
        ManifestDiff {
            missing,
            unexpected,
        }
    }
}

/// Paths that differ between an on-disk manifest and the reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestDiff {
    /// Listed in the reference but absent on disk.
    pub missing: Vec<PathBuf>,
    /// Present on disk but not in the reference.
    pub unexpected: Vec<PathBuf>,
}

impl ManifestDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

#[cfg(test)]
mod tests;
