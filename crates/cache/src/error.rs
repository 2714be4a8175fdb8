use std::io;
use std::path::{Path, PathBuf};

use fetch::{ArchiveError, TransportError};
use manifest::ManifestError;
use thiserror::Error;

/// Everything that can stop a partition from being ensured.
///
/// Every variant is fatal for the current partition and aborts
/// [`ensure_all`](crate::DatasetCache::ensure_all).
#[derive(Debug, Error)]
pub enum CacheError {
    /// The requested name is not in the partition table.
    #[error("unknown partition {name:?}: expected one of {}", .valid.join(", "))]
    InvalidPartition { name: String, valid: Vec<String> },

    /// The downloaded archive does not hash to the published digest. The
    /// staged file has been removed; running again starts clean.
    #[error(
        "the archive downloaded for {name:?} was corrupted \
         (sha256 {actual}, expected {expected}); try again"
    )]
    CorruptDownload {
        name: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A local path could not be created, read or removed.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl CacheError {
    pub(crate) fn fs(path: &Path, source: io::Error) -> Self {
        CacheError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
