use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use zip::result::ZipError;
use zip::ZipArchive;

/// Failure to unpack a downloaded archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive file could not be opened.
    #[error("cannot open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive is malformed, or an entry could not be written.
    #[error("cannot extract {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

/// Unpacks every entry of the zip at `archive` under `dest`, creating
/// directories as needed and overwriting existing files.
///
/// Entry paths are kept as stored, so an archive whose entries start with
/// `msdl/` produces `dest/msdl/...`. Entries that would land outside `dest`
/// (absolute paths, `..`) make extraction fail.
///
/// Returns the number of entries in the archive.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, ArchiveError> {
    let zip_err = |source| ArchiveError::Zip {
        path: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(|source| ArchiveError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(zip_err)?;
    let entries = zip.len();

    info!(archive = %archive.display(), dest = %dest.display(), entries, "decompressing archive");
    zip.extract(dest).map_err(zip_err)?;

    Ok(entries)
}
