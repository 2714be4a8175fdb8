//! Acquisition: download, verify and unpack one partition archive.
//!
//! ```text
//! <data_dir>/<name>.zip.part   ← transport writes here
//!        │ sha256 (streamed, 8 KiB chunks)
//!        ├── mismatch → remove .zip.part, CorruptDownload
//!        └── match    → extract into <data_dir>, remove .zip.part
//! ```
//!
//! There is no retry. A leftover staging file from an interrupted run is
//! removed before the next download of that partition starts.
use checksum::sha256_file;
use config::PartitionSpec;
use fetch::{extract_zip, Transport};
use tracing::{info, warn};

use crate::{CacheError, DatasetCache, Store};

impl<T: Transport, S: Store> DatasetCache<T, S> {
    /// Downloads, verifies and extracts `spec`'s archive.
    ///
    /// Returns the number of bytes downloaded.
    pub(crate) fn acquire(&self, spec: &PartitionSpec) -> Result<u64, CacheError> {
        let data_dir = &self.config.data_dir;
        let staging = self.config.staging_path(spec.name());

        self.store
            .create_dir_all(data_dir)
            .map_err(|source| CacheError::fs(data_dir, source))?;
        self.store
            .remove_file(&staging)
            .map_err(|source| CacheError::fs(&staging, source))?;

        info!(partition = spec.name(), url = spec.url(), "Downloading the data");
        let bytes = match self.transport.download(spec.url(), &staging) {
            Ok(bytes) => bytes,
            Err(e) => {
                // the transport error is what the caller needs to see
                if let Err(cleanup) = self.store.remove_file(&staging) {
                    warn!(
                        partition = spec.name(),
                        path = %staging.display(),
                        error = %cleanup,
                        "could not remove partial download"
                    );
                }
                return Err(e.into());
            }
        };

        let actual = sha256_file(&staging)
            .map_err(|source| CacheError::fs(&staging, source))?
            .to_hex();
        if actual != spec.sha256() {
            warn!(
                partition = spec.name(),
                expected = spec.sha256(),
                actual = %actual,
                "downloaded archive is corrupted, removing it"
            );
            self.store
                .remove_file(&staging)
                .map_err(|source| CacheError::fs(&staging, source))?;
            return Err(CacheError::CorruptDownload {
                name: spec.name().to_string(),
                expected: spec.sha256().to_string(),
                actual,
            });
        }

        extract_zip(&staging, data_dir)?;
        self.store
            .remove_file(&staging)
            .map_err(|source| CacheError::fs(&staging, source))?;

        info!(partition = spec.name(), bytes, "partition ready");
        Ok(bytes)
    }
}
