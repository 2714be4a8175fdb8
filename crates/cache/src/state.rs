//! Partition state: decides whether a partition directory can be trusted.
//!
//! The check compares fingerprints, not individual files. The expected
//! manifest is read from the reference CSV on every call, and only when the
//! partition directory exists.
use config::PartitionSpec;
use fetch::Transport;
use manifest::{Manifest, ManifestDiff, ReferenceIndex, MANIFEST_DEPTH};
use tracing::{debug, warn};

use crate::{CacheError, DatasetCache, Store};

/// Result of inspecting one partition directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionState {
    /// No directory for the partition.
    Missing,
    /// The directory exists but its manifest differs from the reference.
    Stale(ManifestDiff),
    /// The directory's manifest fingerprint equals the reference's.
    Valid,
}

impl<T: Transport, S: Store> DatasetCache<T, S> {
    /// Reports the state of a partition without changing anything on disk
    /// and without network access.
    pub fn check_partition(&self, name: &str) -> Result<PartitionState, CacheError> {
        let spec = self.partition(name)?;
        self.inspect(spec)
    }

    pub(crate) fn inspect(&self, spec: &PartitionSpec) -> Result<PartitionState, CacheError> {
        let dir = self.config.partition_dir(spec.name());
        let exists = self
            .store
            .dir_exists(&dir)
            .map_err(|source| CacheError::fs(&dir, source))?;
        if !exists {
            debug!(partition = spec.name(), dir = %dir.display(), "partition directory missing");
            return Ok(PartitionState::Missing);
        }

        let local = Manifest::from_paths(self.store.list_paths(&dir, MANIFEST_DEPTH)?);
        let expected = self.expected_manifest(spec)?;

        let local_fp = local.fingerprint();
        let expected_fp = expected.fingerprint();
        debug!(
            partition = spec.name(),
            local = %local_fp,
            expected = %expected_fp,
            files = local.len(),
            "compared manifest fingerprints"
        );

        if local_fp == expected_fp {
            return Ok(PartitionState::Valid);
        }

        let diff = local.diff(&expected);
        warn!(
            partition = spec.name(),
            missing = diff.missing.len(),
            unexpected = diff.unexpected.len(),
            "partition does not match the expected manifest"
        );
        Ok(PartitionState::Stale(diff))
    }

    fn expected_manifest(&self, spec: &PartitionSpec) -> Result<Manifest, CacheError> {
        let index = ReferenceIndex::load(&self.config.manifest_path)?;
        Ok(index.expected(spec.name(), &self.config.root)?)
    }
}
