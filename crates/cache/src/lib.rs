//! # Cache - fMRI Dataset Cache
//!
//! Keeps each atlas partition of the fMRI time-series dataset present on
//! disk and structurally intact, re-downloading it when it is missing or
//! stale. Ties together the [`config`], [`manifest`], [`checksum`] and
//! [`fetch`] crates.
//!
//! ## Decision Flow
//!
//! ```text
//! ensure_partition(name)
//!   |
//!   |  name not in table?  ──────────────▶ InvalidPartition (no I/O)
//!   v
//! ┌───────────────────────────────────────────────┐
//! │ state.rs                                      │
//! │   dir absent            → Missing             │
//! │   fingerprint(local) == fingerprint(expected) │
//! │                         → Valid   ───────────────▶ return (no network)
//! │   otherwise             → Stale               │
//! └───────────────────────────────────────────────┘
//!   |  Stale: remove partition dir wholesale
//!   v
//! ┌───────────────────────────────────────────────┐
//! │ acquire.rs                                    │
//! │   download → <name>.zip.part                  │
//! │   sha256 != expected → remove file,           │
//! │                        CorruptDownload        │
//! │   extract into data dir, remove staged file   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module      | Purpose                                                  |
//! |-------------|----------------------------------------------------------|
//! | `lib.rs`    | `DatasetCache`, `ensure_partition`, `ensure_all`, `fetch` |
//! | [`state`]   | `check_partition`: Missing / Stale / Valid decision      |
//! | [`acquire`] | download, digest verification, extraction               |
//! | [`store`]   | `Store` trait over the filesystem, `LocalStore`          |
//! | [`error`]   | `CacheError`                                             |
//!
//! ## Persistence
//!
//! The directory tree is the only state. Nothing is remembered between
//! calls: every `ensure_partition` re-derives the decision from disk.
//! Partitions are handled one at a time, in table order.
mod acquire;
mod error;
mod state;
mod store;

use config::{CacheConfig, PartitionSpec, PartitionTable};
use fetch::Transport;
use tracing::info;

pub use error::CacheError;
pub use state::PartitionState;
pub use store::{LocalStore, Store};

/// Target name that selects every partition in [`DatasetCache::fetch`].
pub const ALL_PARTITIONS: &str = "all";

/// What [`DatasetCache::ensure_partition`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The local directory already matched the expected manifest.
    AlreadyValid,
    /// The directory was absent; the archive was downloaded and extracted.
    Downloaded,
    /// The directory was stale; it was removed and re-acquired.
    Refreshed,
}

/// The dataset cache for one project root.
///
/// Generic over the [`Transport`] used to fetch archives and the [`Store`]
/// that answers questions about the local directory tree, so both can be
/// replaced in tests.
pub struct DatasetCache<T, S = LocalStore> {
    pub(crate) config: CacheConfig,
    pub(crate) table: PartitionTable,
    pub(crate) transport: T,
    pub(crate) store: S,
}

impl<T, S> std::fmt::Debug for DatasetCache<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("root", &self.config.root)
            .field("data_dir", &self.config.data_dir)
            .field("manifest_path", &self.config.manifest_path)
            .field("partitions", &self.table.names())
            .finish()
    }
}

impl<T: Transport> DatasetCache<T, LocalStore> {
    /// Creates a cache over the real filesystem.
    pub fn new(config: CacheConfig, table: PartitionTable, transport: T) -> Self {
        Self::with_store(config, table, transport, LocalStore)
    }
}

impl<T: Transport, S: Store> DatasetCache<T, S> {
    /// Creates a cache with an explicit filesystem accessor.
    pub fn with_store(config: CacheConfig, table: PartitionTable, transport: T, store: S) -> Self {
        Self {
            config,
            table,
            transport,
            store,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &PartitionTable {
        &self.table
    }

    /// Resolves a partition name against the table.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidPartition`] listing the valid names.
    pub fn partition(&self, name: &str) -> Result<&PartitionSpec, CacheError> {
        self.table
            .get(name)
            .ok_or_else(|| CacheError::InvalidPartition {
                name: name.to_string(),
                valid: self.table.names().into_iter().map(String::from).collect(),
            })
    }

    /// Makes sure the named partition is present and matches the expected
    /// manifest, downloading it if it is missing or stale.
    ///
    /// On success the partition directory satisfies the manifest invariant.
    /// A valid partition returns without any network access.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidPartition`] for unknown names (no I/O done).
    /// - [`CacheError::CorruptDownload`] if the archive digest mismatches;
    ///   the staged archive has already been removed.
    /// - [`CacheError::Transport`], [`CacheError::Filesystem`],
    ///   [`CacheError::Manifest`], [`CacheError::Archive`] propagated as-is.
    pub fn ensure_partition(&self, name: &str) -> Result<Outcome, CacheError> {
        let spec = self.partition(name)?;
        let dir = self.config.partition_dir(spec.name());

        match self.inspect(spec)? {
            PartitionState::Valid => {
                info!(partition = spec.name(), "partition is up to date");
                Ok(Outcome::AlreadyValid)
            }
            PartitionState::Missing => {
                self.acquire(spec)?;
                Ok(Outcome::Downloaded)
            }
            PartitionState::Stale(_) => {
                info!(partition = spec.name(), dir = %dir.display(), "removing stale partition");
                self.store
                    .remove_tree(&dir)
                    .map_err(|source| CacheError::fs(&dir, source))?;
                self.acquire(spec)?;
                Ok(Outcome::Refreshed)
            }
        }
    }

    /// Runs [`ensure_partition`](Self::ensure_partition) for every partition
    /// in table order, stopping at the first failure.
    ///
    /// Returns the outcome of each partition, in table order.
    pub fn ensure_all(&self) -> Result<Vec<Outcome>, CacheError> {
        let mut outcomes = Vec::with_capacity(self.table.len());
        for spec in self.table.iter() {
            outcomes.push(self.ensure_partition(spec.name())?);
        }
        Ok(outcomes)
    }

    /// Entry point for the command line: [`ALL_PARTITIONS`] ensures every
    /// partition, any other value ensures that one partition.
    pub fn fetch(&self, target: &str) -> Result<Vec<Outcome>, CacheError> {
        if target == ALL_PARTITIONS {
            self.ensure_all()
        } else {
            Ok(vec![self.ensure_partition(target)?])
        }
    }
}

#[cfg(test)]
mod tests;
