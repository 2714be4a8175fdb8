//! # Config - Dataset Cache Settings
//!
//! Holds the immutable settings the dataset cache is built from:
//!
//! - the **partition table**: every downloadable atlas partition with its
//!   archive URL and known-good SHA-256 digest, in a fixed iteration order;
//! - the **cache layout**: where the project root, the extracted data and the
//!   bundled expected-manifest CSV live on disk.
//!
//! Both are plain values. The binary builds them once at startup (optionally
//! from environment variables) and hands them to the cache, so tests can
//! substitute their own URLs, digests and directories.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! └── data/
//!     ├── fmri_filename.csv          expected manifest (one column per atlas)
//!     └── fmri/
//!         ├── msdl.zip.part          staged download (transient)
//!         └── msdl/
//!             └── <subject>/<run>/<file>
//! ```
//!
//! ## Environment
//!
//! ```text
//! FMRI_ROOT              project root                (default: current dir)
//! FMRI_ARCHIVE_BASE_URL  base URL of the archives    (default: Zenodo record)
//! ```
use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Base URL the atlas archives are served from.
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://zenodo.org/record/3625740/files";

/// Environment variable overriding the project root.
pub const ROOT_ENV: &str = "FMRI_ROOT";

/// Environment variable overriding the archive base URL.
pub const ARCHIVE_BASE_URL_ENV: &str = "FMRI_ARCHIVE_BASE_URL";

/// Name of the bundled expected-manifest CSV inside `<root>/data`.
pub const MANIFEST_FILENAME: &str = "fmri_filename.csv";

/// Suffix of a staged archive while it is being downloaded and verified.
pub const STAGING_SUFFIX: &str = ".zip.part";

/// The known atlases and the SHA-256 of their published archives.
const BUILTIN_PARTITIONS: [(&str, &str); 7] = [
    (
        "basc064",
        "75eb5ee72344d11f056551310a470d00227fac3e87b7205196f77042fcd434d0",
    ),
    (
        "basc122",
        "2d0d2c2338f9114877a0a1eb695e73f04fc664065d1fb75cff8d59f6516b0ec7",
    ),
    (
        "basc197",
        "68135bb8e89b5b3653e843745d8e5d0e92876a5536654eaeb9729c9a52ab00e9",
    ),
    (
        "craddock_scorr_mean",
        "634e0bb07beaae033a0f1615aa885ba4cb67788d4a6e472fd432a1226e01b49b",
    ),
    (
        "harvard_oxford_cort_prob_2mm",
        "638559dc4c7de25575edc02e58404c3f2600556239888cbd2e5887316def0e74",
    ),
    (
        "msdl",
        "fd241bd66183d5fc7bdf9a115d7aeb9a5fecff5801cd15a4e5aed72612916a97",
    ),
    (
        "power_2011",
        "d1e3cd8eaa867079fe6b24dfaee08bd3b2d9e0ebbd806a2a982db5407328990a",
    ),
];

/// Errors raised while building a partition table or cache layout.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A digest is not 64 hexadecimal characters.
    #[error("invalid sha256 digest for partition '{name}': {digest:?}")]
    InvalidDigest { name: String, digest: String },

    /// The same partition name appears twice in a table.
    #[error("duplicate partition '{0}'")]
    DuplicatePartition(String),

    /// The current working directory could not be determined.
    #[error("cannot determine working directory: {0}")]
    CurrentDir(#[from] io::Error),
}

/// One downloadable partition of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    name: String,
    url: String,
    /// Lowercase hex SHA-256 of the archive at `url`.
    sha256: String,
}

impl PartitionSpec {
    /// Creates a partition entry, validating that `sha256` is a 256-bit hex
    /// digest. The digest is stored lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDigest`] if `sha256` is not 64 hex chars.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        sha256: &str,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if sha256.len() != 64 || !sha256.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidDigest {
                name,
                digest: sha256.to_string(),
            });
        }
        Ok(Self {
            name,
            url: url.into(),
            sha256: sha256.to_ascii_lowercase(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Expected lowercase hex SHA-256 of the archive.
    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

/// Ordered, immutable set of partitions the cache knows about.
///
/// Iteration order is insertion order; `ensure_all` walks it front to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    partitions: Vec<PartitionSpec>,
}

impl PartitionTable {
    /// Builds a table from explicit entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicatePartition`] if two entries share a name.
    pub fn new(partitions: Vec<PartitionSpec>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for p in &partitions {
            if !seen.insert(p.name.as_str()) {
                return Err(ConfigError::DuplicatePartition(p.name.clone()));
            }
        }
        Ok(Self { partitions })
    }

    /// The seven published atlases served from [`DEFAULT_ARCHIVE_BASE_URL`].
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_base_url(DEFAULT_ARCHIVE_BASE_URL)
    }

    /// The published atlases served from a different base URL (e.g. a
    /// mirror). Digests are unchanged: the mirror must serve identical bytes.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let partitions = BUILTIN_PARTITIONS
            .iter()
            .map(|(name, sha256)| PartitionSpec {
                name: (*name).to_string(),
                url: format!("{}/{}.zip", base, name),
                sha256: (*sha256).to_string(),
            })
            .collect();
        Self { partitions }
    }

    /// The builtin table, honouring `FMRI_ARCHIVE_BASE_URL` if set.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(ARCHIVE_BASE_URL_ENV) {
            Ok(base) if !base.trim().is_empty() => Self::with_base_url(base.trim()),
            _ => Self::builtin(),
        }
    }

    /// Looks up a partition by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PartitionSpec> {
        self.partitions.iter().find(|p| p.name == name)
    }

    /// Partition names in iteration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.partitions.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartitionSpec> {
        self.partitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// On-disk layout of the cache, all paths absolute and normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Project root; relative paths in the expected manifest resolve here.
    pub root: PathBuf,
    /// Directory holding one subdirectory per partition.
    pub data_dir: PathBuf,
    /// The bundled expected-manifest CSV.
    pub manifest_path: PathBuf,
}

impl CacheConfig {
    /// Derives the standard layout under `root`.
    ///
    /// A relative `root` is resolved against the current working directory
    /// by [`CacheConfig::from_env`]; here it is only lexically normalised.
    pub fn from_root<P: AsRef<Path>>(root: P) -> Self {
        let root = normalize(root.as_ref());
        let data = root.join("data");
        Self {
            data_dir: data.join("fmri"),
            manifest_path: data.join(MANIFEST_FILENAME),
            root,
        }
    }

    /// Builds the layout from `FMRI_ROOT`, defaulting to the current
    /// working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CurrentDir`] if the working directory cannot be
    /// read.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()?;
        let root = match std::env::var(ROOT_ENV) {
            Ok(dir) if !dir.trim().is_empty() => absolutize(Path::new(dir.trim()), &cwd),
            _ => cwd,
        };
        Ok(Self::from_root(root))
    }

    /// Directory the named partition is extracted into.
    #[must_use]
    pub fn partition_dir(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Where the named partition's archive is staged during download.
    #[must_use]
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}", name, STAGING_SUFFIX))
    }
}

/// Resolves `path` against `base` (when relative) and normalises the result.
#[must_use]
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Lexically normalises a path: drops `.` components and folds `..` into
/// its parent. Symlinks are not resolved and the filesystem is not touched.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // ".." at the root stays at the root
                let leading = matches!(out.components().next_back(), Some(Component::ParentDir))
                    || out.as_os_str().is_empty();
                if leading {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
