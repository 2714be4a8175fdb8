//! # Checksum - Archive Digests and Manifest Fingerprints
//!
//! Two kinds of SHA-256 hash are used by the dataset cache:
//!
//! - a **digest** of a downloaded archive's bytes, compared against the
//!   partition's published value to detect corrupt downloads;
//! - a **fingerprint** of a manifest (a sorted list of paths), compared
//!   between the on-disk tree and the bundled reference to decide whether a
//!   partition directory is still intact.
//!
//! ## Fingerprint Encoding
//!
//! ```text
//! sha256( path_0 "\n" path_1 "\n" ... "\n" path_n )
//! ```
//!
//! Paths are taken in the order given (callers sort them first with
//! [`sort_paths`], which orders by string bytes) and encoded as UTF-8; non-UTF-8 components are replaced lossily. The encoding is
//! explicit so two implementations agree on the value; callers should only
//! rely on equality.
//!
//! ## Example
//!
//! ```rust,no_run
//! use checksum::{sha256_file, Sha256Digest};
//!
//! let actual = sha256_file("data/fmri/msdl.zip.part").unwrap();
//! let expected = Sha256Digest::from_hex(
//!     "fd241bd66183d5fc7bdf9a115d7aeb9a5fecff5801cd15a4e5aed72612916a97",
//! ).unwrap();
//! assert_eq!(actual, expected);
//! ```
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Size of each read when streaming a file through the hasher.
pub const CHUNK_SIZE: usize = 8192;

/// A hex string that does not encode exactly 32 bytes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid sha256 hex digest: {0:?}")]
pub struct ParseDigestError(pub String);

/// A 256-bit SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Hashes an in-memory byte slice.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Lowercase hex encoding (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, ParseDigestError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseDigestError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.to_hex())
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Sha256Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Streams `reader` through SHA-256 in [`CHUNK_SIZE`] reads.
///
/// Memory use is constant regardless of input size.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<Sha256Digest> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Sha256Digest(hasher.finalize().into()))
}

/// Computes the SHA-256 of the file at `path` without loading it into memory.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> io::Result<Sha256Digest> {
    let file = File::open(path.as_ref())?;
    sha256_reader(file)
}

/// Fingerprints a path list using the newline-joined encoding described in
/// the crate docs. The caller is responsible for sorting.
#[must_use]
pub fn fingerprint<P: AsRef<Path>>(paths: &[P]) -> Sha256Digest {
    let mut hasher = Sha256::new();
    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(path.as_ref().to_string_lossy().as_bytes());
    }
    Sha256Digest(hasher.finalize().into())
}

/// Orders two paths by the string form [`fingerprint`] hashes.
///
/// `Path`'s own `Ord` compares component by component, so `run_1/a` sorts
/// before `run_1-b/a` even though `'-' < '/'` as bytes.
#[must_use]
pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    a.to_string_lossy().cmp(&b.to_string_lossy())
}

/// Sorts `paths` lexicographically by their string form.
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| compare_paths(a, b));
}

/// Sorts `paths` and fingerprints the result.
#[must_use]
pub fn fingerprint_sorted(mut paths: Vec<PathBuf>) -> Sha256Digest {
    sort_paths(&mut paths);
    fingerprint(&paths)
}
