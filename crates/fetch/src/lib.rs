//! # Fetch - Archive Transport and Extraction
//!
//! Moves an atlas archive from its remote URL onto local disk and unpacks it.
//!
//! ```text
//!  url ──Transport::download──▶ <data_dir>/<name>.zip.part
//!                                       │
//!                       (digest verified by the cache)
//!                                       │
//!                                       ▼
//!                     extract_zip ──▶ <data_dir>/<name>/...
//! ```
//!
//! The [`Transport`] trait is the seam the cache is tested through: the real
//! [`HttpTransport`] streams the response body to disk, test doubles write
//! canned bytes and count calls. Neither retries.
mod archive;
mod http;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use archive::{extract_zip, ArchiveError};
pub use http::HttpTransport;

/// Network-level failure while fetching an archive.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be written to the destination file.
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Downloads a URL to a local file.
///
/// Implementations must create or truncate `dest` and write the full body
/// to it, returning the number of bytes written. A failed download may
/// leave a partial file behind; the caller owns cleanup.
pub trait Transport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, TransportError> {
        (**self).download(url, dest)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, TransportError> {
        (**self).download(url, dest)
    }
}
