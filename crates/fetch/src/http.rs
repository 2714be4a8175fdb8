use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::{Transport, TransportError};

/// Connection attempts give up after this long; transfers themselves are
/// not time-limited because archives run to hundreds of megabytes.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP(S) transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport with the default client settings.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("fetch-fmri/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client (e.g. one configured with a proxy).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, TransportError> {
        let request_err = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };
        let io_err = |source| TransportError::Io {
            path: dest.to_path_buf(),
            source,
        };

        info!(url, dest = %dest.display(), "downloading archive");
        let mut response = self.client.get(url).send().map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = File::create(dest).map_err(io_err)?;
        // copy_to streams in chunks; the body is never buffered whole
        let written = response.copy_to(&mut file).map_err(request_err)?;
        file.flush().map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        debug!(url, bytes = written, "download finished");
        Ok(written)
    }
}
