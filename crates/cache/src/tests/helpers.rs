use crate::*;
use checksum::Sha256Digest;
use config::{CacheConfig, PartitionSpec, PartitionTable};
use fetch::{Transport, TransportError};
use manifest::ManifestError;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Subjects present in every fixture partition.
pub const SUBJECTS: [&str; 2] = ["0051456", "0051457"];

pub fn url_for(name: &str) -> String {
    format!("https://mirror.test/record/3625740/files/{}.zip", name)
}

/// Path of one time-series file relative to the data directory.
pub fn entry_for(name: &str, subject: &str) -> String {
    format!("{name}/{subject}/run_1/{subject}_task-Rest_{name}.csv")
}

/// A zip laid out like the published archives: entries carry the
/// partition name as their first component.
pub fn archive_for(name: &str) -> Vec<u8> {
    let mut w = ZipWriter::new(Cursor::new(Vec::new()));
    for subject in SUBJECTS {
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        w.start_file(entry_for(name, subject), opts).unwrap();
        w.write_all(b"0.12,0.34,0.56\n").unwrap();
    }
    w.finish().unwrap().into_inner()
}

// -------------------- Fixture --------------------

/// A throwaway project root with a reference CSV and one archive per
/// partition, plus a table whose digests match those archives.
pub struct Fixture {
    pub root: TempDir,
    pub config: CacheConfig,
    pub table: PartitionTable,
    archives: HashMap<String, Vec<u8>>,
}

impl Fixture {
    pub fn new(names: &[&str]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = CacheConfig::from_root(root.path());

        let mut archives = HashMap::new();
        let mut specs = Vec::new();
        for name in names {
            let bytes = archive_for(name);
            let digest = Sha256Digest::of(&bytes).to_hex();
            specs.push(PartitionSpec::new(*name, url_for(name), &digest).unwrap());
            archives.insert(url_for(name), bytes);
        }

        let mut csv = String::from("subject_id");
        for name in names {
            csv.push(',');
            csv.push_str(name);
        }
        csv.push('\n');
        for subject in SUBJECTS {
            csv.push_str(subject);
            for name in names {
                csv.push_str(&format!(",./data/fmri/{}", entry_for(name, subject)));
            }
            csv.push('\n');
        }
        fs::create_dir_all(config.manifest_path.parent().unwrap()).unwrap();
        fs::write(&config.manifest_path, csv).unwrap();

        Self {
            root,
            config,
            table: PartitionTable::new(specs).unwrap(),
            archives,
        }
    }

    pub fn transport(&self) -> FakeTransport {
        FakeTransport::new(self.archives.clone())
    }

    pub fn cache<'a>(&self, transport: &'a FakeTransport) -> DatasetCache<&'a FakeTransport> {
        DatasetCache::new(self.config.clone(), self.table.clone(), transport)
    }

    pub fn partition_dir(&self, name: &str) -> PathBuf {
        self.config.partition_dir(name)
    }

    pub fn staging(&self, name: &str) -> PathBuf {
        self.config.staging_path(name)
    }

    pub fn file(&self, name: &str, subject: &str) -> PathBuf {
        self.config.data_dir.join(entry_for(name, subject))
    }

    /// Lays the partition out on disk as a successful download would.
    pub fn populate(&self, name: &str) {
        for subject in SUBJECTS {
            let path = self.file(name, subject);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"0.12,0.34,0.56\n").unwrap();
        }
    }

    /// Creates an extra file at manifest depth inside the partition.
    pub fn add_stray(&self, name: &str) -> PathBuf {
        let path = self.partition_dir(name).join("9999999/run_1/stray.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
        path
    }
}

// -------------------- Transports --------------------

/// Serves canned bodies by URL and records every request.
pub struct FakeTransport {
    bodies: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new(bodies: HashMap<String, Vec<u8>>) -> Self {
        Self {
            bodies,
            failing: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Replaces the body served for `url`.
    pub fn serve(mut self, url: String, body: &[u8]) -> Self {
        self.bodies.insert(url, body.to_vec());
        self
    }

    /// Makes requests for `url` fail after writing a partial body.
    pub fn fail(mut self, url: String) -> Self {
        self.failing.insert(url);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, TransportError> {
        self.calls.borrow_mut().push(url.to_string());

        let io_err = |source| TransportError::Io {
            path: dest.to_path_buf(),
            source,
        };

        if self.failing.contains(url) {
            fs::write(dest, b"PK\x03\x04trunc").map_err(io_err)?;
            return Err(TransportError::Status {
                url: url.to_string(),
                status: 503,
            });
        }

        let body = self.bodies.get(url).ok_or_else(|| TransportError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        fs::write(dest, body).map_err(io_err)?;
        Ok(body.len() as u64)
    }
}

/// Fails the test if the cache touches the network.
pub struct NoNetwork;

impl Transport for NoNetwork {
    fn download(&self, url: &str, _dest: &Path) -> Result<u64, TransportError> {
        panic!("unexpected download of {}", url);
    }
}

// -------------------- Stores --------------------

/// Fails the test on any filesystem access.
pub struct NoFilesystem;

impl Store for NoFilesystem {
    fn dir_exists(&self, path: &Path) -> io::Result<bool> {
        panic!("unexpected dir_exists({})", path.display());
    }

    fn list_paths(&self, root: &Path, _depth: usize) -> Result<Vec<PathBuf>, ManifestError> {
        panic!("unexpected list_paths({})", root.display());
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        panic!("unexpected remove_tree({})", path.display());
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        panic!("unexpected remove_file({})", path.display());
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        panic!("unexpected create_dir_all({})", path.display());
    }
}

/// Delegates to [`LocalStore`] and records the destructive calls.
#[derive(Default)]
pub struct RecordingStore {
    removed_trees: RefCell<Vec<PathBuf>>,
}

impl RecordingStore {
    pub fn removed_trees(&self) -> Vec<PathBuf> {
        self.removed_trees.borrow().clone()
    }
}

impl Store for RecordingStore {
    fn dir_exists(&self, path: &Path) -> io::Result<bool> {
        LocalStore.dir_exists(path)
    }

    fn list_paths(&self, root: &Path, depth: usize) -> Result<Vec<PathBuf>, ManifestError> {
        LocalStore.list_paths(root, depth)
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        self.removed_trees.borrow_mut().push(path.to_path_buf());
        LocalStore.remove_tree(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        LocalStore.remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        LocalStore.create_dir_all(path)
    }
}

/// Delegates to [`LocalStore`] but refuses every `remove_file` after the
/// first, as a read-only mount would once the download has started.
#[derive(Default)]
pub struct StickyStagingStore {
    removals: RefCell<usize>,
}

impl Store for StickyStagingStore {
    fn dir_exists(&self, path: &Path) -> io::Result<bool> {
        LocalStore.dir_exists(path)
    }

    fn list_paths(&self, root: &Path, depth: usize) -> Result<Vec<PathBuf>, ManifestError> {
        LocalStore.list_paths(root, depth)
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        LocalStore.remove_tree(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut removals = self.removals.borrow_mut();
        *removals += 1;
        if *removals > 1 {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only staging area",
            ));
        }
        LocalStore.remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        LocalStore.create_dir_all(path)
    }
}
