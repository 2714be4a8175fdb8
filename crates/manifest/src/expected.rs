//! Reference listing bundled with the dataset.
//!
//! The CSV has one row per subject and one column per partition; the first
//! column is the subject index. Cells hold paths relative to the project
//! root:
//!
//! ```text
//! subject_id,basc064,...,msdl,...
//! 0051456,./data/fmri/basc064/0051456/run_1/0051456_..._basc064.csv,...
//! ```
use std::fs::File;
use std::io::Read;
use std::path::Path;

use config::absolutize;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{Manifest, ManifestError};

/// The parsed reference CSV.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl ReferenceIndex {
    /// Reads and parses the CSV at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let file = File::open(path).map_err(|source| ManifestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ManifestError> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Partition columns, i.e. every header after the index column.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().skip(1)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The expected manifest for `partition`: every non-empty cell of its
    /// column, resolved against `root` and normalised.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::MissingColumn`] if the CSV has no such column.
    pub fn expected(&self, partition: &str, root: &Path) -> Result<Manifest, ManifestError> {
        let col = self
            .headers
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, h)| *h == partition)
            .map(|(i, _)| i)
            .ok_or_else(|| ManifestError::MissingColumn(partition.to_string()))?;

        let paths = self
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .filter(|cell| !cell.is_empty())
            .map(|cell| absolutize(Path::new(cell), root))
            .collect();

        Ok(Manifest::from_paths(paths))
    }
}
