//! Record store persisted as one CSV file per collection.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::record::Record;
use crate::store::RecordStore;
use crate::table::Table;

/// A validated collection name, used as the CSV file stem.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionName(String);

impl CollectionName {
    /// Parse and validate a collection name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidCollectionName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidCollectionName { name });
        }
        Ok(Self(name))
    }

    /// Return the collection name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A CSV-backed record store handle.
///
/// [`CsvStore::open`] loads `<dir>/<collection>.csv` into memory (creating
/// the directory if needed). Every mutation rewrites the file through a
/// temporary sibling and a rename, so the file on disk is always complete.
/// [`CsvStore::close`] consumes the handle; dropping it releases it too.
/// A handle that never mutated leaves the disk untouched.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    records: Vec<Record>,
    /// Set while the in-memory records differ from the file.
    dirty: bool,
}

impl CsvStore {
    /// Open (or create) a collection under `dir`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::StoreDirCreate`] | `dir` cannot be created |
    /// | [`IoError::ReadStore`] | the collection file exists but cannot be opened |
    /// | [`IoError::CsvParse`] | a row cannot be decoded as a record |
    #[instrument(skip_all, fields(dir = %dir.display(), collection = %collection))]
    pub fn open(dir: &Path, collection: &CollectionName) -> Result<Self, IoError> {
        fs::create_dir_all(dir).map_err(|e| IoError::StoreDirCreate {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = dir.join(format!("{}.csv", collection.as_str()));

        let records = if path.exists() {
            read_records(&path)?
        } else {
            Vec::new()
        };

        info!(path = %path.display(), n_records = records.len(), "store opened");
        Ok(Self {
            path,
            records,
            dirty: false,
        })
    }

    /// Return the path of the collection file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the handle, first retrying any write that previously failed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CsvWrite`] or [`IoError::WriteFile`] if the
    /// pending write fails.
    pub fn close(mut self) -> Result<(), IoError> {
        if self.dirty {
            self.persist()?;
        }
        debug!(path = %self.path.display(), "store closed");
        Ok(())
    }

    fn persist(&mut self) -> Result<(), IoError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &self.records {
            writer.serialize(record).map_err(|e| IoError::CsvWrite {
                path: self.path.clone(),
                source: e,
            })?;
        }
        let bytes = writer.into_inner().map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e.into_error(),
        })?;

        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, &bytes).map_err(|e| IoError::WriteFile {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        self.dirty = false;
        debug!(path = %self.path.display(), n_records = self.records.len(), "store persisted");
        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Vec<Record>, IoError> {
    let file = fs::File::open(path).map_err(|e| IoError::ReadStore {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    rdr.deserialize()
        .map(|row| {
            row.map_err(|e| IoError::CsvParse {
                path: path.to_path_buf(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })
        })
        .collect()
}

impl RecordStore for CsvStore {
    fn insert_many(&mut self, records: &[Record]) -> Result<bool, IoError> {
        self.records.extend_from_slice(records);
        self.dirty = true;
        self.persist()?;
        Ok(true)
    }

    fn delete_all(&mut self) -> Result<bool, IoError> {
        self.records.clear();
        self.dirty = true;
        self.persist()?;
        Ok(true)
    }

    fn count(&self) -> Result<usize, IoError> {
        Ok(self.records.len())
    }

    fn fetch_all(&self) -> Result<Table, IoError> {
        Ok(Table::from_records(&self.records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_valid() {
        let name = CollectionName::new("monsters_v2".to_string()).unwrap();
        assert_eq!(name.as_str(), "monsters_v2");
    }

    #[test]
    fn collection_name_rejects_empty() {
        assert!(matches!(
            CollectionName::new(String::new()),
            Err(IoError::InvalidCollectionName { .. })
        ));
    }

    #[test]
    fn collection_name_rejects_path_separators() {
        assert!(matches!(
            CollectionName::new("../etc".to_string()),
            Err(IoError::InvalidCollectionName { .. })
        ));
    }

    #[test]
    fn read_only_handle_leaves_disk_untouched() {
        let dir = tempfile::TempDir::new().unwrap();
        let name = CollectionName::new("absent".to_string()).unwrap();
        let store = CsvStore::open(dir.path(), &name).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.fetch_all().unwrap().is_empty());
        let path = store.path().to_path_buf();
        store.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn close_after_write_keeps_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let name = CollectionName::new("kept".to_string()).unwrap();
        let mut store = CsvStore::open(dir.path(), &name).unwrap();
        store
            .insert_many(&crate::CreatureGenerator::new(8).generate(4))
            .unwrap();
        let modified = fs::metadata(store.path()).unwrap().modified().unwrap();
        let path = store.path().to_path_buf();
        store.close().unwrap();
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
        assert_eq!(CsvStore::open(dir.path(), &name).unwrap().count().unwrap(), 4);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let name = CollectionName::new("broken".to_string()).unwrap();
        fs::write(
            dir.path().join("broken.csv"),
            "Name,Type,Level,Rarity,Damage,Health,Energy,Sanity,Timestamp\nImp,Fey,not-a-number,Common,1d4,1,1,1,t\n",
        )
        .unwrap();
        let err = CsvStore::open(dir.path(), &name).unwrap_err();
        assert!(matches!(err, IoError::CsvParse { .. }));
    }
}
