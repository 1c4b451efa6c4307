//! The record store interface and an in-memory implementation.

use crate::IoError;
use crate::record::Record;
use crate::table::Table;

/// A durable collection of labeled creature records.
///
/// Handles are constructed explicitly and passed to whatever assembles a
/// training table. Mutations return the store's acknowledgement.
pub trait RecordStore {
    /// Append `records` to the collection.
    ///
    /// # Errors
    ///
    /// Implementation-specific persistence failures.
    fn insert_many(&mut self, records: &[Record]) -> Result<bool, IoError>;

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Implementation-specific persistence failures.
    fn delete_all(&mut self) -> Result<bool, IoError>;

    /// Return the number of stored records.
    ///
    /// # Errors
    ///
    /// Implementation-specific read failures.
    fn count(&self) -> Result<usize, IoError>;

    /// Return every record as a table with the columns of [`Record::COLUMNS`].
    ///
    /// # Errors
    ///
    /// Implementation-specific read failures.
    fn fetch_all(&self) -> Result<Table, IoError>;
}

/// Record store backed by a `Vec`. Contents vanish with the value.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<Record>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the stored records.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl RecordStore for MemoryStore {
    fn insert_many(&mut self, records: &[Record]) -> Result<bool, IoError> {
        self.records.extend_from_slice(records);
        Ok(true)
    }

    fn delete_all(&mut self) -> Result<bool, IoError> {
        self.records.clear();
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
    use crate::generator::CreatureGenerator;

    #[test]
    fn insert_count_fetch_delete() {
        let mut store = MemoryStore::new();
        let records = CreatureGenerator::new(3).generate(7);
        assert!(store.insert_many(&records).unwrap());
        assert_eq!(store.count().unwrap(), 7);

        let table = store.fetch_all().unwrap();
        assert_eq!(table.n_rows(), 7);
        assert!(table.column("Rarity").is_some());

        assert!(store.delete_all().unwrap());
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.fetch_all().unwrap().is_empty());
    }
}
