//! Record store adapter: the append-only row table behind every session

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::StoreError;

/// Opaque handle to a located row, as returned by `find_row_by_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle(u64);

/// The backing table contract: an ordered, append-only sequence of rows with
/// cell-addressable updates, plus the part-code catalog column. Row order is
/// append order and never changes.
pub trait RecordStore {
    fn read_all_records(&self) -> Result<Vec<Vec<String>>, StoreError>;
    fn read_catalog(&self) -> Result<Vec<String>, StoreError>;
    fn append_row(&self, row: &[String]) -> Result<(), StoreError>;
    fn append_catalog_entry(&self, name: &str) -> Result<(), StoreError>;
    fn find_row_by_key(&self, case_number: &str) -> Result<Option<RowHandle>, StoreError>;
    fn update_cell(&self, handle: RowHandle, column: usize, value: &str)
    -> Result<(), StoreError>;
}

/// Sled-backed store. Rows live in one tree keyed by a big-endian append
/// index, CBOR-encoded as string arrays; the catalog lives in a second tree
/// under the same scheme.
pub struct SledStore {
    records: sled::Tree,
    catalog: sled::Tree,
}

impl SledStore {
    pub fn open(db: Arc<sled::Db>) -> Result<Self, StoreError> {
        Ok(Self {
            records: db.open_tree("records")?,
            catalog: db.open_tree("catalog")?,
        })
    }

    fn next_index(tree: &sled::Tree) -> Result<u64, StoreError> {
        match tree.last()? {
            Some((key, _)) => {
                let bytes: [u8; 8] = key
                    .as_ref()
                    .try_into()
                    .map_err(|_| StoreError::Codec("malformed row key".to_string()))?;
                Ok(u64::from_be_bytes(bytes) + 1)
            }
            None => Ok(0),
        }
    }

    fn decode_row(bytes: &[u8]) -> Result<Vec<String>, StoreError> {
        minicbor::decode(bytes).map_err(|e| StoreError::Codec(e.to_string()))
    }

    fn encode_row(row: &[String]) -> Result<Vec<u8>, StoreError> {
        minicbor::to_vec(row).map_err(|e| StoreError::Codec(e.to_string()))
    }
}

impl RecordStore for SledStore {
    fn read_all_records(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let mut rows = Vec::new();
        for entry in self.records.iter() {
            let (_, value) = entry?;
            rows.push(Self::decode_row(&value)?);
        }
        Ok(rows)
    }

    fn read_catalog(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = Vec::new();
        for entry in self.catalog.iter() {
            let (_, value) = entry?;
            let name = String::from_utf8(value.to_vec())
                .map_err(|e| StoreError::Codec(e.to_string()))?;
            entries.push(name);
        }
        Ok(entries)
    }

    fn append_row(&self, row: &[String]) -> Result<(), StoreError> {
        let index = Self::next_index(&self.records)?;
        self.records
            .insert(index.to_be_bytes(), Self::encode_row(row)?)?;
        debug!(index, "appended record row");
        Ok(())
    }

    fn append_catalog_entry(&self, name: &str) -> Result<(), StoreError> {
        let index = Self::next_index(&self.catalog)?;
        self.catalog.insert(index.to_be_bytes(), name.as_bytes())?;
        debug!(index, name, "appended catalog entry");
        Ok(())
    }

    fn find_row_by_key(&self, case_number: &str) -> Result<Option<RowHandle>, StoreError> {
        for entry in self.records.iter() {
            let (key, value) = entry?;
            let row = Self::decode_row(&value)?;
            if row.first().map(String::as_str) == Some(case_number) {
                let bytes: [u8; 8] = key
                    .as_ref()
                    .try_into()
                    .map_err(|_| StoreError::Codec("malformed row key".to_string()))?;
                return Ok(Some(RowHandle(u64::from_be_bytes(bytes))));
            }
        }
        Ok(None)
    }

    fn update_cell(
        &self,
        handle: RowHandle,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let key = handle.0.to_be_bytes();
        let stored = self
            .records
            .get(key)?
            .ok_or(StoreError::MissingRow(handle.0))?;
        let mut row = Self::decode_row(&stored)?;
        if column >= row.len() {
            return Err(StoreError::ColumnOutOfRange(column));
        }
        row[column] = value.to_string();
        self.records.insert(key, Self::encode_row(&row)?)?;
        debug!(row = handle.0, column, "updated cell");
        Ok(())
    }
}

/// In-memory store used by tests and examples. Same contract, no durability.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Vec<String>>>,
    catalog: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with pre-existing rows, e.g. historical records in tests.
    pub fn with_rows(rows: Vec<Vec<String>>, catalog: Vec<String>) -> Self {
        Self {
            records: Mutex::new(rows),
            catalog: Mutex::new(catalog),
        }
    }
}

// Rows are plain data, so a poisoned lock still holds a usable value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordStore for MemoryStore {
    fn read_all_records(&self) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(lock(&self.records).clone())
    }

    fn read_catalog(&self) -> Result<Vec<String>, StoreError> {
        Ok(lock(&self.catalog).clone())
    }

    fn append_row(&self, row: &[String]) -> Result<(), StoreError> {
        lock(&self.records).push(row.to_vec());
        Ok(())
    }

    fn append_catalog_entry(&self, name: &str) -> Result<(), StoreError> {
        lock(&self.catalog).push(name.to_string());
        Ok(())
    }

    fn find_row_by_key(&self, case_number: &str) -> Result<Option<RowHandle>, StoreError> {
        let records = lock(&self.records);
        Ok(records
            .iter()
            .position(|row| row.first().map(String::as_str) == Some(case_number))
            .map(|i| RowHandle(i as u64)))
    }

    fn update_cell(
        &self,
        handle: RowHandle,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut records = lock(&self.records);
        let row = records
            .get_mut(handle.0 as usize)
            .ok_or(StoreError::MissingRow(handle.0))?;
        if column >= row.len() {
            return Err(StoreError::ColumnOutOfRange(column));
        }
        row[column] = value.to_string();
        Ok(())
    }
}
