//! Per-session read-through cache of records and the part-code catalog

use tracing::warn;

use crate::error::StoreError;
use crate::record::DefectRecord;
use crate::store::RecordStore;

/// The explicit context every core operation runs against: one authenticated
/// account plus the session's snapshot of the record table and catalog. Only
/// the service mutates it, and only after the backing write has succeeded.
#[derive(Debug)]
pub struct SessionContext {
    pub account: String,
    /// Every row the store holds, in store order. Ownership scoping happens
    /// at the view edge, not here: case numbering and duplicate detection
    /// must see all same-day rows regardless of owner.
    pub records: Vec<DefectRecord>,
    pub catalog: Vec<String>,
}

impl SessionContext {
    /// Read-through load of the full record table and catalog.
    pub fn load(store: &dyn RecordStore, account: &str) -> Result<Self, StoreError> {
        let rows = store.read_all_records()?;
        let total = rows.len();
        let records: Vec<DefectRecord> = rows
            .iter()
            .filter_map(|row| DefectRecord::from_row(row))
            .collect();
        if records.len() < total {
            warn!(
                skipped = total - records.len(),
                "skipped rows that failed to parse"
            );
        }
        let catalog = store.read_catalog()?;
        Ok(Self {
            account: account.to_string(),
            records,
            catalog,
        })
    }

    /// Records owned by this session's account, in store order. Everything a
    /// viewer may see flows through here.
    pub fn visible_records(&self) -> impl Iterator<Item = &DefectRecord> {
        self.records
            .iter()
            .filter(|r| r.owner_account == self.account)
    }

    /// Case numbers for the lookup selector, newest first.
    pub fn case_numbers(&self) -> Vec<String> {
        let mut numbers: Vec<String> = self
            .visible_records()
            .map(|r| r.case_number.clone())
            .collect();
        numbers.reverse();
        numbers
    }

    /// Look up one visible record by its case number.
    pub fn find_case(&self, case_number: &str) -> Option<&DefectRecord> {
        self.visible_records()
            .find(|r| r.case_number == case_number)
    }

    pub(crate) fn find_case_index(&self, case_number: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.owner_account == self.account && r.case_number == case_number)
    }
}
