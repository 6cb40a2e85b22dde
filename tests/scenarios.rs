//! End-to-end scenarios over a sled-backed store: submit, read back,
//! duplicate rejection, part-code minting and the close-case state machine.
#![allow(unused_imports)]

use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use tempfile::tempdir;

use defect_tracer::draft::{DefectDraft, PartCodeSelection};
use defect_tracer::error::{CloseError, StoreError, SubmitError};
use defect_tracer::filter::{self, FilterQuery};
use defect_tracer::record::{CaseStatus, DefectType};
use defect_tracer::service::{CloseRequest, DefectService};
use defect_tracer::store::{MemoryStore, RecordStore, RowHandle, SledStore};

// Sled uses file-based locking to prevent concurrent access, so each test
// opens its own database on a temp dir for simplified cleanup.
fn sled_service(name: &str) -> anyhow::Result<(tempfile::TempDir, DefectService)> {
    let temp_dir = tempdir()?;
    let db = sled::open(temp_dir.path().join(name))?;
    let store = SledStore::open(Arc::new(db))?;
    Ok((temp_dir, DefectService::new(Arc::new(store))))
}

fn bracket_draft() -> DefectDraft {
    DefectDraft::new()
        .set_customer("Acme Industrial")
        .set_part_code(PartCodeSelection::NewEntry("bracket assembly".into()))
        .set_do_number("DO-1042")
        .set_quantity(5)
        .set_unit_cost_cents(10_00)
        .set_defect_type(DefectType::Rework)
        .set_description("Mounting holes off-centre")
        .set_action_taken("Re-drilled and deburred")
        .set_submitter("Lee")
        .acknowledge()
}

#[test]
fn submit_persists_and_reads_back() -> anyhow::Result<()> {
    let (_guard, service) = sled_service("submit_reads_back.db")?;
    let mut session = service.open_session("qa@example.com")?;

    let submitted = service
        .submit(&mut session, bracket_draft())
        .context("first submission failed")?;

    // First submission of the day: sequence 01, derived total 50.00.
    let expected_prefix = Local::now().format("%d%m%Y").to_string();
    assert_eq!(submitted.case_number, format!("{expected_prefix}-01"));
    assert_eq!(submitted.total_cost_cents, 50_00);
    assert_eq!(submitted.status, CaseStatus::Open);
    assert_eq!(submitted.part_code, "Bracket Assembly");
    assert_eq!(submitted.owner_account, "qa@example.com");

    // A fresh session reloads the same record from the store.
    let reloaded = service.open_session("qa@example.com")?;
    assert_eq!(reloaded.records.len(), 1);
    assert_eq!(reloaded.records[0], submitted);
    assert_eq!(reloaded.catalog, vec!["Bracket Assembly".to_string()]);

    Ok(())
}

#[test]
fn same_day_duplicate_is_rejected() -> anyhow::Result<()> {
    let (_guard, service) = sled_service("duplicate.db")?;
    let mut session = service.open_session("qa@example.com")?;

    service.submit(&mut session, bracket_draft())?;
    let before = session.records.len();

    // Identical resubmission, now selecting the minted code.
    let resubmit = bracket_draft()
        .set_part_code(PartCodeSelection::Existing("Bracket Assembly".into()));
    let err = service.submit(&mut session, resubmit).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SubmitError>(),
        Some(SubmitError::Duplicate)
    ));

    // Rejection happened before any side effect.
    assert_eq!(session.records.len(), before);
    let reloaded = service.open_session("qa@example.com")?;
    assert_eq!(reloaded.records.len(), before);

    Ok(())
}

#[test]
fn case_numbers_increase_within_a_day() -> anyhow::Result<()> {
    let (_guard, service) = sled_service("case_numbers.db")?;
    let mut session = service.open_session("qa@example.com")?;

    let first = service.submit(&mut session, bracket_draft())?;
    let second = service.submit(
        &mut session,
        bracket_draft()
            .set_part_code(PartCodeSelection::Existing("Bracket Assembly".into()))
            .set_do_number("DO-1043"),
    )?;

    assert!(first.case_number.ends_with("-01"));
    assert!(second.case_number.ends_with("-02"));
    Ok(())
}

#[test]
fn close_case_is_terminal() -> anyhow::Result<()> {
    let (_guard, service) = sled_service("close_case.db")?;
    let mut session = service.open_session("qa@example.com")?;
    let submitted = service.submit(&mut session, bracket_draft())?;

    let request = CloseRequest {
        comment: String::new(),
        closed_by: "Tan".to_string(),
        confirmed: true,
    };
    let closed = service
        .close_case(&mut session, &submitted.case_number, &request)
        .context("close failed")?;

    assert_eq!(closed.status, CaseStatus::Closed);
    assert_eq!(closed.comments, "N/A");
    assert_eq!(closed.closed_by, "Tan");
    assert_eq!(closed.closed_at, Local::now().format("%d/%m/%Y").to_string());

    // The closure cells made it to the store.
    let reloaded = service.open_session("qa@example.com")?;
    assert_eq!(reloaded.records[0], closed);

    // Closed is terminal: a second close is refused outright.
    let err = service
        .close_case(&mut session, &submitted.case_number, &request)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CloseError>(),
        Some(CloseError::AlreadyClosed(_))
    ));

    Ok(())
}

#[test]
fn ownership_scopes_views_but_not_numbering() -> anyhow::Result<()> {
    let (_guard, service) = sled_service("ownership.db")?;

    let mut first = service.open_session("a@example.com")?;
    service.submit(&mut first, bracket_draft())?;

    // The second account sees nothing of the first account's records...
    let mut second = service.open_session("b@example.com")?;
    assert_eq!(second.visible_records().count(), 0);
    assert!(second.case_numbers().is_empty());

    // ...but same-day numbering continues across accounts.
    let submitted = service.submit(
        &mut second,
        bracket_draft()
            .set_part_code(PartCodeSelection::Existing("Bracket Assembly".into()))
            .set_do_number("DO-2000"),
    )?;
    assert!(submitted.case_number.ends_with("-02"));
    assert_eq!(second.visible_records().count(), 1);

    let outcome = filter::run(second.visible_records(), &FilterQuery::default());
    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].case_number, submitted.case_number);

    Ok(())
}

#[test]
fn empty_account_is_not_authenticated() -> anyhow::Result<()> {
    let (_guard, service) = sled_service("no_auth.db")?;
    assert!(service.open_session("  ").is_err());
    Ok(())
}

// A store whose writes fail, for checking that the cache never runs ahead of
// the backing table.
struct FailingStore(MemoryStore);

impl RecordStore for FailingStore {
    fn read_all_records(&self) -> Result<Vec<Vec<String>>, StoreError> {
        self.0.read_all_records()
    }
    fn read_catalog(&self) -> Result<Vec<String>, StoreError> {
        self.0.read_catalog()
    }
    fn append_row(&self, _row: &[String]) -> Result<(), StoreError> {
        Err(StoreError::Codec("simulated outage".to_string()))
    }
    fn append_catalog_entry(&self, name: &str) -> Result<(), StoreError> {
        self.0.append_catalog_entry(name)
    }
    fn find_row_by_key(&self, case_number: &str) -> Result<Option<RowHandle>, StoreError> {
        self.0.find_row_by_key(case_number)
    }
    fn update_cell(&self, handle: RowHandle, column: usize, value: &str) -> Result<(), StoreError> {
        self.0.update_cell(handle, column, value)
    }
}

#[test]
fn failed_append_leaves_cache_untouched() -> anyhow::Result<()> {
    let service = DefectService::new(Arc::new(FailingStore(MemoryStore::new())));
    let mut session = service.open_session("qa@example.com")?;

    let err = service.submit(&mut session, bracket_draft());
    assert!(err.is_err());
    assert!(session.records.is_empty());

    Ok(())
}
