//! Service layer driving every store mutation: submit and close

use std::sync::Arc;

use tracing::info;

use crate::draft::{DefectDraft, PartCodeSelection};
use crate::error::{CloseError, SessionError, SubmitError, Violation};
use crate::record::{CaseStatus, DefectRecord, TimeStamp, col, next_case_number};
use crate::session::SessionContext;
use crate::store::RecordStore;
use crate::utils::has_alphanumeric;

/// A close-case request: optional comment, the closer's name and the
/// irreversibility acknowledgment.
#[derive(Debug, Clone, Default)]
pub struct CloseRequest {
    pub comment: String,
    pub closed_by: String,
    pub confirmed: bool,
}

pub struct DefectService {
    store: Arc<dyn RecordStore>,
}

impl DefectService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Open a session for an authenticated account. An empty account means
    /// the identity collaborator supplied nothing; no operation may proceed.
    pub fn open_session(&self, account: &str) -> anyhow::Result<SessionContext> {
        if account.trim().is_empty() {
            return Err(SessionError::NotAuthenticated.into());
        }
        Ok(SessionContext::load(&*self.store, account)?)
    }

    /// Submit a draft: validate, reject duplicates, mint the case number and
    /// persist. The cache is only touched after the store write returns, so a
    /// failed append leaves cache and store consistent.
    pub fn submit(
        &self,
        ctx: &mut SessionContext,
        draft: DefectDraft,
    ) -> anyhow::Result<DefectRecord> {
        let violations = draft.validate(&ctx.catalog);
        if !violations.is_empty() {
            return Err(SubmitError::Rejected(violations).into());
        }

        let now = TimeStamp::now();
        if draft.is_duplicate(&ctx.records, now.date()) {
            return Err(SubmitError::Duplicate.into());
        }

        let part_code = draft
            .resolved_part_code()
            .ok_or_else(|| anyhow::anyhow!("no part code on a validated draft"))?;

        // A new part code is appended to the catalog store first, then
        // mirrored into the cache.
        if matches!(draft.part_code, PartCodeSelection::NewEntry(_)) {
            self.store.append_catalog_entry(&part_code)?;
            ctx.catalog.push(part_code.clone());
        }

        let case_number = next_case_number(&ctx.records, now.date());
        let record = DefectRecord {
            case_number: case_number.clone(),
            customer: draft.customer.clone(),
            part_code,
            do_number: draft.do_number.clone(),
            quantity: draft.quantity,
            total_cost_cents: draft.total_cost_cents(),
            defect_type: draft.defect_type,
            description: draft.description.clone(),
            action_taken: draft.action_taken.clone(),
            submitter: draft.submitter.clone(),
            timestamp: now.to_store_string(),
            status: CaseStatus::Open,
            comments: String::new(),
            closed_by: String::new(),
            closed_at: String::new(),
            owner_account: ctx.account.clone(),
        };

        self.store.append_row(&record.to_row())?;
        ctx.records.push(record.clone());

        info!(case_number = %case_number, account = %ctx.account, "defect submitted");
        Ok(record)
    }

    /// Close an open case: check the preconditions, locate the row in the
    /// backing store and write the four closure cells, then update the cache.
    /// Closed is terminal; a second close is refused before any write.
    pub fn close_case(
        &self,
        ctx: &mut SessionContext,
        case_number: &str,
        request: &CloseRequest,
    ) -> anyhow::Result<DefectRecord> {
        let index = ctx
            .find_case_index(case_number)
            .ok_or_else(|| CloseError::UnknownCase(case_number.to_string()))?;
        if !ctx.records[index].is_open() {
            return Err(CloseError::AlreadyClosed(case_number.to_string()).into());
        }

        let mut violations = Vec::new();
        if !request.comment.trim().is_empty() && !has_alphanumeric(&request.comment) {
            violations.push(Violation::CommentNotAlphanumeric);
        }
        if request.closed_by.trim().is_empty() {
            violations.push(Violation::ClosedByMissing);
        } else if !has_alphanumeric(&request.closed_by) {
            violations.push(Violation::ClosedByNotAlphanumeric);
        }
        if !request.confirmed {
            violations.push(Violation::CloseNotAcknowledged);
        }
        if !violations.is_empty() {
            return Err(CloseError::Rejected(violations).into());
        }

        // The case is in the cache but must also be locatable in the store;
        // a miss here aborts with no cell writes.
        let handle = self
            .store
            .find_row_by_key(case_number)?
            .ok_or_else(|| CloseError::RowMissing(case_number.to_string()))?;

        let comment = if request.comment.trim().is_empty() {
            "N/A".to_string()
        } else {
            request.comment.clone()
        };
        let closed_at = TimeStamp::now().date_string();

        self.store
            .update_cell(handle, col::STATUS, CaseStatus::Closed.as_str())?;
        self.store.update_cell(handle, col::COMMENTS, &comment)?;
        self.store
            .update_cell(handle, col::CLOSED_BY, &request.closed_by)?;
        self.store
            .update_cell(handle, col::DATE_CLOSED, &closed_at)?;

        let record = &mut ctx.records[index];
        record.status = CaseStatus::Closed;
        record.comments = comment;
        record.closed_by = request.closed_by.clone();
        record.closed_at = closed_at;

        info!(case_number, closed_by = %request.closed_by, "case closed");
        Ok(record.clone())
    }
}
