//! Draft submissions: builder, validation rules and duplicate detection

use chrono::NaiveDate;

use crate::error::Violation;
use crate::record::{DefectRecord, DefectType, business_fingerprint};
use crate::utils::{has_alphanumeric, title_case};

/// How the draft names its part code. Picking nothing is representable here
/// because the validator has to report it, but it can never reach a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartCodeSelection {
    #[default]
    None,
    Existing(String),
    NewEntry(String),
}

/// A candidate submission before validation. Construct with the setter chain,
/// then `validate` against the part-code catalog.
#[derive(Debug, Clone, Default)]
pub struct DefectDraft {
    pub customer: String,
    pub part_code: PartCodeSelection,
    pub do_number: String,
    pub quantity: u32,
    pub unit_cost_cents: u64,
    pub defect_type: DefectType,
    pub description: String,
    pub action_taken: String,
    pub submitter: String,
    pub acknowledged: bool,
}

impl DefectDraft {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_customer(mut self, customer: &str) -> Self {
        self.customer = customer.to_string();
        self
    }
    pub fn set_part_code(mut self, selection: PartCodeSelection) -> Self {
        self.part_code = selection;
        self
    }
    pub fn set_do_number(mut self, do_number: &str) -> Self {
        self.do_number = do_number.to_string();
        self
    }
    pub fn set_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
    pub fn set_unit_cost_cents(mut self, cents: u64) -> Self {
        self.unit_cost_cents = cents;
        self
    }
    pub fn set_defect_type(mut self, defect_type: DefectType) -> Self {
        self.defect_type = defect_type;
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
    pub fn set_action_taken(mut self, action: &str) -> Self {
        self.action_taken = action.to_string();
        self
    }
    pub fn set_submitter(mut self, submitter: &str) -> Self {
        self.submitter = submitter.to_string();
        self
    }
    /// The explicit acknowledgment that a submission is final.
    pub fn acknowledge(mut self) -> Self {
        self.acknowledged = true;
        self
    }

    /// Total cost is always derived, never supplied. Saturates rather than
    /// overflowing for absurd quantity and unit-cost pairs.
    pub fn total_cost_cents(&self) -> u64 {
        (self.quantity as u64).saturating_mul(self.unit_cost_cents)
    }

    /// The part code this draft would store: existing codes verbatim, new
    /// entries title-cased the way the catalog keeps them.
    pub fn resolved_part_code(&self) -> Option<String> {
        match &self.part_code {
            PartCodeSelection::None => None,
            PartCodeSelection::Existing(code) => Some(code.clone()),
            PartCodeSelection::NewEntry(name) => Some(title_case(name.trim())),
        }
    }

    /// Check every business rule and collect the violations in fixed rule
    /// order. An empty result means the draft is clean.
    pub fn validate(&self, catalog: &[String]) -> Vec<Violation> {
        let mut violations = Vec::new();

        if self.customer.trim().is_empty() {
            violations.push(Violation::CustomerMissing);
        } else if !has_alphanumeric(&self.customer) {
            violations.push(Violation::CustomerNotAlphanumeric);
        }

        match &self.part_code {
            PartCodeSelection::None => violations.push(Violation::PartCodeNotSelected),
            PartCodeSelection::NewEntry(name) => {
                let name = title_case(name.trim());
                if name.is_empty() {
                    violations.push(Violation::NewPartCodeMissing);
                } else if catalog
                    .iter()
                    .any(|c| c.to_lowercase() == name.to_lowercase())
                {
                    violations.push(Violation::NewPartCodeExists);
                } else if name.to_lowercase() == "none" {
                    violations.push(Violation::NewPartCodeReserved);
                } else if !has_alphanumeric(&name) {
                    violations.push(Violation::NewPartCodeNotAlphanumeric);
                }
            }
            PartCodeSelection::Existing(code) => {
                if !catalog.contains(code) {
                    violations.push(Violation::UnknownPartCode);
                }
            }
        }

        if self.do_number.trim().is_empty() {
            violations.push(Violation::DoNumberMissing);
        } else if !has_alphanumeric(&self.do_number) {
            violations.push(Violation::DoNumberNotAlphanumeric);
        }

        if self.quantity == 0 && self.unit_cost_cents == 0 {
            violations.push(Violation::ZeroQuantityAndCost);
        } else if self.quantity == 0 {
            violations.push(Violation::ZeroQuantity);
        } else if self.unit_cost_cents == 0 {
            violations.push(Violation::ZeroCost);
        }

        // Both descriptions missing, or both without content, collapse into a
        // single combined violation; otherwise each is checked on its own.
        let desc_empty = self.description.trim().is_empty();
        let action_empty = self.action_taken.trim().is_empty();
        let desc_content = has_alphanumeric(&self.description);
        let action_content = has_alphanumeric(&self.action_taken);
        if desc_empty && action_empty {
            violations.push(Violation::DescriptionAndActionMissing);
        } else if !desc_content && !action_content {
            violations.push(Violation::DescriptionAndActionNotAlphanumeric);
        } else {
            if desc_empty {
                violations.push(Violation::DescriptionMissing);
            } else if !desc_content {
                violations.push(Violation::DescriptionNotAlphanumeric);
            }
            if action_empty {
                violations.push(Violation::ActionMissing);
            } else if !action_content {
                violations.push(Violation::ActionNotAlphanumeric);
            }
        }

        if self.submitter.trim().is_empty() {
            violations.push(Violation::SubmitterMissing);
        } else if !has_alphanumeric(&self.submitter) {
            violations.push(Violation::SubmitterNotAlphanumeric);
        }

        if !self.acknowledged {
            violations.push(Violation::NotAcknowledged);
        }

        violations
    }

    /// Fingerprint of the business fields this draft would persist. None if
    /// no part code is selected (such a draft never passes validation).
    pub fn fingerprint(&self) -> Option<String> {
        let part_code = self.resolved_part_code()?;
        Some(business_fingerprint(
            &self.customer,
            &part_code,
            &self.do_number,
            self.quantity,
            self.total_cost_cents(),
            self.defect_type,
            &self.description,
            &self.action_taken,
            &self.submitter,
        ))
    }

    /// A draft duplicates an existing record when that record was submitted
    /// today and every business field matches exactly. Identical submissions
    /// on different days are legitimate and pass.
    pub fn is_duplicate(&self, records: &[DefectRecord], today: NaiveDate) -> bool {
        let Some(fingerprint) = self.fingerprint() else {
            return false;
        };
        let today = today.format(crate::record::DATE_FMT).to_string();
        records
            .iter()
            .any(|r| r.submitted_date() == today && r.fingerprint() == fingerprint)
    }
}
