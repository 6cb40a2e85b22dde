//! Multi-dimensional filtering over the cached record set

use crate::record::{CaseStatus, DefectRecord, DefectType, format_cents};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("")
}

/// Calendar scope of a filter. A month is only addressable under a year and a
/// day only under a month, so the illegal combinations cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateScope {
    #[default]
    Any,
    Year(i32),
    Month {
        year: i32,
        month: u32,
    },
    Day {
        year: i32,
        month: u32,
        day: u32,
    },
}

impl DateScope {
    fn matches(&self, ts: &crate::record::TimeStamp) -> bool {
        use chrono::Datelike;
        let date = ts.date();
        match *self {
            DateScope::Any => true,
            DateScope::Year(year) => date.year() == year,
            DateScope::Month { year, month } => date.year() == year && date.month() == month,
            DateScope::Day { year, month, day } => {
                date.year() == year && date.month() == month && date.day() == day
            }
        }
    }

    /// Prose fragment naming the scope, e.g. `" in June 2024"`.
    fn label(&self) -> String {
        match *self {
            DateScope::Any => String::new(),
            DateScope::Year(year) => format!(" in {year}"),
            DateScope::Month { year, month } => format!(" in {} {year}", month_name(month)),
            DateScope::Day { year, month, day } => {
                format!(" in {day} {} {year}", month_name(month))
            }
        }
    }
}

/// The filter predicates, each defaulting to match-all. An empty part-code
/// set matches every row; `None` for type or status means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub part_codes: Vec<String>,
    pub defect_type: Option<DefectType>,
    pub status: Option<CaseStatus>,
    pub date: DateScope,
}

impl FilterQuery {
    pub fn is_unfiltered(&self) -> bool {
        self.part_codes.is_empty()
            && self.defect_type.is_none()
            && self.status.is_none()
            && self.date == DateScope::Any
    }

    fn matches(&self, record: &DefectRecord, ts: &crate::record::TimeStamp) -> bool {
        let match_part = self.part_codes.is_empty() || self.part_codes.contains(&record.part_code);
        let match_type = self.defect_type.is_none_or(|t| record.defect_type == t);
        let match_status = self.status.is_none_or(|s| record.status == s);
        match_part && match_type && match_status && self.date.matches(ts)
    }
}

/// A matched record projected for display: cost formatted to two decimals and
/// the timestamp reduced to its date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub case_number: String,
    pub customer: String,
    pub part_code: String,
    pub do_number: String,
    pub quantity: String,
    pub total_cost: String,
    pub defect_type: String,
    pub description: String,
    pub action_taken: String,
    pub submitter: String,
    pub status: String,
    pub submission_date: String,
}

impl DisplayRow {
    fn project(record: &DefectRecord, ts: &crate::record::TimeStamp) -> Self {
        Self {
            case_number: record.case_number.clone(),
            customer: record.customer.clone(),
            part_code: record.part_code.clone(),
            do_number: record.do_number.clone(),
            quantity: record.quantity.to_string(),
            total_cost: format_cents(record.total_cost_cents),
            defect_type: record.defect_type.as_str().to_string(),
            description: record.description.clone(),
            action_taken: record.action_taken.clone(),
            submitter: record.submitter.clone(),
            status: record.status.as_str().to_string(),
            submission_date: ts.date_string(),
        }
    }
}

/// Filter outcome: the sorted projected rows plus the summary totals and the
/// prose line describing the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub rows: Vec<DisplayRow>,
    pub total_cost_cents: u64,
    /// Only reported when the status predicate is "All"; a filtered status
    /// makes the count meaningless.
    pub open_cases: Option<usize>,
    pub summary: String,
}

/// Apply every set predicate with logical AND, newest first. Records whose
/// timestamp does not parse are skipped, never errored.
pub fn run<'a>(
    records: impl IntoIterator<Item = &'a DefectRecord>,
    query: &FilterQuery,
) -> FilterOutcome {
    let mut matched: Vec<(&DefectRecord, crate::record::TimeStamp)> = records
        .into_iter()
        .filter_map(|r| r.submitted_at().map(|ts| (r, ts)))
        .filter(|(r, ts)| query.matches(r, ts))
        .collect();

    // Stable sort: rows with the same timestamp keep their store order.
    matched.sort_by(|a, b| b.1.cmp(&a.1));

    let total_cost_cents = matched.iter().map(|(r, _)| r.total_cost_cents).sum();
    let open_cases = match query.status {
        None => Some(matched.iter().filter(|(r, _)| r.is_open()).count()),
        Some(_) => None,
    };

    let summary = summary_line(query, matched.len());
    let rows = matched
        .iter()
        .map(|(r, ts)| DisplayRow::project(r, ts))
        .collect();

    FilterOutcome {
        rows,
        total_cost_cents,
        open_cases,
        summary,
    }
}

fn summary_line(query: &FilterQuery, matched: usize) -> String {
    // An empty result always reads as "no submissions found", even when no
    // predicate is set.
    if query.is_unfiltered() && matched > 0 {
        return "Showing the latest records as of today.".to_string();
    }
    let scope = query.date.label();
    match matched {
        0 => format!("No submissions found{scope} that matched your filters."),
        1 => format!("There was 1 submission{scope} that matched your filters."),
        n => format!("There were {n} submissions{scope} that matched your filters."),
    }
}
