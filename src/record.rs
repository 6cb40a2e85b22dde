//! Core defect record types and the persisted 16-column row layout

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Timestamp wire format used by the backing table (24-hour clock).
pub const TIMESTAMP_FMT: &str = "%d/%m/%Y %H:%M:%S";
/// Date-only wire format (submission date, date closed, case-number prefix).
pub const DATE_FMT: &str = "%d/%m/%Y";

/// Column positions of the persisted record layout. Field order is fixed:
/// `append_row` writes them in this order and the close path updates cells
/// at these positions.
pub mod col {
    pub const CASE_NUMBER: usize = 0;
    pub const CUSTOMER: usize = 1;
    pub const PART_CODE: usize = 2;
    pub const DO_NUMBER: usize = 3;
    pub const QUANTITY: usize = 4;
    pub const COST: usize = 5;
    pub const DEFECT_TYPE: usize = 6;
    pub const DESCRIPTION: usize = 7;
    pub const ACTION: usize = 8;
    pub const SUBMITTER: usize = 9;
    pub const TIMESTAMP: usize = 10;
    pub const STATUS: usize = 11;
    pub const COMMENTS: usize = 12;
    pub const CLOSED_BY: usize = 13;
    pub const DATE_CLOSED: usize = 14;
    pub const ACCOUNT: usize = 15;
    pub const WIDTH: usize = 16;
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefectType {
    #[n(0)]
    #[default]
    Rework,
    #[n(1)]
    Scrap,
}

impl DefectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectType::Rework => "Rework",
            DefectType::Scrap => "Scrap",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Rework" => Some(DefectType::Rework),
            "Scrap" => Some(DefectType::Scrap),
            _ => None,
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    #[n(0)]
    Open,
    #[n(1)]
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "Open",
            CaseStatus::Closed => "Closed",
        }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(CaseStatus::Open),
            "Closed" => Some(CaseStatus::Closed),
            _ => None,
        }
    }
}

/// Wall-clock timestamp in the store's local `DD/MM/YYYY HH:MM:SS` format.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct TimeStamp(NaiveDateTime);

impl TimeStamp {
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Self(
            NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, min, sec)
                .unwrap(),
        )
    }
    /// Parse the stored wire format. Returns None for malformed rows so read
    /// paths can skip them without failing the whole operation.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT).ok().map(Self)
    }
    pub fn to_store_string(&self) -> String {
        self.0.format(TIMESTAMP_FMT).to_string()
    }
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
    pub fn date_string(&self) -> String {
        self.0.format(DATE_FMT).to_string()
    }
}

/// Parse a non-negative money amount with up to two decimal places into
/// integer cents. Store rows may carry `"50"`, `"50.5"` or `"50.50"`; all
/// normalise to the same cents value so comparisons are never
/// formatting-sensitive.
pub fn parse_cents(s: &str) -> Option<u64> {
    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: u64 = whole.parse().ok()?;
    let frac = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().ok()? * 10,
        _ => frac.parse::<u64>().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac)
}

/// Render cents with exactly two decimal places, as persisted in the Cost
/// column and shown in projections.
pub fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// One defect submission, mirroring the persisted row. The timestamp is kept
/// as the raw stored string: case numbering compares its date prefix without
/// a full parse, and filtering parses it on demand.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct DefectRecord {
    #[n(0)]
    pub case_number: String,
    #[n(1)]
    pub customer: String,
    #[n(2)]
    pub part_code: String,
    #[n(3)]
    pub do_number: String,
    #[n(4)]
    pub quantity: u32,
    #[n(5)]
    pub total_cost_cents: u64,
    #[n(6)]
    pub defect_type: DefectType,
    #[n(7)]
    pub description: String,
    #[n(8)]
    pub action_taken: String,
    #[n(9)]
    pub submitter: String,
    #[n(10)]
    pub timestamp: String,
    #[n(11)]
    pub status: CaseStatus,
    #[n(12)]
    pub comments: String,
    #[n(13)]
    pub closed_by: String,
    #[n(14)]
    pub closed_at: String,
    #[n(15)]
    pub owner_account: String,
}

impl DefectRecord {
    /// The `DD/MM/YYYY` prefix of the stored timestamp. Tolerant of malformed
    /// time-of-day suffixes, which must not break same-day counting.
    pub fn submitted_date(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }

    /// Full parse of the stored timestamp; None for malformed rows.
    pub fn submitted_at(&self) -> Option<TimeStamp> {
        TimeStamp::parse(&self.timestamp)
    }

    pub fn is_open(&self) -> bool {
        self.status == CaseStatus::Open
    }

    /// Serialize to the fixed 16-column row written by `append_row`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.case_number.clone(),
            self.customer.clone(),
            self.part_code.clone(),
            self.do_number.clone(),
            self.quantity.to_string(),
            format_cents(self.total_cost_cents),
            self.defect_type.as_str().to_string(),
            self.description.clone(),
            self.action_taken.clone(),
            self.submitter.clone(),
            self.timestamp.clone(),
            self.status.as_str().to_string(),
            self.comments.clone(),
            self.closed_by.clone(),
            self.closed_at.clone(),
            self.owner_account.clone(),
        ]
    }

    /// Parse a stored row. Returns None when the row is too narrow or a typed
    /// field does not parse; such rows are skipped by read paths.
    pub fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < col::WIDTH {
            return None;
        }
        Some(Self {
            case_number: row[col::CASE_NUMBER].clone(),
            customer: row[col::CUSTOMER].clone(),
            part_code: row[col::PART_CODE].clone(),
            do_number: row[col::DO_NUMBER].clone(),
            quantity: row[col::QUANTITY].trim().parse().ok()?,
            total_cost_cents: parse_cents(&row[col::COST])?,
            defect_type: DefectType::parse(&row[col::DEFECT_TYPE])?,
            description: row[col::DESCRIPTION].clone(),
            action_taken: row[col::ACTION].clone(),
            submitter: row[col::SUBMITTER].clone(),
            timestamp: row[col::TIMESTAMP].clone(),
            status: CaseStatus::parse(&row[col::STATUS])?,
            comments: row[col::COMMENTS].clone(),
            closed_by: row[col::CLOSED_BY].clone(),
            closed_at: row[col::DATE_CLOSED].clone(),
            owner_account: row[col::ACCOUNT].clone(),
        })
    }

    /// Canonical digest of the business fields, used for same-day duplicate
    /// detection. Cost enters as integer cents, so two rows that format the
    /// same amount differently still collide.
    pub fn fingerprint(&self) -> String {
        business_fingerprint(
            &self.customer,
            &self.part_code,
            &self.do_number,
            self.quantity,
            self.total_cost_cents,
            self.defect_type,
            &self.description,
            &self.action_taken,
            &self.submitter,
        )
    }
}

#[derive(minicbor::Encode)]
struct FingerprintFields<'a> {
    #[n(0)]
    customer: &'a str,
    #[n(1)]
    part_code: &'a str,
    #[n(2)]
    do_number: &'a str,
    #[n(3)]
    quantity: u32,
    #[n(4)]
    total_cost_cents: u64,
    #[n(5)]
    defect_type: &'a str,
    #[n(6)]
    description: &'a str,
    #[n(7)]
    action_taken: &'a str,
    #[n(8)]
    submitter: &'a str,
}

// Encode the business fields into CBOR then hash. The digest is compared
// among same-day records only.
#[allow(clippy::too_many_arguments)]
pub(crate) fn business_fingerprint(
    customer: &str,
    part_code: &str,
    do_number: &str,
    quantity: u32,
    total_cost_cents: u64,
    defect_type: DefectType,
    description: &str,
    action_taken: &str,
    submitter: &str,
) -> String {
    let fields = FingerprintFields {
        customer,
        part_code,
        do_number,
        quantity,
        total_cost_cents,
        defect_type: defect_type.as_str(),
        description,
        action_taken,
        submitter,
    };
    // Encoding a struct of strings and integers cannot fail.
    let cbor = minicbor::to_vec(&fields).unwrap_or_default();
    sha256::digest(&cbor)
}

/// Derive the next per-day case number: count the records whose stored
/// timestamp carries today's date prefix, then compose `DDMMYYYY-NN` with the
/// count + 1 zero-padded to two digits (wider once a day passes 99 cases).
pub fn next_case_number(records: &[DefectRecord], today: NaiveDate) -> String {
    let today = today.format(DATE_FMT).to_string();
    let case_count = records
        .iter()
        .filter(|r| r.submitted_date() == today)
        .count();
    format!(
        "{}{}{}-{:02}",
        &today[..2],
        &today[3..5],
        &today[6..10],
        case_count + 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_roundtrip_normalises_formatting() {
        assert_eq!(parse_cents("50"), Some(5000));
        assert_eq!(parse_cents("50.5"), Some(5050));
        assert_eq!(parse_cents("50.50"), Some(5050));
        assert_eq!(parse_cents(" 12.05 "), Some(1205));
        assert_eq!(parse_cents("-1"), None);
        assert_eq!(parse_cents("1.234"), None);
        assert_eq!(parse_cents(""), None);
        assert_eq!(format_cents(5050), "50.50");
        assert_eq!(format_cents(7), "0.07");
    }

    #[test]
    fn timestamp_wire_format_roundtrip() {
        let ts = TimeStamp::new_with(2024, 6, 15, 10, 30, 0);
        assert_eq!(ts.to_store_string(), "15/06/2024 10:30:00");
        assert_eq!(TimeStamp::parse("15/06/2024 10:30:00"), Some(ts));
        assert_eq!(ts.date_string(), "15/06/2024");
        assert!(TimeStamp::parse("2024-06-15 10:30:00").is_none());
    }

    #[test]
    fn row_roundtrip_preserves_every_field() {
        let record = DefectRecord {
            case_number: "15062024-01".into(),
            customer: "Acme".into(),
            part_code: "Bracket".into(),
            do_number: "DO-77".into(),
            quantity: 5,
            total_cost_cents: 5000,
            defect_type: DefectType::Scrap,
            description: "cracked flange".into(),
            action_taken: "quarantined".into(),
            submitter: "lee".into(),
            timestamp: "15/06/2024 10:30:00".into(),
            status: CaseStatus::Open,
            comments: String::new(),
            closed_by: String::new(),
            closed_at: String::new(),
            owner_account: "qa@example.com".into(),
        };
        let row = record.to_row();
        assert_eq!(row.len(), col::WIDTH);
        assert_eq!(row[col::COST], "50.00");
        assert_eq!(DefectRecord::from_row(&row), Some(record));
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let mut row = vec![String::new(); col::WIDTH];
        row[col::QUANTITY] = "5".into();
        row[col::COST] = "50.00".into();
        row[col::DEFECT_TYPE] = "Rework".into();
        row[col::STATUS] = "Open".into();
        assert!(DefectRecord::from_row(&row).is_some());

        row[col::DEFECT_TYPE] = "Melted".into();
        assert!(DefectRecord::from_row(&row).is_none());
        row[col::DEFECT_TYPE] = "Rework".into();
        assert!(DefectRecord::from_row(&row[..10]).is_none());
    }
}
