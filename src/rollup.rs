//! Per-month and per-product rollups for chart consumption

use chrono::Datelike;

use crate::record::DefectRecord;

/// Chart axis labels, calendar order.
pub const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Totals for one calendar month. Months with no activity stay zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthRollup {
    pub quantity: u64,
    pub cost_cents: u64,
    pub submissions: u32,
}

/// Per-part-code totals used by the top-N rankings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRollup {
    pub part_code: String,
    pub submissions: u32,
    pub quantity: u64,
}

/// One selected year's rollups. `months` always holds twelve entries in
/// Jan-Dec order regardless of data sparsity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearRollup {
    pub year: i32,
    pub months: [MonthRollup; 12],
    pub top_by_count: Vec<ProductRollup>,
    pub top_by_quantity: Vec<ProductRollup>,
}

const TOP_N: usize = 3;

/// Roll up the selected year: monthly quantity/cost/submission totals plus
/// the top three part codes by submission count and by quantity. Records with
/// unparseable timestamps contribute nothing.
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a DefectRecord>, year: i32) -> YearRollup {
    let mut months = [MonthRollup::default(); 12];
    // First-encountered order is kept so ranking ties resolve predictably.
    let mut products: Vec<ProductRollup> = Vec::new();

    for record in records {
        let Some(ts) = record.submitted_at() else {
            continue;
        };
        let date = ts.date();
        if date.year() != year {
            continue;
        }

        let month = &mut months[date.month0() as usize];
        month.quantity += record.quantity as u64;
        month.cost_cents += record.total_cost_cents;
        month.submissions += 1;

        match products
            .iter_mut()
            .find(|p| p.part_code == record.part_code)
        {
            Some(product) => {
                product.submissions += 1;
                product.quantity += record.quantity as u64;
            }
            None => products.push(ProductRollup {
                part_code: record.part_code.clone(),
                submissions: 1,
                quantity: record.quantity as u64,
            }),
        }
    }

    let mut top_by_count = products.clone();
    top_by_count.sort_by(|a, b| b.submissions.cmp(&a.submissions));
    top_by_count.truncate(TOP_N);

    let mut top_by_quantity = products;
    top_by_quantity.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    top_by_quantity.truncate(TOP_N);

    YearRollup {
        year,
        months,
        top_by_count,
        top_by_quantity,
    }
}

/// Distinct years that have at least one parseable record, newest first.
/// Populates year selectors for both filtering and charting.
pub fn years_with_data<'a>(records: impl IntoIterator<Item = &'a DefectRecord>) -> Vec<i32> {
    let mut years: Vec<i32> = records
        .into_iter()
        .filter_map(|r| r.submitted_at())
        .map(|ts| ts.date().year())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}
