//! End-to-end walkthrough against a sled-backed store: open a session,
//! submit defects, filter them, close a case and print the year rollup.
//!
//! Run with `cargo run --example sled`.

use std::sync::Arc;

use defect_tracer::draft::{DefectDraft, PartCodeSelection};
use defect_tracer::filter::{self, FilterQuery};
use defect_tracer::record::{DefectType, format_cents};
use defect_tracer::rollup;
use defect_tracer::service::{CloseRequest, DefectService};
use defect_tracer::store::SledStore;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let db = sled::open("defect-tracer-demo")?;
    if !db.is_empty() {
        db.clear()?;
    }
    let store = SledStore::open(Arc::new(db))?;
    let service = DefectService::new(Arc::new(store));

    let mut session = service.open_session("qa@example.com")?;

    let first = service.submit(
        &mut session,
        DefectDraft::new()
            .set_customer("Acme Industrial")
            .set_part_code(PartCodeSelection::NewEntry("bracket assembly".into()))
            .set_do_number("DO-1042")
            .set_quantity(5)
            .set_unit_cost_cents(10_00)
            .set_defect_type(DefectType::Rework)
            .set_description("Mounting holes off-centre by 2mm")
            .set_action_taken("Re-drilled and deburred")
            .set_submitter("Lee")
            .acknowledge(),
    )?;
    println!(
        "submitted case {} (total cost {})",
        first.case_number,
        format_cents(first.total_cost_cents)
    );

    let second = service.submit(
        &mut session,
        DefectDraft::new()
            .set_customer("Acme Industrial")
            .set_part_code(PartCodeSelection::Existing("Bracket Assembly".into()))
            .set_do_number("DO-1043")
            .set_quantity(2)
            .set_unit_cost_cents(35_50)
            .set_defect_type(DefectType::Scrap)
            .set_description("Cracked weld seam")
            .set_action_taken("Scrapped both units")
            .set_submitter("Lee")
            .acknowledge(),
    )?;
    println!("submitted case {}", second.case_number);

    let outcome = filter::run(
        session.visible_records(),
        &FilterQuery {
            defect_type: Some(DefectType::Rework),
            ..FilterQuery::default()
        },
    );
    println!("{}", outcome.summary);
    for row in &outcome.rows {
        println!(
            "  {} | {} | {} | {}",
            row.case_number, row.part_code, row.total_cost, row.status
        );
    }

    let closed = service.close_case(
        &mut session,
        &first.case_number,
        &CloseRequest {
            comment: "Verified fix on the next batch".into(),
            closed_by: "Tan".into(),
            confirmed: true,
        },
    )?;
    println!("case {} closed on {}", closed.case_number, closed.closed_at);

    for year in rollup::years_with_data(session.visible_records()) {
        let yearly = rollup::aggregate(session.visible_records(), year);
        println!("rollup for {year}:");
        for (label, month) in rollup::MONTH_ABBREV.iter().zip(yearly.months.iter()) {
            if month.submissions > 0 {
                println!(
                    "  {label}: {} submissions, qty {}, cost {}",
                    month.submissions,
                    month.quantity,
                    format_cents(month.cost_cents)
                );
            }
        }
    }

    Ok(())
}
