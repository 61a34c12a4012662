//! CLI handlers for `billbook generate` subcommands.
//!
//! - `billbook generate plan`        -- show the month's plan and totals
//! - `billbook generate run`         -- create pending bills for ungenerated rows
//! - `billbook generate set-amount`  -- change an already generated amount

use anyhow::Result;
use serde::Serialize;

use billbook_core::Month;
use billbook_core::executor::update_generated_amount;
use billbook_core::planner::{AmountEdit, PlanRow, PlanSession, PlanTotals, build_plan};
use billbook_core::store::PgLedger;

use crate::GenerateCommands;
use crate::args::{AmountOverride, month_or_current, money, parse_id};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_generate_command(command: GenerateCommands, store: &PgLedger) -> Result<()> {
    match command {
        GenerateCommands::Plan { month, json } => {
            cmd_plan(store, month_or_current(month), json).await
        }
        GenerateCommands::Run { month, amounts } => {
            cmd_run(store, month_or_current(month), &amounts).await
        }
        GenerateCommands::SetAmount {
            template_id,
            amount,
            month,
        } => {
            let template_id = parse_id("template", &template_id)?;
            let month = month_or_current(month);
            let bill = update_generated_amount(store, template_id, month, amount).await?;
            println!(
                "{} for {month} set to {} (bill {}).",
                bill.title,
                money(bill.amount),
                bill.id
            );
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------
// billbook generate plan
// -----------------------------------------------------------------------

#[derive(Serialize)]
struct PlanReport<'a> {
    month: Month,
    rows: &'a [PlanRow],
    totals: PlanTotals,
}

async fn cmd_plan(store: &PgLedger, month: Month, json: bool) -> Result<()> {
    let rows = build_plan(store, month).await?;
    let totals = PlanTotals::of(&rows);

    if json {
        let report = PlanReport {
            month,
            rows: &rows,
            totals,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Generation plan for {month}");
    println!();
    print_plan(&rows, month, totals);
    Ok(())
}

fn print_plan(rows: &[PlanRow], month: Month, totals: PlanTotals) {
    if rows.is_empty() {
        println!("No active templates. Use `billbook template add` to create one.");
        return;
    }

    let title_w = rows
        .iter()
        .map(|r| r.template.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "{:<36}  {:<title_w$}  {:<10}  {:>10}  STATUS",
        "TEMPLATE", "TITLE", "DUE", "AMOUNT",
    );
    for row in rows {
        let due = month.due_date(u32::try_from(row.template.due_day).unwrap_or(1));
        println!(
            "{:<36}  {:<title_w$}  {:<10}  {:>10}  {}",
            row.template.id,
            row.template.title,
            due.to_string(),
            money(row.adjusted_amount),
            if row.already_generated {
                "generated"
            } else {
                "to generate"
            },
        );
    }
    println!();
    println!("  Expected total:      {}", money(totals.expected));
    println!(
        "  Still to generate:   {} ({} bill(s))",
        money(totals.pending_generation),
        totals.rows_to_generate
    );
}

// -----------------------------------------------------------------------
// billbook generate run
// -----------------------------------------------------------------------

async fn cmd_run(store: &PgLedger, month: Month, overrides: &[AmountOverride]) -> Result<()> {
    let mut session = PlanSession::open(store, month).await?;

    for o in overrides {
        match session.set_amount(o.template_id, o.amount).await? {
            AmountEdit::Held => {}
            AmountEdit::WrittenThrough => println!(
                "Template {} was already generated for {month}; amount updated to {}.",
                o.template_id,
                money(o.amount)
            ),
        }
    }

    let created = session.generate().await?;
    if created == 0 {
        println!("Nothing to generate for {month}.");
    } else {
        println!("Generated {created} bill(s) for {month}.");
    }
    println!();
    print_plan(session.rows(), month, session.totals());

    Ok(())
}
