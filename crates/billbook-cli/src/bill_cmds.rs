//! CLI handlers for `billbook bill` subcommands.

use anyhow::Result;

use billbook_core::bills;
use billbook_core::store::{BillDraft, BillPatch, PgLedger};
use billbook_core::summary::BillFilter;
use billbook_db::models::{Bill, BillStatus};

use crate::BillCommands;
use crate::args::{money, parse_id};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_bill_command(command: BillCommands, store: &PgLedger) -> Result<()> {
    match command {
        BillCommands::Add {
            title,
            category,
            amount,
            due_date,
            paid,
        } => {
            let draft = BillDraft {
                title,
                category,
                amount,
                due_date,
                status: if paid {
                    BillStatus::Paid
                } else {
                    BillStatus::Pending
                },
                origin_template_id: None,
            };
            let bill = bills::create_bill(store, draft).await?;
            println!("Bill created.");
            println!();
            print_bill(&bill);
            Ok(())
        }
        BillCommands::List { month } => {
            let all = bills::list_bills(store).await?;
            let shown = BillFilter {
                month,
                ..Default::default()
            }
            .apply(&all);
            print_bill_table(&shown);
            Ok(())
        }
        BillCommands::Edit {
            id,
            title,
            category,
            amount,
            due_date,
        } => {
            let id = parse_id("bill", &id)?;
            let patch = BillPatch {
                title,
                category,
                amount,
                due_date,
                status: None,
            };
            bills::update_bill(store, id, patch).await?;
            println!("Bill {id} updated.");
            Ok(())
        }
        BillCommands::Toggle { id } => {
            let id = parse_id("bill", &id)?;
            let bill = bills::toggle_status(store, id).await?;
            println!("Bill {} ({}) is now {}.", bill.id, bill.title, bill.status);
            Ok(())
        }
        BillCommands::Remove { id } => {
            let id = parse_id("bill", &id)?;
            if bills::delete_bill(store, id).await? {
                println!("Bill {id} deleted.");
            } else {
                println!("No bill with ID {id}; nothing deleted.");
            }
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------
// Output
// -----------------------------------------------------------------------

fn print_bill(bill: &Bill) {
    println!("  ID:        {}", bill.id);
    println!("  Title:     {}", bill.title);
    println!("  Category:  {}", bill.category.label());
    println!("  Amount:    {}", money(bill.amount));
    println!("  Due:       {}", bill.due_date);
    println!("  Status:    {}", bill.status);
    if let Some(origin) = bill.origin_template_id {
        println!("  Template:  {origin}");
    }
}

/// Print bills as a table. Shared with `billbook history`.
pub fn print_bill_table(bills: &[Bill]) {
    if bills.is_empty() {
        println!("No bills found.");
        return;
    }

    let id_w = 36;
    let title_w = bills
        .iter()
        .map(|b| b.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "{:<id_w$}  {:<10}  {:<title_w$}  {:<14}  {:>10}  STATUS",
        "ID", "DUE", "TITLE", "CATEGORY", "AMOUNT",
    );
    for b in bills {
        println!(
            "{:<id_w$}  {:<10}  {:<title_w$}  {:<14}  {:>10}  {}",
            b.id,
            b.due_date.to_string(),
            b.title,
            b.category.label(),
            money(b.amount),
            b.status,
        );
    }
}
