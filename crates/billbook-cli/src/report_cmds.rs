//! `billbook summary`, `billbook history` and `billbook breakdown`.

use anyhow::Result;
use rust_decimal::Decimal;

use billbook_core::Month;
use billbook_core::bills;
use billbook_core::store::PgLedger;
use billbook_core::summary::{
    BillFilter, available_months, category_totals, compare, month_summary, monthly_evolution,
};

use crate::args::{month_or_current, money};
use crate::bill_cmds::print_bill_table;

/// Totals for `month` next to the previous month's, with the relative change.
pub async fn run_summary(store: &PgLedger, month: Option<Month>) -> Result<()> {
    let month = month_or_current(month);
    let all = bills::list_bills(store).await?;

    let current = month_summary(&all, month);
    let previous = month_summary(&all, month.pred());

    println!("Summary for {month}");
    println!();
    println!("  Total:     {:>12}", money(current.total));
    println!("  Paid:      {:>12}", money(current.paid));
    println!("  Pending:   {:>12}", money(current.pending));
    println!("  Bills:     {:>12}", current.count);
    println!();
    println!(
        "  vs {}:  {} ({})",
        previous.month,
        money(previous.total),
        compare(current.total, previous.total)
    );

    Ok(())
}

pub async fn run_history(store: &PgLedger, filter: &BillFilter) -> Result<()> {
    let all = bills::list_bills(store).await?;
    let found = filter.apply(&all);

    print_bill_table(&found);
    if !found.is_empty() {
        let total: Decimal = found.iter().map(|b| b.amount).sum();
        println!();
        println!("{} bill(s), total {}", found.len(), money(total));
    }

    Ok(())
}

/// Category totals (optionally for one month) and the last `last_n` months.
pub async fn run_breakdown(store: &PgLedger, month: Option<Month>, last_n: usize) -> Result<()> {
    let all = bills::list_bills(store).await?;

    if all.is_empty() {
        println!("No bills recorded yet.");
        return Ok(());
    }

    match month {
        Some(m) => println!("Spending by category, {m}"),
        None => println!("Spending by category, all time"),
    }
    println!();
    for ct in category_totals(&all, month) {
        println!("  {:<14}  {:>12}", ct.category.label(), money(ct.total));
    }

    println!();
    println!("Monthly evolution");
    println!();
    println!("  {:<7}  {:>12}  {:>12}  {:>12}  CHANGE", "MONTH", "TOTAL", "PAID", "PENDING");
    for s in monthly_evolution(&all, last_n) {
        let change = compare(s.total, month_summary(&all, s.month.pred()).total);
        println!(
            "  {:<7}  {:>12}  {:>12}  {:>12}  {}",
            s.month.to_string(),
            money(s.total),
            money(s.paid),
            money(s.pending),
            change,
        );
    }

    let months = available_months(&all);
    println!();
    println!(
        "{} month(s) with bills, from {} to {}.",
        months.len(),
        months.last().map(Month::to_string).unwrap_or_default(),
        months.first().map(Month::to_string).unwrap_or_default(),
    );

    Ok(())
}
