//! `billbook seed` and `billbook reset`.

use anyhow::{Result, bail};
use chrono::Local;

use billbook_core::maintenance::{reset_all, seed_sample_data};
use billbook_core::store::PgLedger;

pub async fn run_seed(store: &PgLedger) -> Result<()> {
    let outcome = seed_sample_data(store, Local::now().date_naive()).await?;

    if outcome.is_empty() {
        println!("Bills and templates already exist; nothing seeded.");
        return Ok(());
    }
    if outcome.bills == 0 {
        println!("Bills already exist; sample bills skipped.");
    } else {
        println!("Added {} sample bill(s).", outcome.bills);
    }
    if outcome.templates == 0 {
        println!("Templates already exist; sample templates skipped.");
    } else {
        println!("Added {} sample template(s).", outcome.templates);
    }
    Ok(())
}

/// `billbook reset` without `--yes`: fail before any connection is made.
pub fn refuse_reset() -> Result<()> {
    bail!("reset deletes every bill, template and generation marker\nRe-run with --yes to confirm.")
}

pub async fn run_reset(store: &PgLedger) -> Result<()> {
    let cleared = reset_all(store).await?;
    println!(
        "Deleted {} bill(s), {} template(s) and {} generation marker(s).",
        cleared.bills, cleared.templates, cleared.markers
    );
    Ok(())
}
