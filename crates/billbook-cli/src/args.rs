//! Argument parsing and output helpers shared by the command handlers.

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use uuid::Uuid;

use billbook_core::Month;

/// A `--amount TEMPLATE_ID=AMOUNT` override for `generate run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountOverride {
    pub template_id: Uuid,
    pub amount: Decimal,
}

impl std::str::FromStr for AmountOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((id, amount)) = s.split_once('=') else {
            bail!("expected TEMPLATE_ID=AMOUNT, got {s:?}");
        };
        let template_id = Uuid::parse_str(id.trim())
            .with_context(|| format!("invalid template ID: {id:?}"))?;
        let amount = parse_amount(amount)?;
        Ok(Self {
            template_id,
            amount,
        })
    }
}

/// Parse a money amount. Accepts an optional leading `$` and either `.` or
/// `,` as the decimal separator.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned = s.trim().trim_start_matches('$').replace(',', ".");
    cleaned
        .parse::<Decimal>()
        .with_context(|| format!("invalid amount: {s:?}"))
}

/// Resolve an optional `--month` flag, defaulting to the current month.
pub fn month_or_current(month: Option<Month>) -> Month {
    month.unwrap_or_else(Month::current)
}

/// Format an amount with exactly two decimal places.
pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Parse a UUID command argument, naming the entity on failure.
pub fn parse_id(entity: &str, s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).with_context(|| format!("invalid {entity} ID: {s:?}"))
}
