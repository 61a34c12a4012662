//! Field checks shared by templates and bills. All run before any store call.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Smallest accepted monetary amount.
pub(crate) const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest amount a `NUMERIC(12,2)` column holds: 9,999,999,999.99.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Trimmed, non-empty title.
pub(crate) fn title(raw: &str) -> EngineResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("title must not be empty".into()));
    }
    Ok(trimmed.to_owned())
}

/// Amount between 0.01 and [`MAX_AMOUNT`] with no more than two decimal
/// places.
pub(crate) fn amount(value: Decimal) -> EngineResult<Decimal> {
    let value = value.normalize();
    if value < MIN_AMOUNT {
        return Err(EngineError::Validation(format!(
            "amount must be at least {MIN_AMOUNT}, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(EngineError::Validation(format!(
            "amount must be at most {MAX_AMOUNT}, got {value}"
        )));
    }
    if value.scale() > 2 {
        return Err(EngineError::Validation(format!(
            "amount {value} has more than two decimal places"
        )));
    }
    Ok(value.round_dp(2))
}

pub(crate) fn due_day(day: i16) -> EngineResult<i16> {
    if !(1..=31).contains(&day) {
        return Err(EngineError::Validation(format!(
            "due day must be between 1 and 31, got {day}"
        )));
    }
    Ok(day)
}
