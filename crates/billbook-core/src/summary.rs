//! Aggregates over bills: monthly summaries, month-over-month change,
//! category totals, per-month evolution, and history filtering.
//!
//! Everything here is a pure function of the bills passed in.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use billbook_db::models::{Bill, BillStatus, Category};

use crate::month::Month;

/// Totals for the bills due in one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: Month,
    pub total: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
    pub count: usize,
}

impl MonthSummary {
    fn empty(month: Month) -> Self {
        Self {
            month,
            total: Decimal::ZERO,
            paid: Decimal::ZERO,
            pending: Decimal::ZERO,
            count: 0,
        }
    }

    fn add(&mut self, bill: &Bill) {
        self.total += bill.amount;
        match bill.status {
            BillStatus::Paid => self.paid += bill.amount,
            BillStatus::Pending => self.pending += bill.amount,
        }
        self.count += 1;
    }
}

pub fn month_summary(bills: &[Bill], month: Month) -> MonthSummary {
    bills
        .iter()
        .filter(|b| month.contains(b.due_date))
        .fold(MonthSummary::empty(month), |mut acc, b| {
            acc.add(b);
            acc
        })
}

/// Relative change between two amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "percent")]
pub enum Change {
    /// Nothing to compare against.
    FirstMonth,
    /// Percentage change, one decimal place.
    Percent(Decimal),
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstMonth => f.write_str("first month"),
            Self::Percent(p) if p.is_sign_positive() && !p.is_zero() => write!(f, "+{p}%"),
            Self::Percent(p) => write!(f, "{p}%"),
        }
    }
}

pub fn compare(current: Decimal, previous: Decimal) -> Change {
    if previous.is_zero() {
        return Change::FirstMonth;
    }
    let pct = (current - previous) / previous * Decimal::ONE_HUNDRED;
    Change::Percent(pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

/// Spending per category, largest first. `month` restricts to one month.
pub fn category_totals(bills: &[Bill], month: Option<Month>) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<Category, Decimal> = BTreeMap::new();
    for bill in bills
        .iter()
        .filter(|b| month.is_none_or(|m| m.contains(b.due_date)))
    {
        *totals.entry(bill.category).or_default() += bill.amount;
    }

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    out
}

/// Per-month totals for the last `last_n` months that have bills, oldest
/// first.
pub fn monthly_evolution(bills: &[Bill], last_n: usize) -> Vec<MonthSummary> {
    let mut by_month: BTreeMap<Month, MonthSummary> = BTreeMap::new();
    for bill in bills {
        let month = Month::of(bill.due_date);
        by_month
            .entry(month)
            .or_insert_with(|| MonthSummary::empty(month))
            .add(bill);
    }

    let skip = by_month.len().saturating_sub(last_n);
    by_month.into_values().skip(skip).collect()
}

/// Months that have at least one bill, newest first.
pub fn available_months(bills: &[Bill]) -> Vec<Month> {
    let months: BTreeSet<Month> = bills.iter().map(|b| Month::of(b.due_date)).collect();
    months.into_iter().rev().collect()
}

/// History filter. Every field set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillFilter {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub status: Option<BillStatus>,
    pub month: Option<Month>,
}

impl BillFilter {
    pub fn matches(&self, bill: &Bill) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            bill.title
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
        });
        search_ok
            && self.category.is_none_or(|c| bill.category == c)
            && self.status.is_none_or(|s| bill.status == s)
            && self.month.is_none_or(|m| m.contains(bill.due_date))
    }

    /// Matching bills, newest due date first.
    pub fn apply(&self, bills: &[Bill]) -> Vec<Bill> {
        let mut out: Vec<Bill> = bills.iter().filter(|b| self.matches(b)).cloned().collect();
        out.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;

    fn bill(title: &str, category: Category, amount: Decimal, date: &str, status: BillStatus) -> Bill {
        Bill {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            category,
            amount,
            due_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            status,
            origin_template_id: None,
            created_at: Utc::now(),
        }
    }

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn sample() -> Vec<Bill> {
        vec![
            bill("Rent", Category::Housing, dec!(1200), "2024-02-05", BillStatus::Paid),
            bill("Power", Category::Electricity, dec!(180.40), "2024-02-12", BillStatus::Pending),
            bill("Groceries", Category::Food, dec!(350.10), "2024-02-20", BillStatus::Paid),
            bill("Rent", Category::Housing, dec!(1200), "2024-01-05", BillStatus::Paid),
            bill("Power", Category::Electricity, dec!(150.00), "2024-01-12", BillStatus::Paid),
            bill("Rent", Category::Housing, dec!(1150), "2023-12-05", BillStatus::Paid),
        ]
    }

    #[test]
    fn month_summary_splits_paid_and_pending() {
        let s = month_summary(&sample(), month("2024-02"));
        assert_eq!(s.total, dec!(1730.50));
        assert_eq!(s.paid, dec!(1550.10));
        assert_eq!(s.pending, dec!(180.40));
        assert_eq!(s.count, 3);

        let empty = month_summary(&sample(), month("2024-03"));
        assert_eq!(empty.count, 0);
        assert!(empty.total.is_zero());
    }

    #[test]
    fn compare_handles_first_month_and_rounding() {
        assert_eq!(compare(dec!(100), dec!(0)), Change::FirstMonth);
        assert_eq!(compare(dec!(150), dec!(100)), Change::Percent(dec!(50.0)));
        assert_eq!(compare(dec!(200), dec!(300)), Change::Percent(dec!(-33.3)));
        assert_eq!(Change::Percent(dec!(12.5)).to_string(), "+12.5%");
        assert_eq!(Change::Percent(dec!(-3.0)).to_string(), "-3.0%");
        assert_eq!(Change::FirstMonth.to_string(), "first month");
    }

    #[test]
    fn category_totals_largest_first() {
        let all = category_totals(&sample(), None);
        assert_eq!(all[0].category, Category::Housing);
        assert_eq!(all[0].total, dec!(3550));
        assert_eq!(all[1].category, Category::Food);

        let feb = category_totals(&sample(), Some(month("2024-02")));
        let cats: Vec<Category> = feb.iter().map(|c| c.category).collect();
        assert_eq!(cats, vec![Category::Housing, Category::Food, Category::Electricity]);
    }

    #[test]
    fn evolution_keeps_last_months_in_order() {
        let evo = monthly_evolution(&sample(), 2);
        let months: Vec<String> = evo.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);
        assert_eq!(evo[0].total, dec!(1350.00));
        assert_eq!(evo[1].pending, dec!(180.40));

        assert_eq!(monthly_evolution(&sample(), 6).len(), 3);
    }

    #[test]
    fn available_months_newest_first() {
        let months = available_months(&sample());
        assert_eq!(months, vec![month("2024-02"), month("2024-01"), month("2023-12")]);
    }

    #[test]
    fn filter_combines_criteria() {
        let bills = sample();

        let rent = BillFilter {
            search: Some("  rEnT ".into()),
            ..Default::default()
        };
        let found = rent.apply(&bills);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].due_date, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());

        let pending_feb = BillFilter {
            status: Some(BillStatus::Pending),
            month: Some(month("2024-02")),
            ..Default::default()
        };
        let found = pending_feb.apply(&bills);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Power");

        let none = BillFilter {
            category: Some(Category::Water),
            ..Default::default()
        };
        assert!(none.apply(&bills).is_empty());
    }
}
