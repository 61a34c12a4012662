//! Whole-ledger maintenance: seeding example data and wiping everything.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use billbook_db::models::{BillStatus, Category};

use crate::bills;
use crate::error::EngineResult;
use crate::registry::TemplateRegistry;
use crate::store::{BillDraft, ClearedCounts, LedgerStore, TemplateDraft};

/// What [`seed_sample_data`] added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    pub bills: usize,
    pub templates: usize,
}

impl SeedOutcome {
    pub fn is_empty(&self) -> bool {
        self.bills == 0 && self.templates == 0
    }
}

/// (title, category, cents, days before today, paid)
const SAMPLE_BILLS: [(&str, Category, i64, u64, bool); 8] = [
    ("Rent", Category::Housing, 120_000, 0, true),
    ("Electricity", Category::Electricity, 18_050, 0, false),
    ("Fiber internet", Category::Internet, 8_990, 5, true),
    ("Groceries", Category::Food, 32_075, 3, true),
    ("Health insurance", Category::Health, 45_000, 7, false),
    ("Rent", Category::Housing, 120_000, 35, true),
    ("Electricity", Category::Electricity, 16_530, 32, true),
    ("Fiber internet", Category::Internet, 8_990, 38, true),
];

/// (title, category, cents, due day)
const SAMPLE_TEMPLATES: [(&str, Category, i64, i16); 3] = [
    ("Rent", Category::Housing, 120_000, 5),
    ("Fiber internet", Category::Internet, 8_990, 10),
    ("Health insurance", Category::Health, 45_000, 15),
];

/// Populate an empty ledger with example bills and templates.
///
/// Bills are added only when the store holds no bills, and templates only
/// when it holds no templates. Bill dates are relative to `today`. Running
/// this twice adds nothing the second time.
pub async fn seed_sample_data<S>(store: &S, today: NaiveDate) -> EngineResult<SeedOutcome>
where
    S: LedgerStore + ?Sized,
{
    let mut outcome = SeedOutcome::default();

    if store.list_bills().await?.is_empty() {
        for (title, category, cents, days_ago, paid) in SAMPLE_BILLS {
            let due_date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
            let status = if paid {
                BillStatus::Paid
            } else {
                BillStatus::Pending
            };
            bills::create_bill(
                store,
                BillDraft {
                    title: title.into(),
                    category,
                    amount: Decimal::new(cents, 2),
                    due_date,
                    status,
                    origin_template_id: None,
                },
            )
            .await?;
            outcome.bills += 1;
        }
    } else {
        info!("bills already present, skipping sample bills");
    }

    let registry = TemplateRegistry::new(store);
    if registry.list().await?.is_empty() {
        for (title, category, cents, due_day) in SAMPLE_TEMPLATES {
            registry
                .create(TemplateDraft {
                    title: title.into(),
                    category,
                    default_amount: Decimal::new(cents, 2),
                    due_day,
                    active: true,
                })
                .await?;
            outcome.templates += 1;
        }
    } else {
        info!("templates already present, skipping sample templates");
    }

    info!(
        bills = outcome.bills,
        templates = outcome.templates,
        "sample data seeded"
    );
    Ok(outcome)
}

/// Delete every bill, template and generation marker in one step.
pub async fn reset_all<S>(store: &S) -> EngineResult<ClearedCounts>
where
    S: LedgerStore + ?Sized,
{
    let cleared = store.clear_all().await?;
    warn!(
        bills = cleared.bills,
        templates = cleared.templates,
        markers = cleared.markers,
        "ledger cleared"
    );
    Ok(cleared)
}
