//! The ledger store: repository traits the engine is written against.
//!
//! One trait per record kind plus [`LedgerStore`], which adds the two
//! composite writes the executor needs to be atomic per row. Two
//! implementations ship with the crate:
//!
//! - [`PgLedger`] over the `billbook-db` query functions.
//! - [`MemoryLedger`], an in-process store with the same contract.
//!
//! Store methods return `anyhow::Result`; the engine lifts failures into
//! [`crate::EngineError::Store`].

mod memory;
mod pg;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use billbook_db::models::{Bill, BillStatus, Category, GenerationMarker, RecurringTemplate};

use crate::month::Month;

pub use memory::MemoryLedger;
pub use pg::PgLedger;

/// Fields for a new template. Assumed validated.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub title: String,
    pub category: Category,
    pub default_amount: Decimal,
    pub due_day: i16,
    pub active: bool,
}

/// Partial template update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplatePatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub default_amount: Option<Decimal>,
    pub due_day: Option<i16>,
    pub active: Option<bool>,
}

/// Fields for a new bill. Assumed validated.
#[derive(Debug, Clone, PartialEq)]
pub struct BillDraft {
    pub title: String,
    pub category: Category,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub origin_template_id: Option<Uuid>,
}

/// Partial bill update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<BillStatus>,
}

impl BillPatch {
    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn status(status: BillStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Every template, inactive included, ordered by title.
    async fn list_templates(&self) -> Result<Vec<RecurringTemplate>>;

    async fn get_template(&self, id: Uuid) -> Result<Option<RecurringTemplate>>;

    async fn create_template(&self, draft: &TemplateDraft) -> Result<RecurringTemplate>;

    /// Returns `false` when no template has `id`.
    async fn update_template(&self, id: Uuid, patch: &TemplatePatch) -> Result<bool>;

    /// Returns `false` when no template has `id`. Bills and markers are
    /// kept; bills lose their origin link.
    async fn delete_template(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait BillRepository: Send + Sync {
    /// Every bill, newest due date first.
    async fn list_bills(&self) -> Result<Vec<Bill>>;

    async fn get_bill(&self, id: Uuid) -> Result<Option<Bill>>;

    async fn create_bill(&self, draft: &BillDraft) -> Result<Bill>;

    /// Returns `false` when no bill has `id`.
    async fn update_bill(&self, id: Uuid, patch: &BillPatch) -> Result<bool>;

    /// Returns `false` when no bill has `id`.
    async fn delete_bill(&self, id: Uuid) -> Result<bool>;

    /// Bills generated from `template_id` with a due date inside `month`.
    async fn bills_from_template(&self, template_id: Uuid, month: Month) -> Result<Vec<Bill>>;

    /// Bills whose `(title, category, due_date)` match exactly.
    async fn bills_matching(
        &self,
        title: &str,
        category: Category,
        due_date: NaiveDate,
    ) -> Result<Vec<Bill>>;
}

#[async_trait]
pub trait MarkerRepository: Send + Sync {
    async fn list_markers(&self) -> Result<Vec<GenerationMarker>>;

    async fn get_marker(&self, template_id: Uuid, month: Month)
    -> Result<Option<GenerationMarker>>;

    /// Insert or overwrite the marker for `(template_id, month)` with
    /// `generated = true`.
    async fn upsert_marker(
        &self,
        template_id: Uuid,
        month: Month,
        amount: Decimal,
    ) -> Result<GenerationMarker>;
}

/// The full store surface used by the engine.
#[async_trait]
pub trait LedgerStore: TemplateRepository + BillRepository + MarkerRepository {
    /// Create a generated bill and upsert its month marker as one unit:
    /// either both are written or neither is.
    async fn record_generation(
        &self,
        draft: &BillDraft,
        template_id: Uuid,
        month: Month,
    ) -> Result<Bill>;

    /// Set the marker amount and the amount of bill `bill_id` as one unit.
    async fn record_amount_edit(
        &self,
        template_id: Uuid,
        month: Month,
        bill_id: Uuid,
        amount: Decimal,
    ) -> Result<()>;

    /// Remove every bill, template and marker as one unit.
    async fn clear_all(&self) -> Result<ClearedCounts>;
}

/// Rows removed by [`LedgerStore::clear_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearedCounts {
    pub bills: u64,
    pub templates: u64,
    pub markers: u64,
}

// Compile-time assertion: LedgerStore must be usable as `dyn LedgerStore`.
const _: () = {
    fn _assert_object_safe(_: &dyn LedgerStore) {}
};
