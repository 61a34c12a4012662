//! PostgreSQL-backed ledger store.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use billbook_db::models::{Bill, Category, GenerationMarker, RecurringTemplate};
use billbook_db::queries::bills::{self as bill_queries, BillChanges, NewBill};
use billbook_db::queries::markers as marker_queries;
use billbook_db::queries::templates::{self as template_queries, NewTemplate, TemplateChanges};

use super::{
    BillDraft, BillPatch, BillRepository, ClearedCounts, LedgerStore, MarkerRepository, TemplateDraft,
    TemplatePatch, TemplateRepository,
};
use crate::month::Month;

/// Ledger store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn new_bill(draft: &BillDraft) -> NewBill<'_> {
    NewBill {
        title: &draft.title,
        category: draft.category,
        amount: draft.amount,
        due_date: draft.due_date,
        status: draft.status,
        origin_template_id: draft.origin_template_id,
    }
}

#[async_trait]
impl TemplateRepository for PgLedger {
    async fn list_templates(&self) -> Result<Vec<RecurringTemplate>> {
        template_queries::list_templates(&self.pool).await
    }

    async fn get_template(&self, id: Uuid) -> Result<Option<RecurringTemplate>> {
        template_queries::get_template(&self.pool, id).await
    }

    async fn create_template(&self, draft: &TemplateDraft) -> Result<RecurringTemplate> {
        let new = NewTemplate {
            title: &draft.title,
            category: draft.category,
            default_amount: draft.default_amount,
            due_day: draft.due_day,
            active: draft.active,
        };
        template_queries::insert_template(&self.pool, &new).await
    }

    async fn update_template(&self, id: Uuid, patch: &TemplatePatch) -> Result<bool> {
        let changes = TemplateChanges {
            title: patch.title.as_deref(),
            category: patch.category,
            default_amount: patch.default_amount,
            due_day: patch.due_day,
            active: patch.active,
        };
        template_queries::update_template(&self.pool, id, &changes).await
    }

    async fn delete_template(&self, id: Uuid) -> Result<bool> {
        template_queries::delete_template(&self.pool, id).await
    }
}

#[async_trait]
impl BillRepository for PgLedger {
    async fn list_bills(&self) -> Result<Vec<Bill>> {
        bill_queries::list_bills(&self.pool).await
    }

    async fn get_bill(&self, id: Uuid) -> Result<Option<Bill>> {
        bill_queries::get_bill(&self.pool, id).await
    }

    async fn create_bill(&self, draft: &BillDraft) -> Result<Bill> {
        bill_queries::insert_bill(&self.pool, &new_bill(draft)).await
    }

    async fn update_bill(&self, id: Uuid, patch: &BillPatch) -> Result<bool> {
        let changes = BillChanges {
            title: patch.title.as_deref(),
            category: patch.category,
            amount: patch.amount,
            due_date: patch.due_date,
            status: patch.status,
        };
        bill_queries::update_bill(&self.pool, id, &changes).await
    }

    async fn delete_bill(&self, id: Uuid) -> Result<bool> {
        bill_queries::delete_bill(&self.pool, id).await
    }

    async fn bills_from_template(&self, template_id: Uuid, month: Month) -> Result<Vec<Bill>> {
        bill_queries::find_by_origin_in_range(
            &self.pool,
            template_id,
            month.first_day(),
            month.last_day(),
        )
        .await
    }

    async fn bills_matching(
        &self,
        title: &str,
        category: Category,
        due_date: NaiveDate,
    ) -> Result<Vec<Bill>> {
        bill_queries::find_by_identity(&self.pool, title, category, due_date).await
    }
}

#[async_trait]
impl MarkerRepository for PgLedger {
    async fn list_markers(&self) -> Result<Vec<GenerationMarker>> {
        marker_queries::list_markers(&self.pool).await
    }

    async fn get_marker(
        &self,
        template_id: Uuid,
        month: Month,
    ) -> Result<Option<GenerationMarker>> {
        marker_queries::get_marker(&self.pool, template_id, &month.to_string()).await
    }

    async fn upsert_marker(
        &self,
        template_id: Uuid,
        month: Month,
        amount: Decimal,
    ) -> Result<GenerationMarker> {
        marker_queries::upsert_marker(&self.pool, template_id, &month.to_string(), amount).await
    }
}

#[async_trait]
impl LedgerStore for PgLedger {
    async fn record_generation(
        &self,
        draft: &BillDraft,
        template_id: Uuid,
        month: Month,
    ) -> Result<Bill> {
        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let bill = bill_queries::insert_bill(&mut *tx, &new_bill(draft)).await?;
        marker_queries::upsert_marker(&mut *tx, template_id, &month.to_string(), draft.amount)
            .await?;

        tx.commit().await.context("failed to commit generation")?;
        Ok(bill)
    }

    async fn record_amount_edit(
        &self,
        template_id: Uuid,
        month: Month,
        bill_id: Uuid,
        amount: Decimal,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let marker_found =
            marker_queries::update_marker_amount(&mut *tx, template_id, &month.to_string(), amount)
                .await?;
        if !marker_found {
            // Transaction rolls back on drop (no commit).
            bail!("no generated marker for template {template_id} in {month}");
        }

        let changes = BillChanges {
            amount: Some(amount),
            ..Default::default()
        };
        if !bill_queries::update_bill(&mut *tx, bill_id, &changes).await? {
            bail!("bill {bill_id} not found");
        }

        tx.commit().await.context("failed to commit amount edit")?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<ClearedCounts> {
        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;

        let counts = ClearedCounts {
            markers: marker_queries::delete_all_markers(&mut *tx).await?,
            bills: bill_queries::delete_all_bills(&mut *tx).await?,
            templates: template_queries::delete_all_templates(&mut *tx).await?,
        };

        tx.commit().await.context("failed to commit clear")?;
        Ok(counts)
    }
}
