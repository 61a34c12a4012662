//! In-process ledger store.
//!
//! Same contract as [`super::PgLedger`], state kept behind a mutex. Useful
//! for tests and for embedding the engine without a database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use billbook_db::models::{Bill, Category, GenerationMarker, RecurringTemplate};

use super::{
    BillDraft, BillPatch, BillRepository, ClearedCounts, LedgerStore, MarkerRepository, TemplateDraft,
    TemplatePatch, TemplateRepository,
};
use crate::month::Month;

#[derive(Debug, Default)]
struct State {
    templates: HashMap<Uuid, RecurringTemplate>,
    bills: HashMap<Uuid, Bill>,
    markers: HashMap<(Uuid, Month), GenerationMarker>,
}

impl State {
    fn insert_bill(&mut self, draft: &BillDraft) -> Bill {
        let bill = Bill {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            category: draft.category,
            amount: draft.amount,
            due_date: draft.due_date,
            status: draft.status,
            origin_template_id: draft.origin_template_id,
            created_at: Utc::now(),
        };
        self.bills.insert(bill.id, bill.clone());
        bill
    }

    fn upsert_marker(&mut self, template_id: Uuid, month: Month, amount: Decimal) -> GenerationMarker {
        let marker = GenerationMarker {
            template_id,
            month: month.to_string(),
            amount,
            generated: true,
            updated_at: Utc::now(),
        };
        self.markers.insert((template_id, month), marker.clone());
        marker
    }
}

/// Ledger store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a marker row verbatim, including `generated = false` rows that
    /// the engine itself never writes.
    pub fn seed_marker(&self, marker: GenerationMarker) -> Result<()> {
        let month: Month = marker.month.parse()?;
        self.lock().markers.insert((marker.template_id, month), marker);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TemplateRepository for MemoryLedger {
    async fn list_templates(&self) -> Result<Vec<RecurringTemplate>> {
        let mut templates: Vec<_> = self.lock().templates.values().cloned().collect();
        templates.sort_by(|a, b| {
            a.title
                .cmp(&b.title)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(templates)
    }

    async fn get_template(&self, id: Uuid) -> Result<Option<RecurringTemplate>> {
        Ok(self.lock().templates.get(&id).cloned())
    }

    async fn create_template(&self, draft: &TemplateDraft) -> Result<RecurringTemplate> {
        let template = RecurringTemplate {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            category: draft.category,
            default_amount: draft.default_amount,
            due_day: draft.due_day,
            active: draft.active,
            created_at: Utc::now(),
        };
        self.lock().templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn update_template(&self, id: Uuid, patch: &TemplatePatch) -> Result<bool> {
        let mut state = self.lock();
        let Some(t) = state.templates.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(title) = &patch.title {
            t.title = title.clone();
        }
        if let Some(category) = patch.category {
            t.category = category;
        }
        if let Some(amount) = patch.default_amount {
            t.default_amount = amount;
        }
        if let Some(day) = patch.due_day {
            t.due_day = day;
        }
        if let Some(active) = patch.active {
            t.active = active;
        }
        Ok(true)
    }

    async fn delete_template(&self, id: Uuid) -> Result<bool> {
        let mut state = self.lock();
        if state.templates.remove(&id).is_none() {
            return Ok(false);
        }
        for bill in state.bills.values_mut() {
            if bill.origin_template_id == Some(id) {
                bill.origin_template_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl BillRepository for MemoryLedger {
    async fn list_bills(&self) -> Result<Vec<Bill>> {
        let mut bills: Vec<_> = self.lock().bills.values().cloned().collect();
        bills.sort_by(|a, b| {
            b.due_date
                .cmp(&a.due_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(bills)
    }

    async fn get_bill(&self, id: Uuid) -> Result<Option<Bill>> {
        Ok(self.lock().bills.get(&id).cloned())
    }

    async fn create_bill(&self, draft: &BillDraft) -> Result<Bill> {
        Ok(self.lock().insert_bill(draft))
    }

    async fn update_bill(&self, id: Uuid, patch: &BillPatch) -> Result<bool> {
        let mut state = self.lock();
        let Some(bill) = state.bills.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(title) = &patch.title {
            bill.title = title.clone();
        }
        if let Some(category) = patch.category {
            bill.category = category;
        }
        if let Some(amount) = patch.amount {
            bill.amount = amount;
        }
        if let Some(due_date) = patch.due_date {
            bill.due_date = due_date;
        }
        if let Some(status) = patch.status {
            bill.status = status;
        }
        Ok(true)
    }

    async fn delete_bill(&self, id: Uuid) -> Result<bool> {
        Ok(self.lock().bills.remove(&id).is_some())
    }

    async fn bills_from_template(&self, template_id: Uuid, month: Month) -> Result<Vec<Bill>> {
        let mut bills: Vec<_> = self
            .lock()
            .bills
            .values()
            .filter(|b| b.origin_template_id == Some(template_id) && month.contains(b.due_date))
            .cloned()
            .collect();
        bills.sort_by_key(|b| b.created_at);
        Ok(bills)
    }

    async fn bills_matching(
        &self,
        title: &str,
        category: Category,
        due_date: NaiveDate,
    ) -> Result<Vec<Bill>> {
        let mut bills: Vec<_> = self
            .lock()
            .bills
            .values()
            .filter(|b| b.title == title && b.category == category && b.due_date == due_date)
            .cloned()
            .collect();
        bills.sort_by_key(|b| b.created_at);
        Ok(bills)
    }
}

#[async_trait]
impl MarkerRepository for MemoryLedger {
    async fn list_markers(&self) -> Result<Vec<GenerationMarker>> {
        let mut markers: Vec<_> = self.lock().markers.values().cloned().collect();
        markers.sort_by(|a, b| {
            b.month
                .cmp(&a.month)
                .then_with(|| a.template_id.cmp(&b.template_id))
        });
        Ok(markers)
    }

    async fn get_marker(
        &self,
        template_id: Uuid,
        month: Month,
    ) -> Result<Option<GenerationMarker>> {
        Ok(self.lock().markers.get(&(template_id, month)).cloned())
    }

    async fn upsert_marker(
        &self,
        template_id: Uuid,
        month: Month,
        amount: Decimal,
    ) -> Result<GenerationMarker> {
        Ok(self.lock().upsert_marker(template_id, month, amount))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn record_generation(
        &self,
        draft: &BillDraft,
        template_id: Uuid,
        month: Month,
    ) -> Result<Bill> {
        let mut state = self.lock();
        let bill = state.insert_bill(draft);
        state.upsert_marker(template_id, month, draft.amount);
        Ok(bill)
    }

    async fn record_amount_edit(
        &self,
        template_id: Uuid,
        month: Month,
        bill_id: Uuid,
        amount: Decimal,
    ) -> Result<()> {
        let mut state = self.lock();
        // Check both targets before touching either.
        match state.markers.get(&(template_id, month)) {
            Some(m) if m.generated => {}
            _ => bail!("no generated marker for template {template_id} in {month}"),
        }
        if !state.bills.contains_key(&bill_id) {
            bail!("bill {bill_id} not found");
        }

        if let Some(marker) = state.markers.get_mut(&(template_id, month)) {
            marker.amount = amount;
            marker.updated_at = Utc::now();
        }
        if let Some(bill) = state.bills.get_mut(&bill_id) {
            bill.amount = amount;
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<ClearedCounts> {
        let mut state = self.lock();
        let counts = ClearedCounts {
            bills: state.bills.len() as u64,
            templates: state.templates.len() as u64,
            markers: state.markers.len() as u64,
        };
        *state = State::default();
        Ok(counts)
    }
}
