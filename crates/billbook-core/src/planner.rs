//! Monthly generation planner.
//!
//! [`build_plan`] joins the active templates with their generation markers
//! for one month. It only reads, so it can be called as often as the caller
//! likes. [`PlanSession`] keeps a plan in memory while the user adjusts
//! amounts, then hands it to the executor.

use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use billbook_db::models::RecurringTemplate;

use crate::error::{EngineError, EngineResult};
use crate::executor;
use crate::month::Month;
use crate::store::{LedgerStore, MarkerRepository, TemplateRepository};
use crate::validate;

/// One active template and its generation status for the planned month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub template: RecurringTemplate,
    /// Amount the bill was (or will be) generated with.
    pub adjusted_amount: Decimal,
    pub already_generated: bool,
}

/// Build the plan for `month`: one row per active template, in registry
/// order.
///
/// A marker with `generated = false` counts as not generated and its amount
/// is ignored.
pub async fn build_plan<S>(store: &S, month: Month) -> EngineResult<Vec<PlanRow>>
where
    S: TemplateRepository + MarkerRepository + ?Sized,
{
    let templates: Vec<RecurringTemplate> = store
        .list_templates()
        .await?
        .into_iter()
        .filter(|t| t.active)
        .collect();

    let markers = try_join_all(templates.iter().map(|t| store.get_marker(t.id, month))).await?;

    let rows = templates
        .into_iter()
        .zip(markers)
        .map(|(template, marker)| {
            let generated = marker.filter(|m| m.generated);
            let row = PlanRow {
                adjusted_amount: generated
                    .as_ref()
                    .map_or(template.default_amount, |m| m.amount),
                already_generated: generated.is_some(),
                template,
            };
            debug!(
                template_id = %row.template.id,
                %month,
                generated = row.already_generated,
                amount = %row.adjusted_amount,
                "plan row"
            );
            row
        })
        .collect();

    Ok(rows)
}

/// [`build_plan`], abandoned with [`EngineError::Cancelled`] as soon as
/// `cancel` fires.
pub async fn build_plan_cancellable<S>(
    store: &S,
    month: Month,
    cancel: &CancellationToken,
) -> EngineResult<Vec<PlanRow>>
where
    S: TemplateRepository + MarkerRepository + ?Sized,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EngineError::Cancelled),
        rows = build_plan(store, month) => rows,
    }
}

/// Sums shown next to a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanTotals {
    /// Sum of every row's adjusted amount.
    pub expected: Decimal,
    /// Sum over rows not generated yet.
    pub pending_generation: Decimal,
    pub rows_to_generate: usize,
}

impl PlanTotals {
    pub fn of(rows: &[PlanRow]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, row| {
            acc.expected += row.adjusted_amount;
            if !row.already_generated {
                acc.pending_generation += row.adjusted_amount;
                acc.rows_to_generate += 1;
            }
            acc
        })
    }
}

/// What [`PlanSession::set_amount`] did with an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountEdit {
    /// Kept in memory until the month is generated.
    Held,
    /// Already generated: marker and bill were updated in the store.
    WrittenThrough,
}

/// An in-memory plan for one month that the user edits before generating.
pub struct PlanSession<'a, S: ?Sized> {
    store: &'a S,
    month: Month,
    rows: Vec<PlanRow>,
}

impl<'a, S> PlanSession<'a, S>
where
    S: LedgerStore + ?Sized,
{
    /// Load the plan for `month`.
    pub async fn open(store: &'a S, month: Month) -> EngineResult<Self> {
        let rows = build_plan(store, month).await?;
        Ok(Self { store, month, rows })
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn rows(&self) -> &[PlanRow] {
        &self.rows
    }

    pub fn totals(&self) -> PlanTotals {
        PlanTotals::of(&self.rows)
    }

    /// Reload rows from the store. Amount edits held in memory are lost.
    pub async fn refresh(&mut self) -> EngineResult<()> {
        self.rows = build_plan(self.store, self.month).await?;
        Ok(())
    }

    /// Switch to another month, discarding held edits.
    pub async fn switch_month(&mut self, month: Month) -> EngineResult<()> {
        self.rows = build_plan(self.store, month).await?;
        self.month = month;
        Ok(())
    }

    /// Change the amount of the row for `template_id`.
    ///
    /// Rows already generated are written through immediately; the row is
    /// only updated once the store accepted the edit.
    pub async fn set_amount(&mut self, template_id: Uuid, amount: Decimal) -> EngineResult<AmountEdit> {
        let amount = validate::amount(amount)?;
        let idx = self
            .rows
            .iter()
            .position(|r| r.template.id == template_id)
            .ok_or_else(|| EngineError::not_found("plan row for template", template_id))?;

        let edit = if self.rows[idx].already_generated {
            executor::update_generated_amount(self.store, template_id, self.month, amount).await?;
            AmountEdit::WrittenThrough
        } else {
            AmountEdit::Held
        };
        self.rows[idx].adjusted_amount = amount;
        Ok(edit)
    }

    /// Generate every pending row, then reload the plan. Returns the number
    /// of bills created.
    pub async fn generate(&mut self) -> EngineResult<usize> {
        let created = executor::generate_month(self.store, self.month, &self.rows).await?;
        self.refresh().await?;
        Ok(created)
    }
}
