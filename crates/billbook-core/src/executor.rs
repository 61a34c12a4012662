//! Generation executor.
//!
//! Per (template, month) the state only moves forward:
//!
//! ```text
//! not generated -> generated   (generate_month)
//! generated     -> generated   (update_generated_amount)
//! ```
//!
//! There is no way back to "not generated".

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use billbook_db::models::{Bill, BillStatus};

use crate::error::{EngineError, EngineResult};
use crate::month::Month;
use crate::planner::PlanRow;
use crate::store::{BillDraft, LedgerStore};
use crate::validate;

/// Create a pending bill for every row of `rows` that is not generated yet,
/// and mark each of those templates as generated for `month`.
///
/// Rows already generated are skipped, so calling this twice with a fresh
/// plan creates nothing the second time. Each row's bill and marker are
/// written together; rows are not. If a row fails, the rows before it stay
/// committed and the error is returned; running again picks up where it
/// stopped.
///
/// Returns the number of bills created. Zero is not an error.
pub async fn generate_month<S>(store: &S, month: Month, rows: &[PlanRow]) -> EngineResult<usize>
where
    S: LedgerStore + ?Sized,
{
    // Validate every pending row before the first write.
    let drafts = rows
        .iter()
        .filter(|r| !r.already_generated)
        .map(|row| -> EngineResult<(Uuid, BillDraft)> {
            let template = &row.template;
            let draft = BillDraft {
                title: template.title.clone(),
                category: template.category,
                amount: validate::amount(row.adjusted_amount)?,
                due_date: month.due_date(due_day(template.due_day)),
                status: BillStatus::Pending,
                origin_template_id: Some(template.id),
            };
            Ok((template.id, draft))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let mut created = 0;
    for (template_id, draft) in &drafts {
        let bill = store.record_generation(draft, *template_id, month).await?;
        info!(
            %template_id,
            bill_id = %bill.id,
            %month,
            amount = %draft.amount,
            due_date = %bill.due_date,
            "generated bill"
        );
        created += 1;
    }

    if created == 0 {
        info!(%month, "nothing to generate");
    }
    Ok(created)
}

/// Change the amount of an already generated (template, month): both the
/// marker and the bill it produced.
///
/// The bill is resolved before anything is written. Bills linked to the
/// template through `origin_template_id` are preferred; bills without a link
/// are matched on (title, category, due date). Anything other than exactly
/// one candidate fails with [`EngineError::AmbiguousMatch`] and changes
/// nothing.
pub async fn update_generated_amount<S>(
    store: &S,
    template_id: Uuid,
    month: Month,
    new_amount: Decimal,
) -> EngineResult<Bill>
where
    S: LedgerStore + ?Sized,
{
    let amount = validate::amount(new_amount)?;

    match store.get_marker(template_id, month).await? {
        Some(marker) if marker.generated => {}
        _ => {
            return Err(EngineError::not_found(
                "generated marker",
                format!("{template_id}@{month}"),
            ));
        }
    }

    let template = store
        .get_template(template_id)
        .await?
        .ok_or_else(|| EngineError::not_found("template", template_id))?;
    let due_date = month.due_date(due_day(template.due_day));

    let mut candidates = store.bills_from_template(template_id, month).await?;
    if candidates.is_empty() {
        candidates = store
            .bills_matching(&template.title, template.category, due_date)
            .await?
            .into_iter()
            .filter(|b| b.origin_template_id.is_none())
            .collect();
    }

    let mut bill = match <[Bill; 1]>::try_from(candidates) {
        Ok([bill]) => bill,
        Err(candidates) => {
            warn!(
                %template_id,
                %month,
                candidates = candidates.len(),
                "amount edit not applied: bill could not be identified"
            );
            return Err(EngineError::AmbiguousMatch {
                title: template.title,
                category: template.category,
                due_date,
                candidates: candidates.len(),
            });
        }
    };

    store
        .record_amount_edit(template_id, month, bill.id, amount)
        .await?;
    info!(%template_id, bill_id = %bill.id, %month, %amount, "generated amount updated");

    bill.amount = amount;
    Ok(bill)
}

fn due_day(day: i16) -> u32 {
    u32::try_from(day).unwrap_or(1)
}
