//! Manual bill management: create, edit, toggle paid/pending, delete.

use tracing::info;
use uuid::Uuid;

use billbook_db::models::Bill;

use crate::error::{EngineError, EngineResult};
use crate::store::{BillDraft, BillPatch, BillRepository};
use crate::validate;

/// Validate and store a bill entered by the user.
pub async fn create_bill<S>(store: &S, draft: BillDraft) -> EngineResult<Bill>
where
    S: BillRepository + ?Sized,
{
    let draft = BillDraft {
        title: validate::title(&draft.title)?,
        amount: validate::amount(draft.amount)?,
        ..draft
    };
    let bill = store.create_bill(&draft).await?;
    info!(bill_id = %bill.id, title = %bill.title, due_date = %bill.due_date, "bill created");
    Ok(bill)
}

/// Apply the fields present in `patch`. Fails with `NotFound` for an
/// unknown id.
pub async fn update_bill<S>(store: &S, id: Uuid, patch: BillPatch) -> EngineResult<()>
where
    S: BillRepository + ?Sized,
{
    let patch = BillPatch {
        title: patch.title.as_deref().map(validate::title).transpose()?,
        amount: patch.amount.map(validate::amount).transpose()?,
        ..patch
    };
    if !store.update_bill(id, &patch).await? {
        return Err(EngineError::not_found("bill", id));
    }
    Ok(())
}

/// Flip a bill between pending and paid. Returns the updated bill.
pub async fn toggle_status<S>(store: &S, id: Uuid) -> EngineResult<Bill>
where
    S: BillRepository + ?Sized,
{
    let mut bill = store
        .get_bill(id)
        .await?
        .ok_or_else(|| EngineError::not_found("bill", id))?;

    let status = bill.status.toggled();
    if !store.update_bill(id, &BillPatch::status(status)).await? {
        return Err(EngineError::not_found("bill", id));
    }
    info!(bill_id = %id, %status, "bill status changed");

    bill.status = status;
    Ok(bill)
}

/// Delete a bill. A missing id is a no-op returning `Ok(false)`.
pub async fn delete_bill<S>(store: &S, id: Uuid) -> EngineResult<bool>
where
    S: BillRepository + ?Sized,
{
    Ok(store.delete_bill(id).await?)
}

/// Every bill, newest due date first.
pub async fn list_bills<S>(store: &S) -> EngineResult<Vec<Bill>>
where
    S: BillRepository + ?Sized,
{
    Ok(store.list_bills().await?)
}
