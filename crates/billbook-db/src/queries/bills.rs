//! Database query functions for the `bills` table.
//!
//! Functions that take a generic executor can run against the pool or inside
//! a transaction (`&mut *tx`).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Bill, BillStatus, Category};

/// Parameters for inserting a new bill row.
#[derive(Debug, Clone)]
pub struct NewBill<'a> {
    pub title: &'a str,
    pub category: Category,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub origin_template_id: Option<Uuid>,
}

/// Partial update for a bill. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct BillChanges<'a> {
    pub title: Option<&'a str>,
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<BillStatus>,
}

/// Insert a new bill. Returns the inserted row with server-generated
/// defaults (id, created_at).
pub async fn insert_bill<'e, E>(executor: E, new: &NewBill<'_>) -> Result<Bill>
where
    E: PgExecutor<'e>,
{
    let bill = sqlx::query_as::<_, Bill>(
        "INSERT INTO bills (title, category, amount, due_date, status, origin_template_id) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.title)
    .bind(new.category)
    .bind(new.amount)
    .bind(new.due_date)
    .bind(new.status)
    .bind(new.origin_template_id)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert bill {:?}", new.title))?;

    Ok(bill)
}

/// Fetch a bill by its UUID.
pub async fn get_bill(pool: &PgPool, id: Uuid) -> Result<Option<Bill>> {
    let bill = sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch bill")?;

    Ok(bill)
}

/// List all bills, newest due date first.
pub async fn list_bills(pool: &PgPool) -> Result<Vec<Bill>> {
    let bills =
        sqlx::query_as::<_, Bill>("SELECT * FROM bills ORDER BY due_date DESC, created_at DESC")
            .fetch_all(pool)
            .await
            .context("failed to list bills")?;

    Ok(bills)
}

/// Apply a partial update. Returns `false` when no row has the given id.
pub async fn update_bill<'e, E>(executor: E, id: Uuid, changes: &BillChanges<'_>) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE bills SET \
             title = COALESCE($2, title), \
             category = COALESCE($3, category), \
             amount = COALESCE($4, amount), \
             due_date = COALESCE($5, due_date), \
             status = COALESCE($6, status) \
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.category)
    .bind(changes.amount)
    .bind(changes.due_date)
    .bind(changes.status)
    .execute(executor)
    .await
    .with_context(|| format!("failed to update bill {id}"))?;

    Ok(result.rows_affected() > 0)
}

/// Delete a bill. Returns `false` when no row has the given id.
pub async fn delete_bill(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM bills WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete bill {id}"))?;

    Ok(result.rows_affected() > 0)
}

/// Bills generated from `template_id` whose due date falls within
/// `[first_day, last_day]`.
pub async fn find_by_origin_in_range(
    pool: &PgPool,
    template_id: Uuid,
    first_day: NaiveDate,
    last_day: NaiveDate,
) -> Result<Vec<Bill>> {
    let bills = sqlx::query_as::<_, Bill>(
        "SELECT * FROM bills \
         WHERE origin_template_id = $1 AND due_date BETWEEN $2 AND $3 \
         ORDER BY created_at",
    )
    .bind(template_id)
    .bind(first_day)
    .bind(last_day)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to look up bills generated from template {template_id}"))?;

    Ok(bills)
}

/// Bills matching `(title, category, due_date)` exactly.
pub async fn find_by_identity(
    pool: &PgPool,
    title: &str,
    category: Category,
    due_date: NaiveDate,
) -> Result<Vec<Bill>> {
    let bills = sqlx::query_as::<_, Bill>(
        "SELECT * FROM bills \
         WHERE title = $1 AND category = $2 AND due_date = $3 \
         ORDER BY created_at",
    )
    .bind(title)
    .bind(category)
    .bind(due_date)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to look up bills titled {title:?} due {due_date}"))?;

    Ok(bills)
}

/// Delete every row. Returns how many were removed.
pub async fn delete_all_bills<'e, E>(executor: E) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM bills")
        .execute(executor)
        .await
        .context("failed to delete all bills")?;

    Ok(result.rows_affected())
}
