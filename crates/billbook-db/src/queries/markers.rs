//! Database query functions for the `generation_markers` table.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::GenerationMarker;

/// List every marker, newest month first.
pub async fn list_markers(pool: &PgPool) -> Result<Vec<GenerationMarker>> {
    let markers = sqlx::query_as::<_, GenerationMarker>(
        "SELECT * FROM generation_markers ORDER BY month DESC, template_id",
    )
    .fetch_all(pool)
    .await
    .context("failed to list generation markers")?;

    Ok(markers)
}

/// Fetch the marker for `(template_id, month)`, if any.
pub async fn get_marker(
    pool: &PgPool,
    template_id: Uuid,
    month: &str,
) -> Result<Option<GenerationMarker>> {
    let marker = sqlx::query_as::<_, GenerationMarker>(
        "SELECT * FROM generation_markers WHERE template_id = $1 AND month = $2",
    )
    .bind(template_id)
    .bind(month)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to fetch marker for template {template_id} in {month}"))?;

    Ok(marker)
}

/// Insert or update the marker for `(template_id, month)`, setting
/// `generated = true`. Never creates a second row for the same pair.
pub async fn upsert_marker<'e, E>(
    executor: E,
    template_id: Uuid,
    month: &str,
    amount: Decimal,
) -> Result<GenerationMarker>
where
    E: PgExecutor<'e>,
{
    let marker = sqlx::query_as::<_, GenerationMarker>(
        "INSERT INTO generation_markers (template_id, month, amount, generated) \
         VALUES ($1, $2, $3, TRUE) \
         ON CONFLICT (template_id, month) DO UPDATE \
         SET amount = EXCLUDED.amount, generated = TRUE, updated_at = now() \
         RETURNING *",
    )
    .bind(template_id)
    .bind(month)
    .bind(amount)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to upsert marker for template {template_id} in {month}"))?;

    Ok(marker)
}

/// Set the amount of a marker that is already generated. Returns `false`
/// when no generated marker exists for `(template_id, month)`.
pub async fn update_marker_amount<'e, E>(
    executor: E,
    template_id: Uuid,
    month: &str,
    amount: Decimal,
) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE generation_markers SET amount = $3, updated_at = now() \
         WHERE template_id = $1 AND month = $2 AND generated",
    )
    .bind(template_id)
    .bind(month)
    .bind(amount)
    .execute(executor)
    .await
    .with_context(|| format!("failed to update marker for template {template_id} in {month}"))?;

    Ok(result.rows_affected() > 0)
}

/// Delete every row. Returns how many were removed.
pub async fn delete_all_markers<'e, E>(executor: E) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM generation_markers")
        .execute(executor)
        .await
        .context("failed to delete all markers")?;

    Ok(result.rows_affected())
}
