//! Database query functions for the `recurring_templates` table.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Category, RecurringTemplate};

/// Parameters for inserting a new template row.
#[derive(Debug, Clone)]
pub struct NewTemplate<'a> {
    pub title: &'a str,
    pub category: Category,
    pub default_amount: Decimal,
    pub due_day: i16,
    pub active: bool,
}

/// Partial update for a template. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TemplateChanges<'a> {
    pub title: Option<&'a str>,
    pub category: Option<Category>,
    pub default_amount: Option<Decimal>,
    pub due_day: Option<i16>,
    pub active: Option<bool>,
}

/// Insert a new template. Returns the inserted row with server-generated
/// defaults (id, created_at).
pub async fn insert_template(pool: &PgPool, new: &NewTemplate<'_>) -> Result<RecurringTemplate> {
    let template = sqlx::query_as::<_, RecurringTemplate>(
        "INSERT INTO recurring_templates (title, category, default_amount, due_day, active) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.title)
    .bind(new.category)
    .bind(new.default_amount)
    .bind(new.due_day)
    .bind(new.active)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert template {:?}", new.title))?;

    Ok(template)
}

/// Fetch a template by its UUID.
pub async fn get_template(pool: &PgPool, id: Uuid) -> Result<Option<RecurringTemplate>> {
    let template =
        sqlx::query_as::<_, RecurringTemplate>("SELECT * FROM recurring_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch template")?;

    Ok(template)
}

/// List all templates, active and inactive, ordered by title.
pub async fn list_templates(pool: &PgPool) -> Result<Vec<RecurringTemplate>> {
    let templates = sqlx::query_as::<_, RecurringTemplate>(
        "SELECT * FROM recurring_templates ORDER BY title, created_at",
    )
    .fetch_all(pool)
    .await
    .context("failed to list templates")?;

    Ok(templates)
}

/// Apply a partial update. Returns `false` when no row has the given id.
pub async fn update_template(
    pool: &PgPool,
    id: Uuid,
    changes: &TemplateChanges<'_>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE recurring_templates SET \
             title = COALESCE($2, title), \
             category = COALESCE($3, category), \
             default_amount = COALESCE($4, default_amount), \
             due_day = COALESCE($5, due_day), \
             active = COALESCE($6, active) \
         WHERE id = $1",
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.category)
    .bind(changes.default_amount)
    .bind(changes.due_day)
    .bind(changes.active)
    .execute(pool)
    .await
    .with_context(|| format!("failed to update template {id}"))?;

    Ok(result.rows_affected() > 0)
}

/// Delete a template. Returns `false` when no row has the given id.
///
/// Bills generated from the template keep existing; their
/// `origin_template_id` is cleared by the foreign key. Generation markers
/// are left untouched.
pub async fn delete_template(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM recurring_templates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete template {id}"))?;

    Ok(result.rows_affected() > 0)
}

/// Delete every row. Returns how many were removed.
pub async fn delete_all_templates<'e, E>(executor: E) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM recurring_templates")
        .execute(executor)
        .await
        .context("failed to delete all templates")?;

    Ok(result.rows_affected())
}
