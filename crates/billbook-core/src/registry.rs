//! Template registry: CRUD over recurring templates.
//!
//! Every write is validated before it reaches the store and persisted
//! immediately. There is no caching and no retry.

use tracing::{info, warn};
use uuid::Uuid;

use billbook_db::models::RecurringTemplate;

use crate::error::{EngineError, EngineResult};
use crate::store::{TemplateDraft, TemplatePatch, TemplateRepository};
use crate::validate;

/// Registry over any [`TemplateRepository`].
pub struct TemplateRegistry<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> TemplateRegistry<'a, S>
where
    S: TemplateRepository + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and persist a new template. Returns the stored record with
    /// its assigned id.
    pub async fn create(&self, draft: TemplateDraft) -> EngineResult<RecurringTemplate> {
        let draft = TemplateDraft {
            title: validate::title(&draft.title)?,
            default_amount: validate::amount(draft.default_amount)?,
            due_day: validate::due_day(draft.due_day)?,
            ..draft
        };
        let template = self.store.create_template(&draft).await?;
        info!(template_id = %template.id, title = %template.title, "template created");
        Ok(template)
    }

    /// Apply only the fields present in `patch`.
    ///
    /// Returns `Ok(false)` when no template has `id`; this is not treated as
    /// an error.
    pub async fn update(&self, id: Uuid, patch: TemplatePatch) -> EngineResult<bool> {
        let patch = TemplatePatch {
            title: patch.title.as_deref().map(validate::title).transpose()?,
            default_amount: patch.default_amount.map(validate::amount).transpose()?,
            due_day: patch.due_day.map(validate::due_day).transpose()?,
            ..patch
        };
        let found = self.store.update_template(id, &patch).await?;
        if found {
            info!(template_id = %id, "template updated");
        } else {
            warn!(template_id = %id, "update ignored: template not found");
        }
        Ok(found)
    }

    /// Remove a template. Deleting a missing id is a no-op returning
    /// `Ok(false)`. Past bills and markers are kept.
    pub async fn delete(&self, id: Uuid) -> EngineResult<bool> {
        let removed = self.store.delete_template(id).await?;
        if removed {
            info!(template_id = %id, "template deleted");
        }
        Ok(removed)
    }

    /// All templates, inactive ones included.
    pub async fn list(&self) -> EngineResult<Vec<RecurringTemplate>> {
        Ok(self.store.list_templates().await?)
    }

    pub async fn get(&self, id: Uuid) -> EngineResult<RecurringTemplate> {
        self.store
            .get_template(id)
            .await?
            .ok_or_else(|| EngineError::not_found("template", id))
    }
}
