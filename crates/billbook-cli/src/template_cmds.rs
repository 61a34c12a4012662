//! CLI handlers for `billbook template` subcommands.

use anyhow::Result;

use billbook_core::registry::TemplateRegistry;
use billbook_core::store::{PgLedger, TemplateDraft, TemplatePatch};

use crate::TemplateCommands;
use crate::args::{money, parse_id};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_template_command(command: TemplateCommands, store: &PgLedger) -> Result<()> {
    let registry = TemplateRegistry::new(store);
    match command {
        TemplateCommands::Add {
            title,
            category,
            amount,
            due_day,
            inactive,
        } => {
            let draft = TemplateDraft {
                title,
                category,
                default_amount: amount,
                due_day,
                active: !inactive,
            };
            cmd_add(&registry, draft).await
        }
        TemplateCommands::List => cmd_list(&registry).await,
        TemplateCommands::Edit {
            id,
            title,
            category,
            amount,
            due_day,
            active,
        } => {
            let patch = TemplatePatch {
                title,
                category,
                default_amount: amount,
                due_day,
                active,
            };
            cmd_edit(&registry, &id, patch).await
        }
        TemplateCommands::Remove { id } => cmd_remove(&registry, &id).await,
    }
}

// -----------------------------------------------------------------------
// billbook template add
// -----------------------------------------------------------------------

async fn cmd_add(registry: &TemplateRegistry<'_, PgLedger>, draft: TemplateDraft) -> Result<()> {
    let template = registry.create(draft).await?;

    println!("Template created.");
    println!();
    println!("  ID:        {}", template.id);
    println!("  Title:     {}", template.title);
    println!("  Category:  {}", template.category.label());
    println!("  Amount:    {}", money(template.default_amount));
    println!("  Due day:   {}", template.due_day);
    println!("  Active:    {}", if template.active { "yes" } else { "no" });

    Ok(())
}

// -----------------------------------------------------------------------
// billbook template list
// -----------------------------------------------------------------------

async fn cmd_list(registry: &TemplateRegistry<'_, PgLedger>) -> Result<()> {
    let templates = registry.list().await?;

    if templates.is_empty() {
        println!("No templates found. Use `billbook template add` to create one.");
        return Ok(());
    }

    let id_w = 36;
    let title_w = templates
        .iter()
        .map(|t| t.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "{:<id_w$}  {:<title_w$}  {:<14}  {:>10}  {:>3}  ACTIVE",
        "ID", "TITLE", "CATEGORY", "AMOUNT", "DAY",
    );
    for t in &templates {
        println!(
            "{:<id_w$}  {:<title_w$}  {:<14}  {:>10}  {:>3}  {}",
            t.id,
            t.title,
            t.category.label(),
            money(t.default_amount),
            t.due_day,
            if t.active { "yes" } else { "no" },
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// billbook template edit <id>
// -----------------------------------------------------------------------

async fn cmd_edit(
    registry: &TemplateRegistry<'_, PgLedger>,
    id_str: &str,
    patch: TemplatePatch,
) -> Result<()> {
    let id = parse_id("template", id_str)?;

    if registry.update(id, patch).await? {
        let t = registry.get(id).await?;
        println!(
            "Template {} updated: {} ({}), {} due day {}, {}.",
            t.id,
            t.title,
            t.category.label(),
            money(t.default_amount),
            t.due_day,
            if t.active { "active" } else { "inactive" },
        );
    } else {
        println!("No template with ID {id}; nothing changed.");
    }

    Ok(())
}

// -----------------------------------------------------------------------
// billbook template remove <id>
// -----------------------------------------------------------------------

async fn cmd_remove(registry: &TemplateRegistry<'_, PgLedger>, id_str: &str) -> Result<()> {
    let id = parse_id("template", id_str)?;

    if registry.delete(id).await? {
        println!("Template {id} deleted. Bills already generated from it are kept.");
    } else {
        println!("No template with ID {id}; nothing deleted.");
    }

    Ok(())
}
