mod args;
mod bill_cmds;
mod config;
mod generate_cmds;
mod maintenance_cmds;
mod report_cmds;
mod template_cmds;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use billbook_core::Month;
use billbook_core::store::PgLedger;
use billbook_core::summary::BillFilter;
use billbook_db::config::DbConfig;
use billbook_db::models::{BillStatus, Category};
use billbook_db::pool;

use args::AmountOverride;
use config::BillbookConfig;

#[derive(Parser)]
#[command(name = "billbook", about = "Personal bill tracker with recurring bill generation")]
struct Cli {
    /// Database URL (overrides BILLBOOK_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a billbook config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create and migrate the billbook database
    DbInit,
    /// Recurring template management
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Bill management
    Bill {
        #[command(subcommand)]
        command: BillCommands,
    },
    /// Monthly generation of bills from active templates
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
    /// Totals for a month compared with the month before
    Summary {
        /// Month to summarize (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<Month>,
    },
    /// Search and filter past bills
    History {
        /// Case-insensitive substring of the title
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        /// pending or paid
        #[arg(long)]
        status: Option<BillStatus>,
        /// Restrict to one month (YYYY-MM)
        #[arg(long)]
        month: Option<Month>,
    },
    /// Spending per category and per month
    Breakdown {
        /// Restrict category totals to one month (YYYY-MM)
        #[arg(long)]
        month: Option<Month>,
        /// Number of months in the evolution table
        #[arg(long, default_value_t = 6)]
        months: usize,
    },
    /// Add example bills and templates to an empty ledger
    Seed,
    /// Delete every bill, template and generation marker
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Register a new recurring template
    Add {
        title: String,
        #[arg(long)]
        category: Category,
        /// Default amount for each generated bill
        #[arg(long, value_parser = args::parse_amount)]
        amount: Decimal,
        /// Day of month the bill is due (1-31, clamped to short months)
        #[arg(long)]
        due_day: i16,
        /// Register the template as inactive
        #[arg(long)]
        inactive: bool,
    },
    /// List all templates, inactive ones included
    List,
    /// Change fields of a template
    Edit {
        /// Template ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long, value_parser = args::parse_amount)]
        amount: Option<Decimal>,
        #[arg(long)]
        due_day: Option<i16>,
        /// true or false
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a template (past bills are kept)
    Remove {
        /// Template ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BillCommands {
    /// Record a bill manually
    Add {
        title: String,
        #[arg(long)]
        category: Category,
        #[arg(long, value_parser = args::parse_amount)]
        amount: Decimal,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: NaiveDate,
        /// Record the bill as already paid
        #[arg(long)]
        paid: bool,
    },
    /// List bills, newest due date first
    List {
        /// Restrict to one month (YYYY-MM)
        #[arg(long)]
        month: Option<Month>,
    },
    /// Change fields of a bill
    Edit {
        /// Bill ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long, value_parser = args::parse_amount)]
        amount: Option<Decimal>,
        #[arg(long)]
        due_date: Option<NaiveDate>,
    },
    /// Flip a bill between pending and paid
    Toggle {
        /// Bill ID
        id: String,
    },
    /// Delete a bill
    Remove {
        /// Bill ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Show which templates would generate a bill this month
    Plan {
        /// Month to plan (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<Month>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate pending bills for every template not generated yet
    Run {
        /// Month to generate (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<Month>,
        /// Override a template's amount for this month (TEMPLATE_ID=AMOUNT, repeatable)
        #[arg(long = "amount")]
        amounts: Vec<AmountOverride>,
    },
    /// Change the amount of an already generated template bill
    SetAmount {
        /// Template ID
        template_id: String,
        #[arg(value_parser = args::parse_amount)]
        amount: Decimal,
        /// Month the bill was generated for (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<Month>,
    },
}

/// Execute the `billbook init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Next: run `billbook db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `billbook db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = BillbookConfig::resolve(cli_db_url);

    println!("Initializing billbook database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("billbook db-init complete.");
    Ok(())
}

/// Resolve the database URL and open a store over a fresh pool.
async fn connect(cli_db_url: Option<&str>) -> anyhow::Result<PgLedger> {
    let resolved = BillbookConfig::resolve(cli_db_url);
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    Ok(PgLedger::new(db_pool))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cli_db_url = cli.database_url.as_deref();
    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli_db_url).await?;
        }
        Commands::Template { command } => {
            let store = connect(cli_db_url).await?;
            let result = template_cmds::run_template_command(command, &store).await;
            store.pool().close().await;
            result?;
        }
        Commands::Bill { command } => {
            let store = connect(cli_db_url).await?;
            let result = bill_cmds::run_bill_command(command, &store).await;
            store.pool().close().await;
            result?;
        }
        Commands::Generate { command } => {
            let store = connect(cli_db_url).await?;
            let result = generate_cmds::run_generate_command(command, &store).await;
            store.pool().close().await;
            result?;
        }
        Commands::Summary { month } => {
            let store = connect(cli_db_url).await?;
            let result = report_cmds::run_summary(&store, month).await;
            store.pool().close().await;
            result?;
        }
        Commands::History {
            search,
            category,
            status,
            month,
        } => {
            let filter = BillFilter {
                search,
                category,
                status,
                month,
            };
            let store = connect(cli_db_url).await?;
            let result = report_cmds::run_history(&store, &filter).await;
            store.pool().close().await;
            result?;
        }
        Commands::Breakdown { month, months } => {
            let store = connect(cli_db_url).await?;
            let result = report_cmds::run_breakdown(&store, month, months).await;
            store.pool().close().await;
            result?;
        }
        Commands::Seed => {
            let store = connect(cli_db_url).await?;
            let result = maintenance_cmds::run_seed(&store).await;
            store.pool().close().await;
            result?;
        }
        Commands::Reset { yes } => {
            if !yes {
                return maintenance_cmds::refuse_reset();
            }
            let store = connect(cli_db_url).await?;
            let result = maintenance_cmds::run_reset(&store).await;
            store.pool().close().await;
            result?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that touch process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_run_collects_amount_overrides() {
        let id = uuid::Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "billbook",
            "generate",
            "run",
            "--month",
            "2024-02",
            "--amount",
            &format!("{id}=150"),
        ])
        .unwrap();

        let Commands::Generate {
            command: GenerateCommands::Run { month, amounts },
        } = cli.command
        else {
            panic!("expected generate run");
        };
        assert_eq!(month, Some("2024-02".parse().unwrap()));
        assert_eq!(amounts.len(), 1);
        assert_eq!(amounts[0].template_id, id);
        assert_eq!(amounts[0].amount, Decimal::new(150, 0));
    }

    #[test]
    fn rejects_malformed_month() {
        let result = Cli::try_parse_from(["billbook", "summary", "--month", "2024-13"]);
        assert!(result.is_err());
    }

    #[test]
    fn history_parses_filters() {
        let cli = Cli::try_parse_from([
            "billbook",
            "history",
            "--category",
            "credit_card",
            "--status",
            "paid",
        ])
        .unwrap();
        let Commands::History {
            category, status, ..
        } = cli.command
        else {
            panic!("expected history");
        };
        assert_eq!(category, Some(Category::CreditCard));
        assert_eq!(status, Some(BillStatus::Paid));
    }

    #[test]
    fn reset_parses_confirmation_flag() {
        let cli = Cli::try_parse_from(["billbook", "reset", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { yes: true }));

        let cli = Cli::try_parse_from(["billbook", "reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { yes: false }));
    }

    #[test]
    fn seed_takes_no_arguments() {
        let cli = Cli::try_parse_from(["billbook", "seed"]).unwrap();
        assert!(matches!(cli.command, Commands::Seed));
        assert!(Cli::try_parse_from(["billbook", "seed", "--month", "2024-01"]).is_err());
    }
}
