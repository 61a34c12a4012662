//! Recurring bill generation and monthly tracking.
//!
//! - [`registry`]: CRUD over recurring templates.
//! - [`planner`]: per-month plan rows joining active templates with their
//!   generation markers, plus the interactive [`planner::PlanSession`].
//! - [`executor`]: materializes bills for ungenerated rows and propagates
//!   amount edits for generated ones.
//! - [`bills`] and [`summary`]: manual bill management and aggregates.
//! - [`maintenance`]: example data seeding and clearing the whole ledger.
//!
//! All persistence goes through the [`store::LedgerStore`] traits; see
//! [`store::PgLedger`] and [`store::MemoryLedger`].

pub mod bills;
pub mod error;
pub mod executor;
pub mod maintenance;
pub mod month;
pub mod planner;
pub mod registry;
pub mod store;
pub mod summary;
mod validate;

pub use error::{EngineError, EngineResult};
pub use month::{Month, MonthParseError};
