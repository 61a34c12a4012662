//! Error type for engine operations.

use chrono::NaiveDate;

use billbook_db::models::Category;

/// Errors surfaced by the registry, planner, executor and bill service.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The operation referenced a record that does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Input was rejected before any store call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The bill targeted by an amount edit could not be identified uniquely.
    #[error(
        "cannot identify the bill for {title:?} ({category}) due {due_date}: \
         {candidates} candidate(s)"
    )]
    AmbiguousMatch {
        title: String,
        category: Category,
        due_date: NaiveDate,
        candidates: usize,
    },

    /// A read was aborted through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// The ledger store failed (connection, query, constraint).
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl EngineError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
