//! Application-wide error types.
//!
//! Infrastructure failures (database, RPC, JSON, configuration) and the
//! deterministic rejections of ledger operations share one enum so the API
//! layer can map both with a single `match`.

use thiserror::Error;
use todo_rules::RuleError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event parse error: {0}")]
    EventParse(String),

    // ── Rejections ──────────────────────────────────────
    #[error("caller already owns a list")]
    AlreadyExists,

    #[error("not found")]
    NotFound,

    #[error("caller does not own this list")]
    Unauthorized,

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title exceeds the maximum length")]
    TitleTooLong,

    #[error("description exceeds the maximum length")]
    DescriptionTooLong,

    #[error("priority must be 0 (low), 1 (medium) or 2 (high)")]
    InvalidPriority,

    #[error("due date is in the past")]
    DueDateInPast,

    #[error("due date is beyond the storable range")]
    DueDateOutOfRange,

    #[error("list is full")]
    ListFull,

    #[error("every limit must be at least 1")]
    InvalidLimits,
}

impl LedgerError {
    /// `true` for errors caused by the request rather than the infrastructure.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::Database(_)
                | Self::Migrate(_)
                | Self::Http(_)
                | Self::Json(_)
                | Self::Config(_)
                | Self::EventParse(_)
        )
    }
}

impl From<RuleError> for LedgerError {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::EmptyTitle => Self::EmptyTitle,
            RuleError::TitleTooLong => Self::TitleTooLong,
            RuleError::DescriptionTooLong => Self::DescriptionTooLong,
            RuleError::InvalidPriority => Self::InvalidPriority,
            RuleError::DueDateInPast => Self::DueDateInPast,
            RuleError::ListFull => Self::ListFull,
            RuleError::InvalidLimits => Self::InvalidLimits,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
