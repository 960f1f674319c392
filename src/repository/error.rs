// ==========================================
// Cổng đăng ký học phần - Repository Error Types
// ==========================================
// Tool: thiserror derive macro
// Rule: repositories surface storage facts, the API layer translates them
// ==========================================

use thiserror::Error;

/// Repository-layer error type
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== concurrency control =====
    #[error("optimistic lock failure: {entity} id={id}, expected_revision={expected}, actual_revision={actual}")]
    OptimisticLockFailure {
        entity: String,
        id: String,
        expected: i32,
        actual: i32,
    },

    // ===== database =====
    #[error("record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("database connection failure: {0}")]
    DatabaseConnectionError(String),

    #[error("database lock acquisition failure: {0}")]
    LockError(String),

    #[error("database transaction failure: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failure: {0}")]
    DatabaseQueryError(String),

    #[error("unique constraint violation: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    // ===== data quality =====
    #[error("stored value corrupt (field={field}): {message}")]
    CorruptStoredValue { field: String, message: String },

    // ===== general =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;
