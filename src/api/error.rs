// ==========================================
// Cổng đăng ký học phần - API Error Types
// ==========================================
// Responsibility: the caller-facing error taxonomy; translates repository
// errors into business errors
// Rule: every blocked action carries its explicit cause; Forbidden and
// InvalidTransition are surfaced as-is, never downgraded to a generic error
// ==========================================

use crate::engine::approval_core::TransitionError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API-layer error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Deterministic validation failures (safe to retry after correction)
    // ==========================================
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("invalid phase window ({kind}): {detail}")]
    InvalidPhaseWindow { kind: String, detail: String },

    // ==========================================
    // Gate verdicts (terminal for the request)
    // ==========================================
    #[error("forbidden for role {role}: {detail}")]
    Forbidden { role: String, detail: String },

    #[error("invalid transition from {from}: {detail}")]
    InvalidTransition { from: String, detail: String },

    // ==========================================
    // Concurrency control (safe to retry immediately)
    // ==========================================
    #[error("concurrent update conflict: {0}")]
    Conflict(String),

    // ==========================================
    // Data access
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failure: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failure: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // General
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// From RepositoryError
// Purpose: translate storage-layer facts into the caller taxonomy
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                entity,
                id,
                expected,
                actual,
            } => ApiError::Conflict(format!(
                "{entity} {id} was modified concurrently (expected revision {expected}, found {actual})"
            )),

            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} with id={id}"))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("connection lock poisoned: {msg}"))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("unique constraint violation: {msg}"))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("foreign key violation: {msg}"))
            }
            RepositoryError::CorruptStoredValue { field, message } => {
                ApiError::InternalError(format!("corrupt stored value in {field}: {message}"))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// From engine TransitionError
// ==========================================
impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Forbidden { role, state } => ApiError::Forbidden {
                role: role.to_string(),
                detail: format!("state {state} is not this role's gate"),
            },
            TransitionError::InvalidTransition { state } => ApiError::InvalidTransition {
                from: state.to_string(),
                detail: "state accepts no such transition".to_string(),
            },
        }
    }
}

/// Result type alias
pub type ApiResult<T> = Result<T, ApiError>;
