//! # Engine Error Type
//!
//! Unified error type for engine operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Error Flow                                        │
//! │                                                                         │
//! │  Caller                       Engine                                    │
//! │  ──────                       ──────                                    │
//! │                                                                         │
//! │  engine.pay_order(...)                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Operation                                                       │  │
//! │  │  Result<T, EngineError>                                          │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Rule violation? ── CoreError::FeeMismatch ──────┐              │  │
//! │  │         │                                        ▼              │  │
//! │  │  Lost a race?  ──── DbError::StaleWrite ──── EngineError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  match err.code {                                                       │
//! │    ErrorCode::Conflict => retry after re-reading,                       │
//! │    ErrorCode::FeeMismatch => reject the client payload,                 │
//! │    ...                                                                  │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use bazaar_core::CoreError;
use bazaar_db::DbError;

/// Error returned from engine operations.
///
/// ## Serialization
/// What an API caller receives when an operation fails:
/// ```json
/// {
///   "code": "FEE_MISMATCH",
///   "message": "platform_fee mismatch: supplied 100 cents, expected 2500 cents"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for engine responses.
///
/// Mirrors the error taxonomy: validation, authorization, state-conflict,
/// not-found, invariant violation. `Conflict` is the only retryable class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced listing/order does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Requested quantity exceeds what the listing can supply
    InsufficientAvailability,

    /// Owner transacting against their own listing
    SelfDealing,

    /// Client-supplied fee does not match the server computation
    FeeMismatch,

    /// Actor may not perform this operation (not a party, or wrong role
    /// for the transition)
    NotPermitted,

    /// Transition illegal from the current state
    InvalidTransition,

    /// A concurrent writer won the race; safe to retry after re-reading
    Conflict,

    /// Settlement invoked on an already-settled order
    AlreadySettled,

    /// Database operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl EngineError {
    /// Creates a new engine error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        EngineError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        EngineError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an authorization error.
    pub fn not_permitted(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::NotPermitted, message)
    }

    /// True for state-conflict errors the caller may retry after re-reading.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::Conflict
    }
}

/// Converts core business errors to engine errors.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ListingNotFound(_) | CoreError::OrderNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientAvailability { .. } => ErrorCode::InsufficientAvailability,
            CoreError::SelfDealing { .. } => ErrorCode::SelfDealing,
            CoreError::FeeMismatch { .. } => ErrorCode::FeeMismatch,
            CoreError::NotAParty { .. } | CoreError::NotPermitted { .. } => ErrorCode::NotPermitted,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::Conflict { .. } => ErrorCode::Conflict,
            CoreError::AlreadySettled { .. } => ErrorCode::AlreadySettled,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        EngineError::new(code, err.to_string())
    }
}

/// Converts database errors to engine errors.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::not_found(&entity, &id),
            DbError::StaleWrite { entity, id } => EngineError::new(
                ErrorCode::Conflict,
                format!("{entity} {id} was modified concurrently"),
            ),
            // The schema CHECK backstops the inventory gate; tripping it is
            // the same race, reported the same way
            DbError::CheckViolation { message } => EngineError::new(ErrorCode::Conflict, message),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                EngineError::validation("Invalid reference")
            }
            DbError::Decode { column, message } => {
                tracing::error!(column, "Decode failed: {}", message);
                EngineError::new(ErrorCode::Internal, "Stored data could not be decoded")
            }
            DbError::ConnectionFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            // A bounded wait for a connection that timed out; the caller may
            // retry, nothing is corrupted
            DbError::PoolExhausted => EngineError::new(
                ErrorCode::Conflict,
                "Database busy, retry after backing off",
            ),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::from(DbError::from(err))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: EngineError = CoreError::FeeMismatch {
            field: "platform_fee",
            supplied_cents: 100,
            expected_cents: 2_500,
        }
        .into();
        assert_eq!(err.code, ErrorCode::FeeMismatch);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_stale_write_is_retryable_conflict() {
        let err: EngineError = DbError::stale_write("Order", "O-1").into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_pool_timeout_is_retryable_conflict() {
        let err: EngineError = DbError::PoolExhausted.into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "\"INVALID_TRANSITION\"");
    }
}
