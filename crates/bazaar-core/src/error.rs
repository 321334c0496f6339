//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Classes                                   │
//! │                                                                         │
//! │  (a) validation    - bad fields, fee mismatch, quantity > availability  │
//! │  (b) authorization - actor may not initiate the requested transition    │
//! │  (c) state-conflict- transition illegal from current state, or a        │
//! │                      concurrent writer won the race (safe to retry)     │
//! │  (d) not-found     - referenced listing/order does not exist            │
//! │  (e) invariant     - e.g. re-settling a completed order; logged loudly  │
//! │                                                                         │
//! │  All errors are rejected BEFORE any mutation - no transition is ever    │
//! │  partially applied.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (listing id, statuses, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each variant carries a stable machine-checkable code

use thiserror::Error;

use crate::types::{OrderKind, OrderStatus, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or domain logic failures and
/// map one-to-one onto the error taxonomy above via [`CoreError::code`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// Listing cannot be found.
    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Requested quantity exceeds what the listing can still supply.
    ///
    /// Partial fulfillment is not supported: the request is rejected at
    /// creation, never trimmed or retried.
    #[error("Insufficient availability for listing {listing_id}: available {available}, requested {requested}")]
    InsufficientAvailability {
        listing_id: String,
        available: i64,
        requested: i64,
    },

    /// The listing owner tried to transact against their own listing.
    ///
    /// Self-dealing is disallowed structurally, independent of listing state.
    #[error("Listing {listing_id} cannot be accepted or purchased by its own owner")]
    SelfDealing { listing_id: String },

    /// A client-supplied fee value does not match the server computation.
    ///
    /// ## When This Occurs
    /// The client computes the fee breakdown for display and submits it with
    /// the order; the server recomputes and compares within an absolute
    /// epsilon. A mismatch means tampering or a stale fee schedule - it is
    /// rejected, never silently corrected.
    #[error("{field} mismatch: supplied {supplied_cents} cents, expected {expected_cents} cents")]
    FeeMismatch {
        field: &'static str,
        supplied_cents: i64,
        expected_cents: i64,
    },

    /// The actor is neither buyer nor seller of the entity.
    #[error("Actor is not a party to {entity} {id}")]
    NotAParty { entity: &'static str, id: String },

    /// The transition exists but may not be initiated by this role.
    ///
    /// Example: only the buyer may initiate `pending → paid`; only the
    /// seller may initiate `paid → shipping`.
    #[error("{role} may not initiate {from} → {to}")]
    NotPermitted {
        role: Role,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The requested status is not in the adjacency table for the current
    /// state. Caller may safely retry after re-reading state.
    #[error("Invalid {kind} order transition: {from} → {to}")]
    InvalidTransition {
        kind: OrderKind,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A concurrent writer won the race for this entity.
    #[error("Conflict on {entity} {id}: state changed concurrently")]
    Conflict { entity: &'static str, id: String },

    /// Settlement was invoked on an already-settled order.
    ///
    /// An order settles exactly once. This is a programming-level defect
    /// in the caller and is logged loudly, never silently ignored.
    #[error("Order {order_id} is already settled")]
    AlreadySettled { order_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Stable machine-checkable error code, surfaced to API callers.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ListingNotFound(_) | CoreError::OrderNotFound(_) => "NOT_FOUND",
            CoreError::InsufficientAvailability { .. } => "INSUFFICIENT_AVAILABILITY",
            CoreError::SelfDealing { .. } => "SELF_DEALING",
            CoreError::FeeMismatch { .. } => "FEE_MISMATCH",
            CoreError::NotAParty { .. } | CoreError::NotPermitted { .. } => "NOT_PERMITTED",
            CoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            CoreError::Conflict { .. } => "CONFLICT",
            CoreError::AlreadySettled { .. } => "ALREADY_SETTLED",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// True for state-conflict errors the caller may retry after re-reading.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Conflict { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't meet field-level requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// A shipping address is missing one of its required parts.
    #[error("shipping address is incomplete: {field} is required")]
    IncompleteAddress { field: &'static str },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientAvailability {
            listing_id: "L-1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient availability for listing L-1: available 3, requested 5"
        );
    }

    #[test]
    fn test_error_codes() {
        let err = CoreError::FeeMismatch {
            field: "platform_fee",
            supplied_cents: 100,
            expected_cents: 200,
        };
        assert_eq!(err.code(), "FEE_MISMATCH");
        assert!(!err.is_retryable());

        let err = CoreError::Conflict {
            entity: "Listing",
            id: "L-1".to_string(),
        };
        assert_eq!(err.code(), "CONFLICT");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "version" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.code(), "VALIDATION_ERROR");
    }
}
