//! # bazaar-core: Pure Business Logic for Bazaar
//!
//! This crate is the **heart** of the Bazaar marketplace backend. It contains
//! the order/transaction lifecycle rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-engine                                │   │
//! │  │   create_listing ─► accept_listing ─► create_order ─► pay ─► …  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌──────────────┐  ┌──────────┐ │   │
//! │  │   │   types   │  │   fees    │  │state_machine │  │settlement│ │   │
//! │  │   │  Listing  │  │  tiered & │  │  adjacency   │  │  payout  │ │   │
//! │  │   │   Order   │  │fixed rates│  │   tables     │  │  split   │ │   │
//! │  │   └───────────┘  └───────────┘  └──────────────┘  └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-db (Database Layer)                   │   │
//! │  │            SQLite repositories, inventory ledger                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Listing, Order, LegalAgreement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`fees`] - Fee Calculator: tiered and fixed-rate commission schedules
//! - [`state_machine`] - Order lifecycle transition tables and validation
//! - [`settlement`] - Settlement Processor: payout/platform-revenue split
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//! use bazaar_core::fees;
//!
//! // A marketplace order worth exactly 500.00 sits in the 5% tier
//! let goods_total = Money::from_cents(50_000);
//! let fee = fees::marketplace_platform_fee(goods_total);
//! assert_eq!(fee.cents(), 2_500);
//!
//! // One cent more and the 4% tier applies
//! let fee = fees::marketplace_platform_fee(Money::from_cents(50_001));
//! assert_eq!(fee.cents(), 2_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fees;
pub mod money;
pub mod settlement;
pub mod state_machine;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bazaar_core::Money` instead of
// `use bazaar_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Absolute tolerance, in cents, when verifying client-supplied fee values
/// against the server computation.
///
/// ## Why Absolute?
/// The platform terms fix the tolerance at 0.01 currency unit
/// regardless of order magnitude. A mismatch beyond this is rejected as
/// tampering, never silently corrected.
pub const FEE_EPSILON_CENTS: i64 = 1;

/// Maximum quantity of a single listing in one order.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ORDER_QUANTITY: i64 = 999;
