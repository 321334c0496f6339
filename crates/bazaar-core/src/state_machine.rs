//! # Order State Machine
//!
//! One generic transition engine serves both order variants. The variants
//! share an almost-identical shape with different edges; the differences
//! live entirely in two static adjacency tables rather than duplicated
//! per-variant logic.
//!
//! ## Transition Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PROXY-PURCHASE                                                         │
//! │                                                                         │
//! │  pending ──paid(B)──► paid ──processing(S)──► processing               │
//! │     │                   │                         │                     │
//! │     │cancelled(B|S)     │refunded(S)              │shipping(S)          │
//! │     ▼                   ▼                         ▼                     │
//! │  cancelled           refunded                 shipping ──completed(B)─► │
//! │                                                              completed  │
//! │                                                                         │
//! │  MARKETPLACE                                                            │
//! │                                                                         │
//! │  pending ──paid(B)──► paid ──shipping(S)──► shipping ──received(B)──►  │
//! │     │                   │                               received        │
//! │     │cancelled(B|S)     │cancelled(B|S)                    │            │
//! │     ▼                   ▼                                  │completed(B)│
//! │  cancelled           cancelled                             ▼            │
//! │                                               completed (settled)       │
//! │                                                                         │
//! │  (B) = buyer-initiated   (S) = seller-initiated   (B|S) = either        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Check Order
//! 1. Actor is a party to the order (engine resolves the role) - otherwise
//!    an authorization error before any state is examined.
//! 2. The requested edge exists from the current state - otherwise a
//!    state-conflict error, regardless of who asked.
//! 3. The edge's initiator permits the actor's role - otherwise an
//!    authorization error.
//!
//! A request failing any check leaves the order unchanged.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderKind, OrderStatus, Role};

// =============================================================================
// Initiator
// =============================================================================

/// Who may initiate a given transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    Buyer,
    Seller,
    Either,
}

impl Initiator {
    /// Checks whether a role may initiate a transition with this initiator.
    pub const fn permits(&self, role: Role) -> bool {
        match self {
            Initiator::Buyer => matches!(role, Role::Buyer),
            Initiator::Seller => matches!(role, Role::Seller),
            Initiator::Either => true,
        }
    }
}

// =============================================================================
// Adjacency Tables
// =============================================================================

/// A single legal edge in an order lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub to: OrderStatus,
    pub initiator: Initiator,
}

const fn t(to: OrderStatus, initiator: Initiator) -> Transition {
    Transition { to, initiator }
}

const PROXY_PENDING: &[Transition] = &[
    t(OrderStatus::Paid, Initiator::Buyer),
    t(OrderStatus::Cancelled, Initiator::Either),
];
const PROXY_PAID: &[Transition] = &[
    t(OrderStatus::Processing, Initiator::Seller),
    t(OrderStatus::Refunded, Initiator::Seller),
];
const PROXY_PROCESSING: &[Transition] = &[t(OrderStatus::Shipping, Initiator::Seller)];
const PROXY_SHIPPING: &[Transition] = &[t(OrderStatus::Completed, Initiator::Buyer)];

const MARKET_PENDING: &[Transition] = &[
    t(OrderStatus::Paid, Initiator::Buyer),
    t(OrderStatus::Cancelled, Initiator::Either),
];
const MARKET_PAID: &[Transition] = &[
    t(OrderStatus::Shipping, Initiator::Seller),
    t(OrderStatus::Cancelled, Initiator::Either),
];
const MARKET_SHIPPING: &[Transition] = &[t(OrderStatus::Received, Initiator::Buyer)];
const MARKET_RECEIVED: &[Transition] = &[t(OrderStatus::Completed, Initiator::Buyer)];

/// Returns the legal outgoing edges for a state, per order kind.
///
/// Terminal states (`completed`, `cancelled`, `refunded`) and states a
/// variant never enters return the empty slice.
pub fn allowed_transitions(kind: OrderKind, from: OrderStatus) -> &'static [Transition] {
    match kind {
        OrderKind::ProxyPurchase => match from {
            OrderStatus::Pending => PROXY_PENDING,
            OrderStatus::Paid => PROXY_PAID,
            OrderStatus::Processing => PROXY_PROCESSING,
            OrderStatus::Shipping => PROXY_SHIPPING,
            _ => &[],
        },
        OrderKind::Marketplace => match from {
            OrderStatus::Pending => MARKET_PENDING,
            OrderStatus::Paid => MARKET_PAID,
            OrderStatus::Shipping => MARKET_SHIPPING,
            OrderStatus::Received => MARKET_RECEIVED,
            _ => &[],
        },
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a requested transition against the adjacency table and the
/// actor's role.
///
/// ## Errors
/// - [`CoreError::InvalidTransition`] - the edge is not in the table for the
///   current state (state-conflict class; caller may re-read and retry).
/// - [`CoreError::NotPermitted`] - the edge exists but this role may not
///   initiate it.
pub fn validate_transition(
    kind: OrderKind,
    from: OrderStatus,
    to: OrderStatus,
    role: Role,
) -> CoreResult<()> {
    let edge = allowed_transitions(kind, from)
        .iter()
        .find(|transition| transition.to == to);

    match edge {
        None => Err(CoreError::InvalidTransition { kind, from, to }),
        Some(transition) if !transition.initiator.permits(role) => {
            Err(CoreError::NotPermitted { role, from, to })
        }
        Some(_) => Ok(()),
    }
}

// =============================================================================
// Timestamping
// =============================================================================

/// Applies a validated transition to an in-memory order, stamping the
/// matching lifecycle timestamp.
///
/// This only mutates the in-memory value; persisting it is the repository's
/// job (and the persisted write re-checks the expected current status, so a
/// concurrent winner turns this into a conflict rather than a lost update).
pub fn apply_transition(order: &mut Order, to: OrderStatus, now: DateTime<Utc>) {
    order.status = to;
    order.updated_at = now;

    match to {
        OrderStatus::Paid => order.paid_at = Some(now),
        OrderStatus::Processing => order.purchased_at = Some(now),
        OrderStatus::Shipping => order.shipped_at = Some(now),
        OrderStatus::Received => order.received_at = Some(now),
        OrderStatus::Completed => order.completed_at = Some(now),
        OrderStatus::Cancelled => order.cancelled_at = Some(now),
        OrderStatus::Refunded | OrderStatus::Pending => {}
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
