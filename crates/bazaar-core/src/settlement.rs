//! # Settlement Processor
//!
//! Computes the final payout/platform-revenue split when an order reaches
//! its terminal success state.
//!
//! ## Split Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PROXY-PURCHASE                       MARKETPLACE                       │
//! │  ──────────────                       ───────────                       │
//! │  payout   = subtotal                  payout   = subtotal               │
//! │           + service fee                        - platform fee           │
//! │           + tip                                                         │
//! │  platform = platform fee              platform = platform fee           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exactly Once
//! Settlement happens synchronously inside the receipt-confirmation
//! transition and an order settles exactly once. Re-invocation against an
//! already-settled order is an invariant violation: it is rejected (and the
//! engine logs it loudly), never silently recomputed or re-credited.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Order, OrderKind, SettlementStatus};

// =============================================================================
// Settlement
// =============================================================================

/// The result of settling one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Amount due to the fulfilling party (fulfiller or seller).
    pub settlement_amount: Money,
    /// Amount retained by the platform.
    pub platform_revenue: Money,
}

/// Computes the settlement split for an order.
///
/// Pure: reads the order's immutable fee breakdown and returns the split.
/// Persisting the result (and gating it on the order's current state) is
/// the caller's job.
///
/// ## Errors
/// [`CoreError::AlreadySettled`] if the order already carries settlement
/// figures or a completed settlement status.
pub fn settle(order: &Order) -> CoreResult<Settlement> {
    if order.settlement_status == SettlementStatus::Completed
        || order.settlement_amount_cents.is_some()
    {
        return Err(CoreError::AlreadySettled {
            order_id: order.id.clone(),
        });
    }

    let subtotal = Money::from_cents(order.subtotal_cents);
    let platform_fee = Money::from_cents(order.platform_fee_cents);

    let settlement_amount = match order.kind {
        // Goods money the fulfiller fronted, plus their compensation and tip
        OrderKind::ProxyPurchase => {
            subtotal + Money::from_cents(order.service_fee_cents) + Money::from_cents(order.tip_cents)
        }
        // Seller receives the goods total minus the commission
        OrderKind::Marketplace => subtotal - platform_fee,
    };

    Ok(Settlement {
        settlement_amount,
        platform_revenue: platform_fee,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
