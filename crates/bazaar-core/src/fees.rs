//! # Fee Calculator
//!
//! Pure functions mapping transaction value to platform commission.
//!
//! ## Two Schedules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Fee Schedules                                   │
//! │                                                                         │
//! │  MARKETPLACE (tiered, on goods total)   PROXY-PURCHASE (fixed rates)    │
//! │  ──────────────────────────────────     ──────────────────────────────  │
//! │  ≤   500.00          5.0%               service fee  = 10% of subtotal  │
//! │  ≤ 3 000.00          4.0%               platform fee =  5% of subtotal  │
//! │  ≤ 10 000.00         3.0%               total = subtotal + service      │
//! │  >  10 000.00        2.5%                     + platform + shipping     │
//! │                                               + optional tip            │
//! │  (boundaries inclusive on the lower tier)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tamper Defense
//! Clients compute the breakdown for display and submit it with the order.
//! The engine recomputes every fee server-side and compares within
//! [`crate::FEE_EPSILON_CENTS`]; any mismatch is a validation error, never a
//! silent correction.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{FeeRate, Money};
use crate::FEE_EPSILON_CENTS;

// =============================================================================
// Rates
// =============================================================================

/// Proxy-purchase service fee: fulfiller compensation, 10% of the goods
/// subtotal.
pub const PROXY_SERVICE_RATE: FeeRate = FeeRate::from_bps(1000);

/// Proxy-purchase platform commission: 5% of the goods subtotal.
pub const PROXY_PLATFORM_RATE: FeeRate = FeeRate::from_bps(500);

/// Marketplace tier table: (inclusive upper bound in cents, rate).
/// The final tier has no upper bound.
const MARKETPLACE_TIERS: [(i64, FeeRate); 3] = [
    (50_000, FeeRate::from_bps(500)),
    (300_000, FeeRate::from_bps(400)),
    (1_000_000, FeeRate::from_bps(300)),
];

/// Rate applied above the last tier boundary.
const MARKETPLACE_TOP_RATE: FeeRate = FeeRate::from_bps(250);

// =============================================================================
// Marketplace: Tiered Platform Fee
// =============================================================================

/// Computes the tiered marketplace platform fee on the goods total.
///
/// Boundaries are inclusive on the lower tier: a goods total of exactly
/// 500.00 is charged 5%, 500.01 is charged 4%.
pub fn marketplace_platform_fee(goods_total: Money) -> Money {
    for (bound_cents, rate) in MARKETPLACE_TIERS {
        if goods_total.cents() <= bound_cents {
            return goods_total.apply_rate(rate);
        }
    }
    goods_total.apply_rate(MARKETPLACE_TOP_RATE)
}

// =============================================================================
// Proxy-Purchase: Fixed-Rate Breakdown
// =============================================================================

/// The server-computed fee breakdown for a proxy-purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyFeeBreakdown {
    pub subtotal: Money,
    pub service_fee: Money,
    pub platform_fee: Money,
    pub shipping_fee: Money,
    pub tip: Money,
    pub total: Money,
}

/// Computes the proxy-purchase fee breakdown.
///
/// total = subtotal + service fee (10%) + platform fee (5%) + shipping + tip
pub fn proxy_fee_breakdown(
    unit_price: Money,
    quantity: i64,
    shipping_fee: Money,
    tip: Money,
) -> ProxyFeeBreakdown {
    let subtotal = unit_price.multiply_quantity(quantity);
    let service_fee = subtotal.apply_rate(PROXY_SERVICE_RATE);
    let platform_fee = subtotal.apply_rate(PROXY_PLATFORM_RATE);
    // Saturating: an absurd client price cannot wrap the total, it lands at
    // the bound and fails verification instead
    let total = subtotal
        .saturating_add(service_fee)
        .saturating_add(platform_fee)
        .saturating_add(shipping_fee)
        .saturating_add(tip);

    ProxyFeeBreakdown {
        subtotal,
        service_fee,
        platform_fee,
        shipping_fee,
        tip,
        total,
    }
}

// =============================================================================
// Client Fee Verification
// =============================================================================

/// Verifies a client-supplied fee value against the server computation.
///
/// ## Errors
/// [`CoreError::FeeMismatch`] when the values differ by more than the
/// absolute epsilon. The order is rejected before any mutation.
pub fn verify_supplied_fee(
    field: &'static str,
    supplied: Money,
    expected: Money,
) -> CoreResult<()> {
    if expected.within_epsilon(supplied, FEE_EPSILON_CENTS) {
        Ok(())
    } else {
        Err(CoreError::FeeMismatch {
            field,
            supplied_cents: supplied.cents(),
            expected_cents: expected.cents(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
