//! # Request Payloads
//!
//! Deserializable inputs for engine operations. Field names follow the
//! camelCase convention of the JSON clients.
//!
//! ## Trust Boundary
//! Everything in this module is client-supplied and therefore untrusted:
//! fee fields are verified against the server computation, ids are resolved
//! against the database, and the actor's authority is re-checked per
//! operation. Snapshots are the one exception - they are display copies the
//! client saw at commit time and are stored as-is.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use bazaar_core::{DeliveryMethod, ListingKind, ShippingAddress};

// =============================================================================
// Consent
// =============================================================================

/// A party's acceptance of the platform terms, attached to the operation
/// that required it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentPayload {
    /// Terms-document version the party saw.
    pub version: String,
    /// Client-reported acceptance instant; the server clock is used when
    /// absent.
    #[serde(default)]
    pub agreed_at: Option<DateTime<Utc>>,
    /// Client-reported address; the request's `client_ip` is used when
    /// absent.
    #[serde(default)]
    pub agreed_ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Display snapshot of a party, captured at order creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySnapshot {
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

// =============================================================================
// Listings
// =============================================================================

/// Input for creating a listing of either kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub kind: ListingKind,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,

    /// Unit price in cents. Required for items; a want-ad may omit it - the
    /// fulfiller quotes the real price when submitting the order.
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub original_price_cents: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    /// Want-ad fulfillment quantity. Items are single-unit regardless.
    #[serde(default = "default_quantity")]
    pub required_quantity: i64,

    // Want-ad specifics
    #[serde(default)]
    pub target_country: Option<String>,
    #[serde(default)]
    pub expected_return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expected_tip_cents: i64,

    // Marketplace specifics
    #[serde(default)]
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(default)]
    pub shipping_fee_cents: i64,

    pub client_ip: String,
    #[serde(default)]
    pub consent: Option<ConsentPayload>,
}

fn default_currency() -> String {
    "CNY".to_string()
}

const fn default_quantity() -> i64 {
    1
}

// =============================================================================
// Orders
// =============================================================================

/// A fulfiller's price submission against a claimed want-ad.
///
/// The fee fields are the client's own computation of the breakdown; the
/// engine recomputes and verifies each one before anything is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProxyOrder {
    pub listing_id: String,
    pub fulfiller_id: String,
    pub quantity: i64,

    /// The real per-unit price the fulfiller found in the target country.
    pub unit_price_cents: i64,
    #[serde(default)]
    pub original_price_cents: Option<i64>,
    pub service_fee_cents: i64,
    pub platform_fee_cents: i64,
    #[serde(default)]
    pub tip_cents: i64,
    pub total_cents: i64,

    #[serde(default)]
    pub notes: Option<String>,
    pub client_ip: String,
    /// The fulfiller consents as the order's seller when submitting.
    pub consent: ConsentPayload,

    #[serde(default)]
    pub buyer_snapshot: Option<PartySnapshot>,
    #[serde(default)]
    pub seller_snapshot: Option<PartySnapshot>,
}

/// A buyer's purchase of a marketplace item.
///
/// The unit price comes from the listing server-side; only the fee fields
/// are client-supplied, and each is verified.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarketplaceOrder {
    pub listing_id: String,
    pub buyer_id: String,

    pub platform_fee_cents: i64,
    pub shipping_fee_cents: i64,
    pub total_cents: i64,

    #[serde(default)]
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(default)]
    pub notes: Option<String>,
    pub client_ip: String,
    /// The buyer consents when committing to the purchase.
    pub consent: ConsentPayload,

    #[serde(default)]
    pub buyer_snapshot: Option<PartySnapshot>,
    #[serde(default)]
    pub seller_snapshot: Option<PartySnapshot>,
}

/// Delivery details captured when the buyer pays.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub pickup_address: Option<String>,
    pub client_ip: String,
    #[serde(default)]
    pub consent: Option<ConsentPayload>,
}
