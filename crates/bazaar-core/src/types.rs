//! # Domain Types
//!
//! Core domain types shared by both commerce workflows.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Listing      │   │      Order      │   │ LegalAgreement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  kind (variant) │   │  kind (variant) │   │  actor + role   │       │
//! │  │  owner_id       │   │  buyer/seller   │   │  version        │       │
//! │  │  available_count│   │  fee breakdown  │   │  agreed_at/ip   │       │
//! │  │  status         │   │  status         │   │  (append-only)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Variants, One Shape
//! The proxy-purchase flow (a buyer posts a want-ad, a fulfiller claims and
//! fulfils it) and the marketplace flow (direct listing and purchase) share
//! structurally parallel Listing and Order types, keyed by [`ListingKind`] /
//! [`OrderKind`]. Lifecycle legality differences live entirely in the
//! transition tables in [`crate::state_machine`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Variant Discriminators
// =============================================================================

/// Which commerce workflow a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Proxy-purchase want-ad: a buyer posts a need, a fulfiller claims it.
    WantAd,
    /// Peer-to-peer marketplace item: direct listing and purchase.
    Item,
}

impl ListingKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ListingKind::WantAd => "want_ad",
            ListingKind::Item => "item",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "want_ad" => Some(ListingKind::WantAd),
            "item" => Some(ListingKind::Item),
            _ => None,
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which commerce workflow an order belongs to. Mirrors [`ListingKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    ProxyPurchase,
    Marketplace,
}

impl OrderKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderKind::ProxyPurchase => "proxy_purchase",
            OrderKind::Marketplace => "marketplace",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "proxy_purchase" => Some(OrderKind::ProxyPurchase),
            "marketplace" => Some(OrderKind::Marketplace),
            _ => None,
        }
    }

    /// The listing kind this order kind transacts against.
    pub const fn listing_kind(&self) -> ListingKind {
        match self {
            OrderKind::ProxyPurchase => ListingKind::WantAd,
            OrderKind::Marketplace => ListingKind::Item,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Listing Status
// =============================================================================

/// The lifecycle status of a listing.
///
/// One enum serves both variants; the marketplace reading of each label is
/// noted below. Legality of movements between these states is enforced by
/// the inventory ledger, not free-form writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Open for business: want-ad awaiting a fulfiller / item available.
    Pending,
    /// Claimed by exactly one fulfiller / reserved by one pending order.
    Accepted,
    /// Proxy-purchase only: the fulfiller has bought the goods.
    Purchased,
    /// Goods are in transit.
    Shipping,
    /// Terminal success: want-ad fulfilled / item sold.
    Completed,
    /// Terminal: cancelled by owner / removed.
    Cancelled,
}

impl ListingStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Accepted => "accepted",
            ListingStatus::Purchased => "purchased",
            ListingStatus::Shipping => "shipping",
            ListingStatus::Completed => "completed",
            ListingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ListingStatus::Pending),
            "accepted" => Some(ListingStatus::Accepted),
            "purchased" => Some(ListingStatus::Purchased),
            "shipping" => Some(ListingStatus::Shipping),
            "completed" => Some(ListingStatus::Completed),
            "cancelled" => Some(ListingStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Pending
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
///
/// Not every variant uses every state: `Processing` is proxy-purchase only
/// (the fulfiller has bought the goods), `Received` is marketplace only
/// (buyer signed for the parcel, immediately followed by `Completed`).
/// The per-kind adjacency tables in [`crate::state_machine`] are the single
/// source of truth for what moves are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipping,
    Received,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Received => "received",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "processing" => Some(OrderStatus::Processing),
            "shipping" => Some(OrderStatus::Shipping),
            "received" => Some(OrderStatus::Received),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "refunded" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Settlement Status
// =============================================================================

/// Settlement progress, tracked independently of the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl SettlementStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Processing => "processing",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SettlementStatus::Pending),
            "processing" => Some(SettlementStatus::Processing),
            "completed" => Some(SettlementStatus::Completed),
            "failed" => Some(SettlementStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SettlementStatus {
    fn default() -> Self {
        SettlementStatus::Pending
    }
}

// =============================================================================
// Roles & Delivery
// =============================================================================

/// A party's role relative to an order: the buyer pays, the seller (or
/// fulfiller, in the proxy-purchase flow) delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(Role::Buyer),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a marketplace item changes hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,
    Shipping,
    Negotiable,
}

impl DeliveryMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Shipping => "shipping",
            DeliveryMethod::Negotiable => "negotiable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(DeliveryMethod::Pickup),
            "shipping" => Some(DeliveryMethod::Shipping),
            "negotiable" => Some(DeliveryMethod::Negotiable),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for DeliveryMethod {
    fn default() -> Self {
        DeliveryMethod::Negotiable
    }
}

// =============================================================================
// Shipping Address
// =============================================================================

/// A delivery address, captured when the buyer pays.
///
/// Stored as a JSON column on the order; the postal code is the only
/// optional part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub receiver_name: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub postal_code: Option<String>,
}

// =============================================================================
// Listing
// =============================================================================

/// A want-ad (proxy-purchase) or item (marketplace) offered for transaction.
///
/// ## Inventory Fields
/// `available_count` is the remaining claimable quantity and is never
/// negative; `orders_count` counts quantity bound into live orders. Both are
/// updated only through the inventory ledger (delta updates gated on the
/// current row state), never by read-modify-write in handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Which workflow this listing belongs to.
    pub kind: ListingKind,

    /// The user who posted the listing (want-ad poster / item seller).
    pub owner_id: String,

    pub title: String,
    pub description: String,

    /// Opaque media reference strings; content is never validated here.
    pub images: Vec<String>,

    /// Unit price in cents. A want-ad may start at zero - the fulfiller
    /// fills the real price in when submitting the order.
    pub price_cents: i64,
    pub original_price_cents: Option<i64>,
    pub currency: String,

    pub location: Option<String>,
    /// Best-effort origin label from the geolocation resolver.
    pub ip_location: Option<String>,
    pub category: Option<String>,
    /// Marketplace item condition (new/like-new/...); free-form here.
    pub condition: Option<String>,
    pub tags: Vec<String>,

    /// Target fulfillment quantity declared by the poster.
    pub required_quantity: i64,
    /// Remaining claimable quantity. Invariant: never negative.
    pub available_count: i64,
    /// Quantity currently bound into live orders.
    pub orders_count: i64,

    // Want-ad specifics
    pub target_country: Option<String>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub expected_tip_cents: i64,

    // Marketplace specifics
    pub delivery_method: Option<DeliveryMethod>,
    pub shipping_fee_cents: i64,

    /// The fulfiller who claimed this want-ad. At most one at a time.
    pub accepted_by: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,

    pub status: ListingStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `actor_id` owns this listing.
    #[inline]
    pub fn is_owner(&self, actor_id: &str) -> bool {
        self.owner_id == actor_id
    }

    /// Checks whether the listing can supply `quantity` more units.
    #[inline]
    pub fn can_supply(&self, quantity: i64) -> bool {
        quantity > 0 && quantity <= self.available_count
    }
}

// =============================================================================
// Order
// =============================================================================

/// A transaction instance binding a buyer, a seller/fulfiller, and a listing.
///
/// ## Financial Immutability
/// The fee breakdown (`*_cents` fields through `total_cents`) is fixed at
/// creation: `total_cents` equals the sum of its declared components and is
/// never recomputed afterwards.
///
/// ## Snapshot Pattern
/// `item_title`, `item_image` and the party username/avatar fields are
/// point-in-time copies taken at order creation. They deliberately do NOT
/// track later edits to the listing or user profiles - an order is a record
/// of what the parties saw when they committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub kind: OrderKind,
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub quantity: i64,

    // Fee breakdown - immutable once created
    /// Unit price at order creation.
    pub unit_price_cents: i64,
    /// Goods total: unit price × quantity.
    pub subtotal_cents: i64,
    /// Proxy-purchase only: fulfiller compensation (10% of subtotal).
    pub service_fee_cents: i64,
    /// Platform commission (fixed 5% for proxy-purchase, tiered for
    /// marketplace).
    pub platform_fee_cents: i64,
    pub shipping_fee_cents: i64,
    /// Proxy-purchase only: optional tip to the fulfiller.
    pub tip_cents: i64,
    /// Sum of all components above. Never recomputed after creation.
    pub total_cents: i64,

    // Settlement - written exactly once, at receipt confirmation
    pub settlement_amount_cents: Option<i64>,
    pub platform_revenue_cents: Option<i64>,
    pub settlement_status: SettlementStatus,
    pub settled_at: Option<DateTime<Utc>>,

    pub status: OrderStatus,

    pub delivery_method: Option<DeliveryMethod>,
    pub shipping_address: Option<ShippingAddress>,
    pub pickup_address: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_company: Option<String>,
    /// Opaque evidence references uploaded by the proxy-purchase fulfiller
    /// (store receipts, photos of the goods).
    pub purchase_evidence: Vec<String>,
    pub notes: Option<String>,
    pub ip_location: Option<String>,

    // Point-in-time display snapshots (see struct docs)
    pub item_title: Option<String>,
    pub item_image: Option<String>,
    pub buyer_username: Option<String>,
    pub buyer_avatar_url: Option<String>,
    pub seller_username: Option<String>,
    pub seller_avatar_url: Option<String>,

    // Consent echoes; the authoritative records live in legal_agreements
    pub buyer_agreed_at: Option<DateTime<Utc>>,
    pub buyer_agreed_ip: Option<String>,
    pub seller_agreed_at: Option<DateTime<Utc>>,
    pub seller_agreed_ip: Option<String>,
    pub agreement_version: Option<String>,

    // Transition timestamps
    pub paid_at: Option<DateTime<Utc>>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Resolves an actor to their role on this order, if they are a party.
    pub fn role_of(&self, actor_id: &str) -> Option<Role> {
        if self.buyer_id == actor_id {
            Some(Role::Buyer)
        } else if self.seller_id == actor_id {
            Some(Role::Seller)
        } else {
            None
        }
    }

    /// Returns the immutable order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Goods total (unit price × quantity) as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Legal Agreement
// =============================================================================

/// An immutable record proving a party agreed to specific legal terms at a
/// specific time.
///
/// ## Append-Only
/// Agreements are never updated or deleted. One record is written per
/// (actor, transaction, role) consent event; a transaction accumulates
/// several as it moves through its consent points (creation, acceptance,
/// payment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalAgreement {
    pub id: String,
    pub actor_id: String,
    pub role: Role,
    pub listing_id: Option<String>,
    pub order_id: Option<String>,
    /// Terms-document version string, recorded as supplied by the caller.
    pub version: String,
    pub agreed_at: DateTime<Utc>,
    /// Originating network address (best-effort label).
    pub agreed_ip: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
