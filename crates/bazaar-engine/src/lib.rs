//! # bazaar-engine: Order Lifecycle Orchestration
//!
//! The request-driven layer of the Bazaar marketplace backend. It validates
//! inbound actions against the business rules in `bazaar-core` and applies
//! them through the repositories in `bazaar-db`, keeping each paired
//! (listing, order) mutation on one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              ★ bazaar-engine (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │ listings │  │  orders  │  │ consent  │  │ geo / errors │   │   │
//! │  │   │ post &   │  │ create & │  │ append-  │  │ IP labels,   │   │   │
//! │  │   │ claim    │  │ lifecycle│  │ only log │  │ error codes  │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  └───────────────┬───────────────────────────┬─────────────────────┘   │
//! │                  │ rules                     │ persistence             │
//! │  ┌───────────────▼────────────┐  ┌───────────▼─────────────────────┐   │
//! │  │        bazaar-core         │  │          bazaar-db              │   │
//! │  │  fees, state machine,      │  │  SQLite repositories,           │   │
//! │  │  settlement, validation    │  │  inventory ledger               │   │
//! │  └────────────────────────────┘  └─────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation Catalog
//! - Listings: `create_listing`, `accept_listing` (claim), `remove_listing`,
//!   `get_listing`, `list_open_listings`, `list_my_listings`
//! - Orders: `create_proxy_order`, `create_marketplace_order`, `pay_order`,
//!   `mark_purchased`, `ship_order`, `update_tracking`, `confirm_receipt`
//!   (settles), `cancel_order`, `refund_order`, `get_order`, `list_orders`,
//!   `list_listing_orders`
//! - Consent: `record_consent`, `list_order_consents`, `list_my_consents`
//!
//! ## Example
//! ```rust,ignore
//! use bazaar_engine::{Engine, requests::NewListing};
//! use bazaar_db::DbConfig;
//!
//! let engine = Engine::new(DbConfig::new("/var/lib/bazaar/bazaar.db")).await?;
//! let listing = engine.create_listing(new_listing).await?;
//! ```

mod engine;
pub mod error;
pub mod geo;
mod ops;
pub mod requests;
pub mod telemetry;

pub use engine::Engine;
pub use error::{EngineError, EngineResult, ErrorCode};
pub use geo::{IpLocator, OfflineLocator};
pub use telemetry::init_telemetry;
