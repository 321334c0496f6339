//! # Engine Handle
//!
//! The [`Engine`] owns the database handle and the IP-origin resolver and
//! exposes every operation as a method. Operations live in the `ops`
//! submodules; this file is only construction and the shared load/authorize
//! helpers.

use std::sync::Arc;

use bazaar_core::{CoreError, Listing, Order, Role};
use bazaar_db::{Database, DbConfig};

use crate::error::{EngineError, EngineResult};
use crate::geo::{IpLocator, OfflineLocator};

/// Marketplace operation façade.
///
/// Cheap to clone (the pool and the resolver are shared); hand one to each
/// request handler.
#[derive(Clone)]
pub struct Engine {
    pub(crate) db: Database,
    pub(crate) locator: Arc<dyn IpLocator>,
}

impl Engine {
    /// Opens the database (running migrations per config) and builds an
    /// engine with the offline IP resolver.
    pub async fn new(config: DbConfig) -> EngineResult<Self> {
        let db = Database::new(config).await?;
        Ok(Engine::with_database(db))
    }

    /// Builds an engine over an already-open database.
    pub fn with_database(db: Database) -> Self {
        Engine {
            db,
            locator: Arc::new(OfflineLocator),
        }
    }

    /// Builds an engine with a custom IP-origin resolver.
    pub fn with_locator(db: Database, locator: Arc<dyn IpLocator>) -> Self {
        Engine { db, locator }
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Shared Helpers
    // =========================================================================

    /// Loads a listing or rejects with NOT_FOUND.
    pub(crate) async fn load_listing(&self, id: &str) -> EngineResult<Listing> {
        self.db
            .listings()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Listing", id))
    }

    /// Loads an order or rejects with NOT_FOUND.
    pub(crate) async fn load_order(&self, id: &str) -> EngineResult<Order> {
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Order", id))
    }

    /// Resolves the actor's role on an order; non-parties are rejected
    /// before any state is examined.
    pub(crate) fn party_role(order: &Order, actor_id: &str) -> EngineResult<Role> {
        order.role_of(actor_id).ok_or_else(|| {
            EngineError::from(CoreError::NotAParty {
                entity: "Order",
                id: order.id.clone(),
            })
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("db", &self.db).finish()
    }
}
