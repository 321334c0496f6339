//! # Order Operations
//!
//! Order creation and the full lifecycle: payment, fulfillment, shipment,
//! receipt confirmation (with settlement), cancellation, refund.
//!
//! ## Operation Shape
//! Every mutation follows the same sequence:
//! ```text
//! load ─► authorize (party/role) ─► validate (fields, fees, transition)
//!      ─► one transaction pairing the order write with its listing write
//!      ─► reload and return
//! ```
//! The repositories re-check the expected current state inside each UPDATE,
//! so a concurrent winner turns a stale request into a retryable conflict
//! instead of a lost update.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use bazaar_core::{
    fees, settlement, state_machine, validation, CoreError, DeliveryMethod, ListingKind,
    ListingStatus, Money, Order, OrderKind, OrderStatus, Role, SettlementStatus,
};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult, ErrorCode};
use crate::ops::consent::consent_record;
use crate::requests::{NewMarketplaceOrder, NewProxyOrder, PartySnapshot, PaymentDetails};

impl Engine {
    // =========================================================================
    // Creation
    // =========================================================================

    /// Submits a proxy-purchase order: the claiming fulfiller quotes the
    /// real price they found against the want-ad.
    ///
    /// The want-ad's poster becomes the buyer, the fulfiller the seller.
    /// Supply is reserved, the quoted price lands on the listing, and the
    /// order plus the fulfiller's consent commit in one transaction.
    pub async fn create_proxy_order(&self, req: NewProxyOrder) -> EngineResult<Order> {
        let listing = self.load_listing(&req.listing_id).await?;
        if listing.kind != ListingKind::WantAd {
            return Err(EngineError::validation(
                "Proxy-purchase orders require a want-ad listing",
            ));
        }

        // Only the fulfiller who claimed the want-ad may submit against it
        match listing.accepted_by.as_deref() {
            Some(fulfiller) if fulfiller == req.fulfiller_id => {}
            Some(_) => {
                return Err(EngineError::not_permitted(
                    "Only the claiming fulfiller may submit an order",
                ))
            }
            None => {
                return Err(EngineError::new(
                    ErrorCode::Conflict,
                    "Want-ad has not been claimed yet",
                ))
            }
        }

        validation::validate_availability(&listing, req.quantity)?;
        validation::require_positive("unit_price", req.unit_price_cents)
            .map_err(CoreError::from)?;
        validation::require_non_negative("tip", req.tip_cents).map_err(CoreError::from)?;

        // Recompute the breakdown server-side and hold the client to it
        let breakdown = fees::proxy_fee_breakdown(
            Money::from_cents(req.unit_price_cents),
            req.quantity,
            Money::zero(),
            Money::from_cents(req.tip_cents),
        );
        fees::verify_supplied_fee(
            "service_fee",
            Money::from_cents(req.service_fee_cents),
            breakdown.service_fee,
        )?;
        fees::verify_supplied_fee(
            "platform_fee",
            Money::from_cents(req.platform_fee_cents),
            breakdown.platform_fee,
        )?;
        fees::verify_supplied_fee("total", Money::from_cents(req.total_cents), breakdown.total)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            kind: OrderKind::ProxyPurchase,
            listing_id: listing.id.clone(),
            buyer_id: listing.owner_id.clone(),
            seller_id: req.fulfiller_id.clone(),
            quantity: req.quantity,
            unit_price_cents: req.unit_price_cents,
            subtotal_cents: breakdown.subtotal.cents(),
            // The verified client values are what get persisted
            service_fee_cents: req.service_fee_cents,
            platform_fee_cents: req.platform_fee_cents,
            shipping_fee_cents: 0,
            tip_cents: req.tip_cents,
            total_cents: req.total_cents,
            settlement_amount_cents: None,
            platform_revenue_cents: None,
            settlement_status: SettlementStatus::Pending,
            settled_at: None,
            status: OrderStatus::Pending,
            delivery_method: None,
            shipping_address: None,
            pickup_address: None,
            tracking_number: None,
            tracking_company: None,
            purchase_evidence: vec![],
            notes: req.notes.clone(),
            ip_location: Some(self.locator.label(&req.client_ip)),
            item_title: Some(listing.title.clone()),
            item_image: listing.images.first().cloned(),
            buyer_username: snapshot_name(&req.buyer_snapshot),
            buyer_avatar_url: snapshot_avatar(&req.buyer_snapshot),
            seller_username: snapshot_name(&req.seller_snapshot),
            seller_avatar_url: snapshot_avatar(&req.seller_snapshot),
            buyer_agreed_at: None,
            buyer_agreed_ip: None,
            seller_agreed_at: Some(req.consent.agreed_at.unwrap_or(now)),
            seller_agreed_ip: Some(
                req.consent
                    .agreed_ip
                    .clone()
                    .unwrap_or_else(|| req.client_ip.clone()),
            ),
            agreement_version: Some(req.consent.version.clone()),
            paid_at: None,
            purchased_at: None,
            shipped_at: None,
            received_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.pool().begin().await?;
        self.db
            .listings()
            .reserve_supply(&mut tx, &listing.id, req.quantity, now)
            .await?;
        self.db
            .listings()
            .update_quoted_price(
                &mut tx,
                &listing.id,
                req.unit_price_cents,
                req.original_price_cents,
                now,
            )
            .await?;
        self.db.orders().insert(&mut tx, &order).await?;

        let record = consent_record(
            &req.fulfiller_id,
            Role::Seller,
            Some(&listing.id),
            Some(&order.id),
            &req.consent,
            &req.client_ip,
            now,
        );
        self.db.agreements().insert(&mut tx, &record).await?;
        tx.commit().await?;

        info!(
            id = %order.id,
            listing = %listing.id,
            total_cents = order.total_cents,
            "Proxy-purchase order created"
        );
        Ok(order)
    }

    /// Creates a marketplace order: a buyer commits to an open item.
    ///
    /// The unit price is the listing's, never the client's. The item is
    /// reserved and the order plus the buyer's consent commit in one
    /// transaction.
    pub async fn create_marketplace_order(&self, req: NewMarketplaceOrder) -> EngineResult<Order> {
        let listing = self.load_listing(&req.listing_id).await?;
        if listing.kind != ListingKind::Item {
            return Err(EngineError::validation(
                "Marketplace orders require an item listing",
            ));
        }
        validation::reject_self_dealing(&listing, &req.buyer_id)?;
        if listing.status != ListingStatus::Pending {
            return Err(EngineError::new(
                ErrorCode::Conflict,
                "Item is no longer available",
            ));
        }

        let subtotal = Money::from_cents(listing.price_cents);
        let expected_platform = fees::marketplace_platform_fee(subtotal);
        fees::verify_supplied_fee(
            "platform_fee",
            Money::from_cents(req.platform_fee_cents),
            expected_platform,
        )?;
        fees::verify_supplied_fee(
            "shipping_fee",
            Money::from_cents(req.shipping_fee_cents),
            Money::from_cents(listing.shipping_fee_cents),
        )?;
        // The total must be the sum of its own declared components
        let expected_total = subtotal
            + Money::from_cents(req.platform_fee_cents)
            + Money::from_cents(req.shipping_fee_cents);
        fees::verify_supplied_fee("total", Money::from_cents(req.total_cents), expected_total)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            kind: OrderKind::Marketplace,
            listing_id: listing.id.clone(),
            buyer_id: req.buyer_id.clone(),
            seller_id: listing.owner_id.clone(),
            quantity: 1,
            unit_price_cents: listing.price_cents,
            subtotal_cents: subtotal.cents(),
            service_fee_cents: 0,
            platform_fee_cents: req.platform_fee_cents,
            shipping_fee_cents: req.shipping_fee_cents,
            tip_cents: 0,
            total_cents: req.total_cents,
            settlement_amount_cents: None,
            platform_revenue_cents: None,
            settlement_status: SettlementStatus::Pending,
            settled_at: None,
            status: OrderStatus::Pending,
            delivery_method: req.delivery_method.or(listing.delivery_method),
            shipping_address: None,
            pickup_address: None,
            tracking_number: None,
            tracking_company: None,
            purchase_evidence: vec![],
            notes: req.notes.clone(),
            ip_location: Some(self.locator.label(&req.client_ip)),
            item_title: Some(listing.title.clone()),
            item_image: listing.images.first().cloned(),
            buyer_username: snapshot_name(&req.buyer_snapshot),
            buyer_avatar_url: snapshot_avatar(&req.buyer_snapshot),
            seller_username: snapshot_name(&req.seller_snapshot),
            seller_avatar_url: snapshot_avatar(&req.seller_snapshot),
            buyer_agreed_at: Some(req.consent.agreed_at.unwrap_or(now)),
            buyer_agreed_ip: Some(
                req.consent
                    .agreed_ip
                    .clone()
                    .unwrap_or_else(|| req.client_ip.clone()),
            ),
            seller_agreed_at: None,
            seller_agreed_ip: None,
            agreement_version: Some(req.consent.version.clone()),
            paid_at: None,
            purchased_at: None,
            shipped_at: None,
            received_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.pool().begin().await?;
        self.db.listings().reserve_item(&mut tx, &listing.id, now).await?;
        self.db.orders().insert(&mut tx, &order).await?;

        let record = consent_record(
            &req.buyer_id,
            Role::Buyer,
            Some(&listing.id),
            Some(&order.id),
            &req.consent,
            &req.client_ip,
            now,
        );
        self.db.agreements().insert(&mut tx, &record).await?;
        tx.commit().await?;

        info!(
            id = %order.id,
            listing = %listing.id,
            total_cents = order.total_cents,
            "Marketplace order created"
        );
        Ok(order)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Records the buyer's payment: `pending → paid`, capturing the delivery
    /// details and the buyer's consent.
    pub async fn pay_order(
        &self,
        order_id: &str,
        actor_id: &str,
        details: PaymentDetails,
    ) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        let role = Self::party_role(&order, actor_id)?;
        state_machine::validate_transition(order.kind, order.status, OrderStatus::Paid, role)?;

        match order.kind {
            // Proxy-purchase goods always ship back to the poster
            OrderKind::ProxyPurchase => {
                let address = details.shipping_address.as_ref().ok_or_else(|| {
                    EngineError::validation("A shipping address is required for payment")
                })?;
                validation::validate_shipping_address(address).map_err(CoreError::from)?;
            }
            OrderKind::Marketplace => {
                if order.delivery_method == Some(DeliveryMethod::Shipping) {
                    let address = details.shipping_address.as_ref().ok_or_else(|| {
                        EngineError::validation(
                            "A shipping address is required for shipped delivery",
                        )
                    })?;
                    validation::validate_shipping_address(address).map_err(CoreError::from)?;
                } else if let Some(address) = details.shipping_address.as_ref() {
                    validation::validate_shipping_address(address).map_err(CoreError::from)?;
                }
            }
        }

        let now = Utc::now();
        let (echo_at, echo_ip) = match &details.consent {
            Some(consent) => (
                Some(consent.agreed_at.unwrap_or(now)),
                Some(
                    consent
                        .agreed_ip
                        .clone()
                        .unwrap_or_else(|| details.client_ip.clone()),
                ),
            ),
            None => (None, None),
        };

        let mut tx = self.db.pool().begin().await?;
        self.db
            .orders()
            .record_payment(
                &mut tx,
                order_id,
                details.shipping_address.as_ref(),
                details.pickup_address.as_deref(),
                echo_at,
                echo_ip.as_deref(),
                now,
            )
            .await?;

        if let Some(consent) = &details.consent {
            let record = consent_record(
                actor_id,
                Role::Buyer,
                Some(&order.listing_id),
                Some(order_id),
                consent,
                &details.client_ip,
                now,
            );
            self.db.agreements().insert(&mut tx, &record).await?;
        }
        tx.commit().await?;

        info!(id = %order_id, "Order paid");
        self.load_order(order_id).await
    }

    /// Proxy-purchase only: the fulfiller confirms they bought the goods,
    /// attaching purchase evidence. `paid → processing`.
    pub async fn mark_purchased(
        &self,
        order_id: &str,
        actor_id: &str,
        evidence: Vec<String>,
    ) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        let role = Self::party_role(&order, actor_id)?;
        state_machine::validate_transition(
            order.kind,
            order.status,
            OrderStatus::Processing,
            role,
        )?;

        if evidence.iter().all(|e| e.trim().is_empty()) {
            return Err(EngineError::validation("Purchase evidence is required"));
        }

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        self.db
            .orders()
            .record_purchase(&mut tx, order_id, &evidence, now)
            .await?;
        self.db
            .listings()
            .advance_fulfillment(&mut tx, &order.listing_id, ListingStatus::Purchased, now)
            .await?;
        tx.commit().await?;

        info!(id = %order_id, "Purchase recorded");
        self.load_order(order_id).await
    }

    /// The seller ships: `processing → shipping` (proxy-purchase) or
    /// `paid → shipping` (marketplace), with tracking details.
    pub async fn ship_order(
        &self,
        order_id: &str,
        actor_id: &str,
        tracking_number: &str,
        tracking_company: Option<&str>,
    ) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        let role = Self::party_role(&order, actor_id)?;
        state_machine::validate_transition(order.kind, order.status, OrderStatus::Shipping, role)?;
        validation::require_str("tracking_number", tracking_number).map_err(CoreError::from)?;

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        self.db
            .orders()
            .record_shipment(
                &mut tx,
                order_id,
                order.status,
                tracking_number,
                tracking_company,
                now,
            )
            .await?;
        if order.kind == OrderKind::ProxyPurchase {
            self.db
                .listings()
                .advance_fulfillment(&mut tx, &order.listing_id, ListingStatus::Shipping, now)
                .await?;
        }
        tx.commit().await?;

        info!(id = %order_id, tracking = %tracking_number, "Order shipped");
        self.load_order(order_id).await
    }

    /// Amends the tracking details on an in-transit order. Seller only.
    pub async fn update_tracking(
        &self,
        order_id: &str,
        actor_id: &str,
        tracking_number: &str,
        tracking_company: Option<&str>,
    ) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        let role = Self::party_role(&order, actor_id)?;
        if role != Role::Seller {
            return Err(EngineError::not_permitted(
                "Only the seller may amend tracking details",
            ));
        }
        validation::require_str("tracking_number", tracking_number).map_err(CoreError::from)?;

        self.db
            .orders()
            .update_tracking(order_id, tracking_number, tracking_company, Utc::now())
            .await?;
        self.load_order(order_id).await
    }

    /// The buyer confirms receipt, completing the order and settling it in
    /// the same transaction.
    ///
    /// Marketplace orders pass through `received` on the way to `completed`;
    /// both timestamps are recorded. Proxy-purchase orders complete
    /// directly from `shipping`.
    pub async fn confirm_receipt(&self, order_id: &str, actor_id: &str) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        let role = Self::party_role(&order, actor_id)?;

        // Settlement is exactly-once: a replay is an invariant violation,
        // logged loudly before rejection
        let split = match settlement::settle(&order) {
            Ok(split) => split,
            Err(err @ CoreError::AlreadySettled { .. }) => {
                error!(id = %order_id, "Settlement re-invoked on a settled order");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        match order.kind {
            OrderKind::ProxyPurchase => {
                state_machine::validate_transition(
                    order.kind,
                    order.status,
                    OrderStatus::Completed,
                    role,
                )?;
                self.db
                    .orders()
                    .transition(&mut tx, order_id, order.status, OrderStatus::Completed, now)
                    .await?;
                self.db
                    .listings()
                    .advance_fulfillment(&mut tx, &order.listing_id, ListingStatus::Completed, now)
                    .await?;
            }
            OrderKind::Marketplace => {
                state_machine::validate_transition(
                    order.kind,
                    order.status,
                    OrderStatus::Received,
                    role,
                )?;
                state_machine::validate_transition(
                    order.kind,
                    OrderStatus::Received,
                    OrderStatus::Completed,
                    role,
                )?;
                self.db
                    .orders()
                    .transition(&mut tx, order_id, order.status, OrderStatus::Received, now)
                    .await?;
                self.db
                    .orders()
                    .transition(
                        &mut tx,
                        order_id,
                        OrderStatus::Received,
                        OrderStatus::Completed,
                        now,
                    )
                    .await?;
                self.db
                    .listings()
                    .mark_item_sold(&mut tx, &order.listing_id, now)
                    .await?;
            }
        }
        self.db
            .orders()
            .write_settlement(
                &mut tx,
                order_id,
                split.settlement_amount.cents(),
                split.platform_revenue.cents(),
                now,
            )
            .await?;
        tx.commit().await?;

        info!(
            id = %order_id,
            settlement_amount_cents = split.settlement_amount.cents(),
            platform_revenue_cents = split.platform_revenue.cents(),
            "Order completed and settled"
        );
        self.load_order(order_id).await
    }

    /// Cancels an order, returning the reserved inventory to the listing.
    pub async fn cancel_order(&self, order_id: &str, actor_id: &str) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        let role = Self::party_role(&order, actor_id)?;
        state_machine::validate_transition(order.kind, order.status, OrderStatus::Cancelled, role)?;

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        self.db
            .orders()
            .transition(&mut tx, order_id, order.status, OrderStatus::Cancelled, now)
            .await?;
        match order.kind {
            OrderKind::ProxyPurchase => {
                self.db
                    .listings()
                    .release_supply(&mut tx, &order.listing_id, order.quantity, now)
                    .await?;
            }
            OrderKind::Marketplace => {
                self.db
                    .listings()
                    .release_item(&mut tx, &order.listing_id, now)
                    .await?;
            }
        }
        tx.commit().await?;

        info!(id = %order_id, "Order cancelled");
        self.load_order(order_id).await
    }

    /// Proxy-purchase only: the fulfiller refunds a paid order,
    /// `paid → refunded` (terminal).
    ///
    /// Inventory is deliberately not restored: a refunded slot stays counted
    /// against the want-ad.
    pub async fn refund_order(&self, order_id: &str, actor_id: &str) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        let role = Self::party_role(&order, actor_id)?;
        state_machine::validate_transition(order.kind, order.status, OrderStatus::Refunded, role)?;

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        self.db
            .orders()
            .transition(&mut tx, order_id, order.status, OrderStatus::Refunded, now)
            .await?;
        tx.commit().await?;

        info!(id = %order_id, "Order refunded");
        self.load_order(order_id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order. Parties only - everyone else gets an authorization
    /// error, not a not-found leak.
    pub async fn get_order(&self, order_id: &str, actor_id: &str) -> EngineResult<Order> {
        let order = self.load_order(order_id).await?;
        Self::party_role(&order, actor_id)?;
        Ok(order)
    }

    /// Lists the actor's orders on either side, newest first.
    pub async fn list_orders(&self, actor_id: &str, limit: i64) -> EngineResult<Vec<Order>> {
        Ok(self.db.orders().list_by_party(actor_id, limit).await?)
    }

    /// Lists the orders against a listing. Restricted to the listing owner
    /// and its claiming fulfiller.
    pub async fn list_listing_orders(
        &self,
        listing_id: &str,
        actor_id: &str,
    ) -> EngineResult<Vec<Order>> {
        let listing = self.load_listing(listing_id).await?;
        let is_fulfiller = listing.accepted_by.as_deref() == Some(actor_id);
        if !listing.is_owner(actor_id) && !is_fulfiller {
            return Err(EngineError::not_permitted(
                "Only the listing's parties may list its orders",
            ));
        }
        Ok(self.db.orders().list_by_listing(listing_id).await?)
    }
}

fn snapshot_name(snapshot: &Option<PartySnapshot>) -> Option<String> {
    snapshot.as_ref().map(|s| s.username.clone())
}

fn snapshot_avatar(snapshot: &Option<PartySnapshot>) -> Option<String> {
    snapshot.as_ref().and_then(|s| s.avatar_url.clone())
}
