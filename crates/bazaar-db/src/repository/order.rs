//! # Order Repository
//!
//! Database operations for orders: lifecycle transitions and settlement.
//!
//! ## Order Lifecycle (persistence view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Persistence                                 │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── insert() inside the same transaction as the inventory reserve   │
//! │                                                                         │
//! │  2. TRANSITION                                                          │
//! │     └── every status move is one conditional UPDATE gated on the       │
//! │         expected current status; rows_affected == 0 means a concurrent │
//! │         writer won and the caller gets StaleWrite                      │
//! │                                                                         │
//! │  3. SETTLE                                                              │
//! │     └── write_settlement() gated on settlement_status = 'pending' AND  │
//! │         settlement_amount_cents IS NULL - figures land exactly once    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fee breakdown columns are written at insert and never touched by any
//! UPDATE in this module.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{decode_enum, decode_json, decode_json_opt, encode_json};
use bazaar_core::{
    DeliveryMethod, Order, OrderKind, OrderStatus, SettlementStatus, ShippingAddress,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// Lists orders where the user is buyer or seller, newest first.
    pub async fn list_by_party(&self, user_id: &str, limit: i64) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders
            WHERE buyer_id = ?1 OR seller_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    /// Lists orders against a listing, oldest first.
    pub async fn list_by_listing(&self, listing_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE listing_id = ?1 ORDER BY created_at ASC",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts an order. Runs on a caller-supplied connection so the insert
    /// shares a transaction with the inventory reserve.
    pub async fn insert(&self, conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, kind = %order.kind, total_cents = order.total_cents, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, kind, listing_id, buyer_id, seller_id, quantity,
                unit_price_cents, subtotal_cents, service_fee_cents,
                platform_fee_cents, shipping_fee_cents, tip_cents, total_cents,
                settlement_amount_cents, platform_revenue_cents,
                settlement_status, settled_at,
                status,
                delivery_method, shipping_address, pickup_address,
                tracking_number, tracking_company, purchase_evidence,
                notes, ip_location,
                item_title, item_image,
                buyer_username, buyer_avatar_url,
                seller_username, seller_avatar_url,
                buyer_agreed_at, buyer_agreed_ip,
                seller_agreed_at, seller_agreed_ip, agreement_version,
                paid_at, purchased_at, shipped_at, received_at,
                completed_at, cancelled_at,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15,
                ?16, ?17,
                ?18,
                ?19, ?20, ?21,
                ?22, ?23, ?24,
                ?25, ?26,
                ?27, ?28,
                ?29, ?30,
                ?31, ?32,
                ?33, ?34,
                ?35, ?36, ?37,
                ?38, ?39, ?40, ?41,
                ?42, ?43,
                ?44, ?45
            )
            "#,
        )
        .bind(&order.id)
        .bind(order.kind.as_str())
        .bind(&order.listing_id)
        .bind(&order.buyer_id)
        .bind(&order.seller_id)
        .bind(order.quantity)
        .bind(order.unit_price_cents)
        .bind(order.subtotal_cents)
        .bind(order.service_fee_cents)
        .bind(order.platform_fee_cents)
        .bind(order.shipping_fee_cents)
        .bind(order.tip_cents)
        .bind(order.total_cents)
        .bind(order.settlement_amount_cents)
        .bind(order.platform_revenue_cents)
        .bind(order.settlement_status.as_str())
        .bind(order.settled_at)
        .bind(order.status.as_str())
        .bind(order.delivery_method.map(|m| m.as_str()))
        .bind(
            order
                .shipping_address
                .as_ref()
                .map(|a| encode_json("shipping_address", a))
                .transpose()?,
        )
        .bind(&order.pickup_address)
        .bind(&order.tracking_number)
        .bind(&order.tracking_company)
        .bind(encode_json("purchase_evidence", &order.purchase_evidence)?)
        .bind(&order.notes)
        .bind(&order.ip_location)
        .bind(&order.item_title)
        .bind(&order.item_image)
        .bind(&order.buyer_username)
        .bind(&order.buyer_avatar_url)
        .bind(&order.seller_username)
        .bind(&order.seller_avatar_url)
        .bind(order.buyer_agreed_at)
        .bind(&order.buyer_agreed_ip)
        .bind(order.seller_agreed_at)
        .bind(&order.seller_agreed_ip)
        .bind(&order.agreement_version)
        .bind(order.paid_at)
        .bind(order.purchased_at)
        .bind(order.shipped_at)
        .bind(order.received_at)
        .bind(order.completed_at)
        .bind(order.cancelled_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Moves an order from one status to another, stamping the matching
    /// lifecycle timestamp.
    ///
    /// The gate on the expected current status makes this first-writer-wins:
    /// a concurrent transition leaves the loser with zero affected rows.
    pub async fn transition(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, from = %from, to = %to, "Transitioning order");

        let ts_column = match to {
            OrderStatus::Paid => Some("paid_at"),
            OrderStatus::Processing => Some("purchased_at"),
            OrderStatus::Shipping => Some("shipped_at"),
            OrderStatus::Received => Some("received_at"),
            OrderStatus::Completed => Some("completed_at"),
            OrderStatus::Cancelled => Some("cancelled_at"),
            OrderStatus::Pending | OrderStatus::Refunded => None,
        };

        let sql = match ts_column {
            Some(col) => format!(
                "UPDATE orders SET status = ?3, {col} = ?4, updated_at = ?4 \
                 WHERE id = ?1 AND status = ?2"
            ),
            None => "UPDATE orders SET status = ?3, updated_at = ?4 \
                     WHERE id = ?1 AND status = ?2"
                .to_string(),
        };

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(now)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Order", id));
        }
        Ok(())
    }

    /// Records a buyer's payment: pending → paid, capturing the delivery
    /// details in the same gated statement.
    pub async fn record_payment(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        shipping_address: Option<&ShippingAddress>,
        pickup_address: Option<&str>,
        buyer_agreed_at: Option<DateTime<Utc>>,
        buyer_agreed_ip: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, "Recording payment");

        let address_json = shipping_address
            .map(|a| encode_json("shipping_address", a))
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'paid',
                paid_at = ?6,
                shipping_address = COALESCE(?2, shipping_address),
                pickup_address = COALESCE(?3, pickup_address),
                buyer_agreed_at = COALESCE(?4, buyer_agreed_at),
                buyer_agreed_ip = COALESCE(?5, buyer_agreed_ip),
                updated_at = ?6
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(address_json)
        .bind(pickup_address)
        .bind(buyer_agreed_at)
        .bind(buyer_agreed_ip)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Order", id));
        }
        Ok(())
    }

    /// Records the fulfiller's purchase: paid → processing, attaching the
    /// purchase evidence references.
    pub async fn record_purchase(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        evidence: &[String],
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, evidence_count = evidence.len(), "Recording purchase");

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'processing',
                purchased_at = ?3,
                purchase_evidence = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'paid'
            "#,
        )
        .bind(id)
        .bind(encode_json("purchase_evidence", &evidence)?)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Order", id));
        }
        Ok(())
    }

    /// Records shipment: `from` → shipping with tracking details. The
    /// expected from-status differs per kind (proxy-purchase ships out of
    /// `processing`, marketplace out of `paid`), so the caller supplies it.
    pub async fn record_shipment(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        from: OrderStatus,
        tracking_number: &str,
        tracking_company: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, tracking_number = %tracking_number, "Recording shipment");

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'shipping',
                shipped_at = ?5,
                tracking_number = ?3,
                tracking_company = ?4,
                updated_at = ?5
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(tracking_number)
        .bind(tracking_company)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Order", id));
        }
        Ok(())
    }

    /// Amends tracking details on an in-transit order (wrong number keyed in,
    /// carrier handed the parcel to a partner).
    pub async fn update_tracking(
        &self,
        id: &str,
        tracking_number: &str,
        tracking_company: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET tracking_number = ?2,
                tracking_company = COALESCE(?3, tracking_company),
                updated_at = ?4
            WHERE id = ?1 AND status = 'shipping'
            "#,
        )
        .bind(id)
        .bind(tracking_number)
        .bind(tracking_company)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Order", id));
        }
        Ok(())
    }

    /// Writes the settlement figures exactly once.
    ///
    /// Both gates must hold: settlement status still pending AND no figures
    /// present. A second writer, however it got here, affects zero rows.
    pub async fn write_settlement(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        settlement_amount_cents: i64,
        platform_revenue_cents: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(
            id = %id,
            settlement_amount_cents,
            platform_revenue_cents,
            "Writing settlement"
        );

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET settlement_amount_cents = ?2,
                platform_revenue_cents = ?3,
                settlement_status = 'completed',
                settled_at = ?4,
                updated_at = ?4
            WHERE id = ?1
              AND settlement_status = 'pending'
              AND settlement_amount_cents IS NULL
            "#,
        )
        .bind(id)
        .bind(settlement_amount_cents)
        .bind(platform_revenue_cents)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Order", id));
        }
        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Maps a database row to an Order.
pub(crate) fn order_from_row(row: &SqliteRow) -> DbResult<Order> {
    let kind: String = row.try_get("kind")?;
    let status: String = row.try_get("status")?;
    let settlement_status: String = row.try_get("settlement_status")?;
    let delivery_method: Option<String> = row.try_get("delivery_method")?;
    let shipping_address: Option<String> = row.try_get("shipping_address")?;
    let purchase_evidence: String = row.try_get("purchase_evidence")?;

    Ok(Order {
        id: row.try_get("id")?,
        kind: decode_enum("kind", &kind, OrderKind::parse)?,
        listing_id: row.try_get("listing_id")?,
        buyer_id: row.try_get("buyer_id")?,
        seller_id: row.try_get("seller_id")?,
        quantity: row.try_get("quantity")?,
        unit_price_cents: row.try_get("unit_price_cents")?,
        subtotal_cents: row.try_get("subtotal_cents")?,
        service_fee_cents: row.try_get("service_fee_cents")?,
        platform_fee_cents: row.try_get("platform_fee_cents")?,
        shipping_fee_cents: row.try_get("shipping_fee_cents")?,
        tip_cents: row.try_get("tip_cents")?,
        total_cents: row.try_get("total_cents")?,
        settlement_amount_cents: row.try_get("settlement_amount_cents")?,
        platform_revenue_cents: row.try_get("platform_revenue_cents")?,
        settlement_status: decode_enum(
            "settlement_status",
            &settlement_status,
            SettlementStatus::parse,
        )?,
        settled_at: row.try_get("settled_at")?,
        status: decode_enum("status", &status, OrderStatus::parse)?,
        delivery_method: delivery_method
            .as_deref()
            .map(|m| decode_enum("delivery_method", m, DeliveryMethod::parse))
            .transpose()?,
        shipping_address: decode_json_opt("shipping_address", shipping_address)?,
        pickup_address: row.try_get("pickup_address")?,
        tracking_number: row.try_get("tracking_number")?,
        tracking_company: row.try_get("tracking_company")?,
        purchase_evidence: decode_json("purchase_evidence", &purchase_evidence)?,
        notes: row.try_get("notes")?,
        ip_location: row.try_get("ip_location")?,
        item_title: row.try_get("item_title")?,
        item_image: row.try_get("item_image")?,
        buyer_username: row.try_get("buyer_username")?,
        buyer_avatar_url: row.try_get("buyer_avatar_url")?,
        seller_username: row.try_get("seller_username")?,
        seller_avatar_url: row.try_get("seller_avatar_url")?,
        buyer_agreed_at: row.try_get("buyer_agreed_at")?,
        buyer_agreed_ip: row.try_get("buyer_agreed_ip")?,
        seller_agreed_at: row.try_get("seller_agreed_at")?,
        seller_agreed_ip: row.try_get("seller_agreed_ip")?,
        agreement_version: row.try_get("agreement_version")?,
        paid_at: row.try_get("paid_at")?,
        purchased_at: row.try_get("purchased_at")?,
        shipped_at: row.try_get("shipped_at")?,
        received_at: row.try_get("received_at")?,
        completed_at: row.try_get("completed_at")?,
        cancelled_at: row.try_get("cancelled_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::repository::listing::tests::{item, test_db, want_ad};
    use uuid::Uuid;

    pub(crate) fn sample_order(kind: OrderKind, listing_id: &str) -> Order {
        let now = Utc::now();
        let (service_fee, platform_fee, tip) = match kind {
            OrderKind::ProxyPurchase => (1_000, 500, 300),
            OrderKind::Marketplace => (0, 500, 0),
        };
        Order {
            id: Uuid::new_v4().to_string(),
            kind,
            listing_id: listing_id.to_string(),
            buyer_id: "buyer".to_string(),
            seller_id: "seller".to_string(),
            quantity: 1,
            unit_price_cents: 10_000,
            subtotal_cents: 10_000,
            service_fee_cents: service_fee,
            platform_fee_cents: platform_fee,
            shipping_fee_cents: 0,
            tip_cents: tip,
            total_cents: 10_000 + service_fee + platform_fee + tip,
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
            notes: None,
            ip_location: Some("local".to_string()),
            item_title: Some("Used camera".to_string()),
            item_image: None,
            buyer_username: Some("buyer".to_string()),
            buyer_avatar_url: None,
            seller_username: Some("seller".to_string()),
            seller_avatar_url: None,
            buyer_agreed_at: None,
            buyer_agreed_ip: None,
            seller_agreed_at: Some(now),
            seller_agreed_ip: Some("203.0.113.9".to_string()),
            agreement_version: Some("v1.0".to_string()),
            paid_at: None,
            purchased_at: None,
            shipped_at: None,
            received_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn insert_order(db: &crate::pool::Database, order: &Order) {
        let mut conn = db.pool().acquire().await.unwrap();
        db.orders().insert(&mut conn, order).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = test_db().await;
        let listing = item("seller", 10_000);
        db.listings().insert(&listing).await.unwrap();

        let order = sample_order(OrderKind::Marketplace, &listing.id);
        insert_order(&db, &order).await;

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.kind, OrderKind::Marketplace);
        assert_eq!(loaded.total_cents, order.total_cents);
        assert_eq!(loaded.status, OrderStatus::Pending);
        assert_eq!(loaded.settlement_status, SettlementStatus::Pending);
        assert_eq!(loaded.agreement_version.as_deref(), Some("v1.0"));
    }

    #[tokio::test]
    async fn test_transition_is_gated_on_expected_status() {
        let db = test_db().await;
        let listing = want_ad("buyer", 1);
        db.listings().insert(&listing).await.unwrap();

        let order = sample_order(OrderKind::ProxyPurchase, &listing.id);
        insert_order(&db, &order).await;

        let mut conn = db.pool().acquire().await.unwrap();
        db.orders()
            .transition(
                &mut conn,
                &order.id,
                OrderStatus::Pending,
                OrderStatus::Paid,
                Utc::now(),
            )
            .await
            .unwrap();

        // Replaying the same move loses: the order is no longer pending
        let err = db
            .orders()
            .transition(
                &mut conn,
                &order.id,
                OrderStatus::Pending,
                OrderStatus::Paid,
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StaleWrite { .. }));
        drop(conn);

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Paid);
        assert!(loaded.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_record_payment_captures_address() {
        let db = test_db().await;
        let listing = want_ad("buyer", 1);
        db.listings().insert(&listing).await.unwrap();

        let order = sample_order(OrderKind::ProxyPurchase, &listing.id);
        insert_order(&db, &order).await;

        let address = ShippingAddress {
            receiver_name: "Wang".to_string(),
            phone: "13800000000".to_string(),
            province: "Guangdong".to_string(),
            city: "Shenzhen".to_string(),
            district: "Nanshan".to_string(),
            address: "1 Keji Rd".to_string(),
            postal_code: Some("518000".to_string()),
        };

        let mut conn = db.pool().acquire().await.unwrap();
        db.orders()
            .record_payment(
                &mut conn,
                &order.id,
                Some(&address),
                None,
                Some(Utc::now()),
                Some("203.0.113.7"),
                Utc::now(),
            )
            .await
            .unwrap();
        drop(conn);

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Paid);
        assert_eq!(loaded.shipping_address.unwrap(), address);
        assert_eq!(loaded.buyer_agreed_ip.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_settlement_writes_exactly_once() {
        let db = test_db().await;
        let listing = item("seller", 10_000);
        db.listings().insert(&listing).await.unwrap();

        let order = sample_order(OrderKind::Marketplace, &listing.id);
        insert_order(&db, &order).await;

        let mut conn = db.pool().acquire().await.unwrap();
        db.orders()
            .write_settlement(&mut conn, &order.id, 9_500, 500, Utc::now())
            .await
            .unwrap();

        // Second attempt with different figures affects zero rows
        let err = db
            .orders()
            .write_settlement(&mut conn, &order.id, 1, 1, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StaleWrite { .. }));
        drop(conn);

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.settlement_amount_cents, Some(9_500));
        assert_eq!(loaded.platform_revenue_cents, Some(500));
        assert_eq!(loaded.settlement_status, SettlementStatus::Completed);
        assert!(loaded.settled_at.is_some());
    }

    #[tokio::test]
    async fn test_fee_columns_survive_transitions() {
        let db = test_db().await;
        let listing = item("seller", 10_000);
        db.listings().insert(&listing).await.unwrap();

        let order = sample_order(OrderKind::Marketplace, &listing.id);
        insert_order(&db, &order).await;

        let mut conn = db.pool().acquire().await.unwrap();
        db.orders()
            .record_payment(&mut conn, &order.id, None, None, None, None, Utc::now())
            .await
            .unwrap();
        db.orders()
            .record_shipment(
                &mut conn,
                &order.id,
                OrderStatus::Paid,
                "SF123456",
                Some("SF Express"),
                Utc::now(),
            )
            .await
            .unwrap();
        drop(conn);

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.subtotal_cents, order.subtotal_cents);
        assert_eq!(loaded.platform_fee_cents, order.platform_fee_cents);
        assert_eq!(loaded.total_cents, order.total_cents);
        assert_eq!(loaded.tracking_number.as_deref(), Some("SF123456"));
    }

    #[tokio::test]
    async fn test_list_by_party_sees_both_sides() {
        let db = test_db().await;
        let listing = item("seller", 10_000);
        db.listings().insert(&listing).await.unwrap();

        let order = sample_order(OrderKind::Marketplace, &listing.id);
        insert_order(&db, &order).await;

        assert_eq!(db.orders().list_by_party("buyer", 10).await.unwrap().len(), 1);
        assert_eq!(db.orders().list_by_party("seller", 10).await.unwrap().len(), 1);
        assert!(db.orders().list_by_party("stranger", 10).await.unwrap().is_empty());
    }
}
