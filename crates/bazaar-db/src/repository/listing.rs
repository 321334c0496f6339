//! # Listing Repository
//!
//! Database operations for listings, including the inventory ledger.
//!
//! ## Inventory Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Inventory Update Strategy                            │
//! │                                                                         │
//! │  ❌ WRONG: Read-modify-write (races under concurrency)                 │
//! │     let l = get(id); l.available_count -= q; save(l);                  │
//! │                                                                         │
//! │  ✅ CORRECT: Delta update gated on the current row state               │
//! │     UPDATE listings                                                    │
//! │     SET available_count = available_count - ?                          │
//! │     WHERE id = ? AND available_count >= ?                              │
//! │                                                                         │
//! │  Why?                                                                   │
//! │  Two buyers reserving the last unit race on the same row. The gate     │
//! │  matches for exactly one of them; the other sees rows_affected == 0    │
//! │  and gets a retryable conflict. A CHECK (available_count >= 0) in the  │
//! │  schema backstops the gate.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Composition
//! Ledger mutations take `&mut SqliteConnection` so the engine can run the
//! listing write and the matching order write inside one transaction. They
//! commit together or not at all.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{decode_enum, decode_json, encode_json};
use bazaar_core::{DeliveryMethod, Listing, ListingKind, ListingStatus};

/// Repository for listing database operations.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    /// Creates a new ListingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ListingRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a listing by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Listing>> {
        let row = sqlx::query("SELECT * FROM listings WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(listing_from_row).transpose()
    }

    /// Lists open listings of a kind, newest first.
    pub async fn list_open(&self, kind: ListingKind, limit: i64) -> DbResult<Vec<Listing>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM listings
            WHERE kind = ?1 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(kind.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(listing_from_row).collect()
    }

    /// Lists a user's own listings, newest first, removed ones included.
    pub async fn list_by_owner(&self, owner_id: &str, limit: i64) -> DbResult<Vec<Listing>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM listings
            WHERE owner_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(listing_from_row).collect()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a listing.
    pub async fn insert(&self, listing: &Listing) -> DbResult<()> {
        debug!(id = %listing.id, kind = %listing.kind, "Inserting listing");

        sqlx::query(
            r#"
            INSERT INTO listings (
                id, kind, owner_id, title, description, images,
                price_cents, original_price_cents, currency,
                location, ip_location, category, condition, tags,
                required_quantity, available_count, orders_count,
                target_country, expected_return_date, expected_tip_cents,
                delivery_method, shipping_fee_cents,
                accepted_by, accepted_at, status,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17,
                ?18, ?19, ?20,
                ?21, ?22,
                ?23, ?24, ?25,
                ?26, ?27
            )
            "#,
        )
        .bind(&listing.id)
        .bind(listing.kind.as_str())
        .bind(&listing.owner_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(encode_json("images", &listing.images)?)
        .bind(listing.price_cents)
        .bind(listing.original_price_cents)
        .bind(&listing.currency)
        .bind(&listing.location)
        .bind(&listing.ip_location)
        .bind(&listing.category)
        .bind(&listing.condition)
        .bind(encode_json("tags", &listing.tags)?)
        .bind(listing.required_quantity)
        .bind(listing.available_count)
        .bind(listing.orders_count)
        .bind(&listing.target_country)
        .bind(listing.expected_return_date)
        .bind(listing.expected_tip_cents)
        .bind(listing.delivery_method.map(|m| m.as_str()))
        .bind(listing.shipping_fee_cents)
        .bind(&listing.accepted_by)
        .bind(listing.accepted_at)
        .bind(listing.status.as_str())
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Claims an open want-ad for a fulfiller.
    ///
    /// Gated on `status = 'pending'`: concurrent claimers race on the same
    /// row and exactly one wins. The self-claim guard in the WHERE clause
    /// backstops the engine-level check.
    pub async fn claim(&self, id: &str, fulfiller_id: &str, now: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, fulfiller = %fulfiller_id, "Claiming want-ad");

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET status = 'accepted', accepted_by = ?2, accepted_at = ?3, updated_at = ?3
            WHERE id = ?1 AND status = 'pending' AND owner_id <> ?2
            "#,
        )
        .bind(id)
        .bind(fulfiller_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Listing", id));
        }
        Ok(())
    }

    /// Records the real purchase price a fulfiller quoted when submitting an
    /// order against a claimed want-ad.
    pub async fn update_quoted_price(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        price_cents: i64,
        original_price_cents: Option<i64>,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET price_cents = ?2,
                original_price_cents = COALESCE(?3, original_price_cents),
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price_cents)
        .bind(original_price_cents)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Listing", id));
        }
        Ok(())
    }

    /// Advances a want-ad along its fulfillment trail
    /// (accepted → purchased → shipping → completed), monotonically.
    ///
    /// The trail is advanced by whichever order progresses furthest; a
    /// listing already at or past the target stays put. That keeps several
    /// orders against one want-ad from fighting over a single-track status.
    pub async fn advance_fulfillment(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        to: ListingStatus,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, to = %to, "Advancing listing fulfillment");

        // States strictly before the target on the trail
        let earlier: &[&str] = match to {
            ListingStatus::Purchased => &["accepted"],
            ListingStatus::Shipping => &["accepted", "purchased"],
            ListingStatus::Completed => &["accepted", "purchased", "shipping"],
            _ => &[],
        };
        if earlier.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; earlier.len()].join(", ");
        let sql = format!(
            "UPDATE listings SET status = ?, updated_at = ? \
             WHERE id = ? AND status IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql).bind(to.as_str()).bind(now).bind(id);
        for state in earlier {
            query = query.bind(*state);
        }
        // Zero affected rows means the listing is already at or past the
        // target; that is the monotone no-op, not an error.
        query.execute(conn).await?;
        Ok(())
    }

    /// Soft-removes an open listing. Only the owner may remove, and only
    /// while no order holds it.
    pub async fn remove(&self, id: &str, owner_id: &str, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET status = 'cancelled', updated_at = ?3
            WHERE id = ?1 AND owner_id = ?2 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Listing", id));
        }
        Ok(())
    }

    // =========================================================================
    // Inventory Ledger
    // =========================================================================

    /// Reserves `quantity` units of a claimed want-ad's supply.
    ///
    /// The claim itself is the reservation label for this variant, so the
    /// status stays put; only the counters move. The availability gate makes
    /// overdraw impossible: the racing loser affects zero rows.
    pub async fn reserve_supply(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Reserving want-ad supply");

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET available_count = available_count - ?2,
                orders_count = orders_count + ?2,
                updated_at = ?3
            WHERE id = ?1 AND status IN ('accepted', 'purchased', 'shipping')
              AND available_count >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Listing", id));
        }
        Ok(())
    }

    /// Releases `quantity` units back to a want-ad's supply (order
    /// cancellation). The exact inverse of [`Self::reserve_supply`]; the
    /// fulfiller's claim survives one order's cancellation.
    pub async fn release_supply(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Releasing want-ad supply");

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET available_count = available_count + ?2,
                orders_count = orders_count - ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Listing", id));
        }
        Ok(())
    }

    /// Reserves a marketplace item for a pending order.
    ///
    /// An item is single-unit: reserving flips it to `accepted` so no second
    /// buyer can order it.
    pub async fn reserve_item(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, "Reserving marketplace item");

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET status = 'accepted',
                available_count = available_count - 1,
                orders_count = orders_count + 1,
                updated_at = ?2
            WHERE id = ?1 AND status = 'pending' AND available_count >= 1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Listing", id));
        }
        Ok(())
    }

    /// Releases a reserved marketplace item (order cancellation). The item
    /// goes straight back on the market.
    pub async fn release_item(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, "Releasing marketplace item");

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET status = 'pending',
                available_count = available_count + 1,
                orders_count = orders_count - 1,
                updated_at = ?2
            WHERE id = ?1 AND status = 'accepted'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Listing", id));
        }
        Ok(())
    }

    /// Marks a reserved marketplace item sold (receipt confirmed).
    pub async fn mark_item_sold(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, "Marking marketplace item sold");

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET status = 'completed', updated_at = ?2
            WHERE id = ?1 AND status = 'accepted'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale_write("Listing", id));
        }
        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Maps a database row to a Listing.
pub(crate) fn listing_from_row(row: &SqliteRow) -> DbResult<Listing> {
    let kind: String = row.try_get("kind")?;
    let status: String = row.try_get("status")?;
    let images: String = row.try_get("images")?;
    let tags: String = row.try_get("tags")?;
    let delivery_method: Option<String> = row.try_get("delivery_method")?;

    Ok(Listing {
        id: row.try_get("id")?,
        kind: decode_enum("kind", &kind, ListingKind::parse)?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        images: decode_json("images", &images)?,
        price_cents: row.try_get("price_cents")?,
        original_price_cents: row.try_get("original_price_cents")?,
        currency: row.try_get("currency")?,
        location: row.try_get("location")?,
        ip_location: row.try_get("ip_location")?,
        category: row.try_get("category")?,
        condition: row.try_get("condition")?,
        tags: decode_json("tags", &tags)?,
        required_quantity: row.try_get("required_quantity")?,
        available_count: row.try_get("available_count")?,
        orders_count: row.try_get("orders_count")?,
        target_country: row.try_get("target_country")?,
        expected_return_date: row.try_get("expected_return_date")?,
        expected_tip_cents: row.try_get("expected_tip_cents")?,
        delivery_method: delivery_method
            .as_deref()
            .map(|m| decode_enum("delivery_method", m, DeliveryMethod::parse))
            .transpose()?,
        shipping_fee_cents: row.try_get("shipping_fee_cents")?,
        accepted_by: row.try_get("accepted_by")?,
        accepted_at: row.try_get("accepted_at")?,
        status: decode_enum("status", &status, ListingStatus::parse)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
