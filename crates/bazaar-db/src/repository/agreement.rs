//! # Legal Agreement Repository
//!
//! Append-only storage for consent records.
//!
//! Agreements are evidence, not state: there is no update or delete here by
//! design, and nothing in the schema lets one row shadow another. Reads are
//! for audit and dispute resolution.

use sqlx::{SqliteConnection, SqlitePool};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::decode_enum;
use bazaar_core::{LegalAgreement, Role};

/// Repository for legal agreement records.
#[derive(Debug, Clone)]
pub struct AgreementRepository {
    pool: SqlitePool,
}

impl AgreementRepository {
    /// Creates a new AgreementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AgreementRepository { pool }
    }

    /// Appends a consent record.
    pub async fn insert(&self, conn: &mut SqliteConnection, record: &LegalAgreement) -> DbResult<()> {
        debug!(
            id = %record.id,
            actor = %record.actor_id,
            role = %record.role,
            version = %record.version,
            "Recording consent"
        );

        sqlx::query(
            r#"
            INSERT INTO legal_agreements (
                id, actor_id, role, listing_id, order_id,
                version, agreed_at, agreed_ip, user_agent, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&record.id)
        .bind(&record.actor_id)
        .bind(record.role.as_str())
        .bind(&record.listing_id)
        .bind(&record.order_id)
        .bind(&record.version)
        .bind(record.agreed_at)
        .bind(&record.agreed_ip)
        .bind(&record.user_agent)
        .bind(record.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Lists an actor's consent records, newest first.
    pub async fn list_by_actor(&self, actor_id: &str, limit: i64) -> DbResult<Vec<LegalAgreement>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM legal_agreements
            WHERE actor_id = ?1
            ORDER BY agreed_at DESC
            LIMIT ?2
            "#,
        )
        .bind(actor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(agreement_from_row).collect()
    }

    /// Lists the consent records attached to an order, oldest first.
    pub async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<LegalAgreement>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM legal_agreements
            WHERE order_id = ?1
            ORDER BY agreed_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(agreement_from_row).collect()
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn agreement_from_row(row: &SqliteRow) -> DbResult<LegalAgreement> {
    let role: String = row.try_get("role")?;

    Ok(LegalAgreement {
        id: row.try_get("id")?,
        actor_id: row.try_get("actor_id")?,
        role: decode_enum("role", &role, Role::parse)?,
        listing_id: row.try_get("listing_id")?,
        order_id: row.try_get("order_id")?,
        version: row.try_get("version")?,
        agreed_at: row.try_get("agreed_at")?,
        agreed_ip: row.try_get("agreed_ip")?,
        user_agent: row.try_get("user_agent")?,
        created_at: row.try_get("created_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
