//! # Consent Operations
//!
//! Legal agreement recording and audit reads. Records are append-only
//! evidence; the order rows carry display echoes of the same facts, but the
//! `legal_agreements` table is the authoritative trail.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use bazaar_core::{validation, CoreError, LegalAgreement, Role};

use crate::engine::Engine;
use crate::error::EngineResult;
use crate::requests::ConsentPayload;

/// Builds an agreement record from a consent payload.
///
/// Client-reported instant and address are trusted as supplemental evidence
/// when present; the server clock and the request's own address fill the
/// gaps.
pub(crate) fn consent_record(
    actor_id: &str,
    role: Role,
    listing_id: Option<&str>,
    order_id: Option<&str>,
    consent: &ConsentPayload,
    client_ip: &str,
    now: DateTime<Utc>,
) -> LegalAgreement {
    LegalAgreement {
        id: Uuid::new_v4().to_string(),
        actor_id: actor_id.to_string(),
        role,
        listing_id: listing_id.map(str::to_string),
        order_id: order_id.map(str::to_string),
        version: consent.version.clone(),
        agreed_at: consent.agreed_at.unwrap_or(now),
        agreed_ip: consent
            .agreed_ip
            .clone()
            .unwrap_or_else(|| client_ip.to_string()),
        user_agent: consent.user_agent.clone(),
        created_at: now,
    }
}

impl Engine {
    /// Records a standalone consent event (e.g. re-acceptance after a terms
    /// update, outside any order operation).
    pub async fn record_consent(
        &self,
        actor_id: &str,
        role: Role,
        listing_id: Option<&str>,
        order_id: Option<&str>,
        consent: &ConsentPayload,
        client_ip: &str,
    ) -> EngineResult<LegalAgreement> {
        validation::require_str("version", &consent.version).map_err(CoreError::from)?;

        let now = Utc::now();
        let record = consent_record(actor_id, role, listing_id, order_id, consent, client_ip, now);

        let mut conn = self.db.pool().acquire().await?;
        self.db.agreements().insert(&mut conn, &record).await?;

        info!(actor = %actor_id, version = %record.version, "Consent recorded");
        Ok(record)
    }

    /// Lists the consent trail of an order. Parties only.
    pub async fn list_order_consents(
        &self,
        order_id: &str,
        actor_id: &str,
    ) -> EngineResult<Vec<LegalAgreement>> {
        let order = self.load_order(order_id).await?;
        Self::party_role(&order, actor_id)?;

        Ok(self.db.agreements().list_by_order(order_id).await?)
    }

    /// Lists an actor's own consent records, newest first.
    pub async fn list_my_consents(
        &self,
        actor_id: &str,
        limit: i64,
    ) -> EngineResult<Vec<LegalAgreement>> {
        Ok(self.db.agreements().list_by_actor(actor_id, limit).await?)
    }
}
