//! # Listing Operations
//!
//! Posting, claiming, and removing listings, plus the public reads.
//!
//! ## Consent Points
//! A want-ad poster consents as the eventual buyer when posting; a fulfiller
//! consents as the seller when claiming; an item seller consents when
//! listing. Each point appends one `legal_agreements` record.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use bazaar_core::{validation, CoreError, Listing, ListingKind, ListingStatus, Role};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::ops::consent::consent_record;
use crate::requests::{ConsentPayload, NewListing};

impl Engine {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates a listing of either kind.
    pub async fn create_listing(&self, req: NewListing) -> EngineResult<Listing> {
        validation::require_str("title", &req.title).map_err(CoreError::from)?;
        validation::require_str("description", &req.description).map_err(CoreError::from)?;
        validation::require_str("owner_id", &req.owner_id).map_err(CoreError::from)?;

        let (required_quantity, consent_role) = match req.kind {
            ListingKind::WantAd => {
                validation::validate_quantity(req.required_quantity).map_err(CoreError::from)?;
                validation::require_non_negative("price", req.price_cents)
                    .map_err(CoreError::from)?;
                validation::require_non_negative("expected_tip", req.expected_tip_cents)
                    .map_err(CoreError::from)?;
                // The poster is the buyer of whatever gets fulfilled
                (req.required_quantity, Role::Buyer)
            }
            ListingKind::Item => {
                validation::require_positive("price", req.price_cents)
                    .map_err(CoreError::from)?;
                validation::require_non_negative("shipping_fee", req.shipping_fee_cents)
                    .map_err(CoreError::from)?;
                // Items are single-unit whatever the request says
                (1, Role::Seller)
            }
        };

        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4().to_string(),
            kind: req.kind,
            owner_id: req.owner_id.clone(),
            title: req.title,
            description: req.description,
            images: req.images,
            price_cents: req.price_cents,
            original_price_cents: req.original_price_cents,
            currency: req.currency,
            location: req.location,
            ip_location: Some(self.locator.label(&req.client_ip)),
            category: req.category,
            condition: req.condition,
            tags: req.tags,
            required_quantity,
            available_count: required_quantity,
            orders_count: 0,
            target_country: req.target_country,
            expected_return_date: req.expected_return_date,
            expected_tip_cents: req.expected_tip_cents,
            delivery_method: req.delivery_method,
            shipping_fee_cents: req.shipping_fee_cents,
            accepted_by: None,
            accepted_at: None,
            status: ListingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.db.listings().insert(&listing).await?;

        if let Some(consent) = &req.consent {
            let record = consent_record(
                &req.owner_id,
                consent_role,
                Some(&listing.id),
                None,
                consent,
                &req.client_ip,
                now,
            );
            let mut conn = self.db.pool().acquire().await?;
            self.db.agreements().insert(&mut conn, &record).await?;
        }

        info!(id = %listing.id, kind = %listing.kind, owner = %listing.owner_id, "Listing created");
        Ok(listing)
    }

    /// Claims an open want-ad for a fulfiller.
    ///
    /// First writer wins: a concurrent claimer loses with a retryable
    /// conflict, and the owner can never claim their own posting.
    pub async fn accept_listing(
        &self,
        listing_id: &str,
        fulfiller_id: &str,
        client_ip: &str,
        consent: Option<&ConsentPayload>,
    ) -> EngineResult<Listing> {
        let listing = self.load_listing(listing_id).await?;
        if listing.kind != ListingKind::WantAd {
            return Err(EngineError::validation("Only want-ads can be claimed"));
        }
        validation::reject_self_dealing(&listing, fulfiller_id)?;

        let now = Utc::now();
        self.db.listings().claim(listing_id, fulfiller_id, now).await?;

        if let Some(consent) = consent {
            let record = consent_record(
                fulfiller_id,
                Role::Seller,
                Some(listing_id),
                None,
                consent,
                client_ip,
                now,
            );
            let mut conn = self.db.pool().acquire().await?;
            self.db.agreements().insert(&mut conn, &record).await?;
        }

        info!(id = %listing_id, fulfiller = %fulfiller_id, "Want-ad claimed");
        self.load_listing(listing_id).await
    }

    /// Soft-removes an open listing. Owner only, and only while no order
    /// holds it.
    pub async fn remove_listing(&self, listing_id: &str, owner_id: &str) -> EngineResult<()> {
        // Distinguish "not yours" from "not removable in this state"
        let listing = self.load_listing(listing_id).await?;
        if !listing.is_owner(owner_id) {
            return Err(EngineError::not_permitted(
                "Only the owner may remove a listing",
            ));
        }

        self.db.listings().remove(listing_id, owner_id, Utc::now()).await?;
        info!(id = %listing_id, "Listing removed");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a listing by id. Listings are public.
    pub async fn get_listing(&self, listing_id: &str) -> EngineResult<Listing> {
        self.load_listing(listing_id).await
    }

    /// Lists open listings of a kind, newest first.
    pub async fn list_open_listings(
        &self,
        kind: ListingKind,
        limit: i64,
    ) -> EngineResult<Vec<Listing>> {
        Ok(self.db.listings().list_open(kind, limit).await?)
    }

    /// Lists a user's own listings, removed ones included.
    pub async fn list_my_listings(&self, owner_id: &str, limit: i64) -> EngineResult<Vec<Listing>> {
        Ok(self.db.listings().list_by_owner(owner_id, limit).await?)
    }
}
