//! # Business Rule Validation
//!
//! Field-level and structural checks that run before any mutation.
//!
//! ## Validation Order
//! Every engine operation validates in the same sequence: required fields →
//! structural rules (self-dealing, quantity vs availability) → fee
//! verification (see [`crate::fees`]) → authorization → transition legality.
//! A failure at any stage rejects the request with the entity unchanged.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Listing, ShippingAddress};
use crate::MAX_ORDER_QUANTITY;

// =============================================================================
// Field Checks
// =============================================================================

/// Requires a non-empty (after trimming) string field.
pub fn require_str(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

/// Requires a strictly positive amount in cents.
pub fn require_positive(field: &'static str, cents: i64) -> Result<(), ValidationError> {
    if cents <= 0 {
        Err(ValidationError::MustBePositive { field })
    } else {
        Ok(())
    }
}

/// Requires a non-negative amount in cents (shipping, tip).
pub fn require_non_negative(field: &'static str, cents: i64) -> Result<(), ValidationError> {
    if cents < 0 {
        Err(ValidationError::MustBePositive { field })
    } else {
        Ok(())
    }
}

/// Validates an order quantity: positive and within the sanity cap.
pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 1 || quantity > MAX_ORDER_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_ORDER_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a shipping address for payment: every part except the postal
/// code is required.
pub fn validate_shipping_address(address: &ShippingAddress) -> Result<(), ValidationError> {
    let parts: [(&'static str, &str); 6] = [
        ("receiver_name", &address.receiver_name),
        ("phone", &address.phone),
        ("province", &address.province),
        ("city", &address.city),
        ("district", &address.district),
        ("address", &address.address),
    ];
    for (field, value) in parts {
        if value.trim().is_empty() {
            return Err(ValidationError::IncompleteAddress { field });
        }
    }
    Ok(())
}

// =============================================================================
// Structural Checks
// =============================================================================

/// Rejects an actor transacting against their own listing.
///
/// Self-dealing is structural: it is checked before listing state, so the
/// owner's accept/purchase fails the same way whatever the status.
pub fn reject_self_dealing(listing: &Listing, actor_id: &str) -> CoreResult<()> {
    if listing.is_owner(actor_id) {
        Err(CoreError::SelfDealing {
            listing_id: listing.id.clone(),
        })
    } else {
        Ok(())
    }
}

/// Validates requested quantity against what the listing can still supply.
///
/// No partial fulfillment: a quantity the listing cannot cover in full is
/// rejected at creation, never trimmed.
pub fn validate_availability(listing: &Listing, quantity: i64) -> CoreResult<()> {
    validate_quantity(quantity)?;
    if !listing.can_supply(quantity) {
        return Err(CoreError::InsufficientAvailability {
            listing_id: listing.id.clone(),
            available: listing.available_count,
            requested: quantity,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ListingKind, ListingStatus};
    use chrono::Utc;

    fn listing(owner: &str, available: i64) -> Listing {
        let now = Utc::now();
        Listing {
            id: "L-1".to_string(),
            kind: ListingKind::WantAd,
            owner_id: owner.to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            images: vec![],
            price_cents: 100,
            original_price_cents: None,
            currency: "CNY".to_string(),
            location: None,
            ip_location: None,
            category: None,
            condition: None,
            tags: vec![],
            required_quantity: available,
            available_count: available,
            orders_count: 0,
            target_country: None,
            expected_return_date: None,
            expected_tip_cents: 0,
            delivery_method: None,
            shipping_fee_cents: 0,
            accepted_by: None,
            accepted_at: None,
            status: ListingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            receiver_name: "Wang".to_string(),
            phone: "13800000000".to_string(),
            province: "Guangdong".to_string(),
            city: "Shenzhen".to_string(),
            district: "Nanshan".to_string(),
            address: "1 Keji Rd".to_string(),
            postal_code: None,
        }
    }

    #[test]
    fn test_require_str() {
        assert!(require_str("title", "ok").is_ok());
        assert!(require_str("title", "").is_err());
        assert!(require_str("title", "   ").is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_address_completeness() {
        assert!(validate_shipping_address(&address()).is_ok());

        let mut incomplete = address();
        incomplete.district = String::new();
        let err = validate_shipping_address(&incomplete).unwrap_err();
        assert!(err.to_string().contains("district"));

        // Postal code stays optional
        let mut no_postal = address();
        no_postal.postal_code = None;
        assert!(validate_shipping_address(&no_postal).is_ok());
    }

    #[test]
    fn test_self_dealing_rejected() {
        let l = listing("alice", 3);
        let err = reject_self_dealing(&l, "alice").unwrap_err();
        assert_eq!(err.code(), "SELF_DEALING");
        assert!(reject_self_dealing(&l, "bob").is_ok());
    }

    #[test]
    fn test_availability() {
        let l = listing("alice", 3);
        assert!(validate_availability(&l, 3).is_ok());
        let err = validate_availability(&l, 4).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_AVAILABILITY");
    }
}
