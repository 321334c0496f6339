//! Shared fixtures for engine integration tests.

// Each test binary uses its own slice of these helpers.
#![allow(dead_code)]

use bazaar_core::{fees, DeliveryMethod, ListingKind, Money, ShippingAddress};
use bazaar_db::{Database, DbConfig};
use bazaar_engine::requests::{
    ConsentPayload, NewListing, NewMarketplaceOrder, NewProxyOrder, PartySnapshot,
};
use bazaar_engine::Engine;

pub async fn engine() -> Engine {
    bazaar_engine::init_telemetry();
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Engine::with_database(db)
}

pub fn consent() -> ConsentPayload {
    ConsentPayload {
        version: "v1.0".to_string(),
        agreed_at: None,
        agreed_ip: None,
        user_agent: Some("test-agent".to_string()),
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        receiver_name: "Wang".to_string(),
        phone: "13800000000".to_string(),
        province: "Guangdong".to_string(),
        city: "Shenzhen".to_string(),
        district: "Nanshan".to_string(),
        address: "1 Keji Rd".to_string(),
        postal_code: Some("518000".to_string()),
    }
}

pub fn want_ad_req(owner: &str, quantity: i64) -> NewListing {
    NewListing {
        kind: ListingKind::WantAd,
        owner_id: owner.to_string(),
        title: "Regional snack box".to_string(),
        description: "Three boxes from Osaka".to_string(),
        images: vec!["img/1.jpg".to_string()],
        price_cents: 0,
        original_price_cents: None,
        currency: "CNY".to_string(),
        location: None,
        category: Some("food".to_string()),
        condition: None,
        tags: vec!["snacks".to_string()],
        required_quantity: quantity,
        target_country: Some("JP".to_string()),
        expected_return_date: None,
        expected_tip_cents: 500,
        delivery_method: None,
        shipping_fee_cents: 0,
        client_ip: "127.0.0.1".to_string(),
        consent: Some(consent()),
    }
}

pub fn item_req(owner: &str, price_cents: i64) -> NewListing {
    NewListing {
        kind: ListingKind::Item,
        owner_id: owner.to_string(),
        title: "Used camera".to_string(),
        description: "Light wear".to_string(),
        images: vec!["img/cam.jpg".to_string()],
        price_cents,
        original_price_cents: Some(price_cents * 2),
        currency: "CNY".to_string(),
        location: Some("Shenzhen".to_string()),
        category: Some("electronics".to_string()),
        condition: Some("like_new".to_string()),
        tags: vec![],
        required_quantity: 1,
        target_country: None,
        expected_return_date: None,
        expected_tip_cents: 0,
        delivery_method: Some(DeliveryMethod::Shipping),
        shipping_fee_cents: 1_200,
        client_ip: "203.0.113.7".to_string(),
        consent: Some(consent()),
    }
}

/// A proxy-order submission with an internally consistent fee breakdown.
pub fn proxy_order_req(
    listing_id: &str,
    fulfiller_id: &str,
    quantity: i64,
    unit_price_cents: i64,
    tip_cents: i64,
) -> NewProxyOrder {
    let breakdown = fees::proxy_fee_breakdown(
        Money::from_cents(unit_price_cents),
        quantity,
        Money::zero(),
        Money::from_cents(tip_cents),
    );
    NewProxyOrder {
        listing_id: listing_id.to_string(),
        fulfiller_id: fulfiller_id.to_string(),
        quantity,
        unit_price_cents,
        original_price_cents: Some(unit_price_cents + 2_000),
        service_fee_cents: breakdown.service_fee.cents(),
        platform_fee_cents: breakdown.platform_fee.cents(),
        tip_cents,
        total_cents: breakdown.total.cents(),
        notes: Some("duty-free counter".to_string()),
        client_ip: "203.0.113.9".to_string(),
        consent: consent(),
        buyer_snapshot: Some(PartySnapshot {
            username: "poster".to_string(),
            avatar_url: None,
        }),
        seller_snapshot: Some(PartySnapshot {
            username: fulfiller_id.to_string(),
            avatar_url: Some("img/runner.png".to_string()),
        }),
    }
}

/// A marketplace purchase with fees computed off the listing's price.
pub fn marketplace_order_req(
    listing_id: &str,
    buyer_id: &str,
    price_cents: i64,
    shipping_fee_cents: i64,
) -> NewMarketplaceOrder {
    let platform_fee = fees::marketplace_platform_fee(Money::from_cents(price_cents)).cents();
    NewMarketplaceOrder {
        listing_id: listing_id.to_string(),
        buyer_id: buyer_id.to_string(),
        platform_fee_cents: platform_fee,
        shipping_fee_cents,
        total_cents: price_cents + platform_fee + shipping_fee_cents,
        delivery_method: None,
        notes: None,
        client_ip: "203.0.113.10".to_string(),
        consent: consent(),
        buyer_snapshot: Some(PartySnapshot {
            username: buyer_id.to_string(),
            avatar_url: None,
        }),
        seller_snapshot: None,
    }
}
